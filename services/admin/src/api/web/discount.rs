use std::str::FromStr;

use actix_web::http::StatusCode;
use actix_web::web::{Data as WebData, Json as ExtJson, Path as ExtPath, Query as ExtQuery};
use actix_web::{HttpResponse, Result as ActixResult};
use rust_decimal::Decimal;

use bazaar_common::api::dto::ListWindowDto;
use bazaar_common::logging::{app_log_event, AppLogLevel};

use super::dto::{DiscountReqDto, DiscountRespDto, ErrorRespDto, MemberPromotionReqDto};
use super::{resp_error, resp_json, resp_repo_init_failure};
use crate::adapter::repository::app_repo_discount;
use crate::model::{DiscountCodeModel, DiscountKind, MemberPromotionModel};
use crate::usecase::{DiscountEditUseCase, DiscountUcError};
use crate::{AppAuthedClaim, AppSharedState};

async fn build_usecase(shr_state: &WebData<AppSharedState>) -> Result<DiscountEditUseCase, ()> {
    let logctx = shr_state.log_context();
    match app_repo_discount(shr_state.datastore()).await {
        Ok(repo) => Ok(DiscountEditUseCase { repo }),
        Err(e) => {
            app_log_event!(logctx, AppLogLevel::ERROR, "repo-init-error {:?}", e);
            Err(())
        }
    }
}

fn parse_decimal(label: &str, raw: &str, errors: &mut Vec<String>) -> Decimal {
    match Decimal::from_str(raw) {
        Ok(v) => v,
        Err(_e) => {
            errors.push(format!("{label} `{raw}` is not a decimal number"));
            Decimal::ZERO
        }
    }
}

fn discount_from_req(body: DiscountReqDto) -> Result<DiscountCodeModel, Vec<String>> {
    let mut errors = Vec::new();
    let kind = DiscountKind::try_from_raw(body.kind.as_str()).unwrap_or_else(|e| {
        errors.push(e.describe());
        DiscountKind::FixedAmount
    });
    let value = parse_decimal("value", body.value.as_str(), &mut errors);
    let min_order_total = body
        .min_order_total
        .as_deref()
        .map(|raw| parse_decimal("min_order_total", raw, &mut errors));
    let max_discount_amount = body
        .max_discount_amount
        .as_deref()
        .map(|raw| parse_decimal("max_discount_amount", raw, &mut errors));
    if !errors.is_empty() {
        return Err(errors);
    }
    Ok(DiscountCodeModel {
        code: body.code,
        kind,
        value,
        min_order_total,
        max_discount_amount,
        usage_limit: body.usage_limit,
        times_used: 0,
        starts_at: body.starts_at,
        expires_at: body.expires_at,
        member_only: body.member_only,
    })
} // end of fn discount_from_req

fn discount_error_response(
    uce: DiscountUcError,
    shr_state: &WebData<AppSharedState>,
) -> HttpResponse {
    match uce {
        DiscountUcError::ValidationFailure(detail) => resp_error(
            StatusCode::BAD_REQUEST,
            ErrorRespDto::with_detail(
                "VALIDATION_ERROR",
                "discount rejected by validation".to_string(),
                detail,
            ),
        ),
        DiscountUcError::DuplicateCode(code) => resp_error(
            StatusCode::CONFLICT,
            ErrorRespDto::new("DUPLICATE_CODE", format!("discount `{code}` already exists")),
        ),
        DiscountUcError::NotFound => resp_error(
            StatusCode::NOT_FOUND,
            ErrorRespDto::new("NOT_FOUND", "discount does not exist".to_string()),
        ),
        DiscountUcError::DataStoreError(e) => {
            let logctx = shr_state.log_context();
            app_log_event!(logctx, AppLogLevel::ERROR, "{:?}", e);
            resp_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorRespDto::new("INTERNAL_ERROR", "data store failure".to_string()),
            )
        }
    }
}

pub(super) async fn create_discount(
    req_body: ExtJson<DiscountReqDto>,
    _authed_claim: AppAuthedClaim,
    shr_state: WebData<AppSharedState>,
) -> ActixResult<HttpResponse> {
    let Ok(uc) = build_usecase(&shr_state).await else {
        return Ok(resp_repo_init_failure());
    };
    let model = match discount_from_req(req_body.into_inner()) {
        Ok(v) => v,
        Err(detail) => {
            return Ok(resp_error(
                StatusCode::BAD_REQUEST,
                ErrorRespDto::with_detail(
                    "VALIDATION_ERROR",
                    "discount rejected by validation".to_string(),
                    detail,
                ),
            ))
        }
    };
    let resp = match uc.create_discount(model).await {
        Ok(saved) => resp_json(StatusCode::CREATED, &DiscountRespDto::from(saved)),
        Err(uce) => discount_error_response(uce, &shr_state),
    };
    Ok(resp)
}

pub(super) async fn edit_discount(
    path: ExtPath<String>,
    req_body: ExtJson<DiscountReqDto>,
    _authed_claim: AppAuthedClaim,
    shr_state: WebData<AppSharedState>,
) -> ActixResult<HttpResponse> {
    let Ok(uc) = build_usecase(&shr_state).await else {
        return Ok(resp_repo_init_failure());
    };
    let model = match discount_from_req(req_body.into_inner()) {
        Ok(v) => v,
        Err(detail) => {
            return Ok(resp_error(
                StatusCode::BAD_REQUEST,
                ErrorRespDto::with_detail(
                    "VALIDATION_ERROR",
                    "discount rejected by validation".to_string(),
                    detail,
                ),
            ))
        }
    };
    let resp = match uc.update_discount(path.as_str(), model).await {
        Ok(saved) => resp_json(StatusCode::OK, &DiscountRespDto::from(saved)),
        Err(uce) => discount_error_response(uce, &shr_state),
    };
    Ok(resp)
}

pub(super) async fn list_discounts(
    window: ExtQuery<ListWindowDto>,
    _authed_claim: AppAuthedClaim,
    shr_state: WebData<AppSharedState>,
) -> ActixResult<HttpResponse> {
    let Ok(uc) = build_usecase(&shr_state).await else {
        return Ok(resp_repo_init_failure());
    };
    let resp = match uc.list_discounts(window.into_inner()).await {
        Ok(items) => {
            let out = items
                .into_iter()
                .map(DiscountRespDto::from)
                .collect::<Vec<_>>();
            resp_json(StatusCode::OK, &out)
        }
        Err(uce) => discount_error_response(uce, &shr_state),
    };
    Ok(resp)
}

pub(super) async fn save_member_promotion(
    req_body: ExtJson<MemberPromotionReqDto>,
    _authed_claim: AppAuthedClaim,
    shr_state: WebData<AppSharedState>,
) -> ActixResult<HttpResponse> {
    let Ok(uc) = build_usecase(&shr_state).await else {
        return Ok(resp_repo_init_failure());
    };
    let body = req_body.into_inner();
    let mut errors = Vec::new();
    let regular_price = parse_decimal("regular_price", body.regular_price.as_str(), &mut errors);
    let member_price = parse_decimal("member_price", body.member_price.as_str(), &mut errors);
    if !errors.is_empty() {
        return Ok(resp_error(
            StatusCode::BAD_REQUEST,
            ErrorRespDto::with_detail(
                "VALIDATION_ERROR",
                "member promotion rejected by validation".to_string(),
                errors,
            ),
        ));
    }
    let promo = MemberPromotionModel {
        product_id: body.product_id,
        regular_price,
        member_price,
        starts_at: body.starts_at,
        expires_at: body.expires_at,
    };
    let resp = match uc.save_member_promotion(promo).await {
        Ok(()) => HttpResponse::NoContent().finish(),
        Err(uce) => discount_error_response(uce, &shr_state),
    };
    Ok(resp)
} // end of fn save_member_promotion
