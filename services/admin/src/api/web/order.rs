use actix_web::http::StatusCode;
use actix_web::web::{Data as WebData, Json as ExtJson, Path as ExtPath};
use actix_web::{HttpResponse, Result as ActixResult};

use bazaar_common::logging::{app_log_event, AppLogLevel};

use super::dto::{ErrorRespDto, OrderPatchReqDto, OrderRespDto};
use super::{resp_error, resp_json, resp_repo_init_failure};
use crate::adapter::repository::app_repo_order;
use crate::usecase::{OrderMgtUcError, OrderMgtUseCase};
use crate::{AppAuthedClaim, AppSharedState};

async fn build_usecase(shr_state: &WebData<AppSharedState>) -> Result<OrderMgtUseCase, ()> {
    let logctx = shr_state.log_context();
    let logctx_p = &logctx;
    match app_repo_order(shr_state.datastore()).await {
        Ok(repo) => Ok(OrderMgtUseCase { repo }),
        Err(e) => {
            app_log_event!(logctx_p, AppLogLevel::ERROR, "repo-init-error {:?}", e);
            Err(())
        }
    }
}

fn order_mgt_error_response(
    uce: OrderMgtUcError,
    shr_state: &WebData<AppSharedState>,
) -> HttpResponse {
    match uce {
        OrderMgtUcError::OrderNotFound => resp_error(
            StatusCode::NOT_FOUND,
            ErrorRespDto::new("NOT_FOUND", "order does not exist".to_string()),
        ),
        OrderMgtUcError::InvalidStatusInput(raw) => resp_error(
            StatusCode::BAD_REQUEST,
            ErrorRespDto::new("VALIDATION_ERROR", format!("unknown order status `{raw}`")),
        ),
        OrderMgtUcError::InvalidTransition { from, to } => resp_error(
            StatusCode::BAD_REQUEST,
            ErrorRespDto::new(
                "INVALID_ORDER_STATUS",
                format!(
                    "transition {} -> {} requires an admin override with a reason",
                    from.as_str(),
                    to.as_str()
                ),
            ),
        ),
        OrderMgtUcError::MissingOverrideReason => resp_error(
            StatusCode::BAD_REQUEST,
            ErrorRespDto::new(
                "VALIDATION_ERROR",
                "admin override requires a reason".to_string(),
            ),
        ),
        OrderMgtUcError::DeleteNotAllowed(s) => resp_error(
            StatusCode::BAD_REQUEST,
            ErrorRespDto::new(
                "INVALID_ORDER_STATUS",
                format!(
                    "only PENDING or CANCELLED orders can be deleted, current status {}",
                    s.as_str()
                ),
            ),
        ),
        OrderMgtUcError::DataStoreError(e) => {
            let logctx = shr_state.log_context();
            app_log_event!(logctx, AppLogLevel::ERROR, "{:?}", e);
            resp_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorRespDto::new("INTERNAL_ERROR", "data store failure".to_string()),
            )
        }
    }
} // end of fn order_mgt_error_response

pub(super) async fn read_order(
    path: ExtPath<String>,
    _authed_claim: AppAuthedClaim,
    shr_state: WebData<AppSharedState>,
) -> ActixResult<HttpResponse> {
    let Ok(uc) = build_usecase(&shr_state).await else {
        return Ok(resp_repo_init_failure());
    };
    let resp = match uc.read_order(path.as_str()).await {
        Ok(order) => resp_json(StatusCode::OK, &OrderRespDto::from(order)),
        Err(uce) => order_mgt_error_response(uce, &shr_state),
    };
    Ok(resp)
}

pub(super) async fn update_order(
    path: ExtPath<String>,
    req_body: ExtJson<OrderPatchReqDto>,
    _authed_claim: AppAuthedClaim,
    shr_state: WebData<AppSharedState>,
) -> ActixResult<HttpResponse> {
    let Ok(uc) = build_usecase(&shr_state).await else {
        return Ok(resp_repo_init_failure());
    };
    let body = req_body.into_inner();
    let result = uc
        .update_status(
            path.as_str(),
            body.status.as_str(),
            body.overridden_by_admin.unwrap_or(false),
            body.admin_override_reason,
        )
        .await;
    let resp = match result {
        Ok(order) => resp_json(StatusCode::OK, &OrderRespDto::from(order)),
        Err(uce) => order_mgt_error_response(uce, &shr_state),
    };
    Ok(resp)
}

pub(super) async fn discard_order(
    path: ExtPath<String>,
    _authed_claim: AppAuthedClaim,
    shr_state: WebData<AppSharedState>,
) -> ActixResult<HttpResponse> {
    let Ok(uc) = build_usecase(&shr_state).await else {
        return Ok(resp_repo_init_failure());
    };
    let resp = match uc.discard(path.as_str()).await {
        Ok(()) => HttpResponse::NoContent().finish(),
        Err(uce) => order_mgt_error_response(uce, &shr_state),
    };
    Ok(resp)
}
