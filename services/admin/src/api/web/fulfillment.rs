use actix_web::http::StatusCode;
use actix_web::web::{Data as WebData, Json as ExtJson, Path as ExtPath};
use actix_web::{HttpResponse, Result as ActixResult};

use bazaar_common::logging::{app_log_event, AppLogLevel};

use super::dto::{
    ErrorRespDto, FulfillOrderReqDto, FulfillOrderRespDto, PickupRespDto, TrackingRespDto,
};
use super::{resp_error, resp_json, resp_repo_init_failure};
use crate::adapter::repository::{app_repo_order, app_repo_settings};
use crate::usecase::{FulfillOrderRequest, FulfillOrderUcError, FulfillOrderUseCase};
use crate::{AppAuthedClaim, AppSharedState};

pub(super) async fn fulfill_order(
    path: ExtPath<String>,
    req_body: ExtJson<FulfillOrderReqDto>,
    _authed_claim: AppAuthedClaim,
    shr_state: WebData<AppSharedState>,
) -> ActixResult<HttpResponse> {
    let logctx = shr_state.log_context();
    let logctx_p = &logctx;
    let oid = path.into_inner();

    let repo = match app_repo_order(shr_state.datastore()).await {
        Ok(v) => v,
        Err(e) => {
            app_log_event!(logctx_p, AppLogLevel::ERROR, "repo-init-error {:?}", e);
            return Ok(resp_repo_init_failure());
        }
    };
    let settings_repo = match app_repo_settings(shr_state.datastore()).await {
        Ok(v) => v,
        Err(e) => {
            app_log_event!(logctx_p, AppLogLevel::ERROR, "repo-init-error {:?}", e);
            return Ok(resp_repo_init_failure());
        }
    };
    let uc = FulfillOrderUseCase {
        repo,
        settings_repo,
        aggregator: shr_state.shipment_aggregator(),
        mailer: shr_state.mail_sender(),
        notifier: shr_state.chat_notifier(),
        logctx: logctx.clone(),
    };
    let body = req_body.into_inner();
    let uc_req = FulfillOrderRequest {
        service_id: body.service_id,
        pickup_date: body.pickup_date,
        overridden_by_admin: body.overridden_by_admin.unwrap_or(false),
        admin_override_reason: body.admin_override_reason,
    };
    let resp = match uc.execute(oid.as_str(), uc_req).await {
        Ok(v) => {
            let out = FulfillOrderRespDto {
                success: true,
                tracking: TrackingRespDto {
                    tracking_number: v.tracking_number,
                    awb_number: v.awb_number,
                    awb_url: v.awb_url,
                    courier_name: v.courier_name,
                },
                pickup: PickupRespDto {
                    scheduled_date: v.pickup_date.format("%Y-%m-%d").to_string(),
                },
                aggregator_shipment_id: v.aggregator_order_no,
            };
            resp_json(StatusCode::OK, &out)
        }
        Err(uce) => fulfill_error_response(uce, logctx_p),
    };
    Ok(resp)
} // end of fn fulfill_order

fn fulfill_error_response(
    uce: FulfillOrderUcError,
    logctx_p: &std::sync::Arc<bazaar_common::logging::AppLogContext>,
) -> HttpResponse {
    match uce {
        FulfillOrderUcError::ValidationError(detail) => resp_error(
            StatusCode::BAD_REQUEST,
            ErrorRespDto::with_detail(
                "VALIDATION_ERROR",
                "request rejected by validation".to_string(),
                detail,
            ),
        ),
        FulfillOrderUcError::OrderNotFound => resp_error(
            StatusCode::NOT_FOUND,
            ErrorRespDto::new("NOT_FOUND", "order does not exist".to_string()),
        ),
        FulfillOrderUcError::InvalidOrderStatus(s) => resp_error(
            StatusCode::BAD_REQUEST,
            ErrorRespDto::new(
                "INVALID_ORDER_STATUS",
                format!("only PAID orders can be fulfilled, current status {}", s.as_str()),
            ),
        ),
        FulfillOrderUcError::AlreadyFulfilled => resp_error(
            StatusCode::BAD_REQUEST,
            ErrorRespDto::new(
                "ALREADY_FULFILLED",
                "order already carries tracking and airway-bill numbers".to_string(),
            ),
        ),
        FulfillOrderUcError::InvalidAddress => resp_error(
            StatusCode::BAD_REQUEST,
            ErrorRespDto::new(
                "INVALID_ADDRESS",
                "order has no usable shipping address".to_string(),
            ),
        ),
        FulfillOrderUcError::InvalidWeight(w) => resp_error(
            StatusCode::BAD_REQUEST,
            ErrorRespDto::new(
                "INVALID_WEIGHT",
                format!("shipping weight must be positive, stored value {w}"),
            ),
        ),
        FulfillOrderUcError::NotConfigured => resp_error(
            StatusCode::BAD_REQUEST,
            ErrorRespDto::new(
                "NOT_CONFIGURED",
                "pickup address missing from business profile".to_string(),
            ),
        ),
        FulfillOrderUcError::InsufficientBalance(balance) => {
            let mut body = ErrorRespDto::new(
                "INSUFFICIENT_BALANCE",
                "courier aggregator credit too low for this shipment".to_string(),
            );
            body.current_balance = Some(balance.to_string());
            resp_error(StatusCode::PAYMENT_REQUIRED, body)
        }
        FulfillOrderUcError::CreateShipmentFailure(detail) => {
            app_log_event!(logctx_p, AppLogLevel::ERROR, "{}", detail.as_str());
            resp_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorRespDto::new("SHIPMENT_CREATE_FAILED", detail),
            )
        }
        FulfillOrderUcError::PayShipmentFailure {
            aggregator_order_no,
            detail,
        } => {
            app_log_event!(logctx_p, AppLogLevel::ERROR, "{}", detail.as_str());
            let mut body = ErrorRespDto::new("SHIPMENT_PAYMENT_FAILED", detail);
            body.aggregator_order_no = Some(aggregator_order_no);
            resp_error(StatusCode::INTERNAL_SERVER_ERROR, body)
        }
        FulfillOrderUcError::DataStoreError(e) => {
            app_log_event!(logctx_p, AppLogLevel::ERROR, "{:?}", e);
            resp_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorRespDto::new("INTERNAL_ERROR", "data store failure".to_string()),
            )
        }
    }
} // end of fn fulfill_error_response
