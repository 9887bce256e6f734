use actix_web::http::StatusCode;
use actix_web::web::{Data as WebData, Json as ExtJson};
use actix_web::{HttpResponse, Result as ActixResult};

use bazaar_common::logging::{app_log_event, AppLogLevel};

use super::dto::{ChannelRespDto, ErrorRespDto, SaveChannelReqDto};
use super::{resp_error, resp_json, resp_repo_init_failure};
use crate::adapter::repository::app_repo_settings;
use crate::usecase::{NotifyCfgUcError, NotifyCfgUseCase};
use crate::{AppAuthedClaim, AppSharedState};

async fn build_usecase(shr_state: &WebData<AppSharedState>) -> Result<NotifyCfgUseCase, ()> {
    let logctx = shr_state.log_context();
    match app_repo_settings(shr_state.datastore()).await {
        Ok(repo) => Ok(NotifyCfgUseCase {
            repo,
            notifier: shr_state.chat_notifier(),
        }),
        Err(e) => {
            app_log_event!(logctx, AppLogLevel::ERROR, "repo-init-error {:?}", e);
            Err(())
        }
    }
}

fn notify_error_response(
    uce: NotifyCfgUcError,
    shr_state: &WebData<AppSharedState>,
) -> HttpResponse {
    match uce {
        NotifyCfgUcError::ValidationFailure(detail) => resp_error(
            StatusCode::BAD_REQUEST,
            ErrorRespDto::with_detail(
                "VALIDATION_ERROR",
                "channel rejected by validation".to_string(),
                detail,
            ),
        ),
        NotifyCfgUcError::TestMessageFailed(detail) => resp_error(
            StatusCode::BAD_GATEWAY,
            ErrorRespDto::new("TEST_MESSAGE_FAILED", detail),
        ),
        NotifyCfgUcError::DataStoreError(e) => {
            let logctx = shr_state.log_context();
            app_log_event!(logctx, AppLogLevel::ERROR, "{:?}", e);
            resp_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorRespDto::new("INTERNAL_ERROR", "data store failure".to_string()),
            )
        }
    }
}

pub(super) async fn read_notify_channels(
    _authed_claim: AppAuthedClaim,
    shr_state: WebData<AppSharedState>,
) -> ActixResult<HttpResponse> {
    let Ok(uc) = build_usecase(&shr_state).await else {
        return Ok(resp_repo_init_failure());
    };
    let resp = match uc.read_channels().await {
        Ok(channels) => {
            let out = channels
                .into_iter()
                .map(ChannelRespDto::from)
                .collect::<Vec<_>>();
            resp_json(StatusCode::OK, &out)
        }
        Err(uce) => notify_error_response(uce, &shr_state),
    };
    Ok(resp)
}

pub(super) async fn save_notify_channel(
    req_body: ExtJson<SaveChannelReqDto>,
    _authed_claim: AppAuthedClaim,
    shr_state: WebData<AppSharedState>,
) -> ActixResult<HttpResponse> {
    let Ok(uc) = build_usecase(&shr_state).await else {
        return Ok(resp_repo_init_failure());
    };
    let body = req_body.into_inner();
    let result = uc
        .save_channel(
            body.purpose.as_str(),
            body.chat_id,
            body.enabled,
            body.send_test_message.unwrap_or(false),
        )
        .await;
    let resp = match result {
        Ok(channel) => resp_json(StatusCode::OK, &ChannelRespDto::from(channel)),
        Err(uce) => notify_error_response(uce, &shr_state),
    };
    Ok(resp)
} // end of fn save_notify_channel
