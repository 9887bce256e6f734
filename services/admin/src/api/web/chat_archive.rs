use actix_web::http::StatusCode;
use actix_web::web::{Data as WebData, Json as ExtJson, Query as ExtQuery};
use actix_web::{HttpResponse, Result as ActixResult};

use bazaar_common::api::dto::ListWindowDto;
use bazaar_common::logging::{app_log_event, AppLogLevel};

use super::dto::{
    ArchiveSessionsReqDto, ArchiveSessionsRespDto, ArchiveStatsRespDto, ChatSessionRespDto,
    ErrorRespDto, RestoreSessionsReqDto, RestoreSessionsRespDto,
};
use super::{resp_error, resp_json, resp_repo_init_failure};
use crate::adapter::repository::app_repo_chat_archive;
use crate::usecase::{ArchiveTaskConfig, ChatArchiveUcError, ChatArchiveUseCase};
use crate::{AppAuthedClaim, AppSharedState};

pub(super) async fn build_usecase(
    shr_state: &WebData<AppSharedState>,
) -> Result<ChatArchiveUseCase, ()> {
    let logctx = shr_state.log_context();
    match app_repo_chat_archive(shr_state.datastore()).await {
        Ok(repo) => Ok(ChatArchiveUseCase {
            repo,
            cfg: ArchiveTaskConfig::default(),
            logctx,
        }),
        Err(e) => {
            let logctx_p = &logctx;
            app_log_event!(logctx_p, AppLogLevel::ERROR, "repo-init-error {:?}", e);
            Err(())
        }
    }
}

fn archive_error_response(
    uce: ChatArchiveUcError,
    shr_state: &WebData<AppSharedState>,
) -> HttpResponse {
    match uce {
        ChatArchiveUcError::ValidationFailure(detail) => resp_error(
            StatusCode::BAD_REQUEST,
            ErrorRespDto::with_detail(
                "VALIDATION_ERROR",
                "request rejected by validation".to_string(),
                detail,
            ),
        ),
        ChatArchiveUcError::NoneEligible => resp_error(
            StatusCode::BAD_REQUEST,
            ErrorRespDto::new(
                "NONE_ELIGIBLE",
                "no session is eligible for restore, retention windows elapsed".to_string(),
            ),
        ),
        ChatArchiveUcError::DataStoreError(e) => {
            let logctx = shr_state.log_context();
            app_log_event!(logctx, AppLogLevel::ERROR, "{:?}", e);
            resp_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorRespDto::new("INTERNAL_ERROR", "data store failure".to_string()),
            )
        }
    }
}

pub(super) async fn list_archived_sessions(
    window: ExtQuery<ListWindowDto>,
    _authed_claim: AppAuthedClaim,
    shr_state: WebData<AppSharedState>,
) -> ActixResult<HttpResponse> {
    let Ok(uc) = build_usecase(&shr_state).await else {
        return Ok(resp_repo_init_failure());
    };
    let resp = match uc.list_archived(window.into_inner()).await {
        Ok(sessions) => {
            let out = sessions
                .into_iter()
                .map(ChatSessionRespDto::from)
                .collect::<Vec<_>>();
            resp_json(StatusCode::OK, &out)
        }
        Err(uce) => archive_error_response(uce, &shr_state),
    };
    Ok(resp)
}

pub(super) async fn read_archive_stats(
    _authed_claim: AppAuthedClaim,
    shr_state: WebData<AppSharedState>,
) -> ActixResult<HttpResponse> {
    let Ok(uc) = build_usecase(&shr_state).await else {
        return Ok(resp_repo_init_failure());
    };
    let resp = match uc.stats().await {
        Ok(stats) => resp_json(StatusCode::OK, &ArchiveStatsRespDto::from(stats)),
        Err(uce) => archive_error_response(uce, &shr_state),
    };
    Ok(resp)
}

pub(super) async fn archive_chat_sessions(
    req_body: ExtJson<ArchiveSessionsReqDto>,
    _authed_claim: AppAuthedClaim,
    shr_state: WebData<AppSharedState>,
) -> ActixResult<HttpResponse> {
    let Ok(uc) = build_usecase(&shr_state).await else {
        return Ok(resp_repo_init_failure());
    };
    let body = req_body.into_inner();
    let result = uc
        .archive_sessions(
            body.session_ids.as_slice(),
            body.reason.as_str(),
            body.scheduled_purge_date,
        )
        .await;
    let resp = match result {
        Ok(outcome) => {
            let out = ArchiveSessionsRespDto {
                success: outcome.errors.is_empty(),
                num_archived: outcome.num_archived,
                num_skipped: outcome.num_skipped,
                errors: outcome.errors,
            };
            resp_json(StatusCode::OK, &out)
        }
        Err(uce) => archive_error_response(uce, &shr_state),
    };
    Ok(resp)
} // end of fn archive_chat_sessions

pub(super) async fn restore_chat_sessions(
    req_body: ExtJson<RestoreSessionsReqDto>,
    _authed_claim: AppAuthedClaim,
    shr_state: WebData<AppSharedState>,
) -> ActixResult<HttpResponse> {
    let Ok(uc) = build_usecase(&shr_state).await else {
        return Ok(resp_repo_init_failure());
    };
    let body = req_body.into_inner();
    let result = uc
        .restore_sessions(
            body.session_ids.as_slice(),
            body.reason.as_str(),
            body.restore_to.as_deref(),
        )
        .await;
    let resp = match result {
        Ok(outcome) => {
            let out = RestoreSessionsRespDto {
                success: true,
                num_restored: outcome.num_restored,
                rejected: outcome.rejected,
            };
            resp_json(StatusCode::OK, &out)
        }
        Err(uce) => archive_error_response(uce, &shr_state),
    };
    Ok(resp)
} // end of fn restore_chat_sessions
