use actix_web::http::StatusCode;
use actix_web::web::{Data as WebData, Json as ExtJson, Query as ExtQuery};
use actix_web::{HttpResponse, Result as ActixResult};

use bazaar_common::logging::{app_log_event, AppLogLevel};

use super::chat_archive::build_usecase as build_archive_usecase;
use super::dto::{
    ComplianceRespDto, ErrorRespDto, RetentionJobReqDto, RetentionJobRespDto, RetentionQueryDto,
    RetentionReportRespDto,
};
use super::{resp_error, resp_json, resp_repo_init_failure};
use crate::model::RetentionPolicySet;
use crate::usecase::{RetentionPolicyUseCase, RetentionUcError};
use crate::{AppAuthedClaim, AppSharedState};

async fn build_usecase(
    shr_state: &WebData<AppSharedState>,
) -> Result<RetentionPolicyUseCase, ()> {
    let archive_uc = build_archive_usecase(shr_state).await?;
    Ok(RetentionPolicyUseCase {
        archive_uc,
        policies: RetentionPolicySet::builtin(),
        logctx: shr_state.log_context(),
    })
}

fn retention_error_response(
    uce: RetentionUcError,
    shr_state: &WebData<AppSharedState>,
) -> HttpResponse {
    match uce {
        RetentionUcError::UnknownPolicy(name) => resp_error(
            StatusCode::NOT_FOUND,
            ErrorRespDto::new("NOT_FOUND", format!("no retention policy named `{name}`")),
        ),
        RetentionUcError::DataStoreError(e) => {
            let logctx = shr_state.log_context();
            app_log_event!(logctx, AppLogLevel::ERROR, "{:?}", e);
            resp_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorRespDto::new("INTERNAL_ERROR", "data store failure".to_string()),
            )
        }
    }
}

pub(super) async fn run_retention_policy(
    req_body: ExtJson<RetentionJobReqDto>,
    _authed_claim: AppAuthedClaim,
    shr_state: WebData<AppSharedState>,
) -> ActixResult<HttpResponse> {
    let Ok(uc) = build_usecase(&shr_state).await else {
        return Ok(resp_repo_init_failure());
    };
    let body = req_body.into_inner();
    let resp = match uc.execute_policy(body.policy.as_deref()).await {
        // a FAILED job is still HTTP 200, the failure is recorded on the
        // job record itself
        Ok(job) => resp_json(StatusCode::OK, &RetentionJobRespDto::from(job)),
        Err(uce) => retention_error_response(uce, &shr_state),
    };
    Ok(resp)
}

pub(super) async fn read_retention_compliance(
    query: ExtQuery<RetentionQueryDto>,
    _authed_claim: AppAuthedClaim,
    shr_state: WebData<AppSharedState>,
) -> ActixResult<HttpResponse> {
    let Ok(uc) = build_usecase(&shr_state).await else {
        return Ok(resp_repo_init_failure());
    };
    let resp = match uc.check_compliance(query.policy.as_deref()).await {
        Ok(report) => resp_json(StatusCode::OK, &ComplianceRespDto::from(report)),
        Err(uce) => retention_error_response(uce, &shr_state),
    };
    Ok(resp)
}

pub(super) async fn read_retention_report(
    query: ExtQuery<RetentionQueryDto>,
    _authed_claim: AppAuthedClaim,
    shr_state: WebData<AppSharedState>,
) -> ActixResult<HttpResponse> {
    let Ok(uc) = build_usecase(&shr_state).await else {
        return Ok(resp_repo_init_failure());
    };
    let resp = match uc.generate_report(query.policy.as_deref()).await {
        Ok(report) => resp_json(StatusCode::OK, &RetentionReportRespDto::from(report)),
        Err(uce) => retention_error_response(uce, &shr_state),
    };
    Ok(resp)
}
