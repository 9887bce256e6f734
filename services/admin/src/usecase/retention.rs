use std::sync::Arc;

use chrono::Utc;

use bazaar_common::logging::{app_log_event, AppLogContext, AppLogLevel};

use super::archive_chat::{ChatArchiveUcError, ChatArchiveUseCase};
use crate::adapter::repository::AppRepoError;
use crate::model::{
    ComplianceReportModel, RetentionJobModel, RetentionPolicy, RetentionPolicySet,
    RetentionReportModel, NEAR_DEADLINE_MARGIN_DAYS,
};

pub enum RetentionUcError {
    UnknownPolicy(String),
    DataStoreError(AppRepoError),
}

impl From<AppRepoError> for RetentionUcError {
    fn from(value: AppRepoError) -> Self {
        Self::DataStoreError(value)
    }
}

/// wraps the archive manager with named, schedulable policies, every run
/// leaves a job record behind
pub struct RetentionPolicyUseCase {
    pub archive_uc: ChatArchiveUseCase,
    pub policies: RetentionPolicySet,
    pub logctx: Arc<AppLogContext>,
}

impl RetentionPolicyUseCase {
    fn resolve_policy(&self, name: Option<&str>) -> Result<&RetentionPolicy, RetentionUcError> {
        match name {
            Some(n) => self
                .policies
                .find(n)
                .ok_or(RetentionUcError::UnknownPolicy(n.to_string())),
            None => Ok(self.policies.fallback()),
        }
    }

    /// execution failures land on the returned job record with status
    /// FAILED, they are never rethrown and never retried automatically
    pub async fn execute_policy(
        &self,
        name: Option<&str>,
    ) -> Result<RetentionJobModel, RetentionUcError> {
        let policy = self.resolve_policy(name)?.clone();
        let now = Utc::now();
        let mut job = RetentionJobModel::start(policy.name.as_str(), now);
        if !policy.enabled {
            // disabled policies complete with zero counts, cron callers
            // stay idempotent
            job.complete(Utc::now(), 0, 0);
            self.persist_job(&job).await;
            return Ok(job);
        }
        let archive_result = self
            .archive_uc
            .auto_archive_with(
                policy.archive_cutoff(now),
                policy.scope,
                self.archive_uc.cfg.auto_archive_limit,
            )
            .await;
        let num_archived = match archive_result {
            Ok(outcome) => {
                job.errors.extend(outcome.errors.clone());
                outcome.num_archived
            }
            Err(e) => {
                job.fail(Utc::now(), Self::describe_step_err("auto-archive", e));
                self.persist_job(&job).await;
                return Ok(job);
            }
        };
        let purge_result = self
            .archive_uc
            .purge_with(
                policy.purge_cutoff(now),
                policy.scope,
                self.archive_uc.cfg.purge_batch_limit,
            )
            .await;
        let num_purged = match purge_result {
            Ok(n) => n,
            Err(e) => {
                job.num_archived = num_archived;
                job.fail(Utc::now(), Self::describe_step_err("purge", e));
                self.persist_job(&job).await;
                return Ok(job);
            }
        };
        job.complete(Utc::now(), num_archived, num_purged);
        self.persist_job(&job).await;
        Ok(job)
    } // end of fn execute_policy

    fn describe_step_err(step: &str, e: ChatArchiveUcError) -> String {
        match e {
            ChatArchiveUcError::DataStoreError(inner) => format!("{step}: {inner:?}"),
            ChatArchiveUcError::ValidationFailure(msgs) => {
                format!("{step}: {}", msgs.join("; "))
            }
            ChatArchiveUcError::NoneEligible => format!("{step}: nothing eligible"),
        }
    }

    async fn persist_job(&self, job: &RetentionJobModel) {
        if let Err(e) = self.archive_uc.repo.save_retention_job(job).await {
            let logctx_p = &self.logctx;
            app_log_event!(logctx_p, AppLogLevel::ERROR, "job:{}, {:?}", job.job_id.as_str(), e);
        }
    }

    pub async fn check_compliance(
        &self,
        name: Option<&str>,
    ) -> Result<ComplianceReportModel, RetentionUcError> {
        let policy = self.resolve_policy(name)?;
        let now = Utc::now();
        let snapshot = self
            .archive_uc
            .repo
            .compliance_counts(
                policy.archive_cutoff(now),
                policy.purge_cutoff(now),
                NEAR_DEADLINE_MARGIN_DAYS,
                policy.scope,
            )
            .await?;
        Ok(ComplianceReportModel::evaluate(policy, now, snapshot))
    }

    pub async fn generate_report(
        &self,
        name: Option<&str>,
    ) -> Result<RetentionReportModel, RetentionUcError> {
        let policy = self.resolve_policy(name)?;
        let now = Utc::now();
        let stats = self.archive_uc.repo.summarize(policy.purge_cutoff(now)).await?;
        let snapshot = self
            .archive_uc
            .repo
            .compliance_counts(
                policy.archive_cutoff(now),
                policy.purge_cutoff(now),
                NEAR_DEADLINE_MARGIN_DAYS,
                policy.scope,
            )
            .await?;
        Ok(RetentionReportModel::assemble(
            policy,
            now,
            stats.total_sessions,
            stats.num_archived,
            snapshot.overdue_archive as u64,
            snapshot.overdue_purge as u64,
        ))
    } // end of fn generate_report
} // end of impl RetentionPolicyUseCase
