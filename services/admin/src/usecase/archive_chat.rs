use std::boxed::Box;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};

use bazaar_common::api::dto::ListWindowDto;
use bazaar_common::logging::{app_log_event, AppLogContext, AppLogLevel};

use crate::adapter::repository::{AbstractChatArchiveRepo, AppRepoError};
use crate::model::{
    ArchiveStatsModel, ChatSessionError, ChatSessionModel, ChatSessionStatus, RetentionScope,
};

/// thresholds and batch caps of the archive manager, injected at
/// construction so tests can shrink them
#[derive(Clone)]
pub struct ArchiveTaskConfig {
    pub batch_size: usize,
    pub max_ids_per_request: usize,
    pub default_retention_days: u16,
    pub auto_archive_after_days: u16,
    pub purge_batch_limit: u32,
    pub auto_archive_limit: u32,
}

impl Default for ArchiveTaskConfig {
    fn default() -> Self {
        Self {
            batch_size: 100,
            max_ids_per_request: 1000,
            default_retention_days: 365,
            auto_archive_after_days: 90,
            purge_batch_limit: 100,
            auto_archive_limit: 1000,
        }
    }
}

pub enum ChatArchiveUcError {
    ValidationFailure(Vec<String>),
    // a restore request where no session survives the retention check
    NoneEligible,
    DataStoreError(AppRepoError),
}

impl From<AppRepoError> for ChatArchiveUcError {
    fn from(value: AppRepoError) -> Self {
        Self::DataStoreError(value)
    }
}

#[derive(Default)]
pub struct ArchiveOutcome {
    pub num_archived: u32,
    pub num_skipped: u32,
    // one entry per failed batch, other batches keep going
    pub errors: Vec<String>,
}

pub struct RestoreOutcome {
    pub num_restored: u32,
    pub rejected: Vec<String>,
}

pub struct ChatArchiveUseCase {
    pub repo: Box<dyn AbstractChatArchiveRepo>,
    pub cfg: ArchiveTaskConfig,
    pub logctx: Arc<AppLogContext>,
}

impl ChatArchiveUseCase {
    /// request-shape checks, returns plain sentences for direct rendering
    /// in the admin UI, never panics
    pub fn validate_archive_request(&self, ids: &[String]) -> Vec<String> {
        let mut errors = Vec::new();
        if ids.is_empty() {
            errors.push("no session IDs given".to_string());
        }
        if ids.len() > self.cfg.max_ids_per_request {
            errors.push(format!(
                "{} session IDs exceed the limit of {} per request",
                ids.len(),
                self.cfg.max_ids_per_request
            ));
        }
        if let Some(idx) = ids.iter().position(|i| i.trim().is_empty()) {
            errors.push(format!("blank session ID at position {idx}"));
        }
        errors
    }

    pub fn validate_restore_request(&self, ids: &[String], restore_to: Option<&str>) -> Vec<String> {
        let mut errors = self.validate_archive_request(ids);
        if let Some(raw) = restore_to {
            match ChatSessionStatus::try_from_raw(raw) {
                Ok(ChatSessionStatus::Archived) => {
                    errors.push("restoring into the archived state is meaningless".to_string())
                }
                Ok(_legit) => {}
                Err(_e) => errors.push(format!("unknown target status `{raw}`")),
            }
        }
        errors
    }

    pub async fn archive_sessions(
        &self,
        ids: &[String],
        reason: &str,
        scheduled_purge_date: Option<DateTime<Utc>>,
    ) -> Result<ArchiveOutcome, ChatArchiveUcError> {
        let errors = self.validate_archive_request(ids);
        if !errors.is_empty() {
            return Err(ChatArchiveUcError::ValidationFailure(errors));
        }
        let now = Utc::now();
        let retention_until = scheduled_purge_date
            .unwrap_or(now + Duration::days(self.cfg.default_retention_days as i64));
        let mut outcome = ArchiveOutcome::default();
        for chunk in ids.chunks(self.cfg.batch_size) {
            match self
                ._archive_one_batch(chunk, reason, retention_until, now)
                .await
            {
                Ok((archived, skipped)) => {
                    outcome.num_archived += archived;
                    outcome.num_skipped += skipped;
                }
                Err(e) => {
                    let logctx_p = &self.logctx;
                    app_log_event!(logctx_p, AppLogLevel::WARNING, "archive-batch, {:?}", e);
                    outcome.errors.push(format!(
                        "batch starting at session {} failed, {:?}",
                        chunk[0].as_str(),
                        e
                    ));
                }
            }
        }
        Ok(outcome)
    } // end of fn archive_sessions

    async fn _archive_one_batch(
        &self,
        chunk: &[String],
        reason: &str,
        retention_until: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Result<(u32, u32), AppRepoError> {
        let sessions = self.repo.fetch_sessions(chunk).await?;
        let mut skipped = (chunk.len() - sessions.len()) as u32;
        let mut dirty = Vec::new();
        for mut s in sessions {
            if s.archive(now, reason, retention_until) {
                dirty.push(s);
            } else {
                skipped += 1;
            }
        }
        self.repo.save_sessions(dirty.as_slice()).await?;
        Ok((dirty.len() as u32, skipped))
    }

    pub async fn restore_sessions(
        &self,
        ids: &[String],
        reason: &str,
        restore_to: Option<&str>,
    ) -> Result<RestoreOutcome, ChatArchiveUcError> {
        let errors = self.validate_restore_request(ids, restore_to);
        if !errors.is_empty() {
            return Err(ChatArchiveUcError::ValidationFailure(errors));
        }
        let target = restore_to.and_then(|raw| ChatSessionStatus::try_from_raw(raw).ok());
        let now = Utc::now();
        let sessions = self.repo.fetch_sessions(ids).await?;
        let mut restored = Vec::new();
        let mut rejected = Vec::new();
        for mut s in sessions {
            match s.restore(now, reason, target) {
                Ok(_dst) => restored.push(s),
                Err(e) => rejected.push(Self::describe_rejection(s.session_id.as_str(), e)),
            }
        }
        if restored.is_empty() {
            return Err(ChatArchiveUcError::NoneEligible);
        }
        self.repo.save_sessions(restored.as_slice()).await?;
        Ok(RestoreOutcome {
            num_restored: restored.len() as u32,
            rejected,
        })
    } // end of fn restore_sessions

    fn describe_rejection(session_id: &str, e: ChatSessionError) -> String {
        match e {
            ChatSessionError::NotArchived(_id) => format!("{session_id}: not archived"),
            ChatSessionError::RetentionElapsed(_id) => {
                format!("{session_id}: retention window elapsed, restore is no longer legal")
            }
            ChatSessionError::InvalidRestoreTarget(s) => {
                format!("{session_id}: `{}` is not a restorable state", s.as_str())
            }
            _others => format!("{session_id}: {_others:?}"),
        }
    }

    /// permanent removal of archives past their retention window, capped
    /// per invocation, messages vanish along with their session
    pub async fn purge_old_archives(&self) -> Result<u32, ChatArchiveUcError> {
        let cutoff = Utc::now() - Duration::days(self.cfg.default_retention_days as i64);
        self.purge_with(cutoff, RetentionScope::All, self.cfg.purge_batch_limit)
            .await
    }

    pub async fn purge_with(
        &self,
        cutoff: DateTime<Utc>,
        scope: RetentionScope,
        limit: u32,
    ) -> Result<u32, ChatArchiveUcError> {
        let sessions = self
            .repo
            .fetch_archived_before(cutoff, scope, limit)
            .await?;
        if sessions.is_empty() {
            return Ok(0);
        }
        let ids = sessions
            .into_iter()
            .map(|s| s.session_id)
            .collect::<Vec<_>>();
        let num = self.repo.purge_sessions(ids.as_slice()).await?;
        Ok(num)
    }

    pub async fn auto_archive_old_sessions(&self) -> Result<ArchiveOutcome, ChatArchiveUcError> {
        let cutoff = Utc::now() - Duration::days(self.cfg.auto_archive_after_days as i64);
        self.auto_archive_with(cutoff, RetentionScope::All, self.cfg.auto_archive_limit)
            .await
    }

    pub async fn auto_archive_with(
        &self,
        cutoff: DateTime<Utc>,
        scope: RetentionScope,
        limit: u32,
    ) -> Result<ArchiveOutcome, ChatArchiveUcError> {
        let now = Utc::now();
        let retention_until = now + Duration::days(self.cfg.default_retention_days as i64);
        let stale = self
            .repo
            .fetch_inactive_since(cutoff, scope, limit)
            .await?;
        let mut outcome = ArchiveOutcome::default();
        let mut dirty = Vec::new();
        for mut s in stale {
            if s.archive(now, "auto-archive, inactivity threshold", retention_until) {
                dirty.push(s);
            } else {
                outcome.num_skipped += 1;
            }
        }
        for batch in dirty.chunks(self.cfg.batch_size) {
            match self.repo.save_sessions(batch).await {
                Ok(()) => outcome.num_archived += batch.len() as u32,
                Err(e) => outcome.errors.push(format!(
                    "auto-archive batch starting at session {} failed, {:?}",
                    batch[0].session_id.as_str(),
                    e
                )),
            }
        }
        Ok(outcome)
    } // end of fn auto_archive_with

    pub async fn stats(&self) -> Result<ArchiveStatsModel, ChatArchiveUcError> {
        let cutoff = Utc::now() - Duration::days(self.cfg.default_retention_days as i64);
        let out = self.repo.summarize(cutoff).await?;
        Ok(out)
    }

    pub async fn list_archived(
        &self,
        window: ListWindowDto,
    ) -> Result<Vec<ChatSessionModel>, ChatArchiveUcError> {
        let out = self.repo.list_archived(window).await?;
        Ok(out)
    }
} // end of impl ChatArchiveUseCase
