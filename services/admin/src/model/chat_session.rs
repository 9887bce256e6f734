use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::{json, Map as JsnMap, Value as JsnVal};

use super::RetentionScope;

pub const METADATA_KEY_ORIGINAL_STATUS: &str = "original_status";
pub const METADATA_KEY_ARCHIVE_REASON: &str = "archive_reason";
pub const METADATA_KEY_RESTORATIONS: &str = "restorations";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatSessionStatus {
    Active,
    Idle,
    Ended,
    Archived,
}

impl ChatSessionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Idle => "idle",
            Self::Ended => "ended",
            Self::Archived => "archived",
        }
    }

    pub fn try_from_raw(raw: &str) -> Result<Self, ChatSessionError> {
        match raw {
            "active" => Ok(Self::Active),
            "idle" => Ok(Self::Idle),
            "ended" => Ok(Self::Ended),
            "archived" => Ok(Self::Archived),
            _others => Err(ChatSessionError::CorruptedStatus(raw.to_string())),
        }
    }
} // end of impl ChatSessionStatus

#[derive(Debug, PartialEq)]
pub enum ChatSessionError {
    NotArchived(String),
    RetentionElapsed(String),
    InvalidRestoreTarget(ChatSessionStatus),
    CorruptedStatus(String),
    CorruptedMetadata(String),
}

pub struct ChatSessionModel {
    pub session_id: String,
    pub status: ChatSessionStatus,
    pub usr_id: Option<u32>,
    pub guest_email: Option<String>,
    pub created_at: DateTime<Utc>,
    pub last_activity: DateTime<Utc>,
    pub archived_at: Option<DateTime<Utc>>,
    pub retention_until: Option<DateTime<Utc>>,
    // free-form blob carrying the status before archiving and the
    // restoration history, persisted as serialised JSON
    pub metadata: JsnVal,
}

impl ChatSessionModel {
    fn metadata_object(&mut self) -> &mut JsnMap<String, JsnVal> {
        if !self.metadata.is_object() {
            self.metadata = JsnVal::Object(JsnMap::new());
        }
        self.metadata.as_object_mut().unwrap()
    }

    /// returns false when the session already sits in the archive, the
    /// caller counts such sessions as skipped rather than failed
    pub fn archive(
        &mut self,
        now: DateTime<Utc>,
        reason: &str,
        retention_until: DateTime<Utc>,
    ) -> bool {
        if self.status == ChatSessionStatus::Archived {
            return false;
        }
        let prior = self.status.as_str();
        let obj = self.metadata_object();
        obj.insert(
            METADATA_KEY_ORIGINAL_STATUS.to_string(),
            JsnVal::String(prior.to_string()),
        );
        obj.insert(
            METADATA_KEY_ARCHIVE_REASON.to_string(),
            JsnVal::String(reason.to_string()),
        );
        self.status = ChatSessionStatus::Archived;
        self.archived_at = Some(now);
        self.retention_until = Some(retention_until);
        true
    } // end of fn archive

    pub fn within_retention(&self, now: DateTime<Utc>) -> bool {
        self.retention_until.map_or(false, |t| t > now)
    }

    pub fn restore(
        &mut self,
        now: DateTime<Utc>,
        reason: &str,
        target: Option<ChatSessionStatus>,
    ) -> Result<ChatSessionStatus, ChatSessionError> {
        if self.status != ChatSessionStatus::Archived {
            return Err(ChatSessionError::NotArchived(self.session_id.clone()));
        }
        if !self.within_retention(now) {
            return Err(ChatSessionError::RetentionElapsed(self.session_id.clone()));
        }
        let stored_prior = self
            .metadata
            .get(METADATA_KEY_ORIGINAL_STATUS)
            .and_then(|v| v.as_str())
            .and_then(|raw| ChatSessionStatus::try_from_raw(raw).ok());
        let dst = target
            .or(stored_prior)
            .unwrap_or(ChatSessionStatus::Ended);
        if dst == ChatSessionStatus::Archived {
            return Err(ChatSessionError::InvalidRestoreTarget(dst));
        }
        let record = json!({
            "at": now.to_rfc3339_opts(SecondsFormat::Secs, true),
            "reason": reason,
            "restored_to": dst.as_str(),
        });
        let obj = self.metadata_object();
        match obj.get_mut(METADATA_KEY_RESTORATIONS) {
            Some(JsnVal::Array(a)) => a.push(record),
            _others => {
                obj.insert(
                    METADATA_KEY_RESTORATIONS.to_string(),
                    JsnVal::Array(vec![record]),
                );
            }
        }
        self.status = dst;
        self.archived_at = None;
        self.retention_until = None;
        Ok(dst)
    } // end of fn restore

    pub fn purge_due(&self, cutoff: DateTime<Utc>) -> bool {
        self.status == ChatSessionStatus::Archived
            && self.archived_at.map_or(false, |t| t < cutoff)
    }

    pub fn matches_scope(&self, scope: &RetentionScope) -> bool {
        match scope {
            RetentionScope::All => true,
            RetentionScope::Guest => self.usr_id.is_none(),
            RetentionScope::Authenticated => self.usr_id.is_some(),
        }
    }
} // end of impl ChatSessionModel

#[derive(Debug, Default)]
pub struct ArchiveStatsModel {
    pub total_sessions: u64,
    pub num_active: u64,
    pub num_ended: u64,
    pub num_archived: u64,
    pub purge_eligible: u64,
    pub oldest_archived_at: Option<DateTime<Utc>>,
}
