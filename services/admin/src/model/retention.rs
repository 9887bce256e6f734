use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const NEAR_DEADLINE_MARGIN_DAYS: i64 = 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RetentionScope {
    All,
    Guest,
    Authenticated,
}

impl RetentionScope {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Guest => "guest",
            Self::Authenticated => "authenticated",
        }
    }
}

/// named rule set governing auto-archive and purge thresholds, held as
/// explicit configuration passed to the engine at construction time so
/// tests can vary the day counts
#[derive(Debug, Clone)]
pub struct RetentionPolicy {
    pub name: String,
    pub auto_archive_after_days: u16,
    pub purge_after_days: u16,
    pub scope: RetentionScope,
    pub enabled: bool,
}

impl RetentionPolicy {
    pub fn archive_cutoff(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        now - Duration::days(self.auto_archive_after_days as i64)
    }
    pub fn purge_cutoff(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        now - Duration::days(self.purge_after_days as i64)
    }
}

pub struct RetentionPolicySet(Vec<RetentionPolicy>);

impl RetentionPolicySet {
    /// built-in defaults, the first entry acts as the fallback policy
    pub fn builtin() -> Self {
        let data = vec![
            RetentionPolicy {
                name: "standard".to_string(),
                auto_archive_after_days: 90,
                purge_after_days: 455,
                scope: RetentionScope::All,
                enabled: true,
            },
            RetentionPolicy {
                name: "guest-minimal".to_string(),
                auto_archive_after_days: 30,
                purge_after_days: 120,
                scope: RetentionScope::Guest,
                enabled: true,
            },
            RetentionPolicy {
                name: "member-extended".to_string(),
                auto_archive_after_days: 180,
                purge_after_days: 730,
                scope: RetentionScope::Authenticated,
                enabled: false,
            },
        ];
        Self(data)
    }

    pub fn with_policies(data: Vec<RetentionPolicy>) -> Self {
        Self(data)
    }

    pub fn find(&self, name: &str) -> Option<&RetentionPolicy> {
        self.0.iter().find(|p| p.name.as_str() == name)
    }

    pub fn fallback(&self) -> &RetentionPolicy {
        self.0.first().expect("retention policy set must not be empty")
    }
} // end of impl RetentionPolicySet

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetentionJobStatus {
    Completed,
    Failed,
}

impl RetentionJobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Completed => "COMPLETED",
            Self::Failed => "FAILED",
        }
    }
}

/// record of one policy execution, persisted for observability, a failed
/// run keeps its error detail here and is never retried automatically
pub struct RetentionJobModel {
    pub job_id: String,
    pub policy_name: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub num_archived: u32,
    pub num_purged: u32,
    pub errors: Vec<String>,
    pub status: RetentionJobStatus,
}

impl RetentionJobModel {
    pub fn start(policy_name: &str, now: DateTime<Utc>) -> Self {
        Self {
            job_id: Uuid::new_v4().to_string(),
            policy_name: policy_name.to_string(),
            started_at: now,
            finished_at: None,
            num_archived: 0,
            num_purged: 0,
            errors: Vec::new(),
            status: RetentionJobStatus::Completed,
        }
    }

    pub fn complete(&mut self, now: DateTime<Utc>, num_archived: u32, num_purged: u32) {
        self.finished_at = Some(now);
        self.num_archived = num_archived;
        self.num_purged = num_purged;
        self.status = RetentionJobStatus::Completed;
    }

    pub fn fail(&mut self, now: DateTime<Utc>, detail: String) {
        self.finished_at = Some(now);
        self.errors.push(detail);
        self.status = RetentionJobStatus::Failed;
    }
} // end of impl RetentionJobModel

/// raw violation counts gathered by the repository layer
#[derive(Debug, Default, Clone)]
pub struct ComplianceSnapshot {
    pub total_sessions: u64,
    pub overdue_archive: u32,
    pub overdue_purge: u32,
    pub near_archive_deadline: u32,
    pub near_purge_deadline: u32,
}

pub struct ComplianceReportModel {
    pub checked_at: DateTime<Utc>,
    pub policy_name: String,
    pub snapshot: ComplianceSnapshot,
    pub score: u8,
    pub warnings: Vec<String>,
}

const PENALTY_OVERDUE_ARCHIVE: u32 = 2;
const PENALTY_OVERDUE_PURGE: u32 = 5;

impl ComplianceReportModel {
    pub fn evaluate(
        policy: &RetentionPolicy,
        now: DateTime<Utc>,
        snapshot: ComplianceSnapshot,
    ) -> Self {
        let penalty = snapshot.overdue_archive * PENALTY_OVERDUE_ARCHIVE
            + snapshot.overdue_purge * PENALTY_OVERDUE_PURGE;
        let score = 100u32.saturating_sub(penalty) as u8;
        let mut warnings = Vec::new();
        if snapshot.near_archive_deadline > 0 {
            warnings.push(format!(
                "{} session(s) reach the archive deadline within {} days",
                snapshot.near_archive_deadline, NEAR_DEADLINE_MARGIN_DAYS
            ));
        }
        if snapshot.near_purge_deadline > 0 {
            warnings.push(format!(
                "{} archived session(s) reach the purge deadline within {} days",
                snapshot.near_purge_deadline, NEAR_DEADLINE_MARGIN_DAYS
            ));
        }
        Self {
            checked_at: now,
            policy_name: policy.name.clone(),
            snapshot,
            score,
            warnings,
        }
    } // end of fn evaluate
}

pub struct RecommendedAction {
    pub operation: &'static str,
    pub run_after: DateTime<Utc>,
    pub estimated_sessions: u64,
}

pub struct RetentionReportModel {
    pub generated_at: DateTime<Utc>,
    pub policy_name: String,
    pub total_sessions: u64,
    pub num_archived: u64,
    pub archive_eligible: u64,
    pub purge_eligible: u64,
    pub next_actions: Vec<RecommendedAction>,
}

impl RetentionReportModel {
    /// the timestamps below are advisory, nothing is scheduled here,
    /// archiving is proposed for the next day and purging one week out
    pub fn assemble(
        policy: &RetentionPolicy,
        now: DateTime<Utc>,
        total_sessions: u64,
        num_archived: u64,
        archive_eligible: u64,
        purge_eligible: u64,
    ) -> Self {
        let mut next_actions = Vec::new();
        if archive_eligible > 0 {
            next_actions.push(RecommendedAction {
                operation: "auto-archive",
                run_after: now + Duration::days(1),
                estimated_sessions: archive_eligible,
            });
        }
        if purge_eligible > 0 {
            next_actions.push(RecommendedAction {
                operation: "purge",
                run_after: now + Duration::days(7),
                estimated_sessions: purge_eligible,
            });
        }
        Self {
            generated_at: now,
            policy_name: policy.name.clone(),
            total_sessions,
            num_archived,
            archive_eligible,
            purge_eligible,
            next_actions,
        }
    } // end of fn assemble
}
