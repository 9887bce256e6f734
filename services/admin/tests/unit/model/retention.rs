use chrono::Duration;

use admin::model::{
    ComplianceReportModel, ComplianceSnapshot, RetentionJobModel, RetentionJobStatus,
    RetentionPolicy, RetentionPolicySet, RetentionReportModel, RetentionScope,
};

use super::super::ut_time;

fn ut_policy(days_archive: u16, days_purge: u16) -> RetentionPolicy {
    RetentionPolicy {
        name: "ut-policy".to_string(),
        auto_archive_after_days: days_archive,
        purge_after_days: days_purge,
        scope: RetentionScope::All,
        enabled: true,
    }
}

#[test]
fn policy_set_lookup_and_fallback() {
    let set = RetentionPolicySet::builtin();
    assert!(set.find("standard").is_some());
    assert!(set.find("guest-minimal").is_some());
    assert!(set.find("no-such-policy").is_none());
    assert_eq!(set.fallback().name.as_str(), "standard");
}

#[test]
fn policy_cutoff_arithmetic() {
    let policy = ut_policy(90, 455);
    let now = ut_time(2025, 6, 1);
    assert_eq!(policy.archive_cutoff(now), now - Duration::days(90));
    assert_eq!(policy.purge_cutoff(now), now - Duration::days(455));
}

#[test]
fn compliance_score_penalties() {
    let policy = ut_policy(90, 455);
    let now = ut_time(2025, 6, 1);
    let snapshot = ComplianceSnapshot {
        total_sessions: 500,
        overdue_archive: 10, // 10 * 2 = 20
        overdue_purge: 4,    //  4 * 5 = 20
        near_archive_deadline: 3,
        near_purge_deadline: 0,
    };
    let report = ComplianceReportModel::evaluate(&policy, now, snapshot);
    assert_eq!(report.score, 60u8);
    assert_eq!(report.warnings.len(), 1);
    assert!(report.warnings[0].contains("archive deadline"));
}

#[test]
fn compliance_score_floors_at_zero() {
    let policy = ut_policy(90, 455);
    let now = ut_time(2025, 6, 1);
    let snapshot = ComplianceSnapshot {
        total_sessions: 9000,
        overdue_archive: 40, // 80 penalty
        overdue_purge: 30,   // 150 penalty
        near_archive_deadline: 0,
        near_purge_deadline: 0,
    };
    let report = ComplianceReportModel::evaluate(&policy, now, snapshot);
    assert_eq!(report.score, 0u8);
}

#[test]
fn perfect_compliance_keeps_full_score() {
    let policy = ut_policy(90, 455);
    let now = ut_time(2025, 6, 1);
    let report = ComplianceReportModel::evaluate(&policy, now, ComplianceSnapshot::default());
    assert_eq!(report.score, 100u8);
    assert!(report.warnings.is_empty());
}

#[test]
fn job_record_lifecycle() {
    let now = ut_time(2025, 6, 1);
    let mut job = RetentionJobModel::start("standard", now);
    assert!(job.finished_at.is_none());
    assert!(!job.job_id.is_empty());
    job.complete(now + Duration::minutes(2), 120, 35);
    assert_eq!(job.status, RetentionJobStatus::Completed);
    assert_eq!(job.num_archived, 120u32);
    assert_eq!(job.num_purged, 35u32);

    let mut failing = RetentionJobModel::start("standard", now);
    failing.fail(now + Duration::minutes(1), "db gone".to_string());
    assert_eq!(failing.status, RetentionJobStatus::Failed);
    assert_eq!(failing.errors.len(), 1);
}

#[test]
fn report_proposes_advisory_schedule() {
    let policy = ut_policy(90, 455);
    let now = ut_time(2025, 6, 1);
    let report = RetentionReportModel::assemble(&policy, now, 1000, 300, 42, 7);
    assert_eq!(report.next_actions.len(), 2);
    let archive_action = &report.next_actions[0];
    assert_eq!(archive_action.operation, "auto-archive");
    assert_eq!(archive_action.run_after, now + Duration::days(1));
    assert_eq!(archive_action.estimated_sessions, 42u64);
    let purge_action = &report.next_actions[1];
    assert_eq!(purge_action.operation, "purge");
    assert_eq!(purge_action.run_after, now + Duration::days(7));
}

#[test]
fn report_skips_empty_actions() {
    let policy = ut_policy(90, 455);
    let now = ut_time(2025, 6, 1);
    let report = RetentionReportModel::assemble(&policy, now, 1000, 300, 0, 0);
    assert!(report.next_actions.is_empty());
}
