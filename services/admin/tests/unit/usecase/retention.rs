use std::sync::Mutex;

use chrono::Duration;

use admin::model::{
    ChatSessionStatus, ComplianceSnapshot, RetentionJobStatus, RetentionPolicy,
    RetentionPolicySet, RetentionScope,
};
use admin::usecase::{
    ArchiveTaskConfig, ChatArchiveUseCase, RetentionPolicyUseCase, RetentionUcError,
};

use super::super::{ut_chat_session, ut_logctx, ut_time};
use super::{ut_archived_session, ut_repo_error, MockChatArchiveRepo};
use admin::adapter::repository::AppRepoErrorFnLabel;

fn ut_usecase(repo: MockChatArchiveRepo, policies: Vec<RetentionPolicy>) -> RetentionPolicyUseCase {
    let archive_uc = ChatArchiveUseCase {
        repo: Box::new(repo),
        cfg: ArchiveTaskConfig::default(),
        logctx: ut_logctx(),
    };
    RetentionPolicyUseCase {
        archive_uc,
        policies: RetentionPolicySet::with_policies(policies),
        logctx: ut_logctx(),
    }
}

fn ut_enabled_policy() -> RetentionPolicy {
    RetentionPolicy {
        name: "ut-standard".to_string(),
        auto_archive_after_days: 90,
        purge_after_days: 365,
        scope: RetentionScope::All,
        enabled: true,
    }
}

#[tokio::test]
async fn unknown_policy_is_an_error() {
    let uc = ut_usecase(MockChatArchiveRepo::default(), vec![ut_enabled_policy()]);
    let result = uc.execute_policy(Some("no-such-policy")).await;
    let Some(RetentionUcError::UnknownPolicy(name)) = result.err() else {
        panic!("unknown-policy error expected");
    };
    assert_eq!(name.as_str(), "no-such-policy");
}

#[tokio::test]
async fn disabled_policy_completes_with_zero_counts() {
    let mut policy = ut_enabled_policy();
    policy.enabled = false;
    let repo = MockChatArchiveRepo::default();
    let saved_jobs = repo.saved_jobs.clone();
    let uc = ut_usecase(repo, vec![policy]);
    let job = uc.execute_policy(Some("ut-standard")).await.ok().unwrap();
    assert_eq!(job.status, RetentionJobStatus::Completed);
    assert_eq!(job.num_archived, 0u32);
    assert_eq!(job.num_purged, 0u32);
    let jobs = saved_jobs.lock().unwrap();
    assert_eq!(jobs.len(), 1);
    assert_eq!(jobs[0].1.as_str(), "COMPLETED");
}

#[tokio::test]
async fn policy_run_archives_then_purges() {
    let now = ut_time(2025, 6, 1);
    let stale = ut_chat_session("s-40", ChatSessionStatus::Ended, now - Duration::days(120));
    let doomed = ut_archived_session("s-41", now - Duration::days(400), now - Duration::days(35));
    let repo = MockChatArchiveRepo {
        inactive_result: Mutex::new(Some(Ok(vec![stale]))),
        archived_before_result: Mutex::new(Some(Ok(vec![doomed]))),
        purge_result: Mutex::new(Some(Ok(1))),
        ..Default::default()
    };
    let saved_jobs = repo.saved_jobs.clone();
    let uc = ut_usecase(repo, vec![ut_enabled_policy()]);
    let job = uc.execute_policy(None).await.ok().unwrap();
    assert_eq!(job.status, RetentionJobStatus::Completed);
    assert_eq!(job.num_archived, 1u32);
    assert_eq!(job.num_purged, 1u32);
    assert!(job.errors.is_empty());
    assert!(job.finished_at.is_some());
    assert_eq!(saved_jobs.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn purge_step_failure_lands_on_the_job_record() {
    let now = ut_time(2025, 6, 1);
    let stale = ut_chat_session("s-42", ChatSessionStatus::Ended, now - Duration::days(120));
    let repo = MockChatArchiveRepo {
        inactive_result: Mutex::new(Some(Ok(vec![stale]))),
        archived_before_result: Mutex::new(Some(Err(ut_repo_error(
            AppRepoErrorFnLabel::FetchArchivedBefore,
        )))),
        ..Default::default()
    };
    let saved_jobs = repo.saved_jobs.clone();
    let uc = ut_usecase(repo, vec![ut_enabled_policy()]);
    // the failure is recorded, never rethrown
    let job = uc.execute_policy(None).await.ok().unwrap();
    assert_eq!(job.status, RetentionJobStatus::Failed);
    assert_eq!(job.num_archived, 1u32);
    assert!(!job.errors.is_empty());
    assert!(job.errors[0].starts_with("purge"));
    let jobs = saved_jobs.lock().unwrap();
    assert_eq!(jobs[0].1.as_str(), "FAILED");
}

#[tokio::test]
async fn compliance_report_from_snapshot() {
    let snapshot = ComplianceSnapshot {
        total_sessions: 320,
        overdue_archive: 5, // 10 penalty
        overdue_purge: 2,   // 10 penalty
        near_archive_deadline: 0,
        near_purge_deadline: 1,
    };
    let repo = MockChatArchiveRepo {
        compliance_result: Mutex::new(Some(Ok(snapshot))),
        ..Default::default()
    };
    let uc = ut_usecase(repo, vec![ut_enabled_policy()]);
    let report = uc.check_compliance(None).await.ok().unwrap();
    assert_eq!(report.score, 80u8);
    assert_eq!(report.policy_name.as_str(), "ut-standard");
    assert_eq!(report.warnings.len(), 1);
}

#[tokio::test]
async fn report_recommends_actions_from_counts() {
    let snapshot = ComplianceSnapshot {
        total_sessions: 1000,
        overdue_archive: 12,
        overdue_purge: 3,
        near_archive_deadline: 0,
        near_purge_deadline: 0,
    };
    let repo = MockChatArchiveRepo {
        compliance_result: Mutex::new(Some(Ok(snapshot))),
        ..Default::default()
    };
    let uc = ut_usecase(repo, vec![ut_enabled_policy()]);
    let report = uc.generate_report(None).await.ok().unwrap();
    assert_eq!(report.archive_eligible, 12u64);
    assert_eq!(report.purge_eligible, 3u64);
    assert_eq!(report.next_actions.len(), 2);
}
