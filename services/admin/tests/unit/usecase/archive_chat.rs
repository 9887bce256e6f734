use std::sync::{Arc, Mutex};

use chrono::Duration;

use admin::model::ChatSessionStatus;
use admin::usecase::{ArchiveTaskConfig, ChatArchiveUcError, ChatArchiveUseCase};

use bazaar_common::logging::AppLogContext;

use super::super::{ut_chat_session, ut_logctx, ut_time};
use super::{
    ut_archived_session, ut_old_archived_session, ut_repo_error, MockChatArchiveRepo,
};
use admin::adapter::repository::AppRepoErrorFnLabel;

fn ut_usecase(repo: MockChatArchiveRepo, cfg: ArchiveTaskConfig) -> ChatArchiveUseCase {
    let logctx: Arc<AppLogContext> = ut_logctx();
    ChatArchiveUseCase {
        repo: Box::new(repo),
        cfg,
        logctx,
    }
}

#[tokio::test]
async fn archive_skips_already_archived() {
    let now = ut_time(2025, 6, 1);
    let ended = ut_chat_session("s-10", ChatSessionStatus::Ended, now - Duration::days(20));
    let archived = ut_archived_session("s-11", now - Duration::days(5), now + Duration::days(360));
    let repo = MockChatArchiveRepo {
        fetch_results: Mutex::new(vec![Ok(vec![ended, archived])]),
        ..Default::default()
    };
    let saved_batches = repo.saved_batches.clone();
    let uc = ut_usecase(repo, ArchiveTaskConfig::default());
    let ids = ["s-10".to_string(), "s-11".to_string()];
    let outcome = uc
        .archive_sessions(&ids, "manual cleanup", None)
        .await
        .ok()
        .unwrap();
    assert_eq!(outcome.num_archived, 1u32);
    assert_eq!(outcome.num_skipped, 1u32);
    assert!(outcome.errors.is_empty());
    let batches = saved_batches.lock().unwrap();
    assert_eq!(batches.len(), 1);
    assert_eq!(batches[0].len(), 1);
    assert_eq!(batches[0][0].0.as_str(), "s-10");
    assert_eq!(batches[0][0].1.as_str(), "archived");
}

#[tokio::test]
async fn archive_twice_second_run_archives_nothing() {
    let now = ut_time(2025, 6, 1);
    let first = ut_chat_session("s-12", ChatSessionStatus::Ended, now - Duration::days(20));
    // the second fetch sees the session as it looks after the first run
    let second = ut_archived_session("s-12", now, now + Duration::days(365));
    let repo = MockChatArchiveRepo {
        fetch_results: Mutex::new(vec![Ok(vec![first]), Ok(vec![second])]),
        ..Default::default()
    };
    let uc = ut_usecase(repo, ArchiveTaskConfig::default());
    let ids = ["s-12".to_string()];
    let outcome1 = uc.archive_sessions(&ids, "round 1", None).await.ok().unwrap();
    assert_eq!(outcome1.num_archived, 1u32);
    let outcome2 = uc.archive_sessions(&ids, "round 2", None).await.ok().unwrap();
    assert_eq!(outcome2.num_archived, 0u32);
    assert_eq!(outcome2.num_skipped, 1u32);
}

#[tokio::test]
async fn archive_unknown_ids_count_as_skipped() {
    let repo = MockChatArchiveRepo {
        fetch_results: Mutex::new(vec![Ok(Vec::new())]),
        ..Default::default()
    };
    let uc = ut_usecase(repo, ArchiveTaskConfig::default());
    let ids = ["no-such-session".to_string()];
    let outcome = uc.archive_sessions(&ids, "cleanup", None).await.ok().unwrap();
    assert_eq!(outcome.num_archived, 0u32);
    assert_eq!(outcome.num_skipped, 1u32);
}

#[tokio::test]
async fn archive_failed_batch_does_not_abort_the_rest() {
    let now = ut_time(2025, 6, 1);
    let cfg = ArchiveTaskConfig {
        batch_size: 1,
        ..Default::default()
    };
    let survivor = ut_chat_session("s-14", ChatSessionStatus::Ended, now - Duration::days(20));
    let repo = MockChatArchiveRepo {
        fetch_results: Mutex::new(vec![
            Err(ut_repo_error(AppRepoErrorFnLabel::FetchSessions)),
            Ok(vec![survivor]),
        ]),
        ..Default::default()
    };
    let uc = ut_usecase(repo, cfg);
    let ids = ["s-13".to_string(), "s-14".to_string()];
    let outcome = uc.archive_sessions(&ids, "cleanup", None).await.ok().unwrap();
    assert_eq!(outcome.num_archived, 1u32);
    assert_eq!(outcome.errors.len(), 1);
    assert!(outcome.errors[0].contains("s-13"));
}

#[tokio::test]
async fn archive_request_validation_messages() {
    let cfg = ArchiveTaskConfig {
        max_ids_per_request: 2,
        ..Default::default()
    };
    let uc = ut_usecase(MockChatArchiveRepo::default(), cfg);
    let empty: [String; 0] = [];
    let msgs = uc.validate_archive_request(&empty);
    assert_eq!(msgs, vec!["no session IDs given".to_string()]);
    let too_many = ["a".to_string(), "b".to_string(), " ".to_string()];
    let msgs = uc.validate_archive_request(&too_many);
    assert_eq!(msgs.len(), 2);
    assert!(msgs[0].contains("exceed the limit"));
    assert!(msgs[1].contains("blank session ID at position 2"));
    let result = uc.archive_sessions(&empty, "nope", None).await;
    assert!(matches!(
        result.err().unwrap(),
        ChatArchiveUcError::ValidationFailure(_)
    ));
}

#[tokio::test]
async fn restore_request_validation_rejects_bad_target() {
    let uc = ut_usecase(MockChatArchiveRepo::default(), ArchiveTaskConfig::default());
    let ids = ["s-20".to_string()];
    let msgs = uc.validate_restore_request(&ids, Some("archived"));
    assert_eq!(msgs.len(), 1);
    let msgs = uc.validate_restore_request(&ids, Some("resurrected"));
    assert!(msgs[0].contains("unknown target status"));
    let msgs = uc.validate_restore_request(&ids, Some("ended"));
    assert!(msgs.is_empty());
}

#[tokio::test]
async fn restore_mixed_eligibility() {
    // the use-case compares retention windows against the wall clock
    let now = chrono::Utc::now();
    let in_window = ut_archived_session("s-21", now - Duration::days(5), now + Duration::days(300));
    let expired = ut_archived_session("s-22", now - Duration::days(400), now - Duration::days(35));
    let repo = MockChatArchiveRepo {
        fetch_results: Mutex::new(vec![Ok(vec![in_window, expired])]),
        ..Default::default()
    };
    let saved_batches = repo.saved_batches.clone();
    let uc = ut_usecase(repo, ArchiveTaskConfig::default());
    let ids = ["s-21".to_string(), "s-22".to_string()];
    let outcome = uc
        .restore_sessions(&ids, "dispute re-opened", None)
        .await
        .ok()
        .unwrap();
    assert_eq!(outcome.num_restored, 1u32);
    assert_eq!(outcome.rejected.len(), 1);
    assert!(outcome.rejected[0].contains("s-22"));
    let batches = saved_batches.lock().unwrap();
    assert_eq!(batches[0][0].0.as_str(), "s-21");
    assert_ne!(batches[0][0].1.as_str(), "archived");
}

#[tokio::test]
async fn restore_with_zero_eligible_is_an_error() {
    let now = chrono::Utc::now();
    let expired = ut_archived_session("s-23", now - Duration::days(400), now - Duration::days(35));
    let repo = MockChatArchiveRepo {
        fetch_results: Mutex::new(vec![Ok(vec![expired])]),
        ..Default::default()
    };
    let saved_batches = repo.saved_batches.clone();
    let uc = ut_usecase(repo, ArchiveTaskConfig::default());
    let ids = ["s-23".to_string()];
    let result = uc.restore_sessions(&ids, "too late", None).await;
    assert!(matches!(
        result.err().unwrap(),
        ChatArchiveUcError::NoneEligible
    ));
    assert!(saved_batches.lock().unwrap().is_empty());
}

#[tokio::test]
async fn purge_collects_sessions_past_retention() {
    // archived 400 days ago while the default policy keeps archives
    // for 365 days, the session must fall into the purged set
    let victim = ut_old_archived_session(400);
    let repo = MockChatArchiveRepo {
        archived_before_result: Mutex::new(Some(Ok(vec![victim]))),
        purge_result: Mutex::new(Some(Ok(1))),
        ..Default::default()
    };
    let purged_ids = repo.purged_ids.clone();
    let uc = ut_usecase(repo, ArchiveTaskConfig::default());
    let num = uc.purge_old_archives().await.ok().unwrap();
    assert_eq!(num, 1u32);
    let calls = purged_ids.lock().unwrap();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0], vec!["s-old".to_string()]);
}

#[tokio::test]
async fn purge_without_eligible_sessions_skips_deletion() {
    let repo = MockChatArchiveRepo {
        archived_before_result: Mutex::new(Some(Ok(Vec::new()))),
        ..Default::default()
    };
    let purged_ids = repo.purged_ids.clone();
    let uc = ut_usecase(repo, ArchiveTaskConfig::default());
    let num = uc.purge_old_archives().await.ok().unwrap();
    assert_eq!(num, 0u32);
    assert!(purged_ids.lock().unwrap().is_empty());
}

#[tokio::test]
async fn auto_archive_sweeps_stale_sessions() {
    let now = ut_time(2025, 6, 1);
    let stale_a = ut_chat_session("s-30", ChatSessionStatus::Ended, now - Duration::days(100));
    let stale_b = ut_chat_session("s-31", ChatSessionStatus::Idle, now - Duration::days(95));
    let repo = MockChatArchiveRepo {
        inactive_result: Mutex::new(Some(Ok(vec![stale_a, stale_b]))),
        ..Default::default()
    };
    let saved_batches = repo.saved_batches.clone();
    let uc = ut_usecase(repo, ArchiveTaskConfig::default());
    let outcome = uc.auto_archive_old_sessions().await.ok().unwrap();
    assert_eq!(outcome.num_archived, 2u32);
    assert!(outcome.errors.is_empty());
    let batches = saved_batches.lock().unwrap();
    assert_eq!(batches.len(), 1);
    assert!(batches[0].iter().all(|(_id, st)| st.as_str() == "archived"));
}
