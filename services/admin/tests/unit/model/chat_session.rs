use chrono::Duration;

use admin::model::{
    ChatSessionError, ChatSessionStatus, RetentionScope, METADATA_KEY_ORIGINAL_STATUS,
    METADATA_KEY_RESTORATIONS,
};

use super::super::{ut_chat_session, ut_time};

#[test]
fn archive_records_prior_status() {
    let now = ut_time(2025, 6, 1);
    let mut session = ut_chat_session("s-001", ChatSessionStatus::Ended, now - Duration::days(10));
    let retention = now + Duration::days(365);
    let changed = session.archive(now, "manual cleanup", retention);
    assert!(changed);
    assert_eq!(session.status, ChatSessionStatus::Archived);
    assert_eq!(session.archived_at.unwrap(), now);
    assert_eq!(session.retention_until.unwrap(), retention);
    let prior = session
        .metadata
        .get(METADATA_KEY_ORIGINAL_STATUS)
        .and_then(|v| v.as_str())
        .unwrap();
    assert_eq!(prior, "ended");
}

#[test]
fn archive_twice_is_a_no_op() {
    let now = ut_time(2025, 6, 1);
    let mut session = ut_chat_session("s-002", ChatSessionStatus::Idle, now - Duration::days(10));
    let retention = now + Duration::days(365);
    assert!(session.archive(now, "first", retention));
    let changed = session.archive(now + Duration::hours(1), "second", retention);
    assert!(!changed);
    // provenance of the first archiving run survives
    let reason = session
        .metadata
        .get("archive_reason")
        .and_then(|v| v.as_str())
        .unwrap();
    assert_eq!(reason, "first");
}

#[test]
fn restore_returns_to_stored_status() {
    let now = ut_time(2025, 6, 1);
    let mut session = ut_chat_session("s-003", ChatSessionStatus::Idle, now - Duration::days(10));
    session.archive(now, "cleanup", now + Duration::days(30));
    let later = now + Duration::days(3);
    let dst = session.restore(later, "customer dispute re-opened", None).unwrap();
    assert_eq!(dst, ChatSessionStatus::Idle);
    assert_eq!(session.status, ChatSessionStatus::Idle);
    assert!(session.archived_at.is_none());
    assert!(session.retention_until.is_none());
    let hist = session
        .metadata
        .get(METADATA_KEY_RESTORATIONS)
        .and_then(|v| v.as_array())
        .unwrap();
    assert_eq!(hist.len(), 1);
}

#[test]
fn restore_honours_explicit_target() {
    let now = ut_time(2025, 6, 1);
    let mut session = ut_chat_session("s-004", ChatSessionStatus::Idle, now - Duration::days(10));
    session.archive(now, "cleanup", now + Duration::days(30));
    let dst = session
        .restore(now + Duration::days(1), "re-open", Some(ChatSessionStatus::Ended))
        .unwrap();
    assert_eq!(dst, ChatSessionStatus::Ended);
}

#[test]
fn restore_rejected_past_retention() {
    let now = ut_time(2025, 6, 1);
    let mut session = ut_chat_session("s-005", ChatSessionStatus::Ended, now - Duration::days(400));
    session.archive(now - Duration::days(395), "old", now - Duration::days(30));
    let result = session.restore(now, "too late", None);
    assert_eq!(
        result.err().unwrap(),
        ChatSessionError::RetentionElapsed("s-005".to_string())
    );
    assert_eq!(session.status, ChatSessionStatus::Archived);
}

#[test]
fn restore_rejected_when_not_archived() {
    let now = ut_time(2025, 6, 1);
    let mut session = ut_chat_session("s-006", ChatSessionStatus::Active, now);
    let result = session.restore(now, "nothing to do", None);
    assert_eq!(
        result.err().unwrap(),
        ChatSessionError::NotArchived("s-006".to_string())
    );
}

#[test]
fn purge_due_only_past_cutoff() {
    let now = ut_time(2025, 6, 1);
    // archived 400 days ago, default retention keeps archives 365 days
    let mut old_session =
        ut_chat_session("s-007", ChatSessionStatus::Ended, now - Duration::days(401));
    old_session.archive(
        now - Duration::days(400),
        "aged",
        now - Duration::days(35),
    );
    let cutoff = now - Duration::days(365);
    assert!(old_session.purge_due(cutoff));
    let mut fresh_session =
        ut_chat_session("s-008", ChatSessionStatus::Ended, now - Duration::days(10));
    fresh_session.archive(now - Duration::days(5), "recent", now + Duration::days(360));
    assert!(!fresh_session.purge_due(cutoff));
}

#[test]
fn scope_matching_follows_user_link() {
    let now = ut_time(2025, 6, 1);
    let mut guest = ut_chat_session("s-009", ChatSessionStatus::Ended, now);
    assert!(guest.matches_scope(&RetentionScope::All));
    assert!(guest.matches_scope(&RetentionScope::Guest));
    assert!(!guest.matches_scope(&RetentionScope::Authenticated));
    guest.usr_id = Some(501u32);
    assert!(guest.matches_scope(&RetentionScope::Authenticated));
    assert!(!guest.matches_scope(&RetentionScope::Guest));
}
