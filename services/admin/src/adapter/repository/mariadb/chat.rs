use std::result::Result;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use futures_util::StreamExt;
use mysql_async::prelude::{Query, Queryable, WithParams};
use mysql_async::{params, Conn, IsolationLevel, Params, TxOpts};

use bazaar_common::api::dto::ListWindowDto;
use bazaar_common::error::AppErrorCode;

use super::super::{
    AbstractChatArchiveRepo, AppRepoError, AppRepoErrorDetail, AppRepoErrorFnLabel,
};
use super::{
    fmt_datetime, in_placeholders, log_and_wrap_err, raw_column_to_datetime, scope_condition,
};
use crate::adapter::datastore::{AppDStoreMariaDB, AppDataStoreContext};
use crate::model::{
    ArchiveStatsModel, ChatSessionModel, ChatSessionStatus, ComplianceSnapshot,
    RetentionJobModel, RetentionScope,
};

const SESSION_COLUMNS: &str = "`session_id`,`status`,`usr_id`,`guest_email`,`created_at`,\
 `last_activity`,`archived_at`,`retention_until`,`metadata`";

#[rustfmt::skip]
type SessionRowType = (
    String,                     // `session_id`
    String,                     // `status`
    Option<u32>,                // `usr_id`
    Option<String>,             // `guest_email`
    mysql_async::Value,         // `created_at`
    mysql_async::Value,         // `last_activity`
    mysql_async::Value,         // `archived_at`, nullable
    mysql_async::Value,         // `retention_until`, nullable
    Option<String>,             // `metadata`, serialised json
);

fn session_from_row(
    row: SessionRowType,
) -> Result<ChatSessionModel, (AppErrorCode, AppRepoErrorDetail)> {
    let (session_id, status_raw, usr_id, guest_email, created_raw, activity_raw, archived_raw, retention_raw, metadata_raw) =
        row;
    let status = ChatSessionStatus::try_from_raw(status_raw.as_str()).map_err(|e| {
        (
            AppErrorCode::DataCorruption,
            AppRepoErrorDetail::DataRowParse(format!("{e:?}")),
        )
    })?;
    let optional_dt = |v: mysql_async::Value| match v {
        mysql_async::Value::NULL => Ok(None),
        _others => raw_column_to_datetime(_others).map(Some),
    };
    let metadata = match metadata_raw {
        Some(serial) => serde_json::from_str(serial.as_str()).map_err(|e| {
            (
                AppErrorCode::DataCorruption,
                AppRepoErrorDetail::DataRowParse(format!("metadata, {e}")),
            )
        })?,
        None => serde_json::json!({}),
    };
    Ok(ChatSessionModel {
        session_id,
        status,
        usr_id,
        guest_email,
        created_at: raw_column_to_datetime(created_raw)?,
        last_activity: raw_column_to_datetime(activity_raw)?,
        archived_at: optional_dt(archived_raw)?,
        retention_until: optional_dt(retention_raw)?,
        metadata,
    })
} // end of fn session_from_row

pub(crate) struct MariadbChatArchiveRepo {
    _dstore: Arc<AppDStoreMariaDB>,
}

impl MariadbChatArchiveRepo {
    pub(crate) fn new(ds: Arc<AppDataStoreContext>) -> Result<Self, AppRepoError> {
        ds.mariadb(None)
            .map(|found| Self { _dstore: found })
            .ok_or(AppRepoError {
                fn_label: AppRepoErrorFnLabel::InitRepo,
                code: AppErrorCode::MissingDataStore,
                detail: AppRepoErrorDetail::Unknown,
            })
    }

    fn _err(
        &self,
        fn_label: AppRepoErrorFnLabel,
        code: AppErrorCode,
        detail: AppRepoErrorDetail,
    ) -> AppRepoError {
        log_and_wrap_err(&self._dstore, fn_label, code, detail)
    }

    async fn _acquire(&self, fn_label: AppRepoErrorFnLabel) -> Result<Conn, AppRepoError> {
        self._dstore.acquire().await.map_err(|e| {
            log_and_wrap_err(
                &self._dstore,
                fn_label,
                AppErrorCode::DatabaseServerBusy,
                AppRepoErrorDetail::DataStore(e),
            )
        })
    }

    async fn _fetch_with_stmt(
        &self,
        fn_label: AppRepoErrorFnLabel,
        stmt: String,
        params_arg: Params,
    ) -> Result<Vec<ChatSessionModel>, AppRepoError> {
        let mut conn = self._acquire(fn_label).await?;
        let exec = &mut conn;
        let mut row_stream = stmt
            .with(params_arg)
            .stream::<SessionRowType, &mut Conn>(exec)
            .await
            .map_err(|e| {
                log_and_wrap_err(
                    &self._dstore,
                    fn_label,
                    AppErrorCode::RemoteDbServerFailure,
                    AppRepoErrorDetail::DatabaseQuery(e.to_string()),
                )
            })?;
        let mut out = Vec::new();
        while let Some(result) = row_stream.next().await {
            let row = result.map_err(|e| {
                log_and_wrap_err(
                    &self._dstore,
                    fn_label,
                    AppErrorCode::RemoteDbServerFailure,
                    AppRepoErrorDetail::DatabaseQuery(e.to_string()),
                )
            })?;
            let obj = session_from_row(row).map_err(|(code, detail)| {
                log_and_wrap_err(&self._dstore, fn_label, code, detail)
            })?;
            out.push(obj);
        }
        Ok(out)
    } // end of fn _fetch_with_stmt
} // end of impl MariadbChatArchiveRepo

#[async_trait]
impl AbstractChatArchiveRepo for MariadbChatArchiveRepo {
    async fn fetch_sessions(&self, ids: &[String]) -> Result<Vec<ChatSessionModel>, AppRepoError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let stmt = format!(
            "SELECT {} FROM `chat_session` WHERE `session_id` IN ({})",
            SESSION_COLUMNS,
            in_placeholders(ids.len())
        );
        let params_arg = Params::from(ids.to_vec());
        self._fetch_with_stmt(AppRepoErrorFnLabel::FetchSessions, stmt, params_arg)
            .await
    }

    async fn save_sessions(&self, batch: &[ChatSessionModel]) -> Result<(), AppRepoError> {
        if batch.is_empty() {
            return Ok(());
        }
        let stmt = "UPDATE `chat_session` SET `status`=:status,`archived_at`=:archived_at,\
 `retention_until`=:retention_until,`metadata`=:metadata WHERE `session_id`=:session_id";
        let params_iter = batch
            .iter()
            .map(|s| {
                params! {
                    "status" => s.status.as_str(),
                    "archived_at" => s.archived_at.map(fmt_datetime),
                    "retention_until" => s.retention_until.map(fmt_datetime),
                    "metadata" => s.metadata.to_string(),
                    "session_id" => s.session_id.as_str(),
                }
            })
            .collect::<Vec<_>>();
        let mut conn = self._acquire(AppRepoErrorFnLabel::SaveSessions).await?;
        let mut options = TxOpts::default();
        options.with_isolation_level(IsolationLevel::RepeatableRead);
        let mut tx = conn.start_transaction(options).await.map_err(|e| {
            self._err(
                AppRepoErrorFnLabel::SaveSessions,
                AppErrorCode::RemoteDbServerFailure,
                AppRepoErrorDetail::DatabaseTxStart(e.to_string()),
            )
        })?;
        tx.exec_batch(stmt, params_iter).await.map_err(|e| {
            self._err(
                AppRepoErrorFnLabel::SaveSessions,
                AppErrorCode::RemoteDbServerFailure,
                AppRepoErrorDetail::DatabaseExec(e.to_string()),
            )
        })?;
        tx.commit().await.map_err(|e| {
            self._err(
                AppRepoErrorFnLabel::SaveSessions,
                AppErrorCode::RemoteDbServerFailure,
                AppRepoErrorDetail::DatabaseTxCommit(e.to_string()),
            )
        })
    } // end of fn save_sessions

    async fn fetch_archived_before(
        &self,
        cutoff: DateTime<Utc>,
        scope: RetentionScope,
        limit: u32,
    ) -> Result<Vec<ChatSessionModel>, AppRepoError> {
        let stmt = format!(
            "SELECT {} FROM `chat_session` WHERE `status`='archived' AND `archived_at` < :cutoff{} \
 ORDER BY `archived_at` ASC LIMIT {}",
            SESSION_COLUMNS,
            scope_condition(&scope),
            limit
        );
        let params_arg = params! { "cutoff" => fmt_datetime(cutoff) };
        self._fetch_with_stmt(AppRepoErrorFnLabel::FetchArchivedBefore, stmt, params_arg)
            .await
    }

    async fn fetch_inactive_since(
        &self,
        cutoff: DateTime<Utc>,
        scope: RetentionScope,
        limit: u32,
    ) -> Result<Vec<ChatSessionModel>, AppRepoError> {
        // active sessions are left alone, a visitor may still come back,
        // archived ones are already where they belong
        let stmt = format!(
            "SELECT {} FROM `chat_session` WHERE `last_activity` < :cutoff AND `status` NOT IN \
 ('active','archived'){} ORDER BY `last_activity` ASC LIMIT {}",
            SESSION_COLUMNS,
            scope_condition(&scope),
            limit
        );
        let params_arg = params! { "cutoff" => fmt_datetime(cutoff) };
        self._fetch_with_stmt(AppRepoErrorFnLabel::FetchInactiveSince, stmt, params_arg)
            .await
    }

    async fn purge_sessions(&self, ids: &[String]) -> Result<u32, AppRepoError> {
        if ids.is_empty() {
            return Ok(0);
        }
        let placeholders = in_placeholders(ids.len());
        let del_msgs = format!(
            "DELETE FROM `chat_message` WHERE `session_id` IN ({placeholders})"
        );
        let del_sessions = format!(
            "DELETE FROM `chat_session` WHERE `session_id` IN ({placeholders})"
        );
        let mut conn = self._acquire(AppRepoErrorFnLabel::PurgeSessions).await?;
        let mut options = TxOpts::default();
        options.with_isolation_level(IsolationLevel::RepeatableRead);
        let mut tx = conn.start_transaction(options).await.map_err(|e| {
            self._err(
                AppRepoErrorFnLabel::PurgeSessions,
                AppErrorCode::RemoteDbServerFailure,
                AppRepoErrorDetail::DatabaseTxStart(e.to_string()),
            )
        })?;
        // messages removed first, no orphan rows may survive the purge
        tx.exec_drop(del_msgs.as_str(), Params::from(ids.to_vec()))
            .await
            .map_err(|e| {
                self._err(
                    AppRepoErrorFnLabel::PurgeSessions,
                    AppErrorCode::RemoteDbServerFailure,
                    AppRepoErrorDetail::DatabaseExec(e.to_string()),
                )
            })?;
        let result = tx
            .exec_iter(del_sessions.as_str(), Params::from(ids.to_vec()))
            .await
            .map_err(|e| {
                self._err(
                    AppRepoErrorFnLabel::PurgeSessions,
                    AppErrorCode::RemoteDbServerFailure,
                    AppRepoErrorDetail::DatabaseExec(e.to_string()),
                )
            })?;
        let num_purged = result.affected_rows() as u32;
        drop(result);
        tx.commit().await.map_err(|e| {
            self._err(
                AppRepoErrorFnLabel::PurgeSessions,
                AppErrorCode::RemoteDbServerFailure,
                AppRepoErrorDetail::DatabaseTxCommit(e.to_string()),
            )
        })?;
        Ok(num_purged)
    } // end of fn purge_sessions

    async fn summarize(
        &self,
        purge_cutoff: DateTime<Utc>,
    ) -> Result<ArchiveStatsModel, AppRepoError> {
        let stmt = "SELECT COUNT(*), COUNT(IF(`status`='active',1,NULL)),\
 COUNT(IF(`status`='ended',1,NULL)), COUNT(IF(`status`='archived',1,NULL)),\
 COUNT(IF(`status`='archived' AND `archived_at` < :cutoff,1,NULL)),\
 MIN(IF(`status`='archived',`archived_at`,NULL)) FROM `chat_session`";
        let params_arg = params! { "cutoff" => fmt_datetime(purge_cutoff) };
        let mut conn = self._acquire(AppRepoErrorFnLabel::SummarizeArchive).await?;
        let exec = &mut conn;
        type StatsRow = (u64, u64, u64, u64, u64, mysql_async::Value);
        let maybe_row = stmt
            .with(params_arg)
            .first::<StatsRow, &mut Conn>(exec)
            .await
            .map_err(|e| {
                self._err(
                    AppRepoErrorFnLabel::SummarizeArchive,
                    AppErrorCode::RemoteDbServerFailure,
                    AppRepoErrorDetail::DatabaseQuery(e.to_string()),
                )
            })?;
        let (total, active, ended, archived, purge_eligible, oldest_raw) =
            maybe_row.unwrap_or((0, 0, 0, 0, 0, mysql_async::Value::NULL));
        let oldest_archived_at = match oldest_raw {
            mysql_async::Value::NULL => None,
            _others => Some(raw_column_to_datetime(_others).map_err(|(code, detail)| {
                self._err(AppRepoErrorFnLabel::SummarizeArchive, code, detail)
            })?),
        };
        Ok(ArchiveStatsModel {
            total_sessions: total,
            num_active: active,
            num_ended: ended,
            num_archived: archived,
            purge_eligible,
            oldest_archived_at,
        })
    } // end of fn summarize

    async fn compliance_counts(
        &self,
        archive_cutoff: DateTime<Utc>,
        purge_cutoff: DateTime<Utc>,
        margin_days: i64,
        scope: RetentionScope,
    ) -> Result<ComplianceSnapshot, AppRepoError> {
        let archive_near = archive_cutoff + Duration::days(margin_days);
        let purge_near = purge_cutoff + Duration::days(margin_days);
        let stmt = format!(
            "SELECT COUNT(*),\
 COUNT(IF(`status` <> 'archived' AND `last_activity` < :arch_cut,1,NULL)),\
 COUNT(IF(`status`='archived' AND `archived_at` < :purge_cut,1,NULL)),\
 COUNT(IF(`status` <> 'archived' AND `last_activity` >= :arch_cut AND `last_activity` < :arch_near,1,NULL)),\
 COUNT(IF(`status`='archived' AND `archived_at` >= :purge_cut AND `archived_at` < :purge_near,1,NULL)) \
 FROM `chat_session` WHERE 1=1{}",
            scope_condition(&scope)
        );
        let params_arg = params! {
            "arch_cut" => fmt_datetime(archive_cutoff),
            "purge_cut" => fmt_datetime(purge_cutoff),
            "arch_near" => fmt_datetime(archive_near),
            "purge_near" => fmt_datetime(purge_near),
        };
        let mut conn = self._acquire(AppRepoErrorFnLabel::ComplianceCounts).await?;
        let exec = &mut conn;
        type CountsRow = (u64, u64, u64, u64, u64);
        let maybe_row = stmt
            .with(params_arg)
            .first::<CountsRow, &mut Conn>(exec)
            .await
            .map_err(|e| {
                self._err(
                    AppRepoErrorFnLabel::ComplianceCounts,
                    AppErrorCode::RemoteDbServerFailure,
                    AppRepoErrorDetail::DatabaseQuery(e.to_string()),
                )
            })?;
        let (total, overdue_archive, overdue_purge, near_archive, near_purge) =
            maybe_row.unwrap_or((0, 0, 0, 0, 0));
        Ok(ComplianceSnapshot {
            total_sessions: total,
            overdue_archive: overdue_archive as u32,
            overdue_purge: overdue_purge as u32,
            near_archive_deadline: near_archive as u32,
            near_purge_deadline: near_purge as u32,
        })
    } // end of fn compliance_counts

    async fn list_archived(
        &self,
        window: ListWindowDto,
    ) -> Result<Vec<ChatSessionModel>, AppRepoError> {
        let stmt = format!(
            "SELECT {} FROM `chat_session` WHERE `status`='archived' ORDER BY `archived_at` DESC \
 LIMIT {},{}",
            SESSION_COLUMNS, window.offset, window.limit
        );
        self._fetch_with_stmt(AppRepoErrorFnLabel::ListArchived, stmt, Params::Empty)
            .await
    }

    async fn save_retention_job(&self, job: &RetentionJobModel) -> Result<(), AppRepoError> {
        let stmt = "INSERT INTO `retention_job`(`job_id`,`policy_name`,`started_at`,\
 `finished_at`,`num_archived`,`num_purged`,`errors`,`status`) VALUES (:job_id,:policy_name,\
 :started_at,:finished_at,:num_archived,:num_purged,:errors,:status)";
        let errors_serial = serde_json::to_string(&job.errors).unwrap_or_default();
        let params_arg = params! {
            "job_id" => job.job_id.as_str(),
            "policy_name" => job.policy_name.as_str(),
            "started_at" => fmt_datetime(job.started_at),
            "finished_at" => job.finished_at.map(fmt_datetime),
            "num_archived" => job.num_archived,
            "num_purged" => job.num_purged,
            "errors" => errors_serial,
            "status" => job.status.as_str(),
        };
        let mut conn = self._acquire(AppRepoErrorFnLabel::SaveRetentionJob).await?;
        stmt.with(params_arg)
            .run::<&mut Conn>(&mut conn)
            .await
            .map_err(|e| {
                self._err(
                    AppRepoErrorFnLabel::SaveRetentionJob,
                    AppErrorCode::RemoteDbServerFailure,
                    AppRepoErrorDetail::DatabaseExec(e.to_string()),
                )
            })?;
        Ok(())
    } // end of fn save_retention_job
} // end of impl MariadbChatArchiveRepo
