pub(super) mod chat;
pub(super) mod discount;
pub(super) mod order;
pub(super) mod settings;

use std::result::Result;
use std::sync::Arc;

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, SubsecRound, Utc};

use bazaar_common::error::AppErrorCode;
use bazaar_common::logging::{app_log_event, AppLogLevel};

pub(super) use chat::MariadbChatArchiveRepo;
pub(super) use discount::MariadbDiscountRepo;
pub(super) use order::MariadbOrderRepo;
pub(super) use settings::MariadbSettingsRepo;

use super::{AppRepoError, AppRepoErrorDetail, AppRepoErrorFnLabel};
use crate::adapter::datastore::AppDStoreMariaDB;
use crate::model::RetentionScope;

pub(super) const DATETIME_FMT_P0F: &str = "%Y-%m-%d %H:%M:%S";

pub(super) fn fmt_datetime(t: DateTime<Utc>) -> String {
    t.trunc_subsecs(0).format(DATETIME_FMT_P0F).to_string()
}

#[allow(non_snake_case)]
pub(super) fn raw_column_to_datetime(
    val: mysql_async::Value,
) -> Result<DateTime<Utc>, (AppErrorCode, AppRepoErrorDetail)> {
    let result = if let mysql_async::Value::Date(Y, M, D, h, m, s, us) = val {
        let res_d = NaiveDate::from_ymd_opt(Y as i32, M as u32, D as u32).ok_or("date-parse-fail");
        let res_t = NaiveTime::from_hms_micro_opt(h as u32, m as u32, s as u32, us)
            .ok_or("time-parse-fail");
        match (res_d, res_t) {
            (Ok(d), Ok(t)) => Ok(NaiveDateTime::new(d, t).and_utc().trunc_subsecs(0)),
            (Err(e), _) => Err(e),
            (Ok(_), Err(e)) => Err(e),
        }
    } else {
        Err("datetime-unknown-value-type")
    };
    result.map_err(|msg| {
        (
            AppErrorCode::DataCorruption,
            AppRepoErrorDetail::DataRowParse(msg.to_string()),
        )
    })
}

#[allow(non_snake_case)]
pub(super) fn raw_column_to_date(
    val: mysql_async::Value,
) -> Result<NaiveDate, (AppErrorCode, AppRepoErrorDetail)> {
    if let mysql_async::Value::Date(Y, M, D, _h, _m, _s, _us) = val {
        NaiveDate::from_ymd_opt(Y as i32, M as u32, D as u32).ok_or((
            AppErrorCode::DataCorruption,
            AppRepoErrorDetail::DataRowParse("date-parse-fail".to_string()),
        ))
    } else {
        Err((
            AppErrorCode::DataCorruption,
            AppRepoErrorDetail::DataRowParse("date-unknown-value-type".to_string()),
        ))
    }
}

/// SQL fragment narrowing a chat-session query to the retention scope
pub(super) fn scope_condition(scope: &RetentionScope) -> &'static str {
    match scope {
        RetentionScope::All => "",
        RetentionScope::Guest => " AND `usr_id` IS NULL",
        RetentionScope::Authenticated => " AND `usr_id` IS NOT NULL",
    }
}

/// `?, ?, ... ?` for an IN clause of the given cardinality
pub(super) fn in_placeholders(num: usize) -> String {
    vec!["?"; num].join(",")
}

pub(super) fn log_and_wrap_err(
    ds: &Arc<AppDStoreMariaDB>,
    fn_label: AppRepoErrorFnLabel,
    code: AppErrorCode,
    detail: AppRepoErrorDetail,
) -> AppRepoError {
    let e = AppRepoError {
        fn_label,
        code,
        detail,
    };
    let logctx = ds.log_context();
    app_log_event!(logctx, AppLogLevel::ERROR, "{:?}", e);
    e
}
