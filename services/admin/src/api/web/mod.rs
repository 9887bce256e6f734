mod chat_archive;
mod discount;
pub mod dto;
mod fulfillment;
mod notify;
mod order;
mod retention;

use std::collections::HashMap;

use actix_http::Method;
use actix_web::http::header::ContentType;
use actix_web::http::StatusCode;
use actix_web::{HttpResponse, Route};
use serde::Serialize;

use chat_archive::{
    archive_chat_sessions, list_archived_sessions, read_archive_stats, restore_chat_sessions,
};
use discount::{create_discount, edit_discount, list_discounts, save_member_promotion};
use dto::ErrorRespDto;
use fulfillment::fulfill_order;
use notify::{read_notify_channels, save_notify_channel};
use order::{discard_order, read_order, update_order};
use retention::{read_retention_compliance, read_retention_report, run_retention_policy};

pub struct AppRouteTable {
    pub version: String,
    pub entries: HashMap<String, Route>,
}

impl AppRouteTable {
    pub fn get(ver_req: &str) -> Self {
        let (version, entries) = match ver_req {
            "0.0.1" => (format!("v{ver_req}"), Self::v0_0_1_entries()),
            _others => (String::new(), HashMap::new()),
        };
        Self { version, entries }
    }

    fn v0_0_1_entries() -> HashMap<String, Route> {
        let data = [
            (
                "fulfill_order".to_string(),
                Route::new().method(Method::POST).to(fulfill_order),
            ),
            (
                "read_order".to_string(),
                Route::new().method(Method::GET).to(read_order),
            ),
            (
                "update_order".to_string(),
                Route::new().method(Method::PATCH).to(update_order),
            ),
            (
                "discard_order".to_string(),
                Route::new().method(Method::DELETE).to(discard_order),
            ),
            (
                "list_archived_sessions".to_string(),
                Route::new().method(Method::GET).to(list_archived_sessions),
            ),
            (
                "read_archive_stats".to_string(),
                Route::new().method(Method::GET).to(read_archive_stats),
            ),
            (
                "archive_chat_sessions".to_string(),
                Route::new().method(Method::POST).to(archive_chat_sessions),
            ),
            (
                "restore_chat_sessions".to_string(),
                Route::new().method(Method::POST).to(restore_chat_sessions),
            ),
            (
                "run_retention_policy".to_string(),
                Route::new().method(Method::POST).to(run_retention_policy),
            ),
            (
                "read_retention_compliance".to_string(),
                Route::new()
                    .method(Method::GET)
                    .to(read_retention_compliance),
            ),
            (
                "read_retention_report".to_string(),
                Route::new().method(Method::GET).to(read_retention_report),
            ),
            (
                "create_discount".to_string(),
                Route::new().method(Method::POST).to(create_discount),
            ),
            (
                "edit_discount".to_string(),
                Route::new().method(Method::PATCH).to(edit_discount),
            ),
            (
                "list_discounts".to_string(),
                Route::new().method(Method::GET).to(list_discounts),
            ),
            (
                "save_member_promotion".to_string(),
                Route::new().method(Method::PUT).to(save_member_promotion),
            ),
            (
                "read_notify_channels".to_string(),
                Route::new().method(Method::GET).to(read_notify_channels),
            ),
            (
                "save_notify_channel".to_string(),
                Route::new().method(Method::PUT).to(save_notify_channel),
            ),
        ];
        HashMap::from(data)
    } // end of fn v0_0_1_entries
} // end of impl AppRouteTable

pub(super) fn resp_json<T: Serialize>(status: StatusCode, body: &T) -> HttpResponse {
    let serial = serde_json::to_vec(body).unwrap();
    HttpResponse::build(status)
        .append_header(ContentType::json())
        .body(serial)
}

pub(super) fn resp_error(status: StatusCode, body: ErrorRespDto) -> HttpResponse {
    resp_json(status, &body)
}

/// data store misconfigured or unreachable at repo construction
pub(super) fn resp_repo_init_failure() -> HttpResponse {
    HttpResponse::ServiceUnavailable()
        .append_header(ContentType::plaintext())
        .body("")
}
