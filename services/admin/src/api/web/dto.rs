use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::model::{
    ArchiveStatsModel, ChatSessionModel, ComplianceReportModel, DiscountCodeModel, OrderModel,
    RetentionJobModel, RetentionReportModel, TelegramChannelModel,
};

fn fmt_time(t: DateTime<Utc>) -> String {
    t.to_rfc3339_opts(SecondsFormat::Secs, true)
}

// ---- error body shared by every admin endpoint ----

#[derive(Serialize)]
pub struct ErrorRespDto {
    pub success: bool,
    pub code: &'static str,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_balance: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aggregator_order_no: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<Vec<String>>,
}

impl ErrorRespDto {
    pub fn new(code: &'static str, message: String) -> Self {
        Self {
            success: false,
            code,
            message,
            current_balance: None,
            aggregator_order_no: None,
            detail: None,
        }
    }
    pub fn with_detail(code: &'static str, message: String, detail: Vec<String>) -> Self {
        let mut out = Self::new(code, message);
        out.detail = Some(detail);
        out
    }
}

// ---- order fulfillment ----

#[derive(Deserialize)]
pub struct FulfillOrderReqDto {
    pub service_id: String,
    pub pickup_date: String, // YYYY-MM-DD
    pub overridden_by_admin: Option<bool>,
    pub admin_override_reason: Option<String>,
}

#[derive(Serialize)]
pub struct TrackingRespDto {
    pub tracking_number: String,
    pub awb_number: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub awb_url: Option<String>,
    pub courier_name: String,
}

#[derive(Serialize)]
pub struct PickupRespDto {
    pub scheduled_date: String,
}

#[derive(Serialize)]
pub struct FulfillOrderRespDto {
    pub success: bool,
    pub tracking: TrackingRespDto,
    pub pickup: PickupRespDto,
    // internal shipment id at the aggregator, kept for debugging
    pub aggregator_shipment_id: String,
}

// ---- order admin CRUD ----

#[derive(Serialize)]
pub struct OrderLineRespDto {
    pub product_id: u64,
    pub product_name: String,
    pub quantity: u32,
    pub unit_price: String,
    pub total_price: String,
}

#[derive(Serialize)]
pub struct OrderRespDto {
    pub id: String,
    pub order_number: String,
    pub status: &'static str,
    pub payment_status: &'static str,
    pub currency: &'static str,
    pub subtotal: String,
    pub tax: String,
    pub shipping_fee: String,
    pub total: String,
    pub shipping_weight_kg: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tracking_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub airway_bill_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub airway_bill_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub courier_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scheduled_pickup_date: Option<String>,
    pub failed_booking_attempts: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_booking_error: Option<String>,
    pub overridden_by_admin: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub admin_override_reason: Option<String>,
    pub lines: Vec<OrderLineRespDto>,
    pub create_time: String,
}

impl From<OrderModel> for OrderRespDto {
    fn from(value: OrderModel) -> Self {
        let b = value.booking;
        Self {
            id: value.id,
            order_number: value.order_number,
            status: value.status.as_str(),
            payment_status: value.payment_status.as_str(),
            currency: value.currency.as_str(),
            subtotal: value.subtotal.to_string(),
            tax: value.tax.to_string(),
            shipping_fee: value.shipping_fee.to_string(),
            total: value.total.to_string(),
            shipping_weight_kg: value.shipping_weight_kg.to_string(),
            tracking_number: b.tracking_number,
            airway_bill_number: b.airway_bill_number,
            airway_bill_url: b.airway_bill_url,
            courier_name: b.courier_name,
            scheduled_pickup_date: b
                .scheduled_pickup_date
                .map(|d| d.format("%Y-%m-%d").to_string()),
            failed_booking_attempts: b.failed_attempts,
            last_booking_error: b.last_error,
            overridden_by_admin: value.override_audit.overridden,
            admin_override_reason: value.override_audit.reason,
            lines: value
                .lines
                .into_iter()
                .map(|l| OrderLineRespDto {
                    product_id: l.product_id,
                    product_name: l.product_name,
                    quantity: l.quantity,
                    unit_price: l.unit_price.to_string(),
                    total_price: l.total_price.to_string(),
                })
                .collect(),
            create_time: fmt_time(value.create_time),
        }
    } // end of fn from
}

#[derive(Deserialize)]
pub struct OrderPatchReqDto {
    pub status: String,
    pub overridden_by_admin: Option<bool>,
    pub admin_override_reason: Option<String>,
}

// ---- chat archive ----

#[derive(Deserialize)]
pub struct ArchiveSessionsReqDto {
    pub session_ids: Vec<String>,
    pub reason: String,
    pub scheduled_purge_date: Option<DateTime<Utc>>,
}

#[derive(Serialize)]
pub struct ArchiveSessionsRespDto {
    pub success: bool,
    pub num_archived: u32,
    pub num_skipped: u32,
    pub errors: Vec<String>,
}

#[derive(Deserialize)]
pub struct RestoreSessionsReqDto {
    pub session_ids: Vec<String>,
    pub reason: String,
    pub restore_to: Option<String>,
}

#[derive(Serialize)]
pub struct RestoreSessionsRespDto {
    pub success: bool,
    pub num_restored: u32,
    pub rejected: Vec<String>,
}

#[derive(Serialize)]
pub struct ChatSessionRespDto {
    pub session_id: String,
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usr_id: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub guest_email: Option<String>,
    pub created_at: String,
    pub last_activity: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub archived_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retention_until: Option<String>,
}

impl From<ChatSessionModel> for ChatSessionRespDto {
    fn from(value: ChatSessionModel) -> Self {
        Self {
            session_id: value.session_id,
            status: value.status.as_str(),
            usr_id: value.usr_id,
            guest_email: value.guest_email,
            created_at: fmt_time(value.created_at),
            last_activity: fmt_time(value.last_activity),
            archived_at: value.archived_at.map(fmt_time),
            retention_until: value.retention_until.map(fmt_time),
        }
    }
}

#[derive(Serialize)]
pub struct ArchiveStatsRespDto {
    pub total_sessions: u64,
    pub num_active: u64,
    pub num_ended: u64,
    pub num_archived: u64,
    pub purge_eligible: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub oldest_archived_at: Option<String>,
}

impl From<ArchiveStatsModel> for ArchiveStatsRespDto {
    fn from(value: ArchiveStatsModel) -> Self {
        Self {
            total_sessions: value.total_sessions,
            num_active: value.num_active,
            num_ended: value.num_ended,
            num_archived: value.num_archived,
            purge_eligible: value.purge_eligible,
            oldest_archived_at: value.oldest_archived_at.map(fmt_time),
        }
    }
}

// ---- retention ----

#[derive(Deserialize)]
pub struct RetentionJobReqDto {
    pub policy: Option<String>,
}

#[derive(Deserialize)]
pub struct RetentionQueryDto {
    pub policy: Option<String>,
}

#[derive(Serialize)]
pub struct RetentionJobRespDto {
    pub job_id: String,
    pub policy_name: String,
    pub status: &'static str,
    pub num_archived: u32,
    pub num_purged: u32,
    pub errors: Vec<String>,
    pub started_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub finished_at: Option<String>,
}

impl From<RetentionJobModel> for RetentionJobRespDto {
    fn from(value: RetentionJobModel) -> Self {
        Self {
            job_id: value.job_id,
            policy_name: value.policy_name,
            status: value.status.as_str(),
            num_archived: value.num_archived,
            num_purged: value.num_purged,
            errors: value.errors,
            started_at: fmt_time(value.started_at),
            finished_at: value.finished_at.map(fmt_time),
        }
    }
}

#[derive(Serialize)]
pub struct ComplianceRespDto {
    pub policy_name: String,
    pub checked_at: String,
    pub score: u8,
    pub total_sessions: u64,
    pub overdue_archive: u32,
    pub overdue_purge: u32,
    pub warnings: Vec<String>,
}

impl From<ComplianceReportModel> for ComplianceRespDto {
    fn from(value: ComplianceReportModel) -> Self {
        Self {
            policy_name: value.policy_name,
            checked_at: fmt_time(value.checked_at),
            score: value.score,
            total_sessions: value.snapshot.total_sessions,
            overdue_archive: value.snapshot.overdue_archive,
            overdue_purge: value.snapshot.overdue_purge,
            warnings: value.warnings,
        }
    }
}

#[derive(Serialize)]
pub struct NextActionRespDto {
    pub operation: &'static str,
    // advisory only, nothing is scheduled by this service
    pub run_after: String,
    pub estimated_sessions: u64,
}

#[derive(Serialize)]
pub struct RetentionReportRespDto {
    pub policy_name: String,
    pub generated_at: String,
    pub total_sessions: u64,
    pub num_archived: u64,
    pub archive_eligible: u64,
    pub purge_eligible: u64,
    pub next_actions: Vec<NextActionRespDto>,
}

impl From<RetentionReportModel> for RetentionReportRespDto {
    fn from(value: RetentionReportModel) -> Self {
        Self {
            policy_name: value.policy_name,
            generated_at: fmt_time(value.generated_at),
            total_sessions: value.total_sessions,
            num_archived: value.num_archived,
            archive_eligible: value.archive_eligible,
            purge_eligible: value.purge_eligible,
            next_actions: value
                .next_actions
                .into_iter()
                .map(|a| NextActionRespDto {
                    operation: a.operation,
                    run_after: fmt_time(a.run_after),
                    estimated_sessions: a.estimated_sessions,
                })
                .collect(),
        }
    }
}

// ---- discounts / member promotion ----

#[derive(Deserialize)]
pub struct DiscountReqDto {
    pub code: String,
    pub kind: String,
    pub value: String, // stringified decimal
    pub min_order_total: Option<String>,
    pub max_discount_amount: Option<String>,
    pub usage_limit: Option<u32>,
    pub starts_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub member_only: bool,
}

#[derive(Serialize)]
pub struct DiscountRespDto {
    pub code: String,
    pub kind: &'static str,
    pub value: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_order_total: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_discount_amount: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage_limit: Option<u32>,
    pub times_used: u32,
    pub starts_at: String,
    pub expires_at: String,
    pub member_only: bool,
}

impl From<DiscountCodeModel> for DiscountRespDto {
    fn from(value: DiscountCodeModel) -> Self {
        Self {
            code: value.code,
            kind: value.kind.as_str(),
            value: value.value.to_string(),
            min_order_total: value.min_order_total.map(|v| v.to_string()),
            max_discount_amount: value.max_discount_amount.map(|v| v.to_string()),
            usage_limit: value.usage_limit,
            times_used: value.times_used,
            starts_at: fmt_time(value.starts_at),
            expires_at: fmt_time(value.expires_at),
            member_only: value.member_only,
        }
    }
}

#[derive(Deserialize)]
pub struct MemberPromotionReqDto {
    pub product_id: u64,
    pub regular_price: String,
    pub member_price: String,
    pub starts_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

// ---- telegram notification channels ----

#[derive(Serialize)]
pub struct ChannelRespDto {
    pub purpose: &'static str,
    pub chat_id: i64,
    pub enabled: bool,
}

impl From<TelegramChannelModel> for ChannelRespDto {
    fn from(value: TelegramChannelModel) -> Self {
        Self {
            purpose: value.purpose.as_str(),
            chat_id: value.chat_id,
            enabled: value.enabled,
        }
    }
}

#[derive(Deserialize)]
pub struct SaveChannelReqDto {
    pub purpose: String,
    pub chat_id: i64,
    pub enabled: bool,
    pub send_test_message: Option<bool>,
}
