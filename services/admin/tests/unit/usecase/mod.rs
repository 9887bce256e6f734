mod archive_chat;
mod fulfill_order;
mod retention;

use std::result::Result;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;

use bazaar_common::api::dto::ListWindowDto;
use bazaar_common::error::AppErrorCode;

use admin::adapter::notify::{AbstractChatNotifier, AbstractMailSender, AppNotifyError};
use admin::adapter::repository::{
    AbstractChatArchiveRepo, AbstractOrderRepo, AbstractSettingsRepo, AppRepoError,
    AppRepoErrorDetail, AppRepoErrorFnLabel,
};
use admin::adapter::shipping::{
    AbstractShipmentAggregator, AppAggregatorError, ShipmentQuoteModel, ShipmentReceiptModel,
};
use admin::model::{
    ArchiveStatsModel, ChatSessionModel, ChatSessionStatus, ComplianceSnapshot, OrderModel,
    PickupAddressModel, RetentionJobModel, RetentionScope, TelegramChannelModel,
};

use super::{ut_chat_session, ut_time};

pub(super) fn ut_repo_error(fn_label: AppRepoErrorFnLabel) -> AppRepoError {
    AppRepoError {
        fn_label,
        code: AppErrorCode::RemoteDbServerFailure,
        detail: AppRepoErrorDetail::DatabaseQuery("connection reset by peer".to_string()),
    }
}

pub(super) fn ut_archived_session(
    sid: &str,
    archived_at: DateTime<Utc>,
    retention_until: DateTime<Utc>,
) -> ChatSessionModel {
    let mut s = ut_chat_session(sid, ChatSessionStatus::Ended, archived_at - chrono::Duration::days(1));
    let changed = s.archive(archived_at, "ut-seed", retention_until);
    assert!(changed);
    s
}

// ---------- order repo ----------

#[derive(Default)]
pub(super) struct MockOrderRepo {
    pub(super) fetch_results: Mutex<Vec<Result<Option<OrderModel>, AppRepoError>>>,
    pub(super) booking_failures: Arc<Mutex<Vec<(String, u32, String)>>>,
    // (order id, status, tracking number) captured on booking success
    pub(super) saved_bookings: Arc<Mutex<Vec<(String, String, String)>>>,
    pub(super) save_success_result: Mutex<Option<Result<(), AppRepoError>>>,
    pub(super) update_status_result: Mutex<Option<Result<(), AppRepoError>>>,
    pub(super) discard_result: Mutex<Option<Result<(), AppRepoError>>>,
}

#[async_trait]
impl AbstractOrderRepo for MockOrderRepo {
    async fn fetch_order(&self, _oid: &str) -> Result<Option<OrderModel>, AppRepoError> {
        let mut g = self.fetch_results.lock().unwrap();
        assert!(!g.is_empty(), "unexpected fetch_order invocation");
        g.remove(0)
    }
    async fn record_booking_failure(
        &self,
        oid: &str,
        attempts: u32,
        detail: &str,
    ) -> Result<(), AppRepoError> {
        let mut g = self.booking_failures.lock().unwrap();
        g.push((oid.to_string(), attempts, detail.to_string()));
        Ok(())
    }
    async fn save_booking_success(&self, order: &OrderModel) -> Result<(), AppRepoError> {
        let mut g = self.saved_bookings.lock().unwrap();
        g.push((
            order.id.clone(),
            order.status.as_str().to_string(),
            order.booking.tracking_number.clone().unwrap_or_default(),
        ));
        let mut slot = self.save_success_result.lock().unwrap();
        slot.take().unwrap_or(Ok(()))
    }
    async fn update_order_status(&self, _order: &OrderModel) -> Result<(), AppRepoError> {
        let mut slot = self.update_status_result.lock().unwrap();
        slot.take().unwrap_or(Ok(()))
    }
    async fn discard_order(&self, _oid: &str) -> Result<(), AppRepoError> {
        let mut slot = self.discard_result.lock().unwrap();
        slot.take().unwrap_or(Ok(()))
    }
} // end of impl MockOrderRepo

// ---------- settings repo ----------

#[derive(Default)]
pub(super) struct MockSettingsRepo {
    pub(super) pickup_result: Mutex<Option<Result<Option<PickupAddressModel>, AppRepoError>>>,
    pub(super) channels: Mutex<Vec<(String, i64, bool)>>,
}

#[async_trait]
impl AbstractSettingsRepo for MockSettingsRepo {
    async fn fetch_pickup_address(&self) -> Result<Option<PickupAddressModel>, AppRepoError> {
        let mut slot = self.pickup_result.lock().unwrap();
        slot.take().unwrap_or(Ok(None))
    }
    async fn fetch_channels(&self) -> Result<Vec<TelegramChannelModel>, AppRepoError> {
        Ok(Vec::new())
    }
    async fn save_channel(&self, channel: &TelegramChannelModel) -> Result<(), AppRepoError> {
        let mut g = self.channels.lock().unwrap();
        g.push((
            channel.purpose.as_str().to_string(),
            channel.chat_id,
            channel.enabled,
        ));
        Ok(())
    }
} // end of impl MockSettingsRepo

// ---------- shipment aggregator ----------

#[derive(Default)]
pub(super) struct MockShipmentAggregator {
    pub(super) create_result: Mutex<Option<Result<ShipmentQuoteModel, AppAggregatorError>>>,
    pub(super) pay_result: Mutex<Option<Result<ShipmentReceiptModel, AppAggregatorError>>>,
    pub(super) num_create_calls: Arc<AtomicU32>,
    pub(super) num_pay_calls: Arc<AtomicU32>,
}

#[async_trait]
impl AbstractShipmentAggregator for MockShipmentAggregator {
    async fn create_shipment(
        &self,
        _order: &OrderModel,
        _pickup: &PickupAddressModel,
        _service_id: &str,
        _pickup_date: NaiveDate,
    ) -> Result<ShipmentQuoteModel, AppAggregatorError> {
        self.num_create_calls.fetch_add(1, Ordering::Relaxed);
        let mut slot = self.create_result.lock().unwrap();
        slot.take().expect("unexpected create_shipment invocation")
    }
    async fn pay_shipment(
        &self,
        _aggregator_order_no: &str,
    ) -> Result<ShipmentReceiptModel, AppAggregatorError> {
        self.num_pay_calls.fetch_add(1, Ordering::Relaxed);
        let mut slot = self.pay_result.lock().unwrap();
        slot.take().expect("unexpected pay_shipment invocation")
    }
    async fn check_balance(&self) -> Result<Decimal, AppAggregatorError> {
        Ok(Decimal::new(10000, 2))
    }
} // end of impl MockShipmentAggregator

// ---------- notifications ----------

#[derive(Default)]
pub(super) struct MockMailSender {
    pub(super) num_sent: Arc<AtomicU32>,
    pub(super) send_result: Mutex<Option<Result<(), AppNotifyError>>>,
}

#[async_trait]
impl AbstractMailSender for MockMailSender {
    async fn send_order_shipped(&self, _order: &OrderModel) -> Result<(), AppNotifyError> {
        self.num_sent.fetch_add(1, Ordering::Relaxed);
        let mut slot = self.send_result.lock().unwrap();
        slot.take().unwrap_or(Ok(()))
    }
}

#[derive(Default)]
pub(super) struct MockChatNotifier {
    pub(super) num_sent: Arc<AtomicU32>,
}

#[async_trait]
impl AbstractChatNotifier for MockChatNotifier {
    async fn send_message(&self, _chat_id: i64, _text: &str) -> Result<(), AppNotifyError> {
        self.num_sent.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }
}

// ---------- chat archive repo ----------

#[derive(Default)]
pub(super) struct MockChatArchiveRepo {
    pub(super) fetch_results: Mutex<Vec<Result<Vec<ChatSessionModel>, AppRepoError>>>,
    pub(super) save_results: Mutex<Vec<Result<(), AppRepoError>>>,
    // (session id, status written back) per saved batch
    pub(super) saved_batches: Arc<Mutex<Vec<Vec<(String, String)>>>>,
    pub(super) archived_before_result:
        Mutex<Option<Result<Vec<ChatSessionModel>, AppRepoError>>>,
    pub(super) inactive_result: Mutex<Option<Result<Vec<ChatSessionModel>, AppRepoError>>>,
    pub(super) purge_result: Mutex<Option<Result<u32, AppRepoError>>>,
    pub(super) purged_ids: Arc<Mutex<Vec<Vec<String>>>>,
    pub(super) summarize_result: Mutex<Option<Result<ArchiveStatsModel, AppRepoError>>>,
    pub(super) compliance_result: Mutex<Option<Result<ComplianceSnapshot, AppRepoError>>>,
    pub(super) list_result: Mutex<Option<Result<Vec<ChatSessionModel>, AppRepoError>>>,
    // (policy name, status) per persisted job record
    pub(super) saved_jobs: Arc<Mutex<Vec<(String, String)>>>,
}

#[async_trait]
impl AbstractChatArchiveRepo for MockChatArchiveRepo {
    async fn fetch_sessions(&self, _ids: &[String]) -> Result<Vec<ChatSessionModel>, AppRepoError> {
        let mut g = self.fetch_results.lock().unwrap();
        assert!(!g.is_empty(), "unexpected fetch_sessions invocation");
        g.remove(0)
    }
    async fn save_sessions(&self, batch: &[ChatSessionModel]) -> Result<(), AppRepoError> {
        let result = {
            let mut g = self.save_results.lock().unwrap();
            if g.is_empty() {
                Ok(())
            } else {
                g.remove(0)
            }
        };
        if result.is_ok() {
            let captured = batch
                .iter()
                .map(|s| (s.session_id.clone(), s.status.as_str().to_string()))
                .collect::<Vec<_>>();
            let mut g = self.saved_batches.lock().unwrap();
            g.push(captured);
        }
        result
    }
    async fn fetch_archived_before(
        &self,
        _cutoff: DateTime<Utc>,
        _scope: RetentionScope,
        _limit: u32,
    ) -> Result<Vec<ChatSessionModel>, AppRepoError> {
        let mut slot = self.archived_before_result.lock().unwrap();
        slot.take().unwrap_or(Ok(Vec::new()))
    }
    async fn fetch_inactive_since(
        &self,
        _cutoff: DateTime<Utc>,
        _scope: RetentionScope,
        _limit: u32,
    ) -> Result<Vec<ChatSessionModel>, AppRepoError> {
        let mut slot = self.inactive_result.lock().unwrap();
        slot.take().unwrap_or(Ok(Vec::new()))
    }
    async fn purge_sessions(&self, ids: &[String]) -> Result<u32, AppRepoError> {
        let mut g = self.purged_ids.lock().unwrap();
        g.push(ids.to_vec());
        let mut slot = self.purge_result.lock().unwrap();
        slot.take().unwrap_or(Ok(ids.len() as u32))
    }
    async fn summarize(
        &self,
        _purge_cutoff: DateTime<Utc>,
    ) -> Result<ArchiveStatsModel, AppRepoError> {
        let mut slot = self.summarize_result.lock().unwrap();
        slot.take().unwrap_or(Ok(ArchiveStatsModel::default()))
    }
    async fn compliance_counts(
        &self,
        _archive_cutoff: DateTime<Utc>,
        _purge_cutoff: DateTime<Utc>,
        _margin_days: i64,
        _scope: RetentionScope,
    ) -> Result<ComplianceSnapshot, AppRepoError> {
        let mut slot = self.compliance_result.lock().unwrap();
        slot.take().unwrap_or(Ok(ComplianceSnapshot::default()))
    }
    async fn list_archived(
        &self,
        _window: ListWindowDto,
    ) -> Result<Vec<ChatSessionModel>, AppRepoError> {
        let mut slot = self.list_result.lock().unwrap();
        slot.take().unwrap_or(Ok(Vec::new()))
    }
    async fn save_retention_job(&self, job: &RetentionJobModel) -> Result<(), AppRepoError> {
        let mut g = self.saved_jobs.lock().unwrap();
        g.push((job.policy_name.clone(), job.status.as_str().to_string()));
        Ok(())
    }
} // end of impl MockChatArchiveRepo

pub(super) fn ut_old_archived_session(now_offset_days: i64) -> ChatSessionModel {
    let now = ut_time(2025, 6, 1);
    ut_archived_session(
        "s-old",
        now - chrono::Duration::days(now_offset_days),
        now - chrono::Duration::days(now_offset_days - 365),
    )
}
