mod mariadb;

use std::boxed::Box;
use std::result::Result;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use bazaar_common::api::dto::ListWindowDto;
use bazaar_common::error::AppErrorCode;

use self::mariadb::{
    MariadbChatArchiveRepo, MariadbDiscountRepo, MariadbOrderRepo, MariadbSettingsRepo,
};
use super::datastore::{AppDStoreError, AppDataStoreContext};
use crate::model::{
    ArchiveStatsModel, ChatSessionModel, ComplianceSnapshot, DiscountCodeModel,
    MemberPromotionModel, OrderModel, PickupAddressModel, RetentionJobModel, RetentionScope,
    TelegramChannelModel,
};

#[derive(Debug)]
pub enum AppRepoErrorDetail {
    DataStore(AppDStoreError),
    DatabaseQuery(String),
    DatabaseExec(String),
    DatabaseTxStart(String),
    DatabaseTxCommit(String),
    DataRowParse(String),
    Unknown,
}

#[derive(Debug, Clone, Copy)]
pub enum AppRepoErrorFnLabel {
    InitRepo,
    FetchOrder,
    SaveBookingSuccess,
    RecordBookingFailure,
    UpdateOrderStatus,
    DiscardOrder,
    FetchPickupAddress,
    FetchNotifyChannels,
    SaveNotifyChannel,
    FetchSessions,
    SaveSessions,
    FetchArchivedBefore,
    FetchInactiveSince,
    PurgeSessions,
    SummarizeArchive,
    ComplianceCounts,
    ListArchived,
    SaveRetentionJob,
    FetchDiscount,
    SaveDiscount,
    ListDiscounts,
    SaveMemberPromotion,
}

#[derive(Debug)]
pub struct AppRepoError {
    pub fn_label: AppRepoErrorFnLabel,
    pub code: AppErrorCode,
    pub detail: AppRepoErrorDetail,
}

#[async_trait]
pub trait AbstractOrderRepo: Sync + Send {
    async fn fetch_order(&self, oid: &str) -> Result<Option<OrderModel>, AppRepoError>;

    /// bump the failure counter and keep the latest error message, the
    /// admin retries manually by re-invoking the endpoint
    async fn record_booking_failure(
        &self,
        oid: &str,
        attempts: u32,
        detail: &str,
    ) -> Result<(), AppRepoError>;

    /// persist tracking / AWB fields and the READY_TO_SHIP status in one
    /// statement, failure counters reset along the way
    async fn save_booking_success(&self, order: &OrderModel) -> Result<(), AppRepoError>;

    async fn update_order_status(&self, order: &OrderModel) -> Result<(), AppRepoError>;

    /// cascades to order lines inside one transaction
    async fn discard_order(&self, oid: &str) -> Result<(), AppRepoError>;
}

#[async_trait]
pub trait AbstractChatArchiveRepo: Sync + Send {
    async fn fetch_sessions(&self, ids: &[String]) -> Result<Vec<ChatSessionModel>, AppRepoError>;

    /// write back archive-state columns of every session in the batch
    /// inside a single transaction
    async fn save_sessions(&self, batch: &[ChatSessionModel]) -> Result<(), AppRepoError>;

    async fn fetch_archived_before(
        &self,
        cutoff: DateTime<Utc>,
        scope: RetentionScope,
        limit: u32,
    ) -> Result<Vec<ChatSessionModel>, AppRepoError>;

    async fn fetch_inactive_since(
        &self,
        cutoff: DateTime<Utc>,
        scope: RetentionScope,
        limit: u32,
    ) -> Result<Vec<ChatSessionModel>, AppRepoError>;

    /// dependent messages go first, then the session rows, one
    /// transaction for both, returns the number of purged sessions
    async fn purge_sessions(&self, ids: &[String]) -> Result<u32, AppRepoError>;

    async fn summarize(&self, purge_cutoff: DateTime<Utc>)
        -> Result<ArchiveStatsModel, AppRepoError>;

    async fn compliance_counts(
        &self,
        archive_cutoff: DateTime<Utc>,
        purge_cutoff: DateTime<Utc>,
        margin_days: i64,
        scope: RetentionScope,
    ) -> Result<ComplianceSnapshot, AppRepoError>;

    async fn list_archived(
        &self,
        window: ListWindowDto,
    ) -> Result<Vec<ChatSessionModel>, AppRepoError>;

    async fn save_retention_job(&self, job: &RetentionJobModel) -> Result<(), AppRepoError>;
}

#[async_trait]
pub trait AbstractDiscountRepo: Sync + Send {
    async fn fetch_discount(&self, code: &str)
        -> Result<Option<DiscountCodeModel>, AppRepoError>;
    async fn save_discount(&self, discount: &DiscountCodeModel) -> Result<(), AppRepoError>;
    async fn list_discounts(
        &self,
        window: ListWindowDto,
    ) -> Result<Vec<DiscountCodeModel>, AppRepoError>;
    async fn save_member_promotion(
        &self,
        promo: &MemberPromotionModel,
    ) -> Result<(), AppRepoError>;
}

/// business-profile settings owned by admins, pickup address for courier
/// bookings and telegram notification channels
#[async_trait]
pub trait AbstractSettingsRepo: Sync + Send {
    async fn fetch_pickup_address(&self) -> Result<Option<PickupAddressModel>, AppRepoError>;
    async fn fetch_channels(&self) -> Result<Vec<TelegramChannelModel>, AppRepoError>;
    async fn save_channel(&self, channel: &TelegramChannelModel) -> Result<(), AppRepoError>;
}

pub async fn app_repo_order(
    dstore: Arc<AppDataStoreContext>,
) -> Result<Box<dyn AbstractOrderRepo>, AppRepoError> {
    let repo = MariadbOrderRepo::new(dstore)?;
    Ok(Box::new(repo))
}

pub async fn app_repo_chat_archive(
    dstore: Arc<AppDataStoreContext>,
) -> Result<Box<dyn AbstractChatArchiveRepo>, AppRepoError> {
    let repo = MariadbChatArchiveRepo::new(dstore)?;
    Ok(Box::new(repo))
}

pub async fn app_repo_discount(
    dstore: Arc<AppDataStoreContext>,
) -> Result<Box<dyn AbstractDiscountRepo>, AppRepoError> {
    let repo = MariadbDiscountRepo::new(dstore)?;
    Ok(Box::new(repo))
}

pub async fn app_repo_settings(
    dstore: Arc<AppDataStoreContext>,
) -> Result<Box<dyn AbstractSettingsRepo>, AppRepoError> {
    let repo = MariadbSettingsRepo::new(dstore)?;
    Ok(Box::new(repo))
}
