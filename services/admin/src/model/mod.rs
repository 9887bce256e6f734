mod chat_session;
mod discount;
mod notify;
mod order;
mod retention;

pub use chat_session::{
    ArchiveStatsModel, ChatSessionError, ChatSessionModel, ChatSessionStatus,
    METADATA_KEY_ARCHIVE_REASON, METADATA_KEY_ORIGINAL_STATUS, METADATA_KEY_RESTORATIONS,
};
pub use discount::{
    DiscountCodeModel, DiscountInvalidReason, DiscountKind, MemberPromotionModel,
};
pub use notify::{ChannelPurpose, NotifyChannelError, TelegramChannelModel};
pub use order::{
    AdminOverrideModel, CourierBookingModel, FulfillmentGuardError, OrderLineModel, OrderModel,
    OrderModelError, OrderStatus, PaymentStatus, PickupAddressModel, RecipientModel,
};
pub use retention::{
    ComplianceReportModel, ComplianceSnapshot, RecommendedAction, RetentionJobModel,
    RetentionJobStatus, RetentionPolicy, RetentionPolicySet, RetentionReportModel, RetentionScope,
    NEAR_DEADLINE_MARGIN_DAYS,
};
