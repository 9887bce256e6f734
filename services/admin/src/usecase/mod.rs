mod archive_chat;
mod edit_discount;
mod fulfill_order;
mod manage_order;
mod notify_cfg;
mod retention;

pub use archive_chat::{
    ArchiveOutcome, ArchiveTaskConfig, ChatArchiveUcError, ChatArchiveUseCase, RestoreOutcome,
};
pub use edit_discount::{DiscountEditUseCase, DiscountUcError};
pub use fulfill_order::{
    FulfillOrderRequest, FulfillOrderResult, FulfillOrderUcError, FulfillOrderUseCase,
};
pub use manage_order::{OrderMgtUcError, OrderMgtUseCase};
pub use notify_cfg::{NotifyCfgUcError, NotifyCfgUseCase};
pub use retention::{RetentionPolicyUseCase, RetentionUcError};
