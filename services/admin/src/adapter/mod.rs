mod base_client;
pub mod datastore;
pub mod notify;
pub mod repository;
pub mod shipping;

pub use base_client::{BaseClientError, BaseClientErrorReason};
