use std::boxed::Box;

use crate::adapter::repository::{AbstractOrderRepo, AppRepoError};
use crate::model::{OrderModel, OrderModelError, OrderStatus};

pub enum OrderMgtUcError {
    OrderNotFound,
    InvalidStatusInput(String),
    InvalidTransition { from: OrderStatus, to: OrderStatus },
    MissingOverrideReason,
    DeleteNotAllowed(OrderStatus),
    DataStoreError(AppRepoError),
}

impl From<AppRepoError> for OrderMgtUcError {
    fn from(value: AppRepoError) -> Self {
        Self::DataStoreError(value)
    }
}

impl From<OrderModelError> for OrderMgtUcError {
    fn from(value: OrderModelError) -> Self {
        match value {
            OrderModelError::InvalidTransition { from, to } => Self::InvalidTransition { from, to },
            OrderModelError::MissingOverrideReason => Self::MissingOverrideReason,
            OrderModelError::DeleteNotAllowed(s) => Self::DeleteNotAllowed(s),
            OrderModelError::CorruptedRow(d) => Self::InvalidStatusInput(d),
        }
    }
}

pub struct OrderMgtUseCase {
    pub repo: Box<dyn AbstractOrderRepo>,
}

impl OrderMgtUseCase {
    pub async fn read_order(&self, oid: &str) -> Result<OrderModel, OrderMgtUcError> {
        self.repo
            .fetch_order(oid)
            .await?
            .ok_or(OrderMgtUcError::OrderNotFound)
    }

    pub async fn update_status(
        &self,
        oid: &str,
        next_raw: &str,
        overridden: bool,
        reason: Option<String>,
    ) -> Result<OrderModel, OrderMgtUcError> {
        let next = OrderStatus::try_from_raw(next_raw)
            .map_err(|_e| OrderMgtUcError::InvalidStatusInput(next_raw.to_string()))?;
        let mut order = self.read_order(oid).await?;
        order.admin_transition(next, overridden, reason)?;
        self.repo.update_order_status(&order).await?;
        Ok(order)
    }

    pub async fn discard(&self, oid: &str) -> Result<(), OrderMgtUcError> {
        let order = self.read_order(oid).await?;
        if !order.deletable() {
            return Err(OrderMgtUcError::DeleteNotAllowed(order.status));
        }
        self.repo.discard_order(oid).await?;
        Ok(())
    }
} // end of impl OrderMgtUseCase
