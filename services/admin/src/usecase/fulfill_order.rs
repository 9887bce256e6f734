use std::boxed::Box;
use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;

use bazaar_common::logging::{app_log_event, AppLogContext, AppLogLevel};

use crate::adapter::notify::{AbstractChatNotifier, AbstractMailSender};
use crate::adapter::repository::{
    AbstractOrderRepo, AbstractSettingsRepo, AppRepoError,
};
use crate::adapter::shipping::{
    AbstractShipmentAggregator, AppAggregatorError, AppAggregatorErrorReason,
};
use crate::model::{ChannelPurpose, FulfillmentGuardError, OrderModel, OrderStatus};

pub enum FulfillOrderUcError {
    ValidationError(Vec<String>),
    OrderNotFound,
    InvalidOrderStatus(OrderStatus),
    AlreadyFulfilled,
    InvalidAddress,
    InvalidWeight(Decimal),
    NotConfigured,
    // current aggregator credit attached for the admin to top up
    InsufficientBalance(Decimal),
    CreateShipmentFailure(String),
    // the shipment exists at the aggregator but stays unpaid, the ID is
    // surfaced so the operation can be reconciled manually
    PayShipmentFailure {
        aggregator_order_no: String,
        detail: String,
    },
    DataStoreError(AppRepoError),
}

impl From<AppRepoError> for FulfillOrderUcError {
    fn from(value: AppRepoError) -> Self {
        Self::DataStoreError(value)
    }
}

impl From<FulfillmentGuardError> for FulfillOrderUcError {
    fn from(value: FulfillmentGuardError) -> Self {
        match value {
            FulfillmentGuardError::InvalidStatus(s) => Self::InvalidOrderStatus(s),
            FulfillmentGuardError::AlreadyFulfilled => Self::AlreadyFulfilled,
            FulfillmentGuardError::MissingShipAddress => Self::InvalidAddress,
            FulfillmentGuardError::NonPositiveWeight(w) => Self::InvalidWeight(w),
        }
    }
}

pub struct FulfillOrderRequest {
    pub service_id: String,
    pub pickup_date: String, // YYYY-MM-DD
    pub overridden_by_admin: bool,
    pub admin_override_reason: Option<String>,
}

pub struct FulfillOrderResult {
    pub order_id: String,
    pub order_number: String,
    pub tracking_number: String,
    pub awb_number: String,
    pub awb_url: Option<String>,
    pub courier_name: String,
    pub pickup_date: NaiveDate,
    pub aggregator_order_no: String,
}

pub struct FulfillOrderUseCase {
    pub repo: Box<dyn AbstractOrderRepo>,
    pub settings_repo: Box<dyn AbstractSettingsRepo>,
    pub aggregator: Arc<Box<dyn AbstractShipmentAggregator>>,
    pub mailer: Arc<Box<dyn AbstractMailSender>>,
    pub notifier: Arc<Box<dyn AbstractChatNotifier>>,
    pub logctx: Arc<AppLogContext>,
}

impl FulfillOrderUseCase {
    pub async fn execute(
        &self,
        oid: &str,
        req: FulfillOrderRequest,
    ) -> Result<FulfillOrderResult, FulfillOrderUcError> {
        let pickup_date = self.validate_request(&req)?;
        let mut order = self
            .repo
            .fetch_order(oid)
            .await?
            .ok_or(FulfillOrderUcError::OrderNotFound)?;
        order.check_ready_for_booking()?;
        let pickup_addr = self
            .settings_repo
            .fetch_pickup_address()
            .await?
            .ok_or(FulfillOrderUcError::NotConfigured)?;

        let quote = match self
            .aggregator
            .create_shipment(&order, &pickup_addr, req.service_id.as_str(), pickup_date)
            .await
        {
            Ok(v) => v,
            Err(e) => {
                let detail = Self::describe_aggregator_err(&e);
                self.persist_booking_failure(&mut order, detail.as_str()).await;
                self.alert_admin(format!(
                    "shipment booking failed, order {}, {}",
                    order.order_number.as_str(),
                    detail.as_str()
                ))
                .await;
                let out = match e.reason {
                    AppAggregatorErrorReason::InsufficientBalance(balance) => {
                        FulfillOrderUcError::InsufficientBalance(balance)
                    }
                    _others => FulfillOrderUcError::CreateShipmentFailure(detail),
                };
                return Err(out);
            }
        };

        let receipt = match self
            .aggregator
            .pay_shipment(quote.aggregator_order_no.as_str())
            .await
        {
            Ok(v) => v,
            Err(e) => {
                let detail = format!(
                    "payment failed for aggregator order {}, {}",
                    quote.aggregator_order_no.as_str(),
                    Self::describe_aggregator_err(&e)
                );
                self.persist_booking_failure(&mut order, detail.as_str()).await;
                self.alert_admin(format!(
                    "shipment paid-state unresolved, order {}, {}",
                    order.order_number.as_str(),
                    detail.as_str()
                ))
                .await;
                return Err(FulfillOrderUcError::PayShipmentFailure {
                    aggregator_order_no: quote.aggregator_order_no,
                    detail,
                });
            }
        };

        order.confirm_booking(
            quote.courier_name.clone(),
            req.service_id.clone(),
            pickup_date,
            receipt.tracking_number.clone(),
            receipt.awb_number.clone(),
            receipt.awb_url.clone(),
        );
        self.repo.save_booking_success(&order).await?;

        // customer email is best-effort, a failed notification never undoes
        // a booked shipment
        if let Err(e) = self.mailer.send_order_shipped(&order).await {
            let logctx_p = &self.logctx;
            app_log_event!(
                logctx_p,
                AppLogLevel::WARNING,
                "order:{}, mail-error:{:?}",
                order.order_number.as_str(),
                e
            );
        }

        Ok(FulfillOrderResult {
            order_id: order.id,
            order_number: order.order_number,
            tracking_number: receipt.tracking_number,
            awb_number: receipt.awb_number,
            awb_url: receipt.awb_url,
            courier_name: quote.courier_name,
            pickup_date,
            aggregator_order_no: quote.aggregator_order_no,
        })
    } // end of fn execute

    fn validate_request(
        &self,
        req: &FulfillOrderRequest,
    ) -> Result<NaiveDate, FulfillOrderUcError> {
        let mut errors = Vec::new();
        if req.service_id.trim().is_empty() {
            errors.push("courier service id must not be empty".to_string());
        }
        let parsed = NaiveDate::parse_from_str(req.pickup_date.as_str(), "%Y-%m-%d");
        let pickup_date = match parsed {
            Ok(d) => {
                if d < Utc::now().date_naive() {
                    errors.push(format!("pickup date {d} lies in the past"));
                }
                Some(d)
            }
            Err(_e) => {
                errors.push(format!(
                    "pickup date `{}` is not of the form YYYY-MM-DD",
                    req.pickup_date.as_str()
                ));
                None
            }
        };
        if req.overridden_by_admin
            && req
                .admin_override_reason
                .as_deref()
                .map_or(true, |r| r.trim().is_empty())
        {
            errors.push("admin override requires a reason".to_string());
        }
        if errors.is_empty() {
            Ok(pickup_date.unwrap())
        } else {
            Err(FulfillOrderUcError::ValidationError(errors))
        }
    } // end of fn validate_request

    /// booking failures stay on the order row so repeated admin retries
    /// are observable, persistence trouble is logged, never masks the
    /// original aggregator error
    async fn persist_booking_failure(&self, order: &mut OrderModel, detail: &str) {
        let attempts = order.booking.record_failure(detail.to_string());
        let result = self
            .repo
            .record_booking_failure(order.id.as_str(), attempts, detail)
            .await;
        if let Err(e) = result {
            let logctx_p = &self.logctx;
            app_log_event!(
                logctx_p,
                AppLogLevel::ERROR,
                "order:{}, {:?}",
                order.id.as_str(),
                e
            );
        }
    }

    async fn alert_admin(&self, text: String) {
        let channels = match self.settings_repo.fetch_channels().await {
            Ok(v) => v,
            Err(_e) => return,
        };
        let found = channels
            .iter()
            .find(|c| c.purpose == ChannelPurpose::Orders && c.enabled);
        if let Some(ch) = found {
            if let Err(e) = self.notifier.send_message(ch.chat_id, text.as_str()).await {
                let logctx_p = &self.logctx;
                app_log_event!(logctx_p, AppLogLevel::WARNING, "telegram-alert, {:?}", e);
            }
        }
    }

    fn describe_aggregator_err(e: &AppAggregatorError) -> String {
        match &e.reason {
            AppAggregatorErrorReason::InsufficientBalance(b) => {
                format!("insufficient aggregator credit, balance {b}")
            }
            AppAggregatorErrorReason::RemoteRejected { error_code, detail } => {
                format!("aggregator rejected, code {error_code}, {detail}")
            }
            AppAggregatorErrorReason::LowLvlNet(inner) => format!("network failure, {inner:?}"),
            _others => format!("{:?}", e.reason),
        }
    }
} // end of impl FulfillOrderUseCase
