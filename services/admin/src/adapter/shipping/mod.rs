mod easyparcel;

use std::boxed::Box;
use std::result::Result;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;

use bazaar_common::confidentiality::AbstractConfidentiality;
use bazaar_common::config::App3rdPartyCfg;
use bazaar_common::logging::AppLogContext;

use self::easyparcel::{AppEasyParcelAggregator, MockShipmentAggregator};
use super::base_client::BaseClientError;
use crate::model::{OrderModel, PickupAddressModel};

const AGGREGATOR_CFG_LABEL: &str = "easyparcel";

/// details handed back by the aggregator once a shipment is created,
/// the shipment is NOT paid yet at this point
pub struct ShipmentQuoteModel {
    pub aggregator_order_no: String,
    pub courier_name: String,
    pub price: Decimal,
}

/// details handed back once the created shipment has been paid
pub struct ShipmentReceiptModel {
    pub tracking_number: String,
    pub awb_number: String,
    pub awb_url: Option<String>,
}

#[derive(Debug)]
pub enum AppAggregatorErrorReason {
    InvalidConfig,
    MissingCredential,
    CredentialCorrupted,
    LowLvlNet(BaseClientError),
    // current credit balance attached so the admin knows how much to top up
    InsufficientBalance(Decimal),
    RemoteRejected { error_code: String, detail: String },
    CorruptedReply(String),
}

#[derive(Debug)]
pub enum AppAggregatorFnLabel {
    TryBuild,
    CreateShipment,
    PayShipment,
    CheckBalance,
}

#[derive(Debug)]
pub struct AppAggregatorError {
    pub reason: AppAggregatorErrorReason,
    pub fn_label: AppAggregatorFnLabel,
}

impl From<BaseClientError> for AppAggregatorErrorReason {
    fn from(value: BaseClientError) -> Self {
        Self::LowLvlNet(value)
    }
}

#[async_trait]
pub trait AbstractShipmentAggregator: Send + Sync {
    async fn create_shipment(
        &self,
        order: &OrderModel,
        pickup: &PickupAddressModel,
        service_id: &str,
        pickup_date: NaiveDate,
    ) -> Result<ShipmentQuoteModel, AppAggregatorError>;

    async fn pay_shipment(
        &self,
        aggregator_order_no: &str,
    ) -> Result<ShipmentReceiptModel, AppAggregatorError>;

    async fn check_balance(&self) -> Result<Decimal, AppAggregatorError>;
}

pub(crate) fn app_shipment_aggregator(
    cfgs3pt: &[Arc<App3rdPartyCfg>],
    cfdntl: Arc<Box<dyn AbstractConfidentiality>>,
    logctx: Arc<AppLogContext>,
) -> Result<Box<dyn AbstractShipmentAggregator>, AppAggregatorError> {
    let found = cfgs3pt
        .iter()
        .find(|c| c.label().eq_ignore_ascii_case(AGGREGATOR_CFG_LABEL))
        .ok_or(AppAggregatorError {
            reason: AppAggregatorErrorReason::InvalidConfig,
            fn_label: AppAggregatorFnLabel::TryBuild,
        })?;
    match found.as_ref() {
        App3rdPartyCfg::dev {
            name: _,
            host,
            port,
            confidentiality_path,
        } => {
            let obj = AppEasyParcelAggregator::try_build(
                host.clone(),
                *port,
                confidentiality_path.as_str(),
                cfdntl,
                logctx,
            )?;
            Ok(Box::new(obj))
        }
        App3rdPartyCfg::test { name: _, data_src } => {
            let obj = MockShipmentAggregator::build(data_src.as_str());
            Ok(Box::new(obj))
        }
    }
} // end of fn app_shipment_aggregator
