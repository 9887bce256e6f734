use std::result::Result;

use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;

use super::super::{
    AbstractShipmentAggregator, AppAggregatorError, ShipmentQuoteModel, ShipmentReceiptModel,
};
use crate::model::{OrderModel, PickupAddressModel};

/// stand-in wired up under `test` third-party configuration, replies are
/// derived from the request so assertions can correlate them, nothing
/// leaves the process
pub(crate) struct MockShipmentAggregator {
    _data_src: String,
}

impl MockShipmentAggregator {
    pub(crate) fn build(data_src: &str) -> Self {
        Self {
            _data_src: data_src.to_string(),
        }
    }
}

#[async_trait]
impl AbstractShipmentAggregator for MockShipmentAggregator {
    async fn create_shipment(
        &self,
        order: &OrderModel,
        _pickup: &PickupAddressModel,
        service_id: &str,
        _pickup_date: NaiveDate,
    ) -> Result<ShipmentQuoteModel, AppAggregatorError> {
        Ok(ShipmentQuoteModel {
            aggregator_order_no: format!("EPMOCK-{}-{}", service_id, order.order_number),
            courier_name: "Mock Express".to_string(),
            price: Decimal::new(850, 2),
        })
    }

    async fn pay_shipment(
        &self,
        aggregator_order_no: &str,
    ) -> Result<ShipmentReceiptModel, AppAggregatorError> {
        Ok(ShipmentReceiptModel {
            tracking_number: format!("TRK{aggregator_order_no}"),
            awb_number: format!("AWB{aggregator_order_no}"),
            awb_url: Some(format!("https://mock.awb.local/{aggregator_order_no}.pdf")),
        })
    }

    async fn check_balance(&self) -> Result<Decimal, AppAggregatorError> {
        Ok(Decimal::new(10000, 2))
    }
} // end of impl MockShipmentAggregator
