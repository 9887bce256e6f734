mod mock;
mod resources;

use std::boxed::Box;
use std::result::Result;
use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use hyper::header::{HeaderName, HeaderValue, ACCEPT, CONTENT_TYPE};
use hyper::Method;
use rust_decimal::Decimal;

use bazaar_common::confidentiality::AbstractConfidentiality;
use bazaar_common::logging::{app_log_event, AppLogContext, AppLogLevel};

pub(super) use mock::MockShipmentAggregator;
use resources::{
    CheckBalanceReq, CheckBalanceResp, PayShipmentReq, PayShipmentResp, SubmitShipmentReq,
    SubmitShipmentResp, API_STATUS_OK, ERROR_CODE_INSUFFICIENT_CREDIT,
};

use super::super::base_client::BaseClient;
use super::{
    AbstractShipmentAggregator, AppAggregatorError, AppAggregatorErrorReason,
    AppAggregatorFnLabel, ShipmentQuoteModel, ShipmentReceiptModel,
};
use crate::model::{OrderModel, PickupAddressModel, RecipientModel};

const PATH_SUBMIT_ORDER: &str = "/api/v1/order/submit";
const PATH_PAY_ORDER: &str = "/api/v1/order/pay";
const PATH_CHECK_BALANCE: &str = "/api/v1/balance";

pub(super) struct AppEasyParcelAggregator {
    api_key: String,
    client: BaseClient,
    logctx: Arc<AppLogContext>,
}

impl AppEasyParcelAggregator {
    pub(super) fn try_build(
        host: String,
        port: u16,
        confidential_path: &str,
        cfdntl: Arc<Box<dyn AbstractConfidentiality>>,
        logctx: Arc<AppLogContext>,
    ) -> Result<Self, AppAggregatorError> {
        let api_key = cfdntl
            .try_get_payload(confidential_path)
            .map_err(|_e| AppAggregatorError {
                reason: AppAggregatorErrorReason::MissingCredential,
                fn_label: AppAggregatorFnLabel::TryBuild,
            })?;
        if api_key.trim().is_empty() {
            return Err(AppAggregatorError {
                reason: AppAggregatorErrorReason::CredentialCorrupted,
                fn_label: AppAggregatorFnLabel::TryBuild,
            });
        }
        let client =
            BaseClient::try_build(logctx.clone(), host, port).map_err(|e| AppAggregatorError {
                reason: e.into(),
                fn_label: AppAggregatorFnLabel::TryBuild,
            })?;
        Ok(Self {
            api_key,
            client,
            logctx,
        })
    } // end of fn try_build

    fn form_headers() -> Vec<(HeaderName, HeaderValue)> {
        vec![
            (
                CONTENT_TYPE,
                HeaderValue::from_static("application/x-www-form-urlencoded"),
            ),
            (ACCEPT, HeaderValue::from_static("application/json")),
        ]
    }

    async fn fetch_balance(&self) -> Result<Decimal, AppAggregatorErrorReason> {
        let req = CheckBalanceReq {
            api: self.api_key.clone(),
        };
        let (raw, status) = self
            .client
            .execute_form(PATH_CHECK_BALANCE, Method::POST, &req, Self::form_headers())
            .await
            .map_err(AppAggregatorErrorReason::from)?;
        let resp = serde_json::from_slice::<CheckBalanceResp>(raw.as_slice()).map_err(|e| {
            AppAggregatorErrorReason::CorruptedReply(format!("status:{status}, {e}"))
        })?;
        if resp.api_status.as_str() != API_STATUS_OK {
            return Err(AppAggregatorErrorReason::RemoteRejected {
                error_code: resp.error_code,
                detail: resp.error_remark,
            });
        }
        let serial = resp.result.unwrap_or_default();
        Decimal::from_str(serial.as_str())
            .map_err(|e| AppAggregatorErrorReason::CorruptedReply(format!("balance:{serial}, {e}")))
    } // end of fn fetch_balance
} // end of impl AppEasyParcelAggregator

impl SubmitShipmentReq {
    fn assemble(
        api_key: &str,
        order: &OrderModel,
        recipient: &RecipientModel,
        pickup: &PickupAddressModel,
        service_id: &str,
        pickup_date: NaiveDate,
    ) -> Self {
        let send_contact = recipient
            .phone
            .as_ref()
            .map(|p| format!("+{}{}", p.nation, p.number));
        Self {
            api: api_key.to_string(),
            service_id: service_id.to_string(),
            collect_date: pickup_date.format("%Y-%m-%d").to_string(),
            weight: order.shipping_weight_kg.to_string(),
            reference: order.order_number.clone(),
            pick_name: pickup.sender_name.clone(),
            pick_contact: pickup.phone.clone(),
            pick_addr1: pickup.address.detail.clone(),
            pick_addr2: pickup.address.street_name.clone(),
            pick_city: pickup.address.city.clone(),
            pick_state: pickup.address.state.clone(),
            pick_code: pickup.address.postcode.clone(),
            pick_country: String::from(pickup.address.country.clone()),
            send_name: recipient.name.clone(),
            send_contact,
            send_email: recipient.email.clone(),
            send_addr1: recipient.address.detail.clone(),
            send_addr2: recipient.address.street_name.clone(),
            send_city: recipient.address.city.clone(),
            send_state: recipient.address.state.clone(),
            send_code: recipient.address.postcode.clone(),
            send_country: String::from(recipient.address.country.clone()),
        }
    } // end of fn assemble
}

#[async_trait]
impl AbstractShipmentAggregator for AppEasyParcelAggregator {
    async fn create_shipment(
        &self,
        order: &OrderModel,
        pickup: &PickupAddressModel,
        service_id: &str,
        pickup_date: NaiveDate,
    ) -> Result<ShipmentQuoteModel, AppAggregatorError> {
        let map_err = |reason: AppAggregatorErrorReason| AppAggregatorError {
            reason,
            fn_label: AppAggregatorFnLabel::CreateShipment,
        };
        let recipient = order.recipient.as_ref().ok_or(map_err(
            AppAggregatorErrorReason::CorruptedReply("recipient-missing".to_string()),
        ))?;
        let req = SubmitShipmentReq::assemble(
            self.api_key.as_str(),
            order,
            recipient,
            pickup,
            service_id,
            pickup_date,
        );
        let (raw, status) = self
            .client
            .execute_form(PATH_SUBMIT_ORDER, Method::POST, &req, Self::form_headers())
            .await
            .map_err(|e| map_err(e.into()))?;
        let resp = serde_json::from_slice::<SubmitShipmentResp>(raw.as_slice())
            .map_err(|e| map_err(AppAggregatorErrorReason::CorruptedReply(format!(
                "status:{status}, {e}"
            ))))?;
        if resp.api_status.as_str() != API_STATUS_OK {
            let logctx_p = &self.logctx;
            app_log_event!(
                logctx_p,
                AppLogLevel::WARNING,
                "order:{}, code:{}, remark:{}",
                order.order_number.as_str(),
                resp.error_code.as_str(),
                resp.error_remark.as_str()
            );
            let reason = if resp.error_code.as_str() == ERROR_CODE_INSUFFICIENT_CREDIT {
                let balance = self.fetch_balance().await.unwrap_or(Decimal::ZERO);
                AppAggregatorErrorReason::InsufficientBalance(balance)
            } else {
                AppAggregatorErrorReason::RemoteRejected {
                    error_code: resp.error_code,
                    detail: resp.error_remark,
                }
            };
            return Err(map_err(reason));
        }
        let result = resp.result.ok_or(map_err(
            AppAggregatorErrorReason::CorruptedReply("result-missing".to_string()),
        ))?;
        let price = Decimal::from_str(result.price.as_str()).map_err(|e| {
            map_err(AppAggregatorErrorReason::CorruptedReply(format!(
                "price:{}, {e}",
                result.price
            )))
        })?;
        Ok(ShipmentQuoteModel {
            aggregator_order_no: result.order_no,
            courier_name: result.courier,
            price,
        })
    } // end of fn create_shipment

    async fn pay_shipment(
        &self,
        aggregator_order_no: &str,
    ) -> Result<ShipmentReceiptModel, AppAggregatorError> {
        let map_err = |reason: AppAggregatorErrorReason| AppAggregatorError {
            reason,
            fn_label: AppAggregatorFnLabel::PayShipment,
        };
        let req = PayShipmentReq {
            api: self.api_key.clone(),
            order_no: aggregator_order_no.to_string(),
        };
        let (raw, status) = self
            .client
            .execute_form(PATH_PAY_ORDER, Method::POST, &req, Self::form_headers())
            .await
            .map_err(|e| map_err(e.into()))?;
        let resp = serde_json::from_slice::<PayShipmentResp>(raw.as_slice())
            .map_err(|e| map_err(AppAggregatorErrorReason::CorruptedReply(format!(
                "status:{status}, {e}"
            ))))?;
        if resp.api_status.as_str() != API_STATUS_OK {
            let reason = if resp.error_code.as_str() == ERROR_CODE_INSUFFICIENT_CREDIT {
                let balance = self.fetch_balance().await.unwrap_or(Decimal::ZERO);
                AppAggregatorErrorReason::InsufficientBalance(balance)
            } else {
                AppAggregatorErrorReason::RemoteRejected {
                    error_code: resp.error_code,
                    detail: resp.error_remark,
                }
            };
            return Err(map_err(reason));
        }
        let result = resp.result.ok_or(map_err(
            AppAggregatorErrorReason::CorruptedReply("result-missing".to_string()),
        ))?;
        let parcel = result.parcels.into_iter().next().ok_or(map_err(
            AppAggregatorErrorReason::CorruptedReply(format!(
                "no-parcel, order_no:{}",
                result.order_no
            )),
        ))?;
        let logctx_p = &self.logctx;
        app_log_event!(
            logctx_p,
            AppLogLevel::DEBUG,
            "order_no:{}, parcel_no:{}",
            aggregator_order_no,
            parcel.parcel_no.as_str()
        );
        Ok(ShipmentReceiptModel {
            tracking_number: parcel.tracking_no,
            awb_number: parcel.awb,
            awb_url: parcel.awb_id_link,
        })
    } // end of fn pay_shipment

    async fn check_balance(&self) -> Result<Decimal, AppAggregatorError> {
        self.fetch_balance().await.map_err(|reason| {
            AppAggregatorError {
                reason,
                fn_label: AppAggregatorFnLabel::CheckBalance,
            }
        })
    }
} // end of impl AppEasyParcelAggregator
