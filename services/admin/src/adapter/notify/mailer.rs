use std::boxed::Box;
use std::result::Result;
use std::sync::Arc;

use async_trait::async_trait;
use hyper::header::{HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use hyper::Method;
use serde::{Deserialize, Serialize};

use bazaar_common::confidentiality::AbstractConfidentiality;
use bazaar_common::logging::{app_log_event, AppLogContext, AppLogLevel};

use super::super::base_client::BaseClient;
use super::{AbstractMailSender, AppNotifyError, AppNotifyErrorReason};
use crate::model::OrderModel;

const PATH_SEND: &str = "/v1/transactional/send";

#[allow(non_snake_case)]
#[derive(Deserialize)]
struct MailerSecret {
    API_KEY: String,
    SENDER: String,
}

#[derive(Serialize)]
struct SendMailReq<'a> {
    from: &'a str,
    to: &'a str,
    subject: String,
    text: String,
}

#[derive(Deserialize)]
struct SendMailResp {
    message_id: Option<String>,
}

pub(super) struct AppHttpMailSender {
    api_key: String,
    sender_addr: String,
    client: BaseClient,
    logctx: Arc<AppLogContext>,
}

impl AppHttpMailSender {
    pub(super) fn try_build(
        host: String,
        port: u16,
        confidential_path: &str,
        cfdntl: Arc<Box<dyn AbstractConfidentiality>>,
        logctx: Arc<AppLogContext>,
    ) -> Result<Self, AppNotifyError> {
        let secret = {
            let serial =
                cfdntl
                    .try_get_payload(confidential_path)
                    .map_err(|_e| AppNotifyError {
                        reason: AppNotifyErrorReason::MissingCredential,
                    })?;
            serde_json::from_str::<MailerSecret>(serial.as_str()).map_err(|e| AppNotifyError {
                reason: AppNotifyErrorReason::CorruptedReply(e.to_string()),
            })?
        };
        let client = BaseClient::try_build(logctx.clone(), host, port).map_err(AppNotifyError::from)?;
        Ok(Self {
            api_key: secret.API_KEY,
            sender_addr: secret.SENDER,
            client,
            logctx,
        })
    } // end of fn try_build

    fn render_order_shipped(order: &OrderModel) -> (String, String) {
        let subject = format!("Your order {} is on the way", order.order_number);
        let courier = order.booking.courier_name.as_deref().unwrap_or("courier");
        let tracking = order.booking.tracking_number.as_deref().unwrap_or("-");
        let mut lines = vec![
            format!("Order {} has been handed to {}.", order.order_number, courier),
            format!("Tracking number: {tracking}"),
        ];
        if let Some(url) = order.booking.airway_bill_url.as_deref() {
            lines.push(format!("Airway bill: {url}"));
        }
        if let Some(d) = order.booking.scheduled_pickup_date.as_ref() {
            lines.push(format!("Scheduled pickup date: {}", d.format("%Y-%m-%d")));
        }
        (subject, lines.join("\n"))
    } // end of fn render_order_shipped
}

#[async_trait]
impl AbstractMailSender for AppHttpMailSender {
    async fn send_order_shipped(&self, order: &OrderModel) -> Result<(), AppNotifyError> {
        let recipient = order.recipient.as_ref().ok_or(AppNotifyError {
            reason: AppNotifyErrorReason::MissingRecipient,
        })?;
        let (subject, text) = Self::render_order_shipped(order);
        let req = SendMailReq {
            from: self.sender_addr.as_str(),
            to: recipient.email.as_str(),
            subject,
            text,
        };
        let auth_val = format!("Bearer {}", self.api_key.as_str());
        let headers = vec![
            (
                AUTHORIZATION,
                HeaderValue::from_str(auth_val.as_str()).map_err(|_e| AppNotifyError {
                    reason: AppNotifyErrorReason::MissingCredential,
                })?,
            ),
            (CONTENT_TYPE, HeaderValue::from_static("application/json")),
        ];
        let (raw, status) = self
            .client
            .execute_json(PATH_SEND, Method::POST, &req, headers)
            .await?;
        if !status.is_success() {
            let detail = String::from_utf8_lossy(raw.as_slice()).to_string();
            return Err(AppNotifyError {
                reason: AppNotifyErrorReason::RemoteRejected {
                    status: status.as_u16(),
                    detail,
                },
            });
        }
        let resp = serde_json::from_slice::<SendMailResp>(raw.as_slice()).unwrap_or(SendMailResp {
            message_id: None,
        });
        let logctx_p = &self.logctx;
        app_log_event!(
            logctx_p,
            AppLogLevel::DEBUG,
            "order:{}, message-id:{:?}",
            order.order_number.as_str(),
            resp.message_id
        );
        Ok(())
    } // end of fn send_order_shipped
} // end of impl AppHttpMailSender

pub(super) struct MockMailSender {
    logctx: Arc<AppLogContext>,
}

impl MockMailSender {
    pub(super) fn build(logctx: Arc<AppLogContext>) -> Self {
        Self { logctx }
    }
}

#[async_trait]
impl AbstractMailSender for MockMailSender {
    async fn send_order_shipped(&self, order: &OrderModel) -> Result<(), AppNotifyError> {
        let logctx_p = &self.logctx;
        app_log_event!(
            logctx_p,
            AppLogLevel::INFO,
            "mock-mail, order:{}",
            order.order_number.as_str()
        );
        Ok(())
    }
}
