use std::boxed::Box;
use std::result::Result;
use std::sync::Arc;

use async_trait::async_trait;
use hyper::header::{HeaderValue, CONTENT_TYPE};
use hyper::Method;
use serde::{Deserialize, Serialize};

use bazaar_common::confidentiality::AbstractConfidentiality;
use bazaar_common::logging::{app_log_event, AppLogContext, AppLogLevel};

use super::super::base_client::BaseClient;
use super::{AbstractChatNotifier, AppNotifyError, AppNotifyErrorReason};

#[derive(Serialize)]
struct SendMessageReq<'a> {
    chat_id: i64,
    text: &'a str,
    disable_web_page_preview: bool,
}

#[derive(Deserialize)]
struct BotApiResp {
    ok: bool,
    description: Option<String>,
}

pub(super) struct AppTelegramNotifier {
    bot_token: String,
    client: BaseClient,
    logctx: Arc<AppLogContext>,
}

impl AppTelegramNotifier {
    pub(super) fn try_build(
        host: String,
        port: u16,
        confidential_path: &str,
        cfdntl: Arc<Box<dyn AbstractConfidentiality>>,
        logctx: Arc<AppLogContext>,
    ) -> Result<Self, AppNotifyError> {
        let bot_token = cfdntl
            .try_get_payload(confidential_path)
            .map_err(|_e| AppNotifyError {
                reason: AppNotifyErrorReason::MissingCredential,
            })?;
        if bot_token.trim().is_empty() {
            return Err(AppNotifyError {
                reason: AppNotifyErrorReason::MissingCredential,
            });
        }
        let client = BaseClient::try_build(logctx.clone(), host, port).map_err(AppNotifyError::from)?;
        Ok(Self {
            bot_token,
            client,
            logctx,
        })
    } // end of fn try_build
}

#[async_trait]
impl AbstractChatNotifier for AppTelegramNotifier {
    async fn send_message(&self, chat_id: i64, text: &str) -> Result<(), AppNotifyError> {
        let path = format!("/bot{}/sendMessage", self.bot_token.as_str());
        let req = SendMessageReq {
            chat_id,
            text,
            disable_web_page_preview: true,
        };
        let headers = vec![(CONTENT_TYPE, HeaderValue::from_static("application/json"))];
        let (raw, status) = self
            .client
            .execute_json(path.as_str(), Method::POST, &req, headers)
            .await?;
        let resp = serde_json::from_slice::<BotApiResp>(raw.as_slice()).map_err(|e| {
            AppNotifyError {
                reason: AppNotifyErrorReason::CorruptedReply(format!(
                    "status:{}, {e}",
                    status.as_u16()
                )),
            }
        })?;
        if resp.ok {
            Ok(())
        } else {
            let logctx_p = &self.logctx;
            app_log_event!(
                logctx_p,
                AppLogLevel::WARNING,
                "chat:{}, description:{:?}",
                chat_id,
                resp.description
            );
            Err(AppNotifyError {
                reason: AppNotifyErrorReason::RemoteRejected {
                    status: status.as_u16(),
                    detail: resp.description.unwrap_or_default(),
                },
            })
        }
    } // end of fn send_message
} // end of impl AppTelegramNotifier

pub(super) struct MockChatNotifier {
    logctx: Arc<AppLogContext>,
}

impl MockChatNotifier {
    pub(super) fn build(logctx: Arc<AppLogContext>) -> Self {
        Self { logctx }
    }
}

#[async_trait]
impl AbstractChatNotifier for MockChatNotifier {
    async fn send_message(&self, chat_id: i64, text: &str) -> Result<(), AppNotifyError> {
        let logctx_p = &self.logctx;
        app_log_event!(logctx_p, AppLogLevel::INFO, "mock-telegram, chat:{chat_id}, {text}");
        Ok(())
    }
}
