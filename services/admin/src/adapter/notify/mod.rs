mod mailer;
mod telegram;

use std::boxed::Box;
use std::result::Result;
use std::sync::Arc;

use async_trait::async_trait;

use bazaar_common::confidentiality::AbstractConfidentiality;
use bazaar_common::config::App3rdPartyCfg;
use bazaar_common::logging::AppLogContext;

use self::mailer::{AppHttpMailSender, MockMailSender};
use self::telegram::{AppTelegramNotifier, MockChatNotifier};
use super::base_client::BaseClientError;
use crate::model::OrderModel;

const MAILER_CFG_LABEL: &str = "mailer";
const TELEGRAM_CFG_LABEL: &str = "telegram";

#[derive(Debug)]
pub enum AppNotifyErrorReason {
    InvalidConfig,
    MissingCredential,
    MissingRecipient,
    LowLvlNet(BaseClientError),
    RemoteRejected { status: u16, detail: String },
    CorruptedReply(String),
}

#[derive(Debug)]
pub struct AppNotifyError {
    pub reason: AppNotifyErrorReason,
}

impl From<BaseClientError> for AppNotifyError {
    fn from(value: BaseClientError) -> Self {
        Self {
            reason: AppNotifyErrorReason::LowLvlNet(value),
        }
    }
}

/// transactional customer email, callers treat failures as non-fatal,
/// the fulfillment flow only logs them
#[async_trait]
pub trait AbstractMailSender: Send + Sync {
    async fn send_order_shipped(&self, order: &OrderModel) -> Result<(), AppNotifyError>;
}

/// admin-facing chat notification through the Telegram bot API
#[async_trait]
pub trait AbstractChatNotifier: Send + Sync {
    async fn send_message(&self, chat_id: i64, text: &str) -> Result<(), AppNotifyError>;
}

fn find_cfg<'a>(
    cfgs3pt: &'a [Arc<App3rdPartyCfg>],
    label: &str,
) -> Result<&'a App3rdPartyCfg, AppNotifyError> {
    cfgs3pt
        .iter()
        .find(|c| c.label().eq_ignore_ascii_case(label))
        .map(|c| c.as_ref())
        .ok_or(AppNotifyError {
            reason: AppNotifyErrorReason::InvalidConfig,
        })
}

pub(crate) fn app_mail_sender(
    cfgs3pt: &[Arc<App3rdPartyCfg>],
    cfdntl: Arc<Box<dyn AbstractConfidentiality>>,
    logctx: Arc<AppLogContext>,
) -> Result<Box<dyn AbstractMailSender>, AppNotifyError> {
    match find_cfg(cfgs3pt, MAILER_CFG_LABEL)? {
        App3rdPartyCfg::dev {
            name: _,
            host,
            port,
            confidentiality_path,
        } => {
            let obj = AppHttpMailSender::try_build(
                host.clone(),
                *port,
                confidentiality_path.as_str(),
                cfdntl,
                logctx,
            )?;
            Ok(Box::new(obj))
        }
        App3rdPartyCfg::test { .. } => Ok(Box::new(MockMailSender::build(logctx))),
    }
}

pub(crate) fn app_chat_notifier(
    cfgs3pt: &[Arc<App3rdPartyCfg>],
    cfdntl: Arc<Box<dyn AbstractConfidentiality>>,
    logctx: Arc<AppLogContext>,
) -> Result<Box<dyn AbstractChatNotifier>, AppNotifyError> {
    match find_cfg(cfgs3pt, TELEGRAM_CFG_LABEL)? {
        App3rdPartyCfg::dev {
            name: _,
            host,
            port,
            confidentiality_path,
        } => {
            let obj = AppTelegramNotifier::try_build(
                host.clone(),
                *port,
                confidentiality_path.as_str(),
                cfdntl,
                logctx,
            )?;
            Ok(Box::new(obj))
        }
        App3rdPartyCfg::test { .. } => Ok(Box::new(MockChatNotifier::build(logctx))),
    }
}
