pub mod adapter;
pub mod api;
pub mod auth;
pub mod model;
pub mod network;
pub mod usecase;

use std::result::Result;
use std::sync::Arc;

use bazaar_common::confidentiality::{self, AbstractConfidentiality};
use bazaar_common::config::AppConfig;
use bazaar_common::error::AppConfidentialityError;
use bazaar_common::logging::AppLogContext;

use crate::adapter::datastore::{AppDStoreError, AppDataStoreContext};
use crate::adapter::notify::{
    app_chat_notifier, app_mail_sender, AbstractChatNotifier, AbstractMailSender, AppNotifyError,
};
use crate::adapter::shipping::{
    app_shipment_aggregator, AbstractShipmentAggregator, AppAggregatorError,
};
use crate::auth::{AbstractAuthKeystore, AppAuthKeystore};
pub use crate::auth::AppAuthedClaim;

pub mod app_meta {
    pub const LABEL: &str = "admin";
    pub const API_VERSION: &str = "0.0.1";
}

pub mod hard_limit {
    pub const MAX_DB_CONNECTIONS: u32 = 960u32;
    pub const MAX_SECONDS_DB_IDLE: u16 = 360u16;
    // ceiling of session IDs accepted by one archive / restore request,
    // larger batches have to be split by the caller
    pub const MAX_SESSION_IDS_PER_REQ: usize = 1000usize;
}

pub struct AppSharedState {
    _config: Arc<AppConfig>,
    _log_ctx: Arc<AppLogContext>,
    _dstore: Arc<AppDataStoreContext>,
    _shipments: Arc<Box<dyn AbstractShipmentAggregator>>,
    _mailer: Arc<Box<dyn AbstractMailSender>>,
    _chat_notifier: Arc<Box<dyn AbstractChatNotifier>>,
    _auth_keys: Arc<Box<dyn AbstractAuthKeystore>>,
}

#[derive(Debug)]
pub enum ShrStateInitProgress {
    Confidentiality,
    DataStore,
    ShipmentAggregator,
    MailSender,
    ChatNotifier,
    AuthKeystore,
}

#[derive(Debug)]
pub struct ShrStateInitError {
    pub progress: ShrStateInitProgress,
}

impl From<AppConfidentialityError> for ShrStateInitError {
    fn from(_value: AppConfidentialityError) -> Self {
        Self {
            progress: ShrStateInitProgress::Confidentiality,
        }
    }
}
impl From<AppDStoreError> for ShrStateInitError {
    fn from(_value: AppDStoreError) -> Self {
        Self {
            progress: ShrStateInitProgress::DataStore,
        }
    }
}
impl From<AppAggregatorError> for ShrStateInitError {
    fn from(_value: AppAggregatorError) -> Self {
        Self {
            progress: ShrStateInitProgress::ShipmentAggregator,
        }
    }
}
impl From<AppNotifyError> for ShrStateInitError {
    fn from(_value: AppNotifyError) -> Self {
        Self {
            progress: ShrStateInitProgress::MailSender,
        }
    }
}

impl AppSharedState {
    pub fn new(cfg: AppConfig) -> Result<Self, ShrStateInitError> {
        let logctx = {
            let lc = AppLogContext::new(&cfg.basepath, &cfg.api_server.logging);
            Arc::new(lc)
        };
        let cfdntl: Arc<Box<dyn AbstractConfidentiality>> = {
            let c = confidentiality::build_context(&cfg)?;
            Arc::new(c)
        };
        let _dstore = {
            let d =
                AppDataStoreContext::new(&cfg.api_server.data_store, cfdntl.clone(), logctx.clone())?;
            Arc::new(d)
        };
        let _shipments = {
            let s = app_shipment_aggregator(
                &cfg.api_server.third_parties,
                cfdntl.clone(),
                logctx.clone(),
            )?;
            Arc::new(s)
        };
        let _mailer = {
            let m = app_mail_sender(&cfg.api_server.third_parties, cfdntl.clone(), logctx.clone())?;
            Arc::new(m)
        };
        let _chat_notifier = {
            let n = app_chat_notifier(&cfg.api_server.third_parties, cfdntl, logctx.clone())
                .map_err(|_e| ShrStateInitError {
                    progress: ShrStateInitProgress::ChatNotifier,
                })?;
            Arc::new(n)
        };
        let _auth_keys = {
            let k = AppAuthKeystore::try_create(&cfg.api_server.auth).map_err(|_e| {
                ShrStateInitError {
                    progress: ShrStateInitProgress::AuthKeystore,
                }
            })?;
            let obj: Box<dyn AbstractAuthKeystore> = Box::new(k);
            Arc::new(obj)
        };
        Ok(Self {
            _config: Arc::new(cfg),
            _log_ctx: logctx,
            _dstore,
            _shipments,
            _mailer,
            _chat_notifier,
            _auth_keys,
        })
    } // end of fn new

    pub fn config(&self) -> Arc<AppConfig> {
        self._config.clone()
    }
    pub fn log_context(&self) -> Arc<AppLogContext> {
        self._log_ctx.clone()
    }
    pub fn datastore(&self) -> Arc<AppDataStoreContext> {
        self._dstore.clone()
    }
    pub fn shipment_aggregator(&self) -> Arc<Box<dyn AbstractShipmentAggregator>> {
        self._shipments.clone()
    }
    pub fn mail_sender(&self) -> Arc<Box<dyn AbstractMailSender>> {
        self._mailer.clone()
    }
    pub fn chat_notifier(&self) -> Arc<Box<dyn AbstractChatNotifier>> {
        self._chat_notifier.clone()
    }
    pub fn auth_keystore(&self) -> Arc<Box<dyn AbstractAuthKeystore>> {
        self._auth_keys.clone()
    }
} // end of impl AppSharedState

impl Clone for AppSharedState {
    fn clone(&self) -> Self {
        Self {
            _config: self._config.clone(),
            _log_ctx: self._log_ctx.clone(),
            _dstore: self._dstore.clone(),
            _shipments: self._shipments.clone(),
            _mailer: self._mailer.clone(),
            _chat_notifier: self._chat_notifier.clone(),
            _auth_keys: self._auth_keys.clone(),
        }
    }
}
