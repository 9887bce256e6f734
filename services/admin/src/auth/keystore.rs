use std::borrow::BorrowMut;
use std::collections::hash_map::RandomState;
use std::collections::HashSet;
use std::io::Error as IoError;
use std::result::Result;

use actix_http::uri::{InvalidUri, Uri};
use async_trait::async_trait;
use chrono::{DateTime, Duration, FixedOffset, Local};
use http_body_util::{BodyExt, Empty};
use hyper::body::Bytes;
use jsonwebtoken::jwk::{Jwk, JwkSet};
use tokio::sync::RwLock;

use bazaar_common::config::AppAuthCfg;

#[derive(Debug)]
pub enum AuthKeystoreError {
    MissingKey,
    KeyStoreUri(String),
    KeyStoreServer(u16),
    NetworkIO(std::io::ErrorKind, String),
    HttpInvalidSetup(String),
    HttpParse(String),
    HttpTimeout(String),
    HttpAbort(String),
    HttpDataCorruption(String),
    AppParse(String),
}

impl From<InvalidUri> for AuthKeystoreError {
    fn from(value: InvalidUri) -> Self {
        Self::KeyStoreUri(value.to_string())
    }
}
impl From<IoError> for AuthKeystoreError {
    fn from(value: IoError) -> Self {
        Self::NetworkIO(value.kind(), value.to_string())
    }
}
impl From<hyper::Error> for AuthKeystoreError {
    fn from(value: hyper::Error) -> Self {
        let detail = value.to_string();
        if value.is_user() {
            Self::HttpInvalidSetup(detail)
        } else if value.is_parse() || value.is_parse_status() {
            Self::HttpParse(detail)
        } else if value.is_timeout() {
            Self::HttpTimeout(detail)
        } else if value.is_canceled() || value.is_body_write_aborted() {
            Self::HttpAbort(detail)
        } else {
            Self::HttpDataCorruption(detail)
        }
    }
}
impl From<hyper::http::Error> for AuthKeystoreError {
    fn from(value: hyper::http::Error) -> Self {
        Self::HttpInvalidSetup(value.to_string())
    }
}
impl From<serde_json::Error> for AuthKeystoreError {
    fn from(value: serde_json::Error) -> Self {
        Self::AppParse(value.to_string())
    }
}

pub struct AppKeystoreRefreshResult {
    // number of minutes till the next refresh operation
    pub period_next_op: Duration,
    pub num_discarded: usize,
    pub num_added: usize,
}

#[async_trait]
pub trait AbstractAuthKeystore: Sync + Send {
    fn update_period(&self) -> Duration;

    async fn refresh(&self) -> Result<AppKeystoreRefreshResult, AuthKeystoreError>;

    async fn find(&self, kid: &str) -> Result<Jwk, AuthKeystoreError>;
}

pub struct AppAuthKeystore {
    update_period: Duration,
    url: Uri,
    inner: RwLock<InnerKeystoreContext>,
}

struct InnerKeystoreContext {
    keyset: JwkSet,
    last_update: DateTime<FixedOffset>,
}

impl AppAuthKeystore {
    pub fn try_create(cfg: &AppAuthCfg) -> Result<Self, AuthKeystoreError> {
        let update_period = Duration::minutes(cfg.update_interval_minutes as i64);
        // stamp the initial refresh far enough in the past, the first
        // incoming request always pulls a fresh key set
        let last_update = Local::now().fixed_offset() - update_period - Duration::seconds(5);
        let url = cfg.keystore_url.parse::<Uri>()?;
        if url.host().is_none() || url.port_u16().is_none() {
            let msg = format!("host-or-port-missing, {}", cfg.keystore_url);
            return Err(AuthKeystoreError::KeyStoreUri(msg));
        }
        let inner = InnerKeystoreContext {
            keyset: JwkSet { keys: Vec::new() },
            last_update,
        };
        Ok(Self {
            update_period,
            url,
            inner: RwLock::new(inner),
        })
    } // end of fn try_create

    async fn request_new_keys(&self) -> Result<JwkSet, AuthKeystoreError> {
        let addr = (self.url.host().unwrap(), self.url.port_u16().unwrap());
        let stream = tokio::net::TcpStream::connect(addr).await?;
        let io_adapter = hyper_util::rt::TokioIo::new(stream);
        let (mut sender, connector) = hyper::client::conn::http1::handshake(io_adapter).await?;
        let _handle = tokio::spawn(connector);
        let body = Empty::<Bytes>::default();
        let req = hyper::Request::get(self.url.path())
            .header(hyper::header::ACCEPT, "application/json")
            .body(body)?;
        let mut resp = sender.send_request(req).await?;
        if resp.status() != hyper::StatusCode::OK {
            return Err(AuthKeystoreError::KeyStoreServer(resp.status().as_u16()));
        }
        let mut raw_collected = Vec::<u8>::new();
        while let Some(nxt) = resp.frame().await {
            let frm = nxt?;
            let newchunk = frm.into_data().map_err(|frame| {
                AuthKeystoreError::HttpDataCorruption(format!("{frame:?}"))
            })?;
            raw_collected.extend(newchunk.to_vec());
        }
        let out = serde_json::from_slice::<JwkSet>(raw_collected.as_slice())?;
        Ok(out)
    } // end of fn request_new_keys

    fn merge(target: &mut JwkSet, new: JwkSet) -> (usize, usize) {
        // items without key ID are useless for lookup, skip them
        let clone_kid = |item: &Jwk| -> Option<String> { item.common.key_id.clone() };
        let kids_curr: HashSet<String, RandomState> =
            HashSet::from_iter(target.keys.iter().filter_map(clone_kid));
        let kids_new: HashSet<String, RandomState> =
            HashSet::from_iter(new.keys.iter().filter_map(clone_kid));
        let added = kids_new.difference(&kids_curr).cloned().collect::<Vec<_>>();
        let discarding = kids_curr.difference(&kids_new).cloned().collect::<Vec<_>>();
        let out = (discarding.len(), added.len());
        target.keys.retain(|item| {
            item.common
                .key_id
                .as_ref()
                .map_or(false, |kid| !discarding.contains(kid))
        });
        let new_iter = new.keys.into_iter().filter(|item| {
            item.common
                .key_id
                .as_ref()
                .map_or(false, |kid| added.contains(kid))
        });
        target.keys.extend(new_iter);
        out
    } // end of fn merge
} // end of impl AppAuthKeystore

#[async_trait]
impl AbstractAuthKeystore for AppAuthKeystore {
    fn update_period(&self) -> Duration {
        self.update_period
    }

    async fn refresh(&self) -> Result<AppKeystoreRefreshResult, AuthKeystoreError> {
        let mut guard = self.inner.write().await;
        let ctx = guard.borrow_mut();
        let next_time = ctx.last_update + self.update_period;
        let t0 = Local::now().fixed_offset();
        let (nd, na) = if t0 > next_time {
            let newkeys = self.request_new_keys().await?;
            ctx.last_update = t0;
            Self::merge(&mut ctx.keyset, newkeys)
        } else {
            (0, 0)
        };
        Ok(AppKeystoreRefreshResult {
            period_next_op: self.update_period,
            num_discarded: nd,
            num_added: na,
        })
    }

    async fn find(&self, kid: &str) -> Result<Jwk, AuthKeystoreError> {
        {
            let guard = self.inner.read().await;
            if let Some(found) = guard.keyset.find(kid) {
                return Ok(found.clone());
            }
        } // read guard released, the refresh below takes the write lock
        self.refresh().await?;
        let guard = self.inner.read().await;
        guard
            .keyset
            .find(kid)
            .cloned()
            .ok_or(AuthKeystoreError::MissingKey)
    } // end of fn find
} // end of impl AppAuthKeystore
