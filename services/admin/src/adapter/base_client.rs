use std::io::{Error as IoError, ErrorKind};
use std::sync::Arc;
use std::time::Duration;

use http_body_util::{BodyExt, Full};
use hyper::body::Bytes;
use hyper::client::conn::http1::handshake;
use hyper::header::{HeaderMap, HeaderName, HeaderValue, HOST};
use hyper::{Error as HyperError, Method, Request, StatusCode};
use hyper_util::rt::TokioIo;
use tokio::net::TcpStream;
use tokio::time::timeout;
use tokio_native_tls::{native_tls, TlsConnector};

use bazaar_common::logging::{app_log_event, AppLogContext, AppLogLevel};

// every outbound call to a collaborator runs under this fixed deadline,
// there is no retry and no cancellation once the request left the host
pub(crate) const REQUEST_DEADLINE: Duration = Duration::from_secs(30);

#[derive(Debug)]
pub enum BaseClientErrorReason {
    TcpNet(ErrorKind, String),
    SysIo(ErrorKind, String),
    Http {
        sender_closed: bool,
        parse_error: bool,
        req_cancelled: bool,
        message_corrupted: bool,
        detail: String,
    },
    HttpRequest(String),
    Tls(String),
    DeadlineExceeded(Duration),
    SerialiseFailure(String),
    DeserialiseFailure(String, u16),
}

impl From<IoError> for BaseClientErrorReason {
    fn from(value: IoError) -> Self {
        let ekind = value.kind();
        match &ekind {
            ErrorKind::TimedOut
            | ErrorKind::AddrInUse
            | ErrorKind::NotConnected
            | ErrorKind::ConnectionReset
            | ErrorKind::ConnectionRefused
            | ErrorKind::ConnectionAborted => Self::TcpNet(ekind, value.to_string()),
            _others => Self::SysIo(ekind, value.to_string()),
        }
    }
}
impl From<HyperError> for BaseClientErrorReason {
    fn from(value: HyperError) -> Self {
        Self::Http {
            sender_closed: value.is_closed(),
            parse_error: value.is_parse_status() | value.is_parse(),
            message_corrupted: value.is_incomplete_message() | value.is_body_write_aborted(),
            req_cancelled: value.is_canceled(),
            detail: value.to_string(),
        }
    }
}
impl From<native_tls::Error> for BaseClientErrorReason {
    fn from(value: native_tls::Error) -> Self {
        Self::Tls(value.to_string())
    }
}

#[derive(Debug)]
pub struct BaseClientError {
    pub reason: BaseClientErrorReason,
}

impl BaseClientError {
    pub(crate) fn serialise(detail: String) -> Self {
        Self {
            reason: BaseClientErrorReason::SerialiseFailure(detail),
        }
    }
}

/// short-lived HTTP/1.1 connection to one remote collaborator, a fresh
/// instance is built per outbound call, the TLS handshake rides on the
/// same deadline as the request itself
pub(crate) struct BaseClient {
    host: String,
    port: u16,
    secure_connector: TlsConnector,
    logctx: Arc<AppLogContext>,
}

impl BaseClient {
    pub(crate) fn try_build(
        logctx: Arc<AppLogContext>,
        host: String,
        port: u16,
    ) -> Result<Self, BaseClientError> {
        let inner = native_tls::TlsConnector::new()
            .map_err(|e| BaseClientError { reason: e.into() })?;
        Ok(Self {
            host,
            port,
            secure_connector: TlsConnector::from(inner),
            logctx,
        })
    }

    pub(crate) async fn execute_form<S>(
        &self,
        path: &str,
        method: Method,
        body_obj: &S,
        headers: Vec<(HeaderName, HeaderValue)>,
    ) -> Result<(Vec<u8>, StatusCode), BaseClientError>
    where
        S: serde::Serialize,
    {
        let serial = serde_qs::to_string(body_obj)
            .map_err(|e| BaseClientError::serialise(e.to_string()))?;
        let body = Full::new(Bytes::from(serial));
        let req = self.assemble_request(path, method, body, headers)?;
        self.run_within_deadline(req).await
    }

    pub(crate) async fn execute_json<S>(
        &self,
        path: &str,
        method: Method,
        body_obj: &S,
        headers: Vec<(HeaderName, HeaderValue)>,
    ) -> Result<(Vec<u8>, StatusCode), BaseClientError>
    where
        S: serde::Serialize,
    {
        let serial = serde_json::to_vec(body_obj)
            .map_err(|e| BaseClientError::serialise(e.to_string()))?;
        let body = Full::new(Bytes::from(serial));
        let req = self.assemble_request(path, method, body, headers)?;
        self.run_within_deadline(req).await
    }

    fn assemble_request(
        &self,
        path: &str,
        method: Method,
        body: Full<Bytes>,
        headers: Vec<(HeaderName, HeaderValue)>,
    ) -> Result<Request<Full<Bytes>>, BaseClientError> {
        let mut req = Request::builder()
            .method(method)
            .uri(path)
            .body(body)
            .map_err(|e| BaseClientError {
                reason: BaseClientErrorReason::HttpRequest(e.to_string()),
            })?;
        let dst: &mut HeaderMap = req.headers_mut();
        headers
            .into_iter()
            .map(|(k, v)| {
                let _old = dst.insert(k, v);
            })
            .count();
        // required in case the remote server sits behind reverse proxy / CDN
        let _discarded = dst.insert(HOST, HeaderValue::from_str(self.host.as_str()).unwrap());
        Ok(req)
    }

    async fn run_within_deadline(
        &self,
        req: Request<Full<Bytes>>,
    ) -> Result<(Vec<u8>, StatusCode), BaseClientError> {
        match timeout(REQUEST_DEADLINE, self._run(req)).await {
            Ok(inner) => inner,
            Err(_elapsed) => Err(BaseClientError {
                reason: BaseClientErrorReason::DeadlineExceeded(REQUEST_DEADLINE),
            }),
        }
    }

    async fn _run(
        &self,
        req: Request<Full<Bytes>>,
    ) -> Result<(Vec<u8>, StatusCode), BaseClientError> {
        let logctx_p = &self.logctx;
        let uri_log = req.uri().to_string();
        let (host, port) = (self.host.as_str(), self.port);
        let tcp_stream = TcpStream::connect((host, port)).await.map_err(|e| {
            app_log_event!(
                logctx_p,
                AppLogLevel::ERROR,
                "tcp-conn-err, {host}:{port}, {:?}",
                &e
            );
            BaseClientError { reason: e.into() }
        })?;
        let tls_stream = self
            .secure_connector
            .connect(host, tcp_stream)
            .await
            .map_err(|e| BaseClientError { reason: e.into() })?;
        let io_adapter = TokioIo::new(tls_stream);
        let (mut req_sender, connector) = handshake(io_adapter)
            .await
            .map_err(|e| BaseClientError { reason: e.into() })?;
        let logctx_cpy = self.logctx.clone();
        let host_cpy = self.host.clone();
        let _handle = tokio::spawn(async move {
            if let Err(e) = connector.await {
                app_log_event!(
                    logctx_cpy,
                    AppLogLevel::WARNING,
                    "remote server: {host_cpy}:{port}, {:?}",
                    e
                );
            }
        });
        let mut resp = req_sender.send_request(req).await.map_err(|e| {
            app_log_event!(logctx_p, AppLogLevel::WARNING, "{:?}", e);
            BaseClientError { reason: e.into() }
        })?;
        let mut raw_collected = Vec::<u8>::new();
        while let Some(nxt) = resp.frame().await {
            let frm = nxt.map_err(|e| BaseClientError { reason: e.into() })?;
            let newchunk = frm.into_data().map_err(|failed_frame| {
                app_log_event!(
                    logctx_p,
                    AppLogLevel::ERROR,
                    "data:{}, trailers:{}",
                    failed_frame.is_data(),
                    failed_frame.is_trailers()
                );
                BaseClientError {
                    reason: BaseClientErrorReason::Http {
                        sender_closed: false,
                        parse_error: true,
                        req_cancelled: false,
                        message_corrupted: true,
                        detail: "frame-corrupted".to_string(),
                    },
                }
            })?;
            raw_collected.extend(newchunk.to_vec());
        } // end of loop
        let status_code = resp.status();
        if status_code.is_client_error() {
            app_log_event!(
                logctx_p,
                AppLogLevel::INFO,
                "server:{}:{}, uri:{}",
                host,
                port,
                uri_log
            );
        } else if status_code.is_server_error() {
            app_log_event!(
                logctx_p,
                AppLogLevel::WARNING,
                "server:{}:{}, uri:{}",
                host,
                port,
                uri_log
            );
        }
        Ok((raw_collected, status_code))
    } // end of fn _run
} // end of impl BaseClient
