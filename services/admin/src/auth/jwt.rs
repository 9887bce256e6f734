use std::boxed::Box;
use std::fmt::Display;
use std::future::Future;
use std::pin::Pin;
use std::result::Result;
use std::sync::Arc;

use actix_http::body::BoxBody;
use actix_http::{HttpMessage, Payload, StatusCode};
use actix_web::dev::ServiceRequest;
use actix_web::error::{Error as ActixError, ResponseError};
use actix_web::{FromRequest, HttpRequest, HttpResponse};
use actix_web_httpauth::extractors::bearer::BearerAuth;
use jsonwebtoken::errors::{Error as JwtError, ErrorKind as JwtErrorKind};
use jsonwebtoken::{decode as jwt_decode, decode_header, DecodingKey, Validation as JwtValidation};
use serde::{Deserialize, Serialize};

use super::keystore::{AbstractAuthKeystore, AuthKeystoreError};
use crate::app_meta;

#[allow(non_camel_case_types)]
type KEYSTORE_TYPE = Arc<Box<dyn AbstractAuthKeystore>>;

#[derive(Debug, Clone)]
pub enum AuthJwtError {
    MissingKeystore,
    MissingKeyId,
    MissingAuthedClaim,
    InsufficientRole,
    KeystoreUnknown,
    VerifyFailure(JwtErrorKind),
}

/// staff roles recognised by this admin service, anything below ADMIN is
/// rejected at the middleware layer
#[allow(clippy::upper_case_acronyms)]
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppAuthRole {
    CUSTOMER,
    SUPPORT,
    ADMIN,
    SUPERADMIN,
}

#[derive(Deserialize, Serialize)]
pub struct AppAuthedClaim {
    pub profile: u32,
    pub iat: i64,
    pub exp: i64,
    pub aud: Vec<String>,
    pub roles: Vec<AppAuthRole>,
}

impl AppAuthedClaim {
    pub fn has_admin_privilege(&self) -> bool {
        self.roles
            .iter()
            .any(|r| matches!(r, AppAuthRole::ADMIN | AppAuthRole::SUPERADMIN))
    }
}

impl FromRequest for AppAuthedClaim {
    type Error = ActixError;
    type Future = Pin<Box<dyn Future<Output = Result<Self, Self::Error>>>>;
    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let result = if let Some(v) = req.extensions_mut().remove::<Self>() {
            Ok(v)
        } else {
            Err(AuthJwtError::MissingAuthedClaim.into())
        };
        Box::pin(async move { result })
    }
} // end of impl AppAuthedClaim

impl Display for AuthJwtError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

impl AuthJwtError {
    fn _status_code(&self) -> StatusCode {
        match self {
            Self::MissingKeystore => StatusCode::NOT_IMPLEMENTED,
            Self::MissingKeyId | Self::MissingAuthedClaim => StatusCode::UNAUTHORIZED,
            Self::InsufficientRole => StatusCode::FORBIDDEN,
            Self::VerifyFailure(ekind) => match ekind {
                JwtErrorKind::Json(_) | JwtErrorKind::InvalidToken => StatusCode::BAD_REQUEST,
                JwtErrorKind::MissingRequiredClaim(_)
                | JwtErrorKind::InvalidAudience
                | JwtErrorKind::InvalidIssuer
                | JwtErrorKind::ExpiredSignature
                | JwtErrorKind::InvalidAlgorithmName => StatusCode::UNAUTHORIZED,
                _others => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::KeystoreUnknown => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl ResponseError for AuthJwtError {
    fn status_code(&self) -> StatusCode {
        self._status_code()
    }
    fn error_response(&self) -> HttpResponse<BoxBody> {
        HttpResponse::build(self._status_code()).finish()
    }
} // end of impl AuthJwtError

impl From<JwtError> for AuthJwtError {
    fn from(value: JwtError) -> Self {
        Self::VerifyFailure(value.into_kind())
    }
}

impl From<AuthKeystoreError> for AuthJwtError {
    fn from(value: AuthKeystoreError) -> Self {
        match value {
            AuthKeystoreError::MissingKey => Self::MissingKeyId,
            _others => Self::KeystoreUnknown,
        }
    }
}

pub async fn validate_jwt(
    req: ServiceRequest,
    credentials: BearerAuth,
) -> Result<ServiceRequest, (ActixError, ServiceRequest)> {
    if let Some(ks) = req.app_data::<KEYSTORE_TYPE>() {
        match _validate_jwt(ks.clone(), credentials.token()).await {
            Ok(claim) => {
                if claim.has_admin_privilege() {
                    req.extensions_mut().insert(claim);
                    Ok(req)
                } else {
                    let e = AuthJwtError::InsufficientRole;
                    Err((e.into(), req))
                }
            }
            Err(e) => {
                req.extensions_mut().insert(e.clone());
                Err((e.into(), req))
            }
        }
    } else {
        let e = AuthJwtError::MissingKeystore;
        Err((e.into(), req))
    }
} // end of fn validate_jwt

async fn _validate_jwt(
    keystore: KEYSTORE_TYPE,
    encoded: &str,
) -> Result<AppAuthedClaim, AuthJwtError> {
    let hdr = decode_header(encoded)?;
    let key_id = hdr.kid.as_ref().ok_or(AuthJwtError::MissingKeyId)?;
    let jwk = keystore.find(key_id.as_str()).await?;
    let key = DecodingKey::from_jwk(&jwk)?;
    let validator = {
        let aud = [app_meta::LABEL];
        let required_claims = ["profile", "aud", "exp", "iat", "roles"];
        let mut v = JwtValidation::new(hdr.alg);
        v.set_audience(&aud);
        v.set_required_spec_claims(&required_claims);
        v
    };
    let decoded = jwt_decode::<AppAuthedClaim>(encoded, &key, &validator)?;
    Ok(decoded.claims)
} // end of fn _validate_jwt
