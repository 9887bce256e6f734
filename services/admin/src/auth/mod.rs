mod jwt;
mod keystore;

pub use jwt::{validate_jwt, AppAuthRole, AppAuthedClaim, AuthJwtError};
pub use keystore::{
    AbstractAuthKeystore, AppAuthKeystore, AppKeystoreRefreshResult, AuthKeystoreError,
};
