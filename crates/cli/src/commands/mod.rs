//! Command implementations.
//!
//! Each command reads and writes client state through a [`Context`]. Access
//! is gated on the auth status before a command runs, the way the storefront
//! routes gate their pages.

// Commands write their results to stdout.
#![allow(clippy::print_stdout)]

pub mod account;
pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod migrate;
pub mod recommend;
pub mod seed;

use std::path::Path;

use yarnshop_core::auth::{AuthOracle, AuthStatus};
use yarnshop_core::cart::CartStore;

use crate::client::ApiClient;
use crate::error::CliError;
use crate::store::FileStore;

/// Who may run a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    /// Anyone.
    Open,
    /// Only signed-out users (register, login).
    GuestOnly,
    /// Only signed-in users.
    LoginRequired,
}

impl Access {
    /// Check `status` against this access level.
    ///
    /// # Errors
    ///
    /// `CliError::LoginRequired` or `CliError::AlreadyLoggedIn`.
    pub fn check(self, status: &AuthStatus) -> Result<(), CliError> {
        match self {
            Self::Open => Ok(()),
            Self::GuestOnly if status.is_authenticated => Err(CliError::AlreadyLoggedIn(
                status.username.clone().unwrap_or_default(),
            )),
            Self::GuestOnly => Ok(()),
            Self::LoginRequired if status.is_authenticated => Ok(()),
            Self::LoginRequired => Err(CliError::LoginRequired),
        }
    }
}

/// Client state shared by the storefront commands.
#[derive(Debug)]
pub struct Context {
    store: FileStore,
    api_url: String,
}

impl Context {
    /// Open client storage in `data_dir`.
    ///
    /// # Errors
    ///
    /// Returns `CliError::Storage` if the storage file cannot be read.
    pub fn open(data_dir: &Path, api_url: String) -> Result<Self, CliError> {
        Ok(Self {
            store: FileStore::open(data_dir)?,
            api_url,
        })
    }

    #[must_use]
    pub const fn oracle(&self) -> AuthOracle<&FileStore> {
        AuthOracle::new(&self.store)
    }

    #[must_use]
    pub fn cart(&self) -> CartStore<&FileStore> {
        CartStore::open(&self.store)
    }

    /// API client carrying the stored bearer token, if any.
    ///
    /// # Errors
    ///
    /// Returns `CliError::Api` if the API URL is invalid.
    pub fn client(&self) -> Result<ApiClient, CliError> {
        Ok(ApiClient::new(&self.api_url)?.with_token(self.oracle().token()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signed_in() -> AuthStatus {
        AuthStatus {
            is_authenticated: true,
            username: Some("weaver".to_owned()),
        }
    }

    #[test]
    fn test_access_gating() {
        let guest = AuthStatus::default();

        assert!(Access::Open.check(&guest).is_ok());
        assert!(Access::Open.check(&signed_in()).is_ok());

        assert!(Access::GuestOnly.check(&guest).is_ok());
        assert!(matches!(
            Access::GuestOnly.check(&signed_in()),
            Err(CliError::AlreadyLoggedIn(ref name)) if name == "weaver"
        ));

        assert!(matches!(
            Access::LoginRequired.check(&guest),
            Err(CliError::LoginRequired)
        ));
        assert!(Access::LoginRequired.check(&signed_in()).is_ok());
    }
}
