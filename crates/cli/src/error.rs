//! CLI error type.

use thiserror::Error;

use yarnshop_api::config::ConfigError;
use yarnshop_api::db::RepositoryError;
use yarnshop_core::ProductError;
use yarnshop_core::checkout::{UnknownDeliveryMethod, WizardError};
use yarnshop_core::query::UnknownSortKey;
use yarnshop_core::recommend::UnknownFacet;
use yarnshop_core::storage::StorageError;

use crate::client::ApiError;

/// Errors that can end a command.
#[derive(Debug, Error)]
pub enum CliError {
    /// The command needs a signed-in user.
    #[error("Please log in first (yarnshop login)")]
    LoginRequired,

    /// The command is only for signed-out users.
    #[error("Already logged in as {0}; run `yarnshop logout` first")]
    AlreadyLoggedIn(String),

    /// Client storage failed.
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// The API request failed.
    #[error("API request failed: {0}")]
    Api(#[from] ApiError),

    /// A checkout step was refused.
    #[error(transparent)]
    Checkout(#[from] WizardError),

    #[error(transparent)]
    SortKey(#[from] UnknownSortKey),

    #[error(transparent)]
    Facet(#[from] UnknownFacet),

    #[error(transparent)]
    DeliveryMethod(#[from] UnknownDeliveryMethod),

    /// Database configuration is missing or invalid.
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Database error: {0}")]
    Repository(#[from] RepositoryError),

    #[error("Failed to read {path}: {source}")]
    ReadFile {
        path: String,
        source: std::io::Error,
    },

    #[error("Invalid seed file: {0}")]
    SeedFormat(#[from] serde_yaml::Error),

    /// A seed entry failed validation.
    #[error("Seed entry {index} is invalid: {error}")]
    InvalidSeedEntry { index: usize, error: ProductError },
}
