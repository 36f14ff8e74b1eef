//! Database migration command.
//!
//! # Usage
//!
//! ```bash
//! yarnshop migrate
//! ```
//!
//! # Environment Variables
//!
//! - `YARNSHOP_DATABASE_URL` - `PostgreSQL` connection string (falls back to `DATABASE_URL`)
//!
//! Migrations live in `crates/api/migrations/` and are embedded at compile time.

use yarnshop_api::config::ApiConfig;
use yarnshop_api::db;

use crate::error::CliError;

/// Run the API database migrations.
///
/// # Errors
///
/// Returns `CliError` if the database URL is missing, the connection fails,
/// or a migration fails.
pub async fn run() -> Result<(), CliError> {
    let config = ApiConfig::from_env()?;

    tracing::info!("Connecting to database...");
    let pool = db::create_pool(&config.database_url).await?;

    tracing::info!("Running migrations...");
    sqlx::migrate!("../api/migrations").run(&pool).await?;

    println!("Migrations complete");
    Ok(())
}
