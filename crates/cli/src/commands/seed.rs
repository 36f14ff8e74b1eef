//! Seed the product catalog.
//!
//! Without a file, the five sample yarns are inserted when the catalog is
//! empty. With `--file`, every entry of a YAML list is validated and then
//! inserted in one transaction:
//!
//! ```yaml
//! - name: Alpaca Yarn - Cream
//!   description: Soft alpaca blend
//!   price: 21.50
//!   image: alpaca_cream.jpg
//!   category: Alpaca
//!   rating: 4.7
//!   stock: 40
//! ```

use std::path::Path;

use yarnshop_api::config::ApiConfig;
use yarnshop_api::db::{self, NewProduct, ProductRepository, sample_products};

use crate::error::CliError;

/// Parse and validate a seed file.
///
/// # Errors
///
/// Returns `CliError::SeedFormat` for malformed YAML and
/// `CliError::InvalidSeedEntry` for the first invalid product.
pub fn parse_seed_file(content: &str) -> Result<Vec<NewProduct>, CliError> {
    let products: Vec<NewProduct> = serde_yaml::from_str(content)?;
    for (index, product) in products.iter().enumerate() {
        product
            .validate()
            .map_err(|error| CliError::InvalidSeedEntry { index, error })?;
    }
    Ok(products)
}

/// Seed products from `file`, or the samples when no file is given.
///
/// The file is read and validated before connecting to the database.
///
/// # Errors
///
/// Returns `CliError` if the file is unreadable or invalid, or a database
/// operation fails.
pub async fn run(file: Option<&Path>) -> Result<(), CliError> {
    let products = match file {
        Some(path) => {
            tracing::info!(path = %path.display(), "Loading products from file");
            let content = tokio::fs::read_to_string(path)
                .await
                .map_err(|source| CliError::ReadFile {
                    path: path.display().to_string(),
                    source,
                })?;
            Some(parse_seed_file(&content)?)
        }
        None => None,
    };

    let config = ApiConfig::from_env()?;
    let pool = db::create_pool(&config.database_url).await?;
    let repo = ProductRepository::new(&pool);

    let inserted = match products {
        Some(products) => repo.insert_many(&products).await?,
        None => repo.seed_if_empty(&sample_products()).await?,
    };

    if inserted == 0 {
        println!("Catalog already has products; nothing inserted");
    } else {
        println!("Inserted {inserted} products");
    }
    Ok(())
}
