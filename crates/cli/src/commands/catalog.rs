//! Catalog commands: product listing, product detail and stats.

use yarnshop_core::feed::{CatalogFeed, FetchOutcome};
use yarnshop_core::query::SortKey;
use yarnshop_core::{Product, ProductId, display_price};

use crate::client::ApiError;
use crate::commands::Context;
use crate::error::CliError;

/// One listing row: id, name, category, display price and rating.
fn product_row(product: &Product) -> String {
    let rating = product
        .rating
        .map_or_else(String::new, |r| format!("  {:.1}/5", r.value()));
    format!(
        "#{:<4} {:<40} {:<10} {:>12}{rating}",
        product.id.as_i32(),
        product.name,
        product.category,
        display_price(product.price)
    )
}

/// List the catalog, filtered by `search` and ordered by `sort`.
///
/// A failed fetch is reported as a page-level message, not an error.
///
/// # Errors
///
/// Returns `CliError::SortKey` for an unknown sort key and `CliError::Api`
/// if the API URL is invalid.
pub async fn products(ctx: &Context, search: &str, sort: Option<&str>) -> Result<(), CliError> {
    let sort_key = sort.map(str::parse::<SortKey>).transpose()?;
    let client = ctx.client()?;

    let mut feed = CatalogFeed::new();
    feed.set_search_term(search);
    feed.set_sort_key(sort_key);

    let ticket = feed.begin_fetch();
    let result = client.products().await;
    if feed.complete_fetch(ticket, result) == FetchOutcome::Stale {
        return Ok(());
    }

    if let Some(error) = feed.error() {
        println!("Failed to load products: {error}");
        return Ok(());
    }
    if !feed.rejected().is_empty() {
        tracing::warn!(count = feed.rejected().len(), "Skipped malformed products");
    }

    let view = feed.view();
    if view.is_empty() {
        println!("No products found.");
        return Ok(());
    }
    for product in view {
        println!("{}", product_row(product));
    }
    Ok(())
}

/// Show one product. An unknown id prints a not-found message.
///
/// # Errors
///
/// Returns `CliError::Api` for any failure other than not-found.
pub async fn product(ctx: &Context, id: ProductId) -> Result<(), CliError> {
    let product = match ctx.client()?.product(id).await {
        Ok(product) => product,
        Err(ApiError::NotFound) => {
            println!("Product not found");
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };

    println!("{}", product.name);
    println!("  Price:    {}", display_price(product.price));
    println!("  Category: {}", product.category);
    if let Some(rating) = product.rating {
        println!("  Rating:   {:.1}/5", rating.value());
    }
    if !product.description.is_empty() {
        println!();
        println!("{}", product.description);
    }
    Ok(())
}

/// Print user and product totals.
///
/// # Errors
///
/// Returns `CliError::Api` if the request fails.
pub async fn stats(ctx: &Context) -> Result<(), CliError> {
    let stats = ctx.client()?.stats().await?;
    println!("Users:    {}", stats.users);
    println!("Products: {}", stats.products);
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal::Decimal;
    use yarnshop_core::Rating;

    use super::*;

    #[test]
    fn test_product_row_uses_display_price() {
        let product = Product {
            id: ProductId::new(2),
            name: "Merino Wool Yarn - Navy Blue".to_owned(),
            description: String::new(),
            price: Decimal::new(2499, 2),
            image: String::new(),
            category: "Wool".to_owned(),
            rating: Some(Rating::new(4.5).unwrap()),
        };
        let row = product_row(&product);
        assert!(row.starts_with("#2 "));
        assert!(row.contains(&display_price(product.price)));
        assert!(row.ends_with("4.5/5"));
    }
}
