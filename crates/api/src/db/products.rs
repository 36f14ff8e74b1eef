//! Product repository for database operations.

use rust_decimal::Decimal;
use serde::Deserialize;
use sqlx::PgPool;

use yarnshop_core::{Product, ProductError, ProductId, Rating};

use super::RepositoryError;

#[derive(sqlx::FromRow)]
struct ProductRow {
    id: i32,
    name: String,
    description: String,
    price: Decimal,
    image: String,
    category: String,
    rating: Option<f32>,
}

impl TryFrom<ProductRow> for Product {
    type Error = RepositoryError;

    fn try_from(row: ProductRow) -> Result<Self, Self::Error> {
        let rating = row
            .rating
            .map(Rating::new)
            .transpose()
            .map_err(|e| RepositoryError::DataCorruption(format!("product {}: {e}", row.id)))?;

        Ok(Self {
            id: ProductId::new(row.id),
            name: row.name,
            description: row.description,
            price: row.price.normalize(),
            image: row.image,
            category: row.category,
            rating,
        })
    }
}

/// A product to insert. Also the entry format of seed files.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct NewProduct {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub price: Decimal,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub rating: Option<f32>,
    #[serde(default)]
    pub stock: i32,
}

impl NewProduct {
    /// Check the fields the database would otherwise reject.
    ///
    /// # Errors
    ///
    /// Returns the first `ProductError` found.
    pub fn validate(&self) -> Result<(), ProductError> {
        if self.name.trim().is_empty() {
            return Err(ProductError::MissingField("name"));
        }
        if self.price.is_sign_negative() {
            return Err(ProductError::InvalidField {
                field: "price",
                reason: "must not be negative".to_owned(),
            });
        }
        if let Some(rating) = self.rating {
            Rating::new(rating)?;
        }
        if self.stock < 0 {
            return Err(ProductError::InvalidField {
                field: "stock",
                reason: "must not be negative".to_owned(),
            });
        }
        Ok(())
    }
}

/// The five sample yarns inserted into an empty catalog.
#[must_use]
pub fn sample_products() -> Vec<NewProduct> {
    let yarn = |name: &str, description: &str, cents, image: &str, category: &str, stock| NewProduct {
        name: name.to_owned(),
        description: description.to_owned(),
        price: Decimal::new(cents, 2),
        image: image.to_owned(),
        category: category.to_owned(),
        rating: None,
        stock,
    };

    vec![
        yarn(
            "Cotton Yarn - Natural White",
            "100% pure cotton yarn, perfect for knitting and crocheting",
            1299,
            "cotton_yarn_white.jpg",
            "Cotton",
            100,
        ),
        yarn(
            "Merino Wool Yarn - Navy Blue",
            "Premium merino wool yarn, soft and warm",
            2499,
            "merino_yarn_blue.jpg",
            "Wool",
            75,
        ),
        yarn(
            "Bamboo Blend Yarn - Sage Green",
            "Eco-friendly bamboo blend yarn with silky texture",
            1899,
            "bamboo_yarn_green.jpg",
            "Bamboo",
            50,
        ),
        yarn(
            "Recycled Polyester Yarn - Charcoal",
            "Sustainable recycled polyester yarn",
            1599,
            "recycled_yarn_gray.jpg",
            "Synthetic",
            150,
        ),
        yarn(
            "Organic Cotton Yarn - Pastel Pink",
            "GOTS certified organic cotton yarn",
            1699,
            "organic_yarn_pink.jpg",
            "Cotton",
            85,
        ),
    ]
}

/// Repository for product database operations.
pub struct ProductRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ProductRepository<'a> {
    /// Create a new product repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List all products in id order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if a stored rating is out of range.
    pub async fn list(&self) -> Result<Vec<Product>, RepositoryError> {
        let rows: Vec<ProductRow> = sqlx::query_as(
            r"
            SELECT id, name, description, price, image, category, rating
            FROM products
            ORDER BY id ASC
            ",
        )
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(Product::try_from).collect()
    }

    /// Get a product by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let row: Option<ProductRow> = sqlx::query_as(
            r"
            SELECT id, name, description, price, image, category, rating
            FROM products
            WHERE id = $1
            ",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        row.map(Product::try_from).transpose()
    }

    /// Count products in the catalog.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn count(&self) -> Result<i64, RepositoryError> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM products")
            .fetch_one(self.pool)
            .await?;
        Ok(count)
    }

    /// Insert products in one transaction, returning how many were inserted.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if any insert fails; nothing is
    /// inserted in that case.
    pub async fn insert_many(&self, products: &[NewProduct]) -> Result<u64, RepositoryError> {
        let mut tx = self.pool.begin().await?;
        let mut inserted = 0;

        for product in products {
            sqlx::query(
                r"
                INSERT INTO products (name, description, price, image, category, rating, stock)
                VALUES ($1, $2, $3, $4, $5, $6, $7)
                ",
            )
            .bind(&product.name)
            .bind(&product.description)
            .bind(product.price)
            .bind(&product.image)
            .bind(&product.category)
            .bind(product.rating)
            .bind(product.stock)
            .execute(&mut *tx)
            .await?;
            inserted += 1;
        }

        tx.commit().await?;
        Ok(inserted)
    }

    /// Insert `products` only if the catalog is empty.
    ///
    /// Returns the number of products inserted (zero when the catalog already
    /// had products).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn seed_if_empty(&self, products: &[NewProduct]) -> Result<u64, RepositoryError> {
        if self.count().await? > 0 {
            return Ok(0);
        }
        self.insert_many(products).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_products_are_valid() {
        let products = sample_products();
        assert_eq!(products.len(), 5);
        for product in &products {
            product.validate().unwrap();
        }
        assert_eq!(products[1].price, Decimal::new(2499, 2));
    }

    #[test]
    fn test_validate_rejects_bad_entries() {
        let mut product = sample_products().remove(0);
        product.rating = Some(6.0);
        assert_eq!(product.validate(), Err(ProductError::RatingOutOfRange(6.0)));

        let mut product = sample_products().remove(0);
        product.name = "  ".to_owned();
        assert_eq!(product.validate(), Err(ProductError::MissingField("name")));
    }

    #[test]
    fn test_row_conversion_checks_rating() {
        let row = ProductRow {
            id: 3,
            name: "Wool".to_owned(),
            description: String::new(),
            price: Decimal::new(1500, 2),
            image: String::new(),
            category: "Wool".to_owned(),
            rating: Some(9.0),
        };
        assert!(matches!(
            Product::try_from(row),
            Err(RepositoryError::DataCorruption(_))
        ));
    }
}
