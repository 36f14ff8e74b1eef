//! Catalog products and the validation applied where they enter the client.
//!
//! The REST catalog is consumed as loosely-typed JSON. Each entry is checked
//! field by field before it becomes a [`Product`]; entries that fail are
//! quarantined in [`CatalogLoad::rejected`] instead of leaking half-filled
//! records into the cart or the query engine.

use std::collections::HashSet;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::id::ProductId;

/// Highest rating a product can carry.
pub const MAX_RATING: f32 = 5.0;

/// Errors that can occur when validating a catalog entry.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ProductError {
    /// The entry is not a JSON object.
    #[error("catalog entry is not an object")]
    NotAnObject,
    /// A required field is absent or null.
    #[error("missing field: {0}")]
    MissingField(&'static str),
    /// A field has the wrong shape.
    #[error("invalid {field}: {reason}")]
    InvalidField {
        /// Field name.
        field: &'static str,
        /// What was wrong with it.
        reason: String,
    },
    /// Rating outside 0.0-5.0.
    #[error("rating {0} is outside 0.0-5.0")]
    RatingOutOfRange(f32),
    /// Another entry already uses this id.
    #[error("duplicate product id {0}")]
    DuplicateId(ProductId),
}

/// A product rating between 0.0 and 5.0.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f32", into = "f32")]
pub struct Rating(f32);

impl Rating {
    /// Create a rating, rejecting values outside 0.0-5.0 (and NaN).
    ///
    /// # Errors
    ///
    /// Returns `ProductError::RatingOutOfRange` for out-of-range values.
    pub fn new(value: f32) -> Result<Self, ProductError> {
        if (0.0..=MAX_RATING).contains(&value) {
            Ok(Self(value))
        } else {
            Err(ProductError::RatingOutOfRange(value))
        }
    }

    /// Create a rating, clamping into 0.0-5.0.
    pub(crate) fn saturating(value: f32) -> Self {
        Self(value.clamp(0.0, MAX_RATING))
    }

    /// Get the rating value.
    #[must_use]
    pub const fn value(self) -> f32 {
        self.0
    }
}

impl TryFrom<f32> for Rating {
    type Error = ProductError;

    fn try_from(value: f32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Rating> for f32 {
    fn from(rating: Rating) -> Self {
        rating.0
    }
}

/// A yarn product from the catalog.
///
/// Immutable once loaded. Prices are in the base currency unit and serialize
/// as JSON numbers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub description: String,
    #[serde(serialize_with = "rust_decimal::serde::float::serialize")]
    pub price: Decimal,
    pub image: String,
    pub category: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<Rating>,
}

impl Product {
    /// Validate one loosely-typed catalog entry.
    ///
    /// The id may be an integer or a numeric string. The price may be a JSON
    /// number or a decimal string and must not be negative.
    ///
    /// # Errors
    ///
    /// Returns a `ProductError` naming the first field that failed.
    pub fn from_json(value: &Value) -> Result<Self, ProductError> {
        let object = value.as_object().ok_or(ProductError::NotAnObject)?;
        let field = |name: &'static str| {
            object
                .get(name)
                .filter(|v| !v.is_null())
                .ok_or(ProductError::MissingField(name))
        };
        let text = |name: &'static str| -> Result<String, ProductError> {
            field(name)?
                .as_str()
                .map(str::to_owned)
                .ok_or_else(|| ProductError::InvalidField {
                    field: name,
                    reason: "expected a string".to_owned(),
                })
        };

        let id = parse_id(field("id")?)?;
        let name = text("name")?;
        if name.trim().is_empty() {
            return Err(ProductError::MissingField("name"));
        }
        let description = text("description")?;
        let price = parse_price(field("price")?)?;
        let image = text("image")?;
        let category = text("category")?;

        let rating = match object.get("rating").filter(|v| !v.is_null()) {
            None => None,
            Some(v) => {
                #[allow(clippy::cast_possible_truncation)] // ratings are 0.0-5.0
                let raw = v.as_f64().ok_or_else(|| ProductError::InvalidField {
                    field: "rating",
                    reason: "expected a number".to_owned(),
                })? as f32;
                Some(Rating::new(raw)?)
            }
        };

        Ok(Self {
            id,
            name,
            description,
            price,
            image,
            category,
            rating,
        })
    }
}

fn parse_id(value: &Value) -> Result<ProductId, ProductError> {
    let invalid = |reason: &str| ProductError::InvalidField {
        field: "id",
        reason: reason.to_owned(),
    };
    match value {
        Value::Number(n) => n
            .as_i64()
            .and_then(|n| i32::try_from(n).ok())
            .map(ProductId::new)
            .ok_or_else(|| invalid("expected a 32-bit integer")),
        Value::String(s) => s
            .parse::<ProductId>()
            .map_err(|_| invalid("expected a numeric string")),
        _ => Err(invalid("expected a number or string")),
    }
}

fn parse_price(value: &Value) -> Result<Decimal, ProductError> {
    let raw = match value {
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.trim().to_owned(),
        _ => {
            return Err(ProductError::InvalidField {
                field: "price",
                reason: "expected a number".to_owned(),
            });
        }
    };
    let price = Decimal::from_str(&raw)
        .or_else(|_| Decimal::from_scientific(&raw))
        .map_err(|e| ProductError::InvalidField {
            field: "price",
            reason: e.to_string(),
        })?;
    if price.is_sign_negative() {
        return Err(ProductError::InvalidField {
            field: "price",
            reason: "must not be negative".to_owned(),
        });
    }
    Ok(price.normalize())
}

/// A catalog entry that failed validation.
#[derive(Debug, Clone, PartialEq)]
pub struct RejectedProduct {
    /// Position of the entry in the fetched array.
    pub index: usize,
    pub error: ProductError,
}

/// Result of validating a fetched catalog.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CatalogLoad {
    pub products: Vec<Product>,
    pub rejected: Vec<RejectedProduct>,
}

/// Validate every entry of a fetched catalog, quarantining malformed ones.
///
/// Order of the accepted products follows the input. When two entries share an
/// id, the first one wins and the later one is rejected.
#[must_use]
pub fn validate_catalog<I>(entries: I) -> CatalogLoad
where
    I: IntoIterator<Item = Value>,
{
    let mut load = CatalogLoad::default();
    let mut seen = HashSet::new();

    for (index, entry) in entries.into_iter().enumerate() {
        let result = Product::from_json(&entry).and_then(|product| {
            if seen.insert(product.id) {
                Ok(product)
            } else {
                Err(ProductError::DuplicateId(product.id))
            }
        });
        match result {
            Ok(product) => load.products.push(product),
            Err(error) => {
                tracing::warn!(index, %error, "Quarantined malformed catalog entry");
                load.rejected.push(RejectedProduct { index, error });
            }
        }
    }

    load
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    fn black_yarn() -> Value {
        json!({
            "id": 1,
            "name": "2/20(s) Black Yarn",
            "description": "High-quality open-end yarn for various textile applications.",
            "price": 7.99,
            "image": "/images/20(s)Black.jpg",
            "category": "Yarn",
            "rating": 4.0
        })
    }

    #[test]
    fn test_from_json_valid() {
        let product = Product::from_json(&black_yarn()).unwrap();
        assert_eq!(product.id, ProductId::new(1));
        assert_eq!(product.price, Decimal::new(799, 2));
        assert_eq!(product.rating, Some(Rating::new(4.0).unwrap()));
    }

    #[test]
    fn test_from_json_accepts_string_id_and_price() {
        let mut value = black_yarn();
        value["id"] = json!("12");
        value["price"] = json!("12.50");
        let product = Product::from_json(&value).unwrap();
        assert_eq!(product.id, ProductId::new(12));
        assert_eq!(product.price, Decimal::new(125, 1));
    }

    #[test]
    fn test_from_json_rating_is_optional() {
        let mut value = black_yarn();
        value.as_object_mut().unwrap().remove("rating");
        assert_eq!(Product::from_json(&value).unwrap().rating, None);
    }

    #[test]
    fn test_from_json_missing_field() {
        let mut value = black_yarn();
        value.as_object_mut().unwrap().remove("description");
        assert_eq!(
            Product::from_json(&value),
            Err(ProductError::MissingField("description"))
        );
    }

    #[test]
    fn test_from_json_rejects_bad_rating_and_price() {
        let mut value = black_yarn();
        value["rating"] = json!(7.5);
        assert_eq!(
            Product::from_json(&value),
            Err(ProductError::RatingOutOfRange(7.5))
        );

        let mut value = black_yarn();
        value["price"] = json!(-1);
        assert!(matches!(
            Product::from_json(&value),
            Err(ProductError::InvalidField { field: "price", .. })
        ));
    }

    #[test]
    fn test_validate_catalog_quarantines() {
        let load = validate_catalog(vec![
            black_yarn(),
            json!("not an object"),
            black_yarn(),
            json!({ "id": 2, "name": "Red" }),
        ]);
        assert_eq!(load.products.len(), 1);
        let indexes: Vec<usize> = load.rejected.iter().map(|r| r.index).collect();
        assert_eq!(indexes, vec![1, 2, 3]);
        assert_eq!(
            load.rejected[1].error,
            ProductError::DuplicateId(ProductId::new(1))
        );
    }

    #[test]
    fn test_serialize_price_as_number() {
        let product = Product::from_json(&black_yarn()).unwrap();
        let json = serde_json::to_value(&product).unwrap();
        assert!((json["price"].as_f64().unwrap() - 7.99).abs() < 1e-9);
        assert_eq!(json["id"], json!(1));
    }
}
