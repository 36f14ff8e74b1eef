//! Core types for the yarnshop storefront.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod id;
pub mod price;
pub mod product;
pub mod quantity;

pub use id::*;
pub use price::{DISPLAY_CONVERSION_RATE, display_amount, display_price};
pub use product::{CatalogLoad, Product, ProductError, Rating, RejectedProduct, validate_catalog};
pub use quantity::{Quantity, QuantityError};
