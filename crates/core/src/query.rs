//! Product query engine: free-text search plus sort over a fixed product set.
//!
//! The derived view is a pure function of `(products, search term, sort key)`.
//! [`ProductQuery`] memoizes it and only recomputes after one of the three
//! inputs actually changes.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::types::Product;

/// Sort orders offered by the catalog page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SortKey {
    PriceAsc,
    PriceDesc,
    NameAsc,
    NameDesc,
}

impl SortKey {
    /// All sort keys in menu order.
    pub const ALL: [Self; 4] = [Self::PriceAsc, Self::PriceDesc, Self::NameAsc, Self::NameDesc];

    /// The wire name (`price-asc`, ...).
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::PriceAsc => "price-asc",
            Self::PriceDesc => "price-desc",
            Self::NameAsc => "name-asc",
            Self::NameDesc => "name-desc",
        }
    }

    fn compare(self, a: &Product, b: &Product) -> Ordering {
        // Descending keys swap the operands rather than reversing the result
        // of a sort, so equal elements keep their input order.
        match self {
            Self::PriceAsc => a.price.cmp(&b.price),
            Self::PriceDesc => b.price.cmp(&a.price),
            Self::NameAsc => compare_names(&a.name, &b.name),
            Self::NameDesc => compare_names(&b.name, &a.name),
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned for an unrecognised sort key.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown sort key {0:?} (expected price-asc, price-desc, name-asc or name-desc)")]
pub struct UnknownSortKey(pub String);

impl FromStr for SortKey {
    type Err = UnknownSortKey;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|key| key.as_str() == s)
            .ok_or_else(|| UnknownSortKey(s.to_owned()))
    }
}

/// Collation for product names.
///
/// Letters compare without regard to case first, so `"bamboo"` sorts before
/// `"Cotton"`; names equal under that rule fall back to a plain comparison.
fn compare_names(a: &str, b: &str) -> Ordering {
    let folded = a
        .chars()
        .flat_map(char::to_lowercase)
        .cmp(b.chars().flat_map(char::to_lowercase));
    folded.then_with(|| a.cmp(b))
}

/// Whether a product's name or description contains `needle`.
///
/// `needle` must already be lowercase.
fn matches_search(product: &Product, needle: &str) -> bool {
    product.name.to_lowercase().contains(needle)
        || product.description.to_lowercase().contains(needle)
}

fn ordered_indices(products: &[Product], search_term: &str, sort_key: Option<SortKey>) -> Vec<usize> {
    let mut indices: Vec<usize> = if search_term.is_empty() {
        (0..products.len()).collect()
    } else {
        let needle = search_term.to_lowercase();
        products
            .iter()
            .enumerate()
            .filter(|(_, product)| matches_search(product, &needle))
            .map(|(i, _)| i)
            .collect()
    };

    if let Some(key) = sort_key {
        // `sort_by` is stable: ties keep input order.
        indices.sort_by(|&a, &b| match (products.get(a), products.get(b)) {
            (Some(a), Some(b)) => key.compare(a, b),
            _ => Ordering::Equal,
        });
    }

    indices
}

/// Filter and sort `products` without touching the input.
///
/// An empty search term keeps every product; no sort key keeps input order.
#[must_use]
pub fn apply_query<'a>(
    products: &'a [Product],
    search_term: &str,
    sort_key: Option<SortKey>,
) -> Vec<&'a Product> {
    ordered_indices(products, search_term, sort_key)
        .into_iter()
        .filter_map(|i| products.get(i))
        .collect()
}

/// Query state over an immutable product set, with a memoized view.
#[derive(Debug, Clone, Default)]
pub struct ProductQuery {
    products: Vec<Product>,
    search_term: String,
    sort_key: Option<SortKey>,
    view: Option<Vec<usize>>,
}

impl ProductQuery {
    #[must_use]
    pub const fn new(products: Vec<Product>) -> Self {
        Self {
            products,
            search_term: String::new(),
            sort_key: None,
            view: None,
        }
    }

    /// The unfiltered product set.
    #[must_use]
    pub fn products(&self) -> &[Product] {
        &self.products
    }

    #[must_use]
    pub fn search_term(&self) -> &str {
        &self.search_term
    }

    #[must_use]
    pub const fn sort_key(&self) -> Option<SortKey> {
        self.sort_key
    }

    /// Replace the product set.
    pub fn set_products(&mut self, products: Vec<Product>) {
        if self.products != products {
            self.products = products;
            self.view = None;
        }
    }

    pub fn set_search_term(&mut self, term: impl Into<String>) {
        let term = term.into();
        if self.search_term != term {
            self.search_term = term;
            self.view = None;
        }
    }

    pub fn set_sort_key(&mut self, key: Option<SortKey>) {
        if self.sort_key != key {
            self.sort_key = key;
            self.view = None;
        }
    }

    /// Whether the derived view is cached.
    #[must_use]
    pub const fn is_cached(&self) -> bool {
        self.view.is_some()
    }

    /// The filtered, ordered products.
    pub fn view(&mut self) -> Vec<&Product> {
        let indices = self.view.get_or_insert_with(|| {
            ordered_indices(&self.products, &self.search_term, self.sort_key)
        });
        indices.iter().filter_map(|&i| self.products.get(i)).collect()
    }
}
