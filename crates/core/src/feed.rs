//! Catalog feed: the fetch lifecycle around a [`ProductQuery`].
//!
//! Every fetch takes a [`FetchTicket`] carrying a generation number. Only the
//! response for the most recently issued ticket is applied; responses for
//! superseded fetches are dropped, so a slow early request can never overwrite
//! the result of a later one.

use std::fmt::Display;

use crate::query::{ProductQuery, SortKey};
use crate::types::{CatalogLoad, Product, RejectedProduct};

/// Handle for one in-flight catalog fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchTicket {
    generation: u64,
}

impl FetchTicket {
    #[must_use]
    pub const fn generation(self) -> u64 {
        self.generation
    }
}

/// What happened to a completed fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    /// The response was applied to the feed.
    Applied,
    /// A newer fetch was issued; the response was dropped.
    Stale,
}

/// Product listing state for the catalog view.
#[derive(Debug, Default)]
pub struct CatalogFeed {
    query: ProductQuery,
    generation: u64,
    loading: bool,
    error: Option<String>,
    rejected: Vec<RejectedProduct>,
}

impl CatalogFeed {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a fetch. Any earlier ticket becomes stale.
    pub fn begin_fetch(&mut self) -> FetchTicket {
        self.generation = self.generation.wrapping_add(1);
        self.loading = true;
        tracing::debug!(generation = self.generation, "Catalog fetch started");
        FetchTicket {
            generation: self.generation,
        }
    }

    /// Complete a fetch with its result.
    ///
    /// On success the products replace the current set and the error is
    /// cleared; on failure the previous products are kept and the error is
    /// recorded for the page-level message.
    pub fn complete_fetch<E: Display>(
        &mut self,
        ticket: FetchTicket,
        result: Result<CatalogLoad, E>,
    ) -> FetchOutcome {
        if ticket.generation != self.generation {
            tracing::debug!(
                ticket = ticket.generation,
                current = self.generation,
                "Dropping response for superseded catalog fetch"
            );
            return FetchOutcome::Stale;
        }

        self.loading = false;
        match result {
            Ok(load) => {
                self.error = None;
                self.rejected = load.rejected;
                self.query.set_products(load.products);
            }
            Err(e) => {
                tracing::warn!(error = %e, "Catalog fetch failed");
                self.error = Some(e.to_string());
            }
        }
        FetchOutcome::Applied
    }

    #[must_use]
    pub const fn is_loading(&self) -> bool {
        self.loading
    }

    /// Message from the last failed fetch, if the last fetch failed.
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Entries quarantined by the last successful fetch.
    #[must_use]
    pub fn rejected(&self) -> &[RejectedProduct] {
        &self.rejected
    }

    #[must_use]
    pub fn products(&self) -> &[Product] {
        self.query.products()
    }

    pub fn set_search_term(&mut self, term: impl Into<String>) {
        self.query.set_search_term(term);
    }

    pub fn set_sort_key(&mut self, key: Option<SortKey>) {
        self.query.set_sort_key(key);
    }

    /// The filtered, ordered products.
    pub fn view(&mut self) -> Vec<&Product> {
        self.query.view()
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;
    use crate::types::ProductId;

    fn load(ids: &[i32]) -> CatalogLoad {
        CatalogLoad {
            products: ids
                .iter()
                .map(|&id| Product {
                    id: ProductId::new(id),
                    name: format!("Yarn {id}"),
                    description: String::new(),
                    price: Decimal::ONE,
                    image: String::new(),
                    category: "Yarn".to_owned(),
                    rating: None,
                })
                .collect(),
            rejected: Vec::new(),
        }
    }

    fn ids(feed: &mut CatalogFeed) -> Vec<i32> {
        feed.view().iter().map(|p| p.id.as_i32()).collect()
    }

    #[test]
    fn test_fetch_lifecycle() {
        let mut feed = CatalogFeed::new();
        let ticket = feed.begin_fetch();
        assert!(feed.is_loading());

        let outcome = feed.complete_fetch(ticket, Ok::<_, String>(load(&[1, 2])));
        assert_eq!(outcome, FetchOutcome::Applied);
        assert!(!feed.is_loading());
        assert_eq!(ids(&mut feed), vec![1, 2]);
    }

    #[test]
    fn test_stale_response_is_dropped() {
        let mut feed = CatalogFeed::new();
        let first = feed.begin_fetch();
        let second = feed.begin_fetch();

        assert_eq!(
            feed.complete_fetch(second, Ok::<_, String>(load(&[2]))),
            FetchOutcome::Applied
        );
        assert_eq!(
            feed.complete_fetch(first, Ok::<_, String>(load(&[1]))),
            FetchOutcome::Stale
        );
        assert_eq!(ids(&mut feed), vec![2]);
    }

    #[test]
    fn test_failure_keeps_previous_products() {
        let mut feed = CatalogFeed::new();
        let ticket = feed.begin_fetch();
        feed.complete_fetch(ticket, Ok::<_, String>(load(&[1])));

        let ticket = feed.begin_fetch();
        feed.complete_fetch(ticket, Err::<CatalogLoad, _>("connection refused"));
        assert_eq!(feed.error(), Some("connection refused"));
        assert_eq!(ids(&mut feed), vec![1]);

        let ticket = feed.begin_fetch();
        feed.complete_fetch(ticket, Ok::<_, String>(load(&[3])));
        assert_eq!(feed.error(), None);
    }

    #[test]
    fn test_query_passthrough() {
        let mut feed = CatalogFeed::new();
        let ticket = feed.begin_fetch();
        feed.complete_fetch(ticket, Ok::<_, String>(load(&[1, 2, 3])));

        feed.set_search_term("yarn 2");
        assert_eq!(ids(&mut feed), vec![2]);

        feed.set_search_term("");
        feed.set_sort_key(Some(SortKey::NameDesc));
        assert_eq!(ids(&mut feed), vec![3, 2, 1]);
    }
}
