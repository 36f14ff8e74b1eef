//! Yarnshop Core - storefront domain library.
//!
//! This crate holds the state machines and derived-data logic shared by the
//! yarnshop components:
//! - `api` - REST backend (products, auth, stats)
//! - `cli` - the storefront client (catalog, cart, checkout, recommendations)
//!
//! # Architecture
//!
//! The core crate contains only types, traits and synchronous logic - no
//! network, no database. Persistence goes through the [`storage::KeyValueStore`]
//! port so that the client can plug a file store and tests an in-memory one.
//!
//! # Modules
//!
//! - [`types`] - IDs, products, quantities and display prices
//! - [`storage`] - key/value storage port and in-memory implementation
//! - [`cart`] - cart store with merge-by-identity and persistence
//! - [`query`] - product search and sort engine
//! - [`feed`] - catalog fetch lifecycle that discards stale responses
//! - [`checkout`] - linear checkout wizard
//! - [`recommend`] - facet filter over the recommendation catalog
//! - [`auth`] - auth status oracle over persisted credentials

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod auth;
pub mod cart;
pub mod checkout;
pub mod feed;
pub mod query;
pub mod recommend;
pub mod storage;
pub mod types;

pub use types::*;
