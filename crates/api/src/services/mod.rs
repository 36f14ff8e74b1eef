//! Business logic services for the API.
//!
//! # Services
//!
//! - `auth` - Account registration, password login and bearer tokens
pub mod auth;
