//! HTTP middleware stack for the API.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (capture errors, transactions)
//! 2. CORS
//! 3. `TraceLayer` (request tracing)
//! 4. Request ID (add unique ID to each request)
//! 5. Rate limiting (governor, when enabled)
//!
//! Bearer-token authentication is an extractor ([`RequireUser`]) rather than a
//! layer, so only the handlers that need it pay for the lookup.

pub mod auth;
pub mod rate_limit;
pub mod request_id;

pub use auth::RequireUser;
pub use rate_limit::{api_rate_limiter, auth_rate_limiter};
pub use request_id::{REQUEST_ID_HEADER, RequestId, request_id_middleware};
