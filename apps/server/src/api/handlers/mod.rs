//! Request handlers for API endpoints
//!
//! Handlers extract the language and query parameters, call the services,
//! and turn the results into responses. Errors map to responses through
//! [`crate::Error`].

pub mod detail;
pub mod export;
pub mod metrics;
pub mod search;
