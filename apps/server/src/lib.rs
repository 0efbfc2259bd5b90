//! Question Period notes search server
//!
//! An HTTP front-end over the notes search index:
//! - Faceted, highlighted, paginated search in English and French
//! - Single-note detail pages
//! - CSV exports served from an on-disk cache

pub mod api;
pub mod config;
pub mod error;
pub mod logging;
pub mod metrics;
pub mod request_context;
pub mod services;
pub mod state;

pub use config::Config;
pub use error::{Error, Result};
pub use state::AppState;
