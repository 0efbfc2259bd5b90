//! Question Period notes routes
//!
//! Every route is prefixed with the language code (`/en`, `/fr`). Both the
//! bare and the trailing-slash form are registered; no redirects are used.

use crate::api::handlers::{detail, export, search};
use crate::state::AppState;
use axum::{routing::get, Router};

pub fn qp_routes() -> Router<AppState> {
    Router::new()
        .route("/:lang/qp", get(search::search))
        .route("/:lang/qp/", get(search::search))
        .route("/:lang/qp/id/:slug", get(detail::detail))
        .route("/:lang/qp/export", get(export::export))
        .route("/:lang/qp/export/", get(export::export))
}
