//! API layer - HTTP entry points.

pub mod http;
pub mod sessions;

#[cfg(test)]
mod http_tests;

use std::sync::Arc;

use axum::Router;

use crate::app::App;

/// All routes with application state attached.
pub fn router(app: Arc<App>) -> Router {
    http::routes().merge(sessions::routes()).with_state(app)
}
