//! HTTP route definitions.

mod health;
mod library;

use crate::AppState;
use axum::Router;

/// Create all application routes.
pub fn create_routes(max_import_bytes: usize) -> Router<AppState> {
    Router::new()
        .merge(health::routes())
        .merge(library::routes(max_import_bytes))
}
