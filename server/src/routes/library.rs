//! Library import and export routes.

use axum::{
    extract::{DefaultBodyLimit, Query, State},
    http::header,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::Value;

use crate::auth::AuthUser;
use crate::error::Result;
use crate::handlers::{export_file_name, handle_export, handle_import, ExportQuery, ImportResponse};
use crate::AppState;

/// Create library routes.
pub fn routes(max_import_bytes: usize) -> Router<AppState> {
    Router::new()
        .route("/library/export", get(export_handler))
        .route(
            "/library/import",
            post(import_handler).layer(DefaultBodyLimit::max(max_import_bytes)),
        )
}

/// POST /library/import - Merge a snapshot into the caller's library.
async fn import_handler(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(input): Json<Value>,
) -> Result<Json<ImportResponse>> {
    let response = handle_import(&state, &auth.owner_id, input).await?;
    Ok(Json(response))
}

/// GET /library/export - Export the caller's library.
async fn export_handler(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<ExportQuery>,
) -> Result<Response> {
    let snapshot = handle_export(&state, &auth.owner_id).await?;

    if query.download {
        let disposition = format!("attachment; filename=\"{}\"", export_file_name(&snapshot));
        return Ok(([(header::CONTENT_DISPOSITION, disposition)], Json(snapshot)).into_response());
    }

    Ok(Json(snapshot).into_response())
}
