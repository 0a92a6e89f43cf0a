//! Export handler - returns the owner's library as a snapshot.

use crate::db;
use crate::error::{AppError, Result};
use crate::AppState;
use serde::Deserialize;
use shelf_engine::{export_library, LibrarySnapshot, MemoryStore};

/// Query parameters for export.
#[derive(Debug, Default, Deserialize)]
pub struct ExportQuery {
    /// Serve the snapshot as a file attachment
    #[serde(default)]
    pub download: bool,
}

/// Load an owner's library and export it.
pub async fn handle_export(state: &AppState, owner_id: &str) -> Result<LibrarySnapshot> {
    let mut conn = state.pool.acquire().await?;

    let library = db::load_library(&mut conn, owner_id, false)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Owner {} not found", owner_id)))?;

    let mut store = MemoryStore::new();
    store.load(library.owner, library.items, library.lists);

    let now = chrono::Utc::now().timestamp_millis().max(0) as u64;
    Ok(export_library(&store, owner_id, now)?)
}

/// File name for a downloaded export, e.g. `shelf-export-2024-02-01.json`.
pub fn export_file_name(snapshot: &LibrarySnapshot) -> String {
    let date = snapshot
        .exported_at
        .unwrap_or_else(chrono::Utc::now)
        .format("%Y-%m-%d");
    format!("shelf-export-{}.json", date)
}
