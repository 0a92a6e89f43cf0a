//! Import handler - merges an uploaded snapshot into the owner's library.

use crate::db;
use crate::error::{AppError, Result};
use crate::ids::UuidIds;
use crate::AppState;
use serde::Serialize;
use serde_json::Value;
use shelf_engine::{ImportOptions, ImportOutcome, ImportReport, LibrarySnapshot, MemoryStore};

/// Response for a successful import.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportResponse {
    /// The owner's whole library after the import
    pub library: LibrarySnapshot,
    pub report: ImportReport,
}

/// Run one import for `owner_id`.
///
/// Serialized per owner and bounded by the configured timeout, which also
/// covers waiting for the owner's lock. The snapshot is merged into an
/// in-memory copy of the library; the resulting journal is committed in one
/// transaction, or nothing is written at all.
pub async fn handle_import(state: &AppState, owner_id: &str, input: Value) -> Result<ImportResponse> {
    let limit = state.config.import_timeout;

    let result = tokio::time::timeout(limit, async {
        let _guard = state.locks.acquire(owner_id).await;
        run_import(state, owner_id, &input).await
    })
    .await;
    state.locks.prune();

    result.map_err(|_| AppError::Timeout(limit))?
}

async fn run_import(state: &AppState, owner_id: &str, input: &Value) -> Result<ImportResponse> {
    let mut tx = state.pool.begin().await?;

    let library = db::load_library(&mut tx, owner_id, true)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Owner {} not found", owner_id)))?;

    let mut store = MemoryStore::with_ids(UuidIds);
    store.load(library.owner, library.items, library.lists);

    let now = chrono::Utc::now().timestamp_millis().max(0) as u64;
    let outcome = store.import(owner_id, input, &ImportOptions::default(), now)?;

    match outcome {
        ImportOutcome::Rejected { .. } => {
            tx.rollback().await?;
            Err(AppError::Validation(outcome.error_messages()))
        }
        ImportOutcome::Imported { library, report } => {
            let ops = store.journal().compact();
            db::apply_journal(&mut tx, &ops).await?;
            tx.commit().await?;

            tracing::info!(
                owner = %owner_id,
                ops = ops.len(),
                items_created = report.items_created,
                lists_created = report.lists_created,
                "Import committed"
            );

            Ok(ImportResponse { library, report })
        }
    }
}
