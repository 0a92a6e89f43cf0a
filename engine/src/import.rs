//! Import orchestration.
//!
//! An import is validate -> reconcile -> merge -> back-reference sync ->
//! export. A payload that fails validation is rejected with every issue
//! found and never reaches the store. Errors past that point propagate to
//! the caller, which owns atomicity (see [`MemoryStore::import`]).
//!
//! [`MemoryStore::import`]: crate::MemoryStore::import

use crate::{
    backref::sync_back_references, error::Result, export::export_library, merge::MergeExecutor,
    reconcile::reconcile, Error, ImportOptions, LibrarySnapshot, LibraryStore, Timestamp,
    ValidationIssue,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Counts of what an import did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportReport {
    pub items_created: usize,
    pub items_updated: usize,
    pub lists_created: usize,
    /// Snapshot lists merged into an existing list
    pub lists_merged: usize,
    pub back_references_added: usize,
}

impl ImportReport {
    /// Whether the import changed nothing but entity fields.
    pub fn created_nothing(&self) -> bool {
        self.items_created == 0 && self.lists_created == 0 && self.back_references_added == 0
    }
}

/// Result of an import that did not fail outright.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum ImportOutcome {
    /// The snapshot was merged; `library` is the owner's full library after
    /// the import.
    Imported {
        library: LibrarySnapshot,
        report: ImportReport,
    },
    /// The snapshot failed validation and nothing was written.
    Rejected { errors: Vec<ValidationIssue> },
}

impl ImportOutcome {
    pub fn is_imported(&self) -> bool {
        matches!(self, ImportOutcome::Imported { .. })
    }

    /// Validation messages of a rejected import.
    pub fn error_messages(&self) -> Vec<String> {
        match self {
            ImportOutcome::Imported { .. } => Vec::new(),
            ImportOutcome::Rejected { errors } => {
                errors.iter().map(|e| e.message.clone()).collect()
            }
        }
    }
}

/// Import a snapshot payload into an owner's library.
///
/// `now` (unix millis) stamps created entities and the returned export.
pub fn import_snapshot<S: LibraryStore + ?Sized>(
    store: &mut S,
    owner_id: &str,
    input: &Value,
    options: &ImportOptions,
    now: Timestamp,
) -> Result<ImportOutcome> {
    let mut owner = store
        .owner(owner_id)?
        .ok_or_else(|| Error::OwnerNotFound(owner_id.to_string()))?;

    let snapshot = match LibrarySnapshot::parse(input, options)? {
        Ok(snapshot) => snapshot,
        Err(errors) => {
            tracing::info!(owner = %owner_id, issues = errors.len(), "snapshot rejected");
            return Ok(ImportOutcome::Rejected { errors });
        }
    };

    let existing_items = store.items(&owner.items)?;
    let existing_lists = store.lists(&owner.lists)?;
    let mut reconciliation = reconcile(&existing_items, &existing_lists, &snapshot)?;

    let mut report = ImportReport::default();
    MergeExecutor::new(store, &mut owner, now).run(&snapshot, &mut reconciliation, &mut report)?;

    let stats = sync_back_references(store, &owner, &snapshot, &reconciliation)?;
    report.back_references_added = stats.total();

    let library = export_library(store, owner_id, now)?;

    tracing::info!(
        owner = %owner_id,
        items_created = report.items_created,
        items_updated = report.items_updated,
        lists_created = report.lists_created,
        lists_merged = report.lists_merged,
        back_references = report.back_references_added,
        "snapshot imported"
    );

    Ok(ImportOutcome::Imported { library, report })
}
