//! Error types for the Shelf engine.

use crate::{EntityKind, ItemId, ListId, MediaType, OwnerId};
use thiserror::Error;

/// All fatal errors from the Shelf engine.
///
/// Snapshot validation problems are not errors: they are collected as
/// [`ValidationIssue`](crate::ValidationIssue)s and returned as data.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("owner not found: {0}")]
    OwnerNotFound(OwnerId),

    #[error("media item not found: {0}")]
    ItemNotFound(ItemId),

    #[error("list not found: {0}")]
    ListNotFound(ListId),

    #[error(
        "{kind} '{title}' already exists as {existing}, cannot merge an incoming {incoming}"
    )]
    MediaTypeConflict {
        kind: EntityKind,
        title: String,
        existing: MediaType,
        incoming: MediaType,
    },

    #[error("invalid snapshot: {0}")]
    InvalidSnapshot(String),

    #[error("store error: {0}")]
    Store(String),
}

/// Result type for engine operations.
pub type Result<T> = std::result::Result<T, Error>;
