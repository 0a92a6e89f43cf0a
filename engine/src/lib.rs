//! # Shelf Engine
//!
//! Library import/export reconciliation for a personal media tracker.
//!
//! A user's library is a set of media items (books and movies) and lists
//! that group them. This crate turns a portable snapshot of a library into
//! changes against an owner's existing library, and turns a library back
//! into a snapshot.
//!
//! ## Design Principles
//!
//! - **No IO**: storage is reached only through the [`LibraryStore`] trait
//! - **Additive**: an import never deletes an item, a list or a membership
//! - **Idempotent**: importing an export of the same library changes nothing
//! - **All or nothing**: [`MemoryStore::import`] stages every write and
//!   keeps none of them if any pass fails
//!
//! ## Core Concepts
//!
//! ### Snapshots
//!
//! A [`LibrarySnapshot`] holds items and lists under snapshot-local ids.
//! References between them (`item.lists`, `list.items`) use those local
//! ids. An export uses persisted ids, which work just as well on import.
//!
//! ### Natural keys
//!
//! Entities are matched by title, trimmed and case-folded, within one media
//! type. A snapshot Book titled `" dune "` updates an existing Book `"Dune"`
//! and leaves a Movie `"Dune"` alone. A title the owner holds only under the
//! other media type is a [`Error::MediaTypeConflict`].
//!
//! ### Import pipeline
//!
//! 1. [`validate_snapshot`] reports every structural and referential issue
//! 2. [`reconcile`](reconcile::reconcile) matches snapshot ids to persisted ids
//! 3. [`MergeExecutor`](merge::MergeExecutor) creates or updates items, then lists
//! 4. [`sync_back_references`](backref::sync_back_references) makes
//!    item -> list references agree with list -> item references
//! 5. [`export_library`] returns the resulting library
//!
//! ## Quick Start
//!
//! ```rust
//! use shelf_engine::{ImportOptions, ImportOutcome, MemoryStore};
//! use serde_json::json;
//!
//! let mut store = MemoryStore::new();
//! store.add_owner("user-1");
//!
//! let snapshot = json!({
//!     "mediaItems": [
//!         {"id": "i1", "title": "Dune", "mediaType": "Book", "categories": ["Sci-Fi"], "lists": ["l1"]}
//!     ],
//!     "lists": [
//!         {"id": "l1", "title": "Sci-Fi", "color": "#3366ff", "mediaType": "Book", "items": ["i1"]}
//!     ]
//! });
//!
//! let options = ImportOptions::default();
//! let outcome = store.import("user-1", &snapshot, &options, 1706745600000).unwrap();
//! let ImportOutcome::Imported { library, report } = outcome else {
//!     panic!("snapshot was rejected");
//! };
//! assert_eq!(report.items_created, 1);
//! assert_eq!(report.lists_created, 1);
//! assert_eq!(library.lists[0].items, vec![library.media_items[0].id.clone()]);
//!
//! // Importing the export again creates nothing
//! let export = serde_json::to_value(&library).unwrap();
//! let again = store.import("user-1", &export, &options, 1706745600001).unwrap();
//! let ImportOutcome::Imported { report, .. } = again else {
//!     panic!("export was rejected");
//! };
//! assert!(report.created_nothing());
//! ```

pub mod backref;
pub mod error;
pub mod export;
pub mod import;
pub mod journal;
pub mod merge;
pub mod model;
pub mod reconcile;
pub mod snapshot;
pub mod store;
pub mod validate;

// Re-exports for convenience
pub use error::Error;
pub use export::export_library;
pub use import::{import_snapshot, ImportOutcome, ImportReport};
pub use journal::{Journal, WriteOp};
pub use model::{
    BookDetails, EntityKind, ItemFields, ListFields, MediaDetails, MediaItem, MediaList,
    MediaType, MovieDetails, Owner, Rating, Status,
};
pub use reconcile::{normalize_title, Reconciliation, TranslationTable};
pub use snapshot::{
    LibrarySnapshot, SnapshotItem, SnapshotList, SnapshotMetadata, SNAPSHOT_FORMAT_VERSION,
};
pub use store::{IdGenerator, LibraryStore, MemoryStore, SequentialIds};
pub use validate::{validate_snapshot, ImportOptions, IssueKind, ValidationIssue};

/// Type aliases for clarity
pub type ItemId = String;
pub type ListId = String;
pub type OwnerId = String;
pub type Timestamp = u64;
