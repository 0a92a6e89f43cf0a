//! Library export.

use crate::{
    error::Result, Error, LibrarySnapshot, LibraryStore, SnapshotItem, SnapshotList, Timestamp,
    SNAPSHOT_FORMAT_VERSION,
};
use chrono::{DateTime, Utc};

/// Produce the snapshot of everything an owner has.
///
/// Items and lists come out in the owner's set order and carry persisted
/// ids, so the result can be imported again as-is. `now` (unix millis)
/// becomes `exportedAt`.
pub fn export_library<S: LibraryStore + ?Sized>(
    store: &S,
    owner_id: &str,
    now: Timestamp,
) -> Result<LibrarySnapshot> {
    let owner = store
        .owner(owner_id)?
        .ok_or_else(|| Error::OwnerNotFound(owner_id.to_string()))?;

    let media_items: Vec<SnapshotItem> = store
        .items(&owner.items)?
        .iter()
        .map(SnapshotItem::from)
        .collect();
    let lists: Vec<SnapshotList> = store
        .lists(&owner.lists)?
        .iter()
        .map(SnapshotList::from)
        .collect();

    if media_items.len() != owner.items.len() || lists.len() != owner.lists.len() {
        tracing::warn!(
            owner = %owner_id,
            missing_items = owner.items.len().saturating_sub(media_items.len()),
            missing_lists = owner.lists.len().saturating_sub(lists.len()),
            "owner references entities that no longer exist"
        );
    }

    Ok(LibrarySnapshot {
        format_version: SNAPSHOT_FORMAT_VERSION,
        exported_at: i64::try_from(now)
            .ok()
            .and_then(DateTime::<Utc>::from_timestamp_millis),
        media_items,
        lists,
    })
}
