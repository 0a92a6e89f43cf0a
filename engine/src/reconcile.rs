//! Identity reconciliation between a snapshot and an owner's library.
//!
//! Snapshot entities carry local identifiers that mean nothing to the store.
//! This module maps them onto persisted identifiers using the natural key
//! (the normalized title), producing one translation table for items and
//! one for lists.
//!
//! # Duplicate titles
//!
//! Titles are matched within a media type, so a Book and a Movie may share
//! one. When an owner already has several entities of one media type with
//! the same normalized title, the earliest-created one wins, ties broken by
//! the smaller id. The outcome therefore never depends on store iteration
//! order.

use crate::{
    error::Result, EntityKind, Error, MediaItem, MediaList, MediaType, SnapshotItem, SnapshotList,
    Timestamp,
};
use std::collections::HashMap;

/// Normalize a title into its natural key: trimmed and case-folded.
pub fn normalize_title(title: &str) -> String {
    title.trim().to_lowercase()
}

/// Snapshot-local id -> persisted id, for one entity kind.
///
/// Lives for a single import only.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TranslationTable {
    entries: HashMap<String, String>,
}

impl TranslationTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Persisted id for a snapshot-local id, if mapped.
    pub fn get(&self, local: &str) -> Option<&str> {
        self.entries.get(local).map(String::as_str)
    }

    pub fn insert(&mut self, local: impl Into<String>, persisted: impl Into<String>) {
        self.entries.insert(local.into(), persisted.into());
    }

    pub fn contains(&self, local: &str) -> bool {
        self.entries.contains_key(local)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Rewrite local references into persisted ids.
    ///
    /// Unresolved references are dropped; the result keeps first-seen order
    /// and contains no duplicates.
    pub fn rewrite(&self, refs: &[String]) -> Vec<String> {
        let mut rewritten: Vec<String> = Vec::with_capacity(refs.len());
        for local in refs {
            if let Some(persisted) = self.get(local) {
                if !rewritten.iter().any(|r| r == persisted) {
                    rewritten.push(persisted.to_string());
                }
            }
        }
        rewritten
    }
}

#[derive(Debug, Clone)]
struct Candidate {
    id: String,
    media_type: MediaType,
    created_at: Timestamp,
    /// Set when the entity existed before this import
    owned: bool,
}

/// Result of looking a title up for one media type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TitleMatch<'a> {
    /// An entity with this title and media type
    Found(&'a str),
    /// Only previously owned entities of another media type carry this title
    Conflict(MediaType),
    Vacant,
}

/// Normalized title -> the entities that own that natural key, at most one
/// per media type.
#[derive(Debug, Clone, Default)]
pub struct TitleIndex {
    entries: HashMap<String, Vec<Candidate>>,
}

impl TitleIndex {
    /// Register an entity. The entry for its media type is replaced only by
    /// an earlier (created_at, id) pair.
    pub fn insert(
        &mut self,
        title: &str,
        id: &str,
        media_type: MediaType,
        created_at: Timestamp,
        owned: bool,
    ) {
        let candidate = Candidate {
            id: id.to_string(),
            media_type,
            created_at,
            owned,
        };
        let slot = self.entries.entry(normalize_title(title)).or_default();
        match slot.iter_mut().find(|c| c.media_type == media_type) {
            Some(current) => {
                let owned = current.owned || owned;
                if (candidate.created_at, &candidate.id) < (current.created_at, &current.id) {
                    *current = candidate;
                }
                current.owned = owned;
            }
            None => slot.push(candidate),
        }
    }

    /// Look up the entity holding this title's natural key for `media_type`.
    pub fn lookup(&self, title: &str, media_type: MediaType) -> TitleMatch<'_> {
        let Some(slot) = self.entries.get(&normalize_title(title)) else {
            return TitleMatch::Vacant;
        };
        if let Some(found) = slot.iter().find(|c| c.media_type == media_type) {
            return TitleMatch::Found(&found.id);
        }
        match slot.iter().find(|c| c.owned) {
            Some(other) => TitleMatch::Conflict(other.media_type),
            None => TitleMatch::Vacant,
        }
    }

    /// Number of distinct normalized titles.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Output of identity reconciliation, extended by the merge executor as it
/// creates new entities.
#[derive(Debug, Clone, Default)]
pub struct Reconciliation {
    /// Snapshot item id -> persisted item id
    pub items: TranslationTable,
    /// Snapshot list id -> persisted list id
    pub lists: TranslationTable,
    item_titles: TitleIndex,
    list_titles: TitleIndex,
}

impl Reconciliation {
    /// Persisted id for a snapshot item, if it matches an existing entity or
    /// one created earlier in this import.
    pub fn resolve_item(&self, item: &SnapshotItem) -> Result<Option<String>> {
        if let Some(id) = self.items.get(&item.id) {
            return Ok(Some(id.to_string()));
        }
        resolve_title(
            &self.item_titles,
            EntityKind::Item,
            item.title(),
            item.media_type(),
        )
    }

    /// Persisted id for a snapshot list, same rules as [`Self::resolve_item`].
    pub fn resolve_list(&self, list: &SnapshotList) -> Result<Option<String>> {
        if let Some(id) = self.lists.get(&list.id) {
            return Ok(Some(id.to_string()));
        }
        resolve_title(
            &self.list_titles,
            EntityKind::List,
            list.title(),
            list.media_type(),
        )
    }

    /// Record the persisted id a snapshot item resolved to.
    pub fn record_item(&mut self, item: &SnapshotItem, id: &str, created_at: Timestamp) {
        self.items.insert(item.id.clone(), id);
        self.item_titles
            .insert(item.title(), id, item.media_type(), created_at, false);
    }

    /// Record the persisted id a snapshot list resolved to.
    pub fn record_list(&mut self, list: &SnapshotList, id: &str, created_at: Timestamp) {
        self.lists.insert(list.id.clone(), id);
        self.list_titles
            .insert(list.title(), id, list.media_type(), created_at, false);
    }
}

fn resolve_title(
    index: &TitleIndex,
    kind: EntityKind,
    title: &str,
    incoming: MediaType,
) -> Result<Option<String>> {
    match index.lookup(title, incoming) {
        TitleMatch::Found(id) => Ok(Some(id.to_string())),
        TitleMatch::Conflict(existing) => Err(Error::MediaTypeConflict {
            kind,
            title: title.to_string(),
            existing,
            incoming,
        }),
        TitleMatch::Vacant => Ok(None),
    }
}

/// Match snapshot entities against an owner's existing items and lists.
///
/// Only the entities passed in are candidates, so callers must pass exactly
/// the owner's items and lists. The natural key is the normalized title
/// within one media type. Fails with [`Error::MediaTypeConflict`] when a
/// title only matches owned entities of the other media type.
pub fn reconcile(
    existing_items: &[MediaItem],
    existing_lists: &[MediaList],
    snapshot: &crate::LibrarySnapshot,
) -> Result<Reconciliation> {
    let mut reconciliation = Reconciliation::default();

    for item in existing_items {
        reconciliation
            .item_titles
            .insert(item.title(), &item.id, item.media_type(), item.created_at, true);
    }
    for list in existing_lists {
        reconciliation
            .list_titles
            .insert(list.title(), &list.id, list.media_type(), list.created_at, true);
    }

    for item in &snapshot.media_items {
        if let Some(id) = reconciliation.resolve_item(item)? {
            reconciliation.items.insert(item.id.clone(), id);
        }
    }
    for list in &snapshot.lists {
        if let Some(id) = reconciliation.resolve_list(list)? {
            reconciliation.lists.insert(list.id.clone(), id);
        }
    }

    tracing::debug!(
        matched_items = reconciliation.items.len(),
        new_items = snapshot.media_items.len().saturating_sub(reconciliation.items.len()),
        matched_lists = reconciliation.lists.len(),
        new_lists = snapshot.lists.len().saturating_sub(reconciliation.lists.len()),
        "reconciled snapshot identities"
    );

    Ok(reconciliation)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ItemFields, LibrarySnapshot, ListFields};

    fn book(id: &str, title: &str, created_at: Timestamp) -> MediaItem {
        MediaItem::new(id, ItemFields::new(title, MediaType::Book), created_at)
    }

    fn snapshot_item(id: &str, title: &str, media_type: MediaType) -> SnapshotItem {
        SnapshotItem {
            id: id.into(),
            fields: ItemFields::new(title, media_type),
            lists: Vec::new(),
        }
    }

    fn snapshot_list(id: &str, title: &str) -> SnapshotList {
        SnapshotList {
            id: id.into(),
            fields: ListFields::new(title, "#fff", MediaType::Book),
            items: Vec::new(),
        }
    }

    fn snapshot_with(items: Vec<SnapshotItem>, lists: Vec<SnapshotList>) -> LibrarySnapshot {
        let mut snapshot = LibrarySnapshot::new();
        snapshot.media_items = items;
        snapshot.lists = lists;
        snapshot
    }

    #[test]
    fn normalize() {
        assert_eq!(normalize_title("  Dune  "), "dune");
        assert_eq!(normalize_title("DUNE"), "dune");
        assert_eq!(normalize_title("\tThe Left Hand\n"), "the left hand");
    }

    #[test]
    fn matches_case_and_whitespace_insensitively() {
        let existing = vec![book("p-1", "Dune", 1)];
        let snapshot = snapshot_with(vec![snapshot_item("i1", "  dune  ", MediaType::Book)], vec![]);

        let result = reconcile(&existing, &[], &snapshot).unwrap();
        assert_eq!(result.items.get("i1"), Some("p-1"));
    }

    #[test]
    fn unmatched_entities_stay_unmapped() {
        let existing = vec![book("p-1", "Dune", 1)];
        let snapshot = snapshot_with(
            vec![snapshot_item("i1", "Emma", MediaType::Book)],
            vec![snapshot_list("l1", "Classics")],
        );

        let result = reconcile(&existing, &[], &snapshot).unwrap();
        assert!(result.items.is_empty());
        assert!(result.lists.is_empty());
    }

    #[test]
    fn lists_match_independently() {
        let existing_lists = vec![MediaList::new(
            "pl-1",
            "user-1",
            ListFields::new("Sci-Fi", "#000", MediaType::Book),
            5,
        )];
        let snapshot = snapshot_with(
            vec![snapshot_item("x", "sci-fi", MediaType::Book)],
            vec![snapshot_list("l1", "SCI-FI ")],
        );

        let result = reconcile(&[], &existing_lists, &snapshot).unwrap();
        assert_eq!(result.lists.get("l1"), Some("pl-1"));
        assert!(!result.items.contains("x"));
    }

    #[test]
    fn duplicate_titles_prefer_earliest_created() {
        let existing = vec![book("p-b", "Dune", 20), book("p-a", "dune", 10), book("p-c", "DUNE", 30)];
        let snapshot = snapshot_with(vec![snapshot_item("i1", "Dune", MediaType::Book)], vec![]);

        let result = reconcile(&existing, &[], &snapshot).unwrap();
        assert_eq!(result.items.get("i1"), Some("p-a"));

        // Same creation time: smallest id wins, whatever the input order
        let existing = vec![book("p-9", "Dune", 10), book("p-2", "Dune", 10)];
        let result = reconcile(&existing, &[], &snapshot).unwrap();
        assert_eq!(result.items.get("i1"), Some("p-2"));
    }

    #[test]
    fn media_type_conflict_is_an_error() {
        let existing = vec![book("p-1", "Dune", 1)];
        let snapshot = snapshot_with(vec![snapshot_item("i1", "Dune", MediaType::Movie)], vec![]);

        let err = reconcile(&existing, &[], &snapshot).unwrap_err();
        assert_eq!(
            err,
            Error::MediaTypeConflict {
                kind: EntityKind::Item,
                title: "Dune".into(),
                existing: MediaType::Book,
                incoming: MediaType::Movie,
            }
        );
    }

    #[test]
    fn book_and_movie_may_share_a_title() {
        let existing = vec![
            book("p-b", "Dune", 10),
            MediaItem::new("p-m", ItemFields::new("Dune", MediaType::Movie), 20),
        ];
        let snapshot = snapshot_with(
            vec![
                snapshot_item("i1", "Dune", MediaType::Movie),
                snapshot_item("i2", "dune", MediaType::Book),
            ],
            vec![],
        );

        let result = reconcile(&existing, &[], &snapshot).unwrap();
        assert_eq!(result.items.get("i1"), Some("p-m"));
        assert_eq!(result.items.get("i2"), Some("p-b"));
    }

    #[test]
    fn entities_created_in_this_import_never_conflict() {
        let mut result = reconcile(&[], &[], &LibrarySnapshot::new()).unwrap();

        let novel = snapshot_item("i1", "Dune", MediaType::Book);
        let film = snapshot_item("i2", "Dune", MediaType::Movie);
        result.record_item(&novel, "p-1", 100);

        assert_eq!(result.resolve_item(&film).unwrap(), None);
        result.record_item(&film, "p-2", 101);
        assert_eq!(result.resolve_item(&film).unwrap(), Some("p-2".to_string()));
        assert_eq!(result.resolve_item(&novel).unwrap(), Some("p-1".to_string()));
    }

    #[test]
    fn recorded_entities_resolve_later_duplicates() {
        let mut result = reconcile(&[], &[], &LibrarySnapshot::new()).unwrap();

        let first = snapshot_item("i1", "Dune", MediaType::Book);
        let second = snapshot_item("i2", " dune", MediaType::Book);
        assert_eq!(result.resolve_item(&second).unwrap(), None);

        result.record_item(&first, "p-1", 100);
        assert_eq!(result.resolve_item(&second).unwrap(), Some("p-1".to_string()));
        assert_eq!(result.items.get("i1"), Some("p-1"));
    }

    #[test]
    fn rewrite_drops_unresolved_and_duplicates() {
        let mut table = TranslationTable::new();
        table.insert("a", "p-a");
        table.insert("b", "p-b");
        table.insert("b2", "p-b");

        let refs: Vec<String> = ["b", "missing", "a", "b2", "a"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(table.rewrite(&refs), vec!["p-b", "p-a"]);
        assert_eq!(table.len(), 3);
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn prop_normalize_is_idempotent(title in "[a-zA-Z0-9 \\t]{0,24}") {
                let once = normalize_title(&title);
                prop_assert_eq!(normalize_title(&once), once.clone());
            }

            #[test]
            fn prop_padding_and_case_do_not_change_key(
                title in "[a-zA-Z][a-zA-Z ]{0,16}[a-zA-Z]",
                left in "[ \\t]{0,3}",
                right in "[ \\t]{0,3}",
            ) {
                let padded = format!("{}{}{}", left, title.to_uppercase(), right);
                prop_assert_eq!(normalize_title(&padded), normalize_title(&title));
            }

            #[test]
            fn prop_tie_break_ignores_insertion_order(
                stamps in proptest::collection::vec(0u64..5, 1..6),
            ) {
                let items: Vec<MediaItem> = stamps
                    .iter()
                    .enumerate()
                    .map(|(i, t)| book(&format!("p-{}", i), "Dune", *t))
                    .collect();
                let mut reversed = items.clone();
                reversed.reverse();

                let snapshot = snapshot_with(vec![snapshot_item("i", "dune", MediaType::Book)], vec![]);
                let forward = reconcile(&items, &[], &snapshot).unwrap();
                let backward = reconcile(&reversed, &[], &snapshot).unwrap();
                prop_assert_eq!(forward.items.get("i"), backward.items.get("i"));

                let earliest = stamps.iter().min().copied().unwrap();
                let winner = forward.items.get("i").unwrap();
                let winner_item = items.iter().find(|i| i.id == winner).unwrap();
                prop_assert_eq!(winner_item.created_at, earliest);
            }
        }
    }
}
