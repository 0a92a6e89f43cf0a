//! Back-reference synchronization.
//!
//! Lists point at items and items point back at lists. A newly created
//! list's id is only known once the list pass has run, so the inverse
//! direction (item -> lists) is derived afterwards from the final state:
//!
//! 1. every resolved `item.lists` reference also puts the item into that
//!    list, if it is not a member already;
//! 2. every member of every snapshot list, including members that predate
//!    the import, gets that list in its own `lists`.
//!
//! Both steps only add. Items outside the owner's item set are skipped.

use crate::{
    error::Result, reconcile::Reconciliation, ItemId, LibrarySnapshot, LibraryStore, ListId, Owner,
};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Counts of references added by a sync.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackReferenceStats {
    /// List ids added to items' `lists`
    pub item_links_added: usize,
    /// Item ids added to lists' `items`
    pub list_links_added: usize,
    /// References skipped because the item is not owned or no longer exists
    pub skipped: usize,
}

impl BackReferenceStats {
    pub fn total(&self) -> usize {
        self.item_links_added + self.list_links_added
    }
}

/// Ordered one-to-many link collector.
#[derive(Debug, Default)]
struct Links {
    order: Vec<String>,
    targets: HashMap<String, Vec<String>>,
}

impl Links {
    fn add(&mut self, from: &str, to: &str) {
        if !self.targets.contains_key(from) {
            self.order.push(from.to_string());
        }
        let targets = self.targets.entry(from.to_string()).or_default();
        if !targets.iter().any(|t| t == to) {
            targets.push(to.to_string());
        }
    }

    fn iter(&self) -> impl Iterator<Item = (&String, &Vec<String>)> {
        self.order
            .iter()
            .filter_map(move |from| self.targets.get(from).map(|to| (from, to)))
    }
}

/// Make item -> list references agree with list -> item references for
/// everything the snapshot touched.
pub fn sync_back_references<S: LibraryStore + ?Sized>(
    store: &mut S,
    owner: &Owner,
    snapshot: &LibrarySnapshot,
    reconciliation: &Reconciliation,
) -> Result<BackReferenceStats> {
    let mut stats = BackReferenceStats::default();
    let mut item_links = Links::default();
    let mut list_links = Links::default();

    for item in &snapshot.media_items {
        let Some(item_id) = reconciliation.items.get(&item.id) else {
            continue;
        };
        for list_id in reconciliation.lists.rewrite(&item.lists) {
            item_links.add(item_id, &list_id);
            list_links.add(&list_id, item_id);
        }
    }

    for (list_id, items) in list_links.iter() {
        stats.list_links_added += store.add_list_items(list_id, items)?;
    }

    let mut touched_lists: Vec<ListId> = Vec::new();
    for list in &snapshot.lists {
        if let Some(list_id) = reconciliation.lists.get(&list.id) {
            if !touched_lists.iter().any(|l| l == list_id) {
                touched_lists.push(list_id.to_string());
            }
        }
    }
    for list in store.lists(&touched_lists)? {
        for member in &list.items {
            item_links.add(member, &list.id);
        }
    }

    let candidates: Vec<ItemId> = item_links.iter().map(|(id, _)| id.clone()).collect();
    let present: HashSet<ItemId> = store
        .items(&candidates)?
        .into_iter()
        .map(|item| item.id)
        .collect();

    for (item_id, lists) in item_links.iter() {
        if !owner.owns_item(item_id) || !present.contains(item_id) {
            tracing::warn!(
                owner = %owner.id,
                item = %item_id,
                "skipping back-reference for an item outside the owner's library"
            );
            stats.skipped += lists.len();
            continue;
        }
        stats.item_links_added += store.add_item_lists(item_id, lists)?;
    }

    tracing::debug!(
        owner = %owner.id,
        item_links = stats.item_links_added,
        list_links = stats.list_links_added,
        skipped = stats.skipped,
        "back-references synchronized"
    );

    Ok(stats)
}
