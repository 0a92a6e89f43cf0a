//! Store - the keyed entity store an import reads and writes.
//!
//! [`LibraryStore`] is the collaborator interface the engine consumes.
//! [`MemoryStore`] implements it in memory and records every mutation in a
//! [`Journal`], which lets a persistent backend stage an import in memory and
//! commit it atomically.

use crate::{
    error::Result, import::ImportOutcome, EntityKind, Error, ImportOptions, ItemFields, ItemId,
    Journal, ListFields, ListId, MediaItem, MediaList, Owner, OwnerId, Timestamp, WriteOp,
};
use std::collections::HashMap;

/// Keyed store for owners, media items and lists.
pub trait LibraryStore {
    /// Look up an owner aggregate.
    fn owner(&self, id: &str) -> Result<Option<Owner>>;

    /// Persist an owner's item and list sets.
    fn save_owner(&mut self, owner: &Owner) -> Result<()>;

    /// Fetch items by id, in the order given. Unknown ids are skipped.
    fn items(&self, ids: &[ItemId]) -> Result<Vec<MediaItem>>;

    /// Fetch lists by id, in the order given. Unknown ids are skipped.
    fn lists(&self, ids: &[ListId]) -> Result<Vec<MediaList>>;

    /// Create an item with no list memberships and return its new id.
    fn create_item(&mut self, fields: ItemFields, created_at: Timestamp) -> Result<ItemId>;

    /// Replace an item's mutable fields. Its media type may not change.
    fn update_item(&mut self, id: &str, fields: ItemFields) -> Result<()>;

    /// Set-union list ids into an item's memberships. Returns how many were new.
    fn add_item_lists(&mut self, id: &str, lists: &[ListId]) -> Result<usize>;

    /// Create a list owned by `owner` and return its new id.
    fn create_list(
        &mut self,
        owner: &OwnerId,
        fields: ListFields,
        items: Vec<ItemId>,
        created_at: Timestamp,
    ) -> Result<ListId>;

    /// Replace a list's mutable fields and member set. Its media type may not change.
    fn update_list(&mut self, id: &str, fields: ListFields, items: Vec<ItemId>) -> Result<()>;

    /// Set-union item ids into a list's members. Returns how many were new.
    fn add_list_items(&mut self, id: &str, items: &[ItemId]) -> Result<usize>;

    /// Fetch one list.
    fn list(&self, id: &str) -> Result<MediaList> {
        self.lists(&[id.to_string()])?
            .pop()
            .ok_or_else(|| Error::ListNotFound(id.to_string()))
    }
}

/// Source of fresh identifiers for created entities.
pub trait IdGenerator {
    fn next_id(&mut self, kind: EntityKind) -> String;
}

/// Deterministic ids: `item-1`, `list-2`, ...
#[derive(Debug, Clone, Default)]
pub struct SequentialIds {
    next: u64,
}

impl IdGenerator for SequentialIds {
    fn next_id(&mut self, kind: EntityKind) -> String {
        self.next += 1;
        match kind {
            EntityKind::Item => format!("item-{}", self.next),
            EntityKind::List => format!("list-{}", self.next),
        }
    }
}

/// In-memory [`LibraryStore`] with a write journal.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore<G = SequentialIds> {
    owners: HashMap<OwnerId, Owner>,
    items: HashMap<ItemId, MediaItem>,
    lists: HashMap<ListId, MediaList>,
    ids: G,
    journal: Journal,
}

impl MemoryStore<SequentialIds> {
    /// Create an empty store with sequential ids.
    pub fn new() -> Self {
        Self::default()
    }
}

impl<G: IdGenerator + Clone> MemoryStore<G> {
    /// Create an empty store using the given id generator.
    pub fn with_ids(ids: G) -> Self {
        Self {
            owners: HashMap::new(),
            items: HashMap::new(),
            lists: HashMap::new(),
            ids,
            journal: Journal::new(),
        }
    }

    /// Seed an owner's library without journaling it.
    pub fn load(&mut self, owner: Owner, items: Vec<MediaItem>, lists: Vec<MediaList>) {
        for item in items {
            self.items.insert(item.id.clone(), item);
        }
        for list in lists {
            self.lists.insert(list.id.clone(), list);
        }
        self.owners.insert(owner.id.clone(), owner);
    }

    /// Register an owner with an empty library. Returns false if it existed.
    pub fn add_owner(&mut self, id: impl Into<OwnerId>) -> bool {
        let id = id.into();
        if self.owners.contains_key(&id) {
            return false;
        }
        self.owners.insert(id.clone(), Owner::new(id));
        true
    }

    /// Get an item by id.
    pub fn item(&self, id: &str) -> Option<&MediaItem> {
        self.items.get(id)
    }

    /// Get a list by id.
    pub fn get_list(&self, id: &str) -> Option<&MediaList> {
        self.lists.get(id)
    }

    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    pub fn list_count(&self) -> usize {
        self.lists.len()
    }

    /// Mutations recorded since the last [`Self::take_journal`].
    pub fn journal(&self) -> &Journal {
        &self.journal
    }

    /// Take the recorded mutations, leaving an empty journal.
    pub fn take_journal(&mut self) -> Journal {
        std::mem::take(&mut self.journal)
    }

    /// Import a snapshot as a single unit of work.
    ///
    /// The import runs against a staged copy that replaces this store only
    /// if every pass succeeds; on error or rejection nothing changes.
    pub fn import(
        &mut self,
        owner: &str,
        input: &serde_json::Value,
        options: &ImportOptions,
        now: Timestamp,
    ) -> Result<ImportOutcome> {
        let mut staged = self.clone();
        let outcome = crate::import::import_snapshot(&mut staged, owner, input, options, now)?;
        if outcome.is_imported() {
            *self = staged;
        }
        Ok(outcome)
    }

    fn item_mut(&mut self, id: &str) -> Result<&mut MediaItem> {
        self.items
            .get_mut(id)
            .ok_or_else(|| Error::ItemNotFound(id.to_string()))
    }

    fn list_mut(&mut self, id: &str) -> Result<&mut MediaList> {
        self.lists
            .get_mut(id)
            .ok_or_else(|| Error::ListNotFound(id.to_string()))
    }
}

impl<G: IdGenerator + Clone> LibraryStore for MemoryStore<G> {
    fn owner(&self, id: &str) -> Result<Option<Owner>> {
        Ok(self.owners.get(id).cloned())
    }

    fn save_owner(&mut self, owner: &Owner) -> Result<()> {
        if self.owners.get(&owner.id) == Some(owner) {
            return Ok(());
        }
        self.owners.insert(owner.id.clone(), owner.clone());
        self.journal.push(WriteOp::SaveOwner {
            owner: owner.clone(),
        });
        Ok(())
    }

    fn items(&self, ids: &[ItemId]) -> Result<Vec<MediaItem>> {
        Ok(ids
            .iter()
            .filter_map(|id| self.items.get(id))
            .cloned()
            .collect())
    }

    fn lists(&self, ids: &[ListId]) -> Result<Vec<MediaList>> {
        Ok(ids
            .iter()
            .filter_map(|id| self.lists.get(id))
            .cloned()
            .collect())
    }

    fn create_item(&mut self, fields: ItemFields, created_at: Timestamp) -> Result<ItemId> {
        let id = self.ids.next_id(EntityKind::Item);
        let item = MediaItem::new(id.clone(), fields, created_at);
        self.items.insert(id.clone(), item.clone());
        self.journal.push(WriteOp::CreateItem { item });
        Ok(id)
    }

    fn update_item(&mut self, id: &str, fields: ItemFields) -> Result<()> {
        let item = self.item_mut(id)?;
        if item.media_type() != fields.media_type() {
            return Err(Error::MediaTypeConflict {
                kind: EntityKind::Item,
                title: item.title().to_string(),
                existing: item.media_type(),
                incoming: fields.media_type(),
            });
        }
        if item.fields == fields {
            return Ok(());
        }
        item.fields = fields;
        let item = item.clone();
        self.journal.push(WriteOp::UpdateItem { item });
        Ok(())
    }

    fn add_item_lists(&mut self, id: &str, lists: &[ListId]) -> Result<usize> {
        let item = self.item_mut(id)?;
        let added = item.add_lists(lists);
        if added > 0 {
            let item = item.clone();
            self.journal.push(WriteOp::UpdateItem { item });
        }
        Ok(added)
    }

    fn create_list(
        &mut self,
        owner: &OwnerId,
        fields: ListFields,
        items: Vec<ItemId>,
        created_at: Timestamp,
    ) -> Result<ListId> {
        let id = self.ids.next_id(EntityKind::List);
        let mut list = MediaList::new(id.clone(), owner.clone(), fields, created_at);
        list.add_items(&items);
        self.lists.insert(id.clone(), list.clone());
        self.journal.push(WriteOp::CreateList { list });
        Ok(id)
    }

    fn update_list(&mut self, id: &str, fields: ListFields, items: Vec<ItemId>) -> Result<()> {
        let list = self.list_mut(id)?;
        if list.media_type() != fields.media_type {
            return Err(Error::MediaTypeConflict {
                kind: EntityKind::List,
                title: list.title().to_string(),
                existing: list.media_type(),
                incoming: fields.media_type,
            });
        }
        let mut members = Vec::with_capacity(items.len());
        crate::model::union_into(&mut members, &items);
        if list.fields == fields && list.items == members {
            return Ok(());
        }
        list.fields = fields;
        list.items = members;
        let list = list.clone();
        self.journal.push(WriteOp::UpdateList { list });
        Ok(())
    }

    fn add_list_items(&mut self, id: &str, items: &[ItemId]) -> Result<usize> {
        let list = self.list_mut(id)?;
        let added = list.add_items(items);
        if added > 0 {
            let list = list.clone();
            self.journal.push(WriteOp::UpdateList { list });
        }
        Ok(added)
    }
}
