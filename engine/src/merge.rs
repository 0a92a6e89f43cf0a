//! Merge executor: create-or-update every snapshot entity.
//!
//! Runs two ordered passes. Items go first so that the list pass can
//! rewrite its member references through a complete item translation
//! table. Nothing is ever deleted; existing list memberships are only ever
//! added to.

use crate::{
    error::Result, import::ImportReport, model::union_into, reconcile::Reconciliation,
    LibrarySnapshot, LibraryStore, Owner, Timestamp,
};

/// Applies a reconciled snapshot to a store on behalf of one owner.
pub struct MergeExecutor<'a, S: LibraryStore + ?Sized> {
    store: &'a mut S,
    owner: &'a mut Owner,
    now: Timestamp,
}

impl<'a, S: LibraryStore + ?Sized> MergeExecutor<'a, S> {
    pub fn new(store: &'a mut S, owner: &'a mut Owner, now: Timestamp) -> Self {
        Self { store, owner, now }
    }

    /// Run the item pass, the list pass, then persist the owner aggregate.
    pub fn run(
        mut self,
        snapshot: &LibrarySnapshot,
        reconciliation: &mut Reconciliation,
        report: &mut ImportReport,
    ) -> Result<()> {
        self.merge_items(snapshot, reconciliation, report)?;
        self.merge_lists(snapshot, reconciliation, report)?;
        self.store.save_owner(self.owner)
    }

    fn merge_items(
        &mut self,
        snapshot: &LibrarySnapshot,
        reconciliation: &mut Reconciliation,
        report: &mut ImportReport,
    ) -> Result<()> {
        for item in &snapshot.media_items {
            let id = match reconciliation.resolve_item(item)? {
                Some(id) => {
                    self.store.update_item(&id, item.fields.clone())?;
                    report.items_updated += 1;
                    id
                }
                None => {
                    let id = self.store.create_item(item.fields.clone(), self.now)?;
                    report.items_created += 1;
                    id
                }
            };

            reconciliation.record_item(item, &id, self.now);
            self.owner.own_item(&id);
        }

        tracing::debug!(
            owner = %self.owner.id,
            created = report.items_created,
            updated = report.items_updated,
            "item pass complete"
        );
        Ok(())
    }

    fn merge_lists(
        &mut self,
        snapshot: &LibrarySnapshot,
        reconciliation: &mut Reconciliation,
        report: &mut ImportReport,
    ) -> Result<()> {
        for list in &snapshot.lists {
            let members = reconciliation.items.rewrite(&list.items);

            let id = match reconciliation.resolve_list(list)? {
                Some(id) => {
                    let mut merged = self.store.list(&id)?.items;
                    union_into(&mut merged, &members);
                    self.store.update_list(&id, list.fields.clone(), merged)?;
                    report.lists_merged += 1;
                    id
                }
                None => {
                    let id = self.store.create_list(
                        &self.owner.id,
                        list.fields.clone(),
                        members,
                        self.now,
                    )?;
                    report.lists_created += 1;
                    id
                }
            };

            reconciliation.record_list(list, &id, self.now);
            self.owner.own_list(&id);
        }

        tracing::debug!(
            owner = %self.owner.id,
            created = report.lists_created,
            merged = report.lists_merged,
            "list pass complete"
        );
        Ok(())
    }
}
