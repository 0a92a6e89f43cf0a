//! Write journal: every mutation an import makes, in order.
//!
//! An import runs against a staged [`MemoryStore`](crate::MemoryStore); the
//! journal it leaves behind is what a persistent backend replays, inside
//! one transaction, to commit the import.

use crate::{MediaItem, MediaList, Owner};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A single recorded mutation. Each carries the entity's full state after
/// the mutation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "camelCase")]
pub enum WriteOp {
    CreateItem { item: MediaItem },
    UpdateItem { item: MediaItem },
    CreateList { list: MediaList },
    UpdateList { list: MediaList },
    SaveOwner { owner: Owner },
}

impl WriteOp {
    /// Whether this op creates a new entity.
    pub fn is_create(&self) -> bool {
        matches!(self, WriteOp::CreateItem { .. } | WriteOp::CreateList { .. })
    }

    fn key(&self) -> (u8, &str) {
        match self {
            WriteOp::CreateItem { item } | WriteOp::UpdateItem { item } => (0, item.id.as_str()),
            WriteOp::CreateList { list } | WriteOp::UpdateList { list } => (1, list.id.as_str()),
            WriteOp::SaveOwner { owner } => (2, owner.id.as_str()),
        }
    }

    /// Replace the carried state with a later op's state for the same entity.
    fn absorb(&mut self, later: WriteOp) {
        match (self, later) {
            (
                WriteOp::CreateItem { item } | WriteOp::UpdateItem { item },
                WriteOp::CreateItem { item: newer } | WriteOp::UpdateItem { item: newer },
            ) => *item = newer,
            (
                WriteOp::CreateList { list } | WriteOp::UpdateList { list },
                WriteOp::CreateList { list: newer } | WriteOp::UpdateList { list: newer },
            ) => *list = newer,
            (WriteOp::SaveOwner { owner }, WriteOp::SaveOwner { owner: newer }) => *owner = newer,
            _ => {}
        }
    }
}

/// Ordered log of mutations.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Journal {
    ops: Vec<WriteOp>,
}

impl Journal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, op: WriteOp) {
        self.ops.push(op);
    }

    pub fn ops(&self) -> &[WriteOp] {
        &self.ops
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// Count of create ops.
    pub fn create_count(&self) -> usize {
        self.ops.iter().filter(|op| op.is_create()).count()
    }

    /// Collapse the log to one op per entity, in first-touched order.
    ///
    /// An entity created in this journal stays a create carrying its final
    /// state; anything else becomes a single update with its final state.
    pub fn compact(&self) -> Vec<WriteOp> {
        let mut positions: HashMap<(u8, &str), usize> = HashMap::new();
        let mut compacted: Vec<WriteOp> = Vec::new();

        for op in &self.ops {
            match positions.get(&op.key()) {
                Some(&index) => compacted[index].absorb(op.clone()),
                None => {
                    positions.insert(op.key(), compacted.len());
                    compacted.push(op.clone());
                }
            }
        }

        compacted
    }
}

impl IntoIterator for Journal {
    type Item = WriteOp;
    type IntoIter = std::vec::IntoIter<WriteOp>;

    fn into_iter(self) -> Self::IntoIter {
        self.ops.into_iter()
    }
}
