//! Identifier generation for persisted entities.

use shelf_engine::{EntityKind, IdGenerator};

/// Random UUID v4 identifiers.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidIds;

impl IdGenerator for UuidIds {
    fn next_id(&mut self, _kind: EntityKind) -> String {
        uuid::Uuid::new_v4().to_string()
    }
}
