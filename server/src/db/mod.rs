//! Database module for PostgreSQL persistence.

mod library;
mod pool;

pub use library::*;
pub use pool::*;
