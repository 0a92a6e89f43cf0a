//! Request handlers for library import and export.

mod export;
mod import;

pub use export::*;
pub use import::*;
