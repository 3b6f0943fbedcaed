//! Repository layer: entity-scoped operations on the record store.

mod entities;
mod prescription;

pub use entities::*;
pub use prescription::*;
