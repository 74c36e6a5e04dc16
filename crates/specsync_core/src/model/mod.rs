//! Domain model for specification synchronization.
//!
//! # Responsibility
//! - Define the element snapshot consumed from the host model.
//! - Define derived specification fields, category groups and host
//!   parameter names.
//! - Define the family-to-rule mapping table.
//!
//! # Invariants
//! - Elements are identified by a stable host `ElementId`.
//! - Mapping tables are immutable values passed into each run.

pub mod element;
pub mod fields;
pub mod mapping;
