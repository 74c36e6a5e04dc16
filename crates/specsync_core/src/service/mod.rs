//! Synchronization use-cases.
//!
//! # Responsibility
//! - Drive article synthesis, catalog lookup and host writes for a run.
//! - Keep host and storage details out of the rule modules.

pub mod accessory_log;
pub mod classify;
pub mod summary;
pub mod sync_service;
