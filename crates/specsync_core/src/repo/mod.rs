//! Repository layer over the parts catalog.

pub mod catalog_repo;
