//! Article code synthesis.
//!
//! # Responsibility
//! - Format the individual tokens of an article code.
//! - Build codes from base templates, bend archetypes and named special
//!   rules.
//!
//! # Invariants
//! - Every function in this module is pure apart from warning logs.

pub mod bend;
pub mod builder;
pub mod format;
pub mod special;
