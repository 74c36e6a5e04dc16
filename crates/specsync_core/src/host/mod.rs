//! Host model boundary.
//!
//! # Responsibility
//! - Abstract the document that owns elements behind `ModelHost`.
//! - Collect every per-element write of a run into one `WriteBatch`.
//!
//! # Invariants
//! - Hosts apply a batch atomically: either every update becomes visible or
//!   none does.
//! - The engine never reads back through the host while a run is in flight;
//!   it works on snapshots.

use crate::model::element::{ElementId, ElementSnapshot};
use crate::model::fields::DerivedFields;
use std::collections::HashMap;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod dimensions;
pub mod memory;

pub use memory::InMemoryModel;

pub type HostResult<T> = Result<T, HostError>;

/// Host-side failure to enumerate or commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostError {
    /// Batch references an element the host does not know.
    UnknownElement(ElementId),
    /// Host refused to list candidate elements.
    Enumerate(String),
    /// Host aborted the unit of work.
    Commit(String),
}

impl Display for HostError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownElement(id) => write!(f, "element not found in host model: {id}"),
            Self::Enumerate(message) => write!(f, "failed to enumerate elements: {message}"),
            Self::Commit(message) => write!(f, "failed to commit write batch: {message}"),
        }
    }
}

impl Error for HostError {}

/// Derived fields computed for one element.
#[derive(Debug, Clone, PartialEq)]
pub struct ElementUpdate {
    pub id: ElementId,
    pub fields: DerivedFields,
}

/// All writes of one synchronization run, in first-push order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WriteBatch {
    updates: Vec<ElementUpdate>,
    positions: HashMap<ElementId, usize>,
}

impl WriteBatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues one element's fields. A later update for the same id replaces
    /// the earlier one.
    pub fn push(&mut self, id: ElementId, fields: DerivedFields) {
        if let Some(&index) = self.positions.get(&id) {
            self.updates[index].fields = fields;
            return;
        }
        self.positions.insert(id, self.updates.len());
        self.updates.push(ElementUpdate { id, fields });
    }

    pub fn updates(&self) -> &[ElementUpdate] {
        &self.updates
    }

    pub fn len(&self) -> usize {
        self.updates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.updates.is_empty()
    }

    pub fn into_updates(self) -> Vec<ElementUpdate> {
        self.updates
    }
}

/// Document owning the elements a run synchronizes.
pub trait ModelHost {
    /// Returns snapshots of every element eligible for synchronization.
    fn candidate_elements(&self) -> HostResult<Vec<ElementSnapshot>>;
    /// Applies the batch as one unit of work.
    fn commit(&mut self, batch: WriteBatch) -> HostResult<()>;
}

#[cfg(test)]
mod tests {
    use super::WriteBatch;
    use crate::model::element::ElementId;
    use crate::model::fields::DerivedFields;

    #[test]
    fn push_replaces_duplicate_ids() {
        let mut batch = WriteBatch::new();
        batch.push(ElementId(1), DerivedFields::cleared());

        let mut fields = DerivedFields::cleared();
        fields.article = "GE-AX".to_string();
        batch.push(ElementId(1), fields.clone());
        batch.push(ElementId(2), DerivedFields::cleared());

        assert_eq!(batch.len(), 2);
        assert_eq!(batch.updates()[0].fields, fields);
    }

    #[test]
    fn replacement_keeps_first_push_order() {
        let mut batch = WriteBatch::new();
        for id in [3, 1, 2] {
            batch.push(ElementId(id), DerivedFields::cleared());
        }
        let mut fields = DerivedFields::cleared();
        fields.article = "GE-KT2".to_string();
        batch.push(ElementId(1), fields.clone());

        let ids: Vec<_> = batch.updates().iter().map(|update| update.id).collect();
        assert_eq!(ids, vec![ElementId(3), ElementId(1), ElementId(2)]);
        assert_eq!(batch.updates()[1].fields, fields);
    }
}
