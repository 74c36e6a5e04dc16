//! In-memory host model.
//!
//! Backs the CLI (JSON model files) and tests. Commits validate every id
//! before touching any element, so a rejected batch leaves the model as it
//! was.

use super::{HostError, HostResult, ModelHost, WriteBatch};
use crate::model::element::{ElementId, ElementSnapshot, ParamValue};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Element list owned in memory.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InMemoryModel {
    #[serde(default)]
    pub elements: Vec<ElementSnapshot>,
    #[serde(skip)]
    commit_failure: Option<String>,
}

impl InMemoryModel {
    pub fn new(elements: Vec<ElementSnapshot>) -> Self {
        Self {
            elements,
            commit_failure: None,
        }
    }

    /// Makes every later commit fail with `message`, as a host aborting the
    /// transaction would.
    pub fn with_commit_failure(mut self, message: impl Into<String>) -> Self {
        self.commit_failure = Some(message.into());
        self
    }

    pub fn element(&self, id: ElementId) -> Option<&ElementSnapshot> {
        self.elements.iter().find(|element| element.id == id)
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Element index by id; the first element wins on duplicate ids.
    fn positions(&self) -> HashMap<ElementId, usize> {
        let mut positions = HashMap::with_capacity(self.elements.len());
        for (index, element) in self.elements.iter().enumerate() {
            positions.entry(element.id).or_insert(index);
        }
        positions
    }
}

impl ModelHost for InMemoryModel {
    fn candidate_elements(&self) -> HostResult<Vec<ElementSnapshot>> {
        Ok(self.elements.clone())
    }

    fn commit(&mut self, batch: WriteBatch) -> HostResult<()> {
        if let Some(message) = &self.commit_failure {
            warn!(
                "event=host_commit module=host status=error updates={} error={}",
                batch.len(),
                message
            );
            return Err(HostError::Commit(message.clone()));
        }

        let positions = self.positions();
        let mut targets = Vec::with_capacity(batch.len());
        for update in batch.updates() {
            let index = positions
                .get(&update.id)
                .copied()
                .ok_or(HostError::UnknownElement(update.id))?;
            targets.push(index);
        }

        let count = batch.len();
        for (index, update) in targets.into_iter().zip(batch.into_updates()) {
            let element = &mut self.elements[index];
            for (name, value) in update.fields.text_params() {
                element
                    .params
                    .insert(name.to_string(), ParamValue::Text(value.to_string()));
            }
            if let Some(mass) = update.fields.mass {
                element
                    .params
                    .insert(mass.param.to_string(), ParamValue::number(mass.kg));
            }
        }

        info!("event=host_commit module=host status=ok updates={count}");
        Ok(())
    }
}
