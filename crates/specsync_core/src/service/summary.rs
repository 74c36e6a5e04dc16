//! Per-run statistics and the summary surfaced to callers.
//!
//! `RunStatistics` is the only mutable accumulator of a run. It is threaded
//! through element processing explicitly and turned into an immutable
//! `RunSummary` once the batch is committed.

use crate::model::fields::{
    CategoryGroup, CATEGORY_CONNECTING_PARTS, CATEGORY_INSTALLATION_PRODUCTS,
    CATEGORY_LINEAR_STOCK, CATEGORY_OTHER,
};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Processed-element counters per category group.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryCounts {
    pub linear_stock: u32,
    pub connecting_parts: u32,
    pub installation_products: u32,
    pub other: u32,
}

impl CategoryCounts {
    pub fn increment(&mut self, group: CategoryGroup) {
        *self.slot(group) += 1;
    }

    pub fn get(&self, group: CategoryGroup) -> u32 {
        match group {
            CategoryGroup::LinearStock => self.linear_stock,
            CategoryGroup::ConnectingParts => self.connecting_parts,
            CategoryGroup::InstallationProducts => self.installation_products,
            CategoryGroup::Other => self.other,
        }
    }

    pub fn total(&self) -> u32 {
        self.linear_stock + self.connecting_parts + self.installation_products + self.other
    }

    fn slot(&mut self, group: CategoryGroup) -> &mut u32 {
        match group {
            CategoryGroup::LinearStock => &mut self.linear_stock,
            CategoryGroup::ConnectingParts => &mut self.connecting_parts,
            CategoryGroup::InstallationProducts => &mut self.installation_products,
            CategoryGroup::Other => &mut self.other,
        }
    }
}

/// Mutable accumulator scoped to one run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunStatistics {
    processed: u32,
    category_counts: CategoryCounts,
    skipped_unmapped: u32,
    errors: Vec<String>,
}

impl RunStatistics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_processed(&mut self, group: CategoryGroup) {
        self.processed += 1;
        self.category_counts.increment(group);
    }

    pub fn record_unmapped(&mut self) {
        self.skipped_unmapped += 1;
    }

    pub fn record_error(&mut self, message: impl Into<String>) {
        self.errors.push(message.into());
    }

    pub fn processed(&self) -> u32 {
        self.processed
    }

    pub fn error_count(&self) -> usize {
        self.errors.len()
    }

    pub fn into_summary(self, run_id: impl Into<String>) -> RunSummary {
        RunSummary {
            run_id: run_id.into(),
            processed: self.processed,
            category_counts: self.category_counts,
            skipped_unmapped: self.skipped_unmapped,
            error_count: self.errors.len() as u32,
            errors: self.errors,
        }
    }
}

/// Result of one synchronization run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    pub run_id: String,
    pub processed: u32,
    pub category_counts: CategoryCounts,
    /// Elements whose family has no mapping row; not counted as errors.
    pub skipped_unmapped: u32,
    pub error_count: u32,
    pub errors: Vec<String>,
}

impl RunSummary {
    pub fn has_errors(&self) -> bool {
        self.error_count > 0
    }
}

impl Display for RunSummary {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let counts = &self.category_counts;
        writeln!(f, "Процес завершено.")?;
        writeln!(f, "{CATEGORY_LINEAR_STOCK}: {}", counts.linear_stock)?;
        writeln!(f, "{CATEGORY_CONNECTING_PARTS}: {}", counts.connecting_parts)?;
        writeln!(
            f,
            "{CATEGORY_INSTALLATION_PRODUCTS}: {}",
            counts.installation_products
        )?;
        writeln!(f, "{CATEGORY_OTHER}: {}", counts.other)?;
        writeln!(f, "Пропущено (без мапінгу): {}", self.skipped_unmapped)?;
        writeln!(f, "Помилки: {}", self.error_count)?;
        write!(f, "Всього: {}", self.processed)?;
        for error in &self.errors {
            write!(f, "\n  - {error}")?;
        }
        Ok(())
    }
}
