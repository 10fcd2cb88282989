//! Public output types for batch command responses.
//!
//! Every unit in a batch ends in exactly one status; the summary counts are
//! kept in step with the item list by the `record_*` methods.

use serde::Serialize;

/// Final status of one unit in a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemStatus {
    Changed,
    Unchanged,
    NotFound,
    Error,
}

impl ItemStatus {
    /// Short marker for terminal status lines.
    pub fn marker(&self) -> &'static str {
        match self {
            ItemStatus::Changed => "changed",
            ItemStatus::Unchanged => "unchanged",
            ItemStatus::NotFound => "not found",
            ItemStatus::Error => "error",
        }
    }
}

/// Individual item result within a batch operation.
#[derive(Debug, Clone, Serialize)]
pub struct BatchResultItem<T: Serialize> {
    pub path: String,
    pub status: ItemStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde(flatten)]
    pub detail: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Summary of batch results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BatchSummary {
    pub total: u32,
    pub changed: u32,
    pub unchanged: u32,
    pub not_found: u32,
    pub errors: u32,
}

/// Summary plus per-item results of a batch operation.
#[derive(Debug, Clone, Serialize)]
pub struct BatchResult<T: Serialize> {
    pub summary: BatchSummary,
    pub items: Vec<BatchResultItem<T>>,
}

impl<T: Serialize> Default for BatchResult<T> {
    fn default() -> Self {
        Self {
            summary: BatchSummary::default(),
            items: Vec::new(),
        }
    }
}

impl<T: Serialize> BatchResult<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_changed(&mut self, path: String, detail: T) {
        self.summary.changed += 1;
        self.push(path, ItemStatus::Changed, Some(detail), None);
    }

    pub fn record_unchanged(&mut self, path: String, detail: T) {
        self.summary.unchanged += 1;
        self.push(path, ItemStatus::Unchanged, Some(detail), None);
    }

    pub fn record_not_found(&mut self, path: String) {
        self.summary.not_found += 1;
        self.push(path, ItemStatus::NotFound, None, None);
    }

    pub fn record_error(&mut self, path: String, error: String) {
        self.summary.errors += 1;
        self.push(path, ItemStatus::Error, None, Some(error));
    }

    fn push(&mut self, path: String, status: ItemStatus, detail: Option<T>, error: Option<String>) {
        self.summary.total += 1;
        self.items.push(BatchResultItem {
            path,
            status,
            detail,
            error,
        });
    }
}
