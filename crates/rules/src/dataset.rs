//! Per-run keyed store of every ingested row.
//!
//! One [`DatasetIndex`] belongs to exactly one file's validation run. Rows are
//! kept in ingestion order; re-inserting a row number overwrites its record in
//! place without moving it.

use indexmap::IndexMap;
use visit_audit_core::{RowNumber, RowRecord};

/// Backing store for the cross-row pass.
#[derive(Debug, Clone, Default)]
pub struct DatasetIndex {
    rows: IndexMap<RowNumber, RowRecord>,
}

impl DatasetIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite the record for `row`.
    pub fn add_row_data(&mut self, row: RowNumber, data: RowRecord) {
        self.rows.insert(row, data);
    }

    pub fn get(&self, row: RowNumber) -> Option<&RowRecord> {
        self.rows.get(&row)
    }

    /// Rows in ingestion order.
    pub fn iter(&self) -> impl Iterator<Item = (RowNumber, &RowRecord)> {
        self.rows.iter().map(|(row, data)| (*row, data))
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
