//! Rule evaluation over visit rows.
//!
//! Two evaluators share the decoded [`Rule`] list:
//! - **Single-row**: [`validate_row`] checks one row in isolation, run as each
//!   row is ingested.
//! - **Cross-row**: [`validate_cross_rows`] runs once over the complete
//!   [`DatasetIndex`](crate::dataset::DatasetIndex) for uniqueness, recurrence
//!   interval, daily frequency and implementer consistency.
//!
//! A row that lacks a value a rule needs is skipped for that rule only.

mod cross_row;
mod single_row;

pub use cross_row::validate_cross_rows;
pub use single_row::validate_row;

use chrono::NaiveDate;
use serde::Serialize;
use visit_audit_core::{FieldValue, RowNumber, RowRecord};

use crate::schema::{Rule, RuleType};

// ── Violation ───────────────────────────────────────────────────────

/// One detected breach of one rule by one row.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Violation {
    pub row: RowNumber,
    pub field: String,
    pub value: FieldValue,
    pub message: String,
    pub error_type: RuleType,
    /// Rule-specific details, flattened into the serialized violation.
    #[serde(flatten)]
    pub context: Option<ViolationContext>,
}

impl Violation {
    pub(crate) fn new(rule: &Rule, row: RowNumber, data: &RowRecord) -> Self {
        Self {
            row,
            field: rule.field.clone(),
            value: data.get(&rule.field).clone(),
            message: rule.message.clone(),
            error_type: rule.rule_type,
            context: None,
        }
    }

    pub(crate) fn with_context(mut self, context: ViolationContext) -> Self {
        self.context = Some(context);
        self
    }

    pub(crate) fn with_message(mut self, message: String) -> Self {
        self.message = message;
        self
    }
}

/// Extra details attached to cross-row and content violations.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ViolationContext {
    /// Day-scoped duplicate; points at the first row with the same key that day.
    #[serde(rename_all = "camelCase")]
    DuplicateOf { duplicate_of_row: RowNumber },
    /// Dataset-wide duplicate; every occurrence carries the total count.
    #[serde(rename_all = "camelCase")]
    DuplicateValue { occurrences: usize },
    #[serde(rename_all = "camelCase")]
    Interval {
        previous_row: RowNumber,
        days_since_previous: i64,
        required_days: i64,
    },
    #[serde(rename_all = "camelCase")]
    Frequency {
        date: NaiveDate,
        count: usize,
        max_per_day: usize,
    },
    #[serde(rename_all = "camelCase")]
    Implementer {
        expected_implementer: String,
        actual_implementer: String,
    },
    #[serde(rename_all = "camelCase")]
    ProhibitedTerm { term: String },
}

// ── Shared helpers ──────────────────────────────────────────────────

/// Canonical form used for grouping and duplicate detection: trimmed,
/// inner whitespace collapsed, lowercased. `None` when nothing is left.
pub(crate) fn normalize(value: &FieldValue) -> Option<String> {
    let text = value.to_display()?;
    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.is_empty() {
        None
    } else {
        Some(collapsed.to_lowercase())
    }
}
