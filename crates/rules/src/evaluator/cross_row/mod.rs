//! Whole-dataset rules, evaluated once after every row is ingested.
//!
//! Each rule walks the dataset in ingestion order. Grouping keys are built
//! from normalized cell values and thrown away when the rule finishes.

mod frequency;
mod implementer;
mod interval;
mod unique;

use chrono::NaiveDate;
use tracing::debug;
use visit_audit_core::{FieldAliases, FieldValue, RowRecord};

use crate::dataset::DatasetIndex;
use crate::parse::extract_date;
use crate::schema::{Check, Rule, UniqueScope, IMPLEMENTER};

use super::{normalize, Violation};

/// Run every cross-row rule over the complete dataset.
///
/// Violations come back grouped by rule, in rule order.
pub fn validate_cross_rows(
    dataset: &DatasetIndex,
    rules: &[Rule],
    aliases: &FieldAliases,
) -> Vec<Violation> {
    let mut violations = Vec::new();

    for rule in rules.iter().filter(|r| r.check.is_cross_row()) {
        let found = match &rule.check {
            Check::Unique(p) => match p.scope {
                UniqueScope::Day => unique::day_scoped(rule, dataset, aliases),
                UniqueScope::Global => unique::dataset_wide(rule, dataset),
            },
            Check::DateInterval(p) => interval::check(rule, p, dataset, aliases),
            Check::Frequency(p) => frequency::check(rule, p, dataset, aliases),
            Check::SameImplementer => implementer::check(rule, dataset, aliases),
            _ => Vec::new(),
        };
        debug!(
            rule_type = %rule.rule_type,
            field = %rule.field,
            violations = found.len(),
            "cross-row rule evaluated"
        );
        violations.extend(found);
    }

    violations
}

// ── Key resolution ──────────────────────────────────────────────────

/// Calendar day of the visit: the first date field in the alias chain that parses.
fn visit_day(data: &RowRecord, aliases: &FieldAliases) -> Option<NaiveDate> {
    aliases
        .date_fields
        .iter()
        .find_map(|field| extract_date(data.get(field)))
        .map(|dt| dt.date())
}

/// Raw implementer cell, following the implementer alias chain.
fn implementer_value<'a>(data: &'a RowRecord, aliases: &FieldAliases) -> Option<&'a FieldValue> {
    data.first_present(&aliases.implementer_fields)
}

/// Normalized value of a `groupBy` field. `implementer` resolves through the alias chain.
fn group_key(data: &RowRecord, group_by: &str, aliases: &FieldAliases) -> Option<String> {
    if group_by == IMPLEMENTER {
        implementer_value(data, aliases).and_then(normalize)
    } else {
        normalize(data.get(group_by))
    }
}
