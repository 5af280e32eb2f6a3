//! `unique` rules.
//!
//! The two scopes report duplicates differently and must stay that way:
//! day scope flags the 2nd and later occurrences against the first, while
//! dataset scope flags every occurrence, the first included.

use std::collections::hash_map::Entry;
use std::collections::HashMap;

use chrono::NaiveDate;
use visit_audit_core::{FieldAliases, RowNumber};

use crate::dataset::DatasetIndex;
use crate::evaluator::{normalize, Violation, ViolationContext};
use crate::schema::Rule;

use super::visit_day;

/// Same calendar day plus same `value|address` key collide.
pub(super) fn day_scoped(rule: &Rule, dataset: &DatasetIndex, aliases: &FieldAliases) -> Vec<Violation> {
    let mut first_seen: HashMap<(NaiveDate, String), RowNumber> = HashMap::new();
    let mut violations = Vec::new();

    for (row, data) in dataset.iter() {
        let Some(day) = visit_day(data, aliases) else {
            continue;
        };
        let Some(value) = normalize(data.get(&rule.field)) else {
            continue;
        };
        let address = data
            .first_present(&aliases.address_fields)
            .and_then(normalize)
            .unwrap_or_default();

        match first_seen.entry((day, format!("{value}|{address}"))) {
            Entry::Occupied(first) => violations.push(
                Violation::new(rule, row, data).with_context(ViolationContext::DuplicateOf {
                    duplicate_of_row: *first.get(),
                }),
            ),
            Entry::Vacant(slot) => {
                slot.insert(row);
            }
        }
    }

    violations
}

/// Any value seen more than once anywhere flags every row that holds it.
pub(super) fn dataset_wide(rule: &Rule, dataset: &DatasetIndex) -> Vec<Violation> {
    let mut counts: HashMap<String, usize> = HashMap::new();
    for (_, data) in dataset.iter() {
        if let Some(value) = normalize(data.get(&rule.field)) {
            *counts.entry(value).or_default() += 1;
        }
    }

    dataset
        .iter()
        .filter_map(|(row, data)| {
            let value = normalize(data.get(&rule.field))?;
            let occurrences = counts.get(&value).copied().unwrap_or(0);
            (occurrences > 1).then(|| {
                Violation::new(rule, row, data)
                    .with_context(ViolationContext::DuplicateValue { occurrences })
            })
        })
        .collect()
}
