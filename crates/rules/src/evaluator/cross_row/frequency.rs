//! `frequency` rules: daily visit cap per implementer.
//!
//! Counting follows ingestion order. A row only ever fires on the count as it
//! stood when that row was reached; later rows never revisit earlier ones.

use std::collections::{HashMap, HashSet};

use chrono::NaiveDate;
use visit_audit_core::FieldAliases;

use crate::dataset::DatasetIndex;
use crate::evaluator::{normalize, Violation, ViolationContext};
use crate::schema::{FrequencyParams, Rule};

use super::{group_key, visit_day};

pub(super) fn check(
    rule: &Rule,
    params: &FrequencyParams,
    dataset: &DatasetIndex,
    aliases: &FieldAliases,
) -> Vec<Violation> {
    match &params.count_by {
        Some(count_by) => count_distinct(rule, params, count_by, dataset, aliases),
        None => count_rows(rule, params, dataset, aliases),
    }
}

/// Fires on the row whose new distinct `countBy` value pushes the day over the cap.
/// Repeats of a value already counted never fire.
fn count_distinct(
    rule: &Rule,
    params: &FrequencyParams,
    count_by: &str,
    dataset: &DatasetIndex,
    aliases: &FieldAliases,
) -> Vec<Violation> {
    let mut seen: HashMap<(String, NaiveDate), HashSet<String>> = HashMap::new();
    let mut violations = Vec::new();

    for (row, data) in dataset.iter() {
        let Some(actor) = group_key(data, &params.group_by, aliases) else {
            continue;
        };
        let Some(day) = visit_day(data, aliases) else {
            continue;
        };
        let Some(target) = normalize(data.get(count_by)) else {
            continue;
        };

        let targets = seen.entry((actor, day)).or_default();
        if targets.insert(target) && targets.len() > params.max_per_day {
            violations.push(Violation::new(rule, row, data).with_context(
                ViolationContext::Frequency {
                    date: day,
                    count: targets.len(),
                    max_per_day: params.max_per_day,
                },
            ));
        }
    }

    violations
}

/// Fires on every row past the cap.
fn count_rows(
    rule: &Rule,
    params: &FrequencyParams,
    dataset: &DatasetIndex,
    aliases: &FieldAliases,
) -> Vec<Violation> {
    let mut counts: HashMap<(String, NaiveDate), usize> = HashMap::new();
    let mut violations = Vec::new();

    for (row, data) in dataset.iter() {
        let Some(actor) = group_key(data, &params.group_by, aliases) else {
            continue;
        };
        let Some(day) = visit_day(data, aliases) else {
            continue;
        };

        let count = counts.entry((actor, day)).or_default();
        *count += 1;
        if *count > params.max_per_day {
            violations.push(Violation::new(rule, row, data).with_context(
                ViolationContext::Frequency {
                    date: day,
                    count: *count,
                    max_per_day: params.max_per_day,
                },
            ));
        }
    }

    violations
}
