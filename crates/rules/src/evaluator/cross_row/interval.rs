//! `dateInterval` and `sixMonthsInterval` rules: minimum gap between
//! consecutive visits by the same implementer to the same target.

use chrono::NaiveDateTime;
use indexmap::IndexMap;
use visit_audit_core::{FieldAliases, RowNumber, RowRecord};

use crate::dataset::DatasetIndex;
use crate::evaluator::{normalize, Violation, ViolationContext};
use crate::parse::extract_date;
use crate::schema::{DateIntervalParams, Rule};

use super::{group_key, implementer_value};

struct Visit<'a> {
    row: RowNumber,
    at: NaiveDateTime,
    data: &'a RowRecord,
}

/// Each visit is compared only with its immediate chronological predecessor.
pub(super) fn check(
    rule: &Rule,
    params: &DateIntervalParams,
    dataset: &DatasetIndex,
    aliases: &FieldAliases,
) -> Vec<Violation> {
    let mut groups: IndexMap<String, Vec<Visit<'_>>> = IndexMap::new();

    for (row, data) in dataset.iter() {
        let Some(actor) = implementer_value(data, aliases).and_then(normalize) else {
            continue;
        };
        let Some(target) = group_key(data, &params.group_by, aliases) else {
            continue;
        };
        let Some(at) = extract_date(data.get(&rule.field)) else {
            continue;
        };
        groups
            .entry(format!("{actor}|{target}"))
            .or_default()
            .push(Visit { row, at, data });
    }

    let mut violations = Vec::new();
    for visits in groups.values_mut() {
        // Stable: same-instant visits keep ingestion order.
        visits.sort_by_key(|v| v.at);

        for pair in visits.windows(2) {
            let (earlier, later) = (&pair[0], &pair[1]);
            let days = (later.at - earlier.at).num_days();
            if days < params.days {
                violations.push(
                    Violation::new(rule, later.row, later.data).with_context(
                        ViolationContext::Interval {
                            previous_row: earlier.row,
                            days_since_previous: days,
                            required_days: params.days,
                        },
                    ),
                );
            }
        }
    }

    violations
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{dataset, rows_of, rule};
    use super::super::validate_cross_rows;
    use super::*;

    fn visit(rep: &str, hospital: &str, at: &str) -> RowRecord {
        RowRecord::new()
            .with("implementer", rep)
            .with("hospitalName", hospital)
            .with("visitStartTime", at)
    }

    fn interval_rule() -> Rule {
        rule(
            "visitStartTime",
            "dateInterval",
            Some("{days: 7, groupBy: hospitalName}"),
        )
    }

    #[test]
    fn compares_adjacent_visits_only() {
        let data = dataset(vec![
            (2, visit("Li", "H1", "2025-03-01")),
            (3, visit("Li", "H1", "2025-03-06")),
            (4, visit("Li", "H1", "2025-03-12")),
        ]);
        let v = validate_cross_rows(&data, &[interval_rule()], &FieldAliases::default());
        assert_eq!(rows_of(&v), vec![3, 4]);
        assert_eq!(
            v[0].context,
            Some(ViolationContext::Interval {
                previous_row: 2,
                days_since_previous: 5,
                required_days: 7
            })
        );
        assert_eq!(
            v[1].context,
            Some(ViolationContext::Interval {
                previous_row: 3,
                days_since_previous: 6,
                required_days: 7
            })
        );
    }

    #[test]
    fn sorts_by_date_not_sheet_order() {
        let data = dataset(vec![
            (2, visit("Li", "H1", "2025-03-05")),
            (3, visit("Li", "H1", "2025-03-01")),
        ]);
        let v = validate_cross_rows(&data, &[interval_rule()], &FieldAliases::default());
        assert_eq!(rows_of(&v), vec![2]);
        assert_eq!(
            v[0].context,
            Some(ViolationContext::Interval {
                previous_row: 3,
                days_since_previous: 4,
                required_days: 7
            })
        );
    }

    #[test]
    fn out_of_order_gap_at_threshold_passes() {
        let data = dataset(vec![
            (2, visit("Li", "H1", "2025-03-12")),
            (3, visit("Li", "H1", "2025-03-01")),
            (4, visit("Li", "H1", "2025-03-19")),
        ]);
        // Sorted: 03-01, 03-12 (11 days), 03-19 (7 days).
        let v = validate_cross_rows(&data, &[interval_rule()], &FieldAliases::default());
        assert!(v.is_empty());
    }

    #[test]
    fn gap_is_floored_whole_days() {
        let data = dataset(vec![
            (2, visit("Li", "H1", "2025-03-01 09:00:00")),
            (3, visit("Li", "H1", "2025-03-08 08:00:00")),
        ]);
        let v = validate_cross_rows(&data, &[interval_rule()], &FieldAliases::default());
        // 6 days 23 hours floors to 6.
        assert_eq!(rows_of(&v), vec![3]);
    }

    #[test]
    fn groups_by_implementer_and_target() {
        let data = dataset(vec![
            (2, visit("Li", "H1", "2025-03-01")),
            (3, visit("Wang", "H1", "2025-03-02")),
            (4, visit("Li", "H2", "2025-03-02")),
        ]);
        let v = validate_cross_rows(&data, &[interval_rule()], &FieldAliases::default());
        assert!(v.is_empty());
    }

    #[test]
    fn rows_missing_keys_are_skipped() {
        let data = dataset(vec![
            (2, visit("Li", "H1", "2025-03-01")),
            (3, visit("Li", "H1", "unknown")),
            (4, visit("", "H1", "2025-03-02")),
            (5, RowRecord::new().with("implementer", "Li").with("visitStartTime", "2025-03-02")),
        ]);
        let v = validate_cross_rows(&data, &[interval_rule()], &FieldAliases::default());
        assert!(v.is_empty());
    }

    #[test]
    fn six_months_interval_uses_fixed_threshold() {
        let r = rule(
            "visitStartTime",
            "sixMonthsInterval",
            Some("{groupBy: hospitalName}"),
        );
        let data = dataset(vec![
            (2, visit("Li", "H1", "2025-01-01")),
            (3, visit("Li", "H1", "2025-06-01")),
            (4, visit("Li", "H1", "2026-01-01")),
        ]);
        let v = validate_cross_rows(&data, &[r], &FieldAliases::default());
        assert_eq!(rows_of(&v), vec![3]);
        assert_eq!(v[0].error_type, crate::schema::RuleType::SixMonthsInterval);
    }
}
