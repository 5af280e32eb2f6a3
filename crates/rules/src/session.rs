//! One file's validation run.
//!
//! An [`AuditSession`] owns the [`DatasetIndex`] for exactly one file. Rows are
//! checked by the single-row rules as they arrive and buffered; [`AuditSession::finish`]
//! consumes the session, so the cross-row pass always sees the complete dataset
//! and nothing can be ingested afterwards. Dropping a session mid-run aborts it.

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::{debug, info};
use uuid::Uuid;
use visit_audit_core::{FieldAliases, RowNumber, RowRecord};

use crate::dataset::DatasetIndex;
use crate::evaluator::{validate_cross_rows, validate_row, Violation};
use crate::schema::Rule;

pub struct AuditSession {
    run_id: Uuid,
    dataset: DatasetIndex,
    aliases: FieldAliases,
    row_violations: Vec<Violation>,
}

impl AuditSession {
    pub fn new(aliases: FieldAliases) -> Self {
        let run_id = Uuid::new_v4();
        debug!(%run_id, "audit session started");
        Self {
            run_id,
            dataset: DatasetIndex::new(),
            aliases,
            row_violations: Vec::new(),
        }
    }

    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    /// Buffer a row for the cross-row pass without checking it.
    pub fn add_row_data(&mut self, row: RowNumber, data: RowRecord) {
        self.dataset.add_row_data(row, data);
    }

    /// Single-row check without buffering.
    pub fn validate_row(&self, row: RowNumber, data: &RowRecord, rules: &[Rule]) -> Vec<Violation> {
        validate_row(row, data, rules)
    }

    /// Cross-row pass over whatever has been buffered so far.
    ///
    /// Prefer [`AuditSession::finish`], which guarantees ingestion is over.
    pub fn validate_cross_rows(&self, rules: &[Rule]) -> Vec<Violation> {
        validate_cross_rows(&self.dataset, rules, &self.aliases)
    }

    /// Check a row against the single-row rules and buffer it.
    ///
    /// Returns the violations found for this row; they are also kept for the report.
    pub fn ingest(&mut self, row: RowNumber, data: RowRecord, rules: &[Rule]) -> &[Violation] {
        let start = self.row_violations.len();
        self.row_violations.extend(validate_row(row, &data, rules));
        self.dataset.add_row_data(row, data);
        &self.row_violations[start..]
    }

    pub fn row_count(&self) -> usize {
        self.dataset.len()
    }

    /// End ingestion, run the cross-row pass and build the report.
    pub fn finish(self, rules: &[Rule]) -> AuditReport {
        let cross_row_violations = self.validate_cross_rows(rules);
        let report = AuditReport::new(
            self.run_id,
            self.dataset.len(),
            self.row_violations,
            cross_row_violations,
        );
        info!(
            run_id = %report.run_id,
            rows = report.row_count,
            row_violations = report.row_violations.len(),
            cross_row_violations = report.cross_row_violations.len(),
            "audit session finished"
        );
        report
    }
}

/// Everything one run found.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditReport {
    pub run_id: Uuid,
    pub row_count: usize,
    pub row_violations: Vec<Violation>,
    pub cross_row_violations: Vec<Violation>,
    /// Violation count per rule type across both passes.
    pub counts_by_type: BTreeMap<String, usize>,
}

impl AuditReport {
    fn new(
        run_id: Uuid,
        row_count: usize,
        row_violations: Vec<Violation>,
        cross_row_violations: Vec<Violation>,
    ) -> Self {
        let mut counts_by_type = BTreeMap::new();
        for v in row_violations.iter().chain(&cross_row_violations) {
            *counts_by_type.entry(v.error_type.to_string()).or_insert(0) += 1;
        }
        Self {
            run_id,
            row_count,
            row_violations,
            cross_row_violations,
            counts_by_type,
        }
    }

    pub fn total(&self) -> usize {
        self.row_violations.len() + self.cross_row_violations.len()
    }

    /// Both passes, row violations first.
    pub fn violations(&self) -> impl Iterator<Item = &Violation> {
        self.row_violations.iter().chain(&self.cross_row_violations)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{RawRule, RuleType};

    fn rule(field: &str, rule_type: &str, params: Option<&str>) -> Rule {
        Rule::decode(&RawRule {
            field: field.to_string(),
            rule_type: rule_type.to_string(),
            params: params.map(|p| serde_yaml::from_str(p).unwrap()),
            message: String::new(),
        })
        .unwrap()
    }

    #[test]
    fn ingest_returns_row_violations() {
        let rules = vec![rule("pharmacy", "required", None)];
        let mut session = AuditSession::new(FieldAliases::default());
        assert!(session.ingest(2, RowRecord::new().with("pharmacy", "A"), &rules).is_empty());
        let v = session.ingest(3, RowRecord::new(), &rules);
        assert_eq!(v.len(), 1);
        assert_eq!(v[0].row, 3);
        assert_eq!(session.row_count(), 2);
    }

    #[test]
    fn finish_combines_both_passes() {
        let rules = vec![
            rule("pharmacy", "required", None),
            rule("pharmacy", "unique", Some("{scope: day}")),
        ];
        let mut session = AuditSession::new(FieldAliases::default());
        session.ingest(2, RowRecord::new().with("pharmacy", "A").with("visitStartTime", "2025-01-01"), &rules);
        session.ingest(3, RowRecord::new().with("pharmacy", "A").with("visitStartTime", "2025-01-01"), &rules);
        session.ingest(4, RowRecord::new().with("visitStartTime", "2025-01-01"), &rules);

        let report = session.finish(&rules);
        assert_eq!(report.row_count, 3);
        assert_eq!(report.total(), 2);
        assert_eq!(report.counts_by_type.get("required"), Some(&1));
        assert_eq!(report.counts_by_type.get("unique"), Some(&1));
        let kinds: Vec<RuleType> = report.violations().map(|v| v.error_type).collect();
        assert_eq!(kinds, vec![RuleType::Required, RuleType::Unique]);
    }

    #[test]
    fn sessions_do_not_share_rows() {
        let rules = vec![rule("code", "unique", None)];
        let mut a = AuditSession::new(FieldAliases::default());
        let mut b = AuditSession::new(FieldAliases::default());
        a.add_row_data(2, RowRecord::new().with("code", "X"));
        b.add_row_data(2, RowRecord::new().with("code", "X"));
        assert!(a.validate_cross_rows(&rules).is_empty());
        assert!(b.validate_cross_rows(&rules).is_empty());
        assert_ne!(a.run_id(), b.run_id());
    }

    #[test]
    fn report_serializes_camel_case() {
        let session = AuditSession::new(FieldAliases::default());
        let report = session.finish(&[]);
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["rowCount"], 0);
        assert!(json["crossRowViolations"].as_array().unwrap().is_empty());
    }
}
