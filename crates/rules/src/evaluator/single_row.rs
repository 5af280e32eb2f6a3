//! Single-row predicates: each rule is judged against one row in isolation.

use chrono::Timelike;
use visit_audit_core::{FieldValue, RowNumber, RowRecord};

use crate::parse::{extract_date, parse_duration, parse_simple_date};
use crate::schema::{
    Check, DateFormatParams, DurationParams, MedicalLevelParams, MinValueParams,
    ProhibitedContentParams, Rule, TimeRangeParams,
};

use super::{Violation, ViolationContext};

/// Apply every single-row rule to `data`.
///
/// Cross-row and unsupported rules are ignored here.
pub fn validate_row(row: RowNumber, data: &RowRecord, rules: &[Rule]) -> Vec<Violation> {
    rules
        .iter()
        .filter(|rule| rule.check.is_single_row())
        .filter_map(|rule| check_rule(rule, row, data))
        .collect()
}

fn check_rule(rule: &Rule, row: RowNumber, data: &RowRecord) -> Option<Violation> {
    let value = data.get(&rule.field);

    let passed = match &rule.check {
        Check::Required => !value.is_blank(),
        Check::DateFormat(p) => date_format_ok(value, p)?,
        Check::Duration(p) => duration_ok(value, p)?,
        Check::TimeRange(p) => time_range_ok(value, p)?,
        Check::MedicalLevel(p) => medical_level_ok(value, p)?,
        Check::MinValue(p) => min_value_ok(value, p),
        Check::ProhibitedContent(p) => {
            let term = first_prohibited_term(value, p)?;
            return Some(
                Violation::new(rule, row, data)
                    .with_message(embed_term(&rule.message, term))
                    .with_context(ViolationContext::ProhibitedTerm {
                        term: term.to_string(),
                    }),
            );
        }
        Check::Unique(_)
        | Check::Frequency(_)
        | Check::DateInterval(_)
        | Check::SameImplementer
        | Check::Unsupported => return None,
    };

    (!passed).then(|| Violation::new(rule, row, data))
}

// ── Predicates ──────────────────────────────────────────────────────
//
// `None` means "not evaluated" (the cell is empty); `Some(ok)` is the verdict.

fn date_format_ok(value: &FieldValue, p: &DateFormatParams) -> Option<bool> {
    if value.is_blank() {
        return None;
    }
    if !p.allow_time_component {
        if let Some(s) = value.as_str() {
            if s.contains(':') || s.contains('T') {
                return Some(false);
            }
        }
    }
    Some(parse_simple_date(value).is_some())
}

fn duration_ok(value: &FieldValue, p: &DurationParams) -> Option<bool> {
    if value.is_blank() {
        return None;
    }
    Some(parse_duration(value).is_some_and(|minutes| minutes >= p.min_minutes))
}

fn time_range_ok(value: &FieldValue, p: &TimeRangeParams) -> Option<bool> {
    let hour = extract_date(value)?.hour();
    Some(p.start_hour <= hour && hour <= p.end_hour)
}

fn medical_level_ok(value: &FieldValue, p: &MedicalLevelParams) -> Option<bool> {
    if value.is_blank() {
        return None;
    }
    let text = value.to_display()?;
    Some(p.allowed_levels.iter().any(|level| text.contains(level.as_str())))
}

/// Blank or falsy cells (whitespace-only text, `0`) pass; anything that is not a number fails.
fn min_value_ok(value: &FieldValue, p: &MinValueParams) -> bool {
    if value.is_blank() {
        return true;
    }
    let number = match value {
        FieldValue::Number(n) if *n == 0.0 || n.is_nan() => return true,
        FieldValue::Number(n) => *n,
        FieldValue::Text(s) => match s.trim().parse::<f64>() {
            Ok(n) => n,
            Err(_) => return false,
        },
        FieldValue::Date(_) => return false,
        FieldValue::Missing => return true,
    };
    number >= p.min
}

fn first_prohibited_term<'a>(value: &FieldValue, p: &'a ProhibitedContentParams) -> Option<&'a str> {
    let text = value.to_display()?;
    p.prohibited_terms
        .iter()
        .map(|t| t.as_str())
        .find(|term| !term.is_empty() && text.contains(term))
}

/// Substitute `{term}` when the message has the placeholder, otherwise append the term.
fn embed_term(message: &str, term: &str) -> String {
    if message.contains("{term}") {
        message.replace("{term}", term)
    } else {
        format!("{message}: {term}")
    }
}

// ── Tests ───────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{RawRule, RuleType};

    fn rule(field: &str, rule_type: &str, params: Option<&str>) -> Rule {
        Rule::decode(&RawRule {
            field: field.to_string(),
            rule_type: rule_type.to_string(),
            params: params.map(|p| serde_yaml::from_str(p).unwrap()),
            message: format!("{rule_type} failed"),
        })
        .unwrap()
    }

    fn check(rule: &Rule, value: impl Into<FieldValue>) -> Vec<Violation> {
        let data = RowRecord::new().with(rule.field.clone(), value);
        validate_row(2, &data, std::slice::from_ref(rule))
    }

    // ── required ────────────────────────────────────────────────────

    #[test]
    fn required_flags_empty_values() {
        let r = rule("pharmacy", "required", None);
        assert_eq!(check(&r, "").len(), 1);
        assert_eq!(check(&r, "   ").len(), 1);
        assert_eq!(check(&r, FieldValue::Missing).len(), 1);
        assert_eq!(validate_row(2, &RowRecord::new(), &[r.clone()]).len(), 1);
    }

    #[test]
    fn required_accepts_zero() {
        let r = rule("visits", "required", None);
        assert!(check(&r, "0").is_empty());
        assert!(check(&r, 0.0).is_empty());
    }

    #[test]
    fn violation_carries_row_field_and_type() {
        let r = rule("pharmacy", "required", None);
        let v = &check(&r, "")[0];
        assert_eq!(v.row, 2);
        assert_eq!(v.field, "pharmacy");
        assert_eq!(v.error_type, RuleType::Required);
        assert_eq!(v.message, "required failed");
    }

    // ── dateFormat ──────────────────────────────────────────────────

    #[test]
    fn date_format_rejects_time_when_disallowed() {
        let r = rule("visitDate", "dateFormat", Some("{allowTimeComponent: false}"));
        assert!(check(&r, "2025-08-01").is_empty());
        assert_eq!(check(&r, "2025-08-01T10:00").len(), 1);
        assert_eq!(check(&r, "2025-08-01 10:00").len(), 1);
    }

    #[test]
    fn date_format_allows_time_by_default() {
        let r = rule("visitDate", "dateFormat", None);
        assert!(check(&r, "2025-08-01T10:00").is_empty());
        assert!(check(&r, "45658").is_empty());
        assert_eq!(check(&r, "next tuesday").len(), 1);
        assert!(check(&r, "").is_empty());
    }

    // ── duration ────────────────────────────────────────────────────

    #[test]
    fn duration_compares_minutes() {
        let r = rule("visitDuration", "duration", Some("{minMinutes: 90}"));
        assert!(check(&r, "90").is_empty());
        assert!(check(&r, "1.5小时").is_empty());
        assert!(check(&r, "1小时30分钟").is_empty());
        assert!(check(&r, "90min").is_empty());
        assert_eq!(check(&r, "89").len(), 1);
    }

    #[test]
    fn duration_unparseable_is_a_violation() {
        let r = rule("visitDuration", "duration", Some("{minMinutes: 10}"));
        assert_eq!(check(&r, "abc").len(), 1);
        assert!(check(&r, FieldValue::Missing).is_empty());
    }

    // ── timeRange ───────────────────────────────────────────────────

    #[test]
    fn time_range_is_inclusive() {
        let r = rule("visitStartTime", "timeRange", Some("{startHour: 8, endHour: 18}"));
        assert!(check(&r, "2025-08-01 08:00:00").is_empty());
        assert!(check(&r, "2025-08-01 18:59:00").is_empty());
        assert_eq!(check(&r, "2025-08-01 07:59:00").len(), 1);
        assert_eq!(check(&r, "2025-08-01 19:00:00").len(), 1);
    }

    #[test]
    fn time_range_skips_unparseable() {
        let r = rule("visitStartTime", "timeRange", Some("{startHour: 8, endHour: 18}"));
        assert!(check(&r, "morning").is_empty());
        assert!(check(&r, FieldValue::Missing).is_empty());
    }

    // ── prohibitedContent ───────────────────────────────────────────

    #[test]
    fn prohibited_content_reports_first_term_only() {
        let r = rule(
            "feedback",
            "prohibitedContent",
            Some("{prohibitedTerms: [回扣, 返利, kickback]}"),
        );
        let v = check(&r, "提到返利和回扣");
        assert_eq!(v.len(), 1);
        assert_eq!(v[0].message, "prohibitedContent failed: 回扣");
        assert_eq!(
            v[0].context,
            Some(ViolationContext::ProhibitedTerm {
                term: "回扣".to_string()
            })
        );
    }

    #[test]
    fn prohibited_content_is_case_sensitive() {
        let r = rule("feedback", "prohibitedContent", Some("{prohibitedTerms: [kickback]}"));
        assert!(check(&r, "KICKBACK offered").is_empty());
        assert_eq!(check(&r, "a kickback offered").len(), 1);
    }

    #[test]
    fn prohibited_content_placeholder() {
        let mut r = rule("feedback", "prohibitedContent", Some("{prohibitedTerms: [gift]}"));
        r.message = "contains banned word '{term}'".to_string();
        assert_eq!(check(&r, "a gift")[0].message, "contains banned word 'gift'");
    }

    // ── medicalLevel ────────────────────────────────────────────────

    #[test]
    fn medical_level_substring_match() {
        let r = rule("hospitalLevel", "medicalLevel", Some("{allowedLevels: [三级, 二级]}"));
        assert!(check(&r, "三级甲等").is_empty());
        assert_eq!(check(&r, "一级").len(), 1);
        assert!(check(&r, "").is_empty());
    }

    // ── minValue ────────────────────────────────────────────────────

    #[test]
    fn min_value_coerces_numbers() {
        let r = rule("attendees", "minValue", Some("{min: 5}"));
        assert!(check(&r, 5.0).is_empty());
        assert!(check(&r, " 7 ").is_empty());
        assert_eq!(check(&r, "3").len(), 1);
        assert_eq!(check(&r, "many").len(), 1);
    }

    #[test]
    fn min_value_skips_falsy() {
        let r = rule("attendees", "minValue", Some("{min: 5}"));
        assert!(check(&r, FieldValue::Missing).is_empty());
        assert!(check(&r, "").is_empty());
        assert!(check(&r, "   ").is_empty());
        assert!(check(&r, 0.0).is_empty());
        // "0" is a non-empty string, so it is coerced and compared.
        assert_eq!(check(&r, "0").len(), 1);
    }

    // ── dispatch ────────────────────────────────────────────────────

    #[test]
    fn cross_row_rules_are_ignored() {
        let rules = vec![
            rule("pharmacy", "unique", Some("{scope: day}")),
            rule("pharmacy", "sameImplementer", None),
            rule("pharmacy", "crossTaskValidation", None),
        ];
        let data = RowRecord::new().with("pharmacy", "");
        assert!(validate_row(2, &data, &rules).is_empty());
    }
}
