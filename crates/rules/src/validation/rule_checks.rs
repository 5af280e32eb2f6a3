//! Per-rule checks: type names, param decoding, and param sanity.

use crate::error::RuleError;
use crate::schema::{Check, RawRule, Rule, RuleType};

use super::fuzzy::{fuzzy_match, is_snake_case};
use super::ValidationResult;

pub(super) fn validate_task_type(task_type: &str, result: &mut ValidationResult) {
    if !is_snake_case(task_type) {
        result.error(
            "taskType",
            format!(
                "taskType must be snake_case (lowercase alphanumeric + underscores), got '{}'",
                task_type
            ),
        );
    }
}

pub(super) fn validate_rule(index: usize, raw: &RawRule, result: &mut ValidationResult) {
    let path = format!("rules[{index}]");

    if raw.field.trim().is_empty() {
        result.error(format!("{path}.field"), "field must not be empty");
    }
    if raw.message.trim().is_empty() {
        result.warn(
            format!("{path}.message"),
            "message is empty; violations will carry no explanation",
        );
    }

    let rule = match Rule::decode(raw) {
        Ok(rule) => rule,
        Err(RuleError::UnknownType { rule_type, .. }) => {
            let message = format!("unknown rule type '{}'", rule_type);
            match fuzzy_match(&rule_type, &RuleType::names()) {
                Some(s) => result.error_with_suggestion(
                    format!("{path}.type"),
                    message,
                    format!("Did you mean '{s}'?"),
                ),
                None => result.error(format!("{path}.type"), message),
            }
            return;
        }
        Err(RuleError::Decode { reason, .. }) => {
            result.error(format!("{path}.params"), format!("invalid params: {reason}"));
            return;
        }
        Err(e) => {
            result.error(path, e.to_string());
            return;
        }
    };

    validate_params(&path, &rule, result);
}

fn validate_params(path: &str, rule: &Rule, result: &mut ValidationResult) {
    match &rule.check {
        Check::TimeRange(p) => {
            if p.start_hour > 23 || p.end_hour > 23 {
                result.error(
                    format!("{path}.params"),
                    format!(
                        "hours must be within 0-23, got startHour={} endHour={}",
                        p.start_hour, p.end_hour
                    ),
                );
            } else if p.start_hour > p.end_hour {
                result.error(
                    format!("{path}.params"),
                    format!(
                        "startHour ({}) must not exceed endHour ({})",
                        p.start_hour, p.end_hour
                    ),
                );
            }
        }
        Check::Duration(p) => {
            if p.min_minutes < 0.0 {
                result.warn(
                    format!("{path}.params.minMinutes"),
                    "negative minMinutes accepts every parseable duration",
                );
            }
        }
        Check::Frequency(p) => {
            if p.max_per_day == 0 {
                result.error(
                    format!("{path}.params.maxPerDay"),
                    "maxPerDay must be at least 1",
                );
            }
            if p.group_by.trim().is_empty() {
                result.error(format!("{path}.params.groupBy"), "groupBy must not be empty");
            }
        }
        Check::DateInterval(p) => {
            if p.days <= 0 {
                result.error(format!("{path}.params.days"), "days must be at least 1");
            }
            if p.group_by.trim().is_empty() {
                result.error(format!("{path}.params.groupBy"), "groupBy must not be empty");
            }
        }
        Check::MedicalLevel(p) => {
            if p.allowed_levels.is_empty() {
                result.warn(
                    format!("{path}.params.allowedLevels"),
                    "no allowed levels; every non-empty value will be rejected",
                );
            }
        }
        Check::ProhibitedContent(p) => {
            if p.prohibited_terms.iter().all(|t| t.is_empty()) {
                result.warn(
                    format!("{path}.params.prohibitedTerms"),
                    "no prohibited terms; rule can never fire",
                );
            }
        }
        Check::Unsupported => {
            result.warn(
                format!("{path}.type"),
                format!("'{}' has no evaluator; rule is ignored", rule.rule_type),
            );
        }
        Check::Required
        | Check::Unique(_)
        | Check::DateFormat(_)
        | Check::MinValue(_)
        | Check::SameImplementer => {}
    }
}
