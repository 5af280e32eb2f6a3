//! Catalog validation with structured errors and suggestions.
//!
//! Checks a [`TaskCatalog`] before it is used: task type naming, rule types
//! (with "Did you mean …?" suggestions), params that fail to decode, and
//! parameter values that decode but can never behave sensibly.
//! Returns a [`ValidationResult`] with errors (block use) and warnings (advisory).

mod rule_checks;

pub mod fuzzy;

use crate::schema::TaskCatalog;
use serde::{Deserialize, Serialize};

// ── Result types ────────────────────────────────────────────────────

/// Overall validation outcome.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationResult {
    pub valid: bool,
    pub errors: Vec<ValidationError>,
    pub warnings: Vec<ValidationWarning>,
}

/// A blocking validation error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationError {
    /// Path-like location, e.g. `"rules[3].params.maxPerDay"`.
    pub path: String,
    pub message: String,
    /// Optional "Did you mean …?" suggestion.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

/// A non-blocking advisory warning.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationWarning {
    pub path: String,
    pub message: String,
}

impl ValidationResult {
    pub(crate) fn new() -> Self {
        Self {
            valid: true,
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    pub(crate) fn error(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.valid = false;
        self.errors.push(ValidationError {
            path: path.into(),
            message: message.into(),
            suggestion: None,
        });
    }

    pub(crate) fn error_with_suggestion(
        &mut self,
        path: impl Into<String>,
        message: impl Into<String>,
        suggestion: impl Into<String>,
    ) {
        self.valid = false;
        self.errors.push(ValidationError {
            path: path.into(),
            message: message.into(),
            suggestion: Some(suggestion.into()),
        });
    }

    pub(crate) fn warn(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ValidationWarning {
            path: path.into(),
            message: message.into(),
        });
    }
}

// ── Public API ──────────────────────────────────────────────────────

/// Validate a parsed [`TaskCatalog`].
pub fn validate_catalog(catalog: &TaskCatalog) -> ValidationResult {
    let mut result = ValidationResult::new();
    rule_checks::validate_task_type(&catalog.task_type, &mut result);
    for (i, rule) in catalog.rules.iter().enumerate() {
        rule_checks::validate_rule(i, rule, &mut result);
    }
    result
}

/// Parse raw YAML and validate. Returns parse errors merged with validation errors.
pub fn validate_yaml(yaml: &str) -> ValidationResult {
    match serde_yaml::from_str::<TaskCatalog>(yaml) {
        Ok(catalog) => validate_catalog(&catalog),
        Err(e) => {
            let mut result = ValidationResult::new();
            result.error("", format!("YAML parse error: {e}"));
            result
        }
    }
}
