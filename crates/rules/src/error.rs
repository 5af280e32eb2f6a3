//! Error types for rule decoding and catalog loading.

use crate::schema::RuleType;

/// Errors that can occur while decoding rules and loading catalogs.
#[derive(Debug, thiserror::Error)]
pub enum RuleError {
    /// Filesystem I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parse/deserialization error.
    #[error("YAML parse error: {0}")]
    Parse(#[from] serde_yaml::Error),

    /// JSON parse/deserialization error.
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// The `type` of a rule is not one of the known rule types.
    #[error("rule on '{field}': unknown rule type '{rule_type}'")]
    UnknownType { field: String, rule_type: String },

    /// The `params` of a rule do not fit its type.
    #[error("rule on '{field}' ({rule_type}): invalid params: {reason}")]
    Decode {
        field: String,
        rule_type: RuleType,
        reason: String,
    },

    /// Catalog-level validation error (e.g. duplicate task types).
    #[error("Validation error: {0}")]
    Validation(String),
}

/// Result alias for rule operations.
pub type Result<T> = std::result::Result<T, RuleError>;
