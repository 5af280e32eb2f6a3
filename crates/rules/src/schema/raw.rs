//! Catalog wire types, exactly as written in YAML or JSON.

use serde::{Deserialize, Serialize};

/// A rule as stored in a task catalog: `{field, type, params, message}`.
///
/// `type` stays a plain string here so an unknown type can be reported
/// per rule instead of failing the whole catalog.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RawRule {
    pub field: String,
    #[serde(rename = "type")]
    pub rule_type: String,
    #[serde(default)]
    pub params: Option<serde_yaml::Value>,
    #[serde(default)]
    pub message: String,
}

/// All rules that apply to one task type (e.g. pharmacy visits).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TaskCatalog {
    pub task_type: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub rules: Vec<RawRule>,
}
