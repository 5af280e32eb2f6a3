use std::env;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Load .env file (silently ignores if missing).
pub fn load_dotenv() {
    dotenvy::dotenv().ok();
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_opt(key: &str) -> Option<String> {
    env::var(key).ok().filter(|s| !s.is_empty())
}

/// Read a profiled env var: tries {PROFILE}_{KEY} first, falls back to {KEY}.
fn profiled_env_opt(profile: &str, key: &str) -> Option<String> {
    if !profile.is_empty() {
        let prefixed = format!("{}_{}", profile, key);
        if let Some(v) = env_opt(&prefixed) {
            return Some(v);
        }
    }
    env_opt(key)
}

fn profiled_env_or(profile: &str, key: &str, default: &str) -> String {
    profiled_env_opt(profile, key).unwrap_or_else(|| default.to_string())
}

/// Comma-separated list; falls back to `default` when unset or empty after trimming.
fn profiled_env_list(profile: &str, key: &str, default: &[&str]) -> Vec<String> {
    let parsed: Vec<String> = profiled_env_opt(profile, key)
        .map(|v| {
            v.split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect()
        })
        .unwrap_or_default();
    if parsed.is_empty() {
        default.iter().map(|s| s.to_string()).collect()
    } else {
        parsed
    }
}

// ── Top-level config ──────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Active profile name (empty = default).
    pub profile: String,
    pub rules: RulesConfig,
    pub fields: FieldAliases,
}

impl Config {
    /// Build config from environment variables (call `load_dotenv()` first).
    /// Profile is read from `AUDIT_PROFILE`. When set (e.g. `PROD`), every key
    /// is first looked up as `{PROFILE}_{KEY}`, falling back to `{KEY}`.
    pub fn from_env() -> Self {
        let profile = env_or("AUDIT_PROFILE", "").to_uppercase();
        Self::for_profile(&profile)
    }

    /// Build config for a specific named profile (empty string = default).
    pub fn for_profile(profile: &str) -> Self {
        let p = profile.to_uppercase();
        let p = p.as_str();
        Self {
            profile: p.to_string(),
            rules: RulesConfig::from_env_profiled(p),
            fields: FieldAliases::from_env_profiled(p),
        }
    }

    pub fn profile_label(&self) -> &str {
        if self.profile.is_empty() { "default" } else { &self.profile }
    }

    /// Print a summary for startup logs.
    pub fn log_summary(&self) {
        tracing::info!("Config loaded (profile: {}):", self.profile_label());
        tracing::info!("  rules:        dir={}", self.rules.rules_dir.display());
        tracing::info!("  date fields:  {}", self.fields.date_fields.join(", "));
        tracing::info!("  implementer:  {}", self.fields.implementer_fields.join(", "));
        tracing::info!("  address:      {}", self.fields.address_fields.join(", "));
    }
}

// ── Rules ─────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RulesConfig {
    /// Directory holding per-task rule catalogs.
    pub rules_dir: PathBuf,
}

impl RulesConfig {
    fn from_env_profiled(p: &str) -> Self {
        Self {
            rules_dir: PathBuf::from(profiled_env_or(p, "AUDIT_RULES_DIR", "data/rules")),
        }
    }
}

// ── Field aliases ─────────────────────────────────────────────

const DEFAULT_DATE_FIELDS: &[&str] = &[
    "visitStartTime",
    "visitDate",
    "date",
    "visitEndTime",
    "executionDate",
];

const DEFAULT_IMPLEMENTER_FIELDS: &[&str] = &["implementer", "implementerName", "executor", "rep"];

const DEFAULT_ADDRESS_FIELDS: &[&str] = &[
    "address",
    "pharmacyAddress",
    "hospitalAddress",
    "storeAddress",
];

/// Ordered fallback chains used by the cross-row rules when a concept
/// (visit day, acting rep, visited address) can live under several headers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldAliases {
    pub date_fields: Vec<String>,
    pub implementer_fields: Vec<String>,
    pub address_fields: Vec<String>,
}

impl Default for FieldAliases {
    fn default() -> Self {
        let owned = |xs: &[&str]| xs.iter().map(|s| s.to_string()).collect();
        Self {
            date_fields: owned(DEFAULT_DATE_FIELDS),
            implementer_fields: owned(DEFAULT_IMPLEMENTER_FIELDS),
            address_fields: owned(DEFAULT_ADDRESS_FIELDS),
        }
    }
}

impl FieldAliases {
    fn from_env_profiled(p: &str) -> Self {
        Self {
            date_fields: profiled_env_list(p, "AUDIT_DATE_FIELDS", DEFAULT_DATE_FIELDS),
            implementer_fields: profiled_env_list(
                p,
                "AUDIT_IMPLEMENTER_FIELDS",
                DEFAULT_IMPLEMENTER_FIELDS,
            ),
            address_fields: profiled_env_list(p, "AUDIT_ADDRESS_FIELDS", DEFAULT_ADDRESS_FIELDS),
        }
    }
}
