//! Compiling a catalog's raw rules into their typed form.

use tracing::warn;

use crate::schema::{Check, RawRule, Rule, TaskCatalog};

/// A rule that could not be decoded and was left out of the compiled catalog.
#[derive(Debug, Clone)]
pub struct SkippedRule {
    /// Position in the catalog's `rules` list.
    pub index: usize,
    pub raw: RawRule,
    pub error: String,
}

/// A task catalog with every decodable rule compiled.
#[derive(Debug, Clone)]
pub struct CompiledCatalog {
    pub task_type: String,
    pub description: Option<String>,
    pub rules: Vec<Rule>,
    pub skipped: Vec<SkippedRule>,
}

impl CompiledCatalog {
    /// Decode every rule once. Malformed rules are dropped with a warning so the
    /// rest of the catalog stays usable.
    pub fn compile(catalog: &TaskCatalog) -> Self {
        let mut rules = Vec::with_capacity(catalog.rules.len());
        let mut skipped = Vec::new();

        for (index, raw) in catalog.rules.iter().enumerate() {
            match Rule::decode(raw) {
                Ok(rule) => {
                    if rule.check == Check::Unsupported {
                        warn!(
                            task_type = %catalog.task_type,
                            field = %rule.field,
                            rule_type = %rule.rule_type,
                            "rule type has no evaluator; it will never fire"
                        );
                    }
                    rules.push(rule);
                }
                Err(e) => {
                    warn!(
                        task_type = %catalog.task_type,
                        index,
                        error = %e,
                        "skipping malformed rule"
                    );
                    skipped.push(SkippedRule {
                        index,
                        raw: raw.clone(),
                        error: e.to_string(),
                    });
                }
            }
        }

        Self {
            task_type: catalog.task_type.clone(),
            description: catalog.description.clone(),
            rules,
            skipped,
        }
    }
}
