//! `sameImplementer` rules: a target stays with the rep who visited it first.

use std::collections::hash_map::Entry;
use std::collections::HashMap;

use visit_audit_core::FieldAliases;

use crate::dataset::DatasetIndex;
use crate::evaluator::{normalize, Violation, ViolationContext};
use crate::schema::Rule;

use super::implementer_value;

struct Owner {
    key: String,
    display: String,
}

pub(super) fn check(rule: &Rule, dataset: &DatasetIndex, aliases: &FieldAliases) -> Vec<Violation> {
    let mut owners: HashMap<String, Owner> = HashMap::new();
    let mut violations = Vec::new();

    for (row, data) in dataset.iter() {
        let Some(target) = normalize(data.get(&rule.field)) else {
            continue;
        };
        let Some(actor_value) = implementer_value(data, aliases) else {
            continue;
        };
        // Implementers compare by normalized name: case and spacing never split one rep in two.
        let (Some(actor_key), Some(actor_display)) = (normalize(actor_value), actor_value.to_display())
        else {
            continue;
        };
        let actor_display = actor_display.trim().to_string();

        match owners.entry(target) {
            Entry::Vacant(slot) => {
                slot.insert(Owner {
                    key: actor_key,
                    display: actor_display,
                });
            }
            Entry::Occupied(owner) if owner.get().key != actor_key => {
                violations.push(Violation::new(rule, row, data).with_context(
                    ViolationContext::Implementer {
                        expected_implementer: owner.get().display.clone(),
                        actual_implementer: actor_display,
                    },
                ));
            }
            Entry::Occupied(_) => {}
        }
    }

    violations
}
