//! Rule catalog schema types with serde deserialization.
//!
//! Defines the two layers of a rule:
//! - `RawRule` / `TaskCatalog`: the wire form (`{field, type, params, message}`)
//! - `Rule` / `Check`: the decoded, strongly-typed form evaluators work on
//!
//! `RuleType` is the closed set of rule types a catalog may name.

mod check;
mod kind;
mod raw;

pub use check::*;
pub use kind::*;
pub use raw::*;
