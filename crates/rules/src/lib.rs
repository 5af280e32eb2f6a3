//! Visit-log audit rule engine.
//!
//! This crate provides:
//! - Rule catalog schema with serde deserialization (YAML or JSON)
//! - One-time decoding of rules into strongly-typed checks
//! - Date and duration normalisation for spreadsheet cells
//! - Single-row predicates and whole-dataset checks (uniqueness, recurrence
//!   interval, daily frequency, implementer consistency)
//! - Per-file audit sessions, a filesystem catalog loader and catalog validation

pub mod dataset;
pub mod error;
pub mod evaluator;
pub mod loader;
pub mod parse;
pub mod schema;
pub mod session;
pub mod validation;

pub use error::{Result, RuleError};
