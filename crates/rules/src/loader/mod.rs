//! Filesystem catalog loader.
//!
//! Scans the rules directory for per-task catalogs (`*.yml`, `*.yaml`, `*.json`),
//! compiles each into typed rules and keeps them in memory by task type.

mod catalog;
mod core;
mod status;

#[cfg(test)]
mod tests;

pub use self::catalog::{CompiledCatalog, SkippedRule};
pub use self::core::CatalogLoader;
pub use self::status::{LoadResult, LoadStatus};
