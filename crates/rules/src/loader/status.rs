//! Load result structures for the catalog loader.

use std::path::PathBuf;

/// Outcome of loading a single catalog file.
#[derive(Debug)]
pub struct LoadResult {
    /// Path to the file that was loaded.
    pub path: PathBuf,
    /// Status of the load attempt.
    pub status: LoadStatus,
}

/// Status of a single file load attempt.
#[derive(Debug)]
pub enum LoadStatus {
    /// Catalog was loaded; `skipped` rules failed to decode.
    Loaded {
        task_type: String,
        rules: usize,
        skipped: usize,
    },
    /// File was skipped (dotfile, unsupported extension, etc.).
    Skipped { reason: String },
    /// Parse error or duplicate task type.
    Failed { error: String },
}
