//! Core [`CatalogLoader`] struct: filesystem-backed catalog loading.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::error::{Result, RuleError};
use crate::schema::TaskCatalog;

use super::catalog::CompiledCatalog;
use super::status::{LoadResult, LoadStatus};

/// Filesystem-backed catalog loader.
///
/// Scans a directory (recursively) for `*.yml` / `*.yaml` / `*.json` files,
/// deserializes each into a [`TaskCatalog`], compiles it, and keeps the result
/// in an in-memory map keyed by `taskType`.
pub struct CatalogLoader {
    /// Root directory containing catalog files.
    rules_dir: PathBuf,
    /// Compiled catalogs keyed by task type.
    catalogs: HashMap<String, CompiledCatalog>,
    /// Which file each task type came from, for duplicate detection.
    sources: HashMap<String, PathBuf>,
}

impl CatalogLoader {
    pub fn new(rules_dir: PathBuf) -> Self {
        Self {
            rules_dir,
            catalogs: HashMap::new(),
            sources: HashMap::new(),
        }
    }

    /// Recursively scan the rules directory and load all catalog files.
    ///
    /// Dotfiles and files with other extensions are skipped.
    /// Parse errors are reported per-file but do not abort the scan.
    pub fn load_all(&mut self) -> Result<Vec<LoadResult>> {
        let mut results = Vec::new();
        let root = self.rules_dir.clone();
        self.scan_dir_recursive(&root, &mut results)?;
        Ok(results)
    }

    /// Recursively scan a directory for catalog files.
    fn scan_dir_recursive(&mut self, dir: &Path, results: &mut Vec<LoadResult>) -> Result<()> {
        let entries = match fs::read_dir(dir) {
            Ok(e) => sorted_entry_paths(dir, e.map(|entry| entry.map(|e| e.path()))),
            Err(e) => {
                warn!(path = %dir.display(), error = %e, "failed to read directory");
                return Ok(());
            }
        };

        for path in entries {
            // Skip dotfiles/dotdirs
            if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
                if name.starts_with('.') {
                    if path.is_file() {
                        results.push(LoadResult {
                            path,
                            status: LoadStatus::Skipped {
                                reason: "dotfile".to_string(),
                            },
                        });
                    }
                    continue;
                }
            }

            if path.is_dir() {
                self.scan_dir_recursive(&path, results)?;
                continue;
            }

            if catalog_format(&path).is_none() {
                results.push(LoadResult {
                    path,
                    status: LoadStatus::Skipped {
                        reason: "not a YAML or JSON file".to_string(),
                    },
                });
                continue;
            }

            let status = match self.load_file(&path) {
                Ok(catalog) => self.insert_catalog(&path, &catalog),
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "failed to load catalog file");
                    LoadStatus::Failed {
                        error: e.to_string(),
                    }
                }
            };
            results.push(LoadResult { path, status });
        }

        Ok(())
    }

    fn insert_catalog(&mut self, path: &Path, catalog: &TaskCatalog) -> LoadStatus {
        if let Some(existing) = self.sources.get(&catalog.task_type) {
            let error = format!(
                "taskType '{}' already loaded from {}",
                catalog.task_type,
                existing.display()
            );
            warn!(path = %path.display(), %error, "duplicate task type");
            return LoadStatus::Failed { error };
        }

        let compiled = CompiledCatalog::compile(catalog);
        let status = LoadStatus::Loaded {
            task_type: compiled.task_type.clone(),
            rules: compiled.rules.len(),
            skipped: compiled.skipped.len(),
        };
        info!(
            task_type = %compiled.task_type,
            rules = compiled.rules.len(),
            skipped = compiled.skipped.len(),
            path = %path.display(),
            "loaded catalog"
        );
        self.sources
            .insert(compiled.task_type.clone(), path.to_path_buf());
        self.catalogs.insert(compiled.task_type.clone(), compiled);
        status
    }

    /// Parse a single catalog file. The extension picks YAML or JSON.
    pub fn load_file(&self, path: &Path) -> Result<TaskCatalog> {
        let contents = fs::read_to_string(path)?;
        let catalog: TaskCatalog = match catalog_format(path) {
            Some(CatalogFormat::Json) => serde_json::from_str(&contents)?,
            _ => serde_yaml::from_str(&contents)?,
        };

        if catalog.task_type.trim().is_empty() {
            return Err(RuleError::Validation(
                "catalog taskType must not be empty".to_string(),
            ));
        }
        Ok(catalog)
    }

    /// Compiled catalog for a task type.
    pub fn get(&self, task_type: &str) -> Option<&CompiledCatalog> {
        self.catalogs.get(task_type)
    }

    /// Loaded task types, sorted.
    pub fn task_types(&self) -> Vec<&str> {
        let mut types: Vec<&str> = self.catalogs.keys().map(|s| s.as_str()).collect();
        types.sort_unstable();
        types
    }

    /// Get the rules directory path.
    pub fn rules_dir(&self) -> &Path {
        &self.rules_dir
    }
}

/// Entry paths in sorted order, so duplicate task types always resolve the same way.
/// Entries that fail to read are logged and skipped.
pub(super) fn sorted_entry_paths(
    dir: &Path,
    entries: impl IntoIterator<Item = std::io::Result<PathBuf>>,
) -> Vec<PathBuf> {
    let mut paths: Vec<PathBuf> = entries
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(path) => Some(path),
            Err(e) => {
                warn!(path = %dir.display(), error = %e, "failed to read directory entry");
                None
            }
        })
        .collect();
    paths.sort();
    paths
}

enum CatalogFormat {
    Yaml,
    Json,
}

fn catalog_format(path: &Path) -> Option<CatalogFormat> {
    match path.extension().and_then(|e| e.to_str()) {
        Some("yml") | Some("yaml") => Some(CatalogFormat::Yaml),
        Some("json") => Some(CatalogFormat::Json),
        _ => None,
    }
}
