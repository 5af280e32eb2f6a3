//! Tests for the catalog loader module.

use std::fs;

use tempfile::TempDir;

use super::*;
use crate::schema::{Check, RuleType};

const PHARMACY_CATALOG_YAML: &str = r#"
taskType: pharmacy_visit
rules:
  - field: pharmacyName
    type: required
    message: Pharmacy name is required
  - field: pharmacyName
    type: unique
    params: {scope: day}
    message: Duplicate pharmacy visit
"#;

const HOSPITAL_CATALOG_JSON: &str = r#"{
  "taskType": "hospital_visit",
  "rules": [
    {"field": "hospitalName", "type": "sameImplementer", "message": "Hospital owned by another rep"},
    {"field": "visitDuration", "type": "duration", "message": "missing params"},
    {"field": "hospitalName", "type": "crossTaskValidation", "message": "cross task"}
  ]
}"#;

fn temp_loader() -> (TempDir, CatalogLoader) {
    let dir = TempDir::new().expect("create tempdir");
    let loader = CatalogLoader::new(dir.path().to_path_buf());
    (dir, loader)
}

#[test]
fn load_yaml_catalog() {
    let (dir, mut loader) = temp_loader();
    fs::write(dir.path().join("pharmacy.yml"), PHARMACY_CATALOG_YAML).unwrap();

    let results = loader.load_all().unwrap();
    assert_eq!(results.len(), 1);
    assert!(matches!(
        &results[0].status,
        LoadStatus::Loaded { task_type, rules: 2, skipped: 0 } if task_type == "pharmacy_visit"
    ));

    let catalog = loader.get("pharmacy_visit").unwrap();
    assert_eq!(catalog.rules[0].check, Check::Required);
    assert_eq!(catalog.rules[1].rule_type, RuleType::Unique);
}

#[test]
fn json_catalog_keeps_good_rules_and_reports_bad_ones() {
    let (dir, mut loader) = temp_loader();
    fs::write(dir.path().join("hospital.json"), HOSPITAL_CATALOG_JSON).unwrap();

    loader.load_all().unwrap();
    let catalog = loader.get("hospital_visit").unwrap();
    assert_eq!(catalog.rules.len(), 2);
    assert_eq!(catalog.rules[1].check, Check::Unsupported);
    assert_eq!(catalog.skipped.len(), 1);
    assert_eq!(catalog.skipped[0].index, 1);
    assert!(catalog.skipped[0].error.contains("missing params"));
}

#[test]
fn load_all_skips_dotfiles_and_other_extensions() {
    let (dir, mut loader) = temp_loader();
    fs::write(dir.path().join("pharmacy.yaml"), PHARMACY_CATALOG_YAML).unwrap();
    fs::write(dir.path().join(".hidden.yml"), PHARMACY_CATALOG_YAML).unwrap();
    fs::write(dir.path().join("readme.txt"), "not a catalog").unwrap();

    let results = loader.load_all().unwrap();
    let loaded = results
        .iter()
        .filter(|r| matches!(r.status, LoadStatus::Loaded { .. }))
        .count();
    let skipped = results
        .iter()
        .filter(|r| matches!(r.status, LoadStatus::Skipped { .. }))
        .count();
    assert_eq!(loaded, 1);
    assert_eq!(skipped, 2);
}

#[test]
fn load_all_recurses_into_subdirectories() {
    let (dir, mut loader) = temp_loader();
    let sub = dir.path().join("hospital");
    fs::create_dir(&sub).unwrap();
    fs::write(sub.join("hospital.json"), HOSPITAL_CATALOG_JSON).unwrap();
    fs::write(dir.path().join("pharmacy.yml"), PHARMACY_CATALOG_YAML).unwrap();

    loader.load_all().unwrap();
    assert_eq!(loader.task_types(), vec!["hospital_visit", "pharmacy_visit"]);
}

#[test]
fn duplicate_task_type_fails_second_file() {
    let (dir, mut loader) = temp_loader();
    fs::write(dir.path().join("a.yml"), PHARMACY_CATALOG_YAML).unwrap();
    fs::write(dir.path().join("b.yml"), PHARMACY_CATALOG_YAML).unwrap();

    let results = loader.load_all().unwrap();
    assert!(matches!(results[0].status, LoadStatus::Loaded { .. }));
    match &results[1].status {
        LoadStatus::Failed { error } => assert!(error.contains("already loaded")),
        other => panic!("expected Failed, got {:?}", other),
    }
}

#[test]
fn malformed_file_is_reported_not_fatal() {
    let (dir, mut loader) = temp_loader();
    fs::write(dir.path().join("broken.yml"), "taskType: [unclosed").unwrap();
    fs::write(dir.path().join("pharmacy.yml"), PHARMACY_CATALOG_YAML).unwrap();

    let results = loader.load_all().unwrap();
    assert_eq!(results.len(), 2);
    assert!(matches!(results[0].status, LoadStatus::Failed { .. }));
    assert!(loader.get("pharmacy_visit").is_some());
}

#[test]
fn missing_directory_loads_nothing() {
    let (dir, _) = temp_loader();
    let mut loader = CatalogLoader::new(dir.path().join("does-not-exist"));
    assert!(loader.load_all().unwrap().is_empty());
    assert!(loader.task_types().is_empty());
}

#[test]
fn unreadable_entry_is_skipped_not_fatal() {
    let dir = std::path::Path::new("rules");
    let entries = vec![
        Ok(dir.join("b.yml")),
        Err(std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied")),
        Ok(dir.join("a.yml")),
    ];
    let paths = super::core::sorted_entry_paths(dir, entries);
    assert_eq!(paths, vec![dir.join("a.yml"), dir.join("b.yml")]);
}
