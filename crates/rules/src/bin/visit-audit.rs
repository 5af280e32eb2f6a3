//! visit-audit: run a task catalog over one file's mapped rows.
//!
//! Commands:
//! - `run`: load catalogs, audit a JSON rows file, print the report as JSON
//! - `validate`: check a single catalog file and print the validation result
//! - `list`: list the task types found in the rules directory

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use tracing::info;

use visit_audit_core::config::load_dotenv;
use visit_audit_core::{parse_rows_json, Config};
use visit_audit_rules::loader::{CatalogLoader, LoadStatus};
use visit_audit_rules::schema::TaskCatalog;
use visit_audit_rules::session::AuditSession;
use visit_audit_rules::validation::{validate_catalog, validate_yaml, ValidationResult};

// ── CLI ─────────────────────────────────────────────────────────────

/// Audit field-rep visit rows against per-task rule catalogs.
#[derive(Parser, Debug)]
#[command(name = "visit-audit", version, about)]
struct Cli {
    /// Directory holding the task catalogs (defaults to AUDIT_RULES_DIR or data/rules).
    #[arg(long, global = true)]
    rules_dir: Option<PathBuf>,

    /// Pretty-print JSON output.
    #[arg(long, global = true)]
    pretty: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Audit one file's rows with the catalog for a task type.
    Run {
        /// Task type whose catalog applies (e.g. pharmacy_visit).
        #[arg(long, env = "AUDIT_TASK")]
        task: String,

        /// JSON array of `{"row": n, "fields": {...}}` objects.
        #[arg(long)]
        rows: PathBuf,
    },
    /// Validate a single catalog file.
    Validate {
        /// Catalog file (YAML or JSON).
        file: PathBuf,
    },
    /// List the task types available in the rules directory.
    List,
}

// ── main ────────────────────────────────────────────────────────────

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    load_dotenv();
    let config = Config::from_env();
    let cli = Cli::parse();
    config.log_summary();

    let rules_dir = cli
        .rules_dir
        .clone()
        .unwrap_or_else(|| config.rules.rules_dir.clone());

    match &cli.command {
        Command::Run { task, rows } => run(&cli, &config, rules_dir, task, rows),
        Command::Validate { file } => validate(&cli, file),
        Command::List => list(rules_dir),
    }
}

fn load_catalogs(rules_dir: PathBuf) -> anyhow::Result<CatalogLoader> {
    let mut loader = CatalogLoader::new(rules_dir);
    let results = loader
        .load_all()
        .with_context(|| format!("scanning {}", loader.rules_dir().display()))?;
    let failed = results
        .iter()
        .filter(|r| matches!(r.status, LoadStatus::Failed { .. }))
        .count();
    info!(
        files = results.len(),
        failed,
        task_types = loader.task_types().len(),
        "catalogs loaded"
    );
    Ok(loader)
}

fn run(
    cli: &Cli,
    config: &Config,
    rules_dir: PathBuf,
    task: &str,
    rows_path: &Path,
) -> anyhow::Result<()> {
    let loader = load_catalogs(rules_dir)?;
    let Some(catalog) = loader.get(task) else {
        bail!(
            "unknown task type '{}' (available: {})",
            task,
            loader.task_types().join(", ")
        );
    };

    let json = fs::read_to_string(rows_path)
        .with_context(|| format!("reading {}", rows_path.display()))?;
    let rows = parse_rows_json(&json)?;

    let mut session = AuditSession::new(config.fields.clone());
    info!(run_id = %session.run_id(), task, rows = rows.len(), "audit started");
    for input in rows {
        session.ingest(input.row, input.fields, &catalog.rules);
    }
    let report = session.finish(&catalog.rules);

    print_json(cli, &report)
}

fn validate(cli: &Cli, file: &Path) -> anyhow::Result<()> {
    let contents =
        fs::read_to_string(file).with_context(|| format!("reading {}", file.display()))?;

    let result: ValidationResult = if file.extension().and_then(|e| e.to_str()) == Some("json") {
        let catalog: TaskCatalog = serde_json::from_str(&contents)
            .with_context(|| format!("parsing {}", file.display()))?;
        validate_catalog(&catalog)
    } else {
        validate_yaml(&contents)
    };

    print_json(cli, &result)?;
    if !result.valid {
        bail!("{} has {} error(s)", file.display(), result.errors.len());
    }
    Ok(())
}

fn list(rules_dir: PathBuf) -> anyhow::Result<()> {
    let loader = load_catalogs(rules_dir)?;
    for task_type in loader.task_types() {
        if let Some(catalog) = loader.get(task_type) {
            println!(
                "{}\t{} rule(s)\t{}",
                task_type,
                catalog.rules.len(),
                catalog.description.as_deref().unwrap_or("")
            );
        }
    }
    Ok(())
}

fn print_json<T: serde::Serialize>(cli: &Cli, value: &T) -> anyhow::Result<()> {
    let out = if cli.pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    println!("{out}");
    Ok(())
}
