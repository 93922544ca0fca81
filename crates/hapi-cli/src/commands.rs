use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use tracing::{info, info_span, warn};

use hapi_config::{PipelineConfig, Theme, load_config};
use hapi_core::{Pipelines, RunSummary};
use hapi_db::Warehouse;
use hapi_model::resolve_admin2;

use crate::cli::{ConfigArgs, ResolveArgs, RunArgs};

/// Everything `run` reports back to the terminal.
pub struct RunResult {
    pub database: PathBuf,
    pub summary: RunSummary,
    pub alias_report: Option<PathBuf>,
}

pub fn run_pipeline(args: &RunArgs) -> Result<RunResult> {
    let config = load_config(&args.config.config)
        .with_context(|| format!("load config {}", args.config.config.display()))?;
    let database = config.database.clone();
    let _span = info_span!("run", database = %database.display()).entered();

    if args.fresh {
        remove_warehouse(&database)?;
    }
    let warehouse = Warehouse::open(&database)
        .with_context(|| format!("open warehouse {}", database.display()))?;

    let themes: Vec<Theme> = args.themes.iter().copied().map(Theme::from).collect();
    let mut pipelines = Pipelines::new(config, warehouse).with_themes(themes);
    pipelines.run().context("populate reference data")?;
    let summary = pipelines.output().context("summarise warehouse")?;

    if let Some(path) = &args.alias_report {
        let json = serde_json::to_string_pretty(pipelines.aliases())
            .context("serialise alias report")?;
        fs::write(path, json)
            .with_context(|| format!("write alias report {}", path.display()))?;
        info!(path = %path.display(), "wrote alias report");
    }

    Ok(RunResult {
        database,
        summary,
        alias_report: args.alias_report.clone(),
    })
}

/// Delete the warehouse and any SQLite side files next to it.
fn remove_warehouse(database: &Path) -> Result<()> {
    let mut removed = false;
    for suffix in ["", "-journal", "-wal", "-shm"] {
        let mut name = database.as_os_str().to_owned();
        name.push(suffix);
        let path = PathBuf::from(name);
        if path.exists() {
            fs::remove_file(&path).with_context(|| format!("remove {}", path.display()))?;
            removed = true;
        }
    }
    if removed {
        info!(path = %database.display(), "removed existing warehouse");
    }
    Ok(())
}

/// Load the configuration and confirm every referenced source file exists.
pub fn check_config(args: &ConfigArgs) -> Result<PipelineConfig> {
    let config = load_config(&args.config)
        .with_context(|| format!("load config {}", args.config.display()))?;

    let sources = &config.sources;
    let mut files: Vec<(&str, &Path)> = vec![
        ("countries", &sources.countries),
        ("admins", &sources.admins),
        ("org_aliases", &sources.org_aliases),
        ("sectors", &sources.sectors),
        ("org_types", &sources.org_types),
    ];
    if let Some(metadata) = &sources.metadata {
        files.push(("metadata", metadata));
    }
    for (theme, path) in config.themes.configured() {
        files.push((theme.as_str(), path));
    }

    let missing: Vec<String> = files
        .iter()
        .filter(|(_, path)| !path.is_file())
        .map(|(name, path)| format!("{name}: {}", path.display()))
        .collect();
    if !missing.is_empty() {
        bail!("missing source files:\n  {}", missing.join("\n  "));
    }
    if config.themes.configured().is_empty() {
        warn!("no themes configured; a run would only load reference data");
    }
    Ok(config)
}

pub fn run_resolve(args: &ResolveArgs) -> Result<String> {
    resolve_admin2(&args.code, &args.granularity)
        .with_context(|| format!("resolve {} at {}", args.code, args.granularity))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_removes_database_and_side_files() {
        let dir = tempfile::tempdir().unwrap();
        let db = dir.path().join("hapi.sqlite");
        fs::write(&db, b"").unwrap();
        fs::write(dir.path().join("hapi.sqlite-wal"), b"").unwrap();

        remove_warehouse(&db).unwrap();
        assert!(!db.exists());
        assert!(!dir.path().join("hapi.sqlite-wal").exists());
        remove_warehouse(&db).unwrap();
    }

    #[test]
    fn resolve_rejects_unknown_granularity() {
        let args = ResolveArgs {
            code: "AF01".to_string(),
            granularity: "district".to_string(),
        };
        let err = run_resolve(&args).unwrap_err();
        assert!(format!("{err:#}").contains("district"), "{err:#}");
    }

    #[test]
    fn resolve_maps_admin1_to_connector() {
        let args = ResolveArgs {
            code: "AF01".to_string(),
            granularity: "adminone".to_string(),
        };
        assert_eq!(run_resolve(&args).unwrap(), "AF01-XXX");
    }
}
