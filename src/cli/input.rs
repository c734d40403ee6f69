use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use serde::Deserialize;

use clustercost::core::models::workload::{WorkloadConfig, WorkloadInput};
use clustercost::core::pricing::{PricingCatalog, PricingCatalogInput};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CatalogFormat {
    Json,
    Toml,
}

impl CatalogFormat {
    pub fn from_path(path: &Path) -> Result<Self> {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => Ok(Self::Json),
            Some(ext) if ext.eq_ignore_ascii_case("toml") => Ok(Self::Toml),
            _ => bail!(
                "cannot tell catalog format of {} (expected a .json or .toml file)",
                path.display()
            ),
        }
    }
}

#[derive(Debug, Deserialize)]
struct WorkloadsFile {
    #[serde(default)]
    workloads: Vec<WorkloadInput>,
}

/// Pick the flag/env value first, then the configured path.
pub fn resolve_path(
    explicit: Option<PathBuf>,
    configured: Option<&PathBuf>,
    what: &str,
) -> Result<PathBuf> {
    explicit
        .or_else(|| configured.cloned())
        .with_context(|| format!("no {what} file given (pass --{what} or set paths.{what} in the config)"))
}

pub fn parse_catalog(content: &str, format: CatalogFormat) -> Result<PricingCatalog> {
    let input: PricingCatalogInput = match format {
        CatalogFormat::Json => serde_json::from_str(content).context("invalid catalog JSON")?,
        CatalogFormat::Toml => toml::from_str(content).context("invalid catalog TOML")?,
    };
    Ok(PricingCatalog::from_input(input)?)
}

pub fn load_catalog(path: &Path) -> Result<PricingCatalog> {
    let format = CatalogFormat::from_path(path)?;
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read catalog {}", path.display()))?;
    parse_catalog(&content, format)
        .with_context(|| format!("failed to load catalog {}", path.display()))
}

/// Parse and validate every workload, naming the first bad one by position.
pub fn parse_workloads(content: &str, catalog: &PricingCatalog) -> Result<Vec<WorkloadConfig>> {
    let file: WorkloadsFile = toml::from_str(content).context("invalid workloads TOML")?;
    file.workloads
        .into_iter()
        .enumerate()
        .map(|(index, input)| {
            let label = input_label(&input, index);
            input
                .into_config(index, catalog)
                .with_context(|| format!("workload {label} is invalid"))
        })
        .collect()
}

pub fn load_workloads(path: &Path, catalog: &PricingCatalog) -> Result<Vec<WorkloadConfig>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read workloads {}", path.display()))?;
    let configs = parse_workloads(&content, catalog)
        .with_context(|| format!("failed to load workloads {}", path.display()))?;
    tracing::debug!(path = %path.display(), count = configs.len(), "workloads loaded");
    Ok(configs)
}

fn input_label(input: &WorkloadInput, index: usize) -> String {
    let name = match input {
        WorkloadInput::Cluster(c) => c.name.as_deref(),
        WorkloadInput::Serverless(s) => s.name.as_deref(),
    };
    match name {
        Some(name) => format!("#{} '{}'", index + 1, name),
        None => format!("#{}", index + 1),
    }
}
