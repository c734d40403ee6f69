use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::cli::input;
use crate::cli::output::{OutputFormat, OutputOptions};
use crate::cli::renderer;
use clustercost::core::config::AppConfig;
use clustercost::core::models::cost::Report;
use clustercost::core::pricing::CatalogStore;

#[derive(Serialize)]
struct EstimatePayload<'a> {
    generated_at: DateTime<Utc>,
    catalog: String,
    workloads: String,
    #[serde(flatten)]
    report: &'a Report,
}

pub fn run(
    catalog_path: Option<PathBuf>,
    workloads_path: Option<PathBuf>,
    show_all: bool,
    config: &AppConfig,
    opts: &OutputOptions,
) -> Result<()> {
    let catalog_path = input::resolve_path(catalog_path, config.paths.catalog.as_ref(), "catalog")?;
    let workloads_path =
        input::resolve_path(workloads_path, config.paths.workloads.as_ref(), "workloads")?;

    let store = CatalogStore::new(input::load_catalog(&catalog_path)?);
    let configs = input::load_workloads(&workloads_path, &store.snapshot())?;
    let report = store
        .estimate(&configs)
        .with_context(|| format!("cannot price workloads in {}", workloads_path.display()))?;

    if opts.verbose {
        eprintln!("{}", priced_summary(&report, &catalog_path, &workloads_path));
    }

    match opts.format {
        OutputFormat::Text => {
            println!("{}", renderer::render_report(&report, show_all, opts.use_color));
        }
        OutputFormat::Json => {
            let payload = EstimatePayload {
                generated_at: Utc::now(),
                catalog: catalog_path.display().to_string(),
                workloads: workloads_path.display().to_string(),
                report: &report,
            };
            println!("{}", opts.to_json(&payload)?);
        }
    }

    Ok(())
}

/// One stderr line for `--verbose`, naming both inputs.
fn priced_summary(report: &Report, catalog: &Path, workloads: &Path) -> String {
    let count = report.rows().len();
    format!(
        "Priced {} workload{} from {} against {}",
        count,
        if count == 1 { "" } else { "s" },
        workloads.display(),
        catalog.display()
    )
}
