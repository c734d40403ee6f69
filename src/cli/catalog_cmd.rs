use std::path::PathBuf;

use anyhow::Result;
use serde::Serialize;

use crate::cli::input;
use crate::cli::output::{OutputFormat, OutputOptions};
use crate::cli::renderer;
use clustercost::core::config::AppConfig;
use clustercost::core::models::workload::instance_family;
use clustercost::core::pricing::catalog::{CatalogSummary, InstanceListing};

#[derive(Serialize)]
struct CheckPayload {
    catalog: String,
    valid: bool,
    #[serde(flatten)]
    summary: CatalogSummary,
}

pub fn check(catalog_path: Option<PathBuf>, config: &AppConfig, opts: &OutputOptions) -> Result<()> {
    let path = input::resolve_path(catalog_path, config.paths.catalog.as_ref(), "catalog")?;
    let catalog = match input::load_catalog(&path) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Catalog is invalid: {:#}", e);
            std::process::exit(1);
        }
    };

    let summary = catalog.summary();
    match opts.format {
        OutputFormat::Text => {
            let shown = path.display().to_string();
            println!("{}", renderer::render_catalog_summary(&shown, &summary, opts.use_color));
        }
        OutputFormat::Json => {
            let payload = CheckPayload {
                catalog: path.display().to_string(),
                valid: true,
                summary,
            };
            println!("{}", opts.to_json(&payload)?);
        }
    }
    Ok(())
}

pub fn instances(
    catalog_path: Option<PathBuf>,
    family: Option<String>,
    config: &AppConfig,
    opts: &OutputOptions,
) -> Result<()> {
    let path = input::resolve_path(catalog_path, config.paths.catalog.as_ref(), "catalog")?;
    let catalog = input::load_catalog(&path)?;
    let listings = filter_by_family(catalog.instances(), family.as_deref());

    match opts.format {
        OutputFormat::Text => {
            println!("{}", renderer::render_instances(&listings, opts.use_color));
        }
        OutputFormat::Json => {
            println!("{}", opts.to_json(&listings)?);
        }
    }
    Ok(())
}

/// Keep listings whose family (spec family, else the name prefix) matches,
/// ignoring case.
fn filter_by_family<'a>(
    listings: Vec<InstanceListing<'a>>,
    family: Option<&str>,
) -> Vec<InstanceListing<'a>> {
    let Some(family) = family.map(str::trim).filter(|f| !f.is_empty()) else {
        return listings;
    };
    listings
        .into_iter()
        .filter(|listing| {
            let listed = listing
                .spec
                .map(|spec| spec.family.as_str())
                .unwrap_or_else(|| instance_family(listing.instance_type));
            listed.eq_ignore_ascii_case(family)
                || instance_family(listing.instance_type).eq_ignore_ascii_case(family)
        })
        .collect()
}
