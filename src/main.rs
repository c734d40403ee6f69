mod cli;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use clustercost::core::config::AppConfig;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(
    name = "ccost",
    about = "Monthly cost estimates for data-platform workloads",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Output format (text|json)
    #[arg(short, long, global = true)]
    format: Option<String>,

    /// Shorthand for --format json
    #[arg(short = 'j', long = "json", global = true)]
    json: bool,

    /// Pretty-print JSON output
    #[arg(long, global = true)]
    pretty: bool,

    /// Disable ANSI colors
    #[arg(long, global = true)]
    no_color: bool,

    /// Verbose logging to stderr
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Price every workload in a workloads file
    Estimate {
        /// Pricing catalog (.json or .toml)
        #[arg(long, env = "CCOST_CATALOG")]
        catalog: Option<PathBuf>,

        /// Workloads file (.toml)
        #[arg(long, env = "CCOST_WORKLOADS")]
        workloads: Option<PathBuf>,

        /// Show the per-workload breakdown
        #[arg(short, long)]
        all: bool,
    },
    /// Inspect a pricing catalog
    Catalog {
        #[command(subcommand)]
        action: CatalogAction,
    },
    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum CatalogAction {
    /// Validate a catalog file and print its entry counts
    Check {
        #[arg(long, env = "CCOST_CATALOG")]
        catalog: Option<PathBuf>,
    },
    /// List instance types with specs and hourly prices
    Instances {
        #[arg(long, env = "CCOST_CATALOG")]
        catalog: Option<PathBuf>,

        /// Only show one instance family (e.g. r5)
        #[arg(long)]
        family: Option<String>,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Generate default config file
    Init,
    /// Validate config file
    Check,
    /// Print the config file path
    Path,
}

/// Logs go to stderr so JSON on stdout stays parseable. `RUST_LOG` wins
/// over `--verbose`.
fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
        .init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = match AppConfig::load() {
        Ok(c) => c,
        Err(e) => {
            tracing::warn!(error = %e, "ignoring unreadable config, using defaults");
            AppConfig::default()
        }
    };

    let output_opts = cli::output::OutputOptions {
        format: cli::output::OutputFormat::resolve(
            cli.json,
            cli.format.as_deref(),
            &config.settings,
        ),
        pretty: cli.pretty,
        use_color: cli::output::detect_color(!cli.no_color, &config.settings),
        verbose: cli.verbose,
    };

    match cli.command {
        None => {
            // bare `ccost` falls back to env vars and configured paths
            let catalog = std::env::var_os("CCOST_CATALOG").map(PathBuf::from);
            let workloads = std::env::var_os("CCOST_WORKLOADS").map(PathBuf::from);
            cli::estimate_cmd::run(catalog, workloads, false, &config, &output_opts)?;
        }
        Some(Commands::Estimate {
            catalog,
            workloads,
            all,
        }) => cli::estimate_cmd::run(catalog, workloads, all, &config, &output_opts)?,
        Some(Commands::Catalog { action }) => match action {
            CatalogAction::Check { catalog } => {
                cli::catalog_cmd::check(catalog, &config, &output_opts)?
            }
            CatalogAction::Instances { catalog, family } => {
                cli::catalog_cmd::instances(catalog, family, &config, &output_opts)?
            }
        },
        Some(Commands::Config { action }) => match action {
            ConfigAction::Init => cli::config_cmd::init(&output_opts)?,
            ConfigAction::Check => cli::config_cmd::check(&output_opts)?,
            ConfigAction::Path => cli::config_cmd::path(&output_opts)?,
        },
    }

    Ok(())
}
