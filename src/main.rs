//! Infora - IT asset inventory analytics
//!
//! A CLI tool and HTTP API that turns the device records held in a hosted
//! backend into dashboard analytics, inventory reports and helpdesk
//! statistics.
//!
//! Exit codes:
//!   0 - Success
//!   1 - Runtime error (connection, config, invalid snapshot, etc.)

mod analysis;
mod cli;
mod config;
mod models;
mod notify;
mod report;
mod server;
mod service;
mod store;
mod updates;

use anyhow::{Context, Result};
use chrono::Utc;
use cli::{Args, OutputFormat};
use config::{Config, CONFIG_FILE_NAME};
use report::ReportFilter;
use service::InventoryService;
use std::path::Path;
use store::{RecordStore, RestStore, SnapshotStore};
use tracing::{debug, error, info, warn};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse_args();

    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle --init-config early (no logging needed)
    if args.init_config {
        return handle_init_config();
    }

    init_logging(&args);

    info!("Infora v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);

    if let Err(e) = run(args).await {
        error!("Run failed: {:#}", e);
        eprintln!("\n❌ Error: {:#}", e);
        std::process::exit(1);
    }

    Ok(())
}

/// Handle --init-config: generate a default .infora.toml.
fn handle_init_config() -> Result<()> {
    let path = Path::new(CONFIG_FILE_NAME);

    if path.exists() {
        eprintln!(
            "⚠️  {} already exists. Remove it first or edit it manually.",
            CONFIG_FILE_NAME
        );
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content)
        .with_context(|| format!("Failed to write {}", CONFIG_FILE_NAME))?;

    println!("✅ Created {} with default settings.", CONFIG_FILE_NAME);
    println!("   Edit it to set the backend URL, API key and table names.");
    Ok(())
}

/// Initialize logging based on verbosity settings.
fn init_logging(args: &Args) {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(args.log_level())
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
    }
}

/// Pick the record store and run the requested mode.
async fn run(args: Args) -> Result<()> {
    let mut config = load_config(&args)?;
    config.merge_with_args(&args);

    if let Some(ref path) = args.snapshot {
        let store = SnapshotStore::load(path)?;
        return run_with_store(store, &config, &args).await;
    }

    if config.backend.url.is_empty() {
        anyhow::bail!(
            "No backend configured. Pass --backend-url, set INFORA_BACKEND_URL, \
             add [backend] url to {}, or use --snapshot",
            CONFIG_FILE_NAME
        );
    }

    let store = RestStore::new(config.backend.clone())?;
    run_with_store(store, &config, &args).await
}

async fn run_with_store<S: RecordStore + 'static>(
    store: S,
    config: &Config,
    args: &Args,
) -> Result<()> {
    let service = InventoryService::new(store, config.reports.clone());

    if args.serve {
        return server::run(service, &config.server.bind).await;
    }

    let now = Utc::now();
    let output = match args.report {
        Some(kind) => {
            let filter = ReportFilter {
                from: args.from,
                to: args.to,
                user: args.user.clone(),
            };
            let report = service.report(kind.into(), &filter, now).await?;
            info!("{} report: {} rows", report.kind, report.rows.len());

            match args.format {
                OutputFormat::Json => report::generate_json(&report)?,
                OutputFormat::Markdown => report::generate_report_markdown(&report),
            }
        }
        None => {
            let analytics = service.analytics(now).await?;
            info!(
                "Analytics over {} devices",
                analytics.summary.total_devices
            );

            match args.format {
                OutputFormat::Json => report::generate_json(&analytics)?,
                OutputFormat::Markdown => report::generate_analytics_markdown(&analytics, now),
            }
        }
    };

    write_output(args.output.as_deref(), &output)
}

/// Write to the output file, or stdout when none was given.
fn write_output(path: Option<&Path>, output: &str) -> Result<()> {
    match path {
        Some(path) => {
            std::fs::write(path, output)
                .with_context(|| format!("Failed to write output to {}", path.display()))?;
            info!("Output saved to {}", path.display());
        }
        None => println!("{}", output),
    }
    Ok(())
}

/// Load configuration from file or use defaults.
fn load_config(args: &Args) -> Result<Config> {
    if let Some(ref config_path) = args.config {
        info!("Loading config from: {}", config_path.display());
        return Config::load(config_path);
    }

    match Config::load_default() {
        Ok(Some(config)) => {
            info!("Loaded default config from {}", CONFIG_FILE_NAME);
            Ok(config)
        }
        Ok(None) => {
            debug!("No config file found, using defaults");
            Ok(Config::default())
        }
        Err(e) => {
            warn!("Failed to load config: {}", e);
            Ok(Config::default())
        }
    }
}
