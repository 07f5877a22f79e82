//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use crate::report::ReportKind;
use chrono::NaiveDate;
use clap::Parser;
use std::path::PathBuf;

/// Infora - IT asset inventory analytics
///
/// Computes dashboard analytics and inventory reports from the device
/// records held in the hosted backend, or serves them over HTTP.
///
/// Examples:
///   infora --backend-url https://project.example.co --api-key KEY
///   infora --snapshot ./inventory.json --format markdown
///   infora --report warranty --output warranty.md --format markdown
///   infora --report operations --from 2026-01-01 --to 2026-06-30
///   infora --serve --bind 0.0.0.0:3000
///   infora --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Base URL of the hosted backend
    #[arg(long, value_name = "URL", env = "INFORA_BACKEND_URL")]
    pub backend_url: Option<String>,

    /// API key for the hosted backend
    #[arg(long, value_name = "KEY", env = "INFORA_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Read records from a JSON snapshot instead of the backend
    ///
    /// The file holds `devices`, `device_requests` and `issue_reports` arrays.
    #[arg(long, value_name = "FILE")]
    pub snapshot: Option<PathBuf>,

    /// Path to configuration file
    ///
    /// If not specified, looks for .infora.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Render an inventory report instead of the analytics document
    #[arg(long, value_name = "KIND")]
    pub report: Option<ReportKindArg>,

    /// Earliest creation date for the operations report (inclusive)
    #[arg(long, value_name = "DATE")]
    pub from: Option<NaiveDate>,

    /// Latest creation date for the operations report (inclusive)
    #[arg(long, value_name = "DATE")]
    pub to: Option<NaiveDate>,

    /// User email for the user-devices report
    #[arg(long, value_name = "EMAIL")]
    pub user: Option<String>,

    /// Warranty period in years for the warranty report
    #[arg(long, value_name = "YEARS")]
    pub warranty_years: Option<u32>,

    /// Output format (json, markdown)
    #[arg(long, default_value = "json", value_name = "FORMAT")]
    pub format: OutputFormat,

    /// Write output to a file instead of stdout
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Run the HTTP API server
    #[arg(long)]
    pub serve: bool,

    /// Address for the HTTP API server
    #[arg(long, value_name = "ADDR")]
    pub bind: Option<String>,

    /// Backend request timeout in seconds
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (minimal output)
    #[arg(short, long)]
    pub quiet: bool,

    /// Generate a default .infora.toml configuration file
    #[arg(long)]
    pub init_config: bool,
}

/// Output format for analytics and reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON format (default)
    #[default]
    Json,
    /// Markdown format
    Markdown,
}

/// Report selection for --report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ReportKindArg {
    Operations,
    AssetsUsers,
    UserDevices,
    Stock,
    Warranty,
}

impl From<ReportKindArg> for ReportKind {
    fn from(arg: ReportKindArg) -> Self {
        match arg {
            ReportKindArg::Operations => ReportKind::Operations,
            ReportKindArg::AssetsUsers => ReportKind::AssetsUsers,
            ReportKindArg::UserDevices => ReportKind::UserDevices,
            ReportKindArg::Stock => ReportKind::Stock,
            ReportKindArg::Warranty => ReportKind::Warranty,
        }
    }
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        // Skip validation for --init-config
        if self.init_config {
            return Ok(());
        }

        if let Some(ref url) = self.backend_url {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err("Backend URL must start with 'http://' or 'https://'".to_string());
            }
        }

        if let Some(ref snapshot) = self.snapshot {
            if !snapshot.is_file() {
                return Err(format!(
                    "Snapshot file does not exist: {}",
                    snapshot.display()
                ));
            }
        }

        // Check for conflicting options
        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        if self.serve && self.report.is_some() {
            return Err("Cannot use both --serve and --report".to_string());
        }

        if let Some(timeout) = self.timeout {
            if timeout == 0 {
                return Err("Timeout must be at least 1 second".to_string());
            }
        }

        if let (Some(from), Some(to)) = (self.from, self.to) {
            if from > to {
                return Err("--from must not be after --to".to_string());
            }
        }

        if self.warranty_years == Some(0) {
            return Err("Warranty period must be at least 1 year".to_string());
        }

        Ok(())
    }

    /// Returns the log level based on verbosity settings.
    pub fn log_level(&self) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_args() -> Args {
        Args {
            backend_url: Some("https://project.example.co".to_string()),
            api_key: Some("key".to_string()),
            snapshot: None,
            config: None,
            report: None,
            from: None,
            to: None,
            user: None,
            warranty_years: None,
            format: OutputFormat::Json,
            output: None,
            serve: false,
            bind: None,
            timeout: None,
            verbose: false,
            quiet: false,
            init_config: false,
        }
    }

    #[test]
    fn test_parse_report_flags() {
        let args = Args::try_parse_from([
            "infora",
            "--snapshot",
            "inv.json",
            "--report",
            "assets-users",
            "--from",
            "2026-01-01",
            "--format",
            "markdown",
        ])
        .unwrap();

        assert_eq!(args.report, Some(ReportKindArg::AssetsUsers));
        assert_eq!(args.from, NaiveDate::from_ymd_opt(2026, 1, 1));
        assert_eq!(args.format, OutputFormat::Markdown);
        assert_eq!(ReportKind::from(ReportKindArg::AssetsUsers), ReportKind::AssetsUsers);
    }

    #[test]
    fn test_validation_invalid_url() {
        let mut args = make_args();
        args.backend_url = Some("project.example.co".to_string());
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_validation_conflicting_options() {
        let mut args = make_args();
        args.verbose = true;
        args.quiet = true;
        assert!(args.validate().is_err());

        let mut args = make_args();
        args.serve = true;
        args.report = Some(ReportKindArg::Stock);
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_validation_date_range() {
        let mut args = make_args();
        args.from = NaiveDate::from_ymd_opt(2026, 6, 1);
        args.to = NaiveDate::from_ymd_opt(2026, 1, 1);
        assert!(args.validate().is_err());

        args.to = NaiveDate::from_ymd_opt(2026, 6, 1);
        assert!(args.validate().is_ok());
    }

    #[test]
    fn test_log_level() {
        let mut args = make_args();
        assert_eq!(args.log_level(), tracing::Level::INFO);

        args.verbose = true;
        assert_eq!(args.log_level(), tracing::Level::DEBUG);

        args.verbose = false;
        args.quiet = true;
        assert_eq!(args.log_level(), tracing::Level::ERROR);
    }
}
