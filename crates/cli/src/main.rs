//! Commodity Change Analyzer CLI
//!
//! Summarizes CPU and memory resize actions per workload and builds
//! time-bucketed trend series from action exports.

mod commands;
mod config;
mod output;

use analyzer_lib::Verbosity;
use anyhow::Result;
use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};
use commands::{buckets, summary, RunContext};
use std::path::PathBuf;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::output::{print_warning, OutputFormat};

/// Commodity Change Analyzer CLI
#[derive(Parser)]
#[command(name = "cca")]
#[command(author, version, about = "Commodity Change Analyzer for resize action exports", long_about = None)]
pub struct Cli {
    /// Output format (defaults to the config file value, then table)
    #[arg(long, short, global = true)]
    pub format: Option<OutputFormat>,

    /// Increase log verbosity (-v shows skipped rows, -vv debug)
    #[arg(long, short, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Only print errors
    #[arg(long, short, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Emit logs as JSON lines on stderr
    #[arg(long, global = true)]
    pub log_json: bool,

    /// Config file (defaults to ~/.config/cca/config.json)
    #[arg(long, env = "CCA_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Oldest-vs-newest commodity changes per workload
    Summary(SummaryArgs),

    /// Sum per-action changes into fixed-width time buckets
    Buckets(BucketsArgs),
}

/// Record filters shared by both subcommands
#[derive(Args, Debug, Clone, Default)]
pub struct FilterArgs {
    /// Filter by cluster; repeatable, full ("Kubernetes-prod") or short ("prod") names
    #[arg(long = "cluster", value_name = "CLUSTER")]
    pub clusters: Vec<String>,

    /// Filter by namespace; repeatable, supports wildcards ("app-*")
    #[arg(long = "namespace", value_name = "PATTERN")]
    pub namespaces: Vec<String>,

    /// Only actions created at or after this time ("01 Sep 2025 00:00")
    #[arg(long, value_name = "DATE")]
    pub from: Option<String>,

    /// Only actions created at or before this time ("30 Sep 2025 23:59")
    #[arg(long, value_name = "DATE")]
    pub to: Option<String>,
}

#[derive(Args, Debug, Clone)]
pub struct SummaryArgs {
    /// Action export CSV
    pub csv_file: PathBuf,

    #[command(flatten)]
    pub filters: FilterArgs,

    /// Only keep workloads with actions in the last N days of the export
    #[arg(long)]
    pub conservative: bool,

    /// Lookback for --conservative (default 14)
    #[arg(long, value_name = "DAYS", requires = "conservative")]
    pub conservative_days: Option<u32>,

    /// Show every workload in the detailed table
    #[arg(long)]
    pub show_all: bool,

    /// Rows in the detailed table (default 10)
    #[arg(long, value_name = "N", conflicts_with = "show_all")]
    pub top: Option<usize>,

    /// List the actions behind each workload's changes
    #[arg(long)]
    pub show_actions: bool,

    /// Write the text report to a file instead of stdout
    #[arg(long, short = 'r', value_name = "FILE")]
    pub output_report: Option<PathBuf>,

    /// Export the full summary as CSV
    #[arg(long, short = 'c', value_name = "FILE")]
    pub output_csv: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
pub struct BucketsArgs {
    /// Action export CSV
    pub csv_file: PathBuf,

    /// Output CSV for the bucket series
    #[arg(long, short = 'o', value_name = "FILE")]
    pub output: PathBuf,

    /// Write a text summary report to this file
    #[arg(long, short = 'r', value_name = "FILE")]
    pub report: Option<PathBuf>,

    /// Bucket width: days ("7") or a duration ("7d", "24h", "2h 30m")
    #[arg(long, value_name = "SIZE")]
    pub bucket_size: Option<String>,

    #[command(flatten)]
    pub filters: FilterArgs,
}

impl Cli {
    fn verbosity(&self) -> Verbosity {
        if self.quiet {
            Verbosity::Quiet
        } else if self.verbose > 0 {
            Verbosity::Verbose
        } else {
            Verbosity::Normal
        }
    }

    fn log_level(&self) -> &'static str {
        match (self.quiet, self.verbose) {
            (true, _) => "error",
            (false, 0) => "warn",
            (false, 1) => "info",
            _ => "debug",
        }
    }
}

/// Install the tracing subscriber on stderr; `RUST_LOG` overrides the level
fn init_tracing(cli: &Cli) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(cli.log_level()));
    let registry = tracing_subscriber::registry().with(filter);

    if cli.log_json {
        registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
            .init();
    }
}

fn resolve_format(cli: &Cli, defaults: &config::Config) -> OutputFormat {
    if let Some(format) = cli.format {
        return format;
    }
    match defaults.format.as_deref() {
        Some(raw) => OutputFormat::from_str(raw, true).unwrap_or_else(|_| {
            print_warning(&format!("Ignoring unknown format '{}' in configuration", raw));
            OutputFormat::default()
        }),
        None => OutputFormat::default(),
    }
}

fn run(cli: Cli) -> Result<()> {
    let defaults = config::Config::load(cli.config.as_deref())?;
    let ctx = RunContext {
        format: resolve_format(&cli, &defaults),
        verbosity: cli.verbosity(),
        defaults,
    };

    match &cli.command {
        Commands::Summary(args) => summary::run(args, &ctx),
        Commands::Buckets(args) => buckets::run(args, &ctx),
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli);
    run(cli)
}
