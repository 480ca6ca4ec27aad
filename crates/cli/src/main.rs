//! Benchmark analyzer CLI
//!
//! Reduces load-generator results and Knative autoscaler logs of benchmark
//! runs into per-second series and exports them for plotting.

mod commands;
mod config;
mod output;

use analyzer_lib::MalformedRecordPolicy;
use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::{analyze, inspect};
use std::path::PathBuf;
use tracing::debug;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Benchmark analyzer CLI
#[derive(Parser)]
#[command(name = "bench-analyzer")]
#[command(author, version, about = "Per-second analysis of benchmark runs and autoscaler logs", long_about = None)]
pub struct Cli {
    /// Configuration file (TOML); defaults to ~/.config/bench-analyzer/config.toml
    #[arg(long, env = "BENCH_ANALYZER_CONFIG")]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(long, short, default_value = "table")]
    pub format: output::OutputFormat,

    /// Write logs as JSON
    #[arg(long)]
    pub log_json: bool,

    /// Enable verbose output
    #[arg(long, short)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Analyze every run directory under a root directory
    Analyze {
        /// Directory holding one subdirectory per benchmark run
        #[arg(default_value = ".")]
        root: PathBuf,

        /// Directory to export series to
        #[arg(long, short)]
        output: Option<PathBuf>,

        /// Maximum number of run directories analyzed at once
        #[arg(long, short)]
        jobs: Option<usize>,

        /// What to do with malformed result files (skip, abort)
        #[arg(long)]
        on_malformed_record: Option<MalformedRecordPolicy>,

        /// Write Prometheus-format analysis counters to this file
        #[arg(long)]
        metrics_out: Option<PathBuf>,
    },

    /// Analyze a single run directory
    Inspect {
        /// Run directory
        dir: PathBuf,

        /// Directory to export series to
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
}

fn init_tracing(json: bool, verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_json, cli.verbose);

    let mut settings = config::load(cli.config.as_deref())?;
    debug!(config = ?settings, "Configuration loaded");

    match cli.command {
        Commands::Analyze {
            root,
            output,
            jobs,
            on_malformed_record,
            metrics_out,
        } => {
            if let Some(jobs) = jobs {
                settings.jobs = jobs;
            }
            if let Some(policy) = on_malformed_record {
                settings.on_malformed_record = policy;
            }
            analyze::run_analyze(settings, &root, output, metrics_out, cli.format).await?;
        }
        Commands::Inspect { dir, output } => {
            inspect::inspect_run(settings, &dir, output, cli.format).await?;
        }
    }

    Ok(())
}
