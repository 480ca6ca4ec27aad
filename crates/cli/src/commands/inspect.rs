//! Analysis of a single run directory

use analyzer_lib::{AnalysisConfig, AnalysisRun, SeriesExporter, StructuredLogger};
use anyhow::{Context, Result};
use colored::Colorize;
use std::path::{Path, PathBuf};

use crate::output::{format_ms, print_reports, print_success, OutputFormat};

/// Analyze one run directory and print its per-window series
pub async fn inspect_run(
    config: AnalysisConfig,
    dir: &Path,
    output: Option<PathBuf>,
    format: OutputFormat,
) -> Result<()> {
    anyhow::ensure!(dir.is_dir(), "{} is not a directory", dir.display());

    let run = AnalysisRun::new(config, StructuredLogger::new(dir.display().to_string()));
    let task_dir = dir.to_path_buf();
    let report = tokio::task::spawn_blocking(move || run.analyze_directory(&task_dir))
        .await
        .context("Analysis task failed")?;

    print_reports(std::slice::from_ref(&report), format);

    if matches!(format, OutputFormat::Table) {
        if let Some(series) = report.requests.series() {
            println!();
            println!("{}", "Requests per second".bold());
            println!("{}", "-".repeat(40));
            for (window, (count, mean)) in series.counts.iter().zip(&series.means).enumerate() {
                println!("{:>6}  {:>8}  {:>12}", window, count, format_ms(*mean));
            }
        }
        if let Some(series) = report.controller.series() {
            println!();
            println!("{}", "Autoscaler".bold());
            println!("{}", "-".repeat(40));
            for (window, (pods, cc)) in series
                .pod_counts
                .iter()
                .zip(&series.concurrency)
                .enumerate()
            {
                println!("{:>6}  {:>8.2}  {:>12.2}", window, pods, cc);
            }
        }
    }

    if let Some(out_dir) = output {
        let written = SeriesExporter::new(&out_dir)
            .export(&report)
            .with_context(|| format!("Failed to export run {}", report.name))?;
        if matches!(format, OutputFormat::Table) {
            print_success(&format!("Exported {} files to {}", written.len(), out_dir.display()));
        }
    }

    Ok(())
}
