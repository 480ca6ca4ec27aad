//! Analysis of a root directory of benchmark runs

use analyzer_lib::{AnalysisConfig, AnalysisRun, SeriesExporter, StructuredLogger};
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

use crate::output::{print_info, print_reports, print_success, OutputFormat};

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Analyze every run directory under `root`
pub async fn run_analyze(
    config: AnalysisConfig,
    root: &Path,
    output: Option<PathBuf>,
    metrics_out: Option<PathBuf>,
    format: OutputFormat,
) -> Result<()> {
    let logger = StructuredLogger::new(root.display().to_string());
    logger.log_startup(VERSION, config.jobs);

    let run = AnalysisRun::new(config, logger.clone());
    let reports = run
        .analyze_root(root)
        .await
        .with_context(|| format!("Failed to analyze {}", root.display()))?;

    print_reports(&reports, format);

    if let Some(out_dir) = output {
        let exporter = SeriesExporter::new(&out_dir);
        let mut files = 0;
        for report in &reports {
            files += exporter
                .export(report)
                .with_context(|| format!("Failed to export run {}", report.name))?
                .len();
        }
        if matches!(format, OutputFormat::Table) {
            print_success(&format!("Exported {} files to {}", files, out_dir.display()));
        }
    } else if matches!(format, OutputFormat::Table) && !reports.is_empty() {
        print_info("Use --output <dir> to export the series");
    }

    if let Some(path) = metrics_out {
        std::fs::write(&path, run.metrics().render())
            .with_context(|| format!("Failed to write metrics to {}", path.display()))?;
    }

    let failures = reports.iter().map(|r| r.failure_count()).sum();
    logger.log_shutdown(reports.len(), failures);

    Ok(())
}
