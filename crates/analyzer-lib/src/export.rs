//! Series export for archival and plotting
//!
//! For a run named `<run>` the exporter writes:
//! - `<run>-requests.csv`: window, count, mean latency
//! - `<run>-controller.csv`: window, mean pod count, mean concurrency
//! - `<run>.json`: the whole report, including failed analyses
//!
//! CSV values are written at full precision so they parse back to the same `f64`.

use crate::error::{AnalyzerError, Result};
use crate::models::{ControllerSeries, ResultSeries, RunReport};
use csv::Writer;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use tracing::debug;

pub struct SeriesExporter {
    out_dir: PathBuf,
}

impl SeriesExporter {
    pub fn new(out_dir: impl Into<PathBuf>) -> Self {
        Self {
            out_dir: out_dir.into(),
        }
    }

    /// Write every available artifact of `report`, returning the written paths
    pub fn export(&self, report: &RunReport) -> Result<Vec<PathBuf>> {
        fs::create_dir_all(&self.out_dir).map_err(|e| AnalyzerError::io(&self.out_dir, e))?;

        let mut written = Vec::new();

        if let Some(series) = report.requests.series() {
            let path = self.out_dir.join(format!("{}-requests.csv", report.name));
            write_requests(&path, series)?;
            written.push(path);
        }

        if let Some(series) = report.controller.series() {
            let path = self.out_dir.join(format!("{}-controller.csv", report.name));
            write_controller(&path, series)?;
            written.push(path);
        }

        let path = self.out_dir.join(format!("{}.json", report.name));
        let json = serde_json::to_string_pretty(report)?;
        fs::write(&path, json).map_err(|e| AnalyzerError::io(&path, e))?;
        written.push(path);

        debug!(run = %report.name, files = written.len(), "Exported run report");
        Ok(written)
    }
}

fn write_requests(path: &Path, series: &ResultSeries) -> Result<()> {
    let mut wtr = writer(path)?;
    let csv_err = |source| AnalyzerError::Csv {
        path: path.to_path_buf(),
        source,
    };

    wtr.write_record(["window", "count", "mean_latency_ms"])
        .map_err(csv_err)?;
    for (window, (count, mean)) in series.counts.iter().zip(&series.means).enumerate() {
        wtr.write_record(&[window.to_string(), count.to_string(), mean.to_string()])
            .map_err(csv_err)?;
    }

    wtr.flush().map_err(|e| AnalyzerError::io(path, e))
}

fn write_controller(path: &Path, series: &ControllerSeries) -> Result<()> {
    let mut wtr = writer(path)?;
    let csv_err = |source| AnalyzerError::Csv {
        path: path.to_path_buf(),
        source,
    };

    wtr.write_record(["window", "pod_count", "concurrency"])
        .map_err(csv_err)?;
    for (window, (pods, concurrency)) in series
        .pod_counts
        .iter()
        .zip(&series.concurrency)
        .enumerate()
    {
        wtr.write_record(&[
            window.to_string(),
            pods.to_string(),
            concurrency.to_string(),
        ])
        .map_err(csv_err)?;
    }

    wtr.flush().map_err(|e| AnalyzerError::io(path, e))
}

fn writer(path: &Path) -> Result<Writer<File>> {
    let file = File::create(path).map_err(|e| AnalyzerError::io(path, e))?;
    Ok(Writer::from_writer(file))
}
