//! Analysis of benchmark run directories
//!
//! Each run directory is analyzed twice, independently:
//! - request analysis: result shards → requests/s and mean latency per second
//! - controller analysis: autoscaler logs → pod count and concurrency per second
//!
//! A failure in one analysis is recorded in the report and never stops the
//! other one, or any sibling directory.

use crate::aggregator::WindowAggregator;
use crate::config::{AnalysisConfig, MalformedRecordPolicy};
use crate::error::{AnalyzerError, Result};
use crate::matcher::Matchers;
use crate::models::{
    ControllerSeries, Outcome, RequestDialect, ResultSeries, RunDiagnostics, RunReport,
};
use crate::observability::{AnalyzerMetrics, StructuredLogger};
use crate::parser::{
    BucketParser, ControllerAccumulator, ControllerLogParser, RequestLogParser, SecondBucket,
};
use crate::source::RecordSource;
use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Semaphore;

const REQUEST: &str = "request";
const CONTROLLER: &str = "controller";

/// Request series of one directory with the files that produced it
#[derive(Debug, Clone, Default)]
pub struct RequestAnalysis {
    pub series: ResultSeries,
    pub files: usize,
    pub skipped_files: usize,
}

/// Controller series of one directory with its line diagnostics
#[derive(Debug, Clone, Default)]
pub struct ControllerAnalysis {
    pub series: ControllerSeries,
    pub log_files: usize,
    pub skipped_lines: usize,
    pub unparsable_lines: usize,
}

/// Analyzer for run directories sharing one configuration
#[derive(Clone)]
pub struct AnalysisRun {
    config: AnalysisConfig,
    matchers: Matchers,
    metrics: AnalyzerMetrics,
    logger: StructuredLogger,
}

impl AnalysisRun {
    pub fn new(config: AnalysisConfig, logger: StructuredLogger) -> Self {
        Self {
            matchers: config.matchers(),
            config,
            metrics: AnalyzerMetrics::new(),
            logger,
        }
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    pub fn metrics(&self) -> &AnalyzerMetrics {
        &self.metrics
    }

    /// Run both analyses of `dir` and collect their outcomes
    pub fn analyze_directory(&self, dir: &Path) -> RunReport {
        let started = Instant::now();
        let name = dir_name(dir);
        let dialect = self.matchers.dialect_for(dir);
        let mut diagnostics = RunDiagnostics::default();

        let requests = match self.analyze_requests(dir, dialect) {
            Ok(analysis) => {
                diagnostics.request_files = analysis.files;
                diagnostics.skipped_request_files = analysis.skipped_files;
                Outcome::Completed {
                    series: analysis.series,
                }
            }
            Err(e) => self.failed(&name, REQUEST, e),
        };

        let controller = match self.analyze_controller(dir) {
            Ok(analysis) => {
                diagnostics.log_files = analysis.log_files;
                diagnostics.skipped_lines = analysis.skipped_lines;
                diagnostics.unparsable_lines = analysis.unparsable_lines;
                Outcome::Completed {
                    series: analysis.series,
                }
            }
            Err(e) => self.failed(&name, CONTROLLER, e),
        };

        let elapsed = started.elapsed().as_secs_f64();
        self.metrics.observe_analysis_duration(elapsed);
        self.logger.log_run_completed(
            &name,
            requests.series().map(ResultSeries::len),
            controller.series().map(ControllerSeries::len),
            elapsed,
        );

        RunReport {
            name,
            dialect,
            requests,
            controller,
            diagnostics,
        }
    }

    /// Reduce every result shard of `dir`, concatenating per-shard series
    pub fn analyze_requests(&self, dir: &Path, dialect: RequestDialect) -> Result<RequestAnalysis> {
        let parser = RequestLogParser::new(dialect);
        let files = record_source(dialect).list(dir, &self.config.request_extension)?;

        let mut analysis = RequestAnalysis::default();
        for path in files {
            match parser.parse_file(&path, SecondBucket::new()) {
                Ok(bucket) => {
                    let series = WindowAggregator::reduce(&bucket);
                    self.metrics.inc_files_parsed(REQUEST);
                    self.metrics.add_windows(REQUEST, series.len());
                    self.logger.log_file_parsed(REQUEST, &path, series.len());
                    analysis.series.extend(series);
                    analysis.files += 1;
                }
                Err(e) if self.skippable(&e) => {
                    self.metrics.inc_files_skipped(REQUEST);
                    self.logger.log_file_skipped(REQUEST, &path, &e.to_string());
                    analysis.skipped_files += 1;
                }
                Err(e) => return Err(e),
            }
        }

        Ok(analysis)
    }

    /// Load the time range, then merge every log file of `dir` into one series
    pub fn analyze_controller(&self, dir: &Path) -> Result<ControllerAnalysis> {
        let range = ControllerLogParser::load_time_range(&dir.join(&self.config.time_range_file))?;
        let parser = ControllerLogParser::new(range);
        let files = RecordSource::Unordered.list(dir, &self.config.log_extension)?;

        let mut acc = ControllerAccumulator::new();
        let mut log_files = 0;
        for path in files
            .iter()
            .filter(|p| !self.is_time_range_file(p))
        {
            acc = parser.parse_file(path, acc)?;
            log_files += 1;
            self.metrics.inc_files_parsed(CONTROLLER);
            self.logger.log_file_parsed(CONTROLLER, path, acc.len());
        }

        self.metrics.add_log_lines(acc.skipped_lines, acc.unparsable_lines);
        self.logger
            .log_lines_skipped(&dir_name(dir), acc.skipped_lines, acc.unparsable_lines);

        let series = WindowAggregator::reduce_controller(&acc);
        self.metrics.add_windows(CONTROLLER, series.len());

        Ok(ControllerAnalysis {
            series,
            log_files,
            skipped_lines: acc.skipped_lines,
            unparsable_lines: acc.unparsable_lines,
        })
    }

    /// Analyze every run directory under `root` on the blocking pool.
    ///
    /// At most `jobs` directories are analyzed at once. Reports come back in
    /// directory-name order.
    pub async fn analyze_root(&self, root: &Path) -> Result<Vec<RunReport>> {
        let directories = list_run_directories(root)?;
        let permits = Arc::new(Semaphore::new(self.config.jobs.max(1)));

        let mut handles = Vec::with_capacity(directories.len());
        for dir in directories {
            let permit = Arc::clone(&permits)
                .acquire_owned()
                .await
                .map_err(|e| AnalyzerError::Worker(e.to_string()))?;
            let run = self.clone();
            let task_dir = dir.clone();
            let handle = tokio::task::spawn_blocking(move || {
                let _permit = permit;
                run.analyze_directory(&task_dir)
            });
            handles.push((dir, handle));
        }

        let mut reports = Vec::with_capacity(handles.len());
        for (dir, handle) in handles {
            match handle.await {
                Ok(report) => reports.push(report),
                Err(e) => {
                    let name = dir_name(&dir);
                    let error = format!("worker task failed: {}", e);
                    self.logger.log_analysis_failed(&name, "directory", &error);
                    reports.push(RunReport::failed(
                        name,
                        self.matchers.dialect_for(&dir),
                        error,
                    ));
                }
            }
        }

        Ok(reports)
    }

    fn is_time_range_file(&self, path: &Path) -> bool {
        path.file_name() == Some(OsStr::new(&self.config.time_range_file))
            || self.matchers.is_time_range_file(path)
    }

    fn skippable(&self, error: &AnalyzerError) -> bool {
        self.config.on_malformed_record == MalformedRecordPolicy::Skip
            && matches!(
                error,
                AnalyzerError::MalformedRecord { .. } | AnalyzerError::Csv { .. }
            )
    }

    fn failed<T>(&self, directory: &str, analysis: &str, error: AnalyzerError) -> Outcome<T> {
        let error = error.to_string();
        self.metrics.inc_analyses_failed(analysis);
        self.logger.log_analysis_failed(directory, analysis, &error);
        Outcome::Failed { error }
    }
}

/// Hey shards are numbered and read in order; JMeter output is not
fn record_source(dialect: RequestDialect) -> RecordSource {
    match dialect {
        RequestDialect::Offset => RecordSource::NumericSuffix,
        RequestDialect::Timestamp => RecordSource::Unordered,
    }
}

/// Immediate, non-hidden subdirectories of `root`, sorted by name
pub fn list_run_directories(root: &Path) -> Result<Vec<PathBuf>> {
    let entries = fs::read_dir(root).map_err(|e| AnalyzerError::io(root, e))?;

    let mut directories = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| AnalyzerError::io(root, e))?;
        let path = entry.path();
        if path.is_dir() && !entry.file_name().to_string_lossy().starts_with('.') {
            directories.push(path);
        }
    }

    directories.sort();
    Ok(directories)
}

fn dir_name(dir: &Path) -> String {
    dir.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| dir.display().to_string())
}
