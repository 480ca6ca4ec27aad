//! Observability infrastructure for the analyzer
//!
//! Provides:
//! - Prometheus counters (files parsed, records, skipped lines, failed analyses)
//! - Structured logging of analysis events with tracing

use prometheus::{
    register_histogram, register_int_counter, register_int_counter_vec, Encoder, Histogram,
    IntCounter, IntCounterVec, TextEncoder,
};
use std::path::Path;
use std::sync::OnceLock;
use tracing::{debug, info, warn};

/// Histogram buckets for per-directory analysis time (in seconds)
const ANALYSIS_BUCKETS: &[f64] = &[0.001, 0.005, 0.01, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0];

/// Global metrics instance (registered once)
static GLOBAL_METRICS: OnceLock<AnalyzerMetricsInner> = OnceLock::new();

struct AnalyzerMetricsInner {
    files_parsed: IntCounterVec,
    files_skipped: IntCounterVec,
    windows_emitted: IntCounterVec,
    lines_skipped: IntCounter,
    lines_unparsable: IntCounter,
    analyses_failed: IntCounterVec,
    analysis_duration_seconds: Histogram,
}

impl AnalyzerMetricsInner {
    fn new() -> Self {
        Self {
            files_parsed: register_int_counter_vec!(
                "bench_analyzer_files_parsed_total",
                "Input files parsed, by kind",
                &["kind"]
            )
            .expect("Failed to register files_parsed"),

            files_skipped: register_int_counter_vec!(
                "bench_analyzer_files_skipped_total",
                "Input files dropped because of malformed content, by kind",
                &["kind"]
            )
            .expect("Failed to register files_skipped"),

            windows_emitted: register_int_counter_vec!(
                "bench_analyzer_windows_emitted_total",
                "Non-empty windows written to result series, by kind",
                &["kind"]
            )
            .expect("Failed to register windows_emitted"),

            lines_skipped: register_int_counter!(
                "bench_analyzer_log_lines_skipped_total",
                "Controller log lines that were not JSON"
            )
            .expect("Failed to register lines_skipped"),

            lines_unparsable: register_int_counter!(
                "bench_analyzer_log_lines_unparsable_total",
                "Controller log lines whose fields could not be decoded"
            )
            .expect("Failed to register lines_unparsable"),

            analyses_failed: register_int_counter_vec!(
                "bench_analyzer_analyses_failed_total",
                "Directory analyses that failed, by analysis",
                &["analysis"]
            )
            .expect("Failed to register analyses_failed"),

            analysis_duration_seconds: register_histogram!(
                "bench_analyzer_directory_duration_seconds",
                "Time spent analyzing one run directory",
                ANALYSIS_BUCKETS.to_vec()
            )
            .expect("Failed to register analysis_duration_seconds"),
        }
    }
}

/// Analyzer metrics for Prometheus exposition
///
/// Lightweight handle to the global metrics instance; clones share it.
#[derive(Clone)]
pub struct AnalyzerMetrics {
    _private: (),
}

impl Default for AnalyzerMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl AnalyzerMetrics {
    pub fn new() -> Self {
        GLOBAL_METRICS.get_or_init(AnalyzerMetricsInner::new);
        Self { _private: () }
    }

    fn inner(&self) -> &AnalyzerMetricsInner {
        GLOBAL_METRICS.get_or_init(AnalyzerMetricsInner::new)
    }

    pub fn inc_files_parsed(&self, kind: &str) {
        self.inner().files_parsed.with_label_values(&[kind]).inc();
    }

    pub fn inc_files_skipped(&self, kind: &str) {
        self.inner().files_skipped.with_label_values(&[kind]).inc();
    }

    pub fn add_windows(&self, kind: &str, windows: usize) {
        self.inner()
            .windows_emitted
            .with_label_values(&[kind])
            .inc_by(windows as u64);
    }

    pub fn add_log_lines(&self, skipped: usize, unparsable: usize) {
        self.inner().lines_skipped.inc_by(skipped as u64);
        self.inner().lines_unparsable.inc_by(unparsable as u64);
    }

    pub fn inc_analyses_failed(&self, analysis: &str) {
        self.inner()
            .analyses_failed
            .with_label_values(&[analysis])
            .inc();
    }

    pub fn observe_analysis_duration(&self, duration_secs: f64) {
        self.inner().analysis_duration_seconds.observe(duration_secs);
    }

    /// Render every registered metric in the Prometheus text format
    pub fn render(&self) -> String {
        let mut buffer = Vec::new();
        if let Err(e) = TextEncoder::new().encode(&prometheus::gather(), &mut buffer) {
            warn!(error = %e, "Failed to encode metrics");
            return String::new();
        }
        String::from_utf8_lossy(&buffer).into_owned()
    }
}

/// Structured logger for analysis events
///
/// Emits named events with consistent fields so a run can be followed in
/// JSON logs.
#[derive(Clone)]
pub struct StructuredLogger {
    root: String,
}

impl StructuredLogger {
    pub fn new(root: impl Into<String>) -> Self {
        Self { root: root.into() }
    }

    pub fn log_startup(&self, version: &str, jobs: usize) {
        info!(
            event = "analyzer_started",
            root = %self.root,
            version = %version,
            jobs = jobs,
            "Benchmark analyzer started"
        );
    }

    pub fn log_file_parsed(&self, kind: &str, path: &Path, windows: usize) {
        debug!(
            event = "file_parsed",
            root = %self.root,
            kind = %kind,
            path = %path.display(),
            windows = windows,
            "Parsed input file"
        );
    }

    pub fn log_file_skipped(&self, kind: &str, path: &Path, error: &str) {
        warn!(
            event = "file_skipped",
            root = %self.root,
            kind = %kind,
            path = %path.display(),
            error = %error,
            "Skipping malformed input file"
        );
    }

    pub fn log_lines_skipped(&self, directory: &str, skipped: usize, unparsable: usize) {
        if skipped == 0 && unparsable == 0 {
            return;
        }
        info!(
            event = "line_skipped",
            root = %self.root,
            directory = %directory,
            non_json = skipped,
            unparsable = unparsable,
            "Skipped controller log lines"
        );
    }

    pub fn log_analysis_failed(&self, directory: &str, analysis: &str, error: &str) {
        warn!(
            event = "analysis_failed",
            root = %self.root,
            directory = %directory,
            analysis = %analysis,
            error = %error,
            "Analysis failed, continuing with the rest of the run"
        );
    }

    pub fn log_run_completed(
        &self,
        directory: &str,
        request_windows: Option<usize>,
        controller_windows: Option<usize>,
        duration_secs: f64,
    ) {
        info!(
            event = "run_completed",
            root = %self.root,
            directory = %directory,
            request_windows = ?request_windows,
            controller_windows = ?controller_windows,
            duration_secs = duration_secs,
            "Run directory analyzed"
        );
    }

    pub fn log_shutdown(&self, directories: usize, failures: usize) {
        info!(
            event = "analyzer_finished",
            root = %self.root,
            directories = directories,
            failures = failures,
            "Benchmark analyzer finished"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_render_includes_counters() {
        let metrics = AnalyzerMetrics::new();
        metrics.inc_files_parsed("request");
        metrics.add_windows("request", 3);
        metrics.add_log_lines(2, 1);
        metrics.inc_analyses_failed("controller");
        metrics.observe_analysis_duration(0.02);

        let text = metrics.render();
        assert!(text.contains("bench_analyzer_files_parsed_total"));
        assert!(text.contains("bench_analyzer_log_lines_skipped_total"));
        assert!(text.contains("bench_analyzer_analyses_failed_total"));
    }

    #[test]
    fn test_structured_logger_creation() {
        let logger = StructuredLogger::new("/runs");
        assert_eq!(logger.root, "/runs");
    }
}
