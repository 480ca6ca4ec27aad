//! Output formatting utilities

use analyzer_lib::{Outcome, RunReport};
use clap::ValueEnum;
use colored::Colorize;
use tabled::{settings::Style, Table, Tabled};

/// Output format for CLI commands
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum OutputFormat {
    /// Table format (default)
    #[default]
    Table,
    /// JSON format
    Json,
}

/// Row of the run summary table
#[derive(Tabled)]
struct RunRow {
    #[tabled(rename = "Run")]
    name: String,
    #[tabled(rename = "Tool")]
    tool: String,
    #[tabled(rename = "Requests")]
    requests: String,
    #[tabled(rename = "Peak RPS")]
    peak_rps: String,
    #[tabled(rename = "Mean Latency")]
    mean_latency: String,
    #[tabled(rename = "Mean Pods")]
    mean_pods: String,
    #[tabled(rename = "Mean Concurrency")]
    mean_concurrency: String,
    #[tabled(rename = "Status")]
    status: String,
}

impl From<&RunReport> for RunRow {
    fn from(report: &RunReport) -> Self {
        let (requests, peak_rps, mean_latency) = match report.requests.series() {
            Some(series) if !series.is_empty() => {
                let total = series.total_count();
                let weighted: f64 = series
                    .counts
                    .iter()
                    .zip(&series.means)
                    .map(|(count, mean)| *count as f64 * mean)
                    .sum();
                let peak = series.counts.iter().max().copied().unwrap_or(0);
                (
                    total.to_string(),
                    peak.to_string(),
                    format_ms(weighted / total as f64),
                )
            }
            Some(_) => ("0".to_string(), "-".to_string(), "-".to_string()),
            None => ("-".to_string(), "-".to_string(), "-".to_string()),
        };

        let (mean_pods, mean_concurrency) = match report.controller.series() {
            Some(series) if !series.is_empty() => (
                format!("{:.2}", average(&series.pod_counts)),
                format!("{:.2}", average(&series.concurrency)),
            ),
            _ => ("-".to_string(), "-".to_string()),
        };

        Self {
            name: report.name.clone(),
            tool: report.dialect.to_string(),
            requests,
            peak_rps,
            mean_latency,
            mean_pods,
            mean_concurrency,
            status: run_status(report),
        }
    }
}

/// Print run reports as a table followed by failures, or as JSON
pub fn print_reports(reports: &[RunReport], format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            if let Ok(json) = serde_json::to_string_pretty(reports) {
                println!("{}", json);
            }
        }
        OutputFormat::Table => {
            if reports.is_empty() {
                println!("{}", "No run directories found".yellow());
                return;
            }

            let rows: Vec<RunRow> = reports.iter().map(RunRow::from).collect();
            let table = Table::new(rows).with(Style::rounded()).to_string();
            println!("{}", table);

            for report in reports {
                print_failure(&report.name, "requests", &report.requests);
                print_failure(&report.name, "controller", &report.controller);
            }
        }
    }
}

fn print_failure<T>(run: &str, analysis: &str, outcome: &Outcome<T>) {
    if let Some(error) = outcome.error() {
        print_warning(&format!("{} ({}): {}", run, analysis, error));
    }
}

fn run_status(report: &RunReport) -> String {
    let status = match report.failure_count() {
        0 => "complete",
        2 => "failed",
        _ => "partial",
    };
    color_status(status)
}

/// Print a success message
pub fn print_success(message: &str) {
    println!("{} {}", "✓".green().bold(), message);
}

/// Print a warning message
pub fn print_warning(message: &str) {
    println!("{} {}", "⚠".yellow().bold(), message);
}

/// Print an info message
pub fn print_info(message: &str) {
    println!("{} {}", "ℹ".blue().bold(), message);
}

/// Format milliseconds for display
pub fn format_ms(ms: f64) -> String {
    if ms >= 1000.0 {
        format!("{:.2}s", ms / 1000.0)
    } else {
        format!("{:.2}ms", ms)
    }
}

/// Color status based on value
pub fn color_status(status: &str) -> String {
    match status {
        "complete" => status.green().to_string(),
        "partial" => status.yellow().to_string(),
        "failed" => status.red().to_string(),
        _ => status.to_string(),
    }
}

fn average(values: &[f64]) -> f64 {
    analyzer_lib::aggregator::mean(values).unwrap_or(0.0)
}
