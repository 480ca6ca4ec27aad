//! Core data models for benchmark run analysis

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Key of a one-second window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum WindowKey {
    /// Whole seconds since the start of the run
    Offset(i64),
    /// Local wall-clock time truncated to the second
    WallClock(NaiveDateTime),
}

impl fmt::Display for WindowKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WindowKey::Offset(secs) => write!(f, "{}s", secs),
            WindowKey::WallClock(ts) => write!(f, "{}", ts.format("%Y-%m-%d %H:%M:%S")),
        }
    }
}

/// Layout of a request-result file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestDialect {
    /// `offset` + `response-time` columns (hey)
    Offset,
    /// `timeStamp` + `Latency` columns (JMeter)
    Timestamp,
}

impl RequestDialect {
    /// Column holding the window position of a record
    pub fn key_field(&self) -> &'static str {
        match self {
            RequestDialect::Offset => "offset",
            RequestDialect::Timestamp => "timeStamp",
        }
    }

    /// Column holding the latency of a record
    pub fn latency_field(&self) -> &'static str {
        match self {
            RequestDialect::Offset => "response-time",
            RequestDialect::Timestamp => "Latency",
        }
    }
}

impl fmt::Display for RequestDialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequestDialect::Offset => f.write_str("offset"),
            RequestDialect::Timestamp => f.write_str("timestamp"),
        }
    }
}

/// Interval used to keep controller events inside the benchmark's active period.
///
/// Both bounds are excluded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeRange {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl TimeRange {
    pub fn new(start: NaiveDateTime, end: NaiveDateTime) -> Self {
        Self { start, end }
    }

    /// True when `ts` lies strictly between start and end
    pub fn contains(&self, ts: &NaiveDateTime) -> bool {
        self.start < *ts && *ts < self.end
    }
}

/// One decoded autoscaler event
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ControllerObservation {
    pub timestamp: NaiveDateTime,
    pub pod_count: f64,
    pub stable_concurrency: f64,
}

/// Requests-per-window and mean latency per window, aligned by rank
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResultSeries {
    pub counts: Vec<usize>,
    pub means: Vec<f64>,
}

impl ResultSeries {
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    pub fn push(&mut self, count: usize, mean: f64) {
        self.counts.push(count);
        self.means.push(mean);
    }

    /// Append another series after this one
    pub fn extend(&mut self, other: ResultSeries) {
        self.counts.extend(other.counts);
        self.means.extend(other.means);
    }

    /// Total number of observations across all windows
    pub fn total_count(&self) -> usize {
        self.counts.iter().sum()
    }
}

/// Mean pod count and mean stable concurrency per window, aligned by rank
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ControllerSeries {
    pub pod_counts: Vec<f64>,
    pub concurrency: Vec<f64>,
}

impl ControllerSeries {
    pub fn len(&self) -> usize {
        self.pod_counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pod_counts.is_empty()
    }
}

/// Result of one of the two independent analyses of a run directory
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Outcome<T> {
    Completed { series: T },
    Failed { error: String },
}

impl<T> Outcome<T> {
    pub fn series(&self) -> Option<&T> {
        match self {
            Outcome::Completed { series } => Some(series),
            Outcome::Failed { .. } => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            Outcome::Completed { .. } => None,
            Outcome::Failed { error } => Some(error),
        }
    }

    pub fn is_completed(&self) -> bool {
        matches!(self, Outcome::Completed { .. })
    }
}

/// Non-fatal conditions seen while analyzing a run directory
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunDiagnostics {
    pub request_files: usize,
    pub skipped_request_files: usize,
    pub log_files: usize,
    pub skipped_lines: usize,
    pub unparsable_lines: usize,
}

/// Everything produced for one run directory
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunReport {
    pub name: String,
    pub dialect: RequestDialect,
    pub requests: Outcome<ResultSeries>,
    pub controller: Outcome<ControllerSeries>,
    pub diagnostics: RunDiagnostics,
}

impl RunReport {
    /// Report for a directory whose analysis never ran to completion
    pub fn failed(name: String, dialect: RequestDialect, error: String) -> Self {
        Self {
            name,
            dialect,
            requests: Outcome::Failed {
                error: error.clone(),
            },
            controller: Outcome::Failed { error },
            diagnostics: RunDiagnostics::default(),
        }
    }

    /// Number of failed analyses (0, 1 or 2)
    pub fn failure_count(&self) -> usize {
        [self.requests.is_completed(), self.controller.is_completed()]
            .iter()
            .filter(|completed| !**completed)
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(h: u32, m: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2020, 5, 1)
            .unwrap()
            .and_hms_opt(h, m, s)
            .unwrap()
    }

    #[test]
    fn test_time_range_excludes_bounds() {
        let range = TimeRange::new(at(10, 0, 0), at(10, 5, 0));
        assert!(!range.contains(&at(10, 0, 0)));
        assert!(!range.contains(&at(10, 5, 0)));
        assert!(range.contains(&at(10, 0, 1)));
        assert!(range.contains(&at(10, 4, 59)));
        assert!(!range.contains(&at(9, 59, 59)));
    }

    #[test]
    fn test_outcome_serializes_with_status_tag() {
        let outcome: Outcome<ResultSeries> = Outcome::Failed {
            error: "boom".to_string(),
        };
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["status"], "failed");
        assert_eq!(json["error"], "boom");
    }

    #[test]
    fn test_result_series_extend_keeps_order() {
        let mut first = ResultSeries::default();
        first.push(2, 10.0);
        let mut second = ResultSeries::default();
        second.push(3, 20.0);
        first.extend(second);
        assert_eq!(first.counts, vec![2, 3]);
        assert_eq!(first.means, vec![10.0, 20.0]);
        assert_eq!(first.total_count(), 5);
    }

    #[test]
    fn test_window_key_display() {
        assert_eq!(WindowKey::Offset(7).to_string(), "7s");
        assert_eq!(
            WindowKey::WallClock(at(10, 0, 1)).to_string(),
            "2020-05-01 10:00:01"
        );
    }
}
