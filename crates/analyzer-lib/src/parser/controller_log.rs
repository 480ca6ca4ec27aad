//! Knative autoscaler log parsing
//!
//! Each line of a controller log is an independent JSON object with a `ts`
//! timestamp and a `msg` made of `Key=Value` pairs. Only the lines reporting
//! `ObservedStableValue` are kept, restricted to the benchmark's time range.

use super::BucketParser;
use crate::error::{AnalyzerError, Result};
use crate::models::{ControllerObservation, TimeRange};
use chrono::NaiveDateTime;
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::fs::{self, File};
use std::io::{BufRead, BufReader};
use std::path::Path;
use tracing::{debug, warn};

/// Message key marking an autoscaler observation
pub const OBSERVED_STABLE_VALUE: &str = "ObservedStableValue";

/// Message key carrying the replica count
pub const POD_COUNT: &str = "PodCount";

/// Format of both the time-range file and truncated log timestamps
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Observations that share one timestamp
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ControllerWindow {
    pub pod_counts: Vec<f64>,
    pub concurrency: Vec<f64>,
}

/// Observations accumulated across every log file of a run directory
#[derive(Debug, Clone, Default)]
pub struct ControllerAccumulator {
    windows: BTreeMap<NaiveDateTime, ControllerWindow>,
    /// Lines that were not JSON
    pub skipped_lines: usize,
    /// JSON lines whose timestamp or values could not be decoded
    pub unparsable_lines: usize,
}

impl ControllerAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an observation to the window of its timestamp
    pub fn record(&mut self, observation: ControllerObservation) {
        let window = self.windows.entry(observation.timestamp).or_default();
        window.pod_counts.push(observation.pod_count);
        window.concurrency.push(observation.stable_concurrency);
    }

    /// Windows in chronological order
    pub fn windows(&self) -> &BTreeMap<NaiveDateTime, ControllerWindow> {
        &self.windows
    }

    pub fn get(&self, ts: &NaiveDateTime) -> Option<&ControllerWindow> {
        self.windows.get(ts)
    }

    pub fn len(&self) -> usize {
        self.windows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.windows.is_empty()
    }

    /// Total number of recorded observations
    pub fn observation_count(&self) -> usize {
        self.windows.values().map(|w| w.pod_counts.len()).sum()
    }
}

/// What a single log line turned out to be
#[derive(Debug, PartialEq)]
enum LineEvent {
    NotJson,
    Unparsable(String),
    Ignored,
    Observation(ControllerObservation),
}

/// Parser for autoscaler logs, bound to one time range
#[derive(Debug, Clone, Copy)]
pub struct ControllerLogParser {
    range: TimeRange,
}

impl ControllerLogParser {
    pub fn new(range: TimeRange) -> Self {
        Self { range }
    }

    /// Load the time range from a two-line `YYYY-MM-DD HH:MM:SS` file
    pub fn load_time_range(path: &Path) -> Result<TimeRange> {
        let content = fs::read_to_string(path).map_err(|e| AnalyzerError::MissingTimeRange {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        Self::parse_time_range(&content, path)
    }

    /// Parse time-range file content. Reading stops at the first blank line.
    pub fn parse_time_range(content: &str, path: &Path) -> Result<TimeRange> {
        let missing = |reason: String| AnalyzerError::MissingTimeRange {
            path: path.to_path_buf(),
            reason,
        };

        let mut bounds = Vec::with_capacity(2);
        for line in content.lines().map(str::trim_end) {
            if line.is_empty() {
                break;
            }
            let ts = NaiveDateTime::parse_from_str(line, TIMESTAMP_FORMAT)
                .map_err(|e| missing(format!("{:?}: {}", line, e)))?;
            bounds.push(ts);
        }

        match bounds.as_slice() {
            [start, end, ..] => Ok(TimeRange::new(*start, *end)),
            _ => Err(missing(format!(
                "expected two timestamps, found {}",
                bounds.len()
            ))),
        }
    }

    /// Parse log content into `acc`. `path` is only used to label diagnostics.
    ///
    /// Malformed lines never fail the parse; only I/O errors do.
    pub fn parse_reader<R: BufRead>(
        &self,
        mut reader: R,
        path: &Path,
        mut acc: ControllerAccumulator,
    ) -> Result<ControllerAccumulator> {
        let mut buf = Vec::new();
        let mut line_no = 0u64;
        let mut retained = 0usize;

        loop {
            buf.clear();
            let read = reader
                .read_until(b'\n', &mut buf)
                .map_err(|e| AnalyzerError::io(path, e))?;
            if read == 0 {
                break;
            }
            line_no += 1;

            match self.decode_line(&buf) {
                LineEvent::NotJson => {
                    acc.skipped_lines += 1;
                }
                LineEvent::Unparsable(reason) => {
                    acc.unparsable_lines += 1;
                    let err = AnalyzerError::UnparsableLine {
                        path: path.to_path_buf(),
                        line: line_no,
                        reason,
                    };
                    warn!(error = %err, "Skipping controller log line");
                }
                LineEvent::Ignored => {}
                LineEvent::Observation(observation) => {
                    acc.record(observation);
                    retained += 1;
                }
            }
        }

        debug!(
            path = %path.display(),
            lines = line_no,
            retained = retained,
            "Parsed controller log"
        );

        Ok(acc)
    }

    fn decode_line(&self, line: &[u8]) -> LineEvent {
        let value: Value = match serde_json::from_slice(line) {
            Ok(value) => value,
            Err(_) => return LineEvent::NotJson,
        };

        let raw_ts = match value.get("ts").and_then(Value::as_str) {
            Some(ts) => ts,
            None => return LineEvent::Unparsable("no \"ts\" string field".to_string()),
        };
        let timestamp = match parse_log_timestamp(raw_ts) {
            Some(ts) => ts,
            None => return LineEvent::Unparsable(format!("timestamp {:?} does not parse", raw_ts)),
        };

        if !self.range.contains(&timestamp) {
            return LineEvent::Ignored;
        }

        let message = match value.get("msg").and_then(Value::as_str) {
            Some(msg) => msg,
            None => return LineEvent::Unparsable("no \"msg\" string field".to_string()),
        };
        let fields = decode_message(message);
        if !fields.contains_key(OBSERVED_STABLE_VALUE) {
            return LineEvent::Ignored;
        }

        match (number(&fields, POD_COUNT), number(&fields, OBSERVED_STABLE_VALUE)) {
            (Ok(pod_count), Ok(stable_concurrency)) => {
                LineEvent::Observation(ControllerObservation {
                    timestamp,
                    pod_count,
                    stable_concurrency,
                })
            }
            (Err(reason), _) | (_, Err(reason)) => LineEvent::Unparsable(reason),
        }
    }
}

impl BucketParser for ControllerLogParser {
    type Bucket = ControllerAccumulator;

    fn parse_file(&self, path: &Path, acc: Self::Bucket) -> Result<Self::Bucket> {
        let file = File::open(path).map_err(|e| AnalyzerError::io(path, e))?;
        self.parse_reader(BufReader::new(file), path, acc)
    }
}

/// Parse a log timestamp such as `2020-05-01T10:00:03.512Z` to the second.
///
/// Everything from the first `.` on is dropped and `T` becomes a space.
pub fn parse_log_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let seconds = raw.split('.').next()?.replace('T', " ");
    NaiveDateTime::parse_from_str(&seconds, TIMESTAMP_FORMAT).ok()
}

/// Decode a `Key=Value Key=Value` message.
///
/// The message is split on every space and `=` and consecutive tokens are
/// paired; an unpaired trailing token is dropped and repeated keys keep the
/// last value.
pub fn decode_message(message: &str) -> HashMap<&str, &str> {
    let tokens: Vec<&str> = message.split(|c: char| c == ' ' || c == '=').collect();
    tokens
        .chunks_exact(2)
        .map(|pair| (pair[0], pair[1]))
        .collect()
}

fn number(fields: &HashMap<&str, &str>, key: &str) -> std::result::Result<f64, String> {
    let raw = fields
        .get(key)
        .ok_or_else(|| format!("message has no {} field", key))?;
    raw.parse()
        .map_err(|_| format!("{} {:?} is not numeric", key, raw))
}
