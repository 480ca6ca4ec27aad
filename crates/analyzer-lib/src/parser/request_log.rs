//! Request-result CSV parsing
//!
//! Reads the per-request shards written by load generators:
//! - hey: `offset` (fractional seconds since start) + `response-time`
//! - JMeter: `timeStamp` (epoch milliseconds) + `Latency`

use super::{BucketParser, SecondBucket};
use crate::error::{AnalyzerError, Result};
use crate::models::{RequestDialect, WindowKey};
use chrono::{Local, NaiveDateTime, TimeZone, Timelike};
use csv::{ReaderBuilder, StringRecord, Trim};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::debug;

/// Parser for one request-result dialect
#[derive(Debug, Clone, Copy)]
pub struct RequestLogParser {
    dialect: RequestDialect,
}

impl RequestLogParser {
    pub fn new(dialect: RequestDialect) -> Self {
        Self { dialect }
    }

    /// Parse CSV content into `bucket`.
    ///
    /// `path` is only used to label errors.
    ///
    /// Known quirk: in the offset dialect the row that opens a window is not
    /// recorded, only the following rows with the same whole-second offset.
    /// A one-row window therefore stays empty.
    pub fn parse_reader<R: Read>(
        &self,
        reader: R,
        path: &Path,
        mut bucket: SecondBucket<WindowKey>,
    ) -> Result<SecondBucket<WindowKey>> {
        let mut csv = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(Trim::All)
            .from_reader(reader);

        let headers = csv.headers().map_err(|e| csv_error(path, e))?.clone();
        let key_column = column(&headers, self.dialect.key_field(), path)?;
        let latency_column = column(&headers, self.dialect.latency_field(), path)?;

        let mut record = StringRecord::new();
        let mut rows = 0usize;
        while csv.read_record(&mut record).map_err(|e| csv_error(path, e))? {
            let line = record.position().map(|p| p.line()).unwrap_or(0);
            let raw_key = cell(&record, key_column, self.dialect.key_field(), path, line)?;
            let raw_latency =
                cell(&record, latency_column, self.dialect.latency_field(), path, line)?;

            let latency: f64 = raw_latency.parse().map_err(|_| AnalyzerError::MalformedRecord {
                path: path.to_path_buf(),
                line,
                reason: format!(
                    "{} {:?} is not numeric",
                    self.dialect.latency_field(),
                    raw_latency
                ),
            })?;

            match self.dialect {
                RequestDialect::Offset => {
                    let key = offset_seconds(raw_key)
                        .map(WindowKey::Offset)
                        .ok_or_else(|| malformed(path, line, "offset", raw_key))?;
                    if bucket.contains_key(&key) {
                        bucket.push(key, latency);
                    } else {
                        bucket.open(key);
                    }
                }
                RequestDialect::Timestamp => {
                    let key = raw_key
                        .parse::<i64>()
                        .ok()
                        .and_then(wall_clock_second)
                        .map(WindowKey::WallClock)
                        .ok_or_else(|| malformed(path, line, "timeStamp", raw_key))?;
                    bucket.push(key, latency);
                }
            }
            rows += 1;
        }

        debug!(
            path = %path.display(),
            dialect = %self.dialect,
            rows = rows,
            windows = bucket.len(),
            "Parsed request-result file"
        );

        Ok(bucket)
    }
}

impl BucketParser for RequestLogParser {
    type Bucket = SecondBucket<WindowKey>;

    fn parse_file(&self, path: &Path, bucket: Self::Bucket) -> Result<Self::Bucket> {
        let file = File::open(path).map_err(|e| AnalyzerError::io(path, e))?;
        self.parse_reader(file, path, bucket)
    }
}

/// Whole seconds of a fractional-second offset such as `12.0431`
pub fn offset_seconds(raw: &str) -> Option<i64> {
    raw.split('.').next()?.parse().ok()
}

/// Local wall-clock time of an epoch-millisecond stamp, truncated to the second
pub fn wall_clock_second(epoch_millis: i64) -> Option<NaiveDateTime> {
    Local
        .timestamp_millis_opt(epoch_millis)
        .single()?
        .naive_local()
        .with_nanosecond(0)
}

/// Index of the last header named `name`
fn column(headers: &StringRecord, name: &str, path: &Path) -> Result<usize> {
    headers
        .iter()
        .enumerate()
        .filter(|(_, h)| *h == name)
        .map(|(i, _)| i)
        .last()
        .ok_or_else(|| AnalyzerError::MalformedRecord {
            path: path.to_path_buf(),
            line: 1,
            reason: format!("header has no {:?} field", name),
        })
}

fn cell<'r>(
    record: &'r StringRecord,
    index: usize,
    name: &str,
    path: &Path,
    line: u64,
) -> Result<&'r str> {
    record.get(index).ok_or_else(|| AnalyzerError::MalformedRecord {
        path: path.to_path_buf(),
        line,
        reason: format!("row has no {:?} value", name),
    })
}

fn malformed(path: &Path, line: u64, field: &str, raw: &str) -> AnalyzerError {
    AnalyzerError::MalformedRecord {
        path: path.to_path_buf(),
        line,
        reason: format!("{} {:?} is not a valid value", field, raw),
    }
}

fn csv_error(path: &Path, source: csv::Error) -> AnalyzerError {
    AnalyzerError::Csv {
        path: path.to_path_buf(),
        source,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offset_seconds_truncates() {
        assert_eq!(offset_seconds("12.9871"), Some(12));
        assert_eq!(offset_seconds("0.0004"), Some(0));
        assert_eq!(offset_seconds("7"), Some(7));
        assert_eq!(offset_seconds(".5"), None);
        assert_eq!(offset_seconds("abc"), None);
    }

    #[test]
    fn test_wall_clock_second_drops_millis() {
        let a = wall_clock_second(1_588_327_200_001).unwrap();
        let b = wall_clock_second(1_588_327_200_999).unwrap();
        let c = wall_clock_second(1_588_327_201_000).unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(a.nanosecond(), 0);
    }
}
