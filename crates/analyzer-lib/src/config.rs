//! Analysis configuration

use crate::matcher::Matchers;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// What to do with a request-result file that has a malformed record
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MalformedRecordPolicy {
    /// Log the error, drop the file and keep going
    #[default]
    Skip,
    /// Fail the request analysis of the directory
    Abort,
}

impl FromStr for MalformedRecordPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "skip" => Ok(Self::Skip),
            "abort" => Ok(Self::Abort),
            other => Err(format!("unknown policy {:?} (expected skip or abort)", other)),
        }
    }
}

impl fmt::Display for MalformedRecordPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Skip => f.write_str("skip"),
            Self::Abort => f.write_str("abort"),
        }
    }
}

/// Settings for analyzing run directories
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Extension of request-result shards
    #[serde(default = "default_request_extension")]
    pub request_extension: String,

    /// Extension of controller log files
    #[serde(default = "default_log_extension")]
    pub log_extension: String,

    /// Name of the time-range file inside a run directory
    #[serde(default = "default_time_range_file")]
    pub time_range_file: String,

    /// Log files whose name contains this are not read as logs
    #[serde(default = "default_time_range_marker")]
    pub time_range_marker: String,

    /// Run directories whose name contains this hold JMeter output
    #[serde(default = "default_jmeter_marker")]
    pub jmeter_marker: String,

    #[serde(default)]
    pub on_malformed_record: MalformedRecordPolicy,

    /// Maximum number of directories analyzed at once
    #[serde(default = "default_jobs")]
    pub jobs: usize,
}

fn default_request_extension() -> String {
    "csv".to_string()
}

fn default_log_extension() -> String {
    "txt".to_string()
}

fn default_time_range_file() -> String {
    "dates.txt".to_string()
}

fn default_time_range_marker() -> String {
    "date".to_string()
}

fn default_jmeter_marker() -> String {
    "JMETER".to_string()
}

fn default_jobs() -> usize {
    4
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            request_extension: default_request_extension(),
            log_extension: default_log_extension(),
            time_range_file: default_time_range_file(),
            time_range_marker: default_time_range_marker(),
            jmeter_marker: default_jmeter_marker(),
            on_malformed_record: MalformedRecordPolicy::default(),
            jobs: default_jobs(),
        }
    }
}

impl AnalysisConfig {
    pub fn matchers(&self) -> Matchers {
        Matchers::new(&self.jmeter_marker, &self.time_range_marker)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: AnalysisConfig =
            serde_json::from_str(r#"{"jobs": 8, "on_malformed_record": "abort"}"#).unwrap();
        assert_eq!(config.jobs, 8);
        assert_eq!(config.on_malformed_record, MalformedRecordPolicy::Abort);
        assert_eq!(config.request_extension, "csv");
        assert_eq!(config.time_range_file, "dates.txt");
    }

    #[test]
    fn test_policy_from_str() {
        assert_eq!(
            "Skip".parse::<MalformedRecordPolicy>(),
            Ok(MalformedRecordPolicy::Skip)
        );
        assert_eq!(
            "abort".parse::<MalformedRecordPolicy>(),
            Ok(MalformedRecordPolicy::Abort)
        );
        assert!("ignore".parse::<MalformedRecordPolicy>().is_err());
    }
}
