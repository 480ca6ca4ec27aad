//! Naming conventions of benchmark run directories
//!
//! Run directories carry no metadata: the load generator is recognized by a
//! substring of the directory name, the time-range file by a substring of its path.

use crate::models::RequestDialect;
use std::path::Path;

/// Substring predicates used to classify run directories and files
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Matchers {
    jmeter_marker: String,
    time_range_marker: String,
}

impl Default for Matchers {
    fn default() -> Self {
        Self::new("JMETER", "date")
    }
}

impl Matchers {
    pub fn new(jmeter_marker: impl Into<String>, time_range_marker: impl Into<String>) -> Self {
        Self {
            jmeter_marker: jmeter_marker.into(),
            time_range_marker: time_range_marker.into(),
        }
    }

    /// Case-insensitive match of the directory name against the JMeter marker
    pub fn is_jmeter_directory(&self, dir: &Path) -> bool {
        file_name(dir)
            .to_uppercase()
            .contains(&self.jmeter_marker.to_uppercase())
    }

    /// Request-result dialect used by the run in `dir`
    pub fn dialect_for(&self, dir: &Path) -> RequestDialect {
        if self.is_jmeter_directory(dir) {
            RequestDialect::Timestamp
        } else {
            RequestDialect::Offset
        }
    }

    /// True when any part of `path` contains the time-range marker
    pub fn is_time_range_file(&self, path: &Path) -> bool {
        path.to_string_lossy().contains(&self.time_range_marker)
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default()
}
