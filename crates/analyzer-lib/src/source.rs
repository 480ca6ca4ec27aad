//! Discovery of the files that make up a benchmark run
//!
//! Result shards written by load generators are named `<stem>.<index>.<ext>`
//! and must be read in index order. Controller logs carry no ordering.

use crate::error::{AnalyzerError, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Ordering policy for files of one format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordSource {
    /// Ordered by the integer second dot-segment of the file name
    NumericSuffix,
    /// No ordering required
    Unordered,
}

impl RecordSource {
    /// List regular files in `directory` whose name ends in `.{extension}`
    pub fn list(&self, directory: &Path, extension: &str) -> Result<Vec<PathBuf>> {
        let files = matching_files(directory, extension)?;

        match self {
            RecordSource::NumericSuffix => {
                let mut indexed = files
                    .into_iter()
                    .map(|path| run_index(&path).map(|index| (index, path)))
                    .collect::<Result<Vec<_>>>()?;
                // Stable: equal indexes keep discovery order
                indexed.sort_by_key(|(index, _)| *index);
                Ok(indexed.into_iter().map(|(_, path)| path).collect())
            }
            RecordSource::Unordered => Ok(files),
        }
    }
}

/// Extract the run index from a shard name such as `run.3.csv`
pub fn run_index(path: &Path) -> Result<u64> {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();

    let segment = name.split('.').nth(1).ok_or_else(|| AnalyzerError::MalformedFilename {
        path: path.to_path_buf(),
        reason: "no run index segment".to_string(),
    })?;

    segment
        .parse::<u64>()
        .map_err(|e| AnalyzerError::MalformedFilename {
            path: path.to_path_buf(),
            reason: format!("run index {:?} is not numeric: {}", segment, e),
        })
}

/// Files in `directory` with the given extension, in lexical name order
fn matching_files(directory: &Path, extension: &str) -> Result<Vec<PathBuf>> {
    let suffix = format!(".{}", extension);
    let entries = fs::read_dir(directory).map_err(|e| AnalyzerError::io(directory, e))?;

    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| AnalyzerError::io(directory, e))?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().to_string();
        if name.ends_with(&suffix) {
            files.push(path);
        }
    }

    files.sort();
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn touch(dir: &TempDir, name: &str) {
        fs::write(dir.path().join(name), "").unwrap();
    }

    fn names(paths: &[PathBuf]) -> Vec<String> {
        paths
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect()
    }

    #[test]
    fn test_numeric_suffix_order() {
        let dir = TempDir::new().unwrap();
        touch(&dir, "run.10.csv");
        touch(&dir, "run.2.csv");
        touch(&dir, "run.1.csv");

        let files = RecordSource::NumericSuffix.list(dir.path(), "csv").unwrap();
        assert_eq!(names(&files), vec!["run.1.csv", "run.2.csv", "run.10.csv"]);
    }

    #[test]
    fn test_numeric_suffix_ties_keep_discovery_order() {
        let dir = TempDir::new().unwrap();
        touch(&dir, "b.1.csv");
        touch(&dir, "a.1.csv");
        touch(&dir, "a.0.csv");

        let files = RecordSource::NumericSuffix.list(dir.path(), "csv").unwrap();
        assert_eq!(names(&files), vec!["a.0.csv", "a.1.csv", "b.1.csv"]);
    }

    #[test]
    fn test_missing_index_is_malformed() {
        let dir = TempDir::new().unwrap();
        touch(&dir, "run.1.csv");
        touch(&dir, "results.csv");

        let err = RecordSource::NumericSuffix
            .list(dir.path(), "csv")
            .unwrap_err();
        assert!(matches!(err, AnalyzerError::MalformedFilename { .. }));
    }

    #[test]
    fn test_non_numeric_index_is_malformed() {
        let err = run_index(Path::new("/tmp/run.final.csv")).unwrap_err();
        assert!(matches!(err, AnalyzerError::MalformedFilename { .. }));
    }

    #[test]
    fn test_extension_filter_skips_other_files_and_dirs() {
        let dir = TempDir::new().unwrap();
        touch(&dir, "log.txt");
        touch(&dir, "dates.txt");
        touch(&dir, "run.1.csv");
        fs::create_dir(dir.path().join("nested.txt")).unwrap();

        let files = RecordSource::Unordered.list(dir.path(), "txt").unwrap();
        assert_eq!(names(&files), vec!["dates.txt", "log.txt"]);
    }

    #[test]
    fn test_missing_directory_is_io_error() {
        let err = RecordSource::Unordered
            .list(Path::new("/nonexistent/run-dir"), "txt")
            .unwrap_err();
        assert!(matches!(err, AnalyzerError::Io { .. }));
    }
}
