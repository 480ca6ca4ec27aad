//! Configuration loading for the CLI

use analyzer_lib::AnalysisConfig;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Environment variable prefix, e.g. `BENCH_ANALYZER_JOBS=8`
const ENV_PREFIX: &str = "BENCH_ANALYZER";

/// Load configuration from defaults, a TOML file and the environment.
///
/// An explicitly given file must exist; the default location is optional.
pub fn load(path: Option<&Path>) -> Result<AnalysisConfig> {
    let mut builder = config::Config::builder();

    match path {
        Some(path) => {
            builder = builder.add_source(config::File::from(path).required(true));
        }
        None => {
            if let Some(default) = default_config_path() {
                builder = builder.add_source(config::File::from(default).required(false));
            }
        }
    }

    let settings = builder
        .add_source(config::Environment::with_prefix(ENV_PREFIX).try_parsing(true))
        .build()
        .context("Failed to load configuration")?;

    settings
        .try_deserialize()
        .context("Failed to parse configuration")
}

/// Default configuration file location
fn default_config_path() -> Option<PathBuf> {
    dirs_next::config_dir().map(|dir| dir.join("bench-analyzer").join("config.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use analyzer_lib::MalformedRecordPolicy;
    use tempfile::TempDir;

    #[test]
    fn test_load_from_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "jobs = 2\non_malformed_record = \"abort\"\nlog_extension = \"log\"\n",
        )
        .unwrap();

        let config = load(Some(&path)).unwrap();
        assert_eq!(config.jobs, 2);
        assert_eq!(config.on_malformed_record, MalformedRecordPolicy::Abort);
        assert_eq!(config.log_extension, "log");
        assert_eq!(config.time_range_file, "dates.txt");
    }

    #[test]
    fn test_explicit_missing_file_fails() {
        let dir = TempDir::new().unwrap();
        assert!(load(Some(&dir.path().join("absent.toml"))).is_err());
    }
}
