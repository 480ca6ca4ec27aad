//! Analysis library for benchmark runs
//!
//! This crate provides the core functionality for:
//! - Discovering request-result shards and controller logs in a run directory
//! - Parsing hey/JMeter results and Knative autoscaler logs into per-second buckets
//! - Reducing buckets into requests/s, latency, pod count and concurrency series
//! - Analyzing many run directories concurrently and exporting the series
//! - Observability of the analysis itself

pub mod aggregator;
pub mod config;
pub mod error;
pub mod export;
pub mod matcher;
pub mod models;
pub mod observability;
pub mod parser;
pub mod run;
pub mod source;

pub use aggregator::WindowAggregator;
pub use config::{AnalysisConfig, MalformedRecordPolicy};
pub use error::{AnalyzerError, Result};
pub use export::SeriesExporter;
pub use matcher::Matchers;
pub use models::*;
pub use observability::{AnalyzerMetrics, StructuredLogger};
pub use run::AnalysisRun;
pub use source::RecordSource;
