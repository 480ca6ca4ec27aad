//! Parsers that turn benchmark artifacts into per-second buckets
//!
//! Two families are supported:
//! - request-result CSV shards from load generators (hey, JMeter)
//! - newline-delimited JSON logs from the Knative autoscaler

mod controller_log;
mod request_log;


pub use controller_log::{
    decode_message, parse_log_timestamp, ControllerAccumulator, ControllerLogParser,
    ControllerWindow, OBSERVED_STABLE_VALUE, POD_COUNT,
};
pub use request_log::RequestLogParser;

use crate::error::Result;
use std::collections::HashMap;
use std::hash::Hash;
use std::path::Path;

/// A parser that folds one file into a bucket.
///
/// The bucket is passed in and handed back so that several files can be
/// accumulated into one value without shared state.
pub trait BucketParser {
    type Bucket;

    /// Parse the file at `path` into `bucket`
    fn parse_file(&self, path: &Path, bucket: Self::Bucket) -> Result<Self::Bucket>;
}

/// Observations grouped by window key, iterated in insertion order
#[derive(Debug, Clone)]
pub struct SecondBucket<K> {
    index: HashMap<K, usize>,
    windows: Vec<(K, Vec<f64>)>,
}

impl<K> Default for SecondBucket<K> {
    fn default() -> Self {
        Self {
            index: HashMap::new(),
            windows: Vec::new(),
        }
    }
}

impl<K: Eq + Hash + Clone> SecondBucket<K> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains_key(&self, key: &K) -> bool {
        self.index.contains_key(key)
    }

    /// Create an empty window for `key` if it does not exist yet
    pub fn open(&mut self, key: K) -> &mut Vec<f64> {
        let slot = match self.index.get(&key) {
            Some(slot) => *slot,
            None => {
                let slot = self.windows.len();
                self.index.insert(key.clone(), slot);
                self.windows.push((key, Vec::new()));
                slot
            }
        };
        &mut self.windows[slot].1
    }

    /// Append `value` to the window for `key`, creating it if needed
    pub fn push(&mut self, key: K, value: f64) {
        self.open(key).push(value);
    }

    pub fn get(&self, key: &K) -> Option<&[f64]> {
        self.index
            .get(key)
            .map(|slot| self.windows[*slot].1.as_slice())
    }

    /// Number of distinct keys, including empty windows
    pub fn len(&self) -> usize {
        self.windows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.windows.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&K, &[f64])> {
        self.windows
            .iter()
            .map(|(key, values)| (key, values.as_slice()))
    }
}
