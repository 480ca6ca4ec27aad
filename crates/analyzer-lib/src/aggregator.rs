//! Per-window reduction of parsed buckets
//!
//! Every non-empty window contributes one point (observation count and
//! arithmetic mean). Empty windows are skipped, never zero-filled.

use crate::models::{ControllerSeries, ResultSeries};
use crate::parser::{ControllerAccumulator, SecondBucket};
use std::hash::Hash;

/// Arithmetic mean, `None` for an empty slice
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Reduces buckets into series suitable for plotting and export
pub struct WindowAggregator;

impl WindowAggregator {
    /// Reduce a request bucket in its iteration order
    pub fn reduce<K: Eq + Hash + Clone>(bucket: &SecondBucket<K>) -> ResultSeries {
        let mut series = ResultSeries::default();
        for (_, values) in bucket.iter() {
            if let Some(avg) = mean(values) {
                series.push(values.len(), avg);
            }
        }
        series
    }

    /// Reduce pod counts and concurrency over the same chronological windows
    pub fn reduce_controller(acc: &ControllerAccumulator) -> ControllerSeries {
        let mut series = ControllerSeries::default();
        for window in acc.windows().values() {
            if let (Some(pods), Some(concurrency)) =
                (mean(&window.pod_counts), mean(&window.concurrency))
            {
                series.pod_counts.push(pods);
                series.concurrency.push(concurrency);
            }
        }
        series
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ControllerObservation, WindowKey};
    use chrono::NaiveDate;

    #[test]
    fn test_mean() {
        assert_eq!(mean(&[]), None);
        assert_eq!(mean(&[4.0]), Some(4.0));
        assert_eq!(mean(&[1.0, 2.0, 6.0]), Some(3.0));
    }

    #[test]
    fn test_reduce_skips_empty_windows() {
        let mut bucket = SecondBucket::new();
        bucket.push(WindowKey::Offset(0), 10.0);
        bucket.push(WindowKey::Offset(0), 30.0);
        bucket.open(WindowKey::Offset(1));
        bucket.push(WindowKey::Offset(2), 5.0);

        let series = WindowAggregator::reduce(&bucket);

        assert_eq!(bucket.len(), 3);
        assert!(series.len() < bucket.len());
        assert_eq!(series.counts, vec![2, 1]);
        assert_eq!(series.means, vec![20.0, 5.0]);
    }

    #[test]
    fn test_reduce_follows_insertion_order() {
        let mut bucket = SecondBucket::new();
        bucket.push(WindowKey::Offset(9), 1.0);
        bucket.push(WindowKey::Offset(3), 2.0);
        bucket.push(WindowKey::Offset(9), 3.0);

        let series = WindowAggregator::reduce(&bucket);
        assert_eq!(series.counts, vec![2, 1]);
        assert_eq!(series.means, vec![2.0, 2.0]);
    }

    #[test]
    fn test_reduce_means_within_bounds() {
        let mut bucket = SecondBucket::new();
        let samples: &[(i64, &[f64])] = &[
            (0, &[0.5, 12.25, 3.0][..]),
            (1, &[7.0][..]),
            (2, &[][..]),
            (3, &[100.0, 0.001, 55.5, 55.5][..]),
        ];
        for (key, values) in samples {
            let window = bucket.open(WindowKey::Offset(*key));
            window.extend_from_slice(values);
        }

        let series = WindowAggregator::reduce(&bucket);
        let populated: Vec<&[f64]> = samples
            .iter()
            .map(|(_, v)| *v)
            .filter(|v| !v.is_empty())
            .collect();

        assert_eq!(series.counts.len(), populated.len());
        assert_eq!(series.means.len(), populated.len());
        for ((values, count), avg) in populated.iter().zip(&series.counts).zip(&series.means) {
            let min = values.iter().cloned().fold(f64::INFINITY, f64::min);
            let max = values.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
            assert_eq!(*count, values.len());
            assert!(min <= *avg && *avg <= max);
        }
    }

    #[test]
    fn test_reduce_empty_bucket() {
        let bucket: SecondBucket<WindowKey> = SecondBucket::new();
        assert!(WindowAggregator::reduce(&bucket).is_empty());
    }

    #[test]
    fn test_reduce_controller_is_chronological() {
        let day = NaiveDate::from_ymd_opt(2020, 5, 1).unwrap();
        let mut acc = ControllerAccumulator::new();
        for (sec, pods, cc) in [(7, 3.0, 9.0), (2, 1.0, 2.0), (7, 5.0, 11.0)] {
            acc.record(ControllerObservation {
                timestamp: day.and_hms_opt(10, 0, sec).unwrap(),
                pod_count: pods,
                stable_concurrency: cc,
            });
        }

        let series = WindowAggregator::reduce_controller(&acc);
        assert_eq!(series.pod_counts, vec![1.0, 4.0]);
        assert_eq!(series.concurrency, vec![2.0, 10.0]);
    }
}
