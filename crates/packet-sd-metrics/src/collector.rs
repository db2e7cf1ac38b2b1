//! Packet API request latency and failures.
//!
//! Uses an atomic for the failure counter and a mutex-protected histogram
//! for latency tracking. Safe to share across tasks.

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

/// Upper bounds (seconds) of the request duration histogram buckets.
pub const REQUEST_DURATION_BUCKETS: [f64; 8] = [0.001, 0.01, 0.1, 0.5, 1.0, 2.0, 5.0, 10.0];

/// Non-cumulative bucket counts; the last slot is the `+Inf` overflow.
#[derive(Debug, Default)]
struct Histogram {
    counts: [u64; REQUEST_DURATION_BUCKETS.len() + 1],
    sum: f64,
    count: u64,
}

impl Histogram {
    fn observe(&mut self, value: f64) {
        let idx = REQUEST_DURATION_BUCKETS
            .iter()
            .position(|&upper| value <= upper)
            .unwrap_or(REQUEST_DURATION_BUCKETS.len());
        self.counts[idx] += 1;
        self.sum += value;
        self.count += 1;
    }

    fn snapshot(&self) -> HistogramSnapshot {
        let mut cumulative = 0;
        let buckets = REQUEST_DURATION_BUCKETS
            .iter()
            .zip(self.counts.iter())
            .map(|(&upper, &n)| {
                cumulative += n;
                (upper, cumulative)
            })
            .collect();
        HistogramSnapshot {
            buckets,
            sum: self.sum,
            count: self.count,
        }
    }
}

#[derive(Debug, Default)]
struct Inner {
    request_duration: Mutex<Histogram>,
    request_failures: AtomicU64,
}

/// Handle to the agent's API metrics.
///
/// Cloning is cheap and every clone records into the same counters.
#[derive(Debug, Clone, Default)]
pub struct SdMetrics {
    inner: Arc<Inner>,
}

/// Point-in-time view of the request duration histogram.
#[derive(Debug, Clone, PartialEq)]
pub struct HistogramSnapshot {
    /// `(upper bound, cumulative count)` per finite bucket.
    pub buckets: Vec<(f64, u64)>,
    pub sum: f64,
    /// Total observations, which is also the `+Inf` bucket.
    pub count: u64,
}

/// Point-in-time view of all metrics.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricsSnapshot {
    pub request_duration: HistogramSnapshot,
    pub request_failures: u64,
}

impl SdMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the wall-clock duration of one API call.
    pub fn observe_request(&self, elapsed: Duration) {
        self.inner
            .request_duration
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .observe(elapsed.as_secs_f64());
    }

    /// Count one failed API call.
    pub fn inc_failures(&self) {
        self.inner.request_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Run one API call, recording its duration and, if it fails, a failure.
    ///
    /// Both are recorded before the result is handed back.
    pub async fn track<T, E, F>(&self, call: F) -> Result<T, E>
    where
        F: Future<Output = Result<T, E>>,
    {
        let start = Instant::now();
        let result = call.await;
        self.observe_request(start.elapsed());
        if result.is_err() {
            self.inc_failures();
        }
        result
    }

    pub fn request_failures(&self) -> u64 {
        self.inner.request_failures.load(Ordering::Relaxed)
    }

    /// Number of API calls observed so far.
    pub fn request_count(&self) -> u64 {
        self.inner
            .request_duration
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .count
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        let request_duration = self
            .inner
            .request_duration
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .snapshot();
        MetricsSnapshot {
            request_duration,
            request_failures: self.request_failures(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_metrics_are_zero() {
        let metrics = SdMetrics::new();
        let snap = metrics.snapshot();
        assert_eq!(snap.request_failures, 0);
        assert_eq!(snap.request_duration.count, 0);
        assert_eq!(snap.request_duration.sum, 0.0);
        assert!(snap.request_duration.buckets.iter().all(|&(_, n)| n == 0));
    }

    #[test]
    fn observations_land_in_cumulative_buckets() {
        let metrics = SdMetrics::new();
        metrics.observe_request(Duration::from_micros(500)); // ≤ 0.001
        metrics.observe_request(Duration::from_millis(300)); // ≤ 0.5
        metrics.observe_request(Duration::from_secs(30)); // +Inf only

        let hist = metrics.snapshot().request_duration;
        assert_eq!(hist.count, 3);
        assert_eq!(hist.buckets[0], (0.001, 1));
        assert_eq!(hist.buckets[2], (0.1, 1));
        assert_eq!(hist.buckets[3], (0.5, 2));
        assert_eq!(hist.buckets[7], (10.0, 2));
        assert!((hist.sum - 30.3005).abs() < 1e-9);
    }

    #[test]
    fn bucket_bounds_are_inclusive() {
        let metrics = SdMetrics::new();
        metrics.observe_request(Duration::from_secs(1));
        let hist = metrics.snapshot().request_duration;
        assert_eq!(hist.buckets[3], (0.5, 0));
        assert_eq!(hist.buckets[4], (1.0, 1));
    }

    #[test]
    fn clones_share_counters() {
        let metrics = SdMetrics::new();
        let other = metrics.clone();
        other.inc_failures();
        other.observe_request(Duration::from_millis(5));
        assert_eq!(metrics.request_failures(), 1);
        assert_eq!(metrics.request_count(), 1);
    }

    #[test]
    fn separate_handles_are_isolated() {
        let a = SdMetrics::new();
        let b = SdMetrics::new();
        a.inc_failures();
        assert_eq!(a.request_failures(), 1);
        assert_eq!(b.request_failures(), 0);
    }

    #[tokio::test]
    async fn track_records_success_without_failure() {
        let metrics = SdMetrics::new();
        let result: Result<u32, String> = metrics.track(async { Ok(7) }).await;
        assert_eq!(result, Ok(7));
        assert_eq!(metrics.request_count(), 1);
        assert_eq!(metrics.request_failures(), 0);
    }

    #[tokio::test]
    async fn track_records_failure_and_duration() {
        let metrics = SdMetrics::new();
        let result: Result<u32, String> = metrics.track(async { Err("down".to_string()) }).await;
        assert!(result.is_err());
        assert_eq!(metrics.request_count(), 1);
        assert_eq!(metrics.request_failures(), 1);
    }

    #[tokio::test]
    async fn concurrent_updates_are_not_lost() {
        let metrics = SdMetrics::new();
        let mut handles = Vec::new();
        for _ in 0..8 {
            let m = metrics.clone();
            handles.push(tokio::spawn(async move {
                for _ in 0..100 {
                    m.inc_failures();
                    m.observe_request(Duration::from_millis(1));
                }
            }));
        }
        for h in handles {
            h.await.unwrap();
        }
        assert_eq!(metrics.request_failures(), 800);
        assert_eq!(metrics.request_count(), 800);
    }
}
