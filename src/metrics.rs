// Form metrics module
//
// Lightweight counters for diagnosing how the form is used

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// Usage metrics for one form.
///
/// Uses atomic operations so counters can be read from any thread without locks.
/// Logged on shutdown via [`log_summary`](Self::log_summary).
#[derive(Debug)]
pub struct FormMetrics {
    /// Field validations that failed
    pub validation_failures: AtomicU64,

    /// Submissions that reached the endpoint
    pub submissions_started: AtomicU64,

    pub submissions_succeeded: AtomicU64,

    pub submissions_failed: AtomicU64,

    /// Submissions dropped before the endpoint settled
    pub submissions_abandoned: AtomicU64,

    /// Submit requests ignored because one was already in flight
    pub submits_rejected: AtomicU64,

    /// Confirmed cancel requests
    pub cancels: AtomicU64,

    /// Total time spent waiting on the endpoint, in milliseconds
    pub total_submission_time_ms: AtomicU64,

    start_time: Instant,
}

impl FormMetrics {
    pub fn new() -> Self {
        Self {
            validation_failures: AtomicU64::new(0),
            submissions_started: AtomicU64::new(0),
            submissions_succeeded: AtomicU64::new(0),
            submissions_failed: AtomicU64::new(0),
            submissions_abandoned: AtomicU64::new(0),
            submits_rejected: AtomicU64::new(0),
            cancels: AtomicU64::new(0),
            total_submission_time_ms: AtomicU64::new(0),
            start_time: Instant::now(),
        }
    }

    pub fn record_validation_failure(&self) {
        self.validation_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_submission_started(&self) {
        self.submissions_started.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a settled submission and how long the endpoint took
    pub fn record_submission_finished(&self, succeeded: bool, duration: Duration) {
        if succeeded {
            self.submissions_succeeded.fetch_add(1, Ordering::Relaxed);
        } else {
            self.submissions_failed.fetch_add(1, Ordering::Relaxed);
        }
        self.total_submission_time_ms
            .fetch_add(duration.as_millis() as u64, Ordering::Relaxed);
    }

    pub fn record_submission_abandoned(&self) {
        self.submissions_abandoned.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_submit_rejected(&self) {
        self.submits_rejected.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_cancel(&self) {
        self.cancels.fetch_add(1, Ordering::Relaxed);
    }

    pub fn uptime(&self) -> Duration {
        self.start_time.elapsed()
    }

    /// Average endpoint time per settled submission in milliseconds
    pub fn avg_submission_time_ms(&self) -> f64 {
        let total = self.total_submission_time_ms.load(Ordering::Relaxed);
        let count = self.submissions_succeeded.load(Ordering::Relaxed)
            + self.submissions_failed.load(Ordering::Relaxed);
        if count > 0 {
            total as f64 / count as f64
        } else {
            0.0
        }
    }

    pub fn log_summary(&self) {
        tracing::info!("=== Form Metrics Summary ===");
        tracing::info!("Uptime: {:.2}s", self.uptime().as_secs_f64());
        tracing::info!(
            "Submissions: {} started, {} succeeded, {} failed, {} abandoned, {} rejected while in flight",
            self.submissions_started.load(Ordering::Relaxed),
            self.submissions_succeeded.load(Ordering::Relaxed),
            self.submissions_failed.load(Ordering::Relaxed),
            self.submissions_abandoned.load(Ordering::Relaxed),
            self.submits_rejected.load(Ordering::Relaxed)
        );
        tracing::info!(
            "Average endpoint time: {:.2}ms",
            self.avg_submission_time_ms()
        );
        tracing::info!(
            "Validation failures: {}, cancels: {}",
            self.validation_failures.load(Ordering::Relaxed),
            self.cancels.load(Ordering::Relaxed)
        );
    }
}

impl Default for FormMetrics {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_creation() {
        let metrics = FormMetrics::new();
        assert_eq!(metrics.submissions_started.load(Ordering::Relaxed), 0);
        assert_eq!(metrics.validation_failures.load(Ordering::Relaxed), 0);
    }

    #[test]
    fn test_record_submissions() {
        let metrics = FormMetrics::new();

        metrics.record_submission_started();
        metrics.record_submission_finished(true, Duration::from_millis(100));
        metrics.record_submission_started();
        metrics.record_submission_finished(false, Duration::from_millis(300));

        assert_eq!(metrics.submissions_started.load(Ordering::Relaxed), 2);
        assert_eq!(metrics.submissions_succeeded.load(Ordering::Relaxed), 1);
        assert_eq!(metrics.submissions_failed.load(Ordering::Relaxed), 1);
        assert_eq!(metrics.avg_submission_time_ms(), 200.0);
    }

    #[test]
    fn test_abandoned_submission_is_counted_but_not_timed() {
        let metrics = FormMetrics::new();

        metrics.record_submission_started();
        metrics.record_submission_abandoned();

        assert_eq!(metrics.submissions_abandoned.load(Ordering::Relaxed), 1);
        assert_eq!(metrics.submissions_failed.load(Ordering::Relaxed), 0);
        assert_eq!(metrics.avg_submission_time_ms(), 0.0);
    }

    #[test]
    fn test_avg_submission_time_without_submissions() {
        assert_eq!(FormMetrics::new().avg_submission_time_ms(), 0.0);
    }

    #[test]
    fn test_other_counters() {
        let metrics = FormMetrics::new();

        metrics.record_validation_failure();
        metrics.record_validation_failure();
        metrics.record_submit_rejected();
        metrics.record_cancel();

        assert_eq!(metrics.validation_failures.load(Ordering::Relaxed), 2);
        assert_eq!(metrics.submits_rejected.load(Ordering::Relaxed), 1);
        assert_eq!(metrics.cancels.load(Ordering::Relaxed), 1);
    }
}
