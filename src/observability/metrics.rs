//! Thread-safe metrics collection system
//!
//! Atomic counters and a mutex-protected latency window tracking request
//! validation outcomes and change classifications. A serialized snapshot is
//! exposed over the HTTP surface.

use crate::error::ServiceError;
use crate::tracker::Classification;
use once_cell::sync::Lazy;
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Global metrics collector instance
pub static METRICS: Lazy<MetricsCollector> = Lazy::new(MetricsCollector::new);

/// Get reference to global metrics collector
pub fn metrics() -> &'static MetricsCollector {
    &METRICS
}

/// Rolling latency window size
const MAX_LATENCY_SAMPLES: usize = 1000;

/// Thread-safe metrics collector using atomics and mutexes
pub struct MetricsCollector {
    // Request outcome counters (atomic for high frequency)
    requests_received: AtomicU64,
    requests_accepted: AtomicU64,
    rejected_invalid_format: AtomicU64,
    rejected_invalid_id: AtomicU64,
    rejected_invalid_number: AtomicU64,
    internal_errors: AtomicU64,

    // Classification counters
    classified_new: AtomicU64,
    classified_same: AtomicU64,

    // Processing times in microseconds (mutex protected)
    processing_times: Mutex<Vec<u64>>,

    // Lifecycle
    service_state: Mutex<String>,
    state_transitions: AtomicU64,
    uptime_start: AtomicU64,
}

impl MetricsCollector {
    pub fn new() -> Self {
        Self {
            requests_received: AtomicU64::new(0),
            requests_accepted: AtomicU64::new(0),
            rejected_invalid_format: AtomicU64::new(0),
            rejected_invalid_id: AtomicU64::new(0),
            rejected_invalid_number: AtomicU64::new(0),
            internal_errors: AtomicU64::new(0),
            classified_new: AtomicU64::new(0),
            classified_same: AtomicU64::new(0),
            processing_times: Mutex::new(Vec::new()),
            service_state: Mutex::new("initializing".to_string()),
            state_transitions: AtomicU64::new(0),
            uptime_start: AtomicU64::new(current_timestamp()),
        }
    }

    pub fn request_received(&self) {
        self.requests_received.fetch_add(1, Ordering::Relaxed);
    }

    /// Record an accepted request and its classification.
    pub fn request_accepted(&self, classification: Classification) {
        self.requests_accepted.fetch_add(1, Ordering::Relaxed);
        match classification {
            Classification::New => self.classified_new.fetch_add(1, Ordering::Relaxed),
            Classification::Same => self.classified_same.fetch_add(1, Ordering::Relaxed),
        };
    }

    /// Record a failed request under its rejection category.
    pub fn request_rejected(&self, error: &ServiceError) {
        let counter = match error {
            ServiceError::InvalidFormat => &self.rejected_invalid_format,
            ServiceError::InvalidId => &self.rejected_invalid_id,
            ServiceError::InvalidNumber => &self.rejected_invalid_number,
            _ => &self.internal_errors,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_processing_time(&self, duration: Duration) {
        if let Ok(mut times) = self.processing_times.lock() {
            times.push(duration.as_micros() as u64);

            // Limit to the last samples to prevent unbounded growth
            if times.len() > MAX_LATENCY_SAMPLES {
                times.remove(0);
            }
        }
    }

    pub fn set_service_state(&self, state: &str) {
        if let Ok(mut current_state) = self.service_state.lock() {
            if *current_state != state {
                self.state_transitions.fetch_add(1, Ordering::Relaxed);
                *current_state = state.to_string();
            }
        }
    }

    /// Calculate processing time statistics
    fn calculate_processing_time_statistics(&self) -> (f64, f64, f64, f64) {
        if let Ok(times) = self.processing_times.lock() {
            if times.is_empty() {
                (0.0, 0.0, 0.0, 0.0)
            } else {
                let mut sorted_times = times.clone();
                sorted_times.sort_unstable();

                let avg = sorted_times.iter().sum::<u64>() as f64 / sorted_times.len() as f64;
                let p50 = percentile(&sorted_times, 50.0);
                let p95 = percentile(&sorted_times, 95.0);
                let p99 = percentile(&sorted_times, 99.0);

                (avg, p50, p95, p99)
            }
        } else {
            (0.0, 0.0, 0.0, 0.0)
        }
    }

    fn current_service_state(&self) -> String {
        self.service_state
            .lock()
            .map(|s| s.clone())
            .unwrap_or_else(|_| "unknown".to_string())
    }

    /// Build a complete snapshot of all metrics
    pub fn get_metrics(&self) -> MetricsSnapshot {
        let now = current_timestamp();
        let (avg_processing_time_us, p50, p95, p99) = self.calculate_processing_time_statistics();
        let started_at = self.uptime_start.load(Ordering::Relaxed);

        MetricsSnapshot {
            requests: RequestMetrics {
                received: self.requests_received.load(Ordering::Relaxed),
                accepted: self.requests_accepted.load(Ordering::Relaxed),
                rejected_invalid_format: self.rejected_invalid_format.load(Ordering::Relaxed),
                rejected_invalid_id: self.rejected_invalid_id.load(Ordering::Relaxed),
                rejected_invalid_number: self.rejected_invalid_number.load(Ordering::Relaxed),
                internal_errors: self.internal_errors.load(Ordering::Relaxed),
                avg_processing_time_us,
                processing_time_p50_us: p50,
                processing_time_p95_us: p95,
                processing_time_p99_us: p99,
            },
            classifications: ClassificationMetrics {
                new: self.classified_new.load(Ordering::Relaxed),
                same: self.classified_same.load(Ordering::Relaxed),
            },
            lifecycle: LifecycleMetrics {
                service_state: self.current_service_state(),
                started_at,
                uptime_seconds: now.saturating_sub(started_at),
                state_transitions: self.state_transitions.load(Ordering::Relaxed),
            },
        }
    }

    // Reset all metrics (useful for testing)
    pub fn reset(&self) {
        self.requests_received.store(0, Ordering::Relaxed);
        self.requests_accepted.store(0, Ordering::Relaxed);
        self.rejected_invalid_format.store(0, Ordering::Relaxed);
        self.rejected_invalid_id.store(0, Ordering::Relaxed);
        self.rejected_invalid_number.store(0, Ordering::Relaxed);
        self.internal_errors.store(0, Ordering::Relaxed);
        self.classified_new.store(0, Ordering::Relaxed);
        self.classified_same.store(0, Ordering::Relaxed);
        self.state_transitions.store(0, Ordering::Relaxed);
        self.uptime_start
            .store(current_timestamp(), Ordering::Relaxed);

        if let Ok(mut times) = self.processing_times.lock() {
            times.clear();
        }
        if let Ok(mut state) = self.service_state.lock() {
            *state = "initializing".to_string();
        }
    }
}

impl Default for MetricsCollector {
    fn default() -> Self {
        Self::new()
    }
}

/// Complete metrics snapshot for HTTP export
#[derive(Debug, Serialize)]
pub struct MetricsSnapshot {
    pub requests: RequestMetrics,
    pub classifications: ClassificationMetrics,
    pub lifecycle: LifecycleMetrics,
}

#[derive(Debug, Serialize)]
pub struct RequestMetrics {
    pub received: u64,
    pub accepted: u64,
    pub rejected_invalid_format: u64,
    pub rejected_invalid_id: u64,
    pub rejected_invalid_number: u64,
    pub internal_errors: u64,
    pub avg_processing_time_us: f64,
    pub processing_time_p50_us: f64,
    pub processing_time_p95_us: f64,
    pub processing_time_p99_us: f64,
}

#[derive(Debug, Serialize)]
pub struct ClassificationMetrics {
    pub new: u64,
    pub same: u64,
}

#[derive(Debug, Serialize)]
pub struct LifecycleMetrics {
    pub service_state: String,
    pub started_at: u64,
    pub uptime_seconds: u64,
    pub state_transitions: u64,
}

/// Linear-interpolated percentile over a sorted slice
fn percentile(sorted: &[u64], pct: f64) -> f64 {
    if sorted.is_empty() {
        return 0.0;
    }

    let rank = (pct / 100.0) * (sorted.len() - 1) as f64;
    let low = rank.floor() as usize;
    let high = rank.ceil() as usize;

    if low == high {
        sorted[low] as f64
    } else {
        let weight = rank - low as f64;
        sorted[low] as f64 * (1.0 - weight) + sorted[high] as f64 * weight
    }
}

fn current_timestamp() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}
