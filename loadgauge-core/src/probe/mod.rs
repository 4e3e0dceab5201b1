// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Latency and throughput probes.
//!
//! Both probes reduce their samples the same way: every requested sample is
//! counted, failed ones included, and failures are logged rather than
//! raised.

mod latency;
mod throughput;

pub use latency::LatencyProbe;
pub use throughput::ThroughputProbe;

use std::time::Duration;

use crate::execution::Sample;

/// Aggregate of N samples.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProbeResult {
    /// Number of samples taken.
    pub samples: usize,
    /// Number of samples that failed.
    pub failures: usize,
    /// Successes / samples, in [0, 1].
    pub success_rate: f64,
    /// Mean latency over all samples, failed ones included.
    pub mean_latency: Duration,
}

impl ProbeResult {
    pub fn successes(&self) -> usize {
        self.samples - self.failures
    }
}

/// Running reduction of samples into a [`ProbeResult`].
#[derive(Debug, Default)]
pub(crate) struct Tally {
    samples: usize,
    failures: usize,
    total_latency: Duration,
}

impl Tally {
    pub(crate) fn record(&mut self, sample: Sample, probe: &'static str) {
        self.samples += 1;
        self.total_latency += sample.latency;

        if let Some(err) = sample.error {
            self.failures += 1;
            tracing::error!(
                probe = probe,
                latency_us = sample.latency.as_micros() as u64,
                error = %err,
                "Sample failed"
            );
        }
    }

    pub(crate) fn finish(self) -> ProbeResult {
        if self.samples == 0 {
            return ProbeResult {
                samples: 0,
                failures: 0,
                success_rate: 0.0,
                mean_latency: Duration::ZERO,
            };
        }

        let successes = self.samples - self.failures;
        let mean_nanos = self.total_latency.as_nanos() / self.samples as u128;

        ProbeResult {
            samples: self.samples,
            failures: self.failures,
            success_rate: successes as f64 / self.samples as f64,
            mean_latency: Duration::from_nanos(mean_nanos as u64),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SampleError;

    fn fault() -> SampleError {
        SampleError::Task {
            message: "boom".to_string(),
        }
    }

    #[test]
    fn test_tally_counts_failed_latency() {
        let mut tally = Tally::default();
        tally.record(Sample::success(Duration::from_millis(10)), "test");
        tally.record(Sample::failure(Duration::from_millis(30), fault()), "test");

        let result = tally.finish();
        assert_eq!(result.samples, 2);
        assert_eq!(result.failures, 1);
        assert_eq!(result.successes(), 1);
        assert!((result.success_rate - 0.5).abs() < f64::EPSILON);
        assert_eq!(result.mean_latency, Duration::from_millis(20));
    }

    #[test]
    fn test_tally_all_failures() {
        let mut tally = Tally::default();
        for _ in 0..4 {
            tally.record(Sample::failure(Duration::from_millis(1), fault()), "test");
        }

        let result = tally.finish();
        assert_eq!(result.success_rate, 0.0);
        assert_eq!(result.mean_latency, Duration::from_millis(1));
    }

    #[test]
    fn test_empty_tally_is_zeroed() {
        let result = Tally::default().finish();
        assert_eq!(result.samples, 0);
        assert_eq!(result.success_rate, 0.0);
        assert_eq!(result.mean_latency, Duration::ZERO);
    }

    #[test]
    fn test_success_rate_bounded_for_any_mix() {
        for failures in 0..=8 {
            let mut tally = Tally::default();
            for i in 0..8 {
                let latency = Duration::from_micros(i * 100);
                if i < failures {
                    tally.record(Sample::failure(latency, fault()), "test");
                } else {
                    tally.record(Sample::success(latency), "test");
                }
            }
            let result = tally.finish();
            assert!((0.0..=1.0).contains(&result.success_rate));
            assert!(result.mean_latency >= Duration::ZERO);
        }
    }
}
