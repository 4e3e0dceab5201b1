// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Sequential latency probe: the uncontended baseline.

use std::fmt;

use super::{ProbeResult, Tally};
use crate::execution::{ExecutionWrapper, Task};
use crate::types::SampleCount;

/// Invokes a task `samples` times, one after another, on the calling thread.
#[derive(Debug, Clone, Copy)]
pub struct LatencyProbe {
    samples: SampleCount,
}

impl LatencyProbe {
    pub fn new(samples: SampleCount) -> Self {
        Self { samples }
    }

    pub fn samples(&self) -> SampleCount {
        self.samples
    }

    pub fn run<T, I, O>(&self, wrapper: &ExecutionWrapper<'_, T, I, O>) -> ProbeResult
    where
        T: Task<I, O>,
        O: fmt::Debug,
    {
        let _span = tracing::debug_span!("latency_probe", samples = self.samples.get()).entered();

        let mut tally = Tally::default();
        for _ in 0..self.samples.get() {
            tally.record(wrapper.run(), "latency");
        }

        let result = tally.finish();
        tracing::debug!(
            success_rate = result.success_rate,
            mean_latency_us = result.mean_latency.as_micros() as u64,
            "Latency probe finished"
        );
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::execution::Expectation;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[test]
    fn test_runs_exactly_requested_samples_sequentially() {
        let calls = AtomicUsize::new(0);
        let in_flight = AtomicUsize::new(0);
        let task = |input: &u32| -> Result<u32, String> {
            calls.fetch_add(1, Ordering::SeqCst);
            if in_flight.fetch_add(1, Ordering::SeqCst) != 0 {
                return Err("overlapping invocation".to_string());
            }
            std::thread::sleep(Duration::from_millis(1));
            in_flight.fetch_sub(1, Ordering::SeqCst);
            Ok(*input)
        };

        let expectation = Expectation::equals(3u32);
        let result = LatencyProbe::new(SampleCount::new(6).unwrap())
            .run(&ExecutionWrapper::new(&task, &3, &expectation));

        assert_eq!(calls.load(Ordering::SeqCst), 6);
        assert_eq!(result.samples, 6);
        assert_eq!(result.success_rate, 1.0);
        assert!(result.mean_latency >= Duration::from_millis(1));
    }

    #[test]
    fn test_partial_failures() {
        let calls = AtomicUsize::new(0);
        let task = |input: &u32| -> Result<u32, String> {
            if calls.fetch_add(1, Ordering::SeqCst) % 2 == 0 {
                Ok(*input)
            } else {
                Err("odd call".to_string())
            }
        };

        let expectation = Expectation::equals(5u32);
        let result = LatencyProbe::new(SampleCount::new(4).unwrap())
            .run(&ExecutionWrapper::new(&task, &5, &expectation));

        assert_eq!(result.failures, 2);
        assert!((result.success_rate - 0.5).abs() < f64::EPSILON);
    }
}
