// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Concurrent throughput probe.
//!
//! Runs `concurrency * samples_per_worker` invocations through a pool of
//! exactly `concurrency` workers and waits for all of them. When the task
//! cannot actually run that many invocations in parallel, queuing delay
//! inside the task shows up as a higher mean latency.

use std::fmt;

use super::{ProbeResult, Tally};
use crate::error::PoolError;
use crate::execution::{ExecutionWrapper, Task};
use crate::pool::fan_out;
use crate::types::{Concurrency, SampleCount};

#[derive(Debug, Clone, Copy)]
pub struct ThroughputProbe {
    concurrency: Concurrency,
    samples_per_worker: SampleCount,
}

impl ThroughputProbe {
    pub fn new(concurrency: Concurrency, samples_per_worker: SampleCount) -> Self {
        Self {
            concurrency,
            samples_per_worker,
        }
    }

    pub fn concurrency(&self) -> Concurrency {
        self.concurrency
    }

    /// Total number of samples this probe takes.
    pub fn total_samples(&self) -> usize {
        self.concurrency
            .get()
            .saturating_mul(self.samples_per_worker.get())
    }

    /// Run the probe. Blocks until every sample has completed; there is no
    /// timeout. Only pool failures are returned as errors.
    pub fn run<T, I, O>(&self, wrapper: &ExecutionWrapper<'_, T, I, O>) -> Result<ProbeResult, PoolError>
    where
        T: Task<I, O>,
        I: Sync,
        O: fmt::Debug + Sync,
    {
        let _span = tracing::debug_span!(
            "throughput_probe",
            concurrency = self.concurrency.get(),
            samples = self.total_samples()
        )
        .entered();

        let samples = fan_out(self.concurrency, self.total_samples(), || wrapper.run())?;

        let mut tally = Tally::default();
        for sample in samples {
            tally.record(sample, "throughput");
        }

        let result = tally.finish();
        tracing::debug!(
            success_rate = result.success_rate,
            mean_latency_us = result.mean_latency.as_micros() as u64,
            "Throughput probe finished"
        );
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::execution::Expectation;
    use crate::pool::WorkerPool;
    use std::convert::Infallible;
    use std::time::Duration;

    fn sleep_10ms(input: &u64) -> Result<u64, Infallible> {
        std::thread::sleep(Duration::from_millis(10));
        Ok(*input)
    }

    #[test]
    fn test_total_samples() {
        let probe = ThroughputProbe::new(Concurrency::new(8).unwrap(), SampleCount::new(2).unwrap());
        assert_eq!(probe.total_samples(), 16);
    }

    #[test]
    fn test_parallel_task_keeps_latency_flat() {
        let expectation = Expectation::equals(1u64);
        let wrapper = ExecutionWrapper::new(&sleep_10ms, &1, &expectation);
        let result = ThroughputProbe::new(Concurrency::new(4).unwrap(), SampleCount::new(2).unwrap())
            .run(&wrapper)
            .unwrap();

        assert_eq!(result.samples, 8);
        assert_eq!(result.success_rate, 1.0);
        assert!(result.mean_latency < Duration::from_millis(18));
    }

    #[test]
    fn test_queuing_inflates_latency() {
        // Only one invocation can run at a time inside the task.
        let pool = WorkerPool::new("single", Concurrency::ONE).unwrap();
        let task = |input: &u64| -> Result<u64, PoolError> {
            let input = *input;
            pool.execute(move || {
                std::thread::sleep(Duration::from_millis(10));
                input
            })
        };

        let expectation = Expectation::equals(1u64);
        let wrapper = ExecutionWrapper::new(&task, &1, &expectation);
        let result = ThroughputProbe::new(Concurrency::new(4).unwrap(), SampleCount::new(1).unwrap())
            .run(&wrapper)
            .unwrap();

        assert_eq!(result.success_rate, 1.0);
        // Waits of 10, 20, 30 and 40ms average to 25ms.
        assert!(result.mean_latency >= Duration::from_millis(20));
    }

    #[test]
    fn test_all_faults_still_aggregate() {
        let task = |_: &u64| -> Result<u64, String> { Err("refused".to_string()) };
        let expectation = Expectation::equals(1u64);
        let wrapper = ExecutionWrapper::new(&task, &1, &expectation);
        let result = ThroughputProbe::new(Concurrency::new(3).unwrap(), SampleCount::new(2).unwrap())
            .run(&wrapper)
            .unwrap();

        assert_eq!(result.samples, 6);
        assert_eq!(result.failures, 6);
        assert_eq!(result.success_rate, 0.0);
    }
}
