// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Adaptive concurrency search.
//!
//! Finds the largest worker count at which mean latency under load stays
//! within a tolerance band around the uncontended baseline:
//!
//! 1. **Grow**: starting at 1, double while
//!    `measured < baseline + 2 * baseline / concurrency`.
//! 2. **Shrink**: while above 1, step down by one while
//!    `measured > baseline + baseline / concurrency`.
//! 3. **Verify**: re-probe the accepted level with the final sample count.
//!
//! Both bands narrow as concurrency rises. Search probes use a small sample
//! count per worker; the wide grow band absorbs their noise, the tighter
//! shrink band refines near the true capacity.

use std::fmt;
use std::time::Duration;

use crate::config::ProbeConfig;
use crate::error::PoolError;
use crate::execution::{ExecutionWrapper, Task};
use crate::probe::{ProbeResult, ThroughputProbe};
use crate::types::{Concurrency, SampleCount};

/// Band width, in baselines, while growing.
const GROW_TOLERANCE: f64 = 2.0;
/// Band width, in baselines, while shrinking.
const SHRINK_TOLERANCE: f64 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Grow,
    Shrink,
    Done,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Grow => write!(f, "grow"),
            Phase::Shrink => write!(f, "shrink"),
            Phase::Done => write!(f, "done"),
        }
    }
}

/// State of one search run. Discarded when the search returns.
#[derive(Debug)]
struct SearchState {
    concurrency: Concurrency,
    phase: Phase,
    baseline: Duration,
    capped: bool,
    probes: usize,
}

impl SearchState {
    fn new(baseline: Duration) -> Self {
        Self {
            concurrency: Concurrency::ONE,
            phase: Phase::Grow,
            baseline,
            capped: false,
            probes: 0,
        }
    }

    /// `baseline + factor * baseline / concurrency`.
    fn threshold(&self, factor: f64) -> Duration {
        self.baseline + self.baseline.mul_f64(factor / self.concurrency.get() as f64)
    }

    fn enter(&mut self, phase: Phase) {
        tracing::debug!(
            from = %self.phase,
            to = %phase,
            concurrency = self.concurrency.get(),
            "Search phase change"
        );
        self.phase = phase;
    }
}

/// Result of a concurrency search.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchOutcome {
    /// Success rate of the verification probe.
    pub success_rate: f64,
    /// Sustainable concurrency: full-task executions that can run in
    /// parallel while latency stays near baseline.
    pub concurrency: Concurrency,
    /// Mean latency of the verification probe.
    pub mean_latency: Duration,
    /// The growth phase hit the configured ceiling without saturating.
    pub capped: bool,
    /// Throughput probes issued, verification included.
    pub probes: usize,
}

/// Drives throughput probes to find the sustainable concurrency of a task.
#[derive(Debug, Clone, Copy)]
pub struct AdaptiveConcurrencySearch {
    search_samples: SampleCount,
    final_samples: SampleCount,
    ceiling: Concurrency,
}

impl AdaptiveConcurrencySearch {
    pub fn new(config: &ProbeConfig) -> Self {
        Self {
            search_samples: config.search_samples_per_worker,
            final_samples: config.final_sample_count,
            ceiling: config.max_concurrency,
        }
    }

    /// Search relative to `baseline`, the task's uncontended mean latency.
    ///
    /// Task faults never abort the search; only pool failures are returned.
    pub fn run<T, I, O>(
        &self,
        wrapper: &ExecutionWrapper<'_, T, I, O>,
        baseline: Duration,
    ) -> Result<SearchOutcome, PoolError>
    where
        T: Task<I, O>,
        I: Sync,
        O: fmt::Debug + Sync,
    {
        let _span = tracing::info_span!(
            "concurrency_search",
            baseline_us = baseline.as_micros() as u64
        )
        .entered();

        let mut state = SearchState::new(baseline);

        while state.phase == Phase::Grow {
            let measured = self.probe(wrapper, &mut state, self.search_samples)?;
            let threshold = state.threshold(GROW_TOLERANCE);
            tracing::debug!(
                concurrency = state.concurrency.get(),
                measured_us = measured.mean_latency.as_micros() as u64,
                threshold_us = threshold.as_micros() as u64,
                "Grow probe"
            );

            if measured.mean_latency >= threshold {
                state.enter(Phase::Shrink);
            } else if state.concurrency == self.ceiling {
                tracing::warn!(
                    ceiling = self.ceiling.get(),
                    "Concurrency ceiling reached without saturating"
                );
                state.capped = true;
                state.enter(Phase::Shrink);
            } else {
                state.concurrency = state.concurrency.doubled(self.ceiling);
            }
        }

        while state.phase == Phase::Shrink {
            if state.concurrency == Concurrency::ONE {
                state.enter(Phase::Done);
                break;
            }

            let measured = self.probe(wrapper, &mut state, self.search_samples)?;
            let threshold = state.threshold(SHRINK_TOLERANCE);
            tracing::debug!(
                concurrency = state.concurrency.get(),
                measured_us = measured.mean_latency.as_micros() as u64,
                threshold_us = threshold.as_micros() as u64,
                "Shrink probe"
            );

            if measured.mean_latency > threshold {
                state.concurrency = state.concurrency.decremented();
            } else {
                state.enter(Phase::Done);
            }
        }

        let verified = self.probe(wrapper, &mut state, self.final_samples)?;
        let outcome = SearchOutcome {
            success_rate: verified.success_rate,
            concurrency: state.concurrency,
            mean_latency: verified.mean_latency,
            capped: state.capped,
            probes: state.probes,
        };

        tracing::info!(
            concurrency = outcome.concurrency.get(),
            success_rate = outcome.success_rate,
            mean_latency_us = outcome.mean_latency.as_micros() as u64,
            capped = outcome.capped,
            probes = outcome.probes,
            "Concurrency search finished"
        );
        Ok(outcome)
    }

    fn probe<T, I, O>(
        &self,
        wrapper: &ExecutionWrapper<'_, T, I, O>,
        state: &mut SearchState,
        samples_per_worker: SampleCount,
    ) -> Result<ProbeResult, PoolError>
    where
        T: Task<I, O>,
        I: Sync,
        O: fmt::Debug + Sync,
    {
        state.probes += 1;
        ThroughputProbe::new(state.concurrency, samples_per_worker).run(wrapper)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::execution::Expectation;
    use crate::pool::WorkerPool;
    use std::convert::Infallible;

    fn config(ceiling: usize) -> ProbeConfig {
        ProbeConfig::default()
            .with_final_sample_count(SampleCount::new(2).unwrap())
            .with_max_concurrency(Concurrency::new(ceiling).unwrap())
    }

    #[test]
    fn test_threshold_narrows_with_concurrency() {
        let mut state = SearchState::new(Duration::from_millis(100));
        assert_eq!(state.threshold(GROW_TOLERANCE), Duration::from_millis(300));
        assert_eq!(state.threshold(SHRINK_TOLERANCE), Duration::from_millis(200));

        state.concurrency = Concurrency::new(4).unwrap();
        assert_eq!(state.threshold(GROW_TOLERANCE), Duration::from_millis(150));
        assert_eq!(state.threshold(SHRINK_TOLERANCE), Duration::from_millis(125));
    }

    #[test]
    fn test_saturated_at_one_returns_one() {
        fn sleep_5ms(input: &u64) -> Result<u64, Infallible> {
            std::thread::sleep(Duration::from_millis(5));
            Ok(*input)
        }

        // A zero baseline puts every measurement outside the band.
        let expectation = Expectation::equals(1u64);
        let wrapper = ExecutionWrapper::new(&sleep_5ms, &1, &expectation);
        let outcome = AdaptiveConcurrencySearch::new(&config(64))
            .run(&wrapper, Duration::ZERO)
            .unwrap();

        assert_eq!(outcome.concurrency, Concurrency::ONE);
        assert!(!outcome.capped);
        // One grow probe plus verification; shrink does nothing at 1.
        assert_eq!(outcome.probes, 2);
        assert_eq!(outcome.success_rate, 1.0);
    }

    #[test]
    fn test_unbounded_task_stops_at_ceiling() {
        fn sleep_5ms(input: &u64) -> Result<u64, Infallible> {
            std::thread::sleep(Duration::from_millis(5));
            Ok(*input)
        }

        // Generous baseline: nothing ever looks saturated.
        let expectation = Expectation::equals(1u64);
        let wrapper = ExecutionWrapper::new(&sleep_5ms, &1, &expectation);
        let outcome = AdaptiveConcurrencySearch::new(&config(6))
            .run(&wrapper, Duration::from_millis(500))
            .unwrap();

        assert!(outcome.capped);
        assert_eq!(outcome.concurrency.get(), 6);
    }

    #[test]
    fn test_faults_do_not_abort_search() {
        let task = |_: &u64| -> Result<u64, String> { Err("down".to_string()) };
        let expectation = Expectation::equals(1u64);
        let wrapper = ExecutionWrapper::new(&task, &1, &expectation);
        let outcome = AdaptiveConcurrencySearch::new(&config(4))
            .run(&wrapper, Duration::from_millis(1))
            .unwrap();

        assert_eq!(outcome.success_rate, 0.0);
        assert!(outcome.concurrency.get() >= 1);
    }

    #[test]
    fn test_converges_to_pool_capacity() {
        let pool = WorkerPool::new("capacity", Concurrency::new(4).unwrap()).unwrap();
        let task = |input: &u64| -> Result<u64, PoolError> {
            let input = *input;
            pool.execute(move || {
                std::thread::sleep(Duration::from_millis(50));
                input
            })
        };

        let expectation = Expectation::equals(1u64);
        let wrapper = ExecutionWrapper::new(&task, &1, &expectation);
        let outcome = AdaptiveConcurrencySearch::new(&config(64))
            .run(&wrapper, Duration::from_millis(50))
            .unwrap();

        assert_eq!(outcome.success_rate, 1.0);
        assert!(
            (3..=5).contains(&outcome.concurrency.get()),
            "expected ~4, got {}",
            outcome.concurrency
        );
    }
}
