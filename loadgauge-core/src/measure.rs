// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Entry points: baseline latency and sustainable concurrency.

use std::fmt;
use std::time::Duration;

use crate::config::ProbeConfig;
use crate::error::GaugeResult;
use crate::execution::{ExecutionWrapper, Expectation, Task};
use crate::probe::{LatencyProbe, ProbeResult};
use crate::search::{AdaptiveConcurrencySearch, SearchOutcome};

/// Measure uncontended latency with `config.final_sample_count` sequential
/// samples on the calling thread.
pub fn measure_latency<T, I, O>(
    task: &T,
    input: &I,
    expectation: &Expectation<O>,
    config: &ProbeConfig,
) -> ProbeResult
where
    T: Task<I, O>,
    O: fmt::Debug,
{
    let wrapper = ExecutionWrapper::new(task, input, expectation);
    LatencyProbe::new(config.final_sample_count).run(&wrapper)
}

/// Find the sustainable concurrency of `task` relative to `baseline`,
/// usually the mean latency returned by [`measure_latency`].
pub fn measure_throughput<T, I, O>(
    task: &T,
    input: &I,
    expectation: &Expectation<O>,
    baseline: Duration,
    config: &ProbeConfig,
) -> GaugeResult<SearchOutcome>
where
    T: Task<I, O>,
    I: Sync,
    O: fmt::Debug + Sync,
{
    tracing::debug!(
        baseline_us = baseline.as_micros() as u64,
        "Measuring throughput"
    );

    let wrapper = ExecutionWrapper::new(task, input, expectation);
    Ok(AdaptiveConcurrencySearch::new(config).run(&wrapper, baseline)?)
}
