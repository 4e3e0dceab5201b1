// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Batch entry points over a list of named cases.

use std::fmt;

use crate::config::ProbeConfig;
use crate::error::GaugeResult;
use crate::execution::{Expectation, Task};
use crate::measure::{measure_latency, measure_throughput};
use crate::probe::ProbeResult;
use crate::search::SearchOutcome;

type Generator<T> = Box<dyn Fn() -> T>;

/// A named case: generators for the input and the expected output.
///
/// Generators run once per case, right before the case is measured.
pub struct Case<I, O> {
    name: String,
    input: Generator<I>,
    expected: Generator<O>,
}

impl<I, O> Case<I, O> {
    pub fn new(
        name: impl Into<String>,
        input: impl Fn() -> I + 'static,
        expected: impl Fn() -> O + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            input: Box::new(input),
            expected: Box::new(expected),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Result of a module case: latency only.
#[derive(Debug, Clone)]
pub struct ModuleCaseResult {
    pub name: String,
    pub latency: ProbeResult,
}

/// Result of a service case: latency, then the concurrency search.
#[derive(Debug, Clone)]
pub struct ServiceCaseResult {
    pub name: String,
    pub latency: ProbeResult,
    pub throughput: SearchOutcome,
}

/// Measure baseline latency for every case.
pub fn module_load_test<T, I, O>(
    task: &T,
    cases: &[Case<I, O>],
    skip: bool,
    config: &ProbeConfig,
) -> Vec<ModuleCaseResult>
where
    T: Task<I, O>,
    O: PartialEq + fmt::Debug + 'static,
{
    cases
        .iter()
        .map(|case| {
            let input = (case.input)();
            let expectation = Expectation::equals((case.expected)()).skip(skip);

            tracing::info!(case = %case.name, "Measuring latency");
            let latency = measure_latency(task, &input, &expectation, config);

            ModuleCaseResult {
                name: case.name.clone(),
                latency,
            }
        })
        .collect()
}

/// Measure baseline latency, then search for the sustainable concurrency
/// using that latency as the baseline, for every case.
pub fn service_load_test<T, I, O>(
    task: &T,
    cases: &[Case<I, O>],
    skip: bool,
    config: &ProbeConfig,
) -> GaugeResult<Vec<ServiceCaseResult>>
where
    T: Task<I, O>,
    I: Sync,
    O: PartialEq + fmt::Debug + Sync + 'static,
{
    let mut results = Vec::with_capacity(cases.len());

    for case in cases {
        let input = (case.input)();
        let expectation = Expectation::equals((case.expected)()).skip(skip);

        tracing::info!(case = %case.name, "Measuring latency and throughput");
        let latency = measure_latency(task, &input, &expectation, config);
        let throughput =
            measure_throughput(task, &input, &expectation, latency.mean_latency, config)?;

        results.push(ServiceCaseResult {
            name: case.name.clone(),
            latency,
            throughput,
        });
    }

    Ok(results)
}
