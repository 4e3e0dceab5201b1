// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! loadgauge Core Library
//!
//! Measures how a task behaves alone and under concurrent load.
//! Provides the timed execution wrapper, sequential latency and concurrent
//! throughput probes, the adaptive concurrency search built on them,
//! batch suites, worker pools and configuration parsing.

pub mod config;
pub mod error;
pub mod execution;
pub mod measure;
pub mod pool;
pub mod probe;
pub mod search;
pub mod suite;
pub mod types;

// Re-export commonly used types
pub use config::{
    CaseSpec, ConfigLoader, GaugeConfig, ProbeConfig, SuiteMode, SuiteSpec, WorkloadSpec,
};
pub use error::{GaugeError, GaugeResult, PoolError, SampleError, ValidationError};
pub use execution::{AsyncTask, ExecutionWrapper, Expectation, Sample, Task};
pub use measure::{measure_latency, measure_throughput};
pub use pool::WorkerPool;
pub use probe::{LatencyProbe, ProbeResult, ThroughputProbe};
pub use search::{AdaptiveConcurrencySearch, Phase, SearchOutcome};
pub use suite::{module_load_test, service_load_test, Case, ModuleCaseResult, ServiceCaseResult};
pub use types::{CaseName, Concurrency, SampleCount};
