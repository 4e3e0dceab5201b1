// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! loadgauge Reports
//!
//! Serializable summaries of suite runs and a JSON reporter that writes
//! them to timestamped files.

pub mod metrics;
pub mod reporter;

pub use metrics::{
    format_latency, CaseReport, ProbeSummary, SuiteReport, SystemInfo, ThroughputSummary,
};
pub use reporter::{JsonReporter, ReporterError};
