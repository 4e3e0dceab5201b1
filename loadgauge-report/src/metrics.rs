// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Serializable report types for suite runs.
//!
//! Durations are flattened to integer nanoseconds so reports stay easy to
//! plot and diff.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use sysinfo::System;

use loadgauge_core::{ProbeConfig, ProbeResult, SearchOutcome, SuiteMode};

/// Format a latency in human-readable form (auto-selects ns/μs/ms/s).
pub fn format_latency(ns: u64) -> String {
    if ns < 1_000 {
        format!("{}ns", ns)
    } else if ns < 1_000_000 {
        format!("{:.2}μs", ns as f64 / 1_000.0)
    } else if ns < 1_000_000_000 {
        format!("{:.2}ms", ns as f64 / 1_000_000.0)
    } else {
        format!("{:.2}s", ns as f64 / 1_000_000_000.0)
    }
}

fn as_nanos(d: Duration) -> u64 {
    d.as_nanos().min(u64::MAX as u128) as u64
}

/// Summary of a latency probe.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProbeSummary {
    pub samples: usize,
    pub failures: usize,
    pub success_rate: f64,
    pub mean_latency_ns: u64,
}

impl From<&ProbeResult> for ProbeSummary {
    fn from(result: &ProbeResult) -> Self {
        Self {
            samples: result.samples,
            failures: result.failures,
            success_rate: result.success_rate,
            mean_latency_ns: as_nanos(result.mean_latency),
        }
    }
}

/// Summary of a concurrency search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThroughputSummary {
    /// Sustainable concurrency found by the search.
    pub concurrency: usize,
    pub success_rate: f64,
    /// Mean latency of the verification probe at `concurrency`.
    pub mean_latency_ns: u64,
    pub capped: bool,
    pub probes: usize,
}

impl From<&SearchOutcome> for ThroughputSummary {
    fn from(outcome: &SearchOutcome) -> Self {
        Self {
            concurrency: outcome.concurrency.get(),
            success_rate: outcome.success_rate,
            mean_latency_ns: as_nanos(outcome.mean_latency),
            capped: outcome.capped,
            probes: outcome.probes,
        }
    }
}

/// One measured case.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaseReport {
    /// Suite name.
    pub suite: String,
    /// Case name within the suite.
    pub name: String,
    pub mode: SuiteMode,
    pub skip: bool,
    pub latency: ProbeSummary,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub throughput: Option<ThroughputSummary>,
}

impl CaseReport {
    /// Latency-only case.
    pub fn module(
        suite: impl Into<String>,
        name: impl Into<String>,
        skip: bool,
        latency: &ProbeResult,
    ) -> Self {
        Self {
            suite: suite.into(),
            name: name.into(),
            mode: SuiteMode::Module,
            skip,
            latency: latency.into(),
            throughput: None,
        }
    }

    /// Latency plus concurrency search.
    pub fn service(
        suite: impl Into<String>,
        name: impl Into<String>,
        skip: bool,
        latency: &ProbeResult,
        throughput: &SearchOutcome,
    ) -> Self {
        Self {
            suite: suite.into(),
            name: name.into(),
            mode: SuiteMode::Service,
            skip,
            latency: latency.into(),
            throughput: Some(throughput.into()),
        }
    }
}

/// System information captured at run time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemInfo {
    /// Operating system name
    pub os: String,
    /// OS version
    pub os_version: String,
    /// Kernel version (Linux)
    pub kernel_version: Option<String>,
    /// CPU model name
    pub cpu_model: String,
    /// Number of CPU cores
    pub cpu_cores: usize,
    /// Total system memory in bytes
    pub memory_bytes: u64,
    /// Hostname
    pub hostname: String,
}

impl SystemInfo {
    /// Collect current system information.
    pub fn collect() -> Self {
        let mut sys = System::new_all();
        sys.refresh_all();

        Self {
            os: System::name().unwrap_or_else(|| "Unknown".to_string()),
            os_version: System::os_version().unwrap_or_else(|| "Unknown".to_string()),
            kernel_version: System::kernel_version(),
            cpu_model: sys
                .cpus()
                .first()
                .map(|cpu| cpu.brand().to_string())
                .unwrap_or_else(|| "Unknown".to_string()),
            cpu_cores: sys.cpus().len(),
            memory_bytes: sys.total_memory(),
            hostname: System::host_name().unwrap_or_else(|| "Unknown".to_string()),
        }
    }
}

/// Complete report of one `gauge run`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuiteReport {
    /// Report identifier
    pub report: String,
    /// Tool version
    pub version: String,
    /// When the run started
    pub timestamp: DateTime<Utc>,
    pub system_info: SystemInfo,
    /// Probe settings in effect
    pub config: ProbeConfig,
    pub cases: Vec<CaseReport>,
}

impl SuiteReport {
    /// Create an empty report stamped with the current time and system.
    pub fn new(config: ProbeConfig) -> Self {
        Self {
            report: "loadgauge".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            timestamp: Utc::now(),
            system_info: SystemInfo::collect(),
            config,
            cases: Vec::new(),
        }
    }

    pub fn add_case(&mut self, case: CaseReport) {
        self.cases.push(case);
    }
}
