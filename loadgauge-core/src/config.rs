// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! YAML configuration parser with strict schema validation.
//!
//! Raw structs mirror the file; [`ConfigLoader`] validates them into typed
//! configuration before anything runs. The only environment input is
//! `LOAD_TEST_TIMES`, applied explicitly through
//! [`ProbeConfig::with_env_overrides`].

use std::collections::HashSet;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{GaugeError, GaugeResult, ValidationError};
use crate::types::{CaseName, Concurrency, SampleCount};

/// Samples for baseline latency and final verification probes.
pub const DEFAULT_FINAL_SAMPLE_COUNT: usize = 32;
/// Samples per worker for the probes issued while searching.
pub const DEFAULT_SEARCH_SAMPLES_PER_WORKER: usize = 2;
/// Ceiling for the growth phase of the concurrency search.
pub const DEFAULT_MAX_CONCURRENCY: usize = 1024;
/// Environment variable overriding the final sample count.
pub const SAMPLE_COUNT_ENV: &str = "LOAD_TEST_TIMES";

/// Longest sleep a workload may request.
const MAX_WORKLOAD_DURATION_MS: u64 = 60_000;
/// Largest pool a pooled workload may request.
const MAX_WORKLOAD_POOL_SIZE: usize = 1024;

/// Raw probe settings as parsed from YAML (before validation).
#[derive(Debug, Deserialize)]
struct RawProbeConfig {
    #[serde(default = "default_final_sample_count")]
    final_sample_count: usize,
    #[serde(default = "default_search_samples_per_worker")]
    search_samples_per_worker: usize,
    #[serde(default = "default_max_concurrency")]
    max_concurrency: usize,
}

fn default_final_sample_count() -> usize {
    DEFAULT_FINAL_SAMPLE_COUNT
}

fn default_search_samples_per_worker() -> usize {
    DEFAULT_SEARCH_SAMPLES_PER_WORKER
}

fn default_max_concurrency() -> usize {
    DEFAULT_MAX_CONCURRENCY
}

impl Default for RawProbeConfig {
    fn default() -> Self {
        Self {
            final_sample_count: default_final_sample_count(),
            search_samples_per_worker: default_search_samples_per_worker(),
            max_concurrency: default_max_concurrency(),
        }
    }
}

/// Raw workload description.
#[derive(Debug, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
enum RawWorkload {
    Sleep {
        duration_ms: u64,
    },
    PooledSleep {
        duration_ms: u64,
        pool_size: usize,
    },
    AsyncSleep {
        duration_ms: u64,
    },
    Spin {
        iterations: u64,
    },
    Fail {
        #[serde(default = "default_fail_message")]
        message: String,
    },
}

fn default_fail_message() -> String {
    "injected failure".to_string()
}

/// Raw test case.
#[derive(Debug, Deserialize)]
struct RawCase {
    name: String,
    input: u64,
    #[serde(default)]
    expected: Option<u64>,
}

/// Raw suite: one workload, many cases.
#[derive(Debug, Deserialize)]
struct RawSuite {
    name: String,
    #[serde(default)]
    mode: SuiteMode,
    #[serde(default)]
    skip: bool,
    workload: RawWorkload,
    cases: Vec<RawCase>,
}

/// Raw root configuration file.
#[derive(Debug, Deserialize)]
struct RawConfig {
    #[serde(default)]
    probe: RawProbeConfig,
    suites: Vec<RawSuite>,
}

/// Validated probe settings, passed explicitly into every entry point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProbeConfig {
    pub final_sample_count: SampleCount,
    pub search_samples_per_worker: SampleCount,
    pub max_concurrency: Concurrency,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            final_sample_count: SampleCount::new_unchecked(DEFAULT_FINAL_SAMPLE_COUNT),
            search_samples_per_worker: SampleCount::new_unchecked(
                DEFAULT_SEARCH_SAMPLES_PER_WORKER,
            ),
            max_concurrency: Concurrency::new_unchecked(DEFAULT_MAX_CONCURRENCY),
        }
    }
}

impl ProbeConfig {
    /// Defaults with `LOAD_TEST_TIMES` applied.
    pub fn from_env() -> GaugeResult<Self> {
        Self::default().with_env_overrides()
    }

    /// Apply `LOAD_TEST_TIMES`, if set, as the final sample count.
    pub fn with_env_overrides(self) -> GaugeResult<Self> {
        match std::env::var(SAMPLE_COUNT_ENV) {
            Ok(raw) => Ok(self.with_sample_override(&raw)?),
            Err(std::env::VarError::NotPresent) => Ok(self),
            Err(std::env::VarError::NotUnicode(value)) => {
                Err(ValidationError::InvalidFieldValue {
                    field: "LOAD_TEST_TIMES",
                    value: value.to_string_lossy().into_owned(),
                    reason: "Must be valid UTF-8".to_string(),
                }
                .into())
            }
        }
    }

    /// Parse `raw` as the final sample count.
    pub fn with_sample_override(self, raw: &str) -> Result<Self, ValidationError> {
        let parsed: usize =
            raw.trim()
                .parse()
                .map_err(|_| ValidationError::InvalidFieldValue {
                    field: "LOAD_TEST_TIMES",
                    value: raw.to_string(),
                    reason: "Must be a positive integer".to_string(),
                })?;
        Ok(self.with_final_sample_count(SampleCount::new(parsed)?))
    }

    pub fn with_final_sample_count(mut self, samples: SampleCount) -> Self {
        self.final_sample_count = samples;
        self
    }

    pub fn with_max_concurrency(mut self, ceiling: Concurrency) -> Self {
        self.max_concurrency = ceiling;
        self
    }

    pub fn with_search_samples_per_worker(mut self, samples: SampleCount) -> Self {
        self.search_samples_per_worker = samples;
        self
    }
}

/// Which entry points a suite runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SuiteMode {
    /// Baseline latency only.
    Module,
    /// Baseline latency, then the concurrency search.
    #[default]
    Service,
}

impl std::fmt::Display for SuiteMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SuiteMode::Module => write!(f, "module"),
            SuiteMode::Service => write!(f, "service"),
        }
    }
}

/// Validated workload description. Each kind maps onto a built-in task
/// that echoes its input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum WorkloadSpec {
    /// Blocks the calling thread.
    Sleep { duration: Duration },
    /// Blocks on a private pool of `pool_size` workers.
    PooledSleep {
        duration: Duration,
        pool_size: Concurrency,
    },
    /// Sleeps on a tokio runtime.
    AsyncSleep { duration: Duration },
    /// Burns CPU for `iterations` rounds.
    Spin { iterations: u64 },
    /// Always returns an error.
    Fail { message: String },
}

/// A single case: the input to feed and the output to expect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaseSpec {
    pub name: CaseName,
    pub input: u64,
    pub expected: u64,
}

/// A validated suite.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuiteSpec {
    pub name: CaseName,
    pub mode: SuiteMode,
    pub skip: bool,
    pub workload: WorkloadSpec,
    pub cases: Vec<CaseSpec>,
}

/// Complete validated configuration.
#[derive(Debug, Clone)]
pub struct GaugeConfig {
    pub probe: ProbeConfig,
    pub suites: Vec<SuiteSpec>,
}

/// Configuration loader with strict validation.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load and validate configuration from a YAML file.
    pub fn load_file(path: impl AsRef<Path>) -> GaugeResult<GaugeConfig> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(GaugeError::ConfigNotFound {
                path: path.to_path_buf(),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| GaugeError::Io {
            context: "reading config file",
            source: e,
        })?;

        Self::load_string(&content)
    }

    /// Load and validate configuration from a YAML string.
    pub fn load_string(content: &str) -> GaugeResult<GaugeConfig> {
        let raw: RawConfig =
            serde_yaml::from_str(content).map_err(|e| GaugeError::ConfigParse {
                message: format!("YAML parse error: {}", e),
            })?;

        Ok(Self::validate(raw)?)
    }

    fn validate(raw: RawConfig) -> Result<GaugeConfig, ValidationError> {
        let probe = Self::validate_probe(raw.probe)?;

        if raw.suites.is_empty() {
            return Err(ValidationError::SchemaValidation {
                message: "At least one suite must be defined".to_string(),
            });
        }

        let mut suites = Vec::with_capacity(raw.suites.len());
        let mut seen_suites = HashSet::new();
        for raw_suite in raw.suites {
            let suite = Self::validate_suite(raw_suite)?;
            if !seen_suites.insert(suite.name.clone()) {
                return Err(ValidationError::DuplicateName {
                    name: suite.name.to_string(),
                });
            }
            suites.push(suite);
        }

        Ok(GaugeConfig { probe, suites })
    }

    fn validate_probe(raw: RawProbeConfig) -> Result<ProbeConfig, ValidationError> {
        let field = |field: &'static str, value: usize| {
            move |e: ValidationError| match e {
                ValidationError::InvalidFieldValue { reason, .. } => {
                    ValidationError::InvalidFieldValue {
                        field,
                        value: value.to_string(),
                        reason,
                    }
                }
                other => other,
            }
        };

        Ok(ProbeConfig {
            final_sample_count: SampleCount::new(raw.final_sample_count)
                .map_err(field("final_sample_count", raw.final_sample_count))?,
            search_samples_per_worker: SampleCount::new(raw.search_samples_per_worker)
                .map_err(field("search_samples_per_worker", raw.search_samples_per_worker))?,
            max_concurrency: Concurrency::new(raw.max_concurrency)
                .map_err(field("max_concurrency", raw.max_concurrency))?,
        })
    }

    fn validate_suite(raw: RawSuite) -> Result<SuiteSpec, ValidationError> {
        let name = CaseName::new(raw.name)?;
        let workload = Self::validate_workload(raw.workload)?;

        if raw.cases.is_empty() {
            return Err(ValidationError::MissingRequiredField {
                field: "cases",
                context: format!("suite '{}'", name),
            });
        }

        let mut cases = Vec::with_capacity(raw.cases.len());
        let mut seen_cases = HashSet::new();
        for raw_case in raw.cases {
            let case_name = CaseName::new(raw_case.name)?;
            if !seen_cases.insert(case_name.clone()) {
                return Err(ValidationError::DuplicateName {
                    name: format!("{}/{}", name, case_name),
                });
            }
            cases.push(CaseSpec {
                name: case_name,
                input: raw_case.input,
                expected: raw_case.expected.unwrap_or(raw_case.input),
            });
        }

        Ok(SuiteSpec {
            name,
            mode: raw.mode,
            skip: raw.skip,
            workload,
            cases,
        })
    }

    fn validate_workload(raw: RawWorkload) -> Result<WorkloadSpec, ValidationError> {
        let duration = |duration_ms: u64| {
            if duration_ms > MAX_WORKLOAD_DURATION_MS {
                return Err(ValidationError::InvalidFieldValue {
                    field: "duration_ms",
                    value: duration_ms.to_string(),
                    reason: format!("Must not exceed {}ms", MAX_WORKLOAD_DURATION_MS),
                });
            }
            Ok(Duration::from_millis(duration_ms))
        };

        match raw {
            RawWorkload::Sleep { duration_ms } => Ok(WorkloadSpec::Sleep {
                duration: duration(duration_ms)?,
            }),
            RawWorkload::PooledSleep {
                duration_ms,
                pool_size,
            } => {
                if pool_size == 0 || pool_size > MAX_WORKLOAD_POOL_SIZE {
                    return Err(ValidationError::InvalidFieldValue {
                        field: "pool_size",
                        value: pool_size.to_string(),
                        reason: format!("Must be between 1 and {}", MAX_WORKLOAD_POOL_SIZE),
                    });
                }
                Ok(WorkloadSpec::PooledSleep {
                    duration: duration(duration_ms)?,
                    pool_size: Concurrency::new(pool_size)?,
                })
            }
            RawWorkload::AsyncSleep { duration_ms } => Ok(WorkloadSpec::AsyncSleep {
                duration: duration(duration_ms)?,
            }),
            RawWorkload::Spin { iterations } => {
                if iterations == 0 {
                    return Err(ValidationError::InvalidFieldValue {
                        field: "iterations",
                        value: "0".to_string(),
                        reason: "Iterations must be greater than 0".to_string(),
                    });
                }
                Ok(WorkloadSpec::Spin { iterations })
            }
            RawWorkload::Fail { message } => Ok(WorkloadSpec::Fail { message }),
        }
    }
}
