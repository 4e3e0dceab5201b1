// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! `gauge probe` command - Measure one built-in workload ad hoc.

use std::error::Error;
use std::time::Duration;

use loadgauge_core::{
    CaseName, CaseSpec, Concurrency, ProbeConfig, SampleCount, SuiteMode, SuiteSpec,
    WorkloadSpec,
};

use crate::WorkloadKind;

/// Flattened `gauge probe` arguments.
#[derive(Debug, Clone)]
pub struct ProbeArgs {
    pub workload: WorkloadKind,
    pub duration_ms: u64,
    pub pool_size: usize,
    pub iterations: u64,
    pub input: u64,
    pub skip: bool,
    pub samples: Option<usize>,
    pub max_concurrency: Option<usize>,
}

impl ProbeArgs {
    fn workload_spec(&self) -> Result<WorkloadSpec, Box<dyn Error>> {
        let duration = Duration::from_millis(self.duration_ms);
        Ok(match self.workload {
            WorkloadKind::Sleep => WorkloadSpec::Sleep { duration },
            WorkloadKind::PooledSleep => WorkloadSpec::PooledSleep {
                duration,
                pool_size: Concurrency::new(self.pool_size)?,
            },
            WorkloadKind::AsyncSleep => WorkloadSpec::AsyncSleep { duration },
            WorkloadKind::Spin => WorkloadSpec::Spin {
                iterations: self.iterations,
            },
            WorkloadKind::Fail => WorkloadSpec::Fail {
                message: "injected failure".to_string(),
            },
        })
    }

    fn probe_config(&self) -> Result<ProbeConfig, Box<dyn Error>> {
        let mut config = ProbeConfig::from_env()?;
        if let Some(samples) = self.samples {
            config = config.with_final_sample_count(SampleCount::new(samples)?);
        }
        if let Some(ceiling) = self.max_concurrency {
            config = config.with_max_concurrency(Concurrency::new(ceiling)?);
        }
        Ok(config)
    }

    fn suite(&self) -> Result<SuiteSpec, Box<dyn Error>> {
        Ok(SuiteSpec {
            name: CaseName::new("probe")?,
            mode: SuiteMode::Service,
            skip: self.skip,
            workload: self.workload_spec()?,
            cases: vec![CaseSpec {
                name: CaseName::new(format!("{:?}", self.workload).to_lowercase())?,
                input: self.input,
                expected: self.input,
            }],
        })
    }
}

pub fn execute(args: ProbeArgs) -> Result<(), Box<dyn Error>> {
    let config = args.probe_config()?;
    let suite = args.suite()?;

    tracing::info!(workload = ?args.workload, "Probing workload");

    for case in super::run::measure_suite(&suite, &config)? {
        super::print_case(&case);
    }
    Ok(())
}
