// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! `gauge run` command - Run configured suites.

use std::error::Error;
use std::path::Path;

use loadgauge_core::{
    module_load_test, service_load_test, Case, ConfigLoader, ProbeConfig, SampleCount,
    SuiteMode, SuiteSpec,
};
use loadgauge_report::{CaseReport, JsonReporter, SuiteReport};

use crate::workloads::Workload;

pub fn execute(
    config_path: &str,
    filter: &[String],
    output: Option<&Path>,
    samples: Option<usize>,
) -> Result<(), Box<dyn Error>> {
    let config = ConfigLoader::load_file(config_path)?;

    let mut probe = config.probe.with_env_overrides()?;
    if let Some(samples) = samples {
        probe = probe.with_final_sample_count(SampleCount::new(samples)?);
    }

    let selected: Vec<&SuiteSpec> = config
        .suites
        .iter()
        .filter(|suite| filter.is_empty() || filter.iter().any(|name| name == suite.name.as_str()))
        .collect();

    if selected.is_empty() {
        return Err(format!("No suite in {} matches {:?}", config_path, filter).into());
    }

    tracing::info!(
        suites = selected.len(),
        final_samples = %probe.final_sample_count,
        max_concurrency = %probe.max_concurrency,
        "Starting run"
    );

    let mut report = SuiteReport::new(probe);
    for suite in selected {
        println!("{} [{}]", suite.name, suite.mode);
        for case in measure_suite(suite, &probe)? {
            super::print_case(&case);
            report.add_case(case);
        }
    }

    if let Some(dir) = output {
        let path = JsonReporter::new(dir)?.save(&report)?;
        println!();
        println!("Report written to {}", path.display());
    }

    Ok(())
}

/// Run every case of one suite against its workload.
pub(crate) fn measure_suite(
    suite: &SuiteSpec,
    probe: &ProbeConfig,
) -> Result<Vec<CaseReport>, Box<dyn Error>> {
    let workload = Workload::from_spec(&suite.workload)?;

    let cases: Vec<Case<u64, u64>> = suite
        .cases
        .iter()
        .map(|spec| {
            let (input, expected) = (spec.input, spec.expected);
            Case::new(spec.name.as_str(), move || input, move || expected)
        })
        .collect();

    let suite_name = suite.name.as_str();
    let reports: Vec<CaseReport> = match suite.mode {
        SuiteMode::Module => module_load_test(&workload, &cases, suite.skip, probe)
            .into_iter()
            .map(|r| CaseReport::module(suite_name, &r.name, suite.skip, &r.latency))
            .collect(),
        SuiteMode::Service => service_load_test(&workload, &cases, suite.skip, probe)?
            .into_iter()
            .map(|r| {
                CaseReport::service(suite_name, &r.name, suite.skip, &r.latency, &r.throughput)
            })
            .collect(),
    };

    Ok(reports)
}

#[cfg(test)]
mod tests {
    use super::*;
    use loadgauge_core::Concurrency;
    use tempfile::TempDir;

    const CONFIG: &str = r#"
probe:
  final_sample_count: 2
  max_concurrency: 4
suites:
  - name: quick
    mode: module
    workload: { kind: sleep, duration_ms: 1 }
    cases:
      - name: right
        input: 3
      - name: wrong
        input: 3
        expected: 4
  - name: pooled
    workload: { kind: pooled_sleep, duration_ms: 2, pool_size: 2 }
    cases:
      - name: one
        input: 1
"#;

    #[test]
    fn test_measure_module_suite() {
        let config = ConfigLoader::load_string(CONFIG).unwrap();
        let cases = measure_suite(&config.suites[0], &config.probe).unwrap();

        assert_eq!(cases.len(), 2);
        assert_eq!(cases[0].suite, "quick");
        assert_eq!(cases[0].latency.success_rate, 1.0);
        assert_eq!(cases[1].latency.success_rate, 0.0);
        assert!(cases.iter().all(|c| c.throughput.is_none()));
    }

    #[test]
    fn test_measure_service_suite_respects_ceiling() {
        let config = ConfigLoader::load_string(CONFIG).unwrap();
        let probe = config
            .probe
            .with_max_concurrency(Concurrency::new(4).unwrap());
        let cases = measure_suite(&config.suites[1], &probe).unwrap();

        let throughput = cases[0].throughput.as_ref().unwrap();
        assert!(throughput.concurrency >= 1 && throughput.concurrency <= 4);
    }

    #[test]
    fn test_run_writes_report() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("gauge.yaml");
        std::fs::write(&config_path, CONFIG).unwrap();
        let out = temp_dir.path().join("reports");

        execute(
            config_path.to_str().unwrap(),
            &["quick".to_string()],
            Some(&out),
            Some(1),
        )
        .unwrap();

        let reports = JsonReporter::new(&out).unwrap().list_reports().unwrap();
        assert_eq!(reports.len(), 1);
        let report = JsonReporter::load(&reports[0]).unwrap();
        assert_eq!(report.cases.len(), 2);
        assert_eq!(report.config.final_sample_count.get(), 1);
    }

    #[test]
    fn test_run_unknown_suite_fails() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("gauge.yaml");
        std::fs::write(&config_path, CONFIG).unwrap();

        let result = execute(
            config_path.to_str().unwrap(),
            &["missing".to_string()],
            None,
            None,
        );
        assert!(result.is_err());
    }
}
