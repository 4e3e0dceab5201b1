// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! `gauge validate` command - Validate configuration file.

use loadgauge_core::{ConfigLoader, WorkloadSpec};

fn describe(workload: &WorkloadSpec) -> String {
    match workload {
        WorkloadSpec::Sleep { duration } => format!("sleep {:?}", duration),
        WorkloadSpec::PooledSleep {
            duration,
            pool_size,
        } => format!("pooled_sleep {:?} on {} workers", duration, pool_size),
        WorkloadSpec::AsyncSleep { duration } => format!("async_sleep {:?}", duration),
        WorkloadSpec::Spin { iterations } => format!("spin {} rounds", iterations),
        WorkloadSpec::Fail { message } => format!("fail ({})", message),
    }
}

pub fn execute(file: &str) -> Result<(), Box<dyn std::error::Error>> {
    tracing::info!(file = %file, "Validating configuration");

    match ConfigLoader::load_file(file) {
        Ok(config) => {
            println!("✓ Configuration is valid");
            println!();
            println!("Probe Settings:");
            println!(
                "  Final Samples:      {}",
                config.probe.final_sample_count
            );
            println!(
                "  Search Samples:     {} per worker",
                config.probe.search_samples_per_worker
            );
            println!("  Max Concurrency:    {}", config.probe.max_concurrency);
            println!();
            println!("Suites ({}):", config.suites.len());
            for suite in &config.suites {
                println!(
                    "  - {} ({}, {}{})",
                    suite.name,
                    suite.mode,
                    describe(&suite.workload),
                    if suite.skip { ", outputs ignored" } else { "" }
                );
                for case in &suite.cases {
                    println!(
                        "      {}: input {} expect {}",
                        case.name, case.input, case.expected
                    );
                }
            }
            Ok(())
        }
        Err(e) => {
            eprintln!("✗ Configuration validation failed:");
            eprintln!("  {}", e);
            std::process::exit(1);
        }
    }
}
