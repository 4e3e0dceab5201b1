// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! CLI command modules.

pub mod probe;
pub mod run;
pub mod validate;

use loadgauge_report::{format_latency, CaseReport};

/// Print one line per case: latency, then the search result if any.
pub(crate) fn print_case(case: &CaseReport) {
    let latency = &case.latency;
    print!(
        "  {:<24} latency {:>10}  success {:>6.1}%",
        case.name,
        format_latency(latency.mean_latency_ns),
        latency.success_rate * 100.0
    );

    match &case.throughput {
        Some(throughput) => println!(
            "  concurrency {:>5}{}  at {:>10}  success {:>6.1}%",
            throughput.concurrency,
            if throughput.capped { "+" } else { " " },
            format_latency(throughput.mean_latency_ns),
            throughput.success_rate * 100.0
        ),
        None => println!(),
    }
}
