// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! loadgauge CLI
//!
//! Command-line interface for measuring task latency and sustainable
//! concurrency.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

mod commands;
mod workloads;

/// loadgauge - Latency and sustainable-concurrency measurement
#[derive(Parser)]
#[command(name = "gauge")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "gauge.yaml")]
    pub config: String,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the suites defined in the configuration file
    Run {
        /// Only run suites with this name (repeatable)
        #[arg(short, long = "suite")]
        suites: Vec<String>,

        /// Write a JSON report into this directory
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Final sample count, overrides config and LOAD_TEST_TIMES
        #[arg(long)]
        samples: Option<usize>,
    },

    /// Validate a configuration file
    Validate {
        /// Path to the configuration file
        file: String,
    },

    /// Measure a single built-in workload without a configuration file
    Probe {
        #[arg(short, long, value_enum, default_value_t = WorkloadKind::Sleep)]
        workload: WorkloadKind,

        /// Sleep duration for the sleep workloads
        #[arg(long, default_value_t = 10)]
        duration_ms: u64,

        /// Worker count for pooled-sleep
        #[arg(long, default_value_t = 4)]
        pool_size: usize,

        /// Rounds for spin
        #[arg(long, default_value_t = 100_000)]
        iterations: u64,

        /// Input fed to every invocation
        #[arg(long, default_value_t = 1)]
        input: u64,

        /// Only check liveness, ignore the output
        #[arg(long)]
        skip: bool,

        /// Final sample count
        #[arg(long)]
        samples: Option<usize>,

        /// Upper bound for the concurrency search
        #[arg(long)]
        max_concurrency: Option<usize>,
    },
}

/// Built-in workloads selectable from the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum WorkloadKind {
    Sleep,
    PooledSleep,
    AsyncSleep,
    Spin,
    Fail,
}

// Not #[tokio::main]: async workloads block on their own runtime from probe
// worker threads, which must not happen inside a runtime.
fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    // Dispatch to command handlers
    match cli.command {
        Commands::Run {
            suites,
            output,
            samples,
        } => commands::run::execute(&cli.config, &suites, output.as_deref(), samples),
        Commands::Validate { file } => commands::validate::execute(&file),
        Commands::Probe {
            workload,
            duration_ms,
            pool_size,
            iterations,
            input,
            skip,
            samples,
            max_concurrency,
        } => commands::probe::execute(commands::probe::ProbeArgs {
            workload,
            duration_ms,
            pool_size,
            iterations,
            input,
            skip,
            samples,
            max_concurrency,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_run_with_filters() {
        let cli = Cli::try_parse_from([
            "gauge", "-c", "suites.yaml", "run", "--suite", "a", "--suite", "b", "--samples", "4",
        ])
        .unwrap();

        assert_eq!(cli.config, "suites.yaml");
        match cli.command {
            Commands::Run {
                suites,
                output,
                samples,
            } => {
                assert_eq!(suites, vec!["a", "b"]);
                assert!(output.is_none());
                assert_eq!(samples, Some(4));
            }
            _ => panic!("expected run"),
        }
    }

    #[test]
    fn test_parse_probe_defaults() {
        let cli = Cli::try_parse_from(["gauge", "probe", "--workload", "pooled-sleep"]).unwrap();

        match cli.command {
            Commands::Probe {
                workload,
                duration_ms,
                pool_size,
                skip,
                ..
            } => {
                assert_eq!(workload, WorkloadKind::PooledSleep);
                assert_eq!(duration_ms, 10);
                assert_eq!(pool_size, 4);
                assert!(!skip);
            }
            _ => panic!("expected probe"),
        }
    }

    #[test]
    fn test_unknown_workload_rejected() {
        assert!(Cli::try_parse_from(["gauge", "probe", "--workload", "teleport"]).is_err());
    }
}
