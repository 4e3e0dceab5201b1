// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Built-in workloads that configuration files can measure.
//!
//! Every workload echoes its input, so a case's expected output is its
//! input unless the case is deliberately wrong.

use std::future::Future;
use std::hint::black_box;
use std::pin::Pin;
use std::time::Duration;

use loadgauge_core::{AsyncTask, PoolError, Task, WorkerPool, WorkloadSpec};
use thiserror::Error;
use tokio::runtime::Runtime;

#[derive(Debug, Error)]
pub enum WorkloadError {
    #[error("{message}")]
    Injected { message: String },

    #[error(transparent)]
    Pool(#[from] PoolError),

    #[error("Failed to start async runtime: {0}")]
    Runtime(#[from] std::io::Error),
}

type SleepFuture = Pin<Box<dyn Future<Output = Result<u64, WorkloadError>> + Send>>;
type AsyncSleepFn = Box<dyn Fn(&u64) -> SleepFuture + Send + Sync>;

/// A task ready to be measured.
pub enum Workload {
    Sleep(Duration),
    PooledSleep {
        duration: Duration,
        pool: WorkerPool,
    },
    AsyncSleep {
        task: AsyncTask<AsyncSleepFn>,
        // Keeps the runtime behind the task's handle alive.
        _runtime: Runtime,
    },
    Spin(u64),
    Fail(String),
}

impl Workload {
    /// Build the workload a validated spec describes. Pools and runtimes
    /// are started here, once, and reused for every sample.
    pub fn from_spec(spec: &WorkloadSpec) -> Result<Self, WorkloadError> {
        let workload = match spec {
            WorkloadSpec::Sleep { duration } => Workload::Sleep(*duration),
            WorkloadSpec::PooledSleep {
                duration,
                pool_size,
            } => Workload::PooledSleep {
                duration: *duration,
                pool: WorkerPool::new("gauge-pooled-sleep", *pool_size)?,
            },
            WorkloadSpec::AsyncSleep { duration } => {
                let runtime = tokio::runtime::Builder::new_multi_thread()
                    .thread_name("gauge-async")
                    .enable_time()
                    .build()?;
                let duration = *duration;
                let sleep: AsyncSleepFn = Box::new(move |input: &u64| -> SleepFuture {
                    let input = *input;
                    Box::pin(async move {
                        tokio::time::sleep(duration).await;
                        Ok(input)
                    })
                });
                Workload::AsyncSleep {
                    task: AsyncTask::new(runtime.handle().clone(), sleep),
                    _runtime: runtime,
                }
            }
            WorkloadSpec::Spin { iterations } => Workload::Spin(*iterations),
            WorkloadSpec::Fail { message } => Workload::Fail(message.clone()),
        };

        tracing::debug!(workload = ?spec, "Workload ready");
        Ok(workload)
    }
}

impl Task<u64, u64> for Workload {
    type Error = WorkloadError;

    fn invoke(&self, input: &u64) -> Result<u64, WorkloadError> {
        match self {
            Workload::Sleep(duration) => {
                std::thread::sleep(*duration);
                Ok(*input)
            }
            Workload::PooledSleep { duration, pool } => {
                let (duration, input) = (*duration, *input);
                Ok(pool.execute(move || {
                    std::thread::sleep(duration);
                    input
                })?)
            }
            Workload::AsyncSleep { task, .. } => task.invoke(input),
            Workload::Spin(iterations) => Ok(spin(*input, *iterations)),
            Workload::Fail(message) => Err(WorkloadError::Injected {
                message: message.clone(),
            }),
        }
    }
}

fn spin(input: u64, iterations: u64) -> u64 {
    let mut acc = input;
    for i in 0..iterations {
        acc = black_box(acc.rotate_left(7) ^ i);
    }
    black_box(acc);
    input
}
