// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Fixed-size worker pools.
//!
//! Two shapes share one design: named OS threads pulling work from a
//! `flume` MPMC queue.
//!
//! - [`fan_out`] builds a pool for exactly one batch of jobs on
//!   `std::thread::scope`, so jobs may borrow from the caller and every
//!   worker is joined before it returns. Throughput probes use this.
//! - [`WorkerPool`] is long-lived and joins its workers on drop. It is the
//!   building block for tasks whose own capacity is bounded by a pool.

use std::panic::{self, AssertUnwindSafe};
use std::thread::{self, JoinHandle};

use crate::error::PoolError;
use crate::execution::panic_message;
use crate::types::Concurrency;

/// Run `job` exactly `jobs` times on `workers` threads and return every
/// result once all of them have completed.
///
/// Results come back in completion order per worker, not submission order.
/// If a worker cannot be spawned the queue is drained, already-running jobs
/// are awaited, and the spawn error is returned.
pub fn fan_out<T, F>(workers: Concurrency, jobs: usize, job: F) -> Result<Vec<T>, PoolError>
where
    T: Send,
    F: Fn() -> T + Sync,
{
    let (sender, receiver) = flume::unbounded::<usize>();
    for index in 0..jobs {
        // Receiver is alive for the whole loop.
        let _ = sender.send(index);
    }
    drop(sender);

    thread::scope(|scope| {
        let mut handles = Vec::with_capacity(workers.get());
        let mut spawn_error = None;

        for worker in 0..workers.get() {
            let receiver = receiver.clone();
            let job = &job;
            let spawned = thread::Builder::new()
                .name(format!("gauge-worker-{}", worker))
                .spawn_scoped(scope, move || {
                    let mut produced = Vec::new();
                    while receiver.recv().is_ok() {
                        produced.push(job());
                    }
                    produced
                });

            match spawned {
                Ok(handle) => handles.push(handle),
                Err(source) => {
                    tracing::error!(worker = worker, error = %source, "Failed to spawn worker");
                    spawn_error = Some(PoolError::Spawn { worker, source });
                    break;
                }
            }
        }

        if spawn_error.is_some() {
            let abandoned = receiver.drain().count();
            tracing::warn!(abandoned = abandoned, "Abandoned queued jobs");
        }
        drop(receiver);

        let mut results = Vec::with_capacity(jobs);
        let mut worker_panicked = false;
        for handle in handles {
            match handle.join() {
                Ok(mut produced) => results.append(&mut produced),
                Err(_) => worker_panicked = true,
            }
        }

        if let Some(err) = spawn_error {
            return Err(err);
        }
        if worker_panicked {
            return Err(PoolError::WorkerPanicked);
        }
        Ok(results)
    })
}

type Job = Box<dyn FnOnce() + Send + 'static>;

/// Long-lived pool of `size` named worker threads.
///
/// Dropping the pool closes the queue, lets queued jobs finish and joins
/// every worker.
pub struct WorkerPool {
    name: String,
    sender: Option<flume::Sender<Job>>,
    workers: Vec<JoinHandle<()>>,
}

impl WorkerPool {
    /// Spawn a pool with `size` workers named `{name}-{index}`.
    pub fn new(name: impl Into<String>, size: Concurrency) -> Result<Self, PoolError> {
        let (sender, receiver) = flume::unbounded::<Job>();
        let mut pool = Self {
            name: name.into(),
            sender: Some(sender),
            workers: Vec::with_capacity(size.get()),
        };

        for index in 0..size.get() {
            let receiver = receiver.clone();
            // On error `pool` is dropped here, which joins the workers
            // spawned so far.
            let handle = thread::Builder::new()
                .name(format!("{}-{}", pool.name, index))
                .spawn(move || {
                    while let Ok(job) = receiver.recv() {
                        job();
                    }
                })
                .map_err(|source| PoolError::Spawn {
                    worker: index,
                    source,
                })?;
            pool.workers.push(handle);
        }

        tracing::debug!(pool = %pool.name, size = size.get(), "Worker pool started");
        Ok(pool)
    }

    /// Number of worker threads.
    pub fn size(&self) -> usize {
        self.workers.len()
    }

    /// Queue a job and return a ticket for its result.
    pub fn submit<F, R>(&self, job: F) -> Result<Ticket<R>, PoolError>
    where
        F: FnOnce() -> R + Send + 'static,
        R: Send + 'static,
    {
        let sender = self.sender.as_ref().ok_or(PoolError::Disconnected)?;
        let (reply, receiver) = flume::bounded(1);

        let job: Job = Box::new(move || {
            let outcome = panic::catch_unwind(AssertUnwindSafe(job))
                .map_err(|payload| panic_message(payload.as_ref()));
            // The ticket may have been dropped; nobody is waiting then.
            let _ = reply.send(outcome);
        });
        sender.send(job).map_err(|_| PoolError::Disconnected)?;

        Ok(Ticket { receiver })
    }

    /// Queue a job and block until it has run.
    pub fn execute<F, R>(&self, job: F) -> Result<R, PoolError>
    where
        F: FnOnce() -> R + Send + 'static,
        R: Send + 'static,
    {
        self.submit(job)?.wait()
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        drop(self.sender.take());
        for handle in self.workers.drain(..) {
            if handle.join().is_err() {
                tracing::error!(pool = %self.name, "Worker thread panicked during shutdown");
            }
        }
        tracing::debug!(pool = %self.name, "Worker pool stopped");
    }
}

/// Pending result of a job submitted to a [`WorkerPool`].
pub struct Ticket<R> {
    receiver: flume::Receiver<Result<R, String>>,
}

impl<R> Ticket<R> {
    /// Block until the job has run.
    pub fn wait(self) -> Result<R, PoolError> {
        match self.receiver.recv() {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(message)) => Err(PoolError::JobPanicked { message }),
            Err(_) => Err(PoolError::Disconnected),
        }
    }
}
