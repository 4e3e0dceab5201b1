// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Timed, classified invocation of a task.
//!
//! [`ExecutionWrapper`] is the single place where a task is actually called.
//! Every probe goes through it, so every sample is timed and classified the
//! same way regardless of whether it ran on the caller's thread or a worker.

use std::any::Any;
use std::fmt;
use std::future::Future;
use std::panic::{self, AssertUnwindSafe};
use std::time::{Duration, Instant};

use crate::error::SampleError;

/// A unit of work under measurement: one input in, one output out.
///
/// Implemented for every `Fn(&I) -> Result<O, E>` that can be shared
/// between worker threads.
pub trait Task<I, O>: Sync {
    type Error: fmt::Display;

    fn invoke(&self, input: &I) -> Result<O, Self::Error>;
}

impl<I, O, E, F> Task<I, O> for F
where
    F: Fn(&I) -> Result<O, E> + Sync,
    E: fmt::Display,
{
    type Error = E;

    fn invoke(&self, input: &I) -> Result<O, E> {
        self(input)
    }
}

/// Adapts an async function to [`Task`] by blocking on a tokio runtime.
///
/// Invocations happen on probe threads, never inside the runtime, so the
/// caller must not drive a probe of an `AsyncTask` from an async context.
pub struct AsyncTask<F> {
    handle: tokio::runtime::Handle,
    func: F,
}

impl<F> AsyncTask<F> {
    pub fn new(handle: tokio::runtime::Handle, func: F) -> Self {
        Self { handle, func }
    }
}

impl<I, O, E, F, Fut> Task<I, O> for AsyncTask<F>
where
    F: Fn(&I) -> Fut + Sync,
    Fut: Future<Output = Result<O, E>>,
    E: fmt::Display,
{
    type Error = E;

    fn invoke(&self, input: &I) -> Result<O, E> {
        self.handle.block_on((self.func)(input))
    }
}

type Matcher<O> = Box<dyn Fn(&O, &O) -> bool + Send + Sync>;

/// What a successful invocation must return.
///
/// Holds the expected output, the equality predicate used to compare it
/// with the actual output, and the skip flag. With `skip` set only liveness
/// is checked: any normal return counts as a success.
pub struct Expectation<O> {
    expected: O,
    matcher: Matcher<O>,
    skip: bool,
}

impl<O> Expectation<O> {
    /// Compare outputs with `PartialEq`.
    pub fn equals(expected: O) -> Self
    where
        O: PartialEq + 'static,
    {
        Self {
            expected,
            matcher: Box::new(|expected: &O, actual: &O| expected == actual),
            skip: false,
        }
    }

    /// Compare outputs with a caller-supplied predicate `(expected, actual)`.
    pub fn matching<M>(expected: O, matcher: M) -> Self
    where
        M: Fn(&O, &O) -> bool + Send + Sync + 'static,
    {
        Self {
            expected,
            matcher: Box::new(matcher),
            skip: false,
        }
    }

    /// Set whether the output check is skipped.
    pub fn skip(mut self, skip: bool) -> Self {
        self.skip = skip;
        self
    }

    pub fn is_skipped(&self) -> bool {
        self.skip
    }

    pub fn expected(&self) -> &O {
        &self.expected
    }

    fn accepts(&self, actual: &O) -> bool {
        self.skip || (self.matcher)(&self.expected, actual)
    }
}

impl<O: fmt::Debug> fmt::Debug for Expectation<O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Expectation")
            .field("expected", &self.expected)
            .field("skip", &self.skip)
            .finish_non_exhaustive()
    }
}

/// Result of one task invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    /// Wall time from invocation until return or fault.
    pub latency: Duration,
    /// Present iff the sample failed.
    pub error: Option<SampleError>,
}

impl Sample {
    pub fn success(latency: Duration) -> Self {
        Self {
            latency,
            error: None,
        }
    }

    pub fn failure(latency: Duration, error: SampleError) -> Self {
        Self {
            latency,
            error: Some(error),
        }
    }

    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

/// Binds a task, its input and its expectation into one repeatable,
/// timed invocation. No retries; nothing but the task is called.
pub struct ExecutionWrapper<'a, T, I, O> {
    task: &'a T,
    input: &'a I,
    expectation: &'a Expectation<O>,
}

impl<'a, T, I, O> ExecutionWrapper<'a, T, I, O>
where
    T: Task<I, O>,
    O: fmt::Debug,
{
    pub fn new(task: &'a T, input: &'a I, expectation: &'a Expectation<O>) -> Self {
        Self {
            task,
            input,
            expectation,
        }
    }

    /// Invoke the task once and classify the outcome.
    pub fn run(&self) -> Sample {
        let start = Instant::now();
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| self.task.invoke(self.input)));
        let latency = start.elapsed();

        match outcome {
            Ok(Ok(actual)) => {
                if self.expectation.accepts(&actual) {
                    Sample::success(latency)
                } else {
                    Sample::failure(
                        latency,
                        SampleError::Mismatch {
                            expected: format!("{:?}", self.expectation.expected),
                            actual: format!("{:?}", actual),
                        },
                    )
                }
            }
            Ok(Err(e)) => Sample::failure(
                latency,
                SampleError::Task {
                    message: e.to_string(),
                },
            ),
            Err(payload) => Sample::failure(
                latency,
                SampleError::Panicked {
                    message: panic_message(payload.as_ref()),
                },
            ),
        }
    }
}

/// Best-effort text of a panic payload.
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::convert::Infallible;
    use std::thread;

    fn echo_after(input: &u64) -> Result<u64, Infallible> {
        thread::sleep(Duration::from_millis(5));
        Ok(*input)
    }

    fn always_fails(_: &u64) -> Result<u64, String> {
        Err("backend unavailable".to_string())
    }

    fn always_panics(_: &u64) -> Result<u64, String> {
        panic!("handler exploded")
    }

    #[test]
    fn test_matching_output_is_success() {
        let expectation = Expectation::equals(1u64);
        let sample = ExecutionWrapper::new(&echo_after, &1, &expectation).run();

        assert!(sample.is_success());
        assert!(sample.latency >= Duration::from_millis(5));
    }

    #[test]
    fn test_mismatch_still_measures_latency() {
        let expectation = Expectation::equals(2u64);
        let sample = ExecutionWrapper::new(&echo_after, &1, &expectation).run();

        assert!(!sample.is_success());
        assert!(sample.latency >= Duration::from_millis(5));
        assert_eq!(
            sample.error,
            Some(SampleError::Mismatch {
                expected: "2".to_string(),
                actual: "1".to_string(),
            })
        );
    }

    #[test]
    fn test_skip_accepts_any_output() {
        let expectation = Expectation::equals(2u64).skip(true);
        let sample = ExecutionWrapper::new(&echo_after, &1, &expectation).run();
        assert!(sample.is_success());
    }

    #[test]
    fn test_skip_does_not_hide_task_faults() {
        let expectation = Expectation::equals(1u64).skip(true);
        let sample = ExecutionWrapper::new(&always_fails, &1, &expectation).run();

        match sample.error {
            Some(SampleError::Task { message }) => assert_eq!(message, "backend unavailable"),
            other => panic!("unexpected outcome: {:?}", other),
        }
    }

    #[test]
    fn test_panic_is_captured_as_fault() {
        let expectation = Expectation::equals(1u64);
        let sample = ExecutionWrapper::new(&always_panics, &1, &expectation).run();

        match sample.error {
            Some(SampleError::Panicked { message }) => assert!(message.contains("exploded")),
            other => panic!("unexpected outcome: {:?}", other),
        }
    }

    #[test]
    fn test_custom_matcher() {
        let approx = |input: &f64| -> Result<f64, Infallible> { Ok(input / 3.0 * 3.0) };
        let expectation = Expectation::matching(1.0f64, |e: &f64, a: &f64| (e - a).abs() < 1e-9);
        let sample = ExecutionWrapper::new(&approx, &1.0, &expectation).run();
        assert!(sample.is_success());
    }

    #[test]
    fn test_async_task_blocks_on_runtime() {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .enable_all()
            .build()
            .unwrap();

        let task = AsyncTask::new(runtime.handle().clone(), |input: &u64| {
            let input = *input;
            async move {
                tokio::time::sleep(Duration::from_millis(5)).await;
                Ok::<u64, Infallible>(input + 1)
            }
        });

        let expectation = Expectation::equals(8u64);
        let sample = ExecutionWrapper::new(&task, &7, &expectation).run();
        assert!(sample.is_success());
        assert!(sample.latency >= Duration::from_millis(5));
    }
}
