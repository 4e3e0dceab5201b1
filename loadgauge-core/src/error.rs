// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Custom error types for loadgauge.
//!
//! This module defines explicit enum error types.
//! No `Box<dyn Error>`, no `anyhow::Result` - all errors are strongly typed.
//!
//! Two families live here. [`SampleError`] classifies the outcome of a single
//! task invocation and is never returned from a probe: it is folded into the
//! success rate. Everything else is a harness error and does propagate.

use std::path::PathBuf;

use thiserror::Error;

/// Top-level error type for the harness.
#[derive(Debug, Error)]
pub enum GaugeError {
    // =========================================================================
    // Configuration Errors
    // =========================================================================
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Configuration file not found: {path}")]
    ConfigNotFound { path: PathBuf },

    #[error("Configuration parse error: {message}")]
    ConfigParse { message: String },

    // =========================================================================
    // Execution Errors
    // =========================================================================
    #[error("Worker pool error: {0}")]
    Pool(#[from] PoolError),

    // =========================================================================
    // System Errors
    // =========================================================================
    #[error("IO error: {context} - {source}")]
    Io {
        context: &'static str,
        #[source]
        source: std::io::Error,
    },
}

/// Invalid configuration values. Rejected before any probe runs.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Missing required field: {field} in {context}")]
    MissingRequiredField {
        field: &'static str,
        context: String,
    },

    #[error("Invalid field value: {field} = {value} - {reason}")]
    InvalidFieldValue {
        field: &'static str,
        value: String,
        reason: String,
    },

    #[error("Duplicate name: {name}")]
    DuplicateName { name: String },

    #[error("Schema validation failed: {message}")]
    SchemaValidation { message: String },
}

/// Fault captured for a single failed sample.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SampleError {
    /// The task returned an error instead of an output.
    #[error("Task failed: {message}")]
    Task { message: String },

    /// The task panicked. Treated the same as a returned error.
    #[error("Task panicked: {message}")]
    Panicked { message: String },

    /// The task returned, but not the expected output.
    #[error("Expected and actual output differ: expected {expected}, actual {actual}")]
    Mismatch { expected: String, actual: String },
}

impl SampleError {
    /// True for faults raised by the task itself (error or panic).
    pub fn is_task_fault(&self) -> bool {
        matches!(self, Self::Task { .. } | Self::Panicked { .. })
    }
}

/// Worker pool errors - resource failures of the harness, not of the task.
#[derive(Debug, Error)]
pub enum PoolError {
    #[error("Failed to spawn worker {worker}: {source}")]
    Spawn {
        worker: usize,
        #[source]
        source: std::io::Error,
    },

    #[error("Worker pool is shut down")]
    Disconnected,

    #[error("Job panicked on worker: {message}")]
    JobPanicked { message: String },

    #[error("Worker thread panicked")]
    WorkerPanicked,
}

/// Result type alias using GaugeError.
pub type GaugeResult<T> = Result<T, GaugeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mismatch_display_carries_both_values() {
        let err = SampleError::Mismatch {
            expected: "1".to_string(),
            actual: "2".to_string(),
        };
        let text = err.to_string();
        assert!(text.contains("expected 1"));
        assert!(text.contains("actual 2"));
        assert!(!err.is_task_fault());
    }

    #[test]
    fn test_task_fault_classification() {
        assert!(SampleError::Task {
            message: "boom".to_string()
        }
        .is_task_fault());
        assert!(SampleError::Panicked {
            message: "boom".to_string()
        }
        .is_task_fault());
    }

    #[test]
    fn test_error_chain() {
        let validation_err = ValidationError::InvalidFieldValue {
            field: "max_concurrency",
            value: "0".to_string(),
            reason: "Must be at least 1".to_string(),
        };
        let gauge_err: GaugeError = validation_err.into();
        assert!(matches!(gauge_err, GaugeError::Validation(_)));

        let gauge_err: GaugeError = PoolError::Disconnected.into();
        assert!(gauge_err.to_string().contains("shut down"));
    }
}
