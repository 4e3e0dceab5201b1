// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Newtype wrappers for validated inputs.
//!
//! All types validate their invariants at creation time, so a probe never
//! sees a zero worker count or a zero sample count.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Upper bound on any worker pool the harness will build.
pub const MAX_CONCURRENCY: usize = 65_536;
/// Upper bound on samples requested from a single probe (per worker for
/// throughput probes).
pub const MAX_SAMPLE_COUNT: usize = 1_000_000;
/// Maximum length of a case or suite name.
const MAX_NAME_LEN: usize = 64;

/// Number of simultaneous workers. Always at least 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "usize", into = "usize")]
pub struct Concurrency(usize);

impl Concurrency {
    /// A single worker.
    pub const ONE: Self = Self(1);

    /// Create a new Concurrency with validation.
    pub fn new(workers: usize) -> Result<Self, ValidationError> {
        if workers == 0 {
            return Err(ValidationError::InvalidFieldValue {
                field: "concurrency",
                value: workers.to_string(),
                reason: "Concurrency must be at least 1".to_string(),
            });
        }
        if workers > MAX_CONCURRENCY {
            return Err(ValidationError::InvalidFieldValue {
                field: "concurrency",
                value: workers.to_string(),
                reason: format!("Concurrency must not exceed {}", MAX_CONCURRENCY),
            });
        }
        Ok(Self(workers))
    }

    /// Create without validation. Only for in-range constants.
    pub(crate) const fn new_unchecked(workers: usize) -> Self {
        Self(workers)
    }

    /// Get the inner worker count.
    pub fn get(&self) -> usize {
        self.0
    }

    /// Twice the current level, never above `ceiling`.
    pub fn doubled(self, ceiling: Concurrency) -> Self {
        Self(self.0.saturating_mul(2).min(ceiling.0))
    }

    /// One less than the current level, never below 1.
    pub fn decremented(self) -> Self {
        Self((self.0 - 1).max(1))
    }
}

impl fmt::Display for Concurrency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<usize> for Concurrency {
    type Error = ValidationError;

    fn try_from(value: usize) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Concurrency> for usize {
    fn from(c: Concurrency) -> Self {
        c.0
    }
}

/// Number of samples a probe collects. Always at least 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "usize", into = "usize")]
pub struct SampleCount(usize);

impl SampleCount {
    /// Create a new SampleCount with validation.
    pub fn new(samples: usize) -> Result<Self, ValidationError> {
        if samples == 0 {
            return Err(ValidationError::InvalidFieldValue {
                field: "sample_count",
                value: samples.to_string(),
                reason: "Sample count must be at least 1".to_string(),
            });
        }
        if samples > MAX_SAMPLE_COUNT {
            return Err(ValidationError::InvalidFieldValue {
                field: "sample_count",
                value: samples.to_string(),
                reason: format!("Sample count must not exceed {}", MAX_SAMPLE_COUNT),
            });
        }
        Ok(Self(samples))
    }

    /// Create without validation. Only for in-range constants.
    pub(crate) const fn new_unchecked(samples: usize) -> Self {
        Self(samples)
    }

    /// Get the inner sample count.
    pub fn get(&self) -> usize {
        self.0
    }
}

impl fmt::Display for SampleCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<usize> for SampleCount {
    type Error = ValidationError;

    fn try_from(value: usize) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<SampleCount> for usize {
    fn from(s: SampleCount) -> Self {
        s.0
    }
}

/// Validated suite or case name.
/// Must be non-empty, alphanumeric with hyphens/underscores, max 64 chars.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CaseName(String);

impl CaseName {
    /// Create a new CaseName with validation.
    pub fn new(name: impl Into<String>) -> Result<Self, ValidationError> {
        let name = name.into();

        if name.is_empty() {
            return Err(ValidationError::InvalidFieldValue {
                field: "name",
                value: name,
                reason: "Name cannot be empty".to_string(),
            });
        }

        if name.len() > MAX_NAME_LEN {
            return Err(ValidationError::InvalidFieldValue {
                field: "name",
                value: name.clone(),
                reason: format!("Name too long: {} chars (max {})", name.len(), MAX_NAME_LEN),
            });
        }

        if !name
            .chars()
            .all(|c| c.is_alphanumeric() || c == '-' || c == '_')
        {
            return Err(ValidationError::InvalidFieldValue {
                field: "name",
                value: name,
                reason: "Name must contain only alphanumeric characters, hyphens, and underscores"
                    .to_string(),
            });
        }

        Ok(Self(name))
    }

    /// Get the inner string value.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CaseName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for CaseName {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<CaseName> for String {
    fn from(name: CaseName) -> Self {
        name.0
    }
}
