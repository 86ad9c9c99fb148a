//! # Recipe Configuration Errors
//!
//! Error handling for the pipeline configuration resolver.
//!
//! - Uses `thiserror` for structured error definitions
//! - Every variant carries named fields identifying the offending entry
//! - Resolution collects every problem before reporting; nothing fails fast

use serde::Serialize;
use thiserror::Error;

/// A single problem found while resolving a recipe configuration.
#[derive(Debug, Clone, PartialEq, Error, Serialize)]
pub enum ConfigError {
    #[error("missing required entry: {entry}")]
    MissingRequiredEntry { entry: String },

    #[error("entry {entry}: cannot parse {value:?} as {expected}")]
    TypeConversion {
        entry: String,
        value: String,
        expected: String,
    },

    #[error("entry {entry}: {reason}")]
    ConstraintViolation { entry: String, reason: String },

    /// More than one alternative of a mutually exclusive group is active at
    /// the same time.
    #[error("conflicting options for {group}: {alternatives:?}")]
    ConflictingOptions {
        group: String,
        alternatives: Vec<String>,
    },
}

impl ConfigError {
    /// Name of the entry (or exclusive group) the error refers to.
    pub fn subject(&self) -> &str {
        match self {
            Self::MissingRequiredEntry { entry }
            | Self::TypeConversion { entry, .. }
            | Self::ConstraintViolation { entry, .. } => entry,
            Self::ConflictingOptions { group, .. } => group,
        }
    }
}

/// Every problem found in one resolution attempt.
///
/// Resolution either fully succeeds or yields this aggregate; a partially
/// resolved configuration is never exposed to callers.
#[derive(Debug, Clone, PartialEq, Error, Serialize)]
#[error("configuration resolution failed with {} problem(s)", .errors.len())]
pub struct ResolutionErrors {
    errors: Vec<ConfigError>,
}

impl ResolutionErrors {
    pub fn new(errors: Vec<ConfigError>) -> Self {
        Self { errors }
    }

    pub fn iter(&self) -> impl Iterator<Item = &ConfigError> {
        self.errors.iter()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn into_inner(self) -> Vec<ConfigError> {
        self.errors
    }
}
