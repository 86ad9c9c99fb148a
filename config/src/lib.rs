//! # Recipe Configuration
//!
//! Typed configuration resolution for the speech-recognition training
//! pipeline (feature extraction, VAE-HMM acoustic model, HMM-GMM acoustic
//! model, scoring).
//!
//! This crate provides:
//! - A parser for the flat `name=value` recipe format
//! - A schema declaring every entry's section, kind, default, and rules
//! - One-shot resolution into an immutable, validated [`ResolvedConfig`]
//! - Typed per-stage section views
//! - Source precedence (CLI overrides > `RECIPE_*` env vars > file)
//!
//! Resolution collects every problem in one pass; downstream stages only
//! ever see a fully valid configuration. The flat shell-style namespace of
//! the source format is not exposed past this crate.

pub mod file_loader;
pub mod parser;
pub mod precedence;
pub mod resolver;
pub mod schema;
pub mod sections;
pub mod value;

pub use errors::{ConfigError, ResolutionErrors};
pub use file_loader::{ConfigFileError, load_from_file};
pub use parser::{ParseError, RawAssignments, parse};
pub use precedence::{ENV_PREFIX, load_from_env, merge_sources};
pub use resolver::{ResolvedConfig, load, validate_cross_field};
pub use schema::{ExclusiveGroup, Schema, SchemaEntry, Section, ValueKind};
pub use sections::{
    DirectorySection, FeaturesSection, HmmGmmSection, ScoringSection, VaeHmmSection,
};
pub use value::{CovarianceType, TrainingType, Value};
pub use validator::Validate;
