//! # Configuration Precedence
//!
//! Merges raw assignments from multiple sources before resolution.
//!
//! # Precedence Order
//! 1. CLI overrides (highest priority)
//! 2. Environment variables (`RECIPE_*`)
//! 3. Configuration file
//! 4. Schema defaults (applied by the resolver, lowest priority)

use std::env;

use crate::parser::RawAssignments;

/// Environment variables with this prefix override file entries;
/// `RECIPE_VAE_HMM_LATENT_DIM` maps to `vae_hmm_latent_dim`.
pub const ENV_PREFIX: &str = "RECIPE_";

/// Collect raw assignments from `RECIPE_*` environment variables.
pub fn load_from_env() -> RawAssignments {
    let mut raw = RawAssignments::new();
    for (key, value) in env::vars() {
        if let Some(name) = key.strip_prefix(ENV_PREFIX) {
            raw.push(name.to_ascii_lowercase(), value);
        }
    }
    raw
}

/// Merge raw assignment sources with precedence.
///
/// # M-CANONICAL-DOCS
///
/// ## Purpose
/// Merges assignments following precedence rules: CLI overrides >
/// environment variables > configuration file. An override replaces every
/// file-level assignment of that name, including duplicated alternative
/// lines. Applied overrides are logged with their source.
///
/// ## Usage
/// ```rust
/// use config::{load_from_env, merge_sources, parse};
///
/// fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let file = parse("fea_njobs=10\n")?;
///     let merged = merge_sources(file, load_from_env(), None);
///     assert!(merged.contains("fea_njobs"));
///     Ok(())
/// }
/// ```
pub fn merge_sources(
    file: RawAssignments,
    env: RawAssignments,
    cli: Option<RawAssignments>,
) -> RawAssignments {
    let mut merged = merge_with_logging(file, env, "env");
    if let Some(cli) = cli {
        merged = merge_with_logging(merged, cli, "cli");
    }
    merged
}

fn merge_with_logging(
    mut base: RawAssignments,
    overrides: RawAssignments,
    source_name: &str,
) -> RawAssignments {
    let mut changes = Vec::new();

    for (name, values) in overrides {
        if let Some(last) = values.last() {
            changes.push(format!("{name} = {last}"));
        }
        base.replace(name, values);
    }

    if !changes.is_empty() {
        tracing::info!("configuration overrides from {}: {:?}", source_name, changes);
    }

    base
}
