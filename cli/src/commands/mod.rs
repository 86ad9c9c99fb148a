pub mod check;
pub mod show;

use std::path::Path;

use anyhow::{Context, Result, anyhow, bail};
use clap::{Parser, Subcommand};
use config::{RawAssignments, ResolvedConfig, Schema};

use crate::output;

#[derive(Parser)]
#[command(
    name = "recipeconf",
    author,
    version,
    about = "Validate and inspect speech-recipe training configurations",
    long_about = "Resolves a flat name=value recipe configuration into typed, validated \
                  per-stage sections before any pipeline job is submitted.\n\nOverrides: \
                  --set name=value > RECIPE_* environment variables > file."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Resolve a configuration file and report every problem")]
    Check(check::CheckArgs),

    #[command(about = "Print the resolved configuration")]
    Show(show::ShowArgs),
}

/// Shared resolution path for every subcommand: file, then `RECIPE_*`
/// environment variables, then `--set` overrides, resolved against the
/// pipeline schema. Prints every collected problem before failing.
pub(crate) fn resolve(
    file: &Path,
    sets: &[String],
    cluster_capacity: Option<u64>,
) -> Result<(ResolvedConfig, Schema)> {
    let schema = match cluster_capacity {
        Some(capacity) => Schema::pipeline().with_cluster_capacity(capacity),
        None => Schema::pipeline(),
    };

    let raw = config::load_from_file(file)
        .with_context(|| format!("reading {}", file.display()))?;
    let merged = config::merge_sources(raw, config::load_from_env(), parse_overrides(sets)?);

    match config::load(&merged, &schema) {
        Ok(resolved) => Ok((resolved, schema)),
        Err(problems) => {
            for problem in problems.iter() {
                output::error(&problem.to_string());
            }
            bail!(
                "{} is invalid: {} problem(s) found",
                file.display(),
                problems.len()
            );
        }
    }
}

fn parse_overrides(sets: &[String]) -> Result<Option<RawAssignments>> {
    if sets.is_empty() {
        return Ok(None);
    }

    let mut raw = RawAssignments::new();
    for set in sets {
        let (name, value) = set
            .split_once('=')
            .ok_or_else(|| anyhow!("--set expects NAME=VALUE, got {set:?}"))?;
        raw.push(name, value);
    }
    Ok(Some(raw))
}
