use std::path::PathBuf;

use anyhow::Result;
use clap::Args;

use crate::output;

#[derive(Args)]
pub struct CheckArgs {
    #[arg(help = "Recipe configuration file (name=value assignments)")]
    pub file: PathBuf,

    #[arg(
        long = "set",
        value_name = "NAME=VALUE",
        help = "Override an entry (highest precedence, repeatable)"
    )]
    pub set: Vec<String>,

    #[arg(long, help = "Cluster job-slot capacity for job-count validation")]
    pub cluster_capacity: Option<u64>,
}

pub fn run(args: CheckArgs) -> Result<()> {
    let (resolved, schema) = super::resolve(&args.file, &args.set, args.cluster_capacity)?;

    let entry_count = resolved.entries().count();
    output::info(&format!(
        "resolved {} entries across {} sections",
        entry_count,
        config::Section::ALL.len()
    ));
    tracing::debug!(
        cluster_capacity = schema.cluster_capacity(),
        "validation complete"
    );
    output::success(&format!("{} is valid", args.file.display()));
    Ok(())
}
