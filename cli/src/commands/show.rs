use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use colored::Colorize;
use config::Section;

use crate::output;

#[derive(Args)]
pub struct ShowArgs {
    #[arg(help = "Recipe configuration file (name=value assignments)")]
    pub file: PathBuf,

    #[arg(long, help = "Only print one section (e.g. vae_hmm, scoring)")]
    pub section: Option<Section>,

    #[arg(long, help = "Print as JSON")]
    pub json: bool,

    #[arg(
        long = "set",
        value_name = "NAME=VALUE",
        help = "Override an entry (highest precedence, repeatable)"
    )]
    pub set: Vec<String>,

    #[arg(long, help = "Cluster job-slot capacity for job-count validation")]
    pub cluster_capacity: Option<u64>,
}

pub fn run(args: ShowArgs) -> Result<()> {
    let (resolved, schema) = super::resolve(&args.file, &args.set, args.cluster_capacity)?;

    if args.json {
        let mut value = serde_json::to_value(&resolved)?;
        if let Some(section) = args.section {
            value = value
                .get(section.to_string())
                .cloned()
                .unwrap_or(serde_json::Value::Null);
        }
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    for section in Section::ALL {
        if args.section.is_some_and(|only| only != section) {
            continue;
        }
        output::subheader(&section.to_string());
        for entry in schema.entries().iter().filter(|e| e.section == section) {
            if let Some(value) = resolved.entry(entry.name) {
                println!("  {} = {}", entry.name, value.to_string().cyan());
            }
        }
        println!();
    }

    Ok(())
}
