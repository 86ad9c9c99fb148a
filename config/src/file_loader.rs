//! # Configuration File Loading
//!
//! Reads a recipe configuration file from disk and parses it into raw
//! assignments. Resolution stays a separate, I/O-free step.

use std::path::Path;

use crate::parser::{self, ParseError, RawAssignments};

/// Configuration file loading error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigFileError {
    #[error("file not found: {0}")]
    FileNotFound(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Parse(#[from] ParseError),
}

/// Load raw assignments from a recipe configuration file.
///
/// # M-CANONICAL-DOCS
///
/// ## Purpose
/// Reads the newline-delimited `name=value` file and parses it into
/// [`RawAssignments`] for the resolver. The file is the only persisted
/// artifact at this layer.
///
/// ## Usage
/// ```rust,no_run
/// use std::path::Path;
///
/// use config::{load, load_from_file, Schema};
///
/// fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let raw = load_from_file(Path::new("conf/recipe.conf"))?;
///     let resolved = load(&raw, &Schema::pipeline())?;
///     println!("experiment dir: {}", resolved.directories().expdir.display());
///     Ok(())
/// }
/// ```
///
/// ## Error Handling
/// Returns `ConfigFileError` for a missing file, an unreadable file, or a
/// syntax error (reported with its line number).
pub fn load_from_file(path: &Path) -> Result<RawAssignments, ConfigFileError> {
    let contents = std::fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            ConfigFileError::FileNotFound(path.display().to_string())
        } else {
            ConfigFileError::Io(e)
        }
    })?;

    Ok(parser::parse(&contents)?)
}
