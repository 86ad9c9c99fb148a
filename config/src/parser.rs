//! # Assignment Parser
//!
//! Parses the flat `name=value` recipe configuration format:
//!
//! - one assignment per line, optional `export ` prefix
//! - `#` starts a comment, full-line or inline after a value
//! - values optionally single- or double-quoted; `#` and `=` inside quotes
//!   are literal
//! - blank lines ignored
//!
//! Duplicate assignments to the same name are all retained so the resolver
//! can detect simultaneously active alternatives (in the source format these
//! are adjacent lines of which exactly one is meant to stay uncommented).

use std::collections::BTreeMap;
use thiserror::Error;

/// Assignment file syntax error.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("line {line}: not an assignment: {text:?}")]
    NotAnAssignment { line: usize, text: String },

    #[error("line {line}: invalid entry name: {name:?}")]
    InvalidName { line: usize, name: String },

    #[error("line {line}: unterminated quote")]
    UnterminatedQuote { line: usize },
}

/// Raw `name -> values` assignments, before any typing or validation.
///
/// Values keep file order per name. An empty-string value is recorded as-is;
/// the resolver treats it as "unset".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawAssignments {
    entries: BTreeMap<String, Vec<String>>,
}

impl RawAssignments {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a value for `name`, keeping any earlier assignments.
    pub fn push(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.entries
            .entry(name.into())
            .or_default()
            .push(value.into());
    }

    /// Replace every value of `name`. Used when a higher-precedence source
    /// overrides the file.
    pub fn replace(&mut self, name: impl Into<String>, values: Vec<String>) {
        self.entries.insert(name.into(), values);
    }

    /// All values assigned to `name`, in file order.
    pub fn get(&self, name: &str) -> &[String] {
        self.entries.get(name).map_or(&[], Vec::as_slice)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl IntoIterator for RawAssignments {
    type Item = (String, Vec<String>);
    type IntoIter = std::collections::btree_map::IntoIter<String, Vec<String>>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

/// Parse the newline-delimited assignment format into [`RawAssignments`].
pub fn parse(input: &str) -> Result<RawAssignments, ParseError> {
    let mut raw = RawAssignments::new();

    for (idx, line) in input.lines().enumerate() {
        let lineno = idx + 1;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        let stmt = trimmed
            .strip_prefix("export ")
            .map_or(trimmed, str::trim_start);

        let Some(eq) = stmt.find('=') else {
            return Err(ParseError::NotAnAssignment {
                line: lineno,
                text: trimmed.to_string(),
            });
        };

        let name = stmt[..eq].trim_end();
        if !is_valid_name(name) {
            return Err(ParseError::InvalidName {
                line: lineno,
                name: name.to_string(),
            });
        }

        let value = unquote(stmt[eq + 1..].trim_start(), lineno)?;
        raw.push(name, value);
    }

    Ok(raw)
}

fn is_valid_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Strip quoting from a raw value and drop any trailing inline comment.
fn unquote(raw: &str, line: usize) -> Result<String, ParseError> {
    let mut out = String::new();
    let mut quote: Option<char> = None;

    for c in raw.chars() {
        match quote {
            Some(q) if c == q => quote = None,
            Some(_) => out.push(c),
            None => match c {
                '"' | '\'' => quote = Some(c),
                '#' => break,
                _ => out.push(c),
            },
        }
    }

    if quote.is_some() {
        return Err(ParseError::UnterminatedQuote { line });
    }

    Ok(out.trim().to_string())
}
