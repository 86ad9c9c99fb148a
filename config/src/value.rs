//! # Typed Configuration Values
//!
//! The resolved value types an entry can take, plus the enumerated fields of
//! the recipe (covariance parameterization, HMM training criterion).

use std::collections::BTreeSet;
use std::fmt;
use std::path::PathBuf;

use serde::Serialize;
use strum::{Display, EnumString};

/// Covariance parameterization of the encoder/decoder output density.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display, EnumString)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum CovarianceType {
    Isotropic,
    Diagonal,
    Full,
}

/// Criterion used to train the VAE-HMM state sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display, EnumString)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum TrainingType {
    Viterbi,
    ForwardBackward,
}

/// A resolved, typed configuration value.
///
/// Serializes untagged: a path or opaque string becomes a JSON string, an
/// integer a number, a list an array.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    /// Filesystem path. Existence is not checked at resolution time since
    /// run directories may be created later.
    Path(PathBuf),
    Integer(u64),
    Float(f64),
    Covariance(CovarianceType),
    Training(TrainingType),
    Flag(bool),
    /// Ordered list of integers, e.g. a realignment epoch schedule.
    IntList(Vec<u64>),
    /// Set of phone symbols.
    Symbols(BTreeSet<String>),
    /// Scheduler or trainer option string, passed through verbatim.
    Opaque(String),
}

impl Value {
    pub fn as_path(&self) -> Option<&PathBuf> {
        match self {
            Self::Path(p) => Some(p),
            _ => None,
        }
    }

    pub fn as_integer(&self) -> Option<u64> {
        match self {
            Self::Integer(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            Self::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_flag(&self) -> Option<bool> {
        match self {
            Self::Flag(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_int_list(&self) -> Option<&[u64]> {
        match self {
            Self::IntList(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_opaque(&self) -> Option<&str> {
        match self {
            Self::Opaque(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Path(p) => write!(f, "{}", p.display()),
            Self::Integer(n) => write!(f, "{n}"),
            Self::Float(x) => write!(f, "{x}"),
            Self::Covariance(c) => write!(f, "{c}"),
            Self::Training(t) => write!(f, "{t}"),
            Self::Flag(b) => write!(f, "{b}"),
            Self::IntList(v) => {
                let joined = v
                    .iter()
                    .map(|n| n.to_string())
                    .collect::<Vec<_>>()
                    .join(" ");
                write!(f, "{joined}")
            }
            Self::Symbols(s) => {
                let joined = s.iter().cloned().collect::<Vec<_>>().join(" ");
                write!(f, "{joined}")
            }
            Self::Opaque(s) => write!(f, "{s}"),
        }
    }
}
