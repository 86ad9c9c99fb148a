//! # Recipe Schema
//!
//! Declares every entry the training recipe understands: its pipeline
//! section, semantic kind, default, and whether it is required. The resolver
//! is driven entirely by this table; nothing else hard-codes entry names.

use serde::Serialize;
use strum::{Display, EnumString};

/// Pipeline stage an entry belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display, EnumString)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Section {
    Directories,
    Features,
    VaeHmm,
    HmmGmm,
    Scoring,
}

impl Section {
    /// Sections in pipeline order.
    pub const ALL: [Section; 5] = [
        Section::Directories,
        Section::Features,
        Section::VaeHmm,
        Section::HmmGmm,
        Section::Scoring,
    ];
}

/// Declared semantic kind of an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    /// Filesystem path; must be non-empty, existence not checked.
    Path,
    Integer,
    Float,
    /// One of `isotropic`, `diagonal`, `full`.
    Covariance,
    /// One of `viterbi`, `forward_backward`.
    Training,
    /// Scheduler/trainer option string passed through verbatim.
    Opaque,
    Flag,
    /// Whitespace-separated list of integers.
    IntList,
    /// Whitespace-separated set of phone symbols.
    Symbols,
}

impl ValueKind {
    /// Human description used in type-conversion errors.
    pub fn expected(self) -> &'static str {
        match self {
            Self::Path => "path",
            Self::Integer => "integer",
            Self::Float => "float",
            Self::Covariance => "one of isotropic, diagonal, full",
            Self::Training => "one of viterbi, forward_backward",
            Self::Opaque => "option string",
            Self::Flag => "boolean flag",
            Self::IntList => "list of integers",
            Self::Symbols => "set of symbols",
        }
    }
}

/// One entry of the recipe schema.
#[derive(Debug, Clone, Copy)]
pub struct SchemaEntry {
    pub name: &'static str,
    pub section: Section,
    pub kind: ValueKind,
    pub required: bool,
    /// Raw default, converted like any assignment when the entry is absent
    /// or set to the empty string.
    pub default: Option<&'static str>,
}

/// A set of entry names of which at most one may be active.
///
/// Models the "commented alternative" lines of the source format (e.g. a
/// plain and a GPU-pinned scheduler request) explicitly instead of relying
/// on textual commenting-out. The first member is canonical: the active
/// value is resolved under its name.
#[derive(Debug, Clone, Copy)]
pub struct ExclusiveGroup {
    pub name: &'static str,
    pub members: &'static [&'static str],
}

impl ExclusiveGroup {
    pub fn canonical(&self) -> &'static str {
        self.members[0]
    }
}

/// The full entry table for one pipeline invocation.
#[derive(Debug, Clone)]
pub struct Schema {
    entries: Vec<SchemaEntry>,
    groups: Vec<ExclusiveGroup>,
    cluster_capacity: u64,
}

const DEFAULT_CLUSTER_CAPACITY: u64 = 100;

const fn entry(
    name: &'static str,
    section: Section,
    kind: ValueKind,
    required: bool,
    default: Option<&'static str>,
) -> SchemaEntry {
    SchemaEntry {
        name,
        section,
        kind,
        required,
        default,
    }
}

impl Schema {
    /// Schema of the VAE-HMM / HMM-GMM training recipe.
    pub fn pipeline() -> Self {
        use Section::*;
        use ValueKind::*;

        let entries = vec![
            entry("datadir", Directories, Path, false, Some("data")),
            entry("feadir", Directories, Path, false, Some("features")),
            entry("expdir", Directories, Path, false, Some("exp")),
            entry("fea_njobs", Features, Integer, false, Some("10")),
            entry("fea_sge_opts", Features, Opaque, false, Some("")),
            entry("fea_conf", Features, Path, true, None),
            entry("vae_hmm_encoder_conf", VaeHmm, Path, true, None),
            entry("vae_hmm_decoder_conf", VaeHmm, Path, true, None),
            entry("vae_hmm_nflow_conf", VaeHmm, Path, true, None),
            entry("vae_hmm_emissions_conf", VaeHmm, Path, true, None),
            entry("vae_hmm_latent_dim", VaeHmm, Integer, false, Some("30")),
            entry("vae_hmm_encoder_out_dim", VaeHmm, Integer, true, None),
            entry(
                "vae_hmm_encoder_cov_type",
                VaeHmm,
                Covariance,
                false,
                Some("isotropic"),
            ),
            entry(
                "vae_hmm_decoder_cov_type",
                VaeHmm,
                Covariance,
                false,
                Some("diagonal"),
            ),
            entry(
                "vae_hmm_training_type",
                VaeHmm,
                Training,
                false,
                Some("viterbi"),
            ),
            entry("vae_hmm_lrate", VaeHmm, Float, false, Some("1e-1")),
            entry("vae_hmm_lrate_nnet", VaeHmm, Float, false, Some("1e-3")),
            entry("vae_hmm_batch_size", VaeHmm, Integer, false, Some("400")),
            entry("vae_hmm_epochs", VaeHmm, Integer, false, Some("30")),
            entry("vae_hmm_opts", VaeHmm, Opaque, false, Some("")),
            entry(
                "vae_hmm_train_sge_opts",
                VaeHmm,
                Opaque,
                false,
                Some("-l gpu=1"),
            ),
            entry("hmm_emissions_conf", HmmGmm, Path, true, None),
            entry("hmm_align_njobs", HmmGmm, Integer, false, Some("10")),
            entry("hmm_align_sge_opts", HmmGmm, Opaque, false, Some("")),
            entry(
                "hmm_align_epochs",
                HmmGmm,
                IntList,
                false,
                Some("0 1 2 3 4 5 6 7 8 9 10 12 14 16 18 20 23 26 29"),
            ),
            entry("hmm_epochs", HmmGmm, Integer, false, Some("30")),
            entry(
                "hmm_train_emissions_lrate",
                HmmGmm,
                Float,
                false,
                Some("1e-1"),
            ),
            entry(
                "hmm_train_emissions_batch_size",
                HmmGmm,
                Integer,
                false,
                Some("400"),
            ),
            entry(
                "hmm_train_emissions_epochs",
                HmmGmm,
                Integer,
                false,
                Some("10"),
            ),
            entry("hmm_train_emissions_opts", HmmGmm, Opaque, false, Some("")),
            entry(
                "hmm_train_emissions_sge_opts",
                HmmGmm,
                Opaque,
                false,
                Some("-l gpu=1"),
            ),
            entry(
                "hmm_train_emissions_sge_opts_gpu",
                HmmGmm,
                Opaque,
                false,
                None,
            ),
            entry("score_exclude_syms", Scoring, Symbols, false, Some("sil")),
            entry(
                "score_collapse_duplicates",
                Scoring,
                Flag,
                false,
                Some("true"),
            ),
            entry("score_phone_map", Scoring, Path, true, None),
        ];

        let groups = vec![ExclusiveGroup {
            name: "emissions_sge_opts",
            members: &[
                "hmm_train_emissions_sge_opts",
                "hmm_train_emissions_sge_opts_gpu",
            ],
        }];

        Self::new(entries, groups)
    }

    fn new(entries: Vec<SchemaEntry>, groups: Vec<ExclusiveGroup>) -> Self {
        debug_assert!(
            {
                let mut names: Vec<_> = entries.iter().map(|e| e.name).collect();
                names.sort_unstable();
                names.windows(2).all(|w| w[0] != w[1])
            },
            "schema entry names must be unique"
        );
        debug_assert!(
            groups
                .iter()
                .flat_map(|g| g.members.iter())
                .all(|m| entries.iter().any(|e| e.name == *m)),
            "every group member must have a schema entry"
        );

        Self {
            entries,
            groups,
            cluster_capacity: DEFAULT_CLUSTER_CAPACITY,
        }
    }

    /// Cap on job-parallelism entries; defaults to 100 slots.
    pub fn with_cluster_capacity(mut self, capacity: u64) -> Self {
        self.cluster_capacity = capacity;
        self
    }

    pub fn cluster_capacity(&self) -> u64 {
        self.cluster_capacity
    }

    pub fn entries(&self) -> &[SchemaEntry] {
        &self.entries
    }

    pub fn entry(&self, name: &str) -> Option<&SchemaEntry> {
        self.entries.iter().find(|e| e.name == name)
    }

    pub fn groups(&self) -> &[ExclusiveGroup] {
        &self.groups
    }

    /// The exclusive group `name` belongs to, if any.
    pub fn group_of(&self, name: &str) -> Option<&ExclusiveGroup> {
        self.groups.iter().find(|g| g.members.contains(&name))
    }
}
