//! # Section Views
//!
//! Typed per-stage views over a resolved configuration. Each downstream
//! stage (feature extraction, VAE-HMM trainer, HMM-GMM trainer, scorer)
//! receives only its own section; nothing reads the flat namespace after
//! resolution.
//!
//! Field-level rules use the `validator` crate; violations are reported as
//! `ConstraintViolation` errors naming the original entry
//! (`<prefix>_<field>`).

use std::collections::BTreeSet;
use std::path::PathBuf;

use serde::Serialize;
use validator::{Validate, ValidationError};

use crate::value::{CovarianceType, TrainingType};

/// Root directories of a pipeline run.
///
/// Directories may not exist yet at resolution time; stages create them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Validate)]
pub struct DirectorySection {
    pub datadir: PathBuf,
    pub feadir: PathBuf,
    pub expdir: PathBuf,
}

impl DirectorySection {
    pub(crate) const PREFIX: &'static str = "";
}

/// Options handed to the feature-extraction stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Validate)]
pub struct FeaturesSection {
    /// Parallel extraction jobs submitted to the scheduler.
    #[validate(range(min = 1, message = "job count must be positive"))]
    pub njobs: u64,

    /// Scheduler resource request, passed through unmodified.
    pub sge_opts: String,

    /// Feature-extraction parameter file.
    pub conf: PathBuf,
}

impl FeaturesSection {
    pub(crate) const PREFIX: &'static str = "fea";
}

/// Options handed to the VAE-HMM trainer.
#[derive(Debug, Clone, PartialEq, Serialize, Validate)]
pub struct VaeHmmSection {
    pub encoder_conf: PathBuf,
    pub decoder_conf: PathBuf,
    pub nflow_conf: PathBuf,
    pub emissions_conf: PathBuf,

    #[validate(range(min = 1, message = "latent dimensionality must be positive"))]
    pub latent_dim: u64,

    #[validate(range(min = 1, message = "encoder output dimensionality must be positive"))]
    pub encoder_out_dim: u64,

    pub encoder_cov_type: CovarianceType,
    pub decoder_cov_type: CovarianceType,
    pub training_type: TrainingType,

    /// Learning rate for the non-neural (conjugate) parameters.
    #[validate(custom(function = "validate_positive_rate"))]
    pub lrate: f64,

    /// Learning rate for the neural-network parameters.
    #[validate(custom(function = "validate_positive_rate"))]
    pub lrate_nnet: f64,

    #[validate(range(min = 1, message = "batch size must be positive"))]
    pub batch_size: u64,

    #[validate(range(min = 1, message = "epoch count must be positive"))]
    pub epochs: u64,

    /// Extra options appended verbatim to the training invocation.
    pub opts: String,

    pub train_sge_opts: String,
}

impl VaeHmmSection {
    pub(crate) const PREFIX: &'static str = "vae_hmm";
}

/// Options handed to the HMM-GMM trainer.
#[derive(Debug, Clone, PartialEq, Serialize, Validate)]
pub struct HmmGmmSection {
    pub emissions_conf: PathBuf,

    #[validate(range(min = 1, message = "job count must be positive"))]
    pub align_njobs: u64,

    pub align_sge_opts: String,

    /// Epoch checkpoints at which alignments are recomputed.
    #[validate(custom(function = "validate_strictly_increasing"))]
    pub align_epochs: Vec<u64>,

    /// Total training epochs.
    #[validate(range(min = 1, message = "epoch count must be positive"))]
    pub epochs: u64,

    #[validate(custom(function = "validate_positive_rate"))]
    pub train_emissions_lrate: f64,

    #[validate(range(min = 1, message = "batch size must be positive"))]
    pub train_emissions_batch_size: u64,

    #[validate(range(min = 1, message = "epoch count must be positive"))]
    pub train_emissions_epochs: u64,

    pub train_emissions_opts: String,

    /// Active alternative of the `emissions_sge_opts` exclusive group.
    pub train_emissions_sge_opts: String,
}

impl HmmGmmSection {
    pub(crate) const PREFIX: &'static str = "hmm";
}

/// Options handed to the scoring stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Validate)]
pub struct ScoringSection {
    /// Phone symbols excluded from scoring (silence markers and the like).
    pub exclude_syms: BTreeSet<String>,

    /// Collapse adjacent duplicate phones before scoring.
    pub collapse_duplicates: bool,

    /// Phone-set mapping file (e.g. the 48-to-39 phone folding).
    pub phone_map: PathBuf,
}

impl ScoringSection {
    pub(crate) const PREFIX: &'static str = "score";
}

fn validate_positive_rate(rate: f64) -> Result<(), ValidationError> {
    if rate > 0.0 {
        return Ok(());
    }
    let mut err = ValidationError::new("positive_rate");
    err.message = Some("learning rate must be > 0".into());
    Err(err)
}

fn validate_strictly_increasing(epochs: &[u64]) -> Result<(), ValidationError> {
    if epochs.is_empty() {
        let mut err = ValidationError::new("empty_schedule");
        err.message = Some("checkpoint schedule must not be empty".into());
        return Err(err);
    }
    if epochs.windows(2).all(|w| w[0] < w[1]) {
        return Ok(());
    }
    let mut err = ValidationError::new("strictly_increasing");
    err.message = Some("checkpoint epochs must be strictly increasing".into());
    Err(err)
}
