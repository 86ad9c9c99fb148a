//! # Configuration Resolution
//!
//! Turns raw `name=value` assignments into an immutable [`ResolvedConfig`]
//! under a [`Schema`], or fails with every problem found in one pass.
//!
//! Resolution is a one-shot, synchronous, in-memory transformation: no I/O,
//! no process spawning. The resulting config is owned immutable data and can
//! be shared by reference across concurrently launched stages.

use std::collections::{BTreeMap, BTreeSet};

use errors::{ConfigError, ResolutionErrors};
use serde::Serialize;
use validator::Validate;

use crate::parser::RawAssignments;
use crate::schema::{ExclusiveGroup, Schema, SchemaEntry, ValueKind};
use crate::sections::{
    DirectorySection, FeaturesSection, HmmGmmSection, ScoringSection, VaeHmmSection,
};
use crate::value::{CovarianceType, TrainingType, Value};

/// An immutable, fully validated configuration for one pipeline invocation.
///
/// Built once by [`load`], never mutated afterwards. Serializes as the five
/// typed sections.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedConfig {
    #[serde(skip)]
    entries: BTreeMap<String, Value>,
    directories: DirectorySection,
    features: FeaturesSection,
    vae_hmm: VaeHmmSection,
    hmm_gmm: HmmGmmSection,
    scoring: ScoringSection,
}

impl ResolvedConfig {
    /// Typed value of a single entry, under its canonical name.
    pub fn entry(&self, name: &str) -> Option<&Value> {
        self.entries.get(name)
    }

    pub fn entries(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn directories(&self) -> &DirectorySection {
        &self.directories
    }

    pub fn features(&self) -> &FeaturesSection {
        &self.features
    }

    pub fn vae_hmm(&self) -> &VaeHmmSection {
        &self.vae_hmm
    }

    pub fn hmm_gmm(&self) -> &HmmGmmSection {
        &self.hmm_gmm
    }

    pub fn scoring(&self) -> &ScoringSection {
        &self.scoring
    }
}

/// Resolve raw assignments against a schema.
///
/// # M-CANONICAL-DOCS
///
/// ## Purpose
/// Applies defaults, converts every entry to its declared kind, enforces
/// field and cross-field constraints, and returns either a fully valid
/// [`ResolvedConfig`] or the complete list of problems. An entry assigned
/// the empty string counts as unset and falls back to its default.
///
/// ## Usage
/// ```rust
/// use config::{load, parse, Schema};
///
/// fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let raw = parse("vae_hmm_latent_dim=30\n")?;
///     match load(&raw, &Schema::pipeline()) {
///         Ok(resolved) => println!("latent dim: {}", resolved.vae_hmm().latent_dim),
///         Err(problems) => {
///             for p in problems.iter() {
///                 eprintln!("{p}");
///             }
///         }
///     }
///     Ok(())
/// }
/// ```
///
/// ## Error Handling
/// Problems are collected, not reported one at a time:
/// - `MissingRequiredEntry`: required entry absent with no default
/// - `TypeConversion`: raw value does not parse as the declared kind
/// - `ConstraintViolation`: parsed value breaks a validation rule
/// - `ConflictingOptions`: more than one alternative of an exclusive group
///   (or more than one distinct value of a single entry) is active
///
/// A failed entry does not suppress the rules for the rest: its default
/// stands in during constraint checking, and violations naming an entry that
/// already failed are dropped as noise.
pub fn load(raw: &RawAssignments, schema: &Schema) -> Result<ResolvedConfig, ResolutionErrors> {
    let mut errors = Vec::new();
    let mut entries = BTreeMap::new();

    for group in schema.groups() {
        resolve_group(raw, schema, group, &mut entries, &mut errors);
    }
    for entry in schema.entries() {
        if schema.group_of(entry.name).is_some() {
            continue;
        }
        resolve_entry(raw, entry, &mut entries, &mut errors);
    }

    for name in raw.names() {
        if schema.entry(name).is_none() {
            tracing::warn!("ignoring unknown configuration entry {name}");
        }
    }

    let failed: BTreeSet<String> = errors.iter().map(|e| e.subject().to_string()).collect();
    substitute_defaults(schema, &mut entries);

    let mut build_errors = Vec::new();
    let directories = build_directories(&entries).map_err(|e| build_errors.push(e)).ok();
    let features = build_features(&entries).map_err(|e| build_errors.push(e)).ok();
    let vae_hmm = build_vae_hmm(&entries).map_err(|e| build_errors.push(e)).ok();
    let hmm_gmm = build_hmm_gmm(&entries).map_err(|e| build_errors.push(e)).ok();
    let scoring = build_scoring(&entries).map_err(|e| build_errors.push(e)).ok();

    if let Some(section) = &directories {
        collect_field_violations(DirectorySection::PREFIX, section.validate(), &failed, &mut errors);
    }
    if let Some(section) = &features {
        collect_field_violations(FeaturesSection::PREFIX, section.validate(), &failed, &mut errors);
    }
    if let Some(section) = &vae_hmm {
        collect_field_violations(VaeHmmSection::PREFIX, section.validate(), &failed, &mut errors);
    }
    if let Some(section) = &hmm_gmm {
        collect_field_violations(HmmGmmSection::PREFIX, section.validate(), &failed, &mut errors);
    }
    if let Some(section) = &scoring {
        collect_field_violations(ScoringSection::PREFIX, section.validate(), &failed, &mut errors);
    }

    if let (Some(features), Some(hmm_gmm)) = (&features, &hmm_gmm) {
        for violation in validate_cross_field(features, hmm_gmm, schema) {
            if !failed.contains(violation.subject()) {
                errors.push(violation);
            }
        }
    }

    if !errors.is_empty() {
        return Err(ResolutionErrors::new(errors));
    }

    match (directories, features, vae_hmm, hmm_gmm, scoring) {
        (Some(directories), Some(features), Some(vae_hmm), Some(hmm_gmm), Some(scoring)) => {
            Ok(ResolvedConfig {
                entries,
                directories,
                features,
                vae_hmm,
                hmm_gmm,
                scoring,
            })
        }
        _ => Err(ResolutionErrors::new(build_errors)),
    }
}

/// Constraints spanning more than one entry.
///
/// - every realignment checkpoint must fall inside the total epoch count
/// - job-parallelism entries must not exceed the schema's cluster capacity
pub fn validate_cross_field(
    features: &FeaturesSection,
    hmm_gmm: &HmmGmmSection,
    schema: &Schema,
) -> Vec<ConfigError> {
    let mut violations = Vec::new();
    let capacity = schema.cluster_capacity();

    if let Some(&last) = hmm_gmm.align_epochs.last() {
        if last >= hmm_gmm.epochs {
            violations.push(ConfigError::ConstraintViolation {
                entry: "hmm_align_epochs".to_string(),
                reason: format!(
                    "checkpoint {last} is outside the {} training epochs",
                    hmm_gmm.epochs
                ),
            });
        }
    }

    for (entry, njobs) in [
        ("fea_njobs", features.njobs),
        ("hmm_align_njobs", hmm_gmm.align_njobs),
    ] {
        if njobs > capacity {
            violations.push(ConfigError::ConstraintViolation {
                entry: entry.to_string(),
                reason: format!("{njobs} jobs exceed the cluster capacity of {capacity}"),
            });
        }
    }

    violations
}

/// Non-empty values assigned to `name`, deduplicated, in file order.
fn active_values<'a>(raw: &'a RawAssignments, name: &str) -> Vec<&'a str> {
    let mut unique: Vec<&str> = Vec::new();
    for value in raw.get(name) {
        let value = value.as_str();
        if !value.trim().is_empty() && !unique.contains(&value) {
            unique.push(value);
        }
    }
    unique
}

fn resolve_entry(
    raw: &RawAssignments,
    entry: &SchemaEntry,
    entries: &mut BTreeMap<String, Value>,
    errors: &mut Vec<ConfigError>,
) {
    let active = active_values(raw, entry.name);
    match active.as_slice() {
        [] => apply_default(entry, entry.name, entries, errors),
        [value] => convert_into(entry, entry.name, value, entries, errors),
        _ => errors.push(ConfigError::ConflictingOptions {
            group: entry.name.to_string(),
            alternatives: active.iter().map(|v| (*v).to_string()).collect(),
        }),
    }
}

/// Resolve an exclusive group as a unit: at most one member may carry an
/// active value, and the result is stored under the canonical member's name.
fn resolve_group(
    raw: &RawAssignments,
    schema: &Schema,
    group: &ExclusiveGroup,
    entries: &mut BTreeMap<String, Value>,
    errors: &mut Vec<ConfigError>,
) {
    let Some(canonical) = schema.entry(group.canonical()) else {
        debug_assert!(false, "group {} has no canonical entry", group.name);
        return;
    };

    let active: Vec<(&str, Vec<&str>)> = group
        .members
        .iter()
        .map(|member| (*member, active_values(raw, member)))
        .filter(|(_, values)| !values.is_empty())
        .collect();

    match active.as_slice() {
        [] => apply_default(canonical, canonical.name, entries, errors),
        [(member, values)] => match values.as_slice() {
            [value] => convert_into(canonical, canonical.name, value, entries, errors),
            _ => errors.push(ConfigError::ConflictingOptions {
                group: (*member).to_string(),
                alternatives: values.iter().map(|v| (*v).to_string()).collect(),
            }),
        },
        _ => errors.push(ConfigError::ConflictingOptions {
            group: group.name.to_string(),
            alternatives: active.iter().map(|(m, _)| (*m).to_string()).collect(),
        }),
    }
}

fn apply_default(
    entry: &SchemaEntry,
    store_as: &str,
    entries: &mut BTreeMap<String, Value>,
    errors: &mut Vec<ConfigError>,
) {
    match entry.default {
        Some(default) => convert_into(entry, store_as, default, entries, errors),
        None if entry.required => errors.push(ConfigError::MissingRequiredEntry {
            entry: store_as.to_string(),
        }),
        None => {}
    }
}

fn convert_into(
    entry: &SchemaEntry,
    store_as: &str,
    raw_value: &str,
    entries: &mut BTreeMap<String, Value>,
    errors: &mut Vec<ConfigError>,
) {
    match convert(entry, raw_value) {
        Ok(value) => {
            entries.insert(store_as.to_string(), value);
        }
        Err(err) => errors.push(err),
    }
}

/// Convert one raw string to the entry's declared kind.
fn convert(entry: &SchemaEntry, raw_value: &str) -> Result<Value, ConfigError> {
    let type_error = || ConfigError::TypeConversion {
        entry: entry.name.to_string(),
        value: raw_value.to_string(),
        expected: entry.kind.expected().to_string(),
    };

    let value = match entry.kind {
        ValueKind::Path => Value::Path(raw_value.into()),
        ValueKind::Integer => Value::Integer(raw_value.parse().map_err(|_| type_error())?),
        ValueKind::Float => {
            let parsed: f64 = raw_value.parse().map_err(|_| type_error())?;
            if !parsed.is_finite() {
                return Err(type_error());
            }
            Value::Float(parsed)
        }
        ValueKind::Covariance => Value::Covariance(
            raw_value
                .parse::<CovarianceType>()
                .map_err(|_| type_error())?,
        ),
        ValueKind::Training => {
            Value::Training(raw_value.parse::<TrainingType>().map_err(|_| type_error())?)
        }
        ValueKind::Flag => match raw_value.to_ascii_lowercase().as_str() {
            "true" | "yes" | "1" => Value::Flag(true),
            "false" | "no" | "0" => Value::Flag(false),
            _ => return Err(type_error()),
        },
        ValueKind::IntList => {
            let parsed: Result<Vec<u64>, _> = raw_value
                .split_whitespace()
                .map(|tok| tok.parse::<u64>())
                .collect();
            Value::IntList(parsed.map_err(|_| type_error())?)
        }
        ValueKind::Symbols => Value::Symbols(
            raw_value
                .split_whitespace()
                .map(|s| s.to_string())
                .collect(),
        ),
        ValueKind::Opaque => Value::Opaque(raw_value.to_string()),
    };

    Ok(value)
}

/// Map `validator` field errors to `ConstraintViolation`s naming the
/// original entry (`<prefix>_<field>`). Violations for an entry that already
/// failed an earlier phase are dropped.
fn collect_field_violations(
    prefix: &str,
    result: Result<(), validator::ValidationErrors>,
    failed: &BTreeSet<String>,
    errors: &mut Vec<ConfigError>,
) {
    let Err(validation) = result else { return };
    for (field, field_errors) in validation.field_errors() {
        let field = field.to_string();
        let entry = entry_name(prefix, &field);
        if failed.contains(&entry) {
            continue;
        }
        for err in field_errors.iter() {
            let reason = err
                .message
                .clone()
                .map(|m| m.to_string())
                .unwrap_or_else(|| err.code.to_string());
            errors.push(ConfigError::ConstraintViolation {
                entry: entry.clone(),
                reason,
            });
        }
    }
}

fn entry_name(prefix: &str, field: &str) -> String {
    if prefix.is_empty() {
        field.to_string()
    } else {
        format!("{prefix}_{field}")
    }
}

/// Stand-in defaults for entries that failed to resolve, so sections can be
/// built and the rules for every other entry still run in the same attempt.
/// A no-op on a clean resolution: every defaulted entry was already applied.
fn substitute_defaults(schema: &Schema, entries: &mut BTreeMap<String, Value>) {
    for entry in schema.entries() {
        if entries.contains_key(entry.name) {
            continue;
        }
        let Some(default) = entry.default else {
            continue;
        };
        if let Ok(value) = convert(entry, default) {
            entries.insert(entry.name.to_string(), value);
        }
    }
}

fn build_directories(
    entries: &BTreeMap<String, Value>,
) -> Result<DirectorySection, ConfigError> {
    Ok(DirectorySection {
        datadir: get_path(entries, "datadir")?,
        feadir: get_path(entries, "feadir")?,
        expdir: get_path(entries, "expdir")?,
    })
}

fn build_features(entries: &BTreeMap<String, Value>) -> Result<FeaturesSection, ConfigError> {
    Ok(FeaturesSection {
        njobs: get_integer(entries, "fea_njobs")?,
        sge_opts: get_opaque(entries, "fea_sge_opts")?,
        conf: get_path(entries, "fea_conf")?,
    })
}

fn build_vae_hmm(entries: &BTreeMap<String, Value>) -> Result<VaeHmmSection, ConfigError> {
    Ok(VaeHmmSection {
        encoder_conf: get_path(entries, "vae_hmm_encoder_conf")?,
        decoder_conf: get_path(entries, "vae_hmm_decoder_conf")?,
        nflow_conf: get_path(entries, "vae_hmm_nflow_conf")?,
        emissions_conf: get_path(entries, "vae_hmm_emissions_conf")?,
        latent_dim: get_integer(entries, "vae_hmm_latent_dim")?,
        encoder_out_dim: get_integer(entries, "vae_hmm_encoder_out_dim")?,
        encoder_cov_type: get_covariance(entries, "vae_hmm_encoder_cov_type")?,
        decoder_cov_type: get_covariance(entries, "vae_hmm_decoder_cov_type")?,
        training_type: get_training(entries, "vae_hmm_training_type")?,
        lrate: get_float(entries, "vae_hmm_lrate")?,
        lrate_nnet: get_float(entries, "vae_hmm_lrate_nnet")?,
        batch_size: get_integer(entries, "vae_hmm_batch_size")?,
        epochs: get_integer(entries, "vae_hmm_epochs")?,
        opts: get_opaque(entries, "vae_hmm_opts")?,
        train_sge_opts: get_opaque(entries, "vae_hmm_train_sge_opts")?,
    })
}

fn build_hmm_gmm(entries: &BTreeMap<String, Value>) -> Result<HmmGmmSection, ConfigError> {
    Ok(HmmGmmSection {
        emissions_conf: get_path(entries, "hmm_emissions_conf")?,
        align_njobs: get_integer(entries, "hmm_align_njobs")?,
        align_sge_opts: get_opaque(entries, "hmm_align_sge_opts")?,
        align_epochs: get_int_list(entries, "hmm_align_epochs")?,
        epochs: get_integer(entries, "hmm_epochs")?,
        train_emissions_lrate: get_float(entries, "hmm_train_emissions_lrate")?,
        train_emissions_batch_size: get_integer(entries, "hmm_train_emissions_batch_size")?,
        train_emissions_epochs: get_integer(entries, "hmm_train_emissions_epochs")?,
        train_emissions_opts: get_opaque(entries, "hmm_train_emissions_opts")?,
        train_emissions_sge_opts: get_opaque(entries, "hmm_train_emissions_sge_opts")?,
    })
}

fn build_scoring(entries: &BTreeMap<String, Value>) -> Result<ScoringSection, ConfigError> {
    let exclude_syms = match entries.get("score_exclude_syms") {
        Some(Value::Symbols(syms)) => syms.clone(),
        _ => return Err(missing("score_exclude_syms")),
    };
    let collapse_duplicates = match entries.get("score_collapse_duplicates") {
        Some(Value::Flag(b)) => *b,
        _ => return Err(missing("score_collapse_duplicates")),
    };
    Ok(ScoringSection {
        exclude_syms,
        collapse_duplicates,
        phone_map: get_path(entries, "score_phone_map")?,
    })
}

fn missing(name: &str) -> ConfigError {
    ConfigError::MissingRequiredEntry {
        entry: name.to_string(),
    }
}

fn get_path(
    entries: &BTreeMap<String, Value>,
    name: &str,
) -> Result<std::path::PathBuf, ConfigError> {
    match entries.get(name) {
        Some(Value::Path(p)) => Ok(p.clone()),
        _ => Err(missing(name)),
    }
}

fn get_integer(entries: &BTreeMap<String, Value>, name: &str) -> Result<u64, ConfigError> {
    match entries.get(name) {
        Some(Value::Integer(n)) => Ok(*n),
        _ => Err(missing(name)),
    }
}

fn get_float(entries: &BTreeMap<String, Value>, name: &str) -> Result<f64, ConfigError> {
    match entries.get(name) {
        Some(Value::Float(x)) => Ok(*x),
        _ => Err(missing(name)),
    }
}

fn get_opaque(entries: &BTreeMap<String, Value>, name: &str) -> Result<String, ConfigError> {
    match entries.get(name) {
        Some(Value::Opaque(s)) => Ok(s.clone()),
        _ => Err(missing(name)),
    }
}

fn get_int_list(entries: &BTreeMap<String, Value>, name: &str) -> Result<Vec<u64>, ConfigError> {
    match entries.get(name) {
        Some(Value::IntList(v)) => Ok(v.clone()),
        _ => Err(missing(name)),
    }
}

fn get_covariance(
    entries: &BTreeMap<String, Value>,
    name: &str,
) -> Result<CovarianceType, ConfigError> {
    match entries.get(name) {
        Some(Value::Covariance(c)) => Ok(*c),
        _ => Err(missing(name)),
    }
}

fn get_training(
    entries: &BTreeMap<String, Value>,
    name: &str,
) -> Result<TrainingType, ConfigError> {
    match entries.get(name) {
        Some(Value::Training(t)) => Ok(*t),
        _ => Err(missing(name)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;
    use std::path::Path;

    const MINIMAL: &str = "\
fea_conf=conf/fbank.yml
vae_hmm_encoder_conf=conf/encoder.yml
vae_hmm_decoder_conf=conf/decoder.yml
vae_hmm_nflow_conf=conf/nflow.yml
vae_hmm_emissions_conf=conf/emissions.yml
vae_hmm_encoder_out_dim=80
hmm_emissions_conf=conf/hmm_emissions.yml
score_phone_map=data/lang/phones_48_to_39.txt
";

    fn minimal_raw(extra: &str) -> RawAssignments {
        parse(&format!("{MINIMAL}{extra}")).unwrap()
    }

    #[test]
    fn test_minimal_config_resolves_with_defaults() {
        let resolved = load(&minimal_raw(""), &Schema::pipeline()).unwrap();

        assert_eq!(resolved.directories().datadir, Path::new("data"));
        assert_eq!(resolved.features().njobs, 10);
        assert_eq!(resolved.vae_hmm().latent_dim, 30);
        assert_eq!(resolved.vae_hmm().encoder_out_dim, 80);
        assert_eq!(
            resolved.vae_hmm().encoder_cov_type,
            CovarianceType::Isotropic
        );
        assert_eq!(resolved.vae_hmm().training_type, TrainingType::Viterbi);
        assert_eq!(resolved.vae_hmm().lrate_nnet, 1e-3);
        assert_eq!(resolved.hmm_gmm().align_epochs.len(), 19);
        assert!(resolved.scoring().collapse_duplicates);
        assert!(resolved.scoring().exclude_syms.contains("sil"));
        assert_eq!(
            resolved.hmm_gmm().train_emissions_sge_opts,
            "-l gpu=1"
        );
    }

    #[test]
    fn test_resolved_types_match_schema_kinds() {
        let schema = Schema::pipeline();
        let resolved = load(&minimal_raw(""), &schema).unwrap();

        for entry in schema.entries() {
            let Some(value) = resolved.entry(entry.name) else {
                // non-canonical group alternatives have no resolved entry
                assert!(
                    schema
                        .group_of(entry.name)
                        .is_some_and(|g| g.canonical() != entry.name),
                    "{} missing from resolved config",
                    entry.name
                );
                continue;
            };
            let matches = match entry.kind {
                ValueKind::Path => matches!(value, Value::Path(_)),
                ValueKind::Integer => matches!(value, Value::Integer(_)),
                ValueKind::Float => matches!(value, Value::Float(_)),
                ValueKind::Covariance => matches!(value, Value::Covariance(_)),
                ValueKind::Training => matches!(value, Value::Training(_)),
                ValueKind::Opaque => matches!(value, Value::Opaque(_)),
                ValueKind::Flag => matches!(value, Value::Flag(_)),
                ValueKind::IntList => matches!(value, Value::IntList(_)),
                ValueKind::Symbols => matches!(value, Value::Symbols(_)),
            };
            assert!(matches, "{} resolved to the wrong kind", entry.name);
        }
    }

    #[test]
    fn test_resolution_is_idempotent() {
        let raw = minimal_raw("vae_hmm_latent_dim=64\nhmm_epochs=40\n");
        let schema = Schema::pipeline();
        let first = load(&raw, &schema).unwrap();
        let second = load(&raw, &schema).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_missing_required_entry_is_named() {
        let raw = parse("vae_hmm_latent_dim=30\n").unwrap();
        let errs = load(&raw, &Schema::pipeline()).unwrap_err();
        let subjects: Vec<&str> = errs.iter().map(|e| e.subject()).collect();
        assert!(subjects.contains(&"fea_conf"));
        assert!(subjects.contains(&"score_phone_map"));
        assert!(errs.iter().all(|e| matches!(
            e,
            ConfigError::MissingRequiredEntry { .. }
        )));
    }

    #[test]
    fn test_empty_string_triggers_default_substitution() {
        let raw = minimal_raw("vae_hmm_latent_dim=\"\"\n");
        let resolved = load(&raw, &Schema::pipeline()).unwrap();
        assert_eq!(resolved.vae_hmm().latent_dim, 30);
    }

    #[test]
    fn test_type_conversion_error_names_entry() {
        let raw = minimal_raw("vae_hmm_latent_dim=thirty\n");
        let errs = load(&raw, &Schema::pipeline()).unwrap_err();
        assert_eq!(errs.len(), 1);
        match errs.iter().next().unwrap() {
            ConfigError::TypeConversion {
                entry,
                value,
                expected,
            } => {
                assert_eq!(entry, "vae_hmm_latent_dim");
                assert_eq!(value, "thirty");
                assert_eq!(expected, "integer");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_scientific_notation_learning_rate() {
        let raw = minimal_raw("vae_hmm_lrate_nnet=1e-3\n");
        let resolved = load(&raw, &Schema::pipeline()).unwrap();
        assert_eq!(resolved.vae_hmm().lrate_nnet, 1e-3);
    }

    #[test]
    fn test_zero_learning_rate_is_constraint_violation() {
        let raw = minimal_raw("vae_hmm_lrate_nnet=0\n");
        let errs = load(&raw, &Schema::pipeline()).unwrap_err();
        assert!(errs.iter().any(|e| matches!(
            e,
            ConfigError::ConstraintViolation { entry, .. } if entry == "vae_hmm_lrate_nnet"
        )));
    }

    #[test]
    fn test_align_epochs_resolves_strictly_increasing_schedule() {
        let raw = minimal_raw(
            "hmm_align_epochs=\"0 1 2 3 4 5 6 7 8 9 10 12 14 16 18 20 23 26 29\"\n",
        );
        let resolved = load(&raw, &Schema::pipeline()).unwrap();
        let epochs = &resolved.hmm_gmm().align_epochs;
        assert_eq!(epochs.len(), 19);
        assert!(epochs.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_non_increasing_align_epochs_fails() {
        let raw = minimal_raw("hmm_align_epochs=\"0 2 1\"\n");
        let errs = load(&raw, &Schema::pipeline()).unwrap_err();
        assert!(errs.iter().any(|e| matches!(
            e,
            ConfigError::ConstraintViolation { entry, .. } if entry == "hmm_align_epochs"
        )));
    }

    #[test]
    fn test_checkpoint_beyond_total_epochs_fails() {
        let raw = minimal_raw("hmm_align_epochs=\"0 5 30\"\nhmm_epochs=30\n");
        let errs = load(&raw, &Schema::pipeline()).unwrap_err();
        assert!(errs.iter().any(|e| matches!(
            e,
            ConfigError::ConstraintViolation { entry, .. } if entry == "hmm_align_epochs"
        )));
    }

    #[test]
    fn test_invalid_covariance_type_lists_alternatives() {
        let raw = minimal_raw("vae_hmm_encoder_cov_type=spherical\n");
        let errs = load(&raw, &Schema::pipeline()).unwrap_err();
        match errs.iter().next().unwrap() {
            ConfigError::TypeConversion { entry, expected, .. } => {
                assert_eq!(entry, "vae_hmm_encoder_cov_type");
                assert!(expected.contains("isotropic"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_duplicate_entry_with_distinct_values_conflicts() {
        // In the source format these are two adjacent lines of which only
        // one should stay uncommented.
        let raw = minimal_raw(
            "hmm_train_emissions_sge_opts=\"-l gpu=1,hostname=b1[123456789]*|c*\"\n\
             hmm_train_emissions_sge_opts=\"-l gpu=1\"\n",
        );
        let errs = load(&raw, &Schema::pipeline()).unwrap_err();
        assert_eq!(errs.len(), 1);
        match errs.iter().next().unwrap() {
            ConfigError::ConflictingOptions {
                group,
                alternatives,
            } => {
                assert_eq!(group, "hmm_train_emissions_sge_opts");
                assert_eq!(alternatives.len(), 2);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_duplicate_entry_with_equal_values_selects_one() {
        let raw = minimal_raw("fea_njobs=20\nfea_njobs=20\n");
        let resolved = load(&raw, &Schema::pipeline()).unwrap();
        assert_eq!(resolved.features().njobs, 20);
    }

    #[test]
    fn test_exclusive_group_both_members_active_conflicts() {
        let raw = minimal_raw(
            "hmm_train_emissions_sge_opts=\"-l gpu=1\"\n\
             hmm_train_emissions_sge_opts_gpu=\"-l gpu=1,hostname=b1[123456789]*|c*\"\n",
        );
        let errs = load(&raw, &Schema::pipeline()).unwrap_err();
        match errs.iter().next().unwrap() {
            ConfigError::ConflictingOptions {
                group,
                alternatives,
            } => {
                assert_eq!(group, "emissions_sge_opts");
                assert!(alternatives.contains(&"hmm_train_emissions_sge_opts".to_string()));
                assert!(
                    alternatives.contains(&"hmm_train_emissions_sge_opts_gpu".to_string())
                );
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_gpu_alternative_resolves_under_canonical_name() {
        let raw = minimal_raw(
            "hmm_train_emissions_sge_opts=\"\"\n\
             hmm_train_emissions_sge_opts_gpu=\"-l gpu=1,hostname=b1[123456789]*|c*\"\n",
        );
        let resolved = load(&raw, &Schema::pipeline()).unwrap();
        assert_eq!(
            resolved.hmm_gmm().train_emissions_sge_opts,
            "-l gpu=1,hostname=b1[123456789]*|c*"
        );
        assert_eq!(
            resolved
                .entry("hmm_train_emissions_sge_opts")
                .and_then(Value::as_opaque),
            Some("-l gpu=1,hostname=b1[123456789]*|c*")
        );
        assert!(resolved.entry("hmm_train_emissions_sge_opts_gpu").is_none());
    }

    #[test]
    fn test_all_errors_collected_in_one_pass() {
        let raw = parse(
            "vae_hmm_latent_dim=thirty\n\
             vae_hmm_lrate=-0.5\n\
             fea_njobs=zero\n",
        )
        .unwrap();
        let errs = load(&raw, &Schema::pipeline()).unwrap_err();
        // two conversion failures plus every missing required entry
        let subjects: Vec<&str> = errs.iter().map(|e| e.subject()).collect();
        assert!(subjects.contains(&"vae_hmm_latent_dim"));
        assert!(subjects.contains(&"fea_njobs"));
        assert!(subjects.contains(&"fea_conf"));
        assert!(errs.len() >= 5);
    }

    #[test]
    fn test_constraint_violations_survive_unrelated_type_error() {
        // a mistyped entry must not mask the rule failures of entries that
        // converted cleanly
        let raw = minimal_raw("vae_hmm_latent_dim=thirty\nvae_hmm_lrate_nnet=0\n");
        let errs = load(&raw, &Schema::pipeline()).unwrap_err();
        assert!(errs.iter().any(|e| matches!(
            e,
            ConfigError::TypeConversion { entry, .. } if entry == "vae_hmm_latent_dim"
        )));
        assert!(errs.iter().any(|e| matches!(
            e,
            ConfigError::ConstraintViolation { entry, .. } if entry == "vae_hmm_lrate_nnet"
        )));
    }

    #[test]
    fn test_failed_entry_is_not_double_reported() {
        // the stand-in default used during constraint checking must not
        // produce a second error for the same entry
        let raw = minimal_raw("vae_hmm_latent_dim=thirty\n");
        let errs = load(&raw, &Schema::pipeline()).unwrap_err();
        assert_eq!(errs.len(), 1);
    }

    #[test]
    fn test_job_count_exceeding_cluster_capacity_fails() {
        let schema = Schema::pipeline().with_cluster_capacity(50);
        let raw = minimal_raw("fea_njobs=200\n");
        let errs = load(&raw, &schema).unwrap_err();
        assert!(errs.iter().any(|e| matches!(
            e,
            ConfigError::ConstraintViolation { entry, .. } if entry == "fea_njobs"
        )));

        let raw = minimal_raw("fea_njobs=50\n");
        assert!(load(&raw, &schema).is_ok());
    }

    #[test]
    fn test_unknown_entries_are_ignored() {
        let raw = minimal_raw("some_future_knob=17\n");
        let resolved = load(&raw, &Schema::pipeline()).unwrap();
        assert!(resolved.entry("some_future_knob").is_none());
    }

    #[test]
    fn test_flag_parsing() {
        let raw = minimal_raw("score_collapse_duplicates=no\n");
        let resolved = load(&raw, &Schema::pipeline()).unwrap();
        assert!(!resolved.scoring().collapse_duplicates);

        let raw = minimal_raw("score_collapse_duplicates=maybe\n");
        let errs = load(&raw, &Schema::pipeline()).unwrap_err();
        assert_eq!(errs.iter().next().unwrap().subject(), "score_collapse_duplicates");
    }

    #[test]
    fn test_symbol_set_resolution() {
        let raw = minimal_raw("score_exclude_syms=\"sil spn nsn sil\"\n");
        let resolved = load(&raw, &Schema::pipeline()).unwrap();
        let syms = &resolved.scoring().exclude_syms;
        assert_eq!(syms.len(), 3);
        assert!(syms.contains("spn"));
    }

    #[test]
    fn test_resolved_config_is_shareable_across_threads() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<ResolvedConfig>();
    }
}
