//! Audit configuration.
//!
//! Every section of the TOML file is optional and falls back to the
//! defaults below. Ranges are checked once at load time so the rest of
//! the crate can trust the values.

use crate::analysis::AuditThresholds;
use crate::fingerprint::HashAlgorithm;
use crate::proof::ProofEngine;
use crate::sampler::{Alphabet, CharsetPreset, ClassRequirements, SamplerError};
use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;
use std::path::Path;

/// Accepted sample lengths.
pub const LENGTH_RANGE: RangeInclusive<usize> = 1..=256;

/// Accepted batch sizes.
pub const BATCH_SIZE_RANGE: RangeInclusive<usize> = 1..=2000;

pub const DEFAULT_LENGTH: usize = 32;
pub const DEFAULT_BATCH_SIZE: usize = 500;

/// What to generate and how.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Built-in character set.
    pub charset: CharsetPreset,
    /// Printable-ASCII symbols; replaces `charset` when set.
    pub custom_charset: Option<String>,
    /// Symbols per sample.
    pub length: usize,
    /// Samples per audit batch.
    pub batch_size: usize,
    /// Seeds a ChaCha20 source instead of the OS CSPRNG.
    pub seed: Option<u64>,
    /// Digest used for report fingerprints.
    pub fingerprint: HashAlgorithm,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            charset: CharsetPreset::default(),
            custom_charset: None,
            length: DEFAULT_LENGTH,
            batch_size: DEFAULT_BATCH_SIZE,
            seed: None,
            fingerprint: HashAlgorithm::default(),
        }
    }
}

impl GeneratorConfig {
    /// Resolves the alphabet, preferring `custom_charset`.
    pub fn alphabet(&self) -> Result<Alphabet, ConfigError> {
        match &self.custom_charset {
            Some(text) => Alphabet::printable(text).map_err(ConfigError::Charset),
            None => Ok(Alphabet::preset(self.charset)),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !LENGTH_RANGE.contains(&self.length) {
            return Err(ConfigError::InvalidLength(self.length));
        }
        if !BATCH_SIZE_RANGE.contains(&self.batch_size) {
            return Err(ConfigError::InvalidBatchSize(self.batch_size));
        }
        self.alphabet().map(|_| ())
    }
}

/// Full configuration file format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct FileConfig {
    #[serde(default)]
    pub generator: GeneratorConfig,
    #[serde(default)]
    pub requirements: ClassRequirements,
    #[serde(default)]
    pub thresholds: AuditThresholds,
    #[serde(default)]
    pub proof: ProofEngine,
}

impl FileConfig {
    /// Loads and validates configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::FileReadError(e.to_string()))?;
        Self::from_toml(&content)
    }

    /// Parses and validates configuration from TOML text.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: FileConfig =
            toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.generator.validate()?;

        let t = &self.thresholds;
        if !(t.min_chi2_p_value > 0.0 && t.min_chi2_p_value < 1.0) {
            return Err(ConfigError::InvalidThreshold(format!(
                "min_chi2_p_value {} outside (0, 1)",
                t.min_chi2_p_value
            )));
        }
        if !(t.max_serial_correlation > 0.0 && t.max_serial_correlation <= 1.0) {
            return Err(ConfigError::InvalidThreshold(format!(
                "max_serial_correlation {} outside (0, 1]",
                t.max_serial_correlation
            )));
        }
        if !(t.max_runs_deviation > 0.0 && t.max_runs_deviation.is_finite()) {
            return Err(ConfigError::InvalidThreshold(format!(
                "max_runs_deviation {} must be positive",
                t.max_runs_deviation
            )));
        }
        if let Some(rate) = self
            .proof
            .attack_rates
            .iter()
            .find(|r| !(r.per_second > 0.0 && r.per_second.is_finite()))
        {
            return Err(ConfigError::InvalidThreshold(format!(
                "attack rate '{}' must be positive, got {}",
                rate.label, rate.per_second
            )));
        }

        let alphabet = self.generator.alphabet()?;
        self.requirements
            .check_satisfiable(self.generator.length, &alphabet)
            .map_err(ConfigError::Requirements)
    }
}

/// Configuration validation errors.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid sample length {0} (must be 1-256)")]
    InvalidLength(usize),
    #[error("invalid batch size {0} (must be 1-2000)")]
    InvalidBatchSize(usize),
    #[error("invalid threshold: {0}")]
    InvalidThreshold(String),
    #[error("invalid charset: {0}")]
    Charset(#[source] SamplerError),
    #[error("invalid requirements: {0}")]
    Requirements(#[source] SamplerError),
    #[error("failed to read config file: {0}")]
    FileReadError(String),
    #[error("failed to parse config file: {0}")]
    ParseError(String),
}
