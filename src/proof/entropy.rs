//! Entropy and brute-force cost of a uniformly drawn sample.

use super::DerivationStep;
use crate::space::{format_log10, SearchSpace};
use serde::{Deserialize, Serialize};
use std::f64::consts::LN_10;

/// Seconds in a Julian year.
pub const SECONDS_PER_YEAR: f64 = 365.25 * 24.0 * 3600.0;

/// An attacker's guessing rate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttackRate {
    pub label: String,
    /// Guesses per second.
    pub per_second: f64,
}

impl AttackRate {
    pub fn new(label: impl Into<String>, per_second: f64) -> Self {
        Self {
            label: label.into(),
            per_second,
        }
    }

    /// GPU cluster, nation-state and theoretical rates.
    pub fn defaults() -> Vec<AttackRate> {
        vec![
            AttackRate::new("GPU cluster", 1e9),
            AttackRate::new("nation-state", 1e10),
            AttackRate::new("theoretical", 1e12),
        ]
    }
}

/// A named entropy level to compare against.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntropyThreshold {
    pub name: String,
    pub bits: f64,
}

impl EntropyThreshold {
    pub fn new(name: impl Into<String>, bits: f64) -> Self {
        Self {
            name: name.into(),
            bits,
        }
    }

    pub fn defaults() -> Vec<EntropyThreshold> {
        vec![
            EntropyThreshold::new("memorized secret", 30.0),
            EntropyThreshold::new("high-value account", 80.0),
            EntropyThreshold::new("cryptographic key equivalent", 128.0),
            EntropyThreshold::new("post-quantum margin", 256.0),
        ]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ThresholdStatus {
    Exceeds,
    Below,
}

impl std::fmt::Display for ThresholdStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            ThresholdStatus::Exceeds => "EXCEEDS",
            ThresholdStatus::Below => "BELOW",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ThresholdComparison {
    pub name: String,
    pub bits: f64,
    pub status: ThresholdStatus,
}

/// Expected time to find a sample by exhaustive search.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CrackTime {
    pub label: String,
    pub per_second: f64,
    pub log10_seconds: f64,
    pub log10_years: f64,
}

impl CrackTime {
    fn at(space: &SearchSpace, rate: &AttackRate) -> Self {
        let log10_seconds = space.ln_half() / LN_10 - rate.per_second.log10();
        Self {
            label: rate.label.clone(),
            per_second: rate.per_second,
            log10_seconds,
            log10_years: log10_seconds - SECONDS_PER_YEAR.log10(),
        }
    }

    /// Infinite when the value does not fit in `f64`.
    pub fn years(&self) -> f64 {
        10f64.powf(self.log10_years)
    }
}

/// Entropy derivation for `L` symbols drawn uniformly from `N`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntropyProof {
    pub alphabet_size: usize,
    pub sample_length: usize,
    pub bits_per_symbol: f64,
    pub total_entropy_bits: f64,
    pub space: SearchSpace,
    /// `ln(S / 2)`.
    pub ln_expected_attempts: f64,
    pub crack_times: Vec<CrackTime>,
    pub thresholds: Vec<ThresholdComparison>,
    pub derivation: Vec<DerivationStep>,
}

impl EntropyProof {
    pub fn derive(
        alphabet_size: usize,
        sample_length: usize,
        rates: &[AttackRate],
        thresholds: &[EntropyThreshold],
    ) -> Self {
        let bits_per_symbol = (alphabet_size as f64).log2();
        let total_entropy_bits = sample_length as f64 * bits_per_symbol;
        let space = SearchSpace::new(alphabet_size, sample_length);
        let ln_expected_attempts = space.ln_half();

        let crack_times = rates.iter().map(|r| CrackTime::at(&space, r)).collect();

        let thresholds = thresholds
            .iter()
            .map(|t| ThresholdComparison {
                name: t.name.clone(),
                bits: t.bits,
                status: if total_entropy_bits >= t.bits {
                    ThresholdStatus::Exceeds
                } else {
                    ThresholdStatus::Below
                },
            })
            .collect();

        let (n, l) = (alphabet_size, sample_length);
        let derivation = vec![
            DerivationStep::new(
                "symbol probability",
                format!("P(X_i = c) = 1/{}", n),
                format!("{:.6}", 1.0 / n as f64),
            ),
            DerivationStep::new(
                "bits per symbol",
                format!("H(X_i) = log2({})", n),
                format!("{:.4}", bits_per_symbol),
            ),
            DerivationStep::new(
                "total entropy",
                format!("H = {} x {:.4}", l, bits_per_symbol),
                format!("{:.2} bits", total_entropy_bits),
            ),
            DerivationStep::new("search space", format!("S = {}^{}", n, l), space.to_string()),
            DerivationStep::new(
                "expected attempts",
                "S / 2".to_owned(),
                format_log10(ln_expected_attempts / LN_10),
            ),
        ];

        Self {
            alphabet_size,
            sample_length,
            bits_per_symbol,
            total_entropy_bits,
            space,
            ln_expected_attempts,
            crack_times,
            thresholds,
            derivation,
        }
    }

    /// Status against the threshold called `name`, if configured.
    pub fn status_for(&self, name: &str) -> Option<ThresholdStatus> {
        self.thresholds
            .iter()
            .find(|t| t.name == name)
            .map(|t| t.status)
    }
}
