//! Birthday-bound uniqueness argument for a batch.

use super::DerivationStep;
use crate::analysis::{BirthdayBound, BoundMethod};
use crate::space::format_log10;
use serde::Serialize;
use std::f64::consts::{LN_10, LN_2};

/// How worrying a collision probability is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UniquenessConclusion {
    /// Below 1e-30.
    Negligible,
    /// Below one in a billion.
    Acceptable,
    Concerning,
}

impl UniquenessConclusion {
    pub fn classify(collision_probability: f64) -> Self {
        if collision_probability < 1e-30 {
            UniquenessConclusion::Negligible
        } else if collision_probability < 1e-9 {
            UniquenessConclusion::Acceptable
        } else {
            UniquenessConclusion::Concerning
        }
    }
}

impl std::fmt::Display for UniquenessConclusion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            UniquenessConclusion::Negligible => "negligible",
            UniquenessConclusion::Acceptable => "acceptable",
            UniquenessConclusion::Concerning => "concerning, consider a longer sample",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UniquenessProof {
    pub bound: BirthdayBound,
    pub conclusion: UniquenessConclusion,
    pub derivation: Vec<DerivationStep>,
}

impl UniquenessProof {
    pub fn derive(alphabet_size: usize, sample_length: usize, batch_size: u64) -> Self {
        Self::from_bound(BirthdayBound::compute(
            alphabet_size,
            sample_length,
            batch_size,
        ))
    }

    pub fn from_bound(bound: BirthdayBound) -> Self {
        let space = bound.space;
        let k = bound.batch_size;
        let p = bound.collision_probability;

        let probability_formula = match bound.method {
            BoundMethod::ExactProduct => "P = 1 - prod(1 - i/S), i < k",
            BoundMethod::Approximation => "P = 1 - exp(-k^2 / 2S)",
        };
        // k^2 / 2S in log10
        let log10_exponent = (2.0 * (k as f64).ln() - LN_2 - space.ln) / LN_10;

        let derivation = vec![
            DerivationStep::new(
                "space size",
                format!("S = {}^{}", space.alphabet_size, space.sample_length),
                space.to_string(),
            ),
            DerivationStep::new(
                "exponent",
                format!("k^2 / 2S, k = {}", k),
                format_log10(log10_exponent),
            ),
            DerivationStep::new(
                "collision probability",
                probability_formula.to_owned(),
                format!("{:.2e}", p),
            ),
            DerivationStep::new(
                "50% collision batch",
                "k = sqrt(2S ln 2)".to_owned(),
                format_log10(bound.ln_k_50 / LN_10),
            ),
            DerivationStep::new(
                "1e-9 collision batch",
                "k = sqrt(2S x 1e-9)".to_owned(),
                format_log10(bound.ln_k_ppb / LN_10),
            ),
        ];

        Self {
            conclusion: UniquenessConclusion::classify(p),
            bound,
            derivation,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classification_tiers() {
        assert_eq!(UniquenessConclusion::classify(0.0), UniquenessConclusion::Negligible);
        assert_eq!(UniquenessConclusion::classify(1e-31), UniquenessConclusion::Negligible);
        assert_eq!(UniquenessConclusion::classify(1e-30), UniquenessConclusion::Acceptable);
        assert_eq!(UniquenessConclusion::classify(5e-10), UniquenessConclusion::Acceptable);
        assert_eq!(UniquenessConclusion::classify(1e-9), UniquenessConclusion::Concerning);
    }

    #[test]
    fn test_full_charset_batch_is_negligible() {
        let proof = UniquenessProof::derive(94, 32, 500);
        assert_eq!(proof.conclusion, UniquenessConclusion::Negligible);
        assert_eq!(proof.derivation.len(), 5);
    }

    #[test]
    fn test_short_pins_are_concerning() {
        let proof = UniquenessProof::derive(10, 4, 200);
        assert_eq!(proof.conclusion, UniquenessConclusion::Concerning);
        assert!(proof.bound.collision_probability > 0.8);
    }

    #[test]
    fn test_derivation_uses_log_form() {
        let proof = UniquenessProof::derive(10, 4, 1);
        assert_eq!(proof.derivation[0].value, "1.00e+4");
        assert_eq!(proof.derivation[0].formula, "S = 10^4");
    }
}
