//! Entropy and uniqueness derivations.
//!
//! Proof records are pure functions of `(N, L)` (and `k` for
//! uniqueness). They assume symbols are uniform and independent; the
//! audits in [`crate::analysis`] are what test that assumption.

mod compliance;
mod entropy;
mod uniqueness;

pub use compliance::{
    check_all, ComplianceFramework, ComplianceGap, ComplianceResult, FRAMEWORKS, GDPR_ENISA,
    HIPAA, ISO_27001, NIST_SP_800_63B, PCI_DSS_4, SOC_2,
};
pub use entropy::{
    AttackRate, CrackTime, EntropyProof, EntropyThreshold, ThresholdComparison, ThresholdStatus,
    SECONDS_PER_YEAR,
};
pub use uniqueness::{UniquenessConclusion, UniquenessProof};

use crate::sampler::Sample;
use serde::{Deserialize, Serialize};

/// One line of a derivation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DerivationStep {
    pub label: &'static str,
    pub formula: String,
    pub value: String,
}

impl DerivationStep {
    pub fn new(label: &'static str, formula: String, value: String) -> Self {
        Self {
            label,
            formula,
            value,
        }
    }
}

impl std::fmt::Display for DerivationStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {} = {}", self.label, self.formula, self.value)
    }
}

/// Attack-rate and threshold tables used by the derivations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProofEngine {
    pub attack_rates: Vec<AttackRate>,
    pub entropy_thresholds: Vec<EntropyThreshold>,
}

impl Default for ProofEngine {
    fn default() -> Self {
        Self {
            attack_rates: AttackRate::defaults(),
            entropy_thresholds: EntropyThreshold::defaults(),
        }
    }
}

impl ProofEngine {
    pub fn new(attack_rates: Vec<AttackRate>, entropy_thresholds: Vec<EntropyThreshold>) -> Self {
        Self {
            attack_rates,
            entropy_thresholds,
        }
    }

    pub fn entropy(&self, alphabet_size: usize, sample_length: usize) -> EntropyProof {
        EntropyProof::derive(
            alphabet_size,
            sample_length,
            &self.attack_rates,
            &self.entropy_thresholds,
        )
    }

    pub fn uniqueness(
        &self,
        alphabet_size: usize,
        sample_length: usize,
        batch_size: u64,
    ) -> UniquenessProof {
        UniquenessProof::derive(alphabet_size, sample_length, batch_size)
    }

    /// Checks `sample` against every framework, crediting it with the
    /// entropy of its generating distribution.
    pub fn compliance(&self, sample: &Sample, proof: &EntropyProof) -> Vec<ComplianceResult> {
        check_all(sample.len(), proof.total_entropy_bits, &sample.class_counts())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_tables() {
        let engine = ProofEngine::default();
        assert_eq!(engine.attack_rates.len(), 3);
        assert_eq!(engine.entropy_thresholds.len(), 4);
        assert_eq!(engine.attack_rates[0].per_second, 1e9);
    }

    #[test]
    fn test_custom_rates_flow_through() {
        let engine = ProofEngine::new(vec![AttackRate::new("laptop", 1e6)], vec![]);
        let proof = engine.entropy(10, 8);
        assert_eq!(proof.crack_times.len(), 1);
        // 10^8 / 2 at 10^6 per second is 50 seconds
        assert!((proof.crack_times[0].log10_seconds - 50f64.log10()).abs() < 1e-9);
        assert!(proof.thresholds.is_empty());
    }

    #[test]
    fn test_compliance_uses_proof_entropy() {
        let engine = ProofEngine::default();
        let sample = Sample::from("k7#Qz!m2Rw9$Lp4&");
        let proof = engine.entropy(94, sample.len());
        let results = engine.compliance(&sample, &proof);

        let iso = results.iter().find(|r| r.framework == "ISO 27001").unwrap();
        assert!(iso.is_compliant());
    }

    #[test]
    fn test_step_display() {
        let step = DerivationStep::new("bits", "log2(2)".into(), "1".into());
        assert_eq!(step.to_string(), "bits: log2(2) = 1");
    }
}
