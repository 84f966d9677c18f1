//! Password-policy frameworks.
//!
//! Minimums follow the published guidance where it exists and common
//! industry practice where it does not; they are not legal advice.

use crate::sampler::ClassCounts;
use serde::Serialize;

/// Length, entropy and composition minimums of one framework.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ComplianceFramework {
    pub name: &'static str,
    pub description: &'static str,
    pub min_length: usize,
    pub min_entropy_bits: f64,
    pub require_mixed_case: bool,
    pub require_digits: bool,
    pub require_symbols: bool,
}

/// NIST SP 800-63B memorized secrets. Composition rules are discouraged.
pub const NIST_SP_800_63B: ComplianceFramework = ComplianceFramework {
    name: "NIST SP 800-63B",
    description: "US federal digital identity guidelines (memorized secrets)",
    min_length: 8,
    min_entropy_bits: 30.0,
    require_mixed_case: false,
    require_digits: false,
    require_symbols: false,
};

/// PCI DSS 4.0, requirement 8.3.6.
pub const PCI_DSS_4: ComplianceFramework = ComplianceFramework {
    name: "PCI DSS 4.0",
    description: "Payment card industry data security standard",
    min_length: 12,
    min_entropy_bits: 60.0,
    require_mixed_case: true,
    require_digits: true,
    require_symbols: false,
};

pub const HIPAA: ComplianceFramework = ComplianceFramework {
    name: "HIPAA",
    description: "US health information privacy (HHS/HITRUST guidance)",
    min_length: 8,
    min_entropy_bits: 50.0,
    require_mixed_case: true,
    require_digits: true,
    require_symbols: true,
};

pub const SOC_2: ComplianceFramework = ComplianceFramework {
    name: "SOC 2",
    description: "Service organization controls (AICPA trust services criteria)",
    min_length: 8,
    min_entropy_bits: 50.0,
    require_mixed_case: true,
    require_digits: true,
    require_symbols: false,
};

pub const GDPR_ENISA: ComplianceFramework = ComplianceFramework {
    name: "GDPR/ENISA",
    description: "EU data protection (ENISA technical guidelines)",
    min_length: 10,
    min_entropy_bits: 80.0,
    require_mixed_case: true,
    require_digits: true,
    require_symbols: true,
};

/// ISO/IEC 27001:2022, Annex A.5.17.
pub const ISO_27001: ComplianceFramework = ComplianceFramework {
    name: "ISO 27001",
    description: "International information security management",
    min_length: 12,
    min_entropy_bits: 90.0,
    require_mixed_case: true,
    require_digits: true,
    require_symbols: true,
};

pub const FRAMEWORKS: [ComplianceFramework; 6] =
    [NIST_SP_800_63B, PCI_DSS_4, HIPAA, SOC_2, GDPR_ENISA, ISO_27001];

/// A requirement the sample did not meet.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "requirement", rename_all = "snake_case")]
pub enum ComplianceGap {
    Length { required: usize, actual: usize },
    Entropy { required: f64, actual: f64 },
    MixedCase,
    Digits,
    Symbols,
}

impl std::fmt::Display for ComplianceGap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ComplianceGap::Length { required, actual } => {
                write!(f, "length {} below {}", actual, required)
            }
            ComplianceGap::Entropy { required, actual } => {
                write!(f, "entropy {:.1} bits below {:.1}", actual, required)
            }
            ComplianceGap::MixedCase => f.write_str("needs upper and lower case"),
            ComplianceGap::Digits => f.write_str("needs a digit"),
            ComplianceGap::Symbols => f.write_str("needs a symbol"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComplianceResult {
    pub framework: &'static str,
    pub gaps: Vec<ComplianceGap>,
}

impl ComplianceResult {
    pub fn is_compliant(&self) -> bool {
        self.gaps.is_empty()
    }
}

impl ComplianceFramework {
    /// Checks a sample's length, entropy and composition.
    pub fn check(
        &self,
        length: usize,
        entropy_bits: f64,
        composition: &ClassCounts,
    ) -> ComplianceResult {
        let mut gaps = Vec::new();

        if length < self.min_length {
            gaps.push(ComplianceGap::Length {
                required: self.min_length,
                actual: length,
            });
        }
        if entropy_bits < self.min_entropy_bits {
            gaps.push(ComplianceGap::Entropy {
                required: self.min_entropy_bits,
                actual: entropy_bits,
            });
        }
        if self.require_mixed_case && (composition.lowercase == 0 || composition.uppercase == 0) {
            gaps.push(ComplianceGap::MixedCase);
        }
        if self.require_digits && composition.digits == 0 {
            gaps.push(ComplianceGap::Digits);
        }
        if self.require_symbols && composition.symbols == 0 {
            gaps.push(ComplianceGap::Symbols);
        }

        ComplianceResult {
            framework: self.name,
            gaps,
        }
    }
}

/// Checks against every built-in framework.
pub fn check_all(
    length: usize,
    entropy_bits: f64,
    composition: &ClassCounts,
) -> Vec<ComplianceResult> {
    FRAMEWORKS
        .iter()
        .map(|fw| fw.check(length, entropy_bits, composition))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn counts(text: &str) -> ClassCounts {
        ClassCounts::tally(text.chars())
    }

    #[test]
    fn test_strong_sample_meets_everything() {
        let text = "k7#Qz!m2Rw9$Lp4&Tx8@";
        let results = check_all(text.len(), 20.0 * 94f64.log2(), &counts(text));
        assert!(results.iter().all(ComplianceResult::is_compliant));
    }

    #[test]
    fn test_nist_has_no_composition_rules() {
        let text = "abcdefgh";
        let result = NIST_SP_800_63B.check(8, 8.0 * 26f64.log2(), &counts(text));
        assert!(result.is_compliant());

        let hipaa = HIPAA.check(8, 8.0 * 26f64.log2(), &counts(text));
        assert_eq!(
            hipaa.gaps,
            vec![
                ComplianceGap::Entropy {
                    required: 50.0,
                    actual: 8.0 * 26f64.log2()
                },
                ComplianceGap::MixedCase,
                ComplianceGap::Digits,
                ComplianceGap::Symbols
            ]
        );
    }

    #[test]
    fn test_pci_length() {
        let text = "Ab3Ab3Ab3A";
        let result = PCI_DSS_4.check(10, 100.0, &counts(text));
        assert_eq!(
            result.gaps,
            vec![ComplianceGap::Length {
                required: 12,
                actual: 10
            }]
        );
    }

    #[test]
    fn test_framework_table() {
        let names: Vec<_> = FRAMEWORKS.iter().map(|f| f.name).collect();
        assert_eq!(
            names,
            ["NIST SP 800-63B", "PCI DSS 4.0", "HIPAA", "SOC 2", "GDPR/ENISA", "ISO 27001"]
        );
        assert_eq!(ISO_27001.min_entropy_bits, 90.0);
    }
}
