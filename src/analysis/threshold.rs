//! Decision thresholds and verdicts.
//!
//! Audit outcomes are data, not errors: each test reports a
//! [`Verdict`] and the caller decides what to escalate.

use super::uniformity::UniformityReport;
use serde::{Deserialize, Serialize};

/// Outcome of a single audit check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Verdict {
    Pass,
    Warn,
    Fail,
}

impl Verdict {
    /// Returns true for [`Verdict::Pass`].
    pub fn is_pass(self) -> bool {
        self == Verdict::Pass
    }

    /// Returns true for [`Verdict::Fail`].
    pub fn is_fail(self) -> bool {
        self == Verdict::Fail
    }

    /// Combines two verdicts, keeping the more severe.
    pub fn worst(self, other: Verdict) -> Verdict {
        self.max(other)
    }
}

impl std::fmt::Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Verdict::Pass => "PASS",
            Verdict::Warn => "WARN",
            Verdict::Fail => "FAIL",
        })
    }
}

/// Thresholds for the uniformity tests.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuditThresholds {
    /// Chi-squared fails when the p-value drops below this.
    pub min_chi2_p_value: f64,
    /// Serial correlation fails when `|r|` reaches this.
    pub max_serial_correlation: f64,
    /// Runs test warns when the relative deviation reaches this.
    pub max_runs_deviation: f64,
}

impl Default for AuditThresholds {
    fn default() -> Self {
        Self {
            min_chi2_p_value: 0.01,
            max_serial_correlation: 0.05,
            max_runs_deviation: 0.1,
        }
    }
}

impl AuditThresholds {
    /// Creates stricter thresholds.
    pub fn conservative() -> Self {
        Self {
            min_chi2_p_value: 0.05,
            max_serial_correlation: 0.02,
            max_runs_deviation: 0.05,
        }
    }

    /// Creates looser thresholds (for testing).
    pub fn permissive() -> Self {
        Self {
            min_chi2_p_value: 0.001,
            max_serial_correlation: 0.1,
            max_runs_deviation: 0.2,
        }
    }

    /// Checks a uniformity report against the hard thresholds.
    ///
    /// The runs test is advisory and never produces a violation.
    pub fn check(&self, report: &UniformityReport) -> Result<(), ThresholdViolation> {
        if report.chi_squared.p_value < self.min_chi2_p_value {
            return Err(ThresholdViolation::ChiSquared {
                observed: report.chi_squared.p_value,
                threshold: self.min_chi2_p_value,
            });
        }

        if report.serial_correlation.coefficient.abs() >= self.max_serial_correlation {
            return Err(ThresholdViolation::SerialCorrelation {
                observed: report.serial_correlation.coefficient,
                threshold: self.max_serial_correlation,
            });
        }

        Ok(())
    }
}

/// Threshold violation types.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ThresholdViolation {
    #[error("chi-squared p-value {observed:.4} below threshold {threshold:.4}")]
    ChiSquared { observed: f64, threshold: f64 },

    #[error("serial correlation {observed:.4} reaches threshold {threshold:.4}")]
    SerialCorrelation { observed: f64, threshold: f64 },
}
