//! Calibration of the chi-squared test against the live sampler.
//!
//! A correct sampler still fails chi-squared at a rate equal to the
//! p-value threshold. Running many independent audits and comparing the
//! observed rejection rate with that threshold checks the test and the
//! generator together.

use super::threshold::AuditThresholds;
use super::uniformity::ChiSquared;
use crate::sampler::{Alphabet, Sampler, SamplerError};
use crate::source::ByteSource;
use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};

/// Standard errors of slack allowed around the expected rejection rate.
const CONSISTENCY_SIGMAS: f64 = 3.0;

/// Outcome of a calibration run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CalibrationSummary {
    pub rounds: u64,
    pub rejections: u64,
    pub rejection_rate: f64,
    pub expected_rate: f64,
    /// Set when the run ended on the stop flag.
    pub interrupted: bool,
    pub consistent: bool,
}

/// Repeated chi-squared audits over fresh batches.
pub struct Calibration {
    thresholds: AuditThresholds,
    rounds: u64,
    rejections: u64,
    consecutive_rejections: u64,
}

impl Calibration {
    pub fn new(thresholds: AuditThresholds) -> Self {
        Self {
            thresholds,
            rounds: 0,
            rejections: 0,
            consecutive_rejections: 0,
        }
    }

    /// Audits up to `rounds` batches of `batch_size` samples.
    ///
    /// `stop` is polled between rounds; once set the run returns what it
    /// has so far.
    pub fn run<S: ByteSource>(
        &mut self,
        sampler: &mut Sampler<S>,
        alphabet: &Alphabet,
        batch_size: usize,
        length: usize,
        rounds: u64,
        stop: &AtomicBool,
    ) -> Result<CalibrationSummary, SamplerError> {
        tracing::info!(rounds, batch_size, length, "Starting calibration");

        let mut interrupted = false;
        for _ in 0..rounds {
            if stop.load(Ordering::SeqCst) {
                interrupted = true;
                tracing::info!(completed = self.rounds, "Calibration interrupted");
                break;
            }

            let batch = sampler.generate_batch(batch_size, length, alphabet)?;
            self.record(&ChiSquared::compute(&batch, alphabet, &self.thresholds));
        }

        let summary = self.summary(interrupted);
        tracing::info!(
            rounds = summary.rounds,
            rejection_rate = summary.rejection_rate,
            expected = summary.expected_rate,
            consistent = summary.consistent,
            "Calibration finished"
        );
        Ok(summary)
    }

    /// Folds one chi-squared result into the counters.
    pub fn record(&mut self, result: &ChiSquared) {
        self.rounds += 1;

        if result.verdict.is_fail() {
            self.rejections += 1;
            self.consecutive_rejections += 1;
            if self.consecutive_rejections == 3 {
                tracing::warn!(
                    round = self.rounds,
                    p_value = result.p_value,
                    "Three consecutive chi-squared rejections"
                );
            }
        } else {
            self.consecutive_rejections = 0;
        }

        tracing::trace!(
            round = self.rounds,
            p_value = result.p_value,
            statistic = result.statistic,
            "Calibration round"
        );
    }

    /// Fraction of rounds that failed; 0 before any round.
    pub fn rejection_rate(&self) -> f64 {
        if self.rounds == 0 {
            0.0
        } else {
            self.rejections as f64 / self.rounds as f64
        }
    }

    /// Whether the observed rate is within a few standard errors of the
    /// p-value threshold. Only excess rejections count against it.
    pub fn is_consistent(&self) -> bool {
        if self.rounds == 0 {
            return true;
        }
        let expected = self.thresholds.min_chi2_p_value;
        let std_err = (expected * (1.0 - expected) / self.rounds as f64).sqrt();
        self.rejection_rate() <= expected + CONSISTENCY_SIGMAS * std_err
    }

    pub fn rounds(&self) -> u64 {
        self.rounds
    }

    pub fn rejections(&self) -> u64 {
        self.rejections
    }

    pub fn summary(&self, interrupted: bool) -> CalibrationSummary {
        CalibrationSummary {
            rounds: self.rounds,
            rejections: self.rejections,
            rejection_rate: self.rejection_rate(),
            expected_rate: self.thresholds.min_chi2_p_value,
            interrupted,
            consistent: self.is_consistent(),
        }
    }
}

impl Default for Calibration {
    fn default() -> Self {
        Self::new(AuditThresholds::default())
    }
}
