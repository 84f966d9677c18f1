//! Statistical and heuristic audits of generated samples.
//!
//! Every audit is a total function over a well-formed batch or sample
//! and reports a [`Verdict`] as data. None of them prove randomness;
//! they catch the failures that are cheap to detect.

mod calibration;
mod collision;
mod pattern;
mod threshold;
mod uniformity;

pub use calibration::{Calibration, CalibrationSummary};
pub use collision::{
    collision_probability, BirthdayBound, BoundMethod, Duplicate, DuplicateReport,
    EXACT_PRODUCT_LIMIT, SCALE_BATCH_SIZES,
};
pub use pattern::{PatternIssue, PatternReport, MIN_CLASS_DIVERSITY, WEAK_PATTERNS};
pub use threshold::{AuditThresholds, ThresholdViolation, Verdict};
pub use uniformity::{
    erfc, lag1_autocorrelation, wilson_hilferty_p_value, ChiSquared, RunsTest, SerialCorrelation,
    UniformityReport, FREQUENCY_EXTREMES,
};
