//! Prometheus metrics for audit results.
//!
//! Reports are folded into a [`MetricsRegistry`] and exported in the
//! Prometheus text exposition format. Nothing is served over HTTP; the
//! CLI prints the encoded text with `--metrics`.
//!
//! # Metrics Exposed
//!
//! ## Outcome
//! - `paranoid_audit_runs_total` - Audit runs recorded
//! - `paranoid_audit_verdict` - Latest overall verdict (0=pass, 1=warn, 2=fail)
//! - `paranoid_audit_all_pass` - Core statistical checks passed (1=yes)
//!
//! ## Uniformity
//! - `paranoid_audit_chi2_statistic` / `paranoid_audit_chi2_p_value`
//! - `paranoid_audit_serial_correlation`
//! - `paranoid_audit_runs_deviation`
//!
//! ## Collisions and patterns
//! - `paranoid_audit_duplicates`
//! - `paranoid_audit_pattern_issues`
//! - `paranoid_audit_collision_probability`
//!
//! ## Derived
//! - `paranoid_audit_entropy_bits`
//! - `paranoid_audit_rejection_rate`
//! - `paranoid_audit_calibration_rounds` / `paranoid_audit_calibration_rejection_rate`
//!
//! # Example
//!
//! ```no_run
//! use paranoid_audit::metrics::{MetricsRegistry, MetricsSnapshot};
//!
//! let registry = MetricsRegistry::new().expect("Failed to create registry");
//!
//! let snapshot = MetricsSnapshot {
//!     verdict: 0,
//!     all_pass: true,
//!     chi2_p_value: Some(0.42),
//!     entropy_bits: Some(209.75),
//!     ..Default::default()
//! };
//!
//! registry.update(&snapshot);
//! println!("{}", registry.encode().expect("encode"));
//! ```

mod collector;

pub use collector::{MetricsError, MetricsRegistry, MetricsSnapshot};
