//! Metrics collection and registry.

use crate::analysis::{CalibrationSummary, Verdict};
use crate::audit::{AuditRecord, AuditReport};
use prometheus::{Encoder, Gauge, IntCounter, IntGauge, Registry, TextEncoder};
use thiserror::Error;

/// Errors that can occur during metrics operations.
#[derive(Debug, Error)]
pub enum MetricsError {
    #[error("prometheus error: {0}")]
    Prometheus(#[from] prometheus::Error),
}

/// The numbers exported from one audit report.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MetricsSnapshot {
    /// Overall verdict as 0 (pass), 1 (warn) or 2 (fail).
    pub verdict: i64,
    pub all_pass: bool,
    pub chi2_statistic: Option<f64>,
    pub chi2_p_value: Option<f64>,
    pub serial_correlation: Option<f64>,
    pub runs_deviation: Option<f64>,
    pub duplicates: usize,
    pub pattern_issues: usize,
    pub entropy_bits: Option<f64>,
    pub collision_probability: Option<f64>,
    pub observed_rejection_rate: Option<f64>,
}

impl MetricsSnapshot {
    /// Extracts the exported values from `report`.
    pub fn from_report(report: &AuditReport) -> Self {
        let mut snapshot = Self {
            verdict: verdict_code(report.verdict),
            all_pass: report.all_pass,
            ..Default::default()
        };

        for record in &report.records {
            match record {
                AuditRecord::Rejection { observed, .. } => {
                    snapshot.observed_rejection_rate = Some(observed.observed_rate());
                }
                AuditRecord::ChiSquared(r) => {
                    snapshot.chi2_statistic = Some(r.statistic);
                    snapshot.chi2_p_value = Some(r.p_value);
                }
                AuditRecord::SerialCorrelation(r) => {
                    snapshot.serial_correlation = Some(r.coefficient)
                }
                AuditRecord::Runs(r) => snapshot.runs_deviation = Some(r.relative_deviation),
                AuditRecord::Duplicates(r) => snapshot.duplicates = r.duplicates.len(),
                AuditRecord::Pattern(r) => snapshot.pattern_issues = r.issues.len(),
                AuditRecord::Entropy(p) => snapshot.entropy_bits = Some(p.total_entropy_bits),
                AuditRecord::Uniqueness(p) => {
                    snapshot.collision_probability = Some(p.bound.collision_probability)
                }
                AuditRecord::Birthday { .. }
                | AuditRecord::Breach(_)
                | AuditRecord::Compliance { .. } => {}
            }
        }

        snapshot
    }
}

fn verdict_code(verdict: Verdict) -> i64 {
    match verdict {
        Verdict::Pass => 0,
        Verdict::Warn => 1,
        Verdict::Fail => 2,
    }
}

/// Prometheus metrics registry for audit results.
pub struct MetricsRegistry {
    registry: Registry,

    // Outcome
    audits_total: IntCounter,
    verdict: IntGauge,
    all_pass: IntGauge,

    // Uniformity
    chi2_statistic: Gauge,
    chi2_p_value: Gauge,
    serial_correlation: Gauge,
    runs_deviation: Gauge,

    // Collisions and patterns
    duplicates: IntGauge,
    pattern_issues: IntGauge,
    collision_probability: Gauge,

    // Derived
    entropy_bits: Gauge,
    rejection_rate: Gauge,

    // Calibration
    calibration_rounds: IntGauge,
    calibration_rejection_rate: Gauge,
}

impl MetricsRegistry {
    /// Creates a registry with every audit metric registered.
    pub fn new() -> Result<Self, MetricsError> {
        let registry = Registry::new();

        let audits_total =
            IntCounter::new("paranoid_audit_runs_total", "Total audit runs recorded")?;
        let verdict = IntGauge::new(
            "paranoid_audit_verdict",
            "Overall verdict of the latest audit (0=pass, 1=warn, 2=fail)",
        )?;
        let all_pass = IntGauge::new(
            "paranoid_audit_all_pass",
            "Whether the core statistical checks all passed (1=yes)",
        )?;

        let chi2_statistic =
            Gauge::new("paranoid_audit_chi2_statistic", "Chi-squared statistic")?;
        let chi2_p_value = Gauge::new("paranoid_audit_chi2_p_value", "Chi-squared p-value")?;
        let serial_correlation = Gauge::new(
            "paranoid_audit_serial_correlation",
            "Lag-1 autocorrelation of the flattened batch",
        )?;
        let runs_deviation = Gauge::new(
            "paranoid_audit_runs_deviation",
            "Relative deviation of observed from expected class runs",
        )?;

        let duplicates = IntGauge::new(
            "paranoid_audit_duplicates",
            "Duplicate samples in the latest batch",
        )?;
        let pattern_issues = IntGauge::new(
            "paranoid_audit_pattern_issues",
            "Weak-pattern findings for the audited sample",
        )?;
        let collision_probability = Gauge::new(
            "paranoid_audit_collision_probability",
            "Birthday-bound collision probability for the batch size",
        )?;

        let entropy_bits = Gauge::new(
            "paranoid_audit_entropy_bits",
            "Entropy of one sample in bits",
        )?;
        let rejection_rate = Gauge::new(
            "paranoid_audit_rejection_rate",
            "Observed fraction of source bytes rejected",
        )?;

        let calibration_rounds = IntGauge::new(
            "paranoid_audit_calibration_rounds",
            "Rounds completed by the latest calibration",
        )?;
        let calibration_rejection_rate = Gauge::new(
            "paranoid_audit_calibration_rejection_rate",
            "Chi-squared rejection rate of the latest calibration",
        )?;

        registry.register(Box::new(audits_total.clone()))?;
        registry.register(Box::new(verdict.clone()))?;
        registry.register(Box::new(all_pass.clone()))?;
        registry.register(Box::new(chi2_statistic.clone()))?;
        registry.register(Box::new(chi2_p_value.clone()))?;
        registry.register(Box::new(serial_correlation.clone()))?;
        registry.register(Box::new(runs_deviation.clone()))?;
        registry.register(Box::new(duplicates.clone()))?;
        registry.register(Box::new(pattern_issues.clone()))?;
        registry.register(Box::new(collision_probability.clone()))?;
        registry.register(Box::new(entropy_bits.clone()))?;
        registry.register(Box::new(rejection_rate.clone()))?;
        registry.register(Box::new(calibration_rounds.clone()))?;
        registry.register(Box::new(calibration_rejection_rate.clone()))?;

        Ok(Self {
            registry,
            audits_total,
            verdict,
            all_pass,
            chi2_statistic,
            chi2_p_value,
            serial_correlation,
            runs_deviation,
            duplicates,
            pattern_issues,
            collision_probability,
            entropy_bits,
            rejection_rate,
            calibration_rounds,
            calibration_rejection_rate,
        })
    }

    /// Records one audit.
    pub fn update(&self, snapshot: &MetricsSnapshot) {
        self.audits_total.inc();
        self.verdict.set(snapshot.verdict);
        self.all_pass.set(i64::from(snapshot.all_pass));

        // Absent values keep their previous reading
        let gauges = [
            (&self.chi2_statistic, snapshot.chi2_statistic),
            (&self.chi2_p_value, snapshot.chi2_p_value),
            (&self.serial_correlation, snapshot.serial_correlation),
            (&self.runs_deviation, snapshot.runs_deviation),
            (&self.collision_probability, snapshot.collision_probability),
            (&self.entropy_bits, snapshot.entropy_bits),
            (&self.rejection_rate, snapshot.observed_rejection_rate),
        ];
        for (gauge, value) in gauges {
            if let Some(v) = value {
                gauge.set(v);
            }
        }

        self.duplicates.set(snapshot.duplicates as i64);
        self.pattern_issues.set(snapshot.pattern_issues as i64);
    }

    /// Records an audit report directly.
    pub fn record_report(&self, report: &AuditReport) {
        self.update(&MetricsSnapshot::from_report(report));
    }

    pub fn record_calibration(&self, summary: &CalibrationSummary) {
        self.calibration_rounds.set(summary.rounds as i64);
        self.calibration_rejection_rate.set(summary.rejection_rate);
    }

    /// Returns the underlying Prometheus registry.
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Encodes all metrics in Prometheus text format.
    pub fn encode(&self) -> Result<String, MetricsError> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer)?;
        Ok(String::from_utf8_lossy(&buffer).into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::run_audit;
    use crate::breach::OfflineLookup;
    use crate::config::FileConfig;
    use crate::sampler::Sampler;
    use crate::source::SeededByteSource;

    #[test]
    fn test_registry_creation() {
        let registry = MetricsRegistry::new();
        assert!(registry.is_ok());
    }

    #[test]
    fn test_metrics_update() {
        let registry = MetricsRegistry::new().unwrap();

        let snapshot = MetricsSnapshot {
            verdict: 2,
            all_pass: false,
            chi2_p_value: Some(0.5),
            duplicates: 3,
            entropy_bits: Some(128.0),
            ..Default::default()
        };

        registry.update(&snapshot);

        let output = registry.encode().unwrap();
        assert!(output.contains("paranoid_audit_verdict 2"));
        assert!(output.contains("paranoid_audit_all_pass 0"));
        assert!(output.contains("paranoid_audit_duplicates 3"));
        assert!(output.contains("paranoid_audit_entropy_bits 128"));
        assert!(output.contains("paranoid_audit_runs_total 1"));
    }

    #[test]
    fn test_snapshot_from_report() {
        let mut config = FileConfig::default();
        config.generator.batch_size = 100;
        let mut sampler = Sampler::new(SeededByteSource::from_u64(3));
        let run = run_audit(&config, &mut sampler, &OfflineLookup).unwrap();

        let snapshot = MetricsSnapshot::from_report(&run.report);
        assert_eq!(snapshot.duplicates, 0);
        assert!(snapshot.chi2_p_value.is_some());
        assert!((snapshot.entropy_bits.unwrap() - 32.0 * 94f64.log2()).abs() < 1e-9);

        let registry = MetricsRegistry::new().unwrap();
        registry.record_report(&run.report);
        registry.record_report(&run.report);
        assert!(registry
            .encode()
            .unwrap()
            .contains("paranoid_audit_runs_total 2"));
    }

    #[test]
    fn test_calibration_gauges() {
        let registry = MetricsRegistry::new().unwrap();
        registry.record_calibration(&CalibrationSummary {
            rounds: 40,
            rejections: 1,
            rejection_rate: 0.025,
            expected_rate: 0.01,
            interrupted: false,
            consistent: true,
        });
        let output = registry.encode().unwrap();
        assert!(output.contains("paranoid_audit_calibration_rounds 40"));
        assert!(output.contains("paranoid_audit_calibration_rejection_rate 0.025"));
    }
}
