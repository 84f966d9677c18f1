//! End-to-end audit of one configuration.
//!
//! Each component returns its own typed result. The caller owns an
//! [`AuditCollector`] that gathers them as [`AuditRecord`]s and folds
//! their verdicts into an [`AuditReport`].

use crate::analysis::{
    BirthdayBound, ChiSquared, DuplicateReport, PatternReport, RunsTest, SerialCorrelation,
    UniformityReport, Verdict,
};
use crate::breach::{BreachCheck, BreachLookup, BreachStatus};
use crate::config::{ConfigError, FileConfig, GeneratorConfig};
use crate::fingerprint::Fingerprint;
use crate::proof::{ComplianceResult, EntropyProof, UniquenessConclusion, UniquenessProof};
use crate::sampler::{RejectionAudit, RejectionStats, Sample, Sampler, SamplerError};
use crate::source::ByteSource;
use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

/// Errors that abort an audit run.
#[derive(Debug, Error)]
pub enum AuditError {
    #[error(transparent)]
    Sampler(#[from] SamplerError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("failed to encode report: {0}")]
    Encode(String),
}

/// One component's result, tagged by the check that produced it.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "check", rename_all = "snake_case")]
pub enum AuditRecord {
    Rejection {
        audit: RejectionAudit,
        observed: RejectionStats,
    },
    ChiSquared(ChiSquared),
    SerialCorrelation(SerialCorrelation),
    Runs(RunsTest),
    Duplicates(DuplicateReport),
    Birthday {
        scale: Vec<BirthdayBound>,
    },
    Uniqueness(UniquenessProof),
    Pattern(PatternReport),
    Breach(BreachCheck),
    Entropy(EntropyProof),
    Compliance {
        results: Vec<ComplianceResult>,
    },
}

impl AuditRecord {
    /// Short name of the check.
    pub fn name(&self) -> &'static str {
        match self {
            AuditRecord::Rejection { .. } => "rejection",
            AuditRecord::ChiSquared(_) => "chi_squared",
            AuditRecord::SerialCorrelation(_) => "serial_correlation",
            AuditRecord::Runs(_) => "runs",
            AuditRecord::Duplicates(_) => "duplicates",
            AuditRecord::Birthday { .. } => "birthday",
            AuditRecord::Uniqueness(_) => "uniqueness",
            AuditRecord::Pattern(_) => "pattern",
            AuditRecord::Breach(_) => "breach",
            AuditRecord::Entropy(_) => "entropy",
            AuditRecord::Compliance { .. } => "compliance",
        }
    }

    /// Verdict contributed to the overall result. Purely informational
    /// records always pass; an unreachable breach service is degraded
    /// mode, not a failure.
    pub fn verdict(&self) -> Verdict {
        match self {
            AuditRecord::ChiSquared(r) => r.verdict,
            AuditRecord::SerialCorrelation(r) => r.verdict,
            AuditRecord::Runs(r) => r.verdict,
            AuditRecord::Duplicates(r) => r.verdict,
            AuditRecord::Pattern(r) => r.verdict(),
            AuditRecord::Uniqueness(p) => match p.conclusion {
                UniquenessConclusion::Concerning => Verdict::Warn,
                _ => Verdict::Pass,
            },
            AuditRecord::Breach(check) => match check.status {
                BreachStatus::Found => Verdict::Fail,
                _ => Verdict::Pass,
            },
            AuditRecord::Rejection { .. }
            | AuditRecord::Birthday { .. }
            | AuditRecord::Entropy(_)
            | AuditRecord::Compliance { .. } => Verdict::Pass,
        }
    }
}

impl std::fmt::Display for AuditRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {:<20}", self.verdict(), self.name())?;
        match self {
            AuditRecord::Rejection { audit, observed } => write!(
                f,
                "max_valid={} expected_rate={:.2}% observed_rate={:.2}%",
                audit.max_valid,
                audit.rejection_rate * 100.0,
                observed.observed_rate() * 100.0
            ),
            AuditRecord::ChiSquared(r) => {
                write!(
                    f,
                    "chi2={:.2} df={} p={:.4}",
                    r.statistic, r.degrees_of_freedom, r.p_value
                )?;
                if let (Some((rare, low)), Some((common, high))) =
                    (r.least_frequent.first(), r.most_frequent.last())
                {
                    write!(f, " least={:?}x{} most={:?}x{}", rare, low, common, high)?;
                }
                Ok(())
            }
            AuditRecord::SerialCorrelation(r) => {
                write!(f, "r={:.6} over {} symbols", r.coefficient, r.symbols)
            }
            AuditRecord::Runs(r) => write!(
                f,
                "runs={} expected={:.1} deviation={:.4}",
                r.runs, r.expected_runs, r.relative_deviation
            ),
            AuditRecord::Duplicates(r) => {
                write!(f, "{} duplicates in {} samples", r.duplicates.len(), r.batch_size)
            }
            AuditRecord::Birthday { scale } => {
                let parts: Vec<String> = scale
                    .iter()
                    .map(|b| {
                        format!(
                            "k={:.0e}: {:.2e}",
                            b.batch_size as f64, b.collision_probability
                        )
                    })
                    .collect();
                f.write_str(&parts.join(", "))
            }
            AuditRecord::Uniqueness(p) => write!(
                f,
                "P(collision)={:.2e} k50={:.2e} ({})",
                p.bound.collision_probability,
                p.bound.k_50(),
                p.conclusion
            ),
            AuditRecord::Pattern(r) => {
                if r.is_clean() {
                    write!(f, "clean, {} classes", r.classes.len())
                } else {
                    let issues: Vec<String> = r.issues.iter().map(ToString::to_string).collect();
                    f.write_str(&issues.join("; "))
                }
            }
            AuditRecord::Breach(check) => match &check.status {
                BreachStatus::Found => write!(f, "prefix {} found in corpus", check.query.prefix),
                BreachStatus::NotFound { range_size } => write!(
                    f,
                    "prefix {} not found ({} suffixes in range)",
                    check.query.prefix, range_size
                ),
                BreachStatus::Unavailable { reason } => {
                    write!(f, "prefix {} unchecked: {}", check.query.prefix, reason)
                }
            },
            AuditRecord::Entropy(p) => write!(
                f,
                "{:.2} bits ({:.4}/symbol), S={}",
                p.total_entropy_bits, p.bits_per_symbol, p.space
            ),
            AuditRecord::Compliance { results } => {
                let parts: Vec<String> = results
                    .iter()
                    .map(|r| {
                        let mark = if r.is_compliant() { "yes" } else { "no" };
                        format!("{} {}", r.framework, mark)
                    })
                    .collect();
                f.write_str(&parts.join(", "))
            }
        }
    }
}

/// Caller-owned accumulator of audit records.
#[derive(Debug, Default)]
pub struct AuditCollector {
    records: Vec<AuditRecord>,
}

impl AuditCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, record: AuditRecord) {
        let verdict = record.verdict();
        if verdict.is_fail() {
            tracing::warn!(check = record.name(), "Audit check failed");
        } else {
            tracing::debug!(check = record.name(), %verdict, "Audit check recorded");
        }
        self.records.push(record);
    }

    pub fn records(&self) -> &[AuditRecord] {
        &self.records
    }

    /// Worst verdict so far; `Pass` when empty.
    pub fn verdict(&self) -> Verdict {
        self.records
            .iter()
            .map(AuditRecord::verdict)
            .fold(Verdict::Pass, Verdict::worst)
    }

    /// Chi-squared and serial correlation pass, the batch has no
    /// duplicates and the sample has no pattern issues.
    pub fn all_pass(&self) -> bool {
        let mut seen = 0;
        for record in &self.records {
            match record {
                AuditRecord::ChiSquared(_)
                | AuditRecord::SerialCorrelation(_)
                | AuditRecord::Duplicates(_)
                | AuditRecord::Pattern(_) => {
                    if !record.verdict().is_pass() {
                        return false;
                    }
                    seen += 1;
                }
                _ => {}
            }
        }
        seen == 4
    }

    pub fn finish(
        self,
        fingerprint: Fingerprint,
        alphabet_size: usize,
        generator: &GeneratorConfig,
    ) -> AuditReport {
        let report = AuditReport {
            generated_at: Utc::now(),
            alphabet_size,
            sample_length: generator.length,
            batch_size: generator.batch_size,
            fingerprint,
            verdict: self.verdict(),
            all_pass: self.all_pass(),
            records: self.records,
        };

        tracing::info!(
            verdict = %report.verdict,
            all_pass = report.all_pass,
            records = report.records.len(),
            "Audit finished"
        );
        report
    }
}

/// Aggregated result of one audit run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AuditReport {
    pub generated_at: DateTime<Utc>,
    pub alphabet_size: usize,
    pub sample_length: usize,
    pub batch_size: usize,
    /// Fingerprint of the audited sample.
    pub fingerprint: Fingerprint,
    pub verdict: Verdict,
    pub all_pass: bool,
    pub records: Vec<AuditRecord>,
}

impl AuditReport {
    /// First record for the named check.
    pub fn record(&self, name: &str) -> Option<&AuditRecord> {
        self.records.iter().find(|r| r.name() == name)
    }

    pub fn to_toml(&self) -> Result<String, AuditError> {
        toml::to_string_pretty(self).map_err(|e| AuditError::Encode(e.to_string()))
    }
}

impl std::fmt::Display for AuditReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(
            f,
            "audit {} N={} L={} batch={}",
            self.generated_at.to_rfc3339(),
            self.alphabet_size,
            self.sample_length,
            self.batch_size
        )?;
        writeln!(f, "fingerprint {:?} {}", self.fingerprint.algorithm(), self.fingerprint)?;
        for record in &self.records {
            writeln!(f, "  {}", record)?;
        }
        write!(
            f,
            "verdict {} ({})",
            self.verdict,
            if self.all_pass { "all tests passed" } else { "some tests flagged" }
        )
    }
}

/// The audited sample together with its report.
#[derive(Debug, Clone)]
pub struct AuditRun {
    pub sample: Sample,
    pub report: AuditReport,
}

/// Generates a sample and a batch under `config` and runs every audit.
pub fn run_audit<S: ByteSource>(
    config: &FileConfig,
    sampler: &mut Sampler<S>,
    lookup: &dyn BreachLookup,
) -> Result<AuditRun, AuditError> {
    config.validate()?;
    let alphabet = config.generator.alphabet()?;
    let length = config.generator.length;
    let batch_size = config.generator.batch_size;

    tracing::info!(
        alphabet_size = alphabet.size(),
        length,
        batch_size,
        "Starting audit"
    );

    let sample = if config.requirements.is_empty() {
        sampler.generate(length, &alphabet)?
    } else {
        sampler.generate_constrained(length, &alphabet, &config.requirements)?
    };
    let batch = sampler.generate_batch(batch_size, length, &alphabet)?;

    let mut collector = AuditCollector::new();
    collector.push(AuditRecord::Rejection {
        audit: RejectionAudit::for_alphabet(&alphabet),
        observed: sampler.stats(),
    });

    let uniformity = UniformityReport::analyze(&batch, &alphabet, &config.thresholds);
    collector.push(AuditRecord::ChiSquared(uniformity.chi_squared));
    collector.push(AuditRecord::SerialCorrelation(uniformity.serial_correlation));
    collector.push(AuditRecord::Runs(uniformity.runs));

    collector.push(AuditRecord::Duplicates(DuplicateReport::scan(&batch)));

    let engine = &config.proof;
    let uniqueness = engine.uniqueness(alphabet.size(), length, batch_size as u64);
    collector.push(AuditRecord::Birthday {
        scale: BirthdayBound::at_scale(uniqueness.bound.space),
    });
    collector.push(AuditRecord::Uniqueness(uniqueness));

    collector.push(AuditRecord::Pattern(PatternReport::inspect(&sample)));
    collector.push(AuditRecord::Breach(BreachCheck::run(&sample, lookup)));

    let entropy = engine.entropy(alphabet.size(), length);
    let compliance = engine.compliance(&sample, &entropy);
    collector.push(AuditRecord::Entropy(entropy));
    collector.push(AuditRecord::Compliance {
        results: compliance,
    });

    let fingerprint = Fingerprint::of(&sample, config.generator.fingerprint);
    let report = collector.finish(fingerprint, alphabet.size(), &config.generator);

    Ok(AuditRun { sample, report })
}
