//! Paranoid Audit Library
//!
//! Generates random strings over an arbitrary alphabet without modulo
//! bias and subjects them to statistical and mathematical checks:
//! chi-squared uniformity, serial correlation, a class runs test,
//! duplicate detection, weak-pattern heuristics, an entropy derivation
//! and the birthday-bound collision probability.
//!
//! # Architecture
//!
//! ```text
//! source → sampler → { analysis::uniformity, analysis::collision,
//!                      analysis::pattern, proof }
//!                              ↓
//!                    audit (collector + report) → metrics
//! ```
//!
//! The four consumers of the sampler's output are independent of each
//! other.
//!
//! # Design Principles
//!
//! - **No silent fallback**: a failing byte source aborts generation
//! - **Log domain**: search-space sizes are carried as `ln S`
//! - **Verdicts are data**: audits return results, only sampling fails
//!   with an error
//! - **No cryptographic claims**: statistical tests catch gross failures,
//!   they do not prove randomness
//!
//! # Example
//!
//! ```no_run
//! use paranoid_audit::{
//!     analysis::{AuditThresholds, UniformityReport},
//!     sampler::{Alphabet, CharsetPreset, Sampler},
//! };
//!
//! let alphabet = Alphabet::preset(CharsetPreset::Full);
//! let mut sampler = Sampler::from_os();
//!
//! let password = sampler.generate(32, &alphabet).unwrap();
//! let batch = sampler.generate_batch(500, 32, &alphabet).unwrap();
//!
//! let report = UniformityReport::analyze(&batch, &alphabet, &AuditThresholds::default());
//! println!("{} chars, chi-squared p = {:.4}", password.len(), report.chi_squared.p_value);
//! ```

#![warn(rust_2018_idioms)]
#![deny(unsafe_code)]

pub mod analysis;
pub mod audit;
pub mod breach;
pub mod config;
pub mod fingerprint;
pub mod metrics;
pub mod proof;
pub mod sampler;
pub mod source;
pub mod space;

// Re-export commonly used types at crate root
pub use analysis::{AuditThresholds, Calibration, UniformityReport, Verdict};
pub use audit::{run_audit, AuditCollector, AuditError, AuditRecord, AuditReport, AuditRun};
pub use breach::{BreachLookup, OfflineLookup, StaticLookup};
pub use config::{ConfigError, FileConfig};
pub use fingerprint::{Fingerprint, HashAlgorithm};
pub use proof::{EntropyProof, ProofEngine, UniquenessProof};
pub use sampler::{Alphabet, Batch, CharsetPreset, Sample, Sampler, SamplerError};
pub use source::{ByteSource, OsByteSource, SeededByteSource, SourceError};
pub use space::SearchSpace;

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
