//! Rejection-sampling generator.
//!
//! Raw bytes are mapped onto the alphabet with `byte mod N`, but only
//! bytes up to `floor(256 / N) * N - 1` are accepted. Every symbol is
//! then reached by exactly `floor(256 / N)` byte values, so each one is
//! drawn with probability exactly `1 / N`.

use super::alphabet::Alphabet;
use super::class::ClassCounts;
use super::sample::{Batch, Sample};
use crate::source::{ByteSource, OsByteSource, SourceError};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Upper bound on bytes requested from the source per round.
const MAX_ROUND_BYTES: usize = 512;

/// Whole-sample redraws allowed before constrained generation gives up.
pub const MAX_CONSTRAINED_ATTEMPTS: u32 = 100;

/// Errors raised while building alphabets or generating samples.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SamplerError {
    #[error("alphabet size {size} outside 2..=256")]
    InvalidAlphabet { size: usize },

    #[error("symbol {symbol:?} is not printable ASCII")]
    InvalidSymbol { symbol: char },

    #[error("random source failed: {0}")]
    SourceExhausted(#[source] SourceError),

    #[error("requirements cannot be met: {0}")]
    UnsatisfiableRequirements(String),

    #[error("no sample met the requirements after {attempts} attempts")]
    AttemptsExhausted { attempts: u32 },
}

/// Running byte accounting for one sampler.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RejectionStats {
    /// Bytes pulled from the source.
    pub bytes_drawn: u64,
    /// Bytes discarded by the rejection rule.
    pub bytes_rejected: u64,
}

impl RejectionStats {
    /// Fraction of drawn bytes that were rejected.
    pub fn observed_rate(&self) -> f64 {
        if self.bytes_drawn == 0 {
            return 0.0;
        }
        self.bytes_rejected as f64 / self.bytes_drawn as f64
    }
}

/// Minimum per-class counts for constrained generation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassRequirements {
    pub min_lowercase: usize,
    pub min_uppercase: usize,
    pub min_digits: usize,
    pub min_symbols: usize,
}

impl ClassRequirements {
    /// Returns true if nothing is required.
    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }

    /// Sum of all minimums.
    pub fn total(&self) -> usize {
        self.min_lowercase + self.min_uppercase + self.min_digits + self.min_symbols
    }

    /// Returns true if `counts` meets every minimum.
    pub fn is_met_by(&self, counts: &ClassCounts) -> bool {
        counts.lowercase >= self.min_lowercase
            && counts.uppercase >= self.min_uppercase
            && counts.digits >= self.min_digits
            && counts.symbols >= self.min_symbols
    }

    /// Checks that some sample of `length` over `alphabet` could comply.
    pub fn check_satisfiable(&self, length: usize, alphabet: &Alphabet) -> Result<(), SamplerError> {
        if self.total() > length {
            return Err(SamplerError::UnsatisfiableRequirements(format!(
                "{} required symbols exceed length {}",
                self.total(),
                length
            )));
        }

        let available = ClassCounts::tally(alphabet.symbols().iter().copied());
        let missing = [
            ("lowercase", self.min_lowercase, available.lowercase),
            ("uppercase", self.min_uppercase, available.uppercase),
            ("digits", self.min_digits, available.digits),
            ("symbols", self.min_symbols, available.symbols),
        ]
        .into_iter()
        .find(|&(_, required, present)| required > 0 && present == 0);

        match missing {
            Some((class, _, _)) => Err(SamplerError::UnsatisfiableRequirements(format!(
                "alphabet has no {}",
                class
            ))),
            None => Ok(()),
        }
    }
}

/// Uniform string generator over an injectable byte source.
///
/// Holds no state beyond its own source and counters, so independent
/// samplers can run on different threads without coordination.
pub struct Sampler<S> {
    source: S,
    stats: RejectionStats,
}

impl Sampler<OsByteSource> {
    /// Creates a sampler over the operating-system CSPRNG.
    pub fn from_os() -> Self {
        Self::new(OsByteSource::new())
    }
}

impl<S: ByteSource> Sampler<S> {
    /// Creates a sampler drawing from `source`.
    pub fn new(source: S) -> Self {
        Self {
            source,
            stats: RejectionStats::default(),
        }
    }

    /// Generates one sample of `length` symbols.
    ///
    /// Each round asks the source for at most as many bytes as symbols
    /// are still missing, so no byte is drawn that could not be used.
    /// A source failure aborts the sample; there is no fallback.
    pub fn generate(&mut self, length: usize, alphabet: &Alphabet) -> Result<Sample, SamplerError> {
        let mut text = String::with_capacity(length);
        let mut accepted = 0;
        let mut buf = [0u8; MAX_ROUND_BYTES];

        while accepted < length {
            let want = (length - accepted).min(MAX_ROUND_BYTES);
            let round = &mut buf[..want];

            if let Err(e) = self.source.next_bytes(round) {
                buf.fill(0);
                tracing::warn!(error = %e, accepted, length, "Byte source failed mid-sample");
                return Err(SamplerError::SourceExhausted(e));
            }

            let mut rejected = 0u64;
            for &byte in round.iter() {
                match alphabet.accept(byte) {
                    Some(symbol) => {
                        text.push(symbol);
                        accepted += 1;
                    }
                    None => rejected += 1,
                }
            }

            self.stats.bytes_drawn += want as u64;
            self.stats.bytes_rejected += rejected;

            tracing::trace!(requested = want, rejected, accepted, "Sampling round");
        }

        buf.fill(0);
        Ok(Sample::from(text))
    }

    /// Generates `count` independent samples.
    pub fn generate_many(
        &mut self,
        count: usize,
        length: usize,
        alphabet: &Alphabet,
    ) -> Result<Vec<Sample>, SamplerError> {
        (0..count).map(|_| self.generate(length, alphabet)).collect()
    }

    /// Generates a batch of `count` samples for auditing.
    pub fn generate_batch(
        &mut self,
        count: usize,
        length: usize,
        alphabet: &Alphabet,
    ) -> Result<Batch, SamplerError> {
        let batch = Batch::new(self.generate_many(count, length, alphabet)?);

        tracing::debug!(
            samples = batch.len(),
            length,
            alphabet_size = alphabet.size(),
            bytes_drawn = self.stats.bytes_drawn,
            "Generated batch"
        );

        Ok(batch)
    }

    /// Generates a sample meeting minimum class counts.
    ///
    /// Whole samples are redrawn until one complies, which keeps the
    /// result uniform over the compliant subset.
    pub fn generate_constrained(
        &mut self,
        length: usize,
        alphabet: &Alphabet,
        requirements: &ClassRequirements,
    ) -> Result<Sample, SamplerError> {
        requirements.check_satisfiable(length, alphabet)?;

        for attempt in 1..=MAX_CONSTRAINED_ATTEMPTS {
            let sample = self.generate(length, alphabet)?;
            if requirements.is_met_by(&sample.class_counts()) {
                tracing::debug!(attempt, "Constrained sample accepted");
                return Ok(sample);
            }
        }

        tracing::warn!(
            attempts = MAX_CONSTRAINED_ATTEMPTS,
            "Constrained generation exhausted its attempts"
        );
        Err(SamplerError::AttemptsExhausted {
            attempts: MAX_CONSTRAINED_ATTEMPTS,
        })
    }

    /// Byte accounting since creation.
    pub fn stats(&self) -> RejectionStats {
        self.stats
    }

    /// Returns the underlying source.
    pub fn into_inner(self) -> S {
        self.source
    }
}
