//! k-anonymity breach lookup.
//!
//! Only the first five hex characters of a sample's SHA-1 digest leave
//! the process; the range service answers with every known suffix
//! under that prefix and the comparison happens locally. No network
//! client ships here: lookups go through the [`BreachLookup`] trait,
//! with an offline implementation that always reports the service as
//! unavailable.

use crate::sampler::Sample;
use serde::Serialize;
use sha1::{Digest, Sha1};
use std::collections::{HashMap, HashSet};

/// Range endpoint of the Pwned Passwords API.
pub const RANGE_ENDPOINT: &str = "https://api.pwnedpasswords.com/range/";

/// Hex characters sent to the range service.
pub const PREFIX_LEN: usize = 5;

/// The split digest of one sample.
#[derive(Clone, PartialEq, Eq, Serialize)]
pub struct BreachQuery {
    pub sha1_hex: String,
    pub prefix: String,
    pub suffix: String,
}

impl BreachQuery {
    /// Hashes `sample` and splits the uppercase hex digest 5/35.
    pub fn for_sample(sample: &Sample) -> Self {
        let sha1_hex: String = Sha1::digest(sample.as_str().as_bytes())
            .iter()
            .map(|b| format!("{:02X}", b))
            .collect();
        let (prefix, suffix) = sha1_hex.split_at(PREFIX_LEN);

        Self {
            prefix: prefix.to_owned(),
            suffix: suffix.to_owned(),
            sha1_hex,
        }
    }

    pub fn range_url(&self) -> String {
        format!("{}{}", RANGE_ENDPOINT, self.prefix)
    }
}

impl std::fmt::Debug for BreachQuery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BreachQuery")
            .field("prefix", &self.prefix)
            .finish_non_exhaustive()
    }
}

/// Answer from a range lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupOutcome {
    /// Uppercase suffixes known under the prefix.
    Matches(HashSet<String>),
    /// The service could not be consulted.
    Unavailable { reason: String },
}

/// Prefix-range lookup capability.
pub trait BreachLookup {
    fn hash_prefix_lookup(&self, prefix: &str) -> LookupOutcome;
}

/// Lookup used when no network client is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct OfflineLookup;

impl BreachLookup for OfflineLookup {
    fn hash_prefix_lookup(&self, _prefix: &str) -> LookupOutcome {
        LookupOutcome::Unavailable {
            reason: "offline: no network lookup configured".to_owned(),
        }
    }
}

/// In-memory prefix table, keyed by the 5-character prefix.
#[derive(Debug, Clone, Default)]
pub struct StaticLookup {
    ranges: HashMap<String, HashSet<String>>,
}

impl StaticLookup {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the digest of `sample` as breached.
    pub fn insert_sample(&mut self, sample: &Sample) {
        let query = BreachQuery::for_sample(sample);
        self.insert_hash(&query.sha1_hex);
    }

    /// Records a full 40-character SHA-1 hex digest as breached.
    pub fn insert_hash(&mut self, sha1_hex: &str) {
        let upper = sha1_hex.to_ascii_uppercase();
        if upper.len() != 40 || !upper.is_char_boundary(PREFIX_LEN) {
            tracing::debug!(len = upper.len(), "Ignoring malformed SHA-1 digest");
            return;
        }
        let (prefix, suffix) = upper.split_at(PREFIX_LEN);
        self.ranges
            .entry(prefix.to_owned())
            .or_default()
            .insert(suffix.to_owned());
    }
}

impl BreachLookup for StaticLookup {
    fn hash_prefix_lookup(&self, prefix: &str) -> LookupOutcome {
        LookupOutcome::Matches(
            self.ranges
                .get(&prefix.to_ascii_uppercase())
                .cloned()
                .unwrap_or_default(),
        )
    }
}

/// Result of checking one sample.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum BreachStatus {
    NotFound { range_size: usize },
    Found,
    Unavailable { reason: String },
}

/// Query plus outcome, as recorded in an audit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BreachCheck {
    pub query: BreachQuery,
    pub range_url: String,
    pub status: BreachStatus,
}

impl BreachCheck {
    /// Builds the query for `sample` and consults `lookup`.
    pub fn run(sample: &Sample, lookup: &dyn BreachLookup) -> Self {
        let query = BreachQuery::for_sample(sample);
        let status = match lookup.hash_prefix_lookup(&query.prefix) {
            LookupOutcome::Matches(suffixes) if suffixes.contains(&query.suffix) => {
                tracing::warn!(prefix = %query.prefix, "Sample found in breach corpus");
                BreachStatus::Found
            }
            LookupOutcome::Matches(suffixes) => BreachStatus::NotFound {
                range_size: suffixes.len(),
            },
            LookupOutcome::Unavailable { reason } => {
                tracing::warn!(%reason, "Breach lookup unavailable, continuing degraded");
                BreachStatus::Unavailable { reason }
            }
        };

        Self {
            range_url: query.range_url(),
            query,
            status,
        }
    }
}
