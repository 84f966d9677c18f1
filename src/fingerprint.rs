//! Digest fingerprints of samples.
//!
//! A fingerprint identifies a sample in reports and logs without
//! revealing it.

use crate::sampler::Sample;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Supported digest algorithms.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "snake_case")]
pub enum HashAlgorithm {
    /// SHA-256 - widely deployed, the usual choice for published digests.
    #[default]
    Sha256,
    /// BLAKE3 - fast, same output size.
    Blake3,
}

/// 32-byte digest of a sample.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Fingerprint {
    algorithm: HashAlgorithm,
    digest: [u8; 32],
}

impl Fingerprint {
    /// Digests the UTF-8 bytes of `sample`.
    pub fn of(sample: &Sample, algorithm: HashAlgorithm) -> Self {
        Self::of_bytes(sample.as_str().as_bytes(), algorithm)
    }

    pub fn of_bytes(data: &[u8], algorithm: HashAlgorithm) -> Self {
        let digest = match algorithm {
            HashAlgorithm::Sha256 => Sha256::digest(data).into(),
            HashAlgorithm::Blake3 => *blake3::hash(data).as_bytes(),
        };
        Self { algorithm, digest }
    }

    #[inline]
    pub fn algorithm(&self) -> HashAlgorithm {
        self.algorithm
    }

    #[inline]
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.digest
    }

    /// Lowercase hex encoding.
    pub fn to_hex(&self) -> String {
        self.digest.iter().map(|b| format!("{:02x}", b)).collect()
    }
}

impl std::fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl std::fmt::Debug for Fingerprint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Fingerprint")
            .field("algorithm", &self.algorithm)
            .field("hex", &self.to_hex())
            .finish()
    }
}

impl Serialize for Fingerprint {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sha256_known_vector() {
        let fp = Fingerprint::of(&Sample::from("abc"), HashAlgorithm::Sha256);
        assert_eq!(
            fp.to_hex(),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_blake3_known_vector() {
        let fp = Fingerprint::of_bytes(b"", HashAlgorithm::Blake3);
        assert_eq!(
            fp.to_hex(),
            "af1349b9f5f9a1a6a0404dea36dcc9499bcb25c9adc112b7cc9a93cae41f3262"
        );
    }

    #[test]
    fn test_algorithms_differ() {
        let sample = Sample::from("k7#Qz!m2");
        let sha = Fingerprint::of(&sample, HashAlgorithm::Sha256);
        let b3 = Fingerprint::of(&sample, HashAlgorithm::Blake3);
        assert_ne!(sha.as_bytes(), b3.as_bytes());
        assert_eq!(sha.to_hex().len(), 64);
    }

    #[test]
    fn test_default_is_sha256() {
        assert_eq!(HashAlgorithm::default(), HashAlgorithm::Sha256);
    }

    #[test]
    fn test_fingerprints_dedupe_in_set() {
        let sample = Sample::from("k7#Qz!m2");
        let set: std::collections::HashSet<Fingerprint> = [
            Fingerprint::of(&sample, HashAlgorithm::Sha256),
            Fingerprint::of(&sample, HashAlgorithm::Sha256),
            Fingerprint::of(&sample, HashAlgorithm::Blake3),
        ]
        .into_iter()
        .collect();
        assert_eq!(set.len(), 2);
    }
}
