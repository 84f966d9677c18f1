//! Deterministic byte sources.
//!
//! Neither of these is suitable for generating secrets. They exist so
//! audits can be reproduced and so the sampler's mapping can be checked
//! against exact byte sequences.

use super::{ByteSource, SourceError};
use rand_chacha::ChaCha20Rng;
use rand_core::{RngCore, SeedableRng};

/// ChaCha20 stream from a fixed seed.
///
/// Output is statistically indistinguishable from random, but fully
/// determined by the seed, which makes whole audit runs reproducible.
pub struct SeededByteSource {
    inner: ChaCha20Rng,
    bytes_emitted: u64,
}

impl SeededByteSource {
    /// Creates a source from a 32-byte seed.
    pub fn from_seed(seed: [u8; 32]) -> Self {
        Self {
            inner: ChaCha20Rng::from_seed(seed),
            bytes_emitted: 0,
        }
    }

    /// Creates a source from a `u64` seed.
    pub fn from_u64(seed: u64) -> Self {
        Self {
            inner: ChaCha20Rng::seed_from_u64(seed),
            bytes_emitted: 0,
        }
    }

    /// Returns the number of bytes handed out so far.
    pub fn bytes_emitted(&self) -> u64 {
        self.bytes_emitted
    }
}

impl ByteSource for SeededByteSource {
    fn next_bytes(&mut self, buf: &mut [u8]) -> Result<(), SourceError> {
        self.inner
            .try_fill_bytes(buf)
            .map_err(|e| SourceError::Unavailable(e.to_string()))?;
        self.bytes_emitted += buf.len() as u64;
        Ok(())
    }
}

impl std::fmt::Debug for SeededByteSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SeededByteSource")
            .field("bytes_emitted", &self.bytes_emitted)
            .finish_non_exhaustive()
    }
}

/// Replays a fixed byte script, then fails.
///
/// A request larger than what is left fails with
/// [`SourceError::Exhausted`] and consumes nothing.
#[derive(Debug, Clone, Default)]
pub struct ScriptedByteSource {
    script: Vec<u8>,
    position: usize,
}

impl ScriptedByteSource {
    pub fn new(script: impl Into<Vec<u8>>) -> Self {
        Self {
            script: script.into(),
            position: 0,
        }
    }

    /// Returns the number of unread bytes.
    pub fn remaining(&self) -> usize {
        self.script.len() - self.position
    }
}

impl ByteSource for ScriptedByteSource {
    fn next_bytes(&mut self, buf: &mut [u8]) -> Result<(), SourceError> {
        if buf.len() > self.remaining() {
            return Err(SourceError::Exhausted {
                requested: buf.len(),
                available: self.remaining(),
            });
        }

        let end = self.position + buf.len();
        buf.copy_from_slice(&self.script[self.position..end]);
        self.position = end;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_seed_same_stream() {
        let mut a = SeededByteSource::from_u64(7);
        let mut b = SeededByteSource::from_u64(7);

        let mut out_a = [0u8; 48];
        let mut out_b = [0u8; 48];
        a.next_bytes(&mut out_a).unwrap();
        b.next_bytes(&mut out_b).unwrap();

        assert_eq!(out_a, out_b);
        assert_eq!(a.bytes_emitted(), 48);
    }

    #[test]
    fn test_different_seed_different_stream() {
        let mut a = SeededByteSource::from_u64(1);
        let mut b = SeededByteSource::from_u64(2);

        let mut out_a = [0u8; 32];
        let mut out_b = [0u8; 32];
        a.next_bytes(&mut out_a).unwrap();
        b.next_bytes(&mut out_b).unwrap();

        assert_ne!(out_a, out_b);
    }

    #[test]
    fn test_script_replays_in_order() {
        let mut source = ScriptedByteSource::new(vec![1, 2, 3, 4, 5]);

        let mut buf = [0u8; 3];
        source.next_bytes(&mut buf).unwrap();
        assert_eq!(buf, [1, 2, 3]);
        assert_eq!(source.remaining(), 2);
    }

    #[test]
    fn test_script_exhaustion_consumes_nothing() {
        let mut source = ScriptedByteSource::new(vec![9, 9]);

        let mut buf = [0u8; 3];
        assert_eq!(
            source.next_bytes(&mut buf),
            Err(SourceError::Exhausted {
                requested: 3,
                available: 2
            })
        );
        assert_eq!(source.remaining(), 2);

        let mut small = [0u8; 2];
        source.next_bytes(&mut small).unwrap();
        assert_eq!(small, [9, 9]);
    }
}
