//! Random-byte source abstraction.
//!
//! The sampler never talks to an entropy facility directly. It pulls
//! bytes through the [`ByteSource`] trait, so the OS CSPRNG can be
//! swapped for a deterministic source in tests.

use rand_core::{OsRng, RngCore};
use thiserror::Error;

/// Errors that can occur while drawing random bytes.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SourceError {
    #[error("byte source exhausted: requested {requested} bytes, {available} available")]
    Exhausted { requested: usize, available: usize },
    #[error("entropy facility unavailable: {0}")]
    Unavailable(String),
}

/// Trait for random-byte sources.
///
/// Each byte handed out must be uniformly distributed over `0..=255`
/// and independent of every other byte. Implementations fill the whole
/// buffer or fail; a short read is never reported as success.
pub trait ByteSource {
    /// Fills `buf` with random bytes.
    fn next_bytes(&mut self, buf: &mut [u8]) -> Result<(), SourceError>;
}

impl<S: ByteSource + ?Sized> ByteSource for &mut S {
    fn next_bytes(&mut self, buf: &mut [u8]) -> Result<(), SourceError> {
        (**self).next_bytes(buf)
    }
}

impl<S: ByteSource + ?Sized> ByteSource for Box<S> {
    fn next_bytes(&mut self, buf: &mut [u8]) -> Result<(), SourceError> {
        (**self).next_bytes(buf)
    }
}

/// Operating-system CSPRNG (`getrandom` underneath).
#[derive(Debug, Default, Clone, Copy)]
pub struct OsByteSource;

impl OsByteSource {
    pub fn new() -> Self {
        Self
    }
}

impl ByteSource for OsByteSource {
    fn next_bytes(&mut self, buf: &mut [u8]) -> Result<(), SourceError> {
        OsRng
            .try_fill_bytes(buf)
            .map_err(|e| SourceError::Unavailable(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_os_source_fills_buffer() {
        let mut source = OsByteSource::new();
        let mut buf = [0u8; 64];
        source.next_bytes(&mut buf).unwrap();

        // 64 zero bytes from a working CSPRNG has probability 2^-512
        assert!(buf.iter().any(|&b| b != 0));
    }

    #[test]
    fn test_empty_request_succeeds() {
        let mut source = OsByteSource::new();
        assert!(source.next_bytes(&mut []).is_ok());
    }

    #[test]
    fn test_mut_ref_forwards() {
        fn fill<S: ByteSource>(mut source: S) -> Result<(), SourceError> {
            let mut buf = [0u8; 16];
            source.next_bytes(&mut buf)
        }

        let mut source = OsByteSource::new();
        assert!(fill(&mut source).is_ok());
        assert!(fill(Box::new(source) as Box<dyn ByteSource>).is_ok());
    }
}
