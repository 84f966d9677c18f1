//! Random-byte sources.
//!
//! This module provides the injectable capability the sampler draws
//! bytes from: the operating-system CSPRNG for real use, plus seeded
//! and scripted sources for reproducible runs and tests.

mod byte_source;
mod deterministic;

pub use byte_source::{ByteSource, OsByteSource, SourceError};
pub use deterministic::{ScriptedByteSource, SeededByteSource};
