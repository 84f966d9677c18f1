//! Unbiased string generation.
//!
//! Turns a stream of random bytes into strings whose symbols are
//! uniformly and independently distributed over an alphabet, using
//! rejection sampling to remove modulo bias.

mod alphabet;
mod class;
mod generator;
mod rejection;
mod sample;

pub use alphabet::{Alphabet, CharsetPreset, MAX_ALPHABET_SIZE, MIN_ALPHABET_SIZE};
pub use class::{CharClass, ClassCounts, ClassSet};
pub use generator::{
    ClassRequirements, RejectionStats, Sampler, SamplerError, MAX_CONSTRAINED_ATTEMPTS,
};
pub use rejection::RejectionAudit;
pub use sample::{Batch, FrequencyTable, Sample};
