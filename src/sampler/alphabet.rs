//! Symbol alphabets.

use super::class::{ClassCounts, ClassSet};
use super::SamplerError;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};

/// Smallest usable alphabet.
pub const MIN_ALPHABET_SIZE: usize = 2;

/// Largest usable alphabet: one byte has 256 states.
pub const MAX_ALPHABET_SIZE: usize = 256;

const PUNCTUATION: &str = "!\"#$%&'()*+,-./:;<=>?@[\\]^_`{|}~";
const LETTERS: &str = "abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ";
const DIGITS: &str = "0123456789";

/// Built-in character sets.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum CharsetPreset {
    /// ASCII letters, digits and punctuation (94 symbols).
    #[default]
    Full,
    /// Every printable ASCII character including space (95 symbols).
    Printable,
    /// ASCII letters and digits (62 symbols).
    Alphanumeric,
    /// Lowercase hexadecimal digits (16 symbols).
    Hex,
    /// Decimal digits (10 symbols).
    Digits,
}

impl CharsetPreset {
    /// Returns the preset's symbols in canonical order.
    pub fn symbols(self) -> String {
        match self {
            CharsetPreset::Full => [LETTERS, DIGITS, PUNCTUATION].concat(),
            CharsetPreset::Printable => (b' '..=b'~').map(char::from).collect(),
            CharsetPreset::Alphanumeric => [LETTERS, DIGITS].concat(),
            CharsetPreset::Hex => "0123456789abcdef".to_string(),
            CharsetPreset::Digits => DIGITS.to_string(),
        }
    }
}

/// An ordered, deduplicated set of symbols.
///
/// Immutable once built. The size is always within
/// [`MIN_ALPHABET_SIZE`]`..=`[`MAX_ALPHABET_SIZE`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alphabet {
    symbols: Vec<char>,
    /// Largest byte value accepted by rejection sampling.
    max_valid: u8,
}

impl Alphabet {
    /// Builds an alphabet, keeping the first occurrence of each symbol.
    pub fn new(symbols: impl IntoIterator<Item = char>) -> Result<Self, SamplerError> {
        let mut seen = HashSet::new();
        let symbols: Vec<char> = symbols.into_iter().filter(|c| seen.insert(*c)).collect();
        Self::from_unique(symbols)
    }

    /// Builds an alphabet from a preset.
    pub fn preset(preset: CharsetPreset) -> Self {
        let symbols: Vec<char> = preset.symbols().chars().collect();
        let max_valid = rejection_threshold(symbols.len());
        Self { symbols, max_valid }
    }

    /// Normalizes user-supplied text into an alphabet.
    ///
    /// Only printable ASCII (`' '..='~'`) is accepted. The result is
    /// sorted by code point with duplicates removed.
    pub fn printable(text: &str) -> Result<Self, SamplerError> {
        let mut unique = BTreeSet::new();
        for symbol in text.chars() {
            if !(' '..='~').contains(&symbol) {
                return Err(SamplerError::InvalidSymbol { symbol });
            }
            unique.insert(symbol);
        }
        Self::from_unique(unique.into_iter().collect())
    }

    fn from_unique(symbols: Vec<char>) -> Result<Self, SamplerError> {
        let size = symbols.len();
        if !(MIN_ALPHABET_SIZE..=MAX_ALPHABET_SIZE).contains(&size) {
            return Err(SamplerError::InvalidAlphabet { size });
        }
        Ok(Self {
            max_valid: rejection_threshold(size),
            symbols,
        })
    }

    /// Number of symbols (N).
    #[inline]
    pub fn size(&self) -> usize {
        self.symbols.len()
    }

    /// Symbols in order.
    #[inline]
    pub fn symbols(&self) -> &[char] {
        &self.symbols
    }

    /// Returns true if `symbol` belongs to the alphabet.
    pub fn contains(&self, symbol: char) -> bool {
        self.symbols.contains(&symbol)
    }

    /// Largest accepted byte: `floor(256 / N) * N - 1`.
    #[inline]
    pub fn max_valid(&self) -> u8 {
        self.max_valid
    }

    /// Maps a raw byte to a symbol, or `None` if the byte is rejected.
    #[inline]
    pub fn accept(&self, byte: u8) -> Option<char> {
        (byte <= self.max_valid).then(|| self.symbols[byte as usize % self.symbols.len()])
    }

    /// Classes present among the alphabet's symbols.
    pub fn classes(&self) -> ClassSet {
        ClassCounts::tally(self.symbols.iter().copied()).classes_used()
    }
}

impl std::fmt::Display for Alphabet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.symbols.iter().try_for_each(|c| write!(f, "{}", c))
    }
}

fn rejection_threshold(size: usize) -> u8 {
    ((256 / size) * size - 1) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sampler::CharClass;

    #[test]
    fn test_preset_sizes() {
        assert_eq!(Alphabet::preset(CharsetPreset::Full).size(), 94);
        assert_eq!(Alphabet::preset(CharsetPreset::Printable).size(), 95);
        assert_eq!(Alphabet::preset(CharsetPreset::Alphanumeric).size(), 62);
        assert_eq!(Alphabet::preset(CharsetPreset::Hex).size(), 16);
        assert_eq!(Alphabet::preset(CharsetPreset::Digits).size(), 10);
    }

    #[test]
    fn test_dedup_keeps_first_occurrence() {
        let alphabet = Alphabet::new("banana".chars()).unwrap();
        assert_eq!(alphabet.symbols(), &['b', 'a', 'n']);
    }

    #[test]
    fn test_too_small_rejected() {
        assert!(matches!(
            Alphabet::new("aaaa".chars()),
            Err(SamplerError::InvalidAlphabet { size: 1 })
        ));
        assert!(matches!(
            Alphabet::new(std::iter::empty()),
            Err(SamplerError::InvalidAlphabet { size: 0 })
        ));
    }

    #[test]
    fn test_too_large_rejected() {
        let symbols = (0u32..300).filter_map(|i| char::from_u32(0x4E00 + i));
        assert!(matches!(
            Alphabet::new(symbols),
            Err(SamplerError::InvalidAlphabet { size: 300 })
        ));
    }

    #[test]
    fn test_full_byte_range_allowed() {
        let symbols = (0u32..256).filter_map(|i| char::from_u32(0x100 + i));
        let alphabet = Alphabet::new(symbols).unwrap();
        assert_eq!(alphabet.size(), 256);
        assert_eq!(alphabet.max_valid(), 255);
        assert!(alphabet.accept(255).is_some());
    }

    #[test]
    fn test_printable_normalizes() {
        let alphabet = Alphabet::printable("zyxzyA1").unwrap();
        assert_eq!(alphabet.to_string(), "1Axyz");
    }

    #[test]
    fn test_printable_rejects_control() {
        assert!(matches!(
            Alphabet::printable("ab\tc"),
            Err(SamplerError::InvalidSymbol { symbol: '\t' })
        ));
        assert!(matches!(
            Alphabet::printable("abé"),
            Err(SamplerError::InvalidSymbol { symbol: 'é' })
        ));
    }

    #[test]
    fn test_threshold_for_95() {
        let alphabet = Alphabet::preset(CharsetPreset::Printable);
        assert_eq!(alphabet.max_valid(), 189);
        assert!(alphabet.accept(189).is_some());
        assert!(alphabet.accept(190).is_none());
    }

    #[test]
    fn test_power_of_two_rejects_nothing() {
        let alphabet = Alphabet::preset(CharsetPreset::Hex);
        assert_eq!(alphabet.max_valid(), 255);
        assert!((0..=255u8).all(|b| alphabet.accept(b).is_some()));
    }

    #[test]
    fn test_classes() {
        let classes = Alphabet::preset(CharsetPreset::Alphanumeric).classes();
        assert_eq!(classes.len(), 3);
        assert!(!classes.contains(&CharClass::Symbol));
    }
}
