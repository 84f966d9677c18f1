//! Closed-form audit of the rejection rule for one alphabet.

use super::alphabet::Alphabet;
use serde::Serialize;

/// What rejection sampling costs and what it prevents.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RejectionAudit {
    pub alphabet_size: usize,
    /// Largest accepted byte.
    pub max_valid: u8,
    /// Byte values discarded: `255 - max_valid`.
    pub rejected_values: u16,
    /// `rejected_values / 256`.
    pub rejection_rate: f64,
    /// Byte values mapping onto each symbol: `floor(256 / N)`.
    pub values_per_symbol: usize,
    /// Symbols that plain `byte mod N` would favour: `256 mod N`.
    pub favoured_without_rejection: usize,
    /// Probability of a favoured symbol under plain `mod N`.
    pub favoured_probability: f64,
    /// Probability of any other symbol under plain `mod N`.
    pub unfavoured_probability: f64,
}

impl RejectionAudit {
    /// Derives the audit for `alphabet`.
    pub fn for_alphabet(alphabet: &Alphabet) -> Self {
        let n = alphabet.size();
        let max_valid = alphabet.max_valid();
        let rejected_values = 255 - u16::from(max_valid);
        let values_per_symbol = 256 / n;

        Self {
            alphabet_size: n,
            max_valid,
            rejected_values,
            rejection_rate: f64::from(rejected_values) / 256.0,
            values_per_symbol,
            favoured_without_rejection: 256 % n,
            favoured_probability: (values_per_symbol + 1) as f64 / 256.0,
            unfavoured_probability: values_per_symbol as f64 / 256.0,
        }
    }

    /// Counts how many byte values map onto each symbol index.
    ///
    /// Under a correct rule every entry equals `values_per_symbol`.
    pub fn preimage_counts(alphabet: &Alphabet) -> Vec<usize> {
        let mut counts = vec![0usize; alphabet.size()];
        for byte in 0..=255u8 {
            if byte <= alphabet.max_valid() {
                counts[byte as usize % alphabet.size()] += 1;
            }
        }
        counts
    }

    /// Returns true if plain `mod N` would have been biased.
    pub fn modulo_would_bias(&self) -> bool {
        self.favoured_without_rejection != 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sampler::CharsetPreset;

    #[test]
    fn test_printable_ascii_threshold() {
        let audit = RejectionAudit::for_alphabet(&Alphabet::preset(CharsetPreset::Printable));

        assert_eq!(audit.max_valid, 189);
        assert_eq!(audit.rejected_values, 66);
        assert_eq!(audit.values_per_symbol, 2);
        assert_eq!(audit.favoured_without_rejection, 66);
        assert!((audit.rejection_rate - 66.0 / 256.0).abs() < 1e-12);
        assert!((audit.favoured_probability - 3.0 / 256.0).abs() < 1e-12);
        assert!(audit.modulo_would_bias());
    }

    #[test]
    fn test_every_symbol_has_equal_preimage() {
        let alphabet = Alphabet::preset(CharsetPreset::Printable);
        let counts = RejectionAudit::preimage_counts(&alphabet);

        assert_eq!(counts.len(), 95);
        assert!(counts.iter().all(|&c| c == 2));
    }

    #[test]
    fn test_preimage_matches_accept() {
        let alphabet = Alphabet::preset(CharsetPreset::Full);
        let mut counts = vec![0usize; alphabet.size()];
        for byte in 0..=255u8 {
            if let Some(symbol) = alphabet.accept(byte) {
                let index = alphabet.symbols().iter().position(|&c| c == symbol).unwrap();
                counts[index] += 1;
            }
        }
        assert_eq!(counts, RejectionAudit::preimage_counts(&alphabet));
    }

    #[test]
    fn test_power_of_two_unbiased() {
        let audit = RejectionAudit::for_alphabet(&Alphabet::preset(CharsetPreset::Hex));
        assert_eq!(audit.rejected_values, 0);
        assert_eq!(audit.values_per_symbol, 16);
        assert!(!audit.modulo_would_bias());
    }
}
