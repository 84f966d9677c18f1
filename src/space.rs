//! Search-space magnitudes in log domain.
//!
//! `S = N^L` leaves the `f64` range for realistic parameters (95^256
//! is about 10^506), so it is stored as `ln S` and converted to a
//! plain number only for display.

use serde::Serialize;
use std::f64::consts::{LN_10, LN_2};

/// The set of all strings of a given length over an alphabet.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SearchSpace {
    pub alphabet_size: usize,
    pub sample_length: usize,
    /// `ln S = L · ln N`.
    pub ln: f64,
}

impl SearchSpace {
    /// Space of all `sample_length`-symbol strings over `alphabet_size` symbols.
    pub fn new(alphabet_size: usize, sample_length: usize) -> Self {
        Self {
            alphabet_size,
            sample_length,
            ln: sample_length as f64 * (alphabet_size as f64).ln(),
        }
    }

    /// `log10 S`.
    pub fn log10(&self) -> f64 {
        self.ln / LN_10
    }

    /// `log2 S`, which is also the entropy in bits of a uniform draw.
    pub fn log2(&self) -> f64 {
        self.ln / LN_2
    }

    /// `S` as a float; infinite when it does not fit.
    pub fn value(&self) -> f64 {
        self.ln.exp()
    }

    /// `ln(S / 2)`: expected brute-force attempts.
    pub fn ln_half(&self) -> f64 {
        self.ln - LN_2
    }

    /// Display form of `S` as `(mantissa, exponent)` with `1 <= mantissa < 10`.
    pub fn scientific(&self) -> (f64, i64) {
        scientific_from_log10(self.log10())
    }
}

impl std::fmt::Display for SearchSpace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&format_log10(self.log10()))
    }
}

/// Formats `10^log10` as `m.mme±x` without leaving log space.
pub fn format_log10(log10: f64) -> String {
    let (mantissa, mut exponent) = scientific_from_log10(log10);
    let mut mantissa = (mantissa * 100.0).round() / 100.0;
    if mantissa >= 10.0 {
        mantissa /= 10.0;
        exponent += 1;
    }
    format!("{:.2}e{:+}", mantissa, exponent)
}

/// Splits `10^log10` into mantissa and exponent.
pub fn scientific_from_log10(log10: f64) -> (f64, i64) {
    if !log10.is_finite() {
        return (0.0, 0);
    }
    // Absorb rounding so exact powers of ten do not land one decade low
    let exponent = (log10 + 1e-12).floor();
    let mantissa = 10f64.powf(log10 - exponent);
    (mantissa, exponent as i64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_small_space_exact() {
        let space = SearchSpace::new(10, 3);
        assert!((space.value() - 1000.0).abs() < 1e-9);
        assert!((space.log10() - 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_huge_space_stays_finite_in_log() {
        let space = SearchSpace::new(95, 256);
        assert!(space.value().is_infinite());
        assert!((space.log10() - 256.0 * 95f64.log10()).abs() < 1e-9);

        let (mantissa, exponent) = space.scientific();
        assert_eq!(exponent, 506);
        assert!((1.0..10.0).contains(&mantissa));
    }

    #[test]
    fn test_log2_is_entropy() {
        let space = SearchSpace::new(62, 16);
        assert!((space.log2() - 16.0 * 62f64.log2()).abs() < 1e-9);
    }

    #[test]
    fn test_display() {
        assert_eq!(SearchSpace::new(10, 4).to_string(), "1.00e+4");
        assert_eq!(format_log10(-9.0), "1.00e-9");
        assert_eq!(format_log10(2.5f64.log10() + 300.0), "2.50e+300");
    }

    #[test]
    fn test_display_carries_rounded_mantissa() {
        assert_eq!(format_log10(3.99999), "1.00e+4");
        assert_eq!(format_log10(-0.000001), "1.00e+0");
        assert_eq!(format_log10(9.994f64.log10()), "9.99e+0");
    }
}
