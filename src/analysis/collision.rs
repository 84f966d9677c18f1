//! Collision detection and birthday-bound probabilities.
//!
//! The duplicate scan looks at an actual batch. The birthday bound is
//! independent of any batch: it characterizes the space itself.

use super::threshold::Verdict;
use crate::sampler::{Batch, Sample};
use crate::space::SearchSpace;
use serde::Serialize;
use std::collections::HashMap;
use std::f64::consts::LN_2;

/// Batch sizes below this use the exact product form.
pub const EXACT_PRODUCT_LIMIT: u64 = 1000;

/// Batch sizes for the scale table.
pub const SCALE_BATCH_SIZES: [u64; 4] = [
    1_000_000,
    1_000_000_000,
    1_000_000_000_000,
    1_000_000_000_000_000,
];

/// A sample whose value already appeared earlier in the batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Duplicate {
    /// Position of the repeat.
    pub index: usize,
    /// Position of the first occurrence.
    pub first_index: usize,
    pub sample: Sample,
}

/// Result of scanning a batch for exact repeats.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DuplicateReport {
    pub batch_size: usize,
    pub duplicates: Vec<Duplicate>,
    pub verdict: Verdict,
}

impl DuplicateReport {
    /// Scans `batch` in order; every repeat of an earlier value is reported.
    pub fn scan(batch: &Batch) -> Self {
        let mut first_seen: HashMap<&str, usize> = HashMap::with_capacity(batch.len());
        let mut duplicates = Vec::new();

        for (index, sample) in batch.iter().enumerate() {
            match first_seen.get(sample.as_str()) {
                Some(&first_index) => duplicates.push(Duplicate {
                    index,
                    first_index,
                    sample: sample.clone(),
                }),
                None => {
                    first_seen.insert(sample.as_str(), index);
                }
            }
        }

        let verdict = if duplicates.is_empty() {
            Verdict::Pass
        } else {
            tracing::warn!(
                duplicates = duplicates.len(),
                batch_size = batch.len(),
                "Duplicate samples in batch"
            );
            Verdict::Fail
        };

        Self {
            batch_size: batch.len(),
            duplicates,
            verdict,
        }
    }
}

/// How a collision probability was computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BoundMethod {
    /// `1 - Π (1 - i/S)`, accumulated in log space.
    ExactProduct,
    /// `1 - exp(-k² / 2S)`.
    Approximation,
}

/// Birthday-bound figures for a space and a batch size.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BirthdayBound {
    pub space: SearchSpace,
    pub batch_size: u64,
    /// Probability that at least two of `batch_size` draws coincide.
    pub collision_probability: f64,
    pub method: BoundMethod,
    /// `ln k₅₀`, where `k₅₀ = sqrt(2·S·ln 2)`.
    pub ln_k_50: f64,
    /// `ln k_ppb`, where `k_ppb = sqrt(2·S·1e-9)`.
    pub ln_k_ppb: f64,
}

impl BirthdayBound {
    /// Computes the bound for `batch_size` draws from `N^L`.
    pub fn compute(alphabet_size: usize, sample_length: usize, batch_size: u64) -> Self {
        Self::for_space(SearchSpace::new(alphabet_size, sample_length), batch_size)
    }

    /// Computes the bound for `batch_size` draws from `space`.
    pub fn for_space(space: SearchSpace, batch_size: u64) -> Self {
        let (collision_probability, method) = collision_probability(&space, batch_size);

        Self {
            space,
            batch_size,
            collision_probability,
            method,
            ln_k_50: batch_for_probability(&space, LN_2),
            ln_k_ppb: batch_for_probability(&space, 1e-9),
        }
    }

    /// Batch size for a 50% collision chance.
    pub fn k_50(&self) -> f64 {
        self.ln_k_50.exp()
    }

    /// Batch size for a one-in-a-billion collision chance.
    pub fn k_ppb(&self) -> f64 {
        self.ln_k_ppb.exp()
    }

    /// Evaluates the bound at each of [`SCALE_BATCH_SIZES`].
    pub fn at_scale(space: SearchSpace) -> Vec<BirthdayBound> {
        SCALE_BATCH_SIZES
            .iter()
            .map(|&k| Self::for_space(space, k))
            .collect()
    }
}

/// Probability of at least one collision among `k` uniform draws from `space`.
///
/// `1 - exp(x)` is evaluated as `-expm1(x)` so that probabilities far
/// below machine epsilon survive.
pub fn collision_probability(space: &SearchSpace, k: u64) -> (f64, BoundMethod) {
    if k < EXACT_PRODUCT_LIMIT {
        let mut ln_no_collision = 0.0;
        for i in 1..k {
            let ratio = ((i as f64).ln() - space.ln).exp();
            if ratio >= 1.0 {
                return (1.0, BoundMethod::ExactProduct);
            }
            ln_no_collision += (-ratio).ln_1p();
        }
        (-ln_no_collision.exp_m1(), BoundMethod::ExactProduct)
    } else {
        // k² / 2S
        let exponent = (2.0 * (k as f64).ln() - LN_2 - space.ln).exp();
        (-(-exponent).exp_m1(), BoundMethod::Approximation)
    }
}

/// `ln sqrt(2·S·c)`: batch size at which `k²/2S` reaches `c`.
fn batch_for_probability(space: &SearchSpace, c: f64) -> f64 {
    0.5 * (LN_2 + space.ln + c.ln())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn batch(items: &[&str]) -> Batch {
        items.iter().map(|&s| Sample::from(s)).collect()
    }

    #[test]
    fn test_unique_batch_passes() {
        let report = DuplicateReport::scan(&batch(&["a1", "b2", "c3"]));
        assert!(report.duplicates.is_empty());
        assert_eq!(report.verdict, Verdict::Pass);
    }

    #[test]
    fn test_single_duplicate_reported_at_repeat() {
        let items = ["s0", "s1", "s2", "dup", "s4", "s5", "s6", "dup", "s8"];
        let report = DuplicateReport::scan(&batch(&items));

        assert_eq!(report.duplicates.len(), 1);
        let duplicate = &report.duplicates[0];
        assert_eq!(duplicate.index, 7);
        assert_eq!(duplicate.first_index, 3);
        assert_eq!(duplicate.sample.as_str(), "dup");
        assert_eq!(report.verdict, Verdict::Fail);
    }

    #[test]
    fn test_every_repeat_reported() {
        let report = DuplicateReport::scan(&batch(&["x", "x", "x", "y", "y"]));
        let indices: Vec<_> = report.duplicates.iter().map(|d| d.index).collect();
        assert_eq!(indices, vec![1, 2, 4]);
        assert!(report.duplicates.iter().take(2).all(|d| d.first_index == 0));
    }

    #[test]
    fn test_empty_batch() {
        let report = DuplicateReport::scan(&Batch::default());
        assert_eq!(report.batch_size, 0);
        assert_eq!(report.verdict, Verdict::Pass);
    }

    #[test]
    fn test_exact_product_matches_enumeration() {
        // S = 10, k = 5: count all 10^5 tuples with a repeated value
        let mut colliding = 0u32;
        for n in 0..100_000u32 {
            let digits = [n % 10, n / 10 % 10, n / 100 % 10, n / 1000 % 10, n / 10000];
            let mut seen = [false; 10];
            if digits.iter().any(|&d| std::mem::replace(&mut seen[d as usize], true)) {
                colliding += 1;
            }
        }
        let brute_force = f64::from(colliding) / 100_000.0;

        let bound = BirthdayBound::compute(10, 1, 5);
        assert_eq!(bound.method, BoundMethod::ExactProduct);
        assert!((bound.collision_probability - brute_force).abs() < 1e-9);
        assert!((bound.collision_probability - 0.6976).abs() < 1e-9);
    }

    #[test]
    fn test_more_draws_than_space() {
        let bound = BirthdayBound::compute(2, 2, 10);
        assert_eq!(bound.collision_probability, 1.0);
    }

    #[test]
    fn test_trivial_batches() {
        assert_eq!(BirthdayBound::compute(95, 32, 0).collision_probability, 0.0);
        assert_eq!(BirthdayBound::compute(95, 32, 1).collision_probability, 0.0);
    }

    #[test]
    fn test_k50_gives_half() {
        let bound = BirthdayBound::compute(95, 32, 1);
        // k₅₀² / 2S, entirely in log space
        let exponent = (2.0 * bound.ln_k_50 - LN_2 - bound.space.ln).exp();
        let p = -(-exponent).exp_m1();
        assert!((p - 0.5).abs() / 0.5 < 1e-6);
    }

    #[test]
    fn test_kppb_gives_one_in_a_billion() {
        let bound = BirthdayBound::compute(62, 20, 1);
        let exponent = (2.0 * bound.ln_k_ppb - LN_2 - bound.space.ln).exp();
        let p = -(-exponent).exp_m1();
        assert!((p - 1e-9).abs() / 1e-9 < 1e-6);
    }

    #[test]
    fn test_tiny_probability_not_rounded_to_zero() {
        let bound = BirthdayBound::compute(94, 32, 500);
        assert_eq!(bound.method, BoundMethod::ExactProduct);
        assert!(bound.collision_probability > 0.0);
        assert!(bound.collision_probability < 1e-50);
    }

    #[test]
    fn test_exact_and_approximation_agree_near_limit() {
        let space = SearchSpace::new(16, 8);
        let (exact, _) = collision_probability(&space, 999);
        let (approx, method) = collision_probability(&space, 1000);
        assert_eq!(method, BoundMethod::Approximation);
        assert!((exact - approx).abs() / approx < 0.01);
    }

    #[test]
    fn test_scale_table_monotone() {
        let table = BirthdayBound::at_scale(SearchSpace::new(94, 32));
        assert_eq!(table.len(), 4);
        assert!(table
            .windows(2)
            .all(|w| w[0].collision_probability <= w[1].collision_probability));
    }
}
