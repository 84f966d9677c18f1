//! Statistical uniformity tests over a batch.
//!
//! Three independent tests, each a pure function of the batch:
//! a chi-squared goodness-of-fit test on symbol frequencies, lag-1
//! serial correlation of code points, and a runs test on character
//! classes. Passing them is necessary but not sufficient for good
//! randomness.

use super::threshold::{AuditThresholds, Verdict};
use crate::sampler::{Alphabet, Batch, CharClass, ClassCounts, FrequencyTable};
use serde::Serialize;

/// Symbols listed at each end of the frequency ranking.
pub const FREQUENCY_EXTREMES: usize = 3;

/// Pearson chi-squared test against the uniform distribution.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChiSquared {
    pub statistic: f64,
    pub degrees_of_freedom: usize,
    /// Wilson–Hilferty approximation of the upper-tail p-value.
    pub p_value: f64,
    pub expected_per_symbol: f64,
    pub symbols_counted: u64,
    /// Least frequent symbols, rarest first.
    pub least_frequent: Vec<(char, u64)>,
    /// Most frequent symbols, commonest last.
    pub most_frequent: Vec<(char, u64)>,
    pub verdict: Verdict,
}

impl ChiSquared {
    /// Runs the test on every symbol of `batch`.
    pub fn compute(batch: &Batch, alphabet: &Alphabet, thresholds: &AuditThresholds) -> Self {
        Self::from_table(&batch.frequency_table(alphabet), thresholds)
    }

    /// Runs the test on an existing frequency table.
    pub fn from_table(table: &FrequencyTable, thresholds: &AuditThresholds) -> Self {
        let expected = table.expected_per_symbol();
        let degrees_of_freedom = table.entries().len().saturating_sub(1).max(1);

        let statistic = if expected > 0.0 {
            table
                .entries()
                .iter()
                .map(|&(_, observed)| {
                    let diff = observed as f64 - expected;
                    diff * diff / expected
                })
                .sum()
        } else {
            0.0
        };

        let p_value = wilson_hilferty_p_value(statistic, degrees_of_freedom);
        let verdict = if p_value < thresholds.min_chi2_p_value {
            Verdict::Fail
        } else {
            Verdict::Pass
        };

        let (least_frequent, most_frequent) = table.extremes(FREQUENCY_EXTREMES);

        Self {
            statistic,
            degrees_of_freedom,
            p_value,
            expected_per_symbol: expected,
            symbols_counted: table.total(),
            least_frequent,
            most_frequent,
            verdict,
        }
    }
}

/// Upper-tail p-value of a chi-squared statistic.
///
/// Uses the Wilson–Hilferty cube-root transformation to a standard
/// normal variable.
pub fn wilson_hilferty_p_value(statistic: f64, degrees_of_freedom: usize) -> f64 {
    let df = degrees_of_freedom as f64;
    let spread = 2.0 / (9.0 * df);
    let z = ((statistic / df).cbrt() - (1.0 - spread)) / spread.sqrt();
    0.5 * erfc(z / std::f64::consts::SQRT_2)
}

/// Complementary error function.
///
/// Abramowitz & Stegun 7.1.26; absolute error below 1.5e-7.
pub fn erfc(x: f64) -> f64 {
    let t = 1.0 / (1.0 + 0.327_591_1 * x.abs());
    let poly = t
        * (0.254_829_592
            + t * (-0.284_496_736 + t * (1.421_413_741 + t * (-1.453_152_027 + t * 1.061_405_429))));
    let r = poly * (-x * x).exp();
    if x >= 0.0 {
        r
    } else {
        2.0 - r
    }
}

/// Lag-1 autocorrelation of the flattened code-point sequence.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SerialCorrelation {
    pub coefficient: f64,
    pub symbols: usize,
    pub verdict: Verdict,
}

impl SerialCorrelation {
    /// Runs the test over the whole batch as one continuous sequence.
    pub fn compute(batch: &Batch, thresholds: &AuditThresholds) -> Self {
        let values: Vec<f64> = batch
            .iter()
            .flat_map(|sample| sample.code_points())
            .map(f64::from)
            .collect();

        let coefficient = lag1_autocorrelation(&values);
        let verdict = if coefficient.abs() >= thresholds.max_serial_correlation {
            Verdict::Fail
        } else {
            Verdict::Pass
        };

        Self {
            coefficient,
            symbols: values.len(),
            verdict,
        }
    }
}

/// Computes lag-1 autocorrelation.
///
/// Returns 0 for fewer than two values or a constant sequence.
pub fn lag1_autocorrelation(data: &[f64]) -> f64 {
    if data.len() < 2 {
        return 0.0;
    }

    let n = data.len() as f64;
    let mean = data.iter().sum::<f64>() / n;

    let variance: f64 = data.iter().map(|&x| (x - mean).powi(2)).sum();
    if variance == 0.0 {
        return 0.0;
    }

    let covariance: f64 = data
        .windows(2)
        .map(|w| (w[0] - mean) * (w[1] - mean))
        .sum();

    covariance / variance
}

/// Runs test on character-class alternation.
///
/// The expected count generalizes the two-category Wald–Wolfowitz
/// formula to four classes by summing over class pairs. That is a
/// heuristic, so the test only ever warns.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunsTest {
    pub runs: u64,
    pub expected_runs: f64,
    pub symbols: usize,
    pub class_counts: ClassCounts,
    pub relative_deviation: f64,
    pub verdict: Verdict,
}

impl RunsTest {
    /// Counts maximal same-class runs across the flattened batch.
    pub fn compute(batch: &Batch, thresholds: &AuditThresholds) -> Self {
        let mut class_counts = ClassCounts::default();
        let mut runs = 0u64;
        let mut previous = None;

        for class in batch.symbols().map(CharClass::of) {
            class_counts.add(class);
            if previous != Some(class) {
                runs += 1;
                previous = Some(class);
            }
        }

        let symbols = class_counts.total();
        let expected_runs = expected_runs(&class_counts);
        let relative_deviation = if symbols == 0 {
            0.0
        } else {
            (runs as f64 - expected_runs).abs() / expected_runs.max(1.0)
        };

        let verdict = if relative_deviation >= thresholds.max_runs_deviation {
            Verdict::Warn
        } else {
            Verdict::Pass
        };

        Self {
            runs,
            expected_runs,
            symbols,
            class_counts,
            relative_deviation,
            verdict,
        }
    }
}

/// `1 + Σ_{i<j} 2·n_i·n_j / n` over class pairs; 0 for no symbols.
fn expected_runs(counts: &ClassCounts) -> f64 {
    let n = counts.total() as f64;
    if n == 0.0 {
        return 0.0;
    }

    let mut pair_sum = 0.0;
    for (i, &a) in CharClass::ALL.iter().enumerate() {
        for &b in &CharClass::ALL[i + 1..] {
            pair_sum += 2.0 * counts.get(a) as f64 * counts.get(b) as f64 / n;
        }
    }
    1.0 + pair_sum
}

/// All three uniformity tests for one batch.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UniformityReport {
    pub chi_squared: ChiSquared,
    pub serial_correlation: SerialCorrelation,
    pub runs: RunsTest,
}

impl UniformityReport {
    /// Runs every test on `batch`.
    pub fn analyze(batch: &Batch, alphabet: &Alphabet, thresholds: &AuditThresholds) -> Self {
        let report = Self {
            chi_squared: ChiSquared::compute(batch, alphabet, thresholds),
            serial_correlation: SerialCorrelation::compute(batch, thresholds),
            runs: RunsTest::compute(batch, thresholds),
        };

        tracing::trace!(
            chi2 = report.chi_squared.statistic,
            p_value = report.chi_squared.p_value,
            serial = report.serial_correlation.coefficient,
            runs = report.runs.runs,
            "Uniformity tests complete"
        );

        report
    }

    /// Most severe verdict of the three tests.
    pub fn verdict(&self) -> Verdict {
        self.chi_squared
            .verdict
            .worst(self.serial_correlation.verdict)
            .worst(self.runs.verdict)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sampler::{CharsetPreset, Sample, Sampler};
    use crate::source::SeededByteSource;

    fn batch(items: &[&str]) -> Batch {
        items.iter().map(|&s| Sample::from(s)).collect()
    }

    #[test]
    fn test_erfc_reference_values() {
        assert!((erfc(0.0) - 1.0).abs() < 1e-6);
        assert!((erfc(1.0) - 0.157_299_207).abs() < 1e-6);
        assert!((erfc(-1.0) - 1.842_700_793).abs() < 1e-6);
        assert!(erfc(6.0) < 1e-9);
    }

    #[test]
    fn test_chi_squared_hand_computed() {
        let alphabet = Alphabet::new("ab".chars()).unwrap();
        let result = ChiSquared::compute(&batch(&["aaab"]), &alphabet, &AuditThresholds::default());

        // expected 2 each: (3-2)²/2 + (1-2)²/2
        assert!((result.statistic - 1.0).abs() < 1e-12);
        assert_eq!(result.degrees_of_freedom, 1);
        // exact upper tail for χ²=1, df=1 is 0.3173
        assert!((result.p_value - 0.3173).abs() < 0.01);
        assert_eq!(result.verdict, Verdict::Pass);
    }

    #[test]
    fn test_wilson_hilferty_tracks_table() {
        // χ²(0.99 quantile, df=94) ≈ 128.8
        let p = wilson_hilferty_p_value(128.8, 94);
        assert!((p - 0.01).abs() < 0.002, "p = {}", p);
    }

    #[test]
    fn test_large_uniform_batch_passes() {
        let alphabet = Alphabet::preset(CharsetPreset::Printable);
        let batch = Sampler::new(SeededByteSource::from_u64(2024))
            .generate_batch(2000, 32, &alphabet)
            .unwrap();
        let report = UniformityReport::analyze(&batch, &alphabet, &AuditThresholds::default());

        assert!(report.chi_squared.p_value > 0.01, "p = {}", report.chi_squared.p_value);
        assert_eq!(report.chi_squared.symbols_counted, 64_000);
        assert_eq!(report.chi_squared.degrees_of_freedom, 94);
        assert_eq!(report.chi_squared.verdict, Verdict::Pass);
        assert!(report.serial_correlation.coefficient.abs() < 0.05);
        assert_eq!(report.runs.verdict, Verdict::Pass);
    }

    #[test]
    fn test_skewed_batch_fails() {
        let alphabet = Alphabet::preset(CharsetPreset::Digits);
        let skewed: Vec<&str> = (0..50).flat_map(|_| ["0123456789", "0000000000"]).collect();
        let result = ChiSquared::compute(&batch(&skewed), &alphabet, &AuditThresholds::default());

        assert_eq!(result.verdict, Verdict::Fail);
        assert!(result.p_value < 1e-6);
        // '0' appears 50 + 500 times, every other digit 50
        assert_eq!(result.most_frequent.last(), Some(&('0', 550)));
        assert_eq!(result.least_frequent.len(), FREQUENCY_EXTREMES);
        assert!(result.least_frequent.iter().all(|&(_, n)| n == 50));
    }

    #[test]
    fn test_empty_batch_is_neutral() {
        let alphabet = Alphabet::preset(CharsetPreset::Hex);
        let report = UniformityReport::analyze(&Batch::default(), &alphabet, &AuditThresholds::default());

        assert_eq!(report.chi_squared.statistic, 0.0);
        assert!(report.chi_squared.p_value.is_finite());
        assert_eq!(report.serial_correlation.coefficient, 0.0);
        assert_eq!(report.runs.runs, 0);
        assert_eq!(report.runs.expected_runs, 0.0);
        assert_eq!(report.verdict(), Verdict::Pass);
    }

    #[test]
    fn test_single_symbol_batch() {
        let alphabet = Alphabet::new("01".chars()).unwrap();
        let report = UniformityReport::analyze(&batch(&["1"]), &alphabet, &AuditThresholds::default());

        assert!(report.chi_squared.statistic.is_finite());
        assert_eq!(report.serial_correlation.coefficient, 0.0);
        assert_eq!(report.runs.runs, 1);
        assert_eq!(report.runs.expected_runs, 1.0);
    }

    #[test]
    fn test_serial_correlation_exact() {
        // codes 97..=100, mean 98.5: num 1.25, den 5
        let r = lag1_autocorrelation(&[97.0, 98.0, 99.0, 100.0]);
        assert!((r - 0.25).abs() < 1e-12);
    }

    #[test]
    fn test_serial_constant_is_zero() {
        assert_eq!(lag1_autocorrelation(&[5.0; 100]), 0.0);
        assert_eq!(lag1_autocorrelation(&[5.0]), 0.0);
        assert_eq!(lag1_autocorrelation(&[]), 0.0);
    }

    #[test]
    fn test_serial_spans_sample_boundaries() {
        // Each sample alone is constant; only the flattened run alternates
        let thresholds = AuditThresholds::default();
        let result = SerialCorrelation::compute(&batch(&["a", "b", "a", "b"]), &thresholds);
        assert!(result.coefficient < -0.5);
        assert_eq!(result.verdict, Verdict::Fail);
    }

    #[test]
    fn test_runs_all_classes_once() {
        let result = RunsTest::compute(&batch(&["aA1!"]), &AuditThresholds::default());
        assert_eq!(result.runs, 4);
        assert!((result.expected_runs - 4.0).abs() < 1e-12);
        assert_eq!(result.verdict, Verdict::Pass);
    }

    #[test]
    fn test_runs_single_class() {
        let result = RunsTest::compute(&batch(&["abcd", "efgh"]), &AuditThresholds::default());
        assert_eq!(result.runs, 1);
        assert_eq!(result.expected_runs, 1.0);
        assert_eq!(result.relative_deviation, 0.0);
    }

    #[test]
    fn test_runs_clustered_classes_warn() {
        let result = RunsTest::compute(&batch(&["aaaaAAAA"]), &AuditThresholds::default());
        assert_eq!(result.runs, 2);
        // 1 + 2·4·4/8
        assert!((result.expected_runs - 5.0).abs() < 1e-12);
        assert_eq!(result.verdict, Verdict::Warn);
    }
}
