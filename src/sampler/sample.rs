//! Generated samples and batches.

use super::alphabet::Alphabet;
use super::class::ClassCounts;
use serde::Serialize;
use std::collections::HashMap;

/// A fixed-length string of symbols.
///
/// `Debug` never prints the value; use `Display` or [`Sample::as_str`]
/// when the value is meant to be shown.
#[derive(Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Sample {
    text: String,
}

impl Sample {
    /// Returns the sample as a string slice.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Number of symbols (L).
    pub fn len(&self) -> usize {
        self.text.chars().count()
    }

    /// Returns true if the sample has no symbols.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Iterates over the symbols.
    pub fn symbols(&self) -> std::str::Chars<'_> {
        self.text.chars()
    }

    /// Numeric code point of each symbol.
    pub fn code_points(&self) -> impl Iterator<Item = u32> + '_ {
        self.text.chars().map(u32::from)
    }

    /// Per-class composition.
    pub fn class_counts(&self) -> ClassCounts {
        ClassCounts::tally(self.text.chars())
    }

    /// Returns true if every symbol belongs to `alphabet`.
    pub fn is_drawn_from(&self, alphabet: &Alphabet) -> bool {
        self.text.chars().all(|c| alphabet.contains(c))
    }
}

impl From<String> for Sample {
    fn from(text: String) -> Self {
        Self { text }
    }
}

impl From<&str> for Sample {
    fn from(text: &str) -> Self {
        Self {
            text: text.to_string(),
        }
    }
}

impl std::fmt::Display for Sample {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.text)
    }
}

impl std::fmt::Debug for Sample {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Sample")
            .field("len", &self.len())
            .finish_non_exhaustive()
    }
}

/// An ordered collection of samples audited together.
#[derive(Debug, Clone, Default)]
pub struct Batch {
    samples: Vec<Sample>,
}

impl Batch {
    /// Wraps already generated samples.
    pub fn new(samples: Vec<Sample>) -> Self {
        Self { samples }
    }

    /// Number of samples (M).
    #[inline]
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Returns true if the batch holds no samples.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Samples in generation order.
    #[inline]
    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    /// Iterates over the samples.
    pub fn iter(&self) -> std::slice::Iter<'_, Sample> {
        self.samples.iter()
    }

    /// All symbols, batch order then sample order.
    pub fn symbols(&self) -> impl Iterator<Item = char> + '_ {
        self.samples.iter().flat_map(Sample::symbols)
    }

    /// Total number of symbols across the batch (M × L).
    pub fn total_symbols(&self) -> usize {
        self.samples.iter().map(Sample::len).sum()
    }

    /// Counts every symbol of the batch against `alphabet`.
    pub fn frequency_table(&self, alphabet: &Alphabet) -> FrequencyTable {
        FrequencyTable::count(self, alphabet)
    }
}

impl FromIterator<Sample> for Batch {
    fn from_iter<I: IntoIterator<Item = Sample>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a Batch {
    type Item = &'a Sample;
    type IntoIter = std::slice::Iter<'a, Sample>;

    fn into_iter(self) -> Self::IntoIter {
        self.samples.iter()
    }
}

/// Occurrence count per alphabet symbol.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FrequencyTable {
    /// `(symbol, count)` in alphabet order.
    entries: Vec<(char, u64)>,
    /// Symbols seen that are not in the alphabet.
    foreign: u64,
    /// Every symbol counted, foreign ones included.
    total: u64,
}

impl FrequencyTable {
    fn count(batch: &Batch, alphabet: &Alphabet) -> Self {
        let index: HashMap<char, usize> = alphabet
            .symbols()
            .iter()
            .enumerate()
            .map(|(i, &c)| (c, i))
            .collect();

        let mut entries: Vec<(char, u64)> = alphabet.symbols().iter().map(|&c| (c, 0)).collect();
        let mut foreign = 0;
        let mut total = 0;

        for symbol in batch.symbols() {
            total += 1;
            match index.get(&symbol) {
                Some(&i) => entries[i].1 += 1,
                None => foreign += 1,
            }
        }

        Self {
            entries,
            foreign,
            total,
        }
    }

    /// `(symbol, count)` pairs in alphabet order.
    pub fn entries(&self) -> &[(char, u64)] {
        &self.entries
    }

    /// Total symbols counted.
    pub fn total(&self) -> u64 {
        self.total
    }

    /// Symbols that fell outside the alphabet.
    pub fn foreign(&self) -> u64 {
        self.foreign
    }

    /// Expected count per symbol under the uniform hypothesis.
    pub fn expected_per_symbol(&self) -> f64 {
        if self.entries.is_empty() {
            return 0.0;
        }
        self.total as f64 / self.entries.len() as f64
    }

    /// The `n` least and `n` most frequent symbols, each ascending by count.
    pub fn extremes(&self, n: usize) -> (Vec<(char, u64)>, Vec<(char, u64)>) {
        let mut sorted = self.entries.clone();
        sorted.sort_by_key(|&(_, count)| count);
        let n = n.min(sorted.len());
        let least = sorted[..n].to_vec();
        let most = sorted[sorted.len() - n..].to_vec();
        (least, most)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sampler::CharsetPreset;

    fn batch(items: &[&str]) -> Batch {
        items.iter().map(|&s| Sample::from(s)).collect()
    }

    #[test]
    fn test_sample_len_counts_symbols() {
        let sample = Sample::from("añb");
        assert_eq!(sample.len(), 3);
        assert_eq!(sample.code_points().collect::<Vec<_>>(), vec![97, 241, 98]);
    }

    #[test]
    fn test_debug_hides_value() {
        let sample = Sample::from("hunter2");
        let debug = format!("{:?}", sample);
        assert!(!debug.contains("hunter2"));
        assert_eq!(sample.to_string(), "hunter2");
    }

    #[test]
    fn test_batch_flattens_in_order() {
        let batch = batch(&["ab", "cd"]);
        assert_eq!(batch.symbols().collect::<String>(), "abcd");
        assert_eq!(batch.total_symbols(), 4);
    }

    #[test]
    fn test_frequency_table() {
        let alphabet = Alphabet::new("abc".chars()).unwrap();
        let table = batch(&["aab", "ax!"]).frequency_table(&alphabet);

        assert_eq!(table.entries(), &[('a', 3), ('b', 1), ('c', 0)]);
        assert_eq!(table.foreign(), 2);
        assert_eq!(table.total(), 6);
        assert!((table.expected_per_symbol() - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_extremes() {
        let alphabet = Alphabet::new("abcd".chars()).unwrap();
        let table = batch(&["aaaabbbcc"]).frequency_table(&alphabet);
        let (least, most) = table.extremes(2);

        assert_eq!(least, vec![('d', 0), ('c', 2)]);
        assert_eq!(most, vec![('b', 3), ('a', 4)]);
    }

    #[test]
    fn test_drawn_from() {
        let alphabet = Alphabet::preset(CharsetPreset::Hex);
        assert!(Sample::from("deadbeef").is_drawn_from(&alphabet));
        assert!(!Sample::from("DEADBEEF").is_drawn_from(&alphabet));
    }
}
