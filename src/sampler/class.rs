//! Character classes.
//!
//! Classification is ASCII-based: anything that is not an ASCII
//! letter or digit counts as a symbol.

use serde::Serialize;
use std::collections::BTreeSet;

/// One of the four symbol classes used by the runs test, the pattern
/// audit and the composition requirements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CharClass {
    /// `A-Z`.
    Uppercase,
    /// `a-z`.
    Lowercase,
    /// `0-9`.
    Digit,
    /// Everything else.
    Symbol,
}

/// Set of classes observed in some text.
pub type ClassSet = BTreeSet<CharClass>;

impl CharClass {
    /// All classes in a fixed order.
    pub const ALL: [CharClass; 4] = [
        CharClass::Uppercase,
        CharClass::Lowercase,
        CharClass::Digit,
        CharClass::Symbol,
    ];

    /// Classifies a single symbol.
    pub fn of(c: char) -> Self {
        if c.is_ascii_uppercase() {
            CharClass::Uppercase
        } else if c.is_ascii_lowercase() {
            CharClass::Lowercase
        } else if c.is_ascii_digit() {
            CharClass::Digit
        } else {
            CharClass::Symbol
        }
    }

    /// Human-readable name.
    pub fn name(self) -> &'static str {
        match self {
            CharClass::Uppercase => "uppercase",
            CharClass::Lowercase => "lowercase",
            CharClass::Digit => "digits",
            CharClass::Symbol => "symbols",
        }
    }
}

impl std::fmt::Display for CharClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Per-class symbol counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ClassCounts {
    pub uppercase: usize,
    pub lowercase: usize,
    pub digits: usize,
    pub symbols: usize,
}

impl ClassCounts {
    /// Counts the classes of every symbol in `symbols`.
    pub fn tally(symbols: impl IntoIterator<Item = char>) -> Self {
        let mut counts = Self::default();
        for c in symbols {
            counts.add(CharClass::of(c));
        }
        counts
    }

    /// Records one symbol of `class`.
    pub fn add(&mut self, class: CharClass) {
        *self.slot(class) += 1;
    }

    /// Returns the count for `class`.
    pub fn get(&self, class: CharClass) -> usize {
        match class {
            CharClass::Uppercase => self.uppercase,
            CharClass::Lowercase => self.lowercase,
            CharClass::Digit => self.digits,
            CharClass::Symbol => self.symbols,
        }
    }

    /// Total symbols counted.
    pub fn total(&self) -> usize {
        self.uppercase + self.lowercase + self.digits + self.symbols
    }

    /// Classes with a non-zero count.
    pub fn classes_used(&self) -> ClassSet {
        CharClass::ALL
            .into_iter()
            .filter(|&class| self.get(class) > 0)
            .collect()
    }

    fn slot(&mut self, class: CharClass) -> &mut usize {
        match class {
            CharClass::Uppercase => &mut self.uppercase,
            CharClass::Lowercase => &mut self.lowercase,
            CharClass::Digit => &mut self.digits,
            CharClass::Symbol => &mut self.symbols,
        }
    }
}
