//! Heuristic weak-pattern detection for a single sample.
//!
//! These checks look for structure that humans and dictionary attacks
//! favour. A uniformly drawn sample trips them by chance now and then,
//! so a hit is a warning rather than proof of a broken generator.

use super::threshold::Verdict;
use crate::sampler::{ClassCounts, ClassSet, Sample};
use serde::Serialize;

/// Keyboard walks and common passwords, matched case-insensitively.
pub const WEAK_PATTERNS: [&str; 8] = [
    "qwerty", "asdfgh", "zxcvbn", "12345", "qazwsx", "password", "abc123", "!@#$%^",
];

/// Fewer classes than this is flagged.
pub const MIN_CLASS_DIVERSITY: usize = 3;

/// One finding of the pattern audit. Positions are symbol offsets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PatternIssue {
    WeakSubstring {
        pattern: &'static str,
        position: usize,
    },
    TripleRepeat {
        position: usize,
        symbol: char,
    },
    SequentialRun {
        position: usize,
        run: String,
    },
    LowClassDiversity {
        classes_used: usize,
    },
}

impl std::fmt::Display for PatternIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PatternIssue::WeakSubstring { pattern, position } => {
                write!(f, "weak pattern '{}' at position {}", pattern, position)
            }
            PatternIssue::TripleRepeat { position, symbol } => {
                write!(f, "triple repeat '{}' at position {}", symbol, position)
            }
            PatternIssue::SequentialRun { position, run } => {
                write!(f, "sequential run '{}' at position {}", run, position)
            }
            PatternIssue::LowClassDiversity { classes_used } => write!(
                f,
                "only {} character classes used (minimum {})",
                classes_used, MIN_CLASS_DIVERSITY
            ),
        }
    }
}

/// Findings for one sample.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PatternReport {
    pub issues: Vec<PatternIssue>,
    pub classes: ClassSet,
    pub composition: ClassCounts,
}

impl PatternReport {
    /// Runs every check against `sample`.
    pub fn inspect(sample: &Sample) -> Self {
        let symbols: Vec<char> = sample.symbols().collect();
        let composition = ClassCounts::tally(symbols.iter().copied());
        let classes = composition.classes_used();

        let mut issues = weak_substrings(&symbols);

        for (position, w) in symbols.windows(3).enumerate() {
            if w[0] == w[1] && w[1] == w[2] {
                issues.push(PatternIssue::TripleRepeat {
                    position,
                    symbol: w[0],
                });
            }
        }

        for (position, w) in symbols.windows(3).enumerate() {
            if is_successor(w[0], w[1]) && is_successor(w[1], w[2]) {
                issues.push(PatternIssue::SequentialRun {
                    position,
                    run: w.iter().collect(),
                });
            }
        }

        if classes.len() < MIN_CLASS_DIVERSITY {
            issues.push(PatternIssue::LowClassDiversity {
                classes_used: classes.len(),
            });
        }

        Self {
            issues,
            classes,
            composition,
        }
    }

    /// No issues were found. Class diversity is one of the checks, so a
    /// clean report also has at least [`MIN_CLASS_DIVERSITY`] classes.
    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }

    pub fn verdict(&self) -> Verdict {
        if self.is_clean() {
            Verdict::Pass
        } else {
            Verdict::Warn
        }
    }
}

fn weak_substrings(symbols: &[char]) -> Vec<PatternIssue> {
    let lowered: Vec<char> = symbols.iter().map(char::to_ascii_lowercase).collect();

    WEAK_PATTERNS
        .iter()
        .filter_map(|&pattern| {
            let needle: Vec<char> = pattern.chars().collect();
            lowered
                .windows(needle.len())
                .position(|w| w == needle.as_slice())
                .map(|position| PatternIssue::WeakSubstring { pattern, position })
        })
        .collect()
}

fn is_successor(a: char, b: char) -> bool {
    u32::from(a).checked_add(1) == Some(u32::from(b))
}
