//! Syllable boundaries and stress marks over an unbroken word.
//!
//! Indices are character positions in the word. A split at `i` is a
//! boundary drawn after the character at `i`.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Delimiter used by canonical syllable strings such as `en-vi-ron-ment`.
pub const SYLLABLE_DELIMITER: char = '-';

/// Split indices implied by a canonical syllable string.
///
/// The segments are expected to spell the word; check with
/// [`syllables_match`] before trusting the result. Boundaries that would fall
/// on or past the word's last character are dropped.
pub fn compute_canonical_splits(word: &str, syllable_spec: &str) -> BTreeSet<usize> {
    let last_char = word.chars().count().saturating_sub(1);
    let segments: Vec<&str> = syllable_spec.split(SYLLABLE_DELIMITER).collect();
    let mut splits = BTreeSet::new();
    let mut running_total = 0usize;

    for segment in segments.iter().take(segments.len().saturating_sub(1)) {
        running_total += segment.chars().count();
        if running_total > 0 && running_total - 1 < last_char {
            splits.insert(running_total - 1);
        }
    }

    splits
}

/// Whether the syllable string spells the word once delimiters are removed.
pub fn syllables_match(word: &str, syllable_spec: &str) -> bool {
    let joined: String = syllable_spec
        .chars()
        .filter(|c| *c != SYLLABLE_DELIMITER)
        .collect();
    joined.to_lowercase() == word.to_lowercase()
}

/// How a character should be drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tone {
    /// Even number of boundaries before this character.
    Even,
    /// Odd number of boundaries before this character.
    Odd,
    /// Marked as stressed; wins over the alternation.
    Stressed,
}

/// One character of a rendered word.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarkedChar {
    pub ch: char,
    pub tone: Tone,
    /// A boundary follows this character.
    pub split_after: bool,
}

/// User-declared syllable boundaries and stressed characters for one word.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyllableMarks {
    pub split_points: BTreeSet<usize>,
    pub stressed_indices: BTreeSet<usize>,
}

impl SyllableMarks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks holding the canonical splits of `syllable_spec`, no stress.
    pub fn canonical(word: &str, syllable_spec: &str) -> Self {
        Self {
            split_points: compute_canonical_splits(word, syllable_spec),
            stressed_indices: BTreeSet::new(),
        }
    }

    pub fn toggle_split(&self, index: usize) -> Self {
        Self {
            split_points: toggled(&self.split_points, index),
            stressed_indices: self.stressed_indices.clone(),
        }
    }

    pub fn toggle_stress(&self, index: usize) -> Self {
        Self {
            split_points: self.split_points.clone(),
            stressed_indices: toggled(&self.stressed_indices, index),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.split_points.is_empty() && self.stressed_indices.is_empty()
    }

    /// Tone for the character at `index`.
    pub fn char_tone(&self, index: usize) -> Tone {
        if self.stressed_indices.contains(&index) {
            return Tone::Stressed;
        }
        if self.split_points.range(..index).count() % 2 == 0 {
            Tone::Even
        } else {
            Tone::Odd
        }
    }

    /// Per-character rendering of `word` under these marks.
    pub fn render(&self, word: &str) -> Vec<MarkedChar> {
        word.chars()
            .enumerate()
            .map(|(index, ch)| MarkedChar {
                ch,
                tone: self.char_tone(index),
                split_after: self.split_points.contains(&index),
            })
            .collect()
    }
}

fn toggled(set: &BTreeSet<usize>, index: usize) -> BTreeSet<usize> {
    let mut next = set.clone();
    if !next.remove(&index) {
        next.insert(index);
    }
    next
}
