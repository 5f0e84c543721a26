//! Answer matching for typed drill steps.
//!
//! Two text transforms feed the graders:
//! - [`normalize`] deletes punctuation, used for equality checks.
//! - [`tokenize`] turns punctuation into spaces, used for positional diffing
//!   so that `dog,cat` stays two tokens.

use serde::{Deserialize, Serialize};

/// Punctuation removed by [`normalize`] and split on by [`tokenize`].
const PUNCTUATION: &[char] = &[
    '.', ',', '/', '#', '!', '$', '%', '^', '&', '*', ';', ':', '{', '}', '=', '-', '_', '`',
    '~', '(', ')',
];

/// Fallback message when no positional divergence explains the mismatch.
const GENERIC_MISMATCH: &str = "The sentence is not quite right.";

/// Lower-case, strip punctuation, trim.
pub fn normalize(s: &str) -> String {
    s.to_lowercase()
        .chars()
        .filter(|c| !PUNCTUATION.contains(c))
        .collect::<String>()
        .trim()
        .to_string()
}

/// Lower-case, replace punctuation with spaces, split on whitespace runs.
pub fn tokenize(s: &str) -> Vec<String> {
    s.to_lowercase()
        .chars()
        .map(|c| if PUNCTUATION.contains(&c) { ' ' } else { c })
        .collect::<String>()
        .split_whitespace()
        .map(str::to_string)
        .collect()
}

/// Whether a typed word matches the target spelling.
pub fn words_match(typed: &str, target: &str) -> bool {
    normalize(typed) == normalize(target)
}

/// First place a copied sentence departs from its target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Divergence {
    /// The attempt ends before the target token at `index`.
    MissingWord { index: usize, expected: String },
    /// The attempt has `found` where the target has `expected`.
    Typo {
        index: usize,
        found: String,
        expected: String,
    },
    /// Every target token matched but the attempt keeps going.
    ExtraWords { extra: usize },
    /// Tokens agree; only internal punctuation or spacing differs.
    Other,
}

impl Divergence {
    /// User-facing hint for this divergence.
    pub fn message(&self) -> String {
        match self {
            Self::MissingWord { expected, .. } => {
                format!("It seems you stopped before \"{}\".", expected)
            }
            Self::Typo {
                found, expected, ..
            } => format!("You wrote \"{}\" but expected \"{}\".", found, expected),
            Self::ExtraWords { .. } => "The sentence is longer than expected.".to_string(),
            Self::Other => GENERIC_MISMATCH.to_string(),
        }
    }
}

/// Result of grading a copied sentence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum GradeResult {
    Exact,
    Mismatch {
        message: String,
        divergence: Divergence,
    },
}

impl GradeResult {
    pub fn is_exact(&self) -> bool {
        matches!(self, Self::Exact)
    }

    /// The corrective message, if any.
    pub fn message(&self) -> Option<&str> {
        match self {
            Self::Exact => None,
            Self::Mismatch { message, .. } => Some(message),
        }
    }
}

/// Grade a user's copy of `target`.
///
/// Only the first divergence is reported; later ones are left for the next
/// attempt.
pub fn grade_sentence_copy(target: &str, attempt: &str) -> GradeResult {
    if normalize(target) == normalize(attempt) {
        return GradeResult::Exact;
    }

    let divergence = find_divergence(&tokenize(target), &tokenize(attempt));
    GradeResult::Mismatch {
        message: divergence.message(),
        divergence,
    }
}

fn find_divergence(target: &[String], attempt: &[String]) -> Divergence {
    for (index, expected) in target.iter().enumerate() {
        match attempt.get(index) {
            None => {
                return Divergence::MissingWord {
                    index,
                    expected: expected.clone(),
                }
            }
            Some(found) if found != expected => {
                return Divergence::Typo {
                    index,
                    found: found.clone(),
                    expected: expected.clone(),
                }
            }
            Some(_) => {}
        }
    }

    if attempt.len() > target.len() {
        Divergence::ExtraWords {
            extra: attempt.len() - target.len(),
        }
    } else {
        Divergence::Other
    }
}
