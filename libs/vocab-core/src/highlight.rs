//! Marking practised words inside generated article text.

use serde::{Deserialize, Serialize};

/// A run of article text, highlighted or plain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Segment {
    pub text: String,
    pub highlighted: bool,
}

/// Split `text` into segments, highlighting whole-word, case-insensitive
/// occurrences of any of `words`. Longer entries win when they overlap.
pub fn highlight_words(text: &str, words: &[String]) -> Vec<Segment> {
    let targets = match_targets(words);
    let chars: Vec<char> = text.chars().collect();
    let mut segments = Vec::new();
    let mut plain = String::new();
    let mut i = 0;

    'outer: while i < chars.len() {
        let at_boundary = i == 0 || !is_word_char(chars[i - 1]);
        if at_boundary && is_word_char(chars[i]) {
            for target in &targets {
                let end = i + target.len();
                if end <= chars.len()
                    && matches_at(&chars[i..end], target)
                    && (end == chars.len() || !is_word_char(chars[end]))
                {
                    if !plain.is_empty() {
                        segments.push(Segment {
                            text: std::mem::take(&mut plain),
                            highlighted: false,
                        });
                    }
                    segments.push(Segment {
                        text: chars[i..end].iter().collect(),
                        highlighted: true,
                    });
                    i = end;
                    continue 'outer;
                }
            }
        }
        plain.push(chars[i]);
        i += 1;
    }

    if !plain.is_empty() {
        segments.push(Segment {
            text: plain,
            highlighted: false,
        });
    }
    segments
}

/// Lowercased, de-duplicated targets, longest first.
fn match_targets(words: &[String]) -> Vec<Vec<char>> {
    let mut targets: Vec<Vec<char>> = words
        .iter()
        .map(|w| w.trim().to_lowercase().chars().collect::<Vec<_>>())
        .filter(|w| !w.is_empty())
        .collect();
    targets.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
    targets.dedup();
    targets
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

fn matches_at(window: &[char], target: &[char]) -> bool {
    window
        .iter()
        .zip(target)
        .all(|(a, b)| a.to_lowercase().eq(b.to_lowercase()))
}
