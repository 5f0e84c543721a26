//! Parser for user-supplied custom word lists.
//!
//! # Format
//! ```text
//! resilient, mitigate; ubiquitous
//! well-being
//! ```
//! Entries are separated by commas, semicolons or newlines. Blank entries
//! are skipped and repeats (ignoring case) keep their first occurrence.

use crate::error::ParseError;
use std::collections::HashSet;

/// Upper bound on words accepted from one list.
pub const MAX_CUSTOM_WORDS: usize = 30;

/// Parse a custom word list into trimmed, de-duplicated words.
pub fn parse_word_list(content: &str) -> Result<Vec<String>, ParseError> {
    let mut words = Vec::new();
    let mut seen = HashSet::new();

    for (position, entry) in content.split([',', ';', '\n']).enumerate() {
        let word = collapse_spaces(entry);
        if word.is_empty() {
            continue;
        }
        if !is_valid_word(&word) {
            return Err(ParseError::InvalidWord {
                position: position + 1,
                value: word,
            });
        }
        if seen.insert(word.to_lowercase()) {
            words.push(word);
        }
    }

    if words.is_empty() {
        return Err(ParseError::EmptyList);
    }
    words.truncate(MAX_CUSTOM_WORDS);
    Ok(words)
}

fn collapse_spaces(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Letters plus the joiners found inside English headwords.
fn is_valid_word(word: &str) -> bool {
    word.chars().any(char::is_alphabetic)
        && word
            .chars()
            .all(|c| c.is_alphabetic() || matches!(c, ' ' | '-' | '\'' | '’'))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn parse_mixed_separators() {
        let words = parse_word_list("resilient, mitigate;ubiquitous\nwell-being").unwrap();
        assert_eq!(words, vec!["resilient", "mitigate", "ubiquitous", "well-being"]);
    }

    #[test]
    fn skips_blanks_and_windows_line_endings() {
        let words = parse_word_list("apple,\r\n, ,\r\nbanana\r\n").unwrap();
        assert_eq!(words, vec!["apple", "banana"]);
    }

    #[test]
    fn keeps_first_of_case_insensitive_duplicates() {
        let words = parse_word_list("Habitat, habitat, HABITAT").unwrap();
        assert_eq!(words, vec!["Habitat"]);
    }

    #[test]
    fn keeps_phrases_with_single_spaces() {
        let words = parse_word_list("carbon   footprint").unwrap();
        assert_eq!(words, vec!["carbon footprint"]);
    }

    #[test]
    fn reject_empty_list() {
        assert_eq!(parse_word_list(" , ;\n"), Err(ParseError::EmptyList));
    }

    #[test]
    fn reject_digits() {
        let result = parse_word_list("apple, b4nana");
        assert_eq!(
            result,
            Err(ParseError::InvalidWord {
                position: 2,
                value: "b4nana".to_string()
            })
        );
    }

    #[test]
    fn truncates_long_lists() {
        let content = (0..40u8)
            .map(|i| format!("{}{}", char::from(b'a' + i / 26), char::from(b'a' + i % 26)))
            .collect::<Vec<_>>()
            .join(",");
        let words = parse_word_list(&content).unwrap();
        assert_eq!(words.len(), MAX_CUSTOM_WORDS);
        assert_eq!(words[0], "aa");
    }
}
