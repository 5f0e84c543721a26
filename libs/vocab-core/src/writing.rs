//! Free-writing helpers: review scores and re-practice selection.

use crate::types::WordRecord;

/// Highest band score a writing review can give.
pub const MAX_BAND_SCORE: u8 = 9;

/// Clamp a raw reviewer score into the 0..=9 band range.
pub fn clamp_score(raw: i64) -> u8 {
    raw.clamp(0, MAX_BAND_SCORE as i64) as u8
}

/// Words from `words` whose spelling appears in `selected`, in list order.
/// Matching ignores case.
pub fn select_for_practice(words: &[WordRecord], selected: &[String]) -> Vec<WordRecord> {
    words
        .iter()
        .filter(|w| selected.iter().any(|s| s.trim().eq_ignore_ascii_case(&w.word)))
        .cloned()
        .collect()
}
