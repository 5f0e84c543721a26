//! Core vocabulary drill library used by the backend.
//!
//! Provides:
//! - Text normalization and copied-sentence grading
//! - Syllable split and stress marks
//! - The per-word drill step machine and session sequencing
//! - Single-flight guards for playback and remote checks
//! - Custom word-list parsing and article highlighting
//! - Shared types (WordRecord, DifficultyLevel, feedback records)

pub mod drill;
pub mod error;
pub mod guard;
pub mod highlight;
pub mod matching;
pub mod parser;
pub mod syllables;
pub mod types;
pub mod writing;

pub use drill::{
    AudioCue, DrillEvent, DrillSession, DrillSnapshot, DrillState, Outcome, Step, Transition,
};
pub use error::{DrillError, ParseError, Result};
pub use guard::SingleFlight;
pub use highlight::{highlight_words, Segment};
pub use matching::{grade_sentence_copy, normalize, tokenize, words_match, Divergence, GradeResult};
pub use parser::parse_word_list;
pub use syllables::{compute_canonical_splits, syllables_match, MarkedChar, SyllableMarks, Tone};
pub use types::{
    ArticleData, DifficultyLevel, LearningSession, SentenceFeedback, WordRecord, WritingFeedback,
};
pub use writing::{clamp_score, select_for_practice};
