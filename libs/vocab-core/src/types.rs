//! Core types for the vocabulary drill engine.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One vocabulary entry as produced by the vocabulary source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WordRecord {
    pub word: String,
    pub phonetic: String,
    pub definition: String,
    pub translation: String,
    pub example_sentence: String,
    pub example_translation: String,
    /// Canonical syllable form, e.g. `en-vi-ron-ment`.
    pub syllables: String,
    pub part_of_speech: String,
}

/// Proficiency level used when requesting vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DifficultyLevel {
    A1,
    A2,
    B1,
    B2,
    C1,
    C2,
    #[serde(rename = "IELTS")]
    Ielts,
    #[serde(rename = "TOEFL")]
    Toefl,
    #[serde(rename = "SAT")]
    Sat,
}

impl Default for DifficultyLevel {
    fn default() -> Self {
        Self::B2
    }
}

impl DifficultyLevel {
    /// Get the level code as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::A1 => "A1",
            Self::A2 => "A2",
            Self::B1 => "B1",
            Self::B2 => "B2",
            Self::C1 => "C1",
            Self::C2 => "C2",
            Self::Ielts => "IELTS",
            Self::Toefl => "TOEFL",
            Self::Sat => "SAT",
        }
    }

    /// Parse from the level code.
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "A1" => Some(Self::A1),
            "A2" => Some(Self::A2),
            "B1" => Some(Self::B1),
            "B2" => Some(Self::B2),
            "C1" => Some(Self::C1),
            "C2" => Some(Self::C2),
            "IELTS" => Some(Self::Ielts),
            "TOEFL" => Some(Self::Toefl),
            "SAT" => Some(Self::Sat),
            _ => None,
        }
    }

    /// Whether this is an exam level rather than a CEFR band.
    pub fn is_exam(&self) -> bool {
        matches!(self, Self::Ielts | Self::Toefl | Self::Sat)
    }

    /// Human-readable level used in generation prompts.
    pub fn level_text(&self) -> String {
        if self.is_exam() {
            format!("{} exam level", self.as_str())
        } else {
            format!("CEFR level {}", self.as_str())
        }
    }
}

/// Verdict on a user-composed sentence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SentenceFeedback {
    pub is_correct: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub corrected_sentence: Option<String>,
    pub explanation: String,
}

/// Short generated article with its translation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleData {
    pub title: String,
    pub content: String,
    pub translation: String,
}

/// Review of a free-writing essay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WritingFeedback {
    /// Band score, 0 to 9.
    pub score: u8,
    pub critique: String,
    pub improved_version: String,
}

/// A past learning session kept in history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LearningSession {
    pub id: String,
    pub date: DateTime<Utc>,
    pub theme: String,
    pub words: Vec<WordRecord>,
    pub difficulty: DifficultyLevel,
}
