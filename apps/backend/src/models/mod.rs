//! Database models and API types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

// Re-export shared types from vocab-core
pub use vocab_core::{
    ArticleData, AudioCue, DifficultyLevel, DrillEvent, DrillSnapshot, LearningSession, Segment,
    SentenceFeedback, Transition, WordRecord, WritingFeedback,
};

use crate::error::{ApiError, Result};

/// Theme recorded for sessions built from a custom word list.
pub const CUSTOM_THEME: &str = "Custom Words";

// === Database Entity Types ===

/// Past session row in SQLite
#[derive(Debug, Clone, FromRow)]
pub struct DbSession {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub theme: String,
    pub difficulty: String,
    /// JSON array of word records
    pub words: String,
}

impl DbSession {
    pub fn from_learning_session(session: &LearningSession) -> Result<Self> {
        let words = serde_json::to_string(&session.words)
            .map_err(|e| ApiError::Internal(format!("Failed to encode words: {e}")))?;
        Ok(Self {
            id: session.id.clone(),
            created_at: session.date,
            theme: session.theme.clone(),
            difficulty: session.difficulty.as_str().to_string(),
            words,
        })
    }

    /// Convert to the shared history type
    pub fn to_learning_session(&self) -> Result<LearningSession> {
        let words: Vec<WordRecord> = serde_json::from_str(&self.words)
            .map_err(|e| ApiError::Internal(format!("Corrupt words for {}: {e}", self.id)))?;
        let difficulty = DifficultyLevel::from_str(&self.difficulty).ok_or_else(|| {
            ApiError::Internal(format!("Unknown difficulty '{}'", self.difficulty))
        })?;
        Ok(LearningSession {
            id: self.id.clone(),
            date: self.created_at,
            theme: self.theme.clone(),
            words,
            difficulty,
        })
    }
}

// === Vocabulary API Types ===

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateVocabularyRequest {
    pub theme: String,
    #[serde(default)]
    pub difficulty: DifficultyLevel,
    /// Words already seen, left out of the new list
    #[serde(default)]
    pub exclude: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomVocabularyRequest {
    /// Free text: words separated by commas, semicolons or newlines
    pub content: String,
    #[serde(default)]
    pub theme: Option<String>,
    #[serde(default)]
    pub difficulty: DifficultyLevel,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VocabularyResponse {
    pub theme: String,
    pub difficulty: DifficultyLevel,
    pub words: Vec<WordRecord>,
}

// === Session API Types ===

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateSessionRequest {
    pub theme: String,
    #[serde(default)]
    pub difficulty: DifficultyLevel,
    pub words: Vec<WordRecord>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SessionResponse {
    pub id: Uuid,
    pub theme: String,
    pub difficulty: DifficultyLevel,
    pub snapshot: DrillSnapshot,
    /// Audio for the position the session is at
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audio: Option<AudioCue>,
}

#[derive(Debug, Clone, Serialize)]
pub struct EventResponse {
    pub transition: Transition,
    pub snapshot: DrillSnapshot,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComposeRequest {
    pub sentence: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ComposeResponse {
    pub feedback: SentenceFeedback,
    pub transition: Transition,
    pub snapshot: DrillSnapshot,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpeechRequest {
    pub text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpeechResponse {
    /// True when another playback was in progress and nothing was synthesized
    pub suppressed: bool,
    /// Base64 audio, absent when suppressed or when the model gave none
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audio: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaybackStatus {
    pub busy: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct ArticleResponse {
    pub article: ArticleData,
    /// Article content split around the session's words
    pub segments: Vec<Segment>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WritingRequest {
    pub essay: String,
}

// === History API Types ===

#[derive(Debug, Clone, Serialize)]
pub struct HistoryResponse {
    pub sessions: Vec<LearningSession>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PracticeRequest {
    /// Words to keep; empty means the whole list
    #[serde(default)]
    pub words: Vec<String>,
}
