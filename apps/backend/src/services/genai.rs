//! Client for the Gemini `generateContent` REST API.

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use thiserror::Error;
use tracing::{debug, error};

use vocab_core::{
    clamp_score, ArticleData, DifficultyLevel, SentenceFeedback, WordRecord, WritingFeedback,
};

use crate::config::env_string;

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
const DEFAULT_MODEL: &str = "gemini-2.5-flash";
const DEFAULT_TTS_MODEL: &str = "gemini-2.5-flash-preview-tts";
const DEFAULT_VOICE: &str = "Kore";

/// Words requested per generated list.
pub const VOCABULARY_SIZE: usize = 8;

#[derive(Debug, Clone)]
pub struct GenAiConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
    pub tts_model: String,
    pub voice: String,
}

impl Default for GenAiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            tts_model: DEFAULT_TTS_MODEL.to_string(),
            voice: DEFAULT_VOICE.to_string(),
        }
    }
}

impl GenAiConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            api_key: env_string("GEMINI_API_KEY"),
            base_url: env_string("GEMINI_BASE_URL").unwrap_or(defaults.base_url),
            model: env_string("GEMINI_MODEL").unwrap_or(defaults.model),
            tts_model: env_string("GEMINI_TTS_MODEL").unwrap_or(defaults.tts_model),
            voice: env_string("GEMINI_VOICE").unwrap_or(defaults.voice),
        }
    }
}

#[derive(Debug, Error)]
pub enum GenAiError {
    #[error("generative service not configured: {0}")]
    NotConfigured(&'static str),
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("HTTP {status}: {message}")]
    Backend { status: u16, message: String },
    #[error("could not decode model output: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("model returned no content")]
    EmptyResponse,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Part {
    text: Option<String>,
    inline_data: Option<InlineData>,
}

#[derive(Debug, Deserialize)]
struct InlineData {
    data: String,
}

impl GenerateContentResponse {
    fn first_part(&self) -> Option<&Part> {
        self.candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .and_then(|c| c.parts.first())
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawWritingFeedback {
    score: i64,
    critique: String,
    improved_version: String,
}

#[derive(Debug, Deserialize)]
struct BackendErrorBody {
    error: BackendErrorDetail,
}

#[derive(Debug, Deserialize)]
struct BackendErrorDetail {
    message: String,
}

/// Gemini client shared by all handlers.
#[derive(Clone)]
pub struct GenAiClient {
    config: GenAiConfig,
    client: reqwest::Client,
}

impl GenAiClient {
    pub fn new(config: GenAiConfig) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
        }
    }

    pub fn is_available(&self) -> bool {
        self.config.api_key.is_some()
    }

    /// Eight words for `theme` at `level`, skipping anything in `exclude`.
    pub async fn generate_vocabulary(
        &self,
        theme: &str,
        level: DifficultyLevel,
        exclude: &[String],
    ) -> Result<Vec<WordRecord>, GenAiError> {
        let mut prompt = format!(
            "Generate {VOCABULARY_SIZE} English vocabulary words at {} for the theme: \"{theme}\". \
             Include phonetic transcription (IPA), a simple English definition, Chinese translation, \
             an example sentence using the word in a {} level context, and the Chinese translation \
             of the example sentence. Also include the word broken into syllables \
             (e.g., \"e-du-ca-tion\") and its part of speech (e.g., \"noun\", \"adjective\").",
            level.level_text(),
            level.as_str(),
        );
        if !exclude.is_empty() {
            prompt.push_str(&format!(
                " Do not include the following words: {}.",
                exclude.join(", ")
            ));
        }

        let schema = json!({ "type": "ARRAY", "items": word_schema() });
        let words: Vec<WordRecord> = self.generate_json(&prompt, schema).await?;

        let before = words.len();
        let words: Vec<WordRecord> = words
            .into_iter()
            .filter(|w| !exclude.iter().any(|e| e.eq_ignore_ascii_case(&w.word)))
            .collect();
        if words.len() < before {
            debug!(dropped = before - words.len(), "Dropped excluded words");
        }
        Ok(words)
    }

    pub async fn generate_word_details(
        &self,
        word: &str,
        theme: &str,
        level: DifficultyLevel,
    ) -> Result<WordRecord, GenAiError> {
        let prompt = format!(
            "Generate details for the English vocabulary word \"{word}\" ({}) related to the theme \
             \"{theme}\". Include phonetic transcription (IPA), a simple English definition, Chinese \
             translation, an example sentence using the word in a {} level context, and the Chinese \
             translation of the example sentence. Also include the word broken into syllables and \
             its part of speech.",
            level.level_text(),
            level.as_str(),
        );
        self.generate_json(&prompt, word_schema()).await
    }

    /// Base64 audio for `text`, or `None` when the model returns no audio.
    pub async fn generate_speech(&self, text: &str) -> Result<Option<String>, GenAiError> {
        let body = json!({
            "contents": [{ "parts": [{ "text": text }] }],
            "generationConfig": {
                "responseModalities": ["AUDIO"],
                "speechConfig": {
                    "voiceConfig": {
                        "prebuiltVoiceConfig": { "voiceName": self.config.voice }
                    }
                }
            }
        });
        let response = self.post(&self.config.tts_model, &body).await?;
        Ok(response
            .first_part()
            .and_then(|p| p.inline_data.as_ref())
            .map(|d| d.data.clone()))
    }

    pub async fn check_sentence(
        &self,
        word: &str,
        sentence: &str,
    ) -> Result<SentenceFeedback, GenAiError> {
        let prompt = format!(
            "Review this user-written sentence using the English word \"{word}\".\n\
             Sentence: \"{sentence}\"\n\n\
             1. Is it grammatically correct and does it use the word correctly in a formal context?\n\
             2. If incorrect, provide a corrected version.\n\
             3. Provide a brief explanation in Chinese."
        );
        let schema = json!({
            "type": "OBJECT",
            "properties": {
                "isCorrect": { "type": "BOOLEAN" },
                "correctedSentence": { "type": "STRING" },
                "explanation": { "type": "STRING" }
            },
            "required": ["isCorrect", "explanation"]
        });
        self.generate_json(&prompt, schema).await
    }

    pub async fn generate_article(
        &self,
        theme: &str,
        words: &[String],
    ) -> Result<ArticleData, GenAiError> {
        let prompt = format!(
            "Write a short, academic-style article (approx 150-200 words) suitable for English \
             learners about \"{theme}\" that naturally includes these words: {}. \
             Also provide a Chinese translation.",
            words.join(", ")
        );
        let schema = json!({
            "type": "OBJECT",
            "properties": {
                "title": { "type": "STRING" },
                "content": { "type": "STRING" },
                "translation": { "type": "STRING" }
            },
            "required": ["title", "content", "translation"]
        });
        self.generate_json(&prompt, schema).await
    }

    pub async fn review_writing(
        &self,
        theme: &str,
        essay: &str,
    ) -> Result<WritingFeedback, GenAiError> {
        let prompt = format!(
            "Review this user's short essay on the theme \"{theme}\".\n\
             User Text: \"{essay}\"\n\n\
             Provide:\n\
             1. A band score estimate (0-9) based on IELTS criteria.\n\
             2. Critique and tips in Chinese (focus on vocabulary and coherence).\n\
             3. An improved/native-like version of the text in English (Band 9 level)."
        );
        let schema = json!({
            "type": "OBJECT",
            "properties": {
                "score": { "type": "INTEGER" },
                "critique": { "type": "STRING" },
                "improvedVersion": { "type": "STRING" }
            },
            "required": ["score", "critique", "improvedVersion"]
        });
        let raw: RawWritingFeedback = self.generate_json(&prompt, schema).await?;
        Ok(WritingFeedback {
            score: clamp_score(raw.score),
            critique: raw.critique,
            improved_version: raw.improved_version,
        })
    }

    async fn generate_json<T: DeserializeOwned>(
        &self,
        prompt: &str,
        schema: Value,
    ) -> Result<T, GenAiError> {
        let body = json!({
            "contents": [{ "parts": [{ "text": prompt }] }],
            "generationConfig": {
                "responseMimeType": "application/json",
                "responseSchema": schema
            }
        });
        let response = self.post(&self.config.model, &body).await?;
        let text = response
            .first_part()
            .and_then(|p| p.text.as_deref())
            .filter(|t| !t.trim().is_empty())
            .ok_or(GenAiError::EmptyResponse)?;

        serde_json::from_str(text).map_err(|e| {
            error!("Failed to parse model JSON: {}. Text: {}", e, text);
            GenAiError::Parse(e)
        })
    }

    async fn post(&self, model: &str, body: &Value) -> Result<GenerateContentResponse, GenAiError> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .ok_or(GenAiError::NotConfigured("GEMINI_API_KEY"))?;

        let url = format!(
            "{}/models/{}:generateContent",
            self.config.base_url.trim_end_matches('/'),
            model
        );
        debug!(%url, "Calling generative model");

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", api_key)
            .json(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<BackendErrorBody>(&text)
                .map(|b| b.error.message)
                .unwrap_or(text);
            return Err(GenAiError::Backend {
                status: status.as_u16(),
                message,
            });
        }

        Ok(response.json().await?)
    }
}

fn word_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "word": { "type": "STRING" },
            "phonetic": { "type": "STRING" },
            "definition": { "type": "STRING" },
            "translation": { "type": "STRING" },
            "exampleSentence": { "type": "STRING" },
            "exampleTranslation": { "type": "STRING" },
            "syllables": {
                "type": "STRING",
                "description": "The word split by hyphens for syllables, e.g., 'com-put-er'"
            },
            "partOfSpeech": { "type": "STRING", "description": "e.g., noun, verb, adj" }
        },
        "required": [
            "word", "phonetic", "definition", "translation",
            "exampleSentence", "exampleTranslation", "syllables", "partOfSpeech"
        ]
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_key_fails_per_call() {
        let client = GenAiClient::new(GenAiConfig::default());
        assert!(!client.is_available());

        let err = client.generate_speech("hello").await.unwrap_err();
        assert!(matches!(err, GenAiError::NotConfigured("GEMINI_API_KEY")));
    }

    #[test]
    fn first_part_reads_text_and_audio() {
        let response: GenerateContentResponse = serde_json::from_value(json!({
            "candidates": [{
                "content": { "parts": [{ "text": "{}", "inlineData": { "mimeType": "audio/pcm", "data": "AAA=" } }] }
            }]
        }))
        .unwrap();
        let part = response.first_part().unwrap();
        assert_eq!(part.text.as_deref(), Some("{}"));
        assert_eq!(part.inline_data.as_ref().unwrap().data, "AAA=");
    }

    #[test]
    fn empty_candidates_have_no_part() {
        let response: GenerateContentResponse = serde_json::from_value(json!({})).unwrap();
        assert!(response.first_part().is_none());
    }

    #[test]
    fn word_schema_requires_every_field() {
        let schema = word_schema();
        assert_eq!(schema["required"].as_array().unwrap().len(), 8);
    }
}
