//! Vocabulary generation endpoints

use axum::{extract::State, Json};
use tracing::{error, info};

use vocab_core::parse_word_list;

use crate::error::{ApiError, Result};
use crate::models::*;
use crate::services::genai::GenAiError;
use crate::AppState;

/// POST /api/vocabulary/generate
pub async fn generate(
    State(state): State<AppState>,
    Json(request): Json<GenerateVocabularyRequest>,
) -> Result<Json<VocabularyResponse>> {
    let theme = request.theme.trim();
    if theme.is_empty() {
        return Err(ApiError::BadRequest("Theme is required".to_string()));
    }

    let words = state
        .genai
        .generate_vocabulary(theme, request.difficulty, &request.exclude)
        .await
        .map_err(|e| {
            error!("Vocabulary generation failed for '{}': {}", theme, e);
            ApiError::from(e)
        })?;

    if words.is_empty() {
        return Err(GenAiError::EmptyResponse.into());
    }

    info!("Generated {} words for '{}'", words.len(), theme);

    Ok(Json(VocabularyResponse {
        theme: theme.to_string(),
        difficulty: request.difficulty,
        words,
    }))
}

/// POST /api/vocabulary/custom
/// Looks up details for each word of a user-supplied list
pub async fn custom(
    State(state): State<AppState>,
    Json(request): Json<CustomVocabularyRequest>,
) -> Result<Json<VocabularyResponse>> {
    let entries = parse_word_list(&request.content).map_err(|e| ApiError::Parse(e.to_string()))?;

    let theme = request
        .theme
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .unwrap_or(CUSTOM_THEME)
        .to_string();

    let mut words = Vec::with_capacity(entries.len());
    for entry in &entries {
        let record = state
            .genai
            .generate_word_details(entry, &theme, request.difficulty)
            .await
            .map_err(|e| {
                error!("Word details failed for '{}': {}", entry, e);
                ApiError::from(e)
            })?;
        words.push(record);
    }

    info!("Built custom list of {} words", words.len());

    Ok(Json(VocabularyResponse {
        theme,
        difficulty: request.difficulty,
        words,
    }))
}
