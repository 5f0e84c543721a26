//! Session history endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use vocab_core::select_for_practice;

use crate::error::{ApiError, Result};
use crate::models::*;
use crate::routes::sessions::open_session;
use crate::AppState;

/// GET /api/history
pub async fn list(State(state): State<AppState>) -> Result<Json<HistoryResponse>> {
    let sessions = state.db.list_sessions().await?;
    Ok(Json(HistoryResponse { sessions }))
}

/// GET /api/history/:id
pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<LearningSession>> {
    let session = state
        .db
        .get_session(&id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("History entry {id} not found")))?;

    Ok(Json(session))
}

/// DELETE /api/history/:id
pub async fn delete(State(state): State<AppState>, Path(id): Path<String>) -> Result<StatusCode> {
    if !state.db.delete_session(&id).await? {
        return Err(ApiError::NotFound(format!("History entry {id} not found")));
    }
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/history/:id/practice
/// Starts a new drill from a past session, optionally with only some words
pub async fn practice(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<PracticeRequest>,
) -> Result<Json<SessionResponse>> {
    let past = state
        .db
        .get_session(&id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("History entry {id} not found")))?;

    let words = if request.words.is_empty() {
        past.words
    } else {
        let picked = select_for_practice(&past.words, &request.words);
        if picked.is_empty() {
            return Err(ApiError::BadRequest(
                "None of the selected words belong to this session".to_string(),
            ));
        }
        picked
    };

    let response = open_session(&state, past.theme, past.difficulty, words).await?;
    Ok(Json(response))
}
