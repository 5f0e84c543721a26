//! Drill session endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::error::{ApiError, Result};
use crate::models::*;
use crate::services::drill::{ActiveSession, Guard};
use crate::AppState;

/// Start a drill session and record it in history.
pub(crate) async fn open_session(
    state: &AppState,
    theme: String,
    difficulty: DifficultyLevel,
    words: Vec<WordRecord>,
) -> Result<SessionResponse> {
    let id = Uuid::new_v4();
    let session = ActiveSession::new(id, theme.clone(), difficulty, words.clone())?;

    state
        .db
        .insert_session(&LearningSession {
            id: id.to_string(),
            date: Utc::now(),
            theme: theme.clone(),
            words,
            difficulty,
        })
        .await?;

    let response = SessionResponse {
        id,
        theme,
        difficulty,
        snapshot: session.drill.snapshot(),
        audio: session.drill.entry_cue(),
    };
    state.sessions.insert(session).await;

    info!(
        "Started session {} with {} words",
        id, response.snapshot.total
    );

    Ok(response)
}

/// POST /api/sessions
pub async fn create(
    State(state): State<AppState>,
    Json(request): Json<CreateSessionRequest>,
) -> Result<Json<SessionResponse>> {
    let theme = request.theme.trim().to_string();
    if theme.is_empty() {
        return Err(ApiError::BadRequest("Theme is required".to_string()));
    }

    let response = open_session(&state, theme, request.difficulty, request.words).await?;
    Ok(Json(response))
}

/// GET /api/sessions/:id
pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionResponse>> {
    let response = state
        .sessions
        .with_session(id, |s| {
            Ok(SessionResponse {
                id: s.id,
                theme: s.theme.clone(),
                difficulty: s.difficulty,
                snapshot: s.drill.snapshot(),
                audio: s.drill.entry_cue(),
            })
        })
        .await?;

    Ok(Json(response))
}

/// DELETE /api/sessions/:id
pub async fn delete(State(state): State<AppState>, Path(id): Path<Uuid>) -> Result<StatusCode> {
    if !state.sessions.remove(id).await {
        return Err(ApiError::NotFound(format!("Session {id} not found")));
    }
    info!("Discarded session {}", id);
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/sessions/:id/events
pub async fn apply_event(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(event): Json<DrillEvent>,
) -> Result<Json<EventResponse>> {
    if matches!(event, DrillEvent::CompositionReviewed { .. }) {
        return Err(ApiError::BadRequest(
            "Composed sentences are graded through /compose".to_string(),
        ));
    }

    let name = event.name();
    let response = state
        .sessions
        .with_session(id, |s| {
            let transition = s.drill.apply(event)?;
            Ok(EventResponse {
                transition,
                snapshot: s.drill.snapshot(),
            })
        })
        .await?;

    debug!(session = %id, event = name, "Applied drill event");

    Ok(Json(response))
}

/// POST /api/sessions/:id/compose
/// Grades a composed sentence and advances the drill when it is accepted.
/// A verdict for a word the user has since left is answered with 409.
pub async fn compose(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<ComposeRequest>,
) -> Result<Json<ComposeResponse>> {
    let sentence = request.sentence.trim().to_string();
    if sentence.is_empty() {
        return Err(ApiError::BadRequest("Sentence is required".to_string()));
    }

    let (word, index) = state
        .sessions
        .with_session(id, |s| {
            if s.checking.is_busy() {
                return Err(ApiError::Conflict("checking already in progress".to_string()));
            }
            s.drill.apply(DrillEvent::SentenceChanged {
                text: sentence.clone(),
            })?;
            s.checking.try_begin();
            Ok((s.drill.current_word().word.clone(), s.drill.current_index()))
        })
        .await?;
    let permit = state.sessions.permit(id, Guard::Checking);

    let verdict = state.genai.check_sentence(&word, &sentence).await;
    permit.release().await;

    let feedback = verdict.map_err(|e| {
        error!(session = %id, "Sentence check failed: {}", e);
        ApiError::from(e)
    })?;

    let response = state
        .sessions
        .with_session(id, |s| {
            let transition = s.apply_verdict(index, &sentence, feedback.clone())?;
            Ok(ComposeResponse {
                feedback,
                transition,
                snapshot: s.drill.snapshot(),
            })
        })
        .await
        .inspect_err(|e| {
            if matches!(e, ApiError::Conflict(_)) {
                warn!(session = %id, word = %word, "Discarded verdict for a word no longer on screen");
            }
        })?;

    Ok(Json(response))
}

/// POST /api/sessions/:id/speech
/// Dropped without synthesis while an earlier clip is still playing
pub async fn speech(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<SpeechRequest>,
) -> Result<Json<SpeechResponse>> {
    let text = request.text.trim();
    if text.is_empty() {
        return Err(ApiError::BadRequest("Text is required".to_string()));
    }

    let Some(permit) = state.sessions.acquire(id, Guard::Playback).await? else {
        debug!(session = %id, "Playback in progress, speech suppressed");
        return Ok(Json(SpeechResponse {
            suppressed: true,
            audio: None,
        }));
    };

    match state.genai.generate_speech(text).await {
        Ok(Some(audio)) => {
            // Held until the client reports playback done
            permit.keep();
            Ok(Json(SpeechResponse {
                suppressed: false,
                audio: Some(audio),
            }))
        }
        Ok(None) => {
            permit.release().await;
            Ok(Json(SpeechResponse {
                suppressed: false,
                audio: None,
            }))
        }
        Err(e) => {
            permit.release().await;
            error!(session = %id, "Speech synthesis failed: {}", e);
            Err(e.into())
        }
    }
}

/// POST /api/sessions/:id/speech/complete
pub async fn speech_complete(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<PlaybackStatus>> {
    let status = state
        .sessions
        .with_session(id, |s| {
            s.playback.finish();
            Ok(PlaybackStatus {
                busy: s.playback.is_busy(),
            })
        })
        .await?;

    Ok(Json(status))
}
