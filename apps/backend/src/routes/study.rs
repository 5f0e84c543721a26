//! Article study and free-writing endpoints

use axum::{
    extract::{Path, State},
    Json,
};
use tracing::info;
use uuid::Uuid;

use vocab_core::highlight_words;

use crate::error::{ApiError, Result};
use crate::models::*;
use crate::services::drill::Guard;
use crate::AppState;

/// POST /api/sessions/:id/article
pub async fn article(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ArticleResponse>> {
    let (theme, words) = state
        .sessions
        .with_session(id, |s| {
            let words: Vec<String> = s.drill.words().iter().map(|w| w.word.clone()).collect();
            Ok((s.theme.clone(), words))
        })
        .await?;

    let article = state
        .sessions
        .run_guarded(
            id,
            Guard::Generating,
            state.genai.generate_article(&theme, &words),
        )
        .await?;

    let segments = highlight_words(&article.content, &words);
    info!("Generated article '{}' for session {}", article.title, id);

    Ok(Json(ArticleResponse { article, segments }))
}

/// POST /api/sessions/:id/writing
pub async fn writing(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<WritingRequest>,
) -> Result<Json<WritingFeedback>> {
    let essay = request.essay.trim();
    if essay.is_empty() {
        return Err(ApiError::BadRequest("Essay is required".to_string()));
    }

    let theme = state
        .sessions
        .with_session(id, |s| Ok(s.theme.clone()))
        .await?;

    let feedback = state
        .sessions
        .run_guarded(id, Guard::Reviewing, state.genai.review_writing(&theme, essay))
        .await?;

    info!("Reviewed essay for session {}: band {}", id, feedback.score);

    Ok(Json(feedback))
}
