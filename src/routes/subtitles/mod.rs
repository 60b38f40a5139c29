//! Subtitle endpoints (/api/v1/subtitles/*)

pub mod dto;

use axum::{
    Json, Router,
    extract::State,
    routing::post,
};
use serde_json::json;
use std::sync::Arc;

use super::auth::Authorized;
use super::validated_json::ValidatedJson;
use crate::AppState;
use crate::services::error::{ApiError, LogErr};
use crate::services::subtitles::{self, UpdateResult, UploadResult};
use dto::{UpdateSubtitlesRequest, UploadSubtitlesRequest};

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/v1/subtitles/upload", post(upload_subtitles))
        .route("/api/v1/subtitles/update", post(update_subtitles))
}

/// POST /api/v1/subtitles/upload - Store a subtitle file, optionally linking audio
///
/// Upload and match are separate writes. If matching fails the subtitle
/// stays stored and its id is returned under `data`.
async fn upload_subtitles(
    State(state): State<Arc<AppState>>,
    _auth: Authorized,
    ValidatedJson(req): ValidatedJson<UploadSubtitlesRequest>,
) -> Result<Json<UploadResult>, ApiError> {
    let uploaded = subtitles::upload_subtitles(state.store.as_ref(), &req.subtitles)
        .await
        .log_err("Upload subtitles error")?;

    if let Some(audio_link) = req.audio_link.as_deref() {
        subtitles::match_subtitles_with_audio(
            state.store.as_ref(),
            &uploaded.subtitle_id.to_string(),
            audio_link,
        )
        .await
        .map_err(|e| ApiError::Partial {
            message: e.to_string(),
            data: json!({ "subtitleId": uploaded.subtitle_id }),
        })
        .log_err("Match subtitles with audio error")?;
    }

    Ok(Json(uploaded))
}

/// POST /api/v1/subtitles/update - Merge partial changes into a subtitle record
async fn update_subtitles(
    State(state): State<Arc<AppState>>,
    _auth: Authorized,
    ValidatedJson(req): ValidatedJson<UpdateSubtitlesRequest>,
) -> Result<Json<UpdateResult>, ApiError> {
    let result = subtitles::update_subtitles(state.store.as_ref(), &req.id, &req.updates)
        .await
        .log_err("Update subtitles error")?;

    Ok(Json(result))
}
