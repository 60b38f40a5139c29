//! Subtitle operations: upload, match with audio, update
//!
//! Each operation validates its own input before touching the store, so a
//! rejected request never reaches the database.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;
use validator::{Validate, ValidateUrl};

use super::store::{Store, StoreError};
use crate::constants::INVALID_FORMAT_MESSAGE;
use crate::domain::format::determine_subtitle_kind;
use crate::domain::subtitles::{NewSubtitle, SubtitleChanges};

#[derive(Debug, Error)]
pub enum OperationError {
    #[error("{}", INVALID_FORMAT_MESSAGE)]
    InvalidFormat,
    #[error("Invalid subtitle id: {0}")]
    InvalidId(String),
    #[error("Invalid audio link: {0}")]
    InvalidAudioLink(String),
    #[error("{0}")]
    Validation(String),
    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResult {
    pub subtitle_id: Uuid,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatchResult {
    pub updated: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UpdateResult {
    pub success: bool,
}

/// Partial update set; absent fields are left as stored
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SubtitleUpdates {
    #[validate(url)]
    pub audio_link: Option<String>,
    pub subtitles: Option<String>,
}

/// Store a new subtitle file and return its id
pub async fn upload_subtitles(
    store: &dyn Store,
    subtitles: &str,
) -> Result<UploadResult, OperationError> {
    let kind = determine_subtitle_kind(subtitles).ok_or(OperationError::InvalidFormat)?;

    let subtitle_id = Uuid::new_v4();
    store
        .insert_subtitle(&NewSubtitle {
            id: subtitle_id,
            kind,
            subtitles: subtitles.to_string(),
        })
        .await?;

    tracing::info!(%subtitle_id, %kind, bytes = subtitles.len(), "Subtitles uploaded");

    Ok(UploadResult { subtitle_id })
}

/// Point an existing subtitle record at its audio
pub async fn match_subtitles_with_audio(
    store: &dyn Store,
    subtitle_id: &str,
    audio_link: &str,
) -> Result<MatchResult, OperationError> {
    let id = parse_id(subtitle_id)?;
    if !audio_link.validate_url() {
        return Err(OperationError::InvalidAudioLink(audio_link.to_string()));
    }

    let matched = store
        .update_subtitle(id, &SubtitleChanges::audio_link(audio_link))
        .await?;

    if matched == 0 {
        tracing::warn!(subtitle_id = %id, "Audio link matched no subtitle record");
    } else {
        tracing::info!(subtitle_id = %id, "Subtitles matched with audio");
    }

    Ok(MatchResult { updated: true })
}

/// Merge `updates` into the stored record
pub async fn update_subtitles(
    store: &dyn Store,
    id: &str,
    updates: &SubtitleUpdates,
) -> Result<UpdateResult, OperationError> {
    let id = parse_id(id)?;
    updates
        .validate()
        .map_err(|e| OperationError::Validation(e.to_string()))?;

    let subtitles = match updates.subtitles.as_deref() {
        Some(text) => {
            let kind = determine_subtitle_kind(text).ok_or(OperationError::InvalidFormat)?;
            Some((text.to_string(), kind))
        }
        None => None,
    };

    let changes = SubtitleChanges {
        subtitles,
        audio_link: updates.audio_link.clone(),
    };

    if changes.is_empty() {
        return Ok(UpdateResult { success: true });
    }

    let matched = store.update_subtitle(id, &changes).await?;
    if matched == 0 {
        tracing::warn!(subtitle_id = %id, "Update matched no subtitle record");
    } else {
        tracing::info!(subtitle_id = %id, "Subtitles updated");
    }

    Ok(UpdateResult { success: true })
}

fn parse_id(id: &str) -> Result<Uuid, OperationError> {
    Uuid::parse_str(id.trim()).map_err(|_| OperationError::InvalidId(id.to_string()))
}
