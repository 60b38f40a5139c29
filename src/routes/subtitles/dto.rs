//! Request bodies for subtitle endpoints

use serde::Deserialize;
use validator::Validate;

use crate::services::subtitles::SubtitleUpdates;

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UploadSubtitlesRequest {
    pub subtitles: String,
    #[validate(url)]
    pub audio_link: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateSubtitlesRequest {
    pub id: String,
    #[validate(nested)]
    pub updates: SubtitleUpdates,
}
