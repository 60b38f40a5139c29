pub mod api_keys;
pub mod format;
pub mod subtitles;
