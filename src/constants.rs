//! Application constants

/// Prefix applied to table names when several projects share one database
pub const SHARED_TABLE_PREFIX: &str = "sm";

/// Base table names
pub const SUBTITLES_TABLE: &str = "subtitles";
pub const API_KEYS_TABLE: &str = "api_keys";
pub const PROFILES_TABLE: &str = "profiles";

/// Cookie carrying the session JWT
pub const SESSION_COOKIE_NAME: &str = "access_token";

/// Maximum request body size (10 MB); subtitle files are plain text
pub const MAX_SUBTITLE_UPLOAD_SIZE: usize = 10 * 1024 * 1024;

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_MAX_CONNECTIONS: u32 = 5;

/// Returned for any schema or parse failure of a request body
pub const INVALID_INPUT_MESSAGE: &str = "Invalid input";

/// Returned for unrecognized subtitle content
pub const INVALID_FORMAT_MESSAGE: &str = "Invalid subtitle file format. Must be SRT or VTT.";
