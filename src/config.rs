//! Runtime configuration read from the environment
//!
//! ## Environment Variables
//! - `DATABASE_URL` - Postgres connection string (optional; the in-memory store is used when unset)
//! - `DATABASE_MAX_CONNECTIONS` - pool size (default: `5`)
//! - `JWT_SECRET` - HS256 secret used to validate session cookies (required)
//! - `PORT` - port to listen on (default: `3000`)
//! - `SHARED_DB` - tables carry the project prefix (default: `false`)
//! - `SHARED_PROFILES` - profiles table is shared across projects (default: `true`)
//! - `MEMORY_API_KEYS` - comma-separated API keys seeded into the in-memory store

use thiserror::Error;

use crate::constants::{
    API_KEYS_TABLE, DEFAULT_MAX_CONNECTIONS, DEFAULT_PORT, PROFILES_TABLE, SHARED_TABLE_PREFIX,
    SUBTITLES_TABLE,
};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("{name} has an invalid value: {value}")]
    Invalid { name: &'static str, value: String },
}

/// Which table layout the database uses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DatabaseMode {
    /// Several projects share one database, so our tables are prefixed
    pub is_shared_db: bool,
    /// Profiles live in the unprefixed table even in a shared database
    pub has_shared_profiles: bool,
}

impl Default for DatabaseMode {
    fn default() -> Self {
        Self {
            is_shared_db: false,
            has_shared_profiles: true,
        }
    }
}

/// Concrete table names for a `DatabaseMode`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableNames {
    pub subtitles: String,
    pub api_keys: String,
    pub profiles: String,
}

impl TableNames {
    pub fn for_mode(mode: DatabaseMode) -> Self {
        let prefixed = |name: &str| format!("{}_{}", SHARED_TABLE_PREFIX, name);

        let profiles = if mode.has_shared_profiles || !mode.is_shared_db {
            PROFILES_TABLE.to_string()
        } else {
            prefixed(PROFILES_TABLE)
        };

        if mode.is_shared_db {
            Self {
                subtitles: prefixed(SUBTITLES_TABLE),
                api_keys: prefixed(API_KEYS_TABLE),
                profiles,
            }
        } else {
            Self {
                subtitles: SUBTITLES_TABLE.to_string(),
                api_keys: API_KEYS_TABLE.to_string(),
                profiles,
            }
        }
    }
}

impl Default for TableNames {
    fn default() -> Self {
        Self::for_mode(DatabaseMode::default())
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: Option<String>,
    pub max_connections: u32,
    pub jwt_secret: Vec<u8>,
    pub port: u16,
    pub database_mode: DatabaseMode,
    pub memory_api_keys: Vec<String>,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from an arbitrary variable lookup (tests pass a map here)
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = lookup("DATABASE_URL").filter(|v| !v.trim().is_empty());

        let jwt_secret = lookup("JWT_SECRET")
            .filter(|v| !v.is_empty())
            .ok_or(ConfigError::Missing("JWT_SECRET"))?
            .into_bytes();

        let port = match lookup("PORT") {
            Some(value) => value.trim().parse().map_err(|_| ConfigError::Invalid {
                name: "PORT",
                value,
            })?,
            None => DEFAULT_PORT,
        };

        let max_connections = match lookup("DATABASE_MAX_CONNECTIONS") {
            Some(value) => value.trim().parse().map_err(|_| ConfigError::Invalid {
                name: "DATABASE_MAX_CONNECTIONS",
                value,
            })?,
            None => DEFAULT_MAX_CONNECTIONS,
        };

        let database_mode = DatabaseMode {
            is_shared_db: parse_flag("SHARED_DB", lookup("SHARED_DB"), false)?,
            has_shared_profiles: parse_flag("SHARED_PROFILES", lookup("SHARED_PROFILES"), true)?,
        };

        let memory_api_keys = lookup("MEMORY_API_KEYS")
            .map(|v| {
                v.split(',')
                    .map(str::trim)
                    .filter(|k| !k.is_empty())
                    .map(String::from)
                    .collect()
            })
            .unwrap_or_default();

        Ok(Self {
            database_url,
            max_connections,
            jwt_secret,
            port,
            database_mode,
            memory_api_keys,
        })
    }

    pub fn table_names(&self) -> TableNames {
        TableNames::for_mode(self.database_mode)
    }
}

fn parse_flag(
    name: &'static str,
    value: Option<String>,
    default: bool,
) -> Result<bool, ConfigError> {
    let Some(value) = value else {
        return Ok(default);
    };

    match value.trim().to_lowercase().as_str() {
        "" => Ok(default),
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::Invalid { name, value }),
    }
}
