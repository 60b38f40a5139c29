//! Persistence gateway
//!
//! Every read and write of subtitles and API keys goes through `Store`.
//! `PgStore` is the production backend; `MemoryStore` backs local runs
//! without a database and the integration tests.

use async_trait::async_trait;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use std::collections::{HashMap, HashSet};
use thiserror::Error;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::config::TableNames;
use crate::domain::api_keys::{self, ApiKey};
use crate::domain::format::UnknownKind;
use crate::domain::subtitles::{self, NewSubtitle, SubtitleChanges, SubtitleRecord};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    Database(sqlx::Error),
    #[error("Corrupt subtitle record {id}: {source}")]
    Corrupt { id: Uuid, source: UnknownKind },
    #[error("{0}")]
    Conflict(String),
    #[error("{0}")]
    Unavailable(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        match e {
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
                StoreError::Unavailable(format!("Database unavailable: {}", e))
            }
            e => StoreError::Database(e),
        }
    }
}

#[async_trait]
pub trait Store: Send + Sync {
    async fn insert_subtitle(&self, subtitle: &NewSubtitle) -> Result<(), StoreError>;

    /// Returns the number of records matched by `id`
    async fn update_subtitle(
        &self,
        id: Uuid,
        changes: &SubtitleChanges,
    ) -> Result<u64, StoreError>;

    async fn get_subtitle(&self, id: Uuid) -> Result<Option<SubtitleRecord>, StoreError>;

    async fn find_api_key(&self, key: &str) -> Result<Option<ApiKey>, StoreError>;
}

/// Postgres-backed store
#[derive(Clone)]
pub struct PgStore {
    db: PgPool,
    tables: TableNames,
}

impl PgStore {
    pub fn new(db: PgPool, tables: TableNames) -> Self {
        Self { db, tables }
    }

    pub async fn connect(
        database_url: &str,
        max_connections: u32,
        tables: TableNames,
    ) -> Result<Self, StoreError> {
        let db = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;

        Ok(Self::new(db, tables))
    }
}

#[async_trait]
impl Store for PgStore {
    async fn insert_subtitle(&self, subtitle: &NewSubtitle) -> Result<(), StoreError> {
        subtitles::insert_subtitle(&self.db, &self.tables.subtitles, subtitle).await?;
        Ok(())
    }

    async fn update_subtitle(
        &self,
        id: Uuid,
        changes: &SubtitleChanges,
    ) -> Result<u64, StoreError> {
        Ok(subtitles::update_subtitle(&self.db, &self.tables.subtitles, id, changes).await?)
    }

    async fn get_subtitle(&self, id: Uuid) -> Result<Option<SubtitleRecord>, StoreError> {
        let Some(row) = subtitles::get_subtitle(&self.db, &self.tables.subtitles, id).await?
        else {
            return Ok(None);
        };

        SubtitleRecord::try_from(row)
            .map(Some)
            .map_err(|source| StoreError::Corrupt { id, source })
    }

    async fn find_api_key(&self, key: &str) -> Result<Option<ApiKey>, StoreError> {
        Ok(api_keys::find_api_key(&self.db, &self.tables.api_keys, key).await?)
    }
}

/// In-process store; contents are lost on restart
#[derive(Default)]
pub struct MemoryStore {
    subtitles: RwLock<HashMap<Uuid, SubtitleRecord>>,
    api_keys: RwLock<HashSet<String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_api_keys<I, K>(keys: I) -> Self
    where
        I: IntoIterator<Item = K>,
        K: Into<String>,
    {
        Self {
            api_keys: RwLock::new(keys.into_iter().map(Into::into).collect()),
            ..Default::default()
        }
    }

    pub async fn add_api_key(&self, key: impl Into<String>) {
        self.api_keys.write().await.insert(key.into());
    }

    pub async fn subtitle_count(&self) -> usize {
        self.subtitles.read().await.len()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn insert_subtitle(&self, subtitle: &NewSubtitle) -> Result<(), StoreError> {
        let mut subtitles = self.subtitles.write().await;
        if subtitles.contains_key(&subtitle.id) {
            return Err(StoreError::Conflict(format!(
                "duplicate key value violates unique constraint: {}",
                subtitle.id
            )));
        }

        subtitles.insert(
            subtitle.id,
            SubtitleRecord {
                id: subtitle.id,
                kind: subtitle.kind,
                subtitles: subtitle.subtitles.clone(),
                audio_link: None,
            },
        );
        Ok(())
    }

    async fn update_subtitle(
        &self,
        id: Uuid,
        changes: &SubtitleChanges,
    ) -> Result<u64, StoreError> {
        let mut subtitles = self.subtitles.write().await;
        let Some(record) = subtitles.get_mut(&id) else {
            return Ok(0);
        };

        if let Some((text, kind)) = &changes.subtitles {
            record.subtitles = text.clone();
            record.kind = *kind;
        }
        if let Some(link) = &changes.audio_link {
            record.audio_link = Some(link.clone());
        }
        Ok(1)
    }

    async fn get_subtitle(&self, id: Uuid) -> Result<Option<SubtitleRecord>, StoreError> {
        Ok(self.subtitles.read().await.get(&id).cloned())
    }

    async fn find_api_key(&self, key: &str) -> Result<Option<ApiKey>, StoreError> {
        Ok(self.api_keys.read().await.get(key).map(|key| ApiKey {
            key: key.clone(),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::format::SubtitleKind;

    #[test]
    fn pool_errors_are_unavailable() {
        assert!(matches!(
            StoreError::from(sqlx::Error::PoolTimedOut),
            StoreError::Unavailable(_)
        ));
        assert!(matches!(
            StoreError::from(sqlx::Error::PoolClosed),
            StoreError::Unavailable(_)
        ));
        assert!(matches!(
            StoreError::from(sqlx::Error::RowNotFound),
            StoreError::Database(_)
        ));
    }

    fn new_subtitle() -> NewSubtitle {
        NewSubtitle {
            id: Uuid::new_v4(),
            kind: SubtitleKind::Vtt,
            subtitles: "WEBVTT\n".to_string(),
        }
    }

    #[tokio::test]
    async fn memory_store_inserts_and_reads_back() {
        let store = MemoryStore::new();
        let subtitle = new_subtitle();

        store.insert_subtitle(&subtitle).await.unwrap();

        let record = store.get_subtitle(subtitle.id).await.unwrap().unwrap();
        assert_eq!(record.kind, SubtitleKind::Vtt);
        assert_eq!(record.subtitles, "WEBVTT\n");
        assert_eq!(record.audio_link, None);
        assert_eq!(store.subtitle_count().await, 1);
    }

    #[tokio::test]
    async fn memory_store_rejects_duplicate_ids() {
        let store = MemoryStore::new();
        let subtitle = new_subtitle();

        store.insert_subtitle(&subtitle).await.unwrap();
        assert!(store.insert_subtitle(&subtitle).await.is_err());
    }

    #[tokio::test]
    async fn memory_store_merges_partial_updates() {
        let store = MemoryStore::new();
        let subtitle = new_subtitle();
        store.insert_subtitle(&subtitle).await.unwrap();

        let matched = store
            .update_subtitle(subtitle.id, &SubtitleChanges::audio_link("https://a.test/x.mp3"))
            .await
            .unwrap();
        assert_eq!(matched, 1);

        let changes = SubtitleChanges {
            subtitles: Some(("1\n00:00:01,000 --> 00:00:02,000\n".to_string(), SubtitleKind::Srt)),
            audio_link: None,
        };
        store.update_subtitle(subtitle.id, &changes).await.unwrap();

        let record = store.get_subtitle(subtitle.id).await.unwrap().unwrap();
        assert_eq!(record.kind, SubtitleKind::Srt);
        assert_eq!(record.audio_link.as_deref(), Some("https://a.test/x.mp3"));
    }

    #[tokio::test]
    async fn memory_store_update_of_unknown_id_matches_nothing() {
        let store = MemoryStore::new();
        let matched = store
            .update_subtitle(Uuid::new_v4(), &SubtitleChanges::audio_link("https://a.test"))
            .await
            .unwrap();
        assert_eq!(matched, 0);
    }

    #[tokio::test]
    async fn memory_store_api_keys_match_exactly() {
        let store = MemoryStore::with_api_keys(["key-1"]);
        store.add_api_key("key-2").await;

        assert!(store.find_api_key("key-1").await.unwrap().is_some());
        assert!(store.find_api_key("key-2").await.unwrap().is_some());
        assert!(store.find_api_key("key").await.unwrap().is_none());
        assert!(store.find_api_key("KEY-1").await.unwrap().is_none());
    }
}
