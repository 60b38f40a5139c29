//! Subtitles domain - DB queries for subtitle records
//!
//! All functions use the generic Executor pattern, allowing them to work with
//! both `&PgPool` (for standalone queries) and `&mut PgConnection` (for transactions).
//! The table name comes from `TableNames`, never from request input.

use sqlx::{Executor, Postgres};
use uuid::Uuid;

use super::format::SubtitleKind;

/// A stored subtitle record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubtitleRecord {
    pub id: Uuid,
    pub kind: SubtitleKind,
    pub subtitles: String,
    pub audio_link: Option<String>,
}

/// Values written on upload
#[derive(Debug, Clone)]
pub struct NewSubtitle {
    pub id: Uuid,
    pub kind: SubtitleKind,
    pub subtitles: String,
}

/// Partial update applied by id. `None` leaves the column untouched.
#[derive(Debug, Clone, Default)]
pub struct SubtitleChanges {
    pub subtitles: Option<(String, SubtitleKind)>,
    pub audio_link: Option<String>,
}

impl SubtitleChanges {
    pub fn audio_link(link: impl Into<String>) -> Self {
        Self {
            audio_link: Some(link.into()),
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.subtitles.is_none() && self.audio_link.is_none()
    }
}

#[derive(Debug, sqlx::FromRow)]
pub struct SubtitleRow {
    pub id: Uuid,
    pub kind: String,
    pub subtitles: String,
    pub audio_link: Option<String>,
}

impl TryFrom<SubtitleRow> for SubtitleRecord {
    type Error = super::format::UnknownKind;

    fn try_from(row: SubtitleRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id,
            kind: row.kind.parse()?,
            subtitles: row.subtitles,
            audio_link: row.audio_link,
        })
    }
}

/// Insert a new subtitle record
pub async fn insert_subtitle<'e, E>(
    executor: E,
    table: &str,
    subtitle: &NewSubtitle,
) -> Result<(), sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    let sql = format!(
        r#"
        INSERT INTO {table} (id, kind, subtitles)
        VALUES ($1, $2, $3)
        "#
    );

    sqlx::query(&sql)
        .bind(subtitle.id)
        .bind(subtitle.kind.as_str())
        .bind(&subtitle.subtitles)
        .execute(executor)
        .await?;

    Ok(())
}

/// Apply a partial update by id. Returns the number of rows matched.
pub async fn update_subtitle<'e, E>(
    executor: E,
    table: &str,
    id: Uuid,
    changes: &SubtitleChanges,
) -> Result<u64, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    let sql = format!(
        r#"
        UPDATE {table}
        SET subtitles = COALESCE($2, subtitles),
            kind = COALESCE($3, kind),
            audio_link = COALESCE($4, audio_link)
        WHERE id = $1
        "#
    );

    let (subtitles, kind) = match &changes.subtitles {
        Some((text, kind)) => (Some(text.as_str()), Some(kind.as_str())),
        None => (None, None),
    };

    let result = sqlx::query(&sql)
        .bind(id)
        .bind(subtitles)
        .bind(kind)
        .bind(changes.audio_link.as_deref())
        .execute(executor)
        .await?;

    Ok(result.rows_affected())
}

/// Get a subtitle row by id
pub async fn get_subtitle<'e, E>(
    executor: E,
    table: &str,
    id: Uuid,
) -> Result<Option<SubtitleRow>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    let sql = format!(
        r#"
        SELECT id, kind, subtitles, audio_link FROM {table}
        WHERE id = $1
        "#
    );

    sqlx::query_as(&sql).bind(id).fetch_optional(executor).await
}
