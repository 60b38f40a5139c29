//! API key domain - DB queries for API keys

use sqlx::{Executor, Postgres};

#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct ApiKey {
    pub key: String,
}

/// Look up an API key by exact match
pub async fn find_api_key<'e, E>(
    executor: E,
    table: &str,
    key: &str,
) -> Result<Option<ApiKey>, sqlx::Error>
where
    E: Executor<'e, Database = Postgres>,
{
    let sql = format!("SELECT key FROM {table} WHERE key = $1 LIMIT 1");

    sqlx::query_as(&sql).bind(key).fetch_optional(executor).await
}
