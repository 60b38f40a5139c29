#![allow(dead_code)]

use async_trait::async_trait;
use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode, header},
};
use chrono::Duration;
use serde_json::Value;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use tower::ServiceExt;
use uuid::Uuid;

use subtitles_api::domain::api_keys::ApiKey;
use subtitles_api::domain::subtitles::{NewSubtitle, SubtitleChanges, SubtitleRecord};
use subtitles_api::services::session::{JwtSessions, create_access_token};
use subtitles_api::services::store::{MemoryStore, Store, StoreError};
use subtitles_api::{AppState, build_app};

pub const SECRET: &[u8] = b"integration-secret";
pub const API_KEY: &str = "sm_test_key";

/// Wraps `MemoryStore`, counting calls and failing on demand
#[derive(Default)]
pub struct FlakyStore {
    pub inner: MemoryStore,
    pub fail_inserts: AtomicBool,
    pub fail_updates: AtomicBool,
    pub fail_key_lookups: AtomicBool,
    pub inserts: AtomicUsize,
    pub updates: AtomicUsize,
    pub key_lookups: AtomicUsize,
}

impl FlakyStore {
    pub fn with_api_key(key: &str) -> Self {
        Self {
            inner: MemoryStore::with_api_keys([key]),
            ..Default::default()
        }
    }

    pub fn writes(&self) -> usize {
        self.inserts.load(Ordering::SeqCst) + self.updates.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Store for FlakyStore {
    async fn insert_subtitle(&self, subtitle: &NewSubtitle) -> Result<(), StoreError> {
        self.inserts.fetch_add(1, Ordering::SeqCst);
        if self.fail_inserts.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("insert failed: connection reset".into()));
        }
        self.inner.insert_subtitle(subtitle).await
    }

    async fn update_subtitle(
        &self,
        id: Uuid,
        changes: &SubtitleChanges,
    ) -> Result<u64, StoreError> {
        self.updates.fetch_add(1, Ordering::SeqCst);
        if self.fail_updates.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("update failed: connection reset".into()));
        }
        self.inner.update_subtitle(id, changes).await
    }

    async fn get_subtitle(&self, id: Uuid) -> Result<Option<SubtitleRecord>, StoreError> {
        self.inner.get_subtitle(id).await
    }

    async fn find_api_key(&self, key: &str) -> Result<Option<ApiKey>, StoreError> {
        self.key_lookups.fetch_add(1, Ordering::SeqCst);
        if self.fail_key_lookups.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("datastore unreachable".into()));
        }
        self.inner.find_api_key(key).await
    }
}

pub struct TestApp {
    pub app: Router,
    pub store: Arc<FlakyStore>,
}

pub fn test_app() -> TestApp {
    let store = Arc::new(FlakyStore::with_api_key(API_KEY));
    let state = AppState {
        store: store.clone(),
        sessions: Arc::new(JwtSessions::new(SECRET)),
    };

    TestApp {
        app: build_app(state),
        store,
    }
}

pub enum Auth<'a> {
    None,
    Bearer(&'a str),
    Header(&'a str),
    Session(String),
}

pub fn session_cookie() -> Auth<'static> {
    let token = create_access_token("user-1", SECRET, Duration::minutes(10))
        .expect("token should encode");
    Auth::Session(token)
}

pub async fn post_json(app: &Router, path: &str, body: &str, auth: Auth<'_>) -> (StatusCode, Value) {
    post_body(app, path, body, Some("application/json"), auth).await
}

/// Like `post_json` with an arbitrary (or missing) `Content-Type`
pub async fn post_body(
    app: &Router,
    path: &str,
    body: &str,
    content_type: Option<&str>,
    auth: Auth<'_>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method("POST").uri(path);

    if let Some(content_type) = content_type {
        builder = builder.header(header::CONTENT_TYPE, content_type);
    }

    builder = match auth {
        Auth::None => builder,
        Auth::Bearer(key) => builder.header(header::AUTHORIZATION, format!("Bearer {}", key)),
        Auth::Header(value) => builder.header(header::AUTHORIZATION, value),
        Auth::Session(token) => builder.header(header::COOKIE, format!("access_token={}", token)),
    };

    let request = builder
        .body(Body::from(body.to_string()))
        .expect("request should build");

    let response = app.clone().oneshot(request).await.expect("router is infallible");
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body should read");
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);

    (status, json)
}
