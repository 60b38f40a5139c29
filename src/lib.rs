//! Authenticated HTTP API for uploading SRT/VTT subtitle files, linking them
//! to audio, and updating stored subtitle records.

pub mod config;
pub mod constants;
pub mod domain;
pub mod routes;
pub mod services;

use axum::{
    Json, Router,
    extract::DefaultBodyLimit,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use std::any::Any;
use std::sync::Arc;
use tower_http::{catch_panic::CatchPanicLayer, trace::TraceLayer};

use constants::MAX_SUBTITLE_UPLOAD_SIZE;
use services::session::SessionProvider;
use services::store::Store;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub sessions: Arc<dyn SessionProvider>,
}

/// Assemble the router with its middleware stack
pub fn build_app(state: AppState) -> Router {
    routes::build_routes()
        .layer(DefaultBodyLimit::max(MAX_SUBTITLE_UPLOAD_SIZE))
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(TraceLayer::new_for_http())
        .with_state(Arc::new(state))
}

fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let message = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "Unknown error has occurred.".to_string()
    };

    tracing::error!("Handler panicked: {}", message);

    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "error": message })),
    )
        .into_response()
}
