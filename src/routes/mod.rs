pub mod auth;
pub mod health;
pub mod subtitles;
pub mod validated_json;

use axum::Router;
use std::sync::Arc;

use crate::AppState;

/// Build all routes for the API
pub fn build_routes() -> Router<Arc<AppState>> {
    Router::new()
        .merge(health::routes())
        .merge(subtitles::routes())
}
