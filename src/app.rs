use crate::handlers;
use crate::state::AppState;
use axum::{routing::get, Router};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/tweets/:url_id", get(handlers::tweets))
        .route("/api/urls", get(handlers::get_urls))
        .route("/api/urls/:url_id", get(handlers::get_url))
        .route("/api/health", get(handlers::health))
        .with_state(state)
}
