pub mod health;

use axum::{
    http::Uri,
    routing::{get, post},
    Router,
};

use crate::errors::AppError;
use crate::matching::handlers;
use crate::state::AppState;

async fn not_found(uri: Uri) -> AppError {
    AppError::NotFound(format!("No route for {uri}"))
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Matching API
        .route("/api/recommend", post(handlers::handle_recommend))
        .route("/api/suggest", get(handlers::handle_suggest))
        .route("/api/careers/skills", get(handlers::handle_career_skills))
        .route("/api/chat", post(handlers::handle_chat))
        .fallback(not_found)
        .with_state(state)
}
