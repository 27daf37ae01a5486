//! API Module
//!
//! Thin HTTP boundary over the search and aggregation services.
//! All endpoints are read-only.

pub mod error;
pub mod health;
pub mod log;

use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::repository::RecordStore;

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn RecordStore>,
}

impl AppState {
    pub fn new(store: impl RecordStore + 'static) -> Self {
        Self {
            store: Arc::new(store),
        }
    }
}

/// Create the main API router with all endpoints
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(health::health_check))
        // Search & dashboard
        .route("/logs/search", post(log::search_logs))
        .route("/logs/dashboard", post(log::get_dashboard))
        // Feeds & counts
        .route("/logs/recent", get(log::recent_logs))
        .route("/logs/errors/recent", get(log::recent_errors))
        .route("/logs/levels", get(log::level_counts))
        .route("/logs/count", get(log::count_logs))
        // Add state and middleware
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}
