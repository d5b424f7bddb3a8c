//! gatelog-svc library - token-scan attendance service
//!
//! Wires the identity store, attendance log, and event bus behind an axum
//! router; the scan loop and HTTP server share this state.

use axum::Router;
use gatelog_common::events::EventBus;
use gatelog_common::Clock;
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;

pub mod api;
pub mod attendance;
pub mod scanner;
pub mod store;

use attendance::AttendanceLog;
use store::IdentityStore;

/// Application state shared by HTTP handlers and the scan loop
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<IdentityStore>,
    pub log: Arc<AttendanceLog>,
    pub events: EventBus,
    pub clock: Arc<dyn Clock>,
    /// Root data folder, exposed read-only under /files
    pub data_dir: PathBuf,
}

impl AppState {
    pub fn new(
        store: Arc<IdentityStore>,
        log: Arc<AttendanceLog>,
        events: EventBus,
        clock: Arc<dyn Clock>,
        data_dir: PathBuf,
    ) -> Self {
        Self {
            store,
            log,
            events,
            clock,
            data_dir,
        }
    }
}

/// Build the application router
pub fn build_router(state: AppState) -> Router {
    use axum::routing::{get, post};

    let files = ServeDir::new(state.data_dir.clone());

    Router::new()
        .route("/", get(api::serve_index))
        .route("/static/app.js", get(api::serve_app_js))
        .route("/health", get(api::health_check))
        .route("/events", get(api::event_stream))
        .route("/api/identity", post(api::add_identity))
        .route("/api/identities", get(api::list_identities))
        .nest_service("/files", files)
        .with_state(state)
        .layer(CorsLayer::permissive())
}
