//! Axum router construction for the control API.
//!
//! Assembles all routes (REST + `WebSocket`) into a single [`Router`]
//! with CORS middleware enabled for cross-origin client access.

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;
use crate::ws;

/// Build the complete Axum router for the control API.
///
/// See [`handlers`] for the REST endpoint table; `GET /ws/state` streams
/// snapshots. CORS allows any origin so a globe client served from
/// elsewhere can connect.
pub fn build_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // WebSocket
        .route("/ws/state", get(ws::ws_state))
        // State
        .route("/api/state", get(handlers::get_state))
        .route("/api/history", get(handlers::get_history))
        .route("/api/commands", post(handlers::submit_command))
        // Ticker
        .route("/api/simulation/start", post(handlers::start))
        .route("/api/simulation/pause", post(handlers::pause))
        .route("/api/simulation/toggle", post(handlers::toggle))
        .route("/api/simulation/reset", post(handlers::reset))
        // Catalog
        .route("/api/examples", get(handlers::list_examples))
        .route("/api/models", get(handlers::list_models))
        .route("/api/models/select", post(handlers::select_model))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
