//! REST API handlers.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET` | `/api/state` | Full snapshot |
//! | `POST` | `/api/commands` | Submit a command |
//! | `GET` | `/api/history` | Processed commands, newest first |
//! | `POST` | `/api/simulation/start` | Start passive decay |
//! | `POST` | `/api/simulation/pause` | Pause passive decay |
//! | `POST` | `/api/simulation/toggle` | Start or pause |
//! | `POST` | `/api/simulation/reset` | Restore the initial state |
//! | `GET` | `/api/examples` | Example commands, optionally filtered |
//! | `GET` | `/api/models` | Model catalog and current selection |
//! | `POST` | `/api/models/select` | Choose the model for future commands |

use std::sync::Arc;

use axum::Json;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use terra_core::catalog;
use terra_core::processor::SubmitOutcome;
use terra_types::{CommandRecord, ModelInfo, TickerState, WorldSnapshot};
use tracing::debug;

use crate::error::ApiError;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `POST /api/commands`.
#[derive(Debug, serde::Deserialize)]
pub struct CommandRequest {
    /// Free-text environmental command.
    pub command: String,
}

/// Response body for an accepted command.
#[derive(Debug, serde::Serialize)]
pub struct CommandAccepted {
    /// The command as it will be processed (trimmed).
    pub command: String,
}

/// Response body for the ticker controls.
#[derive(Debug, serde::Serialize)]
pub struct TickerResponse {
    /// Ticker state after the call.
    pub ticker: TickerState,
    /// Whether the call changed the state.
    pub changed: bool,
}

/// Query parameters for `GET /api/examples`.
#[derive(Debug, Default, serde::Deserialize)]
pub struct ExamplesQuery {
    /// Case-insensitive substring to match.
    pub filter: Option<String>,
}

/// Response body for `GET /api/models`.
#[derive(Debug, serde::Serialize)]
pub struct ModelsResponse {
    /// Every known model.
    pub models: Vec<ModelInfo>,
    /// Model used for the next command.
    pub selected: String,
}

/// Request body for `POST /api/models/select`.
#[derive(Debug, serde::Deserialize)]
pub struct SelectModelRequest {
    /// Model identifier from the catalog.
    pub model: String,
}

// ---------------------------------------------------------------------------
// State and history
// ---------------------------------------------------------------------------

/// Return the full simulation snapshot.
pub async fn get_state(State(state): State<Arc<AppState>>) -> Json<WorldSnapshot> {
    Json(state.simulation.snapshot())
}

/// Return the command history, newest first.
pub async fn get_history(State(state): State<Arc<AppState>>) -> Json<Vec<CommandRecord>> {
    Json(state.simulation.history())
}

// ---------------------------------------------------------------------------
// POST /api/commands
// ---------------------------------------------------------------------------

/// Admit a command and process it in the background.
///
/// Returns `202 Accepted` once the command is admitted; progress and the
/// result are visible through `/api/state` and `/ws/state`.
pub async fn submit_command(
    State(state): State<Arc<AppState>>,
    Json(request): Json<CommandRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let ticket = state.simulation.begin(&request.command)?;
    let command = ticket.command().to_owned();

    let task_state = Arc::clone(&state);
    tokio::spawn(async move {
        let outcome = task_state.simulation.run(ticket).await;
        if let SubmitOutcome::Applied(record) = outcome {
            debug!(id = %record.id, "Background command finished");
        }
    });

    Ok((StatusCode::ACCEPTED, Json(CommandAccepted { command })))
}

// ---------------------------------------------------------------------------
// Ticker controls
// ---------------------------------------------------------------------------

/// Start passive decay.
pub async fn start(State(state): State<Arc<AppState>>) -> Json<TickerResponse> {
    let changed = state.simulation.start();
    Json(TickerResponse {
        ticker: state.simulation.ticker_state(),
        changed,
    })
}

/// Pause passive decay.
pub async fn pause(State(state): State<Arc<AppState>>) -> Json<TickerResponse> {
    let changed = state.simulation.pause();
    Json(TickerResponse {
        ticker: state.simulation.ticker_state(),
        changed,
    })
}

/// Flip the ticker between running and stopped.
pub async fn toggle(State(state): State<Arc<AppState>>) -> Json<TickerResponse> {
    Json(TickerResponse {
        ticker: state.simulation.toggle(),
        changed: true,
    })
}

/// Restore the initial state and return it.
pub async fn reset(State(state): State<Arc<AppState>>) -> Json<WorldSnapshot> {
    Json(state.simulation.reset())
}

// ---------------------------------------------------------------------------
// Catalog
// ---------------------------------------------------------------------------

/// List example commands, optionally filtered.
pub async fn list_examples(Query(query): Query<ExamplesQuery>) -> Json<Vec<&'static str>> {
    Json(catalog::filter_examples(
        query.filter.as_deref().unwrap_or_default(),
    ))
}

/// List models and the current selection.
pub async fn list_models(State(state): State<Arc<AppState>>) -> Json<ModelsResponse> {
    Json(ModelsResponse {
        models: catalog::models(),
        selected: state.simulation.model(),
    })
}

/// Select the model for future commands.
pub async fn select_model(
    State(state): State<Arc<AppState>>,
    Json(request): Json<SelectModelRequest>,
) -> Result<Json<ModelInfo>, ApiError> {
    Ok(Json(state.simulation.select_model(&request.model)?))
}
