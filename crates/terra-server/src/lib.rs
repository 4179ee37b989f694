//! Control API server for the Terra simulation.
//!
//! This crate provides an Axum HTTP server that exposes:
//!
//! - **`WebSocket` endpoint** (`/ws/state`) streaming a [`WorldSnapshot`]
//!   after every state change via [`tokio::sync::broadcast`]
//! - **REST endpoints** for reading the state and history, submitting
//!   commands, driving the decay ticker, and choosing the analysis model
//!
//! # Architecture
//!
//! Every handler goes through one shared [`Simulation`]; the server adds no
//! simulation semantics of its own. Commands are accepted synchronously and
//! processed in a spawned task, so `POST /api/commands` answers as soon as
//! the command is admitted.
//!
//! [`WorldSnapshot`]: terra_types::WorldSnapshot
//! [`Simulation`]: terra_core::simulation::Simulation

pub mod error;
pub mod handlers;
pub mod router;
pub mod server;
pub mod state;
pub mod ws;

// Re-export primary types for convenience.
pub use router::build_router;
pub use server::{ServerError, start_server};
pub use state::AppState;
