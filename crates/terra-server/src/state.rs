//! Shared application state for the control API.

use terra_analysis::backend::AnalysisBackend;
use terra_core::simulation::Simulation;
use terra_types::WorldSnapshot;
use tokio::sync::broadcast;

/// State shared by every handler.
///
/// Wrapped in an `Arc` by the router; command processing tasks hold their
/// own clone so they outlive the request that started them.
#[derive(Debug)]
pub struct AppState {
    /// The simulation every endpoint drives.
    pub simulation: Simulation<AnalysisBackend>,
}

impl AppState {
    /// Wrap a simulation.
    pub const fn new(simulation: Simulation<AnalysisBackend>) -> Self {
        Self { simulation }
    }

    /// Subscribe to snapshots published after every state change.
    pub fn subscribe(&self) -> broadcast::Receiver<WorldSnapshot> {
        self.simulation.subscribe()
    }
}
