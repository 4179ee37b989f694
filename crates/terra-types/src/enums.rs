//! Enumeration types for the Terra simulation.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Phase of the command processor.
///
/// A command moves `Idle -> Thinking -> AwaitingAnalysis -> Applying -> Idle`.
/// A failed analysis returns straight to `Idle`; the failure is reported
/// through the submission outcome rather than a resting phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum ProcessorPhase {
    /// No command in flight. The only phase in which decay ticks land.
    #[default]
    Idle,
    /// Revealing the cosmetic step labels.
    Thinking,
    /// Waiting for the analysis service to answer.
    AwaitingAnalysis,
    /// Merging a successful analysis into the world.
    Applying,
}

impl ProcessorPhase {
    /// Whether a command is currently in flight.
    pub const fn is_busy(self) -> bool {
        !matches!(self, Self::Idle)
    }
}

/// State of the passive decay ticker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum TickerState {
    /// No timer is armed.
    #[default]
    Stopped,
    /// The decay timer fires every period.
    Running,
}
