//! Point-in-time view of the whole simulation.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::enums::{ProcessorPhase, TickerState};
use crate::metrics::EarthMetrics;
use crate::record::CommandRecord;

/// Everything a client needs to render the current state.
///
/// Produced by the engine after every change and pushed over the state
/// stream; also served by `GET /api/state`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct WorldSnapshot {
    /// Current bounded metrics.
    pub metrics: EarthMetrics,
    /// Pollution overlay intensity.
    pub pollution_level: f64,
    /// Analysis text of the latest command (or the failure message).
    pub analysis: String,
    /// Label attached to the latest successful command, if any.
    pub special_event: Option<String>,
    /// Processed commands, newest first.
    pub history: Vec<CommandRecord>,
    /// Cosmetic step labels revealed so far for the command in flight.
    pub thinking_log: Vec<String>,
    /// Current processor phase.
    pub phase: ProcessorPhase,
    /// Current decay ticker state.
    pub ticker: TickerState,
    /// Model used for the next command.
    pub model: String,
}
