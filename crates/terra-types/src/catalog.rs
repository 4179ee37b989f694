//! Model descriptors offered to the client.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// An analysis model the client may select.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct ModelInfo {
    /// Identifier sent to the analysis service (e.g. `llama3.2:1b`).
    pub id: String,
    /// Display name.
    pub name: String,
    /// Short description of the speed/accuracy trade-off.
    pub description: String,
    /// Whether the model can currently be selected.
    pub enabled: bool,
}
