//! Command history records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::ids::CommandId;

/// One successfully processed command. Immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct CommandRecord {
    /// Unique record identifier.
    pub id: CommandId,
    /// The command text as submitted (trimmed).
    pub command: String,
    /// Analysis text returned by the analysis service.
    pub analysis: String,
    /// Wall-clock time the command completed.
    pub timestamp: DateTime<Utc>,
    /// Seconds from acceptance to completion, including the thinking stage.
    #[serde(rename = "responseTime")]
    pub response_time_secs: f64,
    /// Identifier of the model that analysed the command.
    pub model: String,
}

impl CommandRecord {
    /// Create a record stamped with a fresh id and the current time.
    pub fn new(command: String, analysis: String, response_time_secs: f64, model: String) -> Self {
        Self {
            id: CommandId::new(),
            command,
            analysis,
            timestamp: Utc::now(),
            response_time_secs,
            model,
        }
    }
}
