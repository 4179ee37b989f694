//! Request payload sent to the analysis service.
//!
//! The response side is validated in `terra-core` before anything is merged,
//! so only the outbound shape lives here.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::metrics::EarthMetrics;

/// Body of the `POST` sent to the analysis service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct AnalysisRequest {
    /// Free-text environmental command.
    pub command: String,
    /// Metrics at the moment the request was issued.
    pub current_metrics: EarthMetrics,
    /// Pollution overlay level at the moment the request was issued.
    pub pollution_level: f64,
    /// Model the service should use.
    pub model: String,
}
