//! Shared type definitions for the Terra earth-state simulation.
//!
//! This crate is the single source of truth for every type that crosses a
//! boundary: the analysis service wire format, the control API, and the
//! state stream consumed by the globe client. Types flow to `TypeScript`
//! via `ts-rs`.
//!
//! # Modules
//!
//! - [`ids`] -- Type-safe UUID wrapper for command records
//! - [`enums`] -- Processor phase and ticker state
//! - [`metrics`] -- [`EarthMetrics`], per-field bounds, and decay deltas
//! - [`record`] -- [`CommandRecord`], one entry of the command history
//! - [`analysis`] -- Request payload sent to the analysis service
//! - [`snapshot`] -- [`WorldSnapshot`] served to clients
//! - [`catalog`] -- Model descriptors offered to the client

pub mod analysis;
pub mod catalog;
pub mod enums;
pub mod ids;
pub mod metrics;
pub mod record;
pub mod snapshot;

// Re-export all public types at crate root for convenience.
pub use analysis::AnalysisRequest;
pub use catalog::ModelInfo;
pub use enums::{ProcessorPhase, TickerState};
pub use ids::CommandId;
pub use metrics::{Bound, EarthMetrics, MetricsDelta};
pub use record::CommandRecord;
pub use snapshot::WorldSnapshot;
