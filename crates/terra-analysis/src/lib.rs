//! Analysis service clients for the Terra simulation.
//!
//! The engine talks to its analysis service through the
//! [`AnalysisService`](terra_core::analysis::AnalysisService) trait. This
//! crate provides the HTTP implementation used in production and an enum
//! that selects between it and the in-process stub at startup.
//!
//! # Modules
//!
//! - [`backend`] -- [`AnalysisBackend`] enum dispatch and construction from
//!   configuration.
//! - [`client`] -- [`HttpAnalysisClient`], JSON over HTTP POST.
//!
//! [`AnalysisBackend`]: backend::AnalysisBackend
//! [`HttpAnalysisClient`]: client::HttpAnalysisClient

pub mod backend;
pub mod client;
