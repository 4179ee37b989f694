//! Backend selection.
//!
//! Uses enum dispatch instead of trait objects because
//! [`AnalysisService::analyze`] returns `impl Future` and is therefore not
//! dyn-compatible.

use terra_core::analysis::{AnalysisError, AnalysisResult, AnalysisService, StubAnalysisService};
use terra_core::config::{AnalysisBackendKind, AnalysisConfig};
use terra_types::AnalysisRequest;
use tracing::info;

use crate::client::{ClientBuildError, HttpAnalysisClient};

/// The analysis service chosen at startup.
#[derive(Debug, Clone)]
pub enum AnalysisBackend {
    /// Remote service over HTTP.
    Http(HttpAnalysisClient),
    /// In-process stub that echoes the state back.
    Stub(StubAnalysisService),
}

impl AnalysisBackend {
    /// Build the backend named by `config.backend`.
    ///
    /// # Errors
    ///
    /// Returns [`ClientBuildError`] if the HTTP client cannot be built.
    pub fn from_config(config: &AnalysisConfig) -> Result<Self, ClientBuildError> {
        let backend = match config.backend {
            AnalysisBackendKind::Http => Self::Http(HttpAnalysisClient::from_config(config)?),
            AnalysisBackendKind::Stub => Self::Stub(StubAnalysisService::new()),
        };
        info!(
            backend = backend.name(),
            api_url = %config.api_url,
            "Analysis backend configured"
        );
        Ok(backend)
    }

    /// Human-readable name for logging.
    pub const fn name(&self) -> &str {
        match self {
            Self::Http(_) => "http",
            Self::Stub(_) => "stub",
        }
    }
}

impl AnalysisService for AnalysisBackend {
    async fn analyze(&self, request: AnalysisRequest) -> Result<AnalysisResult, AnalysisError> {
        match self {
            Self::Http(client) => client.analyze(request).await,
            Self::Stub(stub) => stub.analyze(request).await,
        }
    }
}
