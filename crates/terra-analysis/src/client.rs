//! HTTP client for the analysis service.
//!
//! Sends `{command, currentMetrics, pollutionLevel, model}` as a JSON POST
//! to the configured URL. Any 2xx body is validated with
//! [`parse_analysis_response`]; everything else is a failure. There are no
//! retries.

use std::time::Duration;

use terra_core::analysis::{
    AnalysisError, AnalysisResult, AnalysisService, parse_analysis_response,
};
use terra_core::config::AnalysisConfig;
use terra_types::AnalysisRequest;
use tracing::debug;

/// Errors that can occur while building a client.
#[derive(Debug, thiserror::Error)]
pub enum ClientBuildError {
    /// The underlying HTTP client could not be constructed.
    #[error("failed to build HTTP client: {0}")]
    Http(#[from] reqwest::Error),
}

/// Analysis service reached over HTTP.
#[derive(Debug, Clone)]
pub struct HttpAnalysisClient {
    client: reqwest::Client,
    api_url: String,
}

impl HttpAnalysisClient {
    /// Create a client posting to `api_url`.
    ///
    /// With a `timeout`, a call that takes longer fails as a transport
    /// error; without one, a call may wait indefinitely.
    ///
    /// # Errors
    ///
    /// Returns [`ClientBuildError`] if the TLS backend cannot be
    /// initialised.
    pub fn new(api_url: String, timeout: Option<Duration>) -> Result<Self, ClientBuildError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            client: builder.build()?,
            api_url,
        })
    }

    /// Create a client from the `analysis` config section.
    ///
    /// # Errors
    ///
    /// Returns [`ClientBuildError`] if the HTTP client cannot be built.
    pub fn from_config(config: &AnalysisConfig) -> Result<Self, ClientBuildError> {
        Self::new(config.api_url.clone(), config.request_timeout())
    }

    /// The URL commands are posted to.
    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    async fn post(&self, request: &AnalysisRequest) -> Result<AnalysisResult, AnalysisError> {
        let response = self
            .client
            .post(&self.api_url)
            .json(request)
            .send()
            .await
            .map_err(|e| AnalysisError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "unable to read error body".to_owned());
            return Err(AnalysisError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| AnalysisError::Transport(e.to_string()))?;
        parse_analysis_response(&body)
    }
}

impl AnalysisService for HttpAnalysisClient {
    async fn analyze(&self, request: AnalysisRequest) -> Result<AnalysisResult, AnalysisError> {
        debug!(
            url = %self.api_url,
            model = %request.model,
            command = %request.command,
            "Posting command to analysis service"
        );
        self.post(&request).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn from_config_uses_configured_url() {
        let config = AnalysisConfig::default();
        let client = HttpAnalysisClient::from_config(&config).unwrap();
        assert_eq!(client.api_url(), "http://localhost:3000/api/process-command");
    }
}
