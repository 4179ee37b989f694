//! Analysis service contract and response validation.
//!
//! The analysis service turns a free-text command plus the current state
//! into a new absolute state. The engine treats it as an opaque function
//! behind the [`AnalysisService`] trait. Whatever the transport, a response
//! body must pass [`parse_analysis_response`] before anything is merged:
//! a body with a missing or invalid field is rejected as a whole, never
//! partially applied.
//!
//! [`StubAnalysisService`] echoes the current state back and is used when no
//! real service is configured.

use serde::Deserialize;
use terra_types::{AnalysisRequest, EarthMetrics};

/// Analysis text shown after any failed submission.
pub const FAILURE_MESSAGE: &str = "Error: Failed to process command. Please try again.";

/// Errors that can occur while obtaining an analysis.
///
/// Every variant is handled the same way by the command processor; the
/// distinction only matters for logging.
#[derive(Debug, thiserror::Error)]
pub enum AnalysisError {
    /// The request never produced a response (connect error, timeout, ...).
    #[error("analysis request failed: {0}")]
    Transport(String),

    /// The service answered with a non-success status.
    #[error("analysis service returned {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body, for diagnostics.
        body: String,
    },

    /// A success response whose body failed validation.
    #[error("malformed analysis response: {0}")]
    Malformed(String),
}

/// A validated analysis, ready to merge into the world.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisResult {
    /// The new absolute metrics.
    pub metrics: EarthMetrics,
    /// The new pollution overlay level.
    pub pollution_level: f64,
    /// Human-readable impact analysis.
    pub analysis: String,
    /// Optional event label; `None` clears any previous label.
    pub special_event: Option<String>,
}

/// A source of command analyses.
///
/// Implementations must be shareable across tasks: the command processor
/// runs inside spawned tasks while the control API keeps its own handle.
pub trait AnalysisService: Send + Sync {
    /// Analyse one command against the supplied state.
    ///
    /// # Errors
    ///
    /// Returns [`AnalysisError`] if the service is unreachable, answers
    /// with a non-success status, or returns a body that fails validation.
    fn analyze(
        &self,
        request: AnalysisRequest,
    ) -> impl Future<Output = Result<AnalysisResult, AnalysisError>> + Send;
}

// ---------------------------------------------------------------------------
// Response validation
// ---------------------------------------------------------------------------

/// Success body exactly as the service sends it.
///
/// Populations arrive as JSON numbers that may carry a fractional part or a
/// sign, so everything is read as `f64` and converted after validation.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawAnalysisResponse {
    metrics: RawMetrics,
    pollution_level: f64,
    analysis: String,
    #[serde(default)]
    special_event: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawMetrics {
    co2_level: f64,
    toxicity_level: f64,
    temperature: f64,
    human_population: f64,
    animal_population: f64,
    plant_population: f64,
    ocean_acidity: f64,
    ice_cap_melting: f64,
}

/// Parse and validate a success body from the analysis service.
///
/// Out-of-range values are accepted here and clamped by the metrics store;
/// a negative pollution level is raised to zero. Only structurally invalid
/// bodies are rejected.
///
/// # Errors
///
/// Returns [`AnalysisError::Malformed`] if a field is missing or has the
/// wrong type, or a number is not finite.
pub fn parse_analysis_response(body: &str) -> Result<AnalysisResult, AnalysisError> {
    let raw: RawAnalysisResponse =
        serde_json::from_str(body).map_err(|e| AnalysisError::Malformed(e.to_string()))?;
    validate(raw)
}

fn validate(raw: RawAnalysisResponse) -> Result<AnalysisResult, AnalysisError> {
    let m = raw.metrics;
    let metrics = EarthMetrics {
        co2_level: finite("metrics.co2Level", m.co2_level)?,
        toxicity_level: finite("metrics.toxicityLevel", m.toxicity_level)?,
        temperature: finite("metrics.temperature", m.temperature)?,
        human_population: count("metrics.humanPopulation", m.human_population)?,
        animal_population: count("metrics.animalPopulation", m.animal_population)?,
        plant_population: count("metrics.plantPopulation", m.plant_population)?,
        ocean_acidity: finite("metrics.oceanAcidity", m.ocean_acidity)?,
        ice_cap_melting: finite("metrics.iceCapMelting", m.ice_cap_melting)?,
    };

    let pollution_level = finite("pollutionLevel", raw.pollution_level)?.max(0.0);

    let special_event = raw.special_event.filter(|label| !label.trim().is_empty());

    Ok(AnalysisResult {
        metrics,
        pollution_level,
        analysis: raw.analysis,
        special_event,
    })
}

fn finite(field: &str, value: f64) -> Result<f64, AnalysisError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(AnalysisError::Malformed(format!(
            "{field} is not a finite number"
        )))
    }
}

/// Convert a population number to a count, rounding and clamping at 0.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn count(field: &str, value: f64) -> Result<u64, AnalysisError> {
    let value = finite(field, value)?;
    // Float-to-int `as` casts saturate, so values past u64::MAX land on it.
    Ok(value.max(0.0).round() as u64)
}

// ---------------------------------------------------------------------------
// Stub
// ---------------------------------------------------------------------------

/// An analysis source that changes nothing.
///
/// Returns the submitted state unchanged with a canned analysis text.
/// Used when the engine runs without an analysis service, and in tests.
#[derive(Debug, Clone, Default)]
pub struct StubAnalysisService;

impl StubAnalysisService {
    /// Create a new stub.
    pub const fn new() -> Self {
        Self
    }
}

impl AnalysisService for StubAnalysisService {
    async fn analyze(&self, request: AnalysisRequest) -> Result<AnalysisResult, AnalysisError> {
        Ok(AnalysisResult {
            metrics: request.current_metrics,
            pollution_level: request.pollution_level,
            analysis: format!(
                "No analysis service is connected; \"{}\" had no modelled effect.",
                request.command
            ),
            special_event: None,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn body(metrics: &str, rest: &str) -> String {
        format!(r#"{{"metrics": {metrics}, {rest}}}"#)
    }

    const GOOD_METRICS: &str = r#"{
        "co2Level": 500, "toxicityLevel": 12.5, "temperature": 31.2,
        "humanPopulation": 8999000000, "animalPopulation": 99000000000.0,
        "plantPopulation": 1000000000000, "oceanAcidity": 8.05, "iceCapMelting": 11
    }"#;

    #[test]
    fn parses_valid_body() {
        let json = body(
            GOOD_METRICS,
            r#""pollutionLevel": 40, "analysis": "Trucks everywhere.", "specialEvent": "smog""#,
        );
        let result = parse_analysis_response(&json).unwrap();
        assert!((result.metrics.co2_level - 500.0).abs() < 1e-9);
        assert_eq!(result.metrics.animal_population, 99_000_000_000);
        assert!((result.pollution_level - 40.0).abs() < 1e-9);
        assert_eq!(result.analysis, "Trucks everywhere.");
        assert_eq!(result.special_event.as_deref(), Some("smog"));
    }

    #[test]
    fn null_or_missing_event_means_none() {
        let with_null = body(
            GOOD_METRICS,
            r#""pollutionLevel": 0, "analysis": "ok", "specialEvent": null"#,
        );
        assert_eq!(parse_analysis_response(&with_null).unwrap().special_event, None);

        let missing = body(GOOD_METRICS, r#""pollutionLevel": 0, "analysis": "ok""#);
        assert_eq!(parse_analysis_response(&missing).unwrap().special_event, None);

        let blank = body(
            GOOD_METRICS,
            r#""pollutionLevel": 0, "analysis": "ok", "specialEvent": "  ""#,
        );
        assert_eq!(parse_analysis_response(&blank).unwrap().special_event, None);
    }

    #[test]
    fn missing_metric_field_is_malformed() {
        let json = body(
            r#"{"co2Level": 500}"#,
            r#""pollutionLevel": 0, "analysis": "partial""#,
        );
        assert!(matches!(
            parse_analysis_response(&json),
            Err(AnalysisError::Malformed(_))
        ));
    }

    #[test]
    fn missing_analysis_is_malformed() {
        let json = body(GOOD_METRICS, r#""pollutionLevel": 0"#);
        assert!(matches!(
            parse_analysis_response(&json),
            Err(AnalysisError::Malformed(_))
        ));
    }

    #[test]
    fn wrong_type_is_malformed() {
        let json = body(
            GOOD_METRICS,
            r#""pollutionLevel": "very high", "analysis": "ok""#,
        );
        assert!(matches!(
            parse_analysis_response(&json),
            Err(AnalysisError::Malformed(_))
        ));
    }

    #[test]
    fn negative_pollution_clamps_to_zero() {
        let json = body(GOOD_METRICS, r#""pollutionLevel": -1, "analysis": "ok""#);
        let result = parse_analysis_response(&json).unwrap();
        assert!(result.pollution_level.abs() < f64::EPSILON);
        assert_eq!(result.analysis, "ok");
    }

    #[test]
    fn not_json_is_malformed() {
        assert!(matches!(
            parse_analysis_response("<html>502 Bad Gateway</html>"),
            Err(AnalysisError::Malformed(_))
        ));
    }

    #[test]
    fn negative_population_becomes_zero() {
        let metrics = GOOD_METRICS.replace("8999000000", "-5");
        let json = body(&metrics, r#""pollutionLevel": 0, "analysis": "ok""#);
        let result = parse_analysis_response(&json).unwrap();
        assert_eq!(result.metrics.human_population, 0);
    }

    #[test]
    fn out_of_range_values_pass_through_for_the_store_to_clamp() {
        let metrics = GOOD_METRICS.replace("\"co2Level\": 500", "\"co2Level\": 9000");
        let json = body(&metrics, r#""pollutionLevel": 0, "analysis": "ok""#);
        let result = parse_analysis_response(&json).unwrap();
        assert!((result.metrics.co2_level - 9000.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn stub_echoes_state() {
        let stub = StubAnalysisService::new();
        let request = AnalysisRequest {
            command: "God saves the Earth".to_owned(),
            current_metrics: EarthMetrics::INITIAL,
            pollution_level: 3.0,
            model: "llama3.2:1b".to_owned(),
        };
        let result = stub.analyze(request).await.unwrap();
        assert_eq!(result.metrics, EarthMetrics::INITIAL);
        assert!((result.pollution_level - 3.0).abs() < 1e-9);
        assert!(result.analysis.contains("God saves the Earth"));
        assert_eq!(result.special_event, None);
    }
}
