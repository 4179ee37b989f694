//! Terra server binary.
//!
//! Wires the simulation engine to its analysis backend and serves the
//! control API.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `TERRA_CONFIG` or `terra-config.yaml`
//! 2. Initialize structured logging (tracing)
//! 3. Build the analysis backend
//! 4. Create the simulation, starting decay if `autostart` is set
//! 5. Serve the control API until `Ctrl-C`

use std::path::PathBuf;
use std::sync::Arc;

use terra_analysis::backend::AnalysisBackend;
use terra_core::config::{ConfigSource, TerraConfig};
use terra_core::simulation::Simulation;
use terra_server::{AppState, start_server};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Default configuration file, relative to the working directory.
const DEFAULT_CONFIG_PATH: &str = "terra-config.yaml";

/// Application entry point.
///
/// # Errors
///
/// Returns an error if configuration is invalid, the analysis backend
/// cannot be built, or the server fails to bind.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Load configuration.
    let config_path = std::env::var_os("TERRA_CONFIG")
        .map_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH), PathBuf::from);
    let (config, source) = TerraConfig::load_or_default(&config_path)?;

    // 2. Initialize structured logging; RUST_LOG wins over the config.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.logging.level)),
        )
        .with_target(true)
        .init();

    if source == ConfigSource::Defaults {
        info!(path = %config_path.display(), "Config file not found, using defaults");
    }
    info!(
        path = %config_path.display(),
        decay_interval_ms = config.simulation.decay_interval_ms,
        thinking_step_ms = config.simulation.thinking_step_ms,
        model = %config.analysis.model,
        "Configuration loaded"
    );

    // 3. Build the analysis backend.
    let backend = AnalysisBackend::from_config(&config.analysis)?;

    // 4. Create the simulation.
    let simulation = Simulation::new(&config.simulation, config.analysis.model.clone(), backend);
    if config.simulation.autostart {
        simulation.start();
    }
    let state = Arc::new(AppState::new(simulation));

    // 5. Serve.
    start_server(&config.server, state).await?;

    info!("terra-server stopped");
    Ok(())
}
