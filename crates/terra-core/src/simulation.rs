//! The simulation facade.
//!
//! [`Simulation`] owns the shared world, the decay ticker, and the command
//! processor, and is the only handle the control surface needs. It is
//! designed to be wrapped in an `Arc` and shared across request handlers.

use std::sync::Arc;

use terra_types::{CommandRecord, EarthMetrics, ModelInfo, TickerState, WorldSnapshot};
use tokio::sync::broadcast;
use tracing::info;

use crate::analysis::AnalysisService;
use crate::catalog::{self, ModelSelectError};
use crate::config::SimulationConfig;
use crate::decay::PassiveDecayTicker;
use crate::processor::{CommandProcessor, Rejection, SubmitOutcome, Ticket};
use crate::world::SharedWorld;

/// A running earth-state simulation.
#[derive(Debug)]
pub struct Simulation<A> {
    world: Arc<SharedWorld>,
    ticker: PassiveDecayTicker,
    processor: CommandProcessor<A>,
}

impl<A: AnalysisService> Simulation<A> {
    /// Create a simulation at the initial state with the ticker stopped.
    ///
    /// `model` is used for commands until [`Simulation::select_model`]
    /// changes it; it need not appear in the catalog.
    pub fn new(config: &SimulationConfig, model: String, analysis: A) -> Self {
        let world = Arc::new(SharedWorld::new(model));
        Self {
            ticker: PassiveDecayTicker::new(Arc::clone(&world), config.decay_interval()),
            processor: CommandProcessor::new(Arc::clone(&world), analysis, config.thinking_step()),
            world,
        }
    }

    /// Snapshot of the whole state.
    pub fn snapshot(&self) -> WorldSnapshot {
        self.world.snapshot()
    }

    /// Current metrics.
    pub fn metrics(&self) -> EarthMetrics {
        self.world.lock().store.get()
    }

    /// Processed commands, newest first.
    pub fn history(&self) -> Vec<CommandRecord> {
        self.world.lock().history.to_vec()
    }

    /// Model used for the next command.
    pub fn model(&self) -> String {
        self.world.lock().model.clone()
    }

    /// Subscribe to a snapshot after every state change.
    pub fn subscribe(&self) -> broadcast::Receiver<WorldSnapshot> {
        self.world.subscribe()
    }

    /// The analysis service in use.
    pub const fn analysis(&self) -> &A {
        self.processor.analysis()
    }

    /// Start (or resume) passive decay. Returns `false` if already running.
    pub fn start(&self) -> bool {
        self.ticker.start()
    }

    /// Pause passive decay. Returns `false` if it was not running.
    ///
    /// A command already in flight is not affected.
    pub fn pause(&self) -> bool {
        self.ticker.stop()
    }

    /// Current ticker state.
    pub fn ticker_state(&self) -> TickerState {
        self.ticker.state()
    }

    /// Start if stopped, pause if running. Returns the new state.
    pub fn toggle(&self) -> TickerState {
        self.ticker.toggle()
    }

    /// Restore the initial state and stop the ticker.
    ///
    /// Callable in any state. A command in flight is abandoned and its
    /// result never lands. Resetting twice is the same as resetting once.
    pub fn reset(&self) -> WorldSnapshot {
        let snapshot = {
            let mut state = self.world.lock();
            state.reset();
            self.ticker.cancel_task(&state);
            self.world.publish(&state);
            state.snapshot()
        };
        info!("Simulation reset");
        snapshot
    }

    /// Accept a command without running it.
    ///
    /// # Errors
    ///
    /// Returns a [`Rejection`] when the command is blank or another command
    /// is in flight.
    pub fn begin(&self, command: &str) -> Result<Ticket, Rejection> {
        self.processor.begin(command)
    }

    /// Run a command accepted by [`Simulation::begin`].
    pub async fn run(&self, ticket: Ticket) -> SubmitOutcome {
        self.processor.run(ticket).await
    }

    /// Accept and run a command.
    pub async fn submit(&self, command: &str) -> SubmitOutcome {
        self.processor.submit(command).await
    }

    /// Switch the model used for subsequent commands.
    ///
    /// # Errors
    ///
    /// Returns [`ModelSelectError`] when the model is unknown or disabled,
    /// or a command is in flight.
    pub fn select_model(&self, id: &str) -> Result<ModelInfo, ModelSelectError> {
        let model = catalog::selectable(id)?;
        let mut state = self.world.lock();
        if state.phase.is_busy() {
            return Err(ModelSelectError::Busy);
        }
        state.model.clone_from(&model.id);
        self.world.publish(&state);
        info!(model = %model.id, "Model selected");
        Ok(model)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::time::Duration;

    use terra_types::ProcessorPhase;

    use super::*;
    use crate::analysis::StubAnalysisService;
    use crate::catalog::DEFAULT_MODEL;

    fn simulation() -> Simulation<StubAnalysisService> {
        let config = SimulationConfig {
            thinking_step_ms: 0,
            ..SimulationConfig::default()
        };
        Simulation::new(&config, DEFAULT_MODEL.to_owned(), StubAnalysisService::new())
    }

    #[tokio::test(start_paused = true)]
    async fn toggle_flips_ticker() {
        let sim = simulation();
        assert_eq!(sim.toggle(), TickerState::Running);
        assert_eq!(sim.snapshot().ticker, TickerState::Running);
        assert_eq!(sim.toggle(), TickerState::Stopped);
        assert_eq!(sim.snapshot().ticker, TickerState::Stopped);
    }

    #[tokio::test(start_paused = true)]
    async fn reset_stops_ticker_and_cancels_pending_tick() {
        let sim = simulation();
        assert!(sim.start());
        tokio::time::sleep(Duration::from_millis(4_000)).await;
        let snap = sim.reset();
        assert_eq!(snap.ticker, TickerState::Stopped);

        tokio::time::sleep(Duration::from_secs(30)).await;
        assert_eq!(sim.metrics(), EarthMetrics::INITIAL);
    }

    #[tokio::test(start_paused = true)]
    async fn restart_after_reset_keeps_decaying() {
        let sim = simulation();
        assert!(sim.start());
        sim.reset();
        assert!(sim.start());
        assert_eq!(sim.ticker_state(), TickerState::Running);

        tokio::time::sleep(Duration::from_millis(5_001)).await;
        assert!((sim.metrics().co2_level - 415.1).abs() < 1e-9);
        assert!(!sim.start());
        assert!(sim.pause());
        assert_eq!(sim.ticker_state(), TickerState::Stopped);
    }

    #[tokio::test(start_paused = true)]
    async fn concurrent_toggles_alternate() {
        let sim = Arc::new(simulation());
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let sim = Arc::clone(&sim);
                tokio::spawn(async move { sim.toggle() })
            })
            .collect();
        let mut states = Vec::new();
        for handle in handles {
            states.push(handle.await.unwrap());
        }
        // Each toggle observes the previous one, so the results alternate.
        let running = states.iter().filter(|s| **s == TickerState::Running).count();
        assert_eq!(running, 2);
        assert_eq!(sim.ticker_state(), TickerState::Stopped);
    }

    #[tokio::test]
    async fn disabled_model_cannot_be_selected() {
        let sim = simulation();
        assert_eq!(
            sim.select_model("deepseek-r1:8b"),
            Err(ModelSelectError::Disabled("deepseek-r1:8b".to_owned()))
        );
        assert_eq!(sim.model(), DEFAULT_MODEL);
    }

    #[tokio::test]
    async fn model_selection_is_rejected_while_busy() {
        let sim = simulation();
        let ticket = sim.begin("Start a nuclear war").unwrap();
        assert_eq!(sim.select_model(DEFAULT_MODEL), Err(ModelSelectError::Busy));
        assert!(matches!(sim.run(ticket).await, SubmitOutcome::Applied(_)));
        assert_eq!(sim.select_model(DEFAULT_MODEL).unwrap().id, DEFAULT_MODEL);
    }

    #[tokio::test]
    async fn model_survives_reset_and_is_recorded() {
        let sim = Simulation::new(
            &SimulationConfig {
                thinking_step_ms: 0,
                ..SimulationConfig::default()
            },
            "custom:7b".to_owned(),
            StubAnalysisService::new(),
        );
        let SubmitOutcome::Applied(record) = sim.submit("God saves the Earth").await else {
            panic!("expected Applied");
        };
        assert_eq!(record.model, "custom:7b");
        let snap = sim.reset();
        assert_eq!(snap.model, "custom:7b");
        assert_eq!(snap.phase, ProcessorPhase::Idle);
    }
}
