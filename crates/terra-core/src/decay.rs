//! Passive decay ticker.
//!
//! While running, a fixed-period timer nudges the metrics toward collapse by
//! [`DECAY_PER_TICK`]. A tick only lands when the command processor is
//! `Idle`; a tick that fires while a command is in flight is dropped, not
//! queued.
//!
//! # Cancellation
//!
//! Each start opens a new *run* identified by `ticker_run` in the world
//! state. The timer task re-checks its run id under the world lock before
//! every tick, so once [`PassiveDecayTicker::stop`] (or a reset) has
//! returned, no tick from the old run can land even if its timer had
//! already fired. The task is also aborted so it stops consuming timer
//! wakeups.
//!
//! Start, stop, toggle and the task abort after a reset all run under the
//! world lock, so a stop racing a start can never abort the newer task.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use terra_types::{MetricsDelta, TickerState};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};

use crate::world::{SharedWorld, WorldState};

/// Default decay period.
pub const DEFAULT_DECAY_INTERVAL: Duration = Duration::from_millis(5_000);

/// Shortest accepted decay period.
pub const MIN_DECAY_INTERVAL: Duration = Duration::from_millis(1);

/// Change applied by one decay tick.
pub const DECAY_PER_TICK: MetricsDelta = MetricsDelta {
    co2_level: 0.1,
    toxicity_level: 0.05,
    temperature: 0.01,
    human_population: -100,
    animal_population: -500,
    plant_population: -5_000,
    ocean_acidity: -0.001,
    ice_cap_melting: 0.05,
};

/// Result of one timer firing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// The delta was applied.
    Applied,
    /// A command was in flight; nothing changed.
    SkippedBusy,
    /// The run this timer belongs to has ended.
    Cancelled,
}

/// Periodic passive decay of the shared world.
#[derive(Debug)]
pub struct PassiveDecayTicker {
    world: Arc<SharedWorld>,
    period: Duration,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl PassiveDecayTicker {
    /// Create a stopped ticker firing every `period`.
    ///
    /// A zero period is raised to [`MIN_DECAY_INTERVAL`].
    pub const fn new(world: Arc<SharedWorld>, period: Duration) -> Self {
        Self {
            world,
            period: if period.is_zero() {
                MIN_DECAY_INTERVAL
            } else {
                period
            },
            task: Mutex::new(None),
        }
    }

    /// The configured period.
    pub const fn period(&self) -> Duration {
        self.period
    }

    /// Current ticker state.
    pub fn state(&self) -> TickerState {
        self.world.lock().ticker
    }

    /// Transition `Stopped -> Running` and arm the timer.
    ///
    /// The first tick fires one full period after this call. Returns
    /// `false` (and changes nothing) if the ticker was already running.
    /// Must be called from within a Tokio runtime.
    pub fn start(&self) -> bool {
        let mut state = self.world.lock();
        self.start_locked(&mut state)
    }

    /// Transition `Running -> Stopped` and cancel the timer.
    ///
    /// Returns `false` if the ticker was not running. Pausing never touches
    /// a command that is already in flight.
    pub fn stop(&self) -> bool {
        let mut state = self.world.lock();
        self.stop_locked(&mut state)
    }

    /// Start if stopped, stop if running, as one transition.
    ///
    /// Returns the state after the transition.
    pub fn toggle(&self) -> TickerState {
        let mut state = self.world.lock();
        if state.ticker == TickerState::Running {
            self.stop_locked(&mut state);
        } else {
            self.start_locked(&mut state);
        }
        state.ticker
    }

    /// Abort the timer task once `state` has left `Running`.
    ///
    /// Called with the world lock held, after a reset has ended the run.
    /// Does nothing while `state` is running, so a task armed by a later
    /// start is never touched.
    pub(crate) fn cancel_task(&self, state: &WorldState) {
        if state.ticker == TickerState::Running {
            return;
        }
        if let Some(handle) = self.replace_task(None) {
            handle.abort();
        }
    }

    // Callers hold the world lock, then take the task slot; every path
    // locks in that order.
    fn start_locked(&self, state: &mut WorldState) -> bool {
        if state.ticker == TickerState::Running {
            return false;
        }
        state.ticker = TickerState::Running;
        state.ticker_run = state.ticker_run.wrapping_add(1);
        self.world.publish(state);
        let run_id = state.ticker_run;

        let world = Arc::clone(&self.world);
        let mut interval = tokio::time::interval(self.period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

        let handle = tokio::spawn(async move {
            // The first tick completes immediately; the first decay lands one
            // full period after start.
            interval.tick().await;
            loop {
                interval.tick().await;
                if apply_tick(&world, run_id) == TickOutcome::Cancelled {
                    break;
                }
            }
        });

        if let Some(previous) = self.replace_task(Some(handle)) {
            previous.abort();
        }

        info!(
            run = run_id,
            period_ms = u64::try_from(self.period.as_millis()).unwrap_or(u64::MAX),
            "Decay ticker started"
        );
        true
    }

    fn stop_locked(&self, state: &mut WorldState) -> bool {
        if state.ticker != TickerState::Running {
            return false;
        }
        state.ticker = TickerState::Stopped;
        state.ticker_run = state.ticker_run.wrapping_add(1);
        self.world.publish(state);
        self.cancel_task(state);
        info!("Decay ticker stopped");
        true
    }

    fn replace_task(&self, next: Option<JoinHandle<()>>) -> Option<JoinHandle<()>> {
        let mut slot = self.task.lock().unwrap_or_else(PoisonError::into_inner);
        std::mem::replace(&mut *slot, next)
    }
}

impl Drop for PassiveDecayTicker {
    fn drop(&mut self) {
        let slot = self.task.get_mut().unwrap_or_else(PoisonError::into_inner);
        if let Some(handle) = slot.take() {
            handle.abort();
        }
    }
}

/// Apply one decay tick for `run_id` if the world allows it.
pub(crate) fn apply_tick(world: &SharedWorld, run_id: u64) -> TickOutcome {
    let mut state = world.lock();
    if state.ticker != TickerState::Running || state.ticker_run != run_id {
        return TickOutcome::Cancelled;
    }
    if state.phase.is_busy() {
        debug!(phase = ?state.phase, "Decay tick skipped, command in flight");
        return TickOutcome::SkippedBusy;
    }
    let metrics = state.store.apply_delta(&DECAY_PER_TICK);
    world.publish(&state);
    debug!(
        co2_level = metrics.co2_level,
        temperature = metrics.temperature,
        human_population = metrics.human_population,
        "Decay tick applied"
    );
    TickOutcome::Applied
}

#[cfg(test)]
mod tests {
    use terra_types::{EarthMetrics, ProcessorPhase};

    use super::*;

    fn world() -> Arc<SharedWorld> {
        Arc::new(SharedWorld::new("llama3.2:1b".to_owned()))
    }

    fn co2(world: &SharedWorld) -> f64 {
        world.snapshot().metrics.co2_level
    }

    #[test]
    fn tick_requires_current_run() {
        let world = world();
        assert_eq!(apply_tick(&world, 0), TickOutcome::Cancelled);

        {
            let mut state = world.lock();
            state.ticker = TickerState::Running;
            state.ticker_run = 4;
        }
        assert_eq!(apply_tick(&world, 3), TickOutcome::Cancelled);
        assert_eq!(apply_tick(&world, 4), TickOutcome::Applied);
    }

    #[test]
    fn tick_applies_fixed_deltas() {
        let world = world();
        {
            let mut state = world.lock();
            state.ticker = TickerState::Running;
            state.ticker_run = 1;
        }
        assert_eq!(apply_tick(&world, 1), TickOutcome::Applied);

        let m = world.snapshot().metrics;
        let i = EarthMetrics::INITIAL;
        assert!((m.co2_level - 415.1).abs() < 1e-9);
        assert!((m.toxicity_level - 5.05).abs() < 1e-9);
        assert!((m.temperature - 30.01).abs() < 1e-9);
        assert_eq!(m.human_population, i.human_population - 100);
        assert_eq!(m.animal_population, i.animal_population - 500);
        assert_eq!(m.plant_population, i.plant_population - 5_000);
        assert!((m.ocean_acidity - 8.099).abs() < 1e-9);
        assert!((m.ice_cap_melting - 10.05).abs() < 1e-9);
    }

    #[test]
    fn busy_processor_skips_tick() {
        let world = world();
        {
            let mut state = world.lock();
            state.ticker = TickerState::Running;
            state.ticker_run = 1;
            state.phase = ProcessorPhase::AwaitingAnalysis;
        }
        assert_eq!(apply_tick(&world, 1), TickOutcome::SkippedBusy);
        assert_eq!(world.snapshot().metrics, EarthMetrics::INITIAL);
    }

    #[tokio::test(start_paused = true)]
    async fn fires_once_per_period() {
        let world = world();
        let ticker = PassiveDecayTicker::new(Arc::clone(&world), DEFAULT_DECAY_INTERVAL);
        assert!(ticker.start());
        assert_eq!(ticker.state(), TickerState::Running);

        tokio::time::sleep(Duration::from_millis(4_999)).await;
        assert!((co2(&world) - 415.0).abs() < 1e-9);

        tokio::time::sleep(Duration::from_millis(2)).await;
        assert!((co2(&world) - 415.1).abs() < 1e-9);

        tokio::time::sleep(Duration::from_millis(10_000)).await;
        assert!((co2(&world) - 415.3).abs() < 1e-9);
    }

    #[tokio::test(start_paused = true)]
    async fn start_twice_is_a_noop() {
        let world = world();
        let ticker = PassiveDecayTicker::new(Arc::clone(&world), DEFAULT_DECAY_INTERVAL);
        assert!(ticker.start());
        assert!(!ticker.start());

        tokio::time::sleep(Duration::from_millis(5_001)).await;
        // One timer, one tick.
        assert!((co2(&world) - 415.1).abs() < 1e-9);
    }

    #[tokio::test(start_paused = true)]
    async fn stop_prevents_further_ticks() {
        let world = world();
        let ticker = PassiveDecayTicker::new(Arc::clone(&world), DEFAULT_DECAY_INTERVAL);
        assert!(ticker.start());
        tokio::time::sleep(Duration::from_millis(5_001)).await;

        assert!(ticker.stop());
        assert!(!ticker.stop());
        assert_eq!(ticker.state(), TickerState::Stopped);

        tokio::time::sleep(Duration::from_secs(60)).await;
        assert!((co2(&world) - 415.1).abs() < 1e-9);
    }

    #[tokio::test(start_paused = true)]
    async fn resume_starts_a_fresh_period() {
        let world = world();
        let ticker = PassiveDecayTicker::new(Arc::clone(&world), DEFAULT_DECAY_INTERVAL);
        assert!(ticker.start());
        tokio::time::sleep(Duration::from_millis(3_000)).await;
        assert!(ticker.stop());
        assert!(ticker.start());

        // The old deadline at 5s must not fire; the new one is at 8s.
        tokio::time::sleep(Duration::from_millis(4_000)).await;
        assert!((co2(&world) - 415.0).abs() < 1e-9);
        tokio::time::sleep(Duration::from_millis(1_001)).await;
        assert!((co2(&world) - 415.1).abs() < 1e-9);
    }

    #[tokio::test(start_paused = true)]
    async fn busy_ticks_are_not_accumulated() {
        let world = world();
        let ticker = PassiveDecayTicker::new(Arc::clone(&world), DEFAULT_DECAY_INTERVAL);
        assert!(ticker.start());

        world.lock().phase = ProcessorPhase::AwaitingAnalysis;
        tokio::time::sleep(Duration::from_millis(20_001)).await;
        assert!((co2(&world) - 415.0).abs() < 1e-9);

        world.lock().phase = ProcessorPhase::Idle;
        tokio::time::sleep(Duration::from_millis(5_000)).await;
        assert!((co2(&world) - 415.1).abs() < 1e-9);
    }

    #[tokio::test(start_paused = true)]
    async fn start_after_reset_survives_late_cancel() {
        let world = world();
        let ticker = PassiveDecayTicker::new(Arc::clone(&world), DEFAULT_DECAY_INTERVAL);
        assert!(ticker.start());
        world.lock().reset();
        assert!(ticker.start());

        // A cancel that arrives after the restart must leave the new task alone.
        ticker.cancel_task(&world.lock());

        tokio::time::sleep(Duration::from_millis(5_001)).await;
        assert_eq!(ticker.state(), TickerState::Running);
        assert!((co2(&world) - 415.1).abs() < 1e-9);
        assert!(!ticker.start());
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_after_reset_stops_old_task() {
        let world = world();
        let ticker = PassiveDecayTicker::new(Arc::clone(&world), DEFAULT_DECAY_INTERVAL);
        assert!(ticker.start());
        {
            let mut state = world.lock();
            state.reset();
            ticker.cancel_task(&state);
        }
        assert!(ticker.task.lock().unwrap_or_else(PoisonError::into_inner).is_none());

        tokio::time::sleep(Duration::from_secs(60)).await;
        assert_eq!(world.snapshot().metrics, EarthMetrics::INITIAL);
    }

    #[tokio::test(start_paused = true)]
    async fn toggle_reports_state_after_transition() {
        let world = world();
        let ticker = PassiveDecayTicker::new(Arc::clone(&world), DEFAULT_DECAY_INTERVAL);
        assert_eq!(ticker.toggle(), TickerState::Running);
        assert_eq!(ticker.toggle(), TickerState::Stopped);
        assert_eq!(ticker.toggle(), TickerState::Running);

        tokio::time::sleep(Duration::from_millis(5_001)).await;
        assert!((co2(&world) - 415.1).abs() < 1e-9);
    }
}
