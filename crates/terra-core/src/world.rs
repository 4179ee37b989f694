//! Shared engine state and change publication.
//!
//! All mutable engine state lives in one [`WorldState`] behind one mutex in
//! [`SharedWorld`]. The decay ticker and the command processor both take this
//! lock before touching the metrics, and the ticker reads the processor
//! phase under the same lock, so a decay tick can never interleave with a
//! command merge. The lock is never held across an `.await`.
//!
//! Every mutation publishes a fresh [`WorldSnapshot`] on a broadcast channel
//! while the lock is still held, so subscribers see changes in the order
//! they happened.

use std::sync::{Mutex, MutexGuard, PoisonError};

use terra_types::{ProcessorPhase, TickerState, WorldSnapshot};
use tokio::sync::broadcast;

use crate::event::SpecialEventChannel;
use crate::history::CommandHistory;
use crate::store::MetricsStore;

/// Capacity of the snapshot broadcast channel.
///
/// A subscriber that falls further behind receives
/// [`broadcast::error::RecvError::Lagged`] and resumes from the newest
/// snapshot.
const BROADCAST_CAPACITY: usize = 64;

/// Mutable engine state.
#[derive(Debug)]
pub struct WorldState {
    /// Current bounded metrics.
    pub(crate) store: MetricsStore,
    /// Pollution overlay level.
    pub(crate) pollution_level: f64,
    /// Analysis text of the latest command.
    pub(crate) analysis: String,
    /// Latest special event.
    pub(crate) special_event: SpecialEventChannel,
    /// Processed commands.
    pub(crate) history: CommandHistory,
    /// Step labels revealed for the command in flight.
    pub(crate) thinking_log: Vec<String>,
    /// Command processor phase.
    pub(crate) phase: ProcessorPhase,
    /// Decay ticker state.
    pub(crate) ticker: TickerState,
    /// Identifies the current ticker run; a timer task only applies ticks
    /// while its run id is still current.
    pub(crate) ticker_run: u64,
    /// Bumped by every reset; in-flight commands from an older epoch are
    /// discarded.
    pub(crate) epoch: u64,
    /// Model used for the next command.
    pub(crate) model: String,
}

impl WorldState {
    fn new(model: String) -> Self {
        Self {
            store: MetricsStore::new(),
            pollution_level: 0.0,
            analysis: String::new(),
            special_event: SpecialEventChannel::new(),
            history: CommandHistory::new(),
            thinking_log: Vec::new(),
            phase: ProcessorPhase::Idle,
            ticker: TickerState::Stopped,
            ticker_run: 0,
            epoch: 0,
            model,
        }
    }

    /// Build a serializable snapshot of the current state.
    pub fn snapshot(&self) -> WorldSnapshot {
        WorldSnapshot {
            metrics: self.store.get(),
            pollution_level: self.pollution_level,
            analysis: self.analysis.clone(),
            special_event: self.special_event.get().map(ToOwned::to_owned),
            history: self.history.to_vec(),
            thinking_log: self.thinking_log.clone(),
            phase: self.phase,
            ticker: self.ticker,
            model: self.model.clone(),
        }
    }

    /// Restore the initial state.
    ///
    /// Stops the ticker, forces the processor to `Idle`, and moves to a new
    /// epoch so that nothing scheduled before the reset can land afterwards.
    /// The selected model survives a reset.
    pub(crate) fn reset(&mut self) {
        let _ = self.store.reset();
        self.pollution_level = 0.0;
        self.analysis.clear();
        self.special_event.reset();
        self.history.reset();
        self.thinking_log.clear();
        self.phase = ProcessorPhase::Idle;
        self.ticker = TickerState::Stopped;
        self.ticker_run = self.ticker_run.wrapping_add(1);
        self.epoch = self.epoch.wrapping_add(1);
    }
}

/// The engine state plus its change feed.
#[derive(Debug)]
pub struct SharedWorld {
    state: Mutex<WorldState>,
    tx: broadcast::Sender<WorldSnapshot>,
}

impl SharedWorld {
    /// Create a world at the initial row using `model` for commands.
    pub fn new(model: String) -> Self {
        let (tx, _) = broadcast::channel(BROADCAST_CAPACITY);
        Self {
            state: Mutex::new(WorldState::new(model)),
            tx,
        }
    }

    /// Lock the state.
    ///
    /// A poisoned lock is recovered: every mutation leaves the state
    /// consistent before anything that could panic runs.
    pub(crate) fn lock(&self) -> MutexGuard<'_, WorldState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Publish `state` to all subscribers. Call while holding the lock.
    pub(crate) fn publish(&self, state: &WorldState) {
        // send only fails when nobody is subscribed, which is normal.
        let _ = self.tx.send(state.snapshot());
    }

    /// Snapshot the current state.
    pub fn snapshot(&self) -> WorldSnapshot {
        self.lock().snapshot()
    }

    /// Subscribe to snapshots published after every change.
    pub fn subscribe(&self) -> broadcast::Receiver<WorldSnapshot> {
        self.tx.subscribe()
    }
}
