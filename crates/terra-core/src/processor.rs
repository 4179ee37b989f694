//! Command processor: one command at a time through the analysis service.
//!
//! A submission runs through these phases:
//!
//! ```text
//! Idle -> Thinking -> AwaitingAnalysis -> Applying -> Idle
//!                            |
//!                            +--(failure)--> Idle
//! ```
//!
//! [`CommandProcessor::begin`] is the mutual-exclusion gate: it atomically
//! checks for `Idle` and moves to `Thinking`, so at most one command is in
//! flight. [`CommandProcessor::run`] then drives the cosmetic stepper, calls
//! the analysis service with a snapshot taken at that moment, and merges
//! the result.
//!
//! Success replaces the metrics wholesale; failure leaves every piece of
//! state except the analysis text untouched. If a reset happens while a
//! command is in flight, the command is abandoned and its result dropped.

use std::sync::Arc;
use std::time::Duration;

use terra_types::{AnalysisRequest, CommandRecord, ProcessorPhase};
use tokio::time::Instant;
use tracing::{info, warn};

use crate::analysis::{AnalysisError, AnalysisService, FAILURE_MESSAGE};
use crate::thinking::ThinkingStepper;
use crate::world::SharedWorld;

/// Why a submission was refused without any state change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum Rejection {
    /// The command was empty or whitespace.
    #[error("command is blank")]
    Blank,
    /// Another command is already in flight.
    #[error("a command is already being processed")]
    Busy,
}

/// An accepted command that has not run yet.
///
/// Obtained from [`CommandProcessor::begin`]; the processor stays busy
/// until the ticket is passed to [`CommandProcessor::run`].
#[derive(Debug)]
#[must_use = "the processor stays busy until the ticket is run"]
pub struct Ticket {
    command: String,
    epoch: u64,
    accepted_at: Instant,
}

impl Ticket {
    /// The trimmed command text.
    pub fn command(&self) -> &str {
        &self.command
    }
}

/// How a submission ended.
#[derive(Debug)]
pub enum SubmitOutcome {
    /// The analysis was merged and recorded.
    Applied(CommandRecord),
    /// The analysis failed; only the analysis text changed.
    Failed(AnalysisError),
    /// The submission was refused before anything happened.
    Rejected(Rejection),
    /// A reset happened while the command was in flight.
    Abandoned,
}

/// Orchestrates commands against the shared world.
#[derive(Debug)]
pub struct CommandProcessor<A> {
    world: Arc<SharedWorld>,
    analysis: A,
    stepper: ThinkingStepper,
}

impl<A: AnalysisService> CommandProcessor<A> {
    /// Create a processor using `analysis`, pausing `thinking_step` between
    /// cosmetic labels.
    pub const fn new(world: Arc<SharedWorld>, analysis: A, thinking_step: Duration) -> Self {
        Self {
            world,
            analysis,
            stepper: ThinkingStepper::new(thinking_step),
        }
    }

    /// The analysis service in use.
    pub const fn analysis(&self) -> &A {
        &self.analysis
    }

    /// Current phase.
    pub fn phase(&self) -> ProcessorPhase {
        self.world.lock().phase
    }

    /// Accept `command` and enter `Thinking`, or refuse it.
    ///
    /// A refusal changes nothing. On acceptance the thinking log and the
    /// analysis text are cleared.
    ///
    /// # Errors
    ///
    /// Returns [`Rejection::Blank`] for an empty command and
    /// [`Rejection::Busy`] when a command is already in flight.
    pub fn begin(&self, command: &str) -> Result<Ticket, Rejection> {
        let command = command.trim();
        if command.is_empty() {
            return Err(Rejection::Blank);
        }

        let mut state = self.world.lock();
        if state.phase.is_busy() {
            return Err(Rejection::Busy);
        }
        state.phase = ProcessorPhase::Thinking;
        state.thinking_log.clear();
        state.analysis.clear();
        self.world.publish(&state);

        info!(command, "Command accepted");
        Ok(Ticket {
            command: command.to_owned(),
            epoch: state.epoch,
            accepted_at: Instant::now(),
        })
    }

    /// Drive an accepted command to completion.
    pub async fn run(&self, ticket: Ticket) -> SubmitOutcome {
        if !self.stepper.reveal(&self.world, ticket.epoch).await {
            info!(command = %ticket.command, "Command abandoned by reset");
            return SubmitOutcome::Abandoned;
        }

        let request = {
            let mut state = self.world.lock();
            if state.epoch != ticket.epoch {
                return SubmitOutcome::Abandoned;
            }
            state.phase = ProcessorPhase::AwaitingAnalysis;
            self.world.publish(&state);
            AnalysisRequest {
                command: ticket.command.clone(),
                current_metrics: state.store.get(),
                pollution_level: state.pollution_level,
                model: state.model.clone(),
            }
        };
        let model = request.model.clone();

        let result = self.analysis.analyze(request).await;

        let mut state = self.world.lock();
        if state.epoch != ticket.epoch {
            info!(
                command = %ticket.command,
                "Discarding analysis that finished after a reset"
            );
            return SubmitOutcome::Abandoned;
        }

        let outcome = match result {
            Ok(analysis) => {
                state.phase = ProcessorPhase::Applying;
                let metrics = state.store.replace(analysis.metrics);
                state.pollution_level = analysis.pollution_level;
                state.analysis.clone_from(&analysis.analysis);
                state.special_event.set(analysis.special_event);

                let record = CommandRecord::new(
                    ticket.command,
                    analysis.analysis,
                    ticket.accepted_at.elapsed().as_secs_f64(),
                    model,
                );
                state.history.push(record.clone());

                info!(
                    command = %record.command,
                    response_time_secs = record.response_time_secs,
                    co2_level = metrics.co2_level,
                    pollution_level = state.pollution_level,
                    special_event = state.special_event.get(),
                    "Command applied"
                );
                SubmitOutcome::Applied(record)
            }
            Err(e) => {
                warn!(command = %ticket.command, error = %e, "Command analysis failed");
                FAILURE_MESSAGE.clone_into(&mut state.analysis);
                SubmitOutcome::Failed(e)
            }
        };

        state.thinking_log.clear();
        state.phase = ProcessorPhase::Idle;
        self.world.publish(&state);
        outcome
    }

    /// Accept and run `command` in one call.
    pub async fn submit(&self, command: &str) -> SubmitOutcome {
        match self.begin(command) {
            Ok(ticket) => self.run(ticket).await,
            Err(rejection) => SubmitOutcome::Rejected(rejection),
        }
    }
}
