//! Cosmetic "thinking" stage shown while a command is being processed.
//!
//! The stepper reveals a fixed sequence of labels at a fixed pace before the
//! analysis service is called. The labels carry no computation. The pace
//! is independent of how long the service actually takes, and a reset
//! during the reveal cancels the remaining steps.

use std::time::Duration;

use crate::world::SharedWorld;

/// Number of cosmetic steps.
const STEP_COUNT: u32 = 8;

/// Labels revealed in order, one per step.
pub const THINKING_STEPS: [&str; STEP_COUNT as usize] = [
    "Analyzing environmental impact...",
    "Calculating CO2 emissions...",
    "Estimating population effects...",
    "Computing temperature changes...",
    "Assessing ocean acidification...",
    "Evaluating biodiversity loss...",
    "Projecting climate consequences...",
    "Finalizing impact assessment...",
];

/// Default pause before each label.
pub const DEFAULT_THINKING_STEP: Duration = Duration::from_millis(200);

/// Reveals [`THINKING_STEPS`] into the world's thinking log.
#[derive(Debug, Clone, Copy)]
pub struct ThinkingStepper {
    step: Duration,
}

impl ThinkingStepper {
    /// Create a stepper pausing `step` before each label.
    ///
    /// A zero step reveals all labels without suspending.
    pub const fn new(step: Duration) -> Self {
        Self { step }
    }

    /// Total fixed latency the stepper adds to every command.
    pub fn total(&self) -> Duration {
        self.step.saturating_mul(STEP_COUNT)
    }

    /// Reveal every label for the command started in `epoch`.
    ///
    /// Returns `false` if a reset moved the world to a newer epoch before
    /// the sequence finished; the remaining labels are then not revealed.
    pub async fn reveal(&self, world: &SharedWorld, epoch: u64) -> bool {
        for label in THINKING_STEPS {
            if !self.step.is_zero() {
                tokio::time::sleep(self.step).await;
            }
            let current = {
                let mut state = world.lock();
                let current = state.epoch == epoch;
                if current {
                    state.thinking_log.push(label.to_owned());
                    world.publish(&state);
                }
                current
            };
            if !current {
                return false;
            }
        }
        true
    }
}

impl Default for ThinkingStepper {
    fn default() -> Self {
        Self::new(DEFAULT_THINKING_STEP)
    }
}

#[cfg(test)]
mod tests {
    use tokio::time::Instant;

    use super::*;

    #[test]
    fn default_pacing_totals_1600ms() {
        assert_eq!(ThinkingStepper::default().total(), Duration::from_millis(1600));
    }

    #[tokio::test(start_paused = true)]
    async fn reveals_all_labels_in_order() {
        let world = SharedWorld::new("llama3.2:1b".to_owned());
        let stepper = ThinkingStepper::default();
        let started = Instant::now();

        assert!(stepper.reveal(&world, 0).await);

        assert_eq!(started.elapsed(), Duration::from_millis(1600));
        let log = world.snapshot().thinking_log;
        assert_eq!(log, THINKING_STEPS.map(ToOwned::to_owned).to_vec());
    }

    #[tokio::test(start_paused = true)]
    async fn stale_epoch_stops_the_reveal() {
        let world = SharedWorld::new("llama3.2:1b".to_owned());
        world.lock().epoch = 3;
        let stepper = ThinkingStepper::default();

        assert!(!stepper.reveal(&world, 2).await);
        assert!(world.snapshot().thinking_log.is_empty());
    }

    #[tokio::test]
    async fn zero_step_does_not_wait() {
        let world = SharedWorld::new("llama3.2:1b".to_owned());
        assert!(ThinkingStepper::new(Duration::ZERO).reveal(&world, 0).await);
        assert_eq!(world.snapshot().thinking_log.len(), THINKING_STEPS.len());
    }
}
