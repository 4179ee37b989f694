//! Holder for the optional special-event label.
//!
//! Each successful command overwrites the label, including with `None` when
//! the analysis response carries no event. The previous label is never
//! carried over.

/// The most recent special-event label, if any.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SpecialEventChannel {
    current: Option<String>,
}

impl SpecialEventChannel {
    /// Create an empty channel.
    pub const fn new() -> Self {
        Self { current: None }
    }

    /// Overwrite the label with the outcome of the latest command.
    pub fn set(&mut self, event: Option<String>) {
        self.current = event;
    }

    /// The current label.
    pub fn get(&self) -> Option<&str> {
        self.current.as_deref()
    }

    /// Clear the label.
    pub fn reset(&mut self) {
        self.current = None;
    }
}
