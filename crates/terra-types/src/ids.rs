//! Type-safe identifier wrapper around [`Uuid`].
//!
//! Command records carry a UUID v7 (time-ordered) so clients can key list
//! entries without relying on their position in the history.

use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

/// Unique identifier of a processed command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct CommandId(pub Uuid);

impl CommandId {
    /// Create a new identifier using UUID v7 (time-ordered).
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    /// Return the inner [`Uuid`] value.
    pub const fn into_inner(self) -> Uuid {
        self.0
    }
}

impl Default for CommandId {
    fn default() -> Self {
        Self::new()
    }
}

impl core::fmt::Display for CommandId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Uuid> for CommandId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_time_ordered() {
        let first = CommandId::new();
        let second = CommandId::new();
        assert!(first < second);
    }

    #[test]
    fn serializes_as_bare_uuid() {
        let id = CommandId::from(Uuid::nil());
        let json = serde_json::to_string(&id).unwrap_or_default();
        assert_eq!(json, "\"00000000-0000-0000-0000-000000000000\"");
    }
}
