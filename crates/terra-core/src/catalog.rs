//! Example commands and the analysis model catalog.

use terra_types::ModelInfo;

/// Model selected when nothing else is configured.
pub const DEFAULT_MODEL: &str = "llama3.2:1b";

/// Example commands offered to the user.
pub const EXAMPLE_COMMANDS: [&str; 10] = [
    "Add 1 million V8 trucks to the world",
    "Build 1000 coal power plants",
    "Cut down the Amazon rainforest",
    "Smash a meteor into Earth",
    "Start a nuclear war",
    "Crash the moon into Earth",
    "God saves the Earth",
    "Release 50 million tons of CO2",
    "Build 10,000 factories in China",
    "Erupt all volcanoes simultaneously",
];

/// `(id, name, description, enabled)` for each known model.
const MODELS: [(&str, &str, &str, bool); 4] = [
    (
        DEFAULT_MODEL,
        "Llama 3.2 (1B)",
        "Fast, minimal reasoning (default)",
        true,
    ),
    ("deepseek-r1:8b", "DeepSeek R1 (8B)", "Slow & accurate", false),
    ("qwen3:8b", "Qwen3 (8B)", "Fast inference", false),
    ("deepseek-r1:1.5b", "DeepSeek R1 (1.5B)", "Fast inference", false),
];

/// Errors from selecting a model.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ModelSelectError {
    /// The id is not in the catalog.
    #[error("unknown model: {0}")]
    Unknown(String),
    /// The model exists but cannot be selected.
    #[error("model is not available: {0}")]
    Disabled(String),
    /// A command is in flight; the model is fixed until it finishes.
    #[error("cannot change model while a command is being processed")]
    Busy,
}

/// Example commands containing `filter`, ignoring case.
///
/// An empty filter returns every example.
pub fn filter_examples(filter: &str) -> Vec<&'static str> {
    let needle = filter.trim().to_lowercase();
    EXAMPLE_COMMANDS
        .into_iter()
        .filter(|example| example.to_lowercase().contains(&needle))
        .collect()
}

/// Every model in the catalog, in display order.
pub fn models() -> Vec<ModelInfo> {
    MODELS.iter().map(|&entry| to_info(entry)).collect()
}

/// Look up a model by id.
pub fn find_model(id: &str) -> Option<ModelInfo> {
    MODELS
        .iter()
        .find(|(model_id, ..)| *model_id == id)
        .map(|&entry| to_info(entry))
}

/// Check that `id` names a selectable model.
///
/// # Errors
///
/// Returns [`ModelSelectError::Unknown`] or [`ModelSelectError::Disabled`].
pub fn selectable(id: &str) -> Result<ModelInfo, ModelSelectError> {
    let model = find_model(id).ok_or_else(|| ModelSelectError::Unknown(id.to_owned()))?;
    if model.enabled {
        Ok(model)
    } else {
        Err(ModelSelectError::Disabled(model.id))
    }
}

fn to_info((id, name, description, enabled): (&str, &str, &str, bool)) -> ModelInfo {
    ModelInfo {
        id: id.to_owned(),
        name: name.to_owned(),
        description: description.to_owned(),
        enabled,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filter_is_case_insensitive() {
        assert_eq!(
            filter_examples("EARTH"),
            vec![
                "Smash a meteor into Earth",
                "Crash the moon into Earth",
                "God saves the Earth",
            ]
        );
    }

    #[test]
    fn empty_filter_returns_all() {
        assert_eq!(filter_examples("").len(), EXAMPLE_COMMANDS.len());
        assert_eq!(filter_examples("  ").len(), EXAMPLE_COMMANDS.len());
    }

    #[test]
    fn no_match_is_empty() {
        assert!(filter_examples("ocean").is_empty());
    }

    #[test]
    fn only_default_model_is_enabled() {
        let enabled: Vec<_> = models().into_iter().filter(|m| m.enabled).collect();
        assert_eq!(enabled.len(), 1);
        assert_eq!(enabled[0].id, DEFAULT_MODEL);
    }

    #[test]
    fn selection_rules() {
        assert_eq!(selectable(DEFAULT_MODEL).map(|m| m.name), Ok("Llama 3.2 (1B)".to_owned()));
        assert_eq!(
            selectable("qwen3:8b"),
            Err(ModelSelectError::Disabled("qwen3:8b".to_owned()))
        );
        assert_eq!(
            selectable("gpt-5"),
            Err(ModelSelectError::Unknown("gpt-5".to_owned()))
        );
    }
}
