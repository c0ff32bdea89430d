//! Conversation collector configuration

use serde::Deserialize;

use super::error::ValidationError;

/// Conversation collector configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ConversationConfig {
    /// Maximum number of user turns collected per session
    #[serde(default = "default_max_turns")]
    pub max_turns: u32,

    /// Number of recent history entries included in follow-up prompts
    #[serde(default = "default_context_window")]
    pub context_window: usize,
}

impl ConversationConfig {
    /// Validate conversation configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.max_turns == 0 {
            return Err(ValidationError::InvalidTurnBudget);
        }
        if self.context_window == 0 {
            return Err(ValidationError::InvalidContextWindow);
        }
        Ok(())
    }
}

impl Default for ConversationConfig {
    fn default() -> Self {
        Self {
            max_turns: default_max_turns(),
            context_window: default_context_window(),
        }
    }
}

fn default_max_turns() -> u32 {
    5
}

fn default_context_window() -> usize {
    6
}
