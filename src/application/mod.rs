//! Application layer - use-case orchestration over the domain.

mod collector;

pub use collector::{
    CollectorError, CollectorOptions, ContinueOutcome, ConversationCollector, MeditationScript,
    StartOutcome,
};
