//! Conversation lifecycle status.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::foundation::StateMachine;

/// Lifecycle state of a conversation session.
///
/// `Start` covers the opening greeting, `Collecting` the interview turns,
/// `Ready` the point where enough information has been gathered, and
/// `Completed` the terminal state after the meditation script was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConversationState {
    Start,
    Collecting,
    Ready,
    Completed,
}

impl StateMachine for ConversationState {
    fn can_transition_to(&self, target: &Self) -> bool {
        use ConversationState::*;
        matches!(
            (self, target),
            (Start, Collecting) | (Collecting, Ready) | (Ready, Completed)
        )
    }

    fn valid_transitions(&self) -> Vec<Self> {
        use ConversationState::*;
        match self {
            Start => vec![Collecting],
            Collecting => vec![Ready],
            Ready => vec![Completed],
            Completed => vec![],
        }
    }
}

impl fmt::Display for ConversationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ConversationState::Start => "start",
            ConversationState::Collecting => "collecting",
            ConversationState::Ready => "ready",
            ConversationState::Completed => "completed",
        };
        write!(f, "{}", s)
    }
}
