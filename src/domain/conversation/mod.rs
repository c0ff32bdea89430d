//! Conversation domain - the turn-bounded interview aggregate.
//!
//! A conversation session collects a bounded number of user turns through an
//! assistant-led interview, then becomes ready for meditation script
//! generation. All state mutation goes through [`ConversationSession`];
//! prompt text lives in [`prompts`].

pub mod prompts;
mod session;
mod state;

pub use session::{ConversationSession, ConversationTurn, TurnRole};
pub use state::ConversationState;
