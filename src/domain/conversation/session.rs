//! Conversation Session Aggregate
//!
//! Tracks the full state of one interview: lifecycle status, turn budget,
//! and the append-only message history. Turns are never mutated or removed
//! once recorded, and `turn_count` always equals the number of user-role
//! entries in the history.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::foundation::{SessionId, StateMachine, UserId, ValidationError};

use super::ConversationState;

/// Who produced a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TurnRole {
    Assistant,
    User,
}

impl fmt::Display for TurnRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TurnRole::Assistant => "assistant",
            TurnRole::User => "user",
        };
        write!(f, "{}", s)
    }
}

/// One role-tagged message in the interview. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub role: TurnRole,
    pub content: String,
    /// The user-turn counter at the time this entry was recorded. The opening
    /// greeting carries index 0; each user reply and the follow-up question
    /// it triggers share the same index.
    pub turn_index: u32,
    pub created_at: DateTime<Utc>,
}

/// Aggregate root for one bounded interview.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationSession {
    session_id: SessionId,
    user_id: UserId,
    state: ConversationState,
    turn_count: u32,
    max_turns: u32,
    history: Vec<ConversationTurn>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl ConversationSession {
    /// Creates a new session in the `Start` state with an empty history.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if `max_turns` is zero.
    pub fn new(
        user_id: UserId,
        session_id: SessionId,
        max_turns: u32,
    ) -> Result<Self, ValidationError> {
        if max_turns == 0 {
            return Err(ValidationError::out_of_range("max_turns", 1, i64::MAX, 0));
        }
        let now = Utc::now();
        Ok(Self {
            session_id,
            user_id,
            state: ConversationState::Start,
            turn_count: 0,
            max_turns,
            history: Vec::new(),
            created_at: now,
            updated_at: now,
        })
    }

    /// Records the opening greeting as the first history entry (turn 0).
    pub fn record_opening(&mut self, content: impl Into<String>) {
        debug_assert!(self.history.is_empty(), "opening must be the first entry");
        self.push_turn(TurnRole::Assistant, content.into());
    }

    /// Records a user reply and increments the turn counter.
    ///
    /// Returns the new turn count. Empty input is accepted and recorded
    /// as-is; no content validation happens here.
    pub fn record_user_turn(&mut self, content: impl Into<String>) -> u32 {
        self.turn_count += 1;
        self.push_turn(TurnRole::User, content.into());
        self.turn_count
    }

    /// Records an assistant follow-up question at the current turn index.
    pub fn record_assistant_turn(&mut self, content: impl Into<String>) {
        self.push_turn(TurnRole::Assistant, content.into());
    }

    fn push_turn(&mut self, role: TurnRole, content: String) {
        self.history.push(ConversationTurn {
            role,
            content,
            turn_index: self.turn_count,
            created_at: Utc::now(),
        });
        self.updated_at = Utc::now();
    }

    /// Performs a validated lifecycle transition.
    pub fn advance(&mut self, to: ConversationState) -> Result<(), ValidationError> {
        self.state = self.state.transition_to(to)?;
        self.updated_at = Utc::now();
        Ok(())
    }

    /// True once the turn budget is exhausted.
    pub fn limit_reached(&self) -> bool {
        self.turn_count >= self.max_turns
    }

    /// User turns still available before the budget is exhausted.
    pub fn remaining_turns(&self) -> u32 {
        self.max_turns.saturating_sub(self.turn_count)
    }

    /// The most recent `n` history entries (or the whole history if shorter),
    /// in chronological order.
    pub fn recent_window(&self, n: usize) -> &[ConversationTurn] {
        let start = self.history.len().saturating_sub(n);
        &self.history[start..]
    }

    /// Number of user-role entries in the history.
    ///
    /// Always equal to [`turn_count`](Self::turn_count); exposed so callers
    /// and tests can check the invariant directly.
    pub fn user_turn_count(&self) -> usize {
        self.history
            .iter()
            .filter(|t| t.role == TurnRole::User)
            .count()
    }

    pub fn session_id(&self) -> SessionId {
        self.session_id
    }

    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    pub fn state(&self) -> ConversationState {
        self.state
    }

    pub fn turn_count(&self) -> u32 {
        self.turn_count
    }

    pub fn max_turns(&self) -> u32 {
        self.max_turns
    }

    pub fn history(&self) -> &[ConversationTurn] {
        &self.history
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }
}
