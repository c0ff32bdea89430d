//! Conversation Collector - the turn-bounded interview driver.
//!
//! The collector owns one [`ConversationSession`] and drives it through the
//! `Start -> Collecting -> Ready -> Completed` lifecycle, delegating every
//! question, summary, and meditation script to the [`TextGenerator`] port.
//!
//! Ordering guarantee: `continue_conversation` records the user's turn before
//! the generator is invoked, so a generator failure never loses user input.
//! The failed call appends no assistant turn and the caller may retry.
//!
//! A collector instance must be driven by at most one in-flight call at a
//! time; callers that share one across tasks serialize access (the HTTP
//! adapter wraps each collector in a mutex). Distinct sessions are fully
//! independent.

use std::sync::Arc;

use crate::domain::conversation::{
    prompts, ConversationSession, ConversationState, ConversationTurn,
};
use crate::domain::foundation::{SessionId, UserId, ValidationError};
use crate::ports::{GenerationContext, GeneratorError, TextGenerator};

/// Tunable collector parameters.
#[derive(Debug, Clone, Copy)]
pub struct CollectorOptions {
    /// Maximum number of user turns collected before the session is ready.
    pub max_turns: u32,
    /// Number of recent history entries included in follow-up prompts.
    /// Bounding the window trades long-range coherence for bounded prompt
    /// size.
    pub context_window: usize,
}

impl CollectorOptions {
    pub fn new(max_turns: u32, context_window: usize) -> Self {
        Self {
            max_turns,
            context_window,
        }
    }
}

impl Default for CollectorOptions {
    fn default() -> Self {
        Self {
            max_turns: 5,
            context_window: 6,
        }
    }
}

/// Error type for collector operations.
#[derive(Debug, thiserror::Error)]
pub enum CollectorError {
    /// Operation called before `start` created a session.
    #[error("'{operation}' requires an active session; call start first")]
    SessionNotStarted { operation: &'static str },

    /// Operation called in a state that does not permit it.
    #[error("'{operation}' is not allowed while the session is {state}")]
    InvalidState {
        operation: &'static str,
        state: ConversationState,
    },

    /// The text-generation collaborator failed; surfaced verbatim, no retry.
    #[error("generator failure: {0}")]
    Generator(#[from] GeneratorError),

    /// Invalid caller-supplied argument.
    #[error(transparent)]
    InvalidArgument(#[from] ValidationError),
}

impl CollectorError {
    /// True for both flavors of state-precondition violation.
    pub fn is_invalid_state(&self) -> bool {
        matches!(
            self,
            CollectorError::SessionNotStarted { .. } | CollectorError::InvalidState { .. }
        )
    }
}

/// Result of starting a conversation.
#[derive(Debug, Clone)]
pub struct StartOutcome {
    pub session_id: SessionId,
    pub message: String,
    pub state: ConversationState,
    pub turn: u32,
}

/// Result of continuing a conversation: either the next question, or the
/// closing acknowledgment plus summary once the turn budget is exhausted.
#[derive(Debug, Clone)]
pub enum ContinueOutcome {
    Question {
        message: String,
        state: ConversationState,
        turn: u32,
        remaining_turns: u32,
    },
    ReadyToGenerate {
        message: String,
        summary: String,
        state: ConversationState,
        turn: u32,
    },
}

impl ContinueOutcome {
    /// The assistant message shown to the user.
    pub fn message(&self) -> &str {
        match self {
            ContinueOutcome::Question { message, .. } => message,
            ContinueOutcome::ReadyToGenerate { message, .. } => message,
        }
    }

    pub fn state(&self) -> ConversationState {
        match self {
            ContinueOutcome::Question { state, .. } => *state,
            ContinueOutcome::ReadyToGenerate { state, .. } => *state,
        }
    }

    pub fn turn(&self) -> u32 {
        match self {
            ContinueOutcome::Question { turn, .. } => *turn,
            ContinueOutcome::ReadyToGenerate { turn, .. } => *turn,
        }
    }

    /// True once the session is ready for meditation generation.
    pub fn is_ready(&self) -> bool {
        matches!(self, ContinueOutcome::ReadyToGenerate { .. })
    }

    pub fn summary(&self) -> Option<&str> {
        match self {
            ContinueOutcome::ReadyToGenerate { summary, .. } => Some(summary),
            ContinueOutcome::Question { .. } => None,
        }
    }

    pub fn remaining_turns(&self) -> Option<u32> {
        match self {
            ContinueOutcome::Question {
                remaining_turns, ..
            } => Some(*remaining_turns),
            ContinueOutcome::ReadyToGenerate { .. } => None,
        }
    }
}

/// The final generated artifact.
#[derive(Debug, Clone)]
pub struct MeditationScript {
    pub text: String,
    pub summary: String,
    pub char_count: usize,
    pub state: ConversationState,
}

/// Drives one bounded interview against the text-generation port.
pub struct ConversationCollector {
    generator: Arc<dyn TextGenerator>,
    options: CollectorOptions,
    session: Option<ConversationSession>,
}

impl ConversationCollector {
    /// Creates a collector with no active session.
    pub fn new(generator: Arc<dyn TextGenerator>, options: CollectorOptions) -> Self {
        Self {
            generator,
            options,
            session: None,
        }
    }

    /// Starts a conversation: generates the opening greeting and creates a
    /// fresh session. Any previously held session is replaced wholesale.
    ///
    /// # Errors
    ///
    /// - `InvalidArgument` if `user_id` is empty
    /// - `Generator` if the opening message cannot be generated; no session
    ///   is created in that case
    pub async fn start(
        &mut self,
        user_id: impl Into<String>,
        session_id: Option<SessionId>,
    ) -> Result<StartOutcome, CollectorError> {
        let user_id = UserId::new(user_id)?;
        let session_id = session_id.unwrap_or_default();

        let ctx = GenerationContext::new(user_id.clone(), session_id);
        let message = self.generator.complete(&prompts::opening(), &ctx).await?;
        let message = message.trim().to_string();

        let mut session = ConversationSession::new(user_id, session_id, self.options.max_turns)?;
        session.record_opening(message.clone());
        self.session = Some(session);

        tracing::debug!(session_id = %session_id, "conversation started");

        Ok(StartOutcome {
            session_id,
            message,
            state: ConversationState::Start,
            turn: 0,
        })
    }

    /// Records a user reply and produces either the next question or, once
    /// the turn budget is exhausted, the closing acknowledgment plus a
    /// generated summary.
    ///
    /// # Errors
    ///
    /// - `SessionNotStarted` / `InvalidState` if the session does not permit
    ///   further input
    /// - `Generator` if question or summary generation fails; the user turn
    ///   stays recorded either way
    pub async fn continue_conversation(
        &mut self,
        user_input: impl Into<String>,
    ) -> Result<ContinueOutcome, CollectorError> {
        const OP: &str = "continue_conversation";

        // Phase 1: record the user turn before the generator is invoked.
        let (prompt, terminal, turn) = {
            let session = self
                .session
                .as_mut()
                .ok_or(CollectorError::SessionNotStarted { operation: OP })?;

            match session.state() {
                ConversationState::Start => session.advance(ConversationState::Collecting)?,
                ConversationState::Collecting => {}
                state => {
                    return Err(CollectorError::InvalidState {
                        operation: OP,
                        state,
                    })
                }
            }

            let turn = session.record_user_turn(user_input.into());

            if session.limit_reached() {
                session.advance(ConversationState::Ready)?;
                (prompts::summary(session.history()), true, turn)
            } else {
                let window = session.recent_window(self.options.context_window);
                (
                    prompts::next_question(window, turn, session.max_turns()),
                    false,
                    turn,
                )
            }
        };

        let ctx = self.generation_context(OP)?;
        let output = self.generator.complete(&prompt, &ctx).await?;
        let output = output.trim().to_string();

        let session = self
            .session
            .as_mut()
            .ok_or(CollectorError::SessionNotStarted { operation: OP })?;

        if terminal {
            tracing::debug!(session_id = %session.session_id(), turn, "turn budget exhausted");
            Ok(ContinueOutcome::ReadyToGenerate {
                message: prompts::CLOSING_ACKNOWLEDGMENT.to_string(),
                summary: output,
                state: session.state(),
                turn,
            })
        } else {
            session.record_assistant_turn(output.clone());
            Ok(ContinueOutcome::Question {
                message: output,
                state: session.state(),
                turn,
                remaining_turns: session.remaining_turns(),
            })
        }
    }

    /// Summarizes the full history: emotional state and key concerns.
    ///
    /// Pure over the current history; mutates nothing and caches nothing, so
    /// every call costs one generator invocation.
    pub async fn summarize(&self) -> Result<String, CollectorError> {
        const OP: &str = "summarize";

        let session = self
            .session
            .as_ref()
            .ok_or(CollectorError::SessionNotStarted { operation: OP })?;

        let prompt = prompts::summary(session.history());
        let ctx = GenerationContext::new(session.user_id().clone(), session.session_id());
        let output = self.generator.complete(&prompt, &ctx).await?;
        Ok(output.trim().to_string())
    }

    /// Generates the guided-meditation script and completes the session.
    ///
    /// When `summary` is not supplied it is recomputed via [`summarize`].
    ///
    /// # Errors
    ///
    /// - `InvalidState` unless the session is `Ready` (repeat calls after
    ///   completion fail the same way)
    /// - `Generator` on collaborator failure; the session stays `Ready`
    ///
    /// [`summarize`]: Self::summarize
    pub async fn generate_meditation(
        &mut self,
        summary: Option<String>,
    ) -> Result<MeditationScript, CollectorError> {
        const OP: &str = "generate_meditation";

        {
            let session = self
                .session
                .as_ref()
                .ok_or(CollectorError::SessionNotStarted { operation: OP })?;
            if session.state() != ConversationState::Ready {
                return Err(CollectorError::InvalidState {
                    operation: OP,
                    state: session.state(),
                });
            }
        }

        let summary = match summary {
            Some(summary) => summary,
            None => self.summarize().await?,
        };

        let prompt = {
            let session = self
                .session
                .as_ref()
                .ok_or(CollectorError::SessionNotStarted { operation: OP })?;
            prompts::meditation(&summary, session.history())
        };

        let ctx = self.generation_context(OP)?;
        let output = self.generator.complete(&prompt, &ctx).await?;
        let text = output.trim().to_string();

        let session = self
            .session
            .as_mut()
            .ok_or(CollectorError::SessionNotStarted { operation: OP })?;
        session.advance(ConversationState::Completed)?;

        tracing::debug!(session_id = %session.session_id(), chars = text.chars().count(), "meditation generated");

        Ok(MeditationScript {
            char_count: text.chars().count(),
            text,
            summary,
            state: session.state(),
        })
    }

    /// Current lifecycle state, if a session exists.
    pub fn state(&self) -> Option<ConversationState> {
        self.session.as_ref().map(|s| s.state())
    }

    /// Full history; empty before `start`. Read access is legal in every
    /// state including `Completed`.
    pub fn history(&self) -> &[ConversationTurn] {
        self.session.as_ref().map(|s| s.history()).unwrap_or(&[])
    }

    /// The underlying session, if started.
    pub fn session(&self) -> Option<&ConversationSession> {
        self.session.as_ref()
    }

    pub fn options(&self) -> CollectorOptions {
        self.options
    }

    fn generation_context(
        &self,
        operation: &'static str,
    ) -> Result<GenerationContext, CollectorError> {
        let session = self
            .session
            .as_ref()
            .ok_or(CollectorError::SessionNotStarted { operation })?;
        Ok(GenerationContext::new(
            session.user_id().clone(),
            session.session_id(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::ai::MockGenerator;
    use crate::domain::conversation::TurnRole;

    fn collector_with(
        generator: MockGenerator,
        max_turns: u32,
    ) -> ConversationCollector {
        ConversationCollector::new(
            Arc::new(generator),
            CollectorOptions::new(max_turns, 6),
        )
    }

    #[tokio::test]
    async fn start_records_opening_at_turn_zero() {
        let generator = MockGenerator::new().with_response("Hello, how are you feeling today?");
        let mut collector = collector_with(generator, 5);

        let outcome = collector.start("u1", None).await.unwrap();

        assert_eq!(outcome.message, "Hello, how are you feeling today?");
        assert_eq!(outcome.state, ConversationState::Start);
        assert_eq!(outcome.turn, 0);
        assert_eq!(collector.history().len(), 1);
        assert_eq!(collector.history()[0].role, TurnRole::Assistant);
        assert_eq!(collector.history()[0].turn_index, 0);
    }

    #[tokio::test]
    async fn start_rejects_empty_user_id() {
        let mut collector = collector_with(MockGenerator::new(), 5);

        let result = collector.start("", None).await;

        assert!(matches!(result, Err(CollectorError::InvalidArgument(_))));
        assert!(collector.session().is_none());
    }

    #[tokio::test]
    async fn start_failure_creates_no_session() {
        let generator = MockGenerator::new().with_error(GeneratorError::unavailable("down"));
        let mut collector = collector_with(generator, 5);

        let result = collector.start("u1", None).await;

        assert!(matches!(result, Err(CollectorError::Generator(_))));
        assert!(collector.session().is_none());
    }

    #[tokio::test]
    async fn start_honors_supplied_session_id() {
        let generator = MockGenerator::new().with_response("hi");
        let mut collector = collector_with(generator, 5);
        let session_id = SessionId::new();

        let outcome = collector.start("u1", Some(session_id)).await.unwrap();

        assert_eq!(outcome.session_id, session_id);
        assert_eq!(collector.session().unwrap().session_id(), session_id);
    }

    #[tokio::test]
    async fn continue_before_start_fails() {
        let mut collector = collector_with(MockGenerator::new(), 5);

        let result = collector.continue_conversation("hello").await;

        assert!(matches!(
            result,
            Err(CollectorError::SessionNotStarted { .. })
        ));
    }

    #[tokio::test]
    async fn continue_appends_user_and_assistant_turns() {
        let generator = MockGenerator::new()
            .with_response("opening")
            .with_response("Where in your body do you feel the tiredness?");
        let mut collector = collector_with(generator, 5);
        collector.start("u1", None).await.unwrap();

        let outcome = collector.continue_conversation("tired").await.unwrap();

        assert_eq!(
            outcome.message(),
            "Where in your body do you feel the tiredness?"
        );
        assert_eq!(outcome.state(), ConversationState::Collecting);
        assert_eq!(outcome.turn(), 1);
        assert_eq!(outcome.remaining_turns(), Some(4));
        assert_eq!(collector.history().len(), 3);
        assert_eq!(collector.history()[1].role, TurnRole::User);
        assert_eq!(collector.history()[2].role, TurnRole::Assistant);
    }

    #[tokio::test]
    async fn two_turn_scenario_reaches_ready_with_summary() {
        // The max_turns = 2 walkthrough: A0 / U1,A1 / U2 -> ready
        let generator = MockGenerator::new()
            .with_response("How are you feeling today?")
            .with_response("What is weighing on you most?")
            .with_response("User is tired and stressed by work.");
        let mut collector = collector_with(generator, 2);

        collector.start("u1", None).await.unwrap();
        let first = collector.continue_conversation("tired").await.unwrap();
        assert!(!first.is_ready());
        assert_eq!(first.turn(), 1);

        let second = collector.continue_conversation("work stress").await.unwrap();
        assert!(second.is_ready());
        assert_eq!(second.turn(), 2);
        assert_eq!(second.state(), ConversationState::Ready);
        assert_eq!(
            second.summary(),
            Some("User is tired and stressed by work.")
        );
        assert_eq!(second.message(), prompts::CLOSING_ACKNOWLEDGMENT);

        // Opening + U1 + A1 + U2: no trailing assistant question on the
        // terminal turn.
        assert_eq!(collector.history().len(), 4);
        assert_eq!(collector.history()[3].role, TurnRole::User);
    }

    #[tokio::test]
    async fn continue_after_ready_fails_with_invalid_state() {
        let generator = MockGenerator::new();
        let mut collector = collector_with(generator, 1);
        collector.start("u1", None).await.unwrap();
        collector.continue_conversation("tired").await.unwrap();

        let result = collector.continue_conversation("more").await;

        assert!(matches!(
            result,
            Err(CollectorError::InvalidState {
                state: ConversationState::Ready,
                ..
            })
        ));
        // No re-summarize happened, nothing was appended.
        assert_eq!(collector.history().len(), 2);
        assert_eq!(collector.session().unwrap().turn_count(), 1);
    }

    #[tokio::test]
    async fn generator_failure_keeps_user_turn_recorded() {
        let generator = MockGenerator::new()
            .with_response("opening")
            .with_error(GeneratorError::Timeout { timeout_secs: 60 })
            .with_response("And how does that show up for you?");
        let mut collector = collector_with(generator, 5);
        collector.start("u1", None).await.unwrap();

        let failed = collector.continue_conversation("anxious").await;
        assert!(matches!(failed, Err(CollectorError::Generator(_))));

        // The user turn survived, no assistant turn was appended, and the
        // state advanced to Collecting.
        assert_eq!(collector.history().len(), 2);
        assert_eq!(collector.history()[1].role, TurnRole::User);
        assert_eq!(collector.state(), Some(ConversationState::Collecting));
        assert_eq!(collector.session().unwrap().turn_count(), 1);

        // The interview continues normally afterwards.
        let outcome = collector.continue_conversation("in my chest").await.unwrap();
        assert_eq!(outcome.turn(), 2);
        assert_eq!(collector.history().len(), 4);
    }

    #[tokio::test]
    async fn summary_failure_on_terminal_turn_leaves_session_ready() {
        let generator = MockGenerator::new()
            .with_response("opening")
            .with_error(GeneratorError::unavailable("down"));
        let mut collector = collector_with(generator, 1);
        collector.start("u1", None).await.unwrap();

        let result = collector.continue_conversation("tired").await;

        assert!(matches!(result, Err(CollectorError::Generator(_))));
        assert_eq!(collector.state(), Some(ConversationState::Ready));
        // The session can still proceed to meditation generation, which
        // recomputes the summary.
    }

    #[tokio::test]
    async fn question_prompt_is_windowed_to_recent_history() {
        let generator = MockGenerator::new();
        let mut collector = ConversationCollector::new(
            Arc::new(generator.clone()),
            CollectorOptions::new(10, 6),
        );
        collector.start("u1", None).await.unwrap();

        for i in 1..=5 {
            collector
                .continue_conversation(format!("reply-{}", i))
                .await
                .unwrap();
        }

        // 11 history entries by now; the sixth question prompt must only
        // contain the 6 most recent (reply-3's question onwards).
        collector.continue_conversation("reply-6").await.unwrap();
        let prompt = generator.last_prompt().unwrap();

        assert!(prompt.contains("user: reply-6"));
        assert!(prompt.contains("user: reply-4"));
        assert!(!prompt.contains("user: reply-1"));
        assert!(!prompt.contains("user: reply-2"));
        assert!(!prompt.contains("user: reply-3"));
    }

    #[tokio::test]
    async fn summarize_uses_full_history() {
        let generator = MockGenerator::new();
        let mut collector = ConversationCollector::new(
            Arc::new(generator.clone()),
            CollectorOptions::new(10, 2),
        );
        collector.start("u1", None).await.unwrap();
        for i in 1..=4 {
            collector
                .continue_conversation(format!("reply-{}", i))
                .await
                .unwrap();
        }

        collector.summarize().await.unwrap();
        let prompt = generator.last_prompt().unwrap();

        // Unwindowed: even the oldest entries appear.
        assert!(prompt.contains("user: reply-1"));
        assert!(prompt.contains("user: reply-4"));
    }

    #[tokio::test]
    async fn generate_meditation_requires_ready_state() {
        let generator = MockGenerator::new();
        let mut collector = collector_with(generator, 5);
        collector.start("u1", None).await.unwrap();

        let result = collector.generate_meditation(None).await;

        assert!(matches!(
            result,
            Err(CollectorError::InvalidState {
                state: ConversationState::Start,
                ..
            })
        ));
    }

    #[tokio::test]
    async fn generate_meditation_completes_the_session() {
        let generator = MockGenerator::new()
            .with_response("opening")
            .with_response("summary text")
            .with_response("  Find a comfortable position... slowly open your eyes.  ");
        let mut collector = collector_with(generator, 1);
        collector.start("u1", None).await.unwrap();
        let outcome = collector.continue_conversation("tense").await.unwrap();

        let script = collector
            .generate_meditation(outcome.summary().map(String::from))
            .await
            .unwrap();

        assert_eq!(
            script.text,
            "Find a comfortable position... slowly open your eyes."
        );
        assert_eq!(script.summary, "summary text");
        assert_eq!(script.char_count, script.text.chars().count());
        assert_eq!(script.state, ConversationState::Completed);
        assert_eq!(collector.state(), Some(ConversationState::Completed));
    }

    #[tokio::test]
    async fn generate_meditation_computes_summary_when_absent() {
        let generator = MockGenerator::new()
            .with_response("opening")
            .with_response("turn summary")
            .with_response("recomputed summary")
            .with_response("meditation text");
        let mut collector = collector_with(generator.clone(), 1);
        collector.start("u1", None).await.unwrap();
        collector.continue_conversation("tense").await.unwrap();

        let script = collector.generate_meditation(None).await.unwrap();

        assert_eq!(script.summary, "recomputed summary");
        assert_eq!(script.text, "meditation text");
        assert_eq!(generator.call_count(), 4);
    }

    #[tokio::test]
    async fn generate_meditation_twice_fails() {
        let generator = MockGenerator::new();
        let mut collector = collector_with(generator, 1);
        collector.start("u1", None).await.unwrap();
        collector.continue_conversation("tense").await.unwrap();
        collector
            .generate_meditation(Some("summary".to_string()))
            .await
            .unwrap();

        let result = collector.generate_meditation(Some("summary".to_string())).await;

        assert!(matches!(
            result,
            Err(CollectorError::InvalidState {
                state: ConversationState::Completed,
                ..
            })
        ));
    }

    #[tokio::test]
    async fn generation_failure_leaves_session_ready() {
        let generator = MockGenerator::new()
            .with_response("opening")
            .with_response("summary")
            .with_error(GeneratorError::network("reset"));
        let mut collector = collector_with(generator, 1);
        collector.start("u1", None).await.unwrap();
        let outcome = collector.continue_conversation("tense").await.unwrap();

        let result = collector
            .generate_meditation(outcome.summary().map(String::from))
            .await;

        assert!(matches!(result, Err(CollectorError::Generator(_))));
        assert_eq!(collector.state(), Some(ConversationState::Ready));
    }

    #[tokio::test]
    async fn turn_count_matches_user_entries_after_every_operation() {
        let generator = MockGenerator::new();
        let mut collector = collector_with(generator, 3);
        collector.start("u1", None).await.unwrap();

        for input in ["one", "two", "three"] {
            collector.continue_conversation(input).await.unwrap();
            let session = collector.session().unwrap();
            assert_eq!(session.user_turn_count() as u32, session.turn_count());
        }
    }

    #[tokio::test]
    async fn empty_user_input_is_accepted() {
        let generator = MockGenerator::new();
        let mut collector = collector_with(generator, 5);
        collector.start("u1", None).await.unwrap();

        let outcome = collector.continue_conversation("").await.unwrap();

        assert_eq!(outcome.turn(), 1);
        assert_eq!(collector.history()[1].content, "");
    }

    #[tokio::test]
    async fn restart_replaces_previous_session() {
        let generator = MockGenerator::new();
        let mut collector = collector_with(generator, 5);
        let first = collector.start("u1", None).await.unwrap();
        collector.continue_conversation("tired").await.unwrap();

        let second = collector.start("u2", None).await.unwrap();

        assert_ne!(first.session_id, second.session_id);
        assert_eq!(collector.history().len(), 1);
        assert_eq!(collector.session().unwrap().user_id().as_str(), "u2");
    }
}
