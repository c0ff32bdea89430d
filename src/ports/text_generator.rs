//! Text Generator Port - Interface to the external text-generation collaborator.
//!
//! The collector delegates every question, summary, and meditation script to
//! this port. Implementations connect to a real chat-completion API (DeepSeek)
//! or stand in for it in tests.
//!
//! The collector always supplies the needed context in the prompt itself; the
//! [`GenerationContext`] is an opaque continuity token the collaborator may
//! use to observe per-user/per-session continuity, never something the
//! collector depends on.

use async_trait::async_trait;

use crate::domain::foundation::{SessionId, UserId};

/// Port for synchronous (request/response) text generation.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Generates a completion for `prompt`.
    ///
    /// # Errors
    ///
    /// Returns `GeneratorError` if the collaborator fails, times out, or
    /// returns unusable output. Callers must not assume any retry happened.
    async fn complete(
        &self,
        prompt: &str,
        ctx: &GenerationContext,
    ) -> Result<String, GeneratorError>;
}

/// Continuity token identifying the (`user_id`, `session_id`) pair on whose
/// behalf a completion is requested.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationContext {
    pub user_id: UserId,
    pub session_id: SessionId,
}

impl GenerationContext {
    /// Creates a new generation context.
    pub fn new(user_id: UserId, session_id: SessionId) -> Self {
        Self {
            user_id,
            session_id,
        }
    }

    /// Renders the context as a single opaque token, e.g. for a provider's
    /// `user` field.
    pub fn as_token(&self) -> String {
        format!("{}:{}", self.user_id, self.session_id)
    }
}

/// Text generator errors.
#[derive(Debug, Clone, thiserror::Error)]
pub enum GeneratorError {
    /// Rate limited by the provider.
    #[error("rate limited: retry after {retry_after_secs}s")]
    RateLimited {
        /// Seconds until retry is allowed.
        retry_after_secs: u32,
    },

    /// Provider is unavailable.
    #[error("provider unavailable: {message}")]
    Unavailable {
        /// Error details.
        message: String,
    },

    /// API key or authentication failed.
    #[error("authentication failed")]
    AuthenticationFailed,

    /// Network error during request.
    #[error("network error: {0}")]
    Network(String),

    /// Failed to parse the provider response.
    #[error("parse error: {0}")]
    Parse(String),

    /// Invalid request configuration.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Request timed out.
    #[error("request timed out after {timeout_secs}s")]
    Timeout {
        /// Configured timeout.
        timeout_secs: u32,
    },

    /// Provider returned empty or whitespace-only output.
    #[error("empty output from generator")]
    EmptyOutput,

    /// Provider output exceeded the accepted length bound.
    #[error("output too long: {chars} characters exceeds {max} limit")]
    OutputTooLong {
        /// Actual character count.
        chars: usize,
        /// Maximum allowed.
        max: usize,
    },
}

impl GeneratorError {
    /// Creates a rate limited error.
    pub fn rate_limited(retry_after_secs: u32) -> Self {
        Self::RateLimited { retry_after_secs }
    }

    /// Creates an unavailable error.
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable {
            message: message.into(),
        }
    }

    /// Creates a network error.
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network(message.into())
    }

    /// Creates a parse error.
    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse(message.into())
    }

    /// Returns true if this error is retryable by the caller.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            GeneratorError::RateLimited { .. }
                | GeneratorError::Unavailable { .. }
                | GeneratorError::Network(_)
                | GeneratorError::Timeout { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn context_token_combines_user_and_session() {
        let user_id = UserId::new("u1").unwrap();
        let session_id = SessionId::new();
        let ctx = GenerationContext::new(user_id, session_id);
        assert_eq!(ctx.as_token(), format!("u1:{}", session_id));
    }

    #[test]
    fn retryable_classification() {
        assert!(GeneratorError::rate_limited(30).is_retryable());
        assert!(GeneratorError::unavailable("down").is_retryable());
        assert!(GeneratorError::network("reset").is_retryable());
        assert!(GeneratorError::Timeout { timeout_secs: 60 }.is_retryable());

        assert!(!GeneratorError::AuthenticationFailed.is_retryable());
        assert!(!GeneratorError::parse("bad json").is_retryable());
        assert!(!GeneratorError::EmptyOutput.is_retryable());
        assert!(!GeneratorError::OutputTooLong { chars: 10, max: 5 }.is_retryable());
    }

    #[test]
    fn errors_display_correctly() {
        assert_eq!(
            GeneratorError::rate_limited(30).to_string(),
            "rate limited: retry after 30s"
        );
        assert_eq!(
            GeneratorError::OutputTooLong {
                chars: 9000,
                max: 8000
            }
            .to_string(),
            "output too long: 9000 characters exceeds 8000 limit"
        );
        assert_eq!(
            GeneratorError::Timeout { timeout_secs: 60 }.to_string(),
            "request timed out after 60s"
        );
    }
}
