//! HTTP DTOs for conversation endpoints
//!
//! These types decouple the HTTP API from domain types, allowing independent evolution.

use serde::{Deserialize, Serialize};

use crate::domain::conversation::{ConversationState, ConversationTurn};

// ════════════════════════════════════════════════════════════════════════════════
// Request DTOs
// ════════════════════════════════════════════════════════════════════════════════

/// Request to start a new conversation
#[derive(Debug, Clone, Deserialize)]
pub struct StartConversationRequest {
    pub user_id: String,
    /// Optional caller-chosen session id; generated when absent.
    #[serde(default)]
    pub session_id: Option<String>,
}

/// Request to send a user reply
#[derive(Debug, Clone, Deserialize)]
pub struct SendMessageRequest {
    pub message: String,
}

/// Request to generate the meditation script
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GenerateMeditationRequest {
    /// Optional precomputed summary; recomputed from the history when absent.
    #[serde(default)]
    pub summary: Option<String>,
}

// ════════════════════════════════════════════════════════════════════════════════
// Response DTOs
// ════════════════════════════════════════════════════════════════════════════════

/// Response for starting a conversation
#[derive(Debug, Clone, Serialize)]
pub struct StartConversationResponse {
    pub session_id: String,
    pub message: String,
    pub state: ConversationState,
    pub turn: u32,
}

/// Response for sending a message
#[derive(Debug, Clone, Serialize)]
pub struct SendMessageResponse {
    pub message: String,
    pub state: ConversationState,
    pub turn: u32,
    /// True once the turn budget is exhausted and the session is ready for
    /// meditation generation.
    pub ready_to_generate: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remaining_turns: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
}

/// One history entry as exposed over the wire
#[derive(Debug, Clone, Serialize)]
pub struct TurnDto {
    pub role: String,
    pub content: String,
    pub turn: u32,
}

impl From<&ConversationTurn> for TurnDto {
    fn from(turn: &ConversationTurn) -> Self {
        Self {
            role: turn.role.to_string(),
            content: turn.content.clone(),
            turn: turn.turn_index,
        }
    }
}

/// Response for getting conversation state
#[derive(Debug, Clone, Serialize)]
pub struct ConversationStateResponse {
    pub session_id: String,
    pub user_id: String,
    pub state: ConversationState,
    pub turn_count: u32,
    pub max_turns: u32,
    pub remaining_turns: u32,
    pub history: Vec<TurnDto>,
}

/// Response for generating the meditation script
#[derive(Debug, Clone, Serialize)]
pub struct MeditationResponse {
    pub text: String,
    pub summary: String,
    pub char_count: usize,
    pub state: ConversationState,
}

/// Response for successful delete
#[derive(Debug, Clone, Serialize)]
pub struct DeleteConversationResponse {
    pub message: String,
}

/// Health-check response
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
}

/// Standard error response
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ErrorResponse {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            code: "BAD_REQUEST".to_string(),
            message: message.into(),
            details: None,
        }
    }

    pub fn not_found(resource_type: &str, id: &str) -> Self {
        Self {
            code: "NOT_FOUND".to_string(),
            message: format!("{} not found: {}", resource_type, id),
            details: None,
        }
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self {
            code: "CONFLICT".to_string(),
            message: message.into(),
            details: None,
        }
    }

    pub fn bad_gateway(message: impl Into<String>) -> Self {
        Self {
            code: "GENERATOR_FAILURE".to_string(),
            message: message.into(),
            details: None,
        }
    }
}
