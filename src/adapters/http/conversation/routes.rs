//! Route definitions for conversation endpoints

use axum::routing::{delete, get, post};
use axum::Router;

use super::handlers::{
    end_conversation, generate_meditation, get_conversation, health, send_message,
    start_conversation, ConversationAppState,
};

/// Create conversation router with all endpoints
///
/// # Endpoints
///
/// - `GET /` - Health check
/// - `POST /api/conversations` - Start new conversation
/// - `POST /api/conversations/{session_id}/messages` - Send user reply
/// - `GET /api/conversations/{session_id}` - Get conversation state
/// - `POST /api/conversations/{session_id}/meditation` - Generate meditation script
/// - `DELETE /api/conversations/{session_id}` - End conversation
pub fn routes() -> Router<ConversationAppState> {
    Router::new()
        .route("/", get(health))
        .route("/api/conversations", post(start_conversation))
        .route(
            "/api/conversations/:session_id/messages",
            post(send_message),
        )
        .route("/api/conversations/:session_id", get(get_conversation))
        .route(
            "/api/conversations/:session_id/meditation",
            post(generate_meditation),
        )
        .route("/api/conversations/:session_id", delete(end_conversation))
}
