//! HTTP handlers for conversation endpoints
//!
//! These handlers connect axum routes to the conversation collector. Each
//! session's collector sits behind an async mutex in the registry, so
//! concurrent requests against the same session serialize instead of
//! interleaving.

use std::str::FromStr;
use std::sync::Arc;

use axum::extract::{Json, Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;

use crate::adapters::storage::InMemorySessionRegistry;
use crate::application::{CollectorError, CollectorOptions, ConversationCollector};
use crate::domain::foundation::SessionId;
use crate::ports::TextGenerator;

use super::dto::{
    ConversationStateResponse, DeleteConversationResponse, ErrorResponse,
    GenerateMeditationRequest, HealthResponse, MeditationResponse, SendMessageRequest,
    SendMessageResponse, StartConversationRequest, StartConversationResponse, TurnDto,
};

type ApiError = (StatusCode, Json<ErrorResponse>);

// ════════════════════════════════════════════════════════════════════════════════
// Application State
// ════════════════════════════════════════════════════════════════════════════════

/// Shared application state containing all dependencies
#[derive(Clone)]
pub struct ConversationAppState {
    pub registry: InMemorySessionRegistry,
    pub generator: Arc<dyn TextGenerator>,
    pub options: CollectorOptions,
}

impl ConversationAppState {
    pub fn new(
        registry: InMemorySessionRegistry,
        generator: Arc<dyn TextGenerator>,
        options: CollectorOptions,
    ) -> Self {
        Self {
            registry,
            generator,
            options,
        }
    }

    fn new_collector(&self) -> ConversationCollector {
        ConversationCollector::new(self.generator.clone(), self.options)
    }
}

fn parse_session_id(raw: &str) -> Result<SessionId, ApiError> {
    SessionId::from_str(raw).map_err(|_| {
        (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::bad_request("Invalid session_id format")),
        )
    })
}

fn map_collector_error(error: CollectorError) -> ApiError {
    match error {
        CollectorError::InvalidArgument(e) => (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::bad_request(e.to_string())),
        ),
        CollectorError::SessionNotStarted { .. } | CollectorError::InvalidState { .. } => (
            StatusCode::CONFLICT,
            Json(ErrorResponse::conflict(error.to_string())),
        ),
        CollectorError::Generator(e) => (
            StatusCode::BAD_GATEWAY,
            Json(ErrorResponse::bad_gateway(format!(
                "Generator error: {}",
                e
            ))),
        ),
    }
}

fn session_not_found(session_id: SessionId) -> ApiError {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorResponse::not_found(
            "Conversation",
            &session_id.to_string(),
        )),
    )
}

// ════════════════════════════════════════════════════════════════════════════════
// Handlers
// ════════════════════════════════════════════════════════════════════════════════

/// Health check
///
/// GET /
pub async fn health() -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok",
        service: "stillpoint",
    })
}

/// Start a new conversation
///
/// POST /api/conversations
pub async fn start_conversation(
    State(app_state): State<ConversationAppState>,
    Json(req): Json<StartConversationRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let session_id = match req.session_id.as_deref() {
        Some(raw) => Some(parse_session_id(raw)?),
        None => None,
    };

    if let Some(session_id) = session_id {
        if app_state.registry.contains(session_id).await {
            return Err((
                StatusCode::CONFLICT,
                Json(ErrorResponse::conflict(format!(
                    "Conversation {} already exists",
                    session_id
                ))),
            ));
        }
    }

    let mut collector = app_state.new_collector();
    let outcome = collector
        .start(req.user_id, session_id)
        .await
        .map_err(map_collector_error)?;

    if !app_state.registry.insert(outcome.session_id, collector).await {
        // Lost a race on a caller-chosen id between the check and the insert.
        return Err((
            StatusCode::CONFLICT,
            Json(ErrorResponse::conflict(format!(
                "Conversation {} already exists",
                outcome.session_id
            ))),
        ));
    }

    let response = StartConversationResponse {
        session_id: outcome.session_id.to_string(),
        message: outcome.message,
        state: outcome.state,
        turn: outcome.turn,
    };

    Ok((StatusCode::CREATED, Json(response)))
}

/// Send a user reply
///
/// POST /api/conversations/{session_id}/messages
pub async fn send_message(
    State(app_state): State<ConversationAppState>,
    Path(session_id): Path<String>,
    Json(req): Json<SendMessageRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let session_id = parse_session_id(&session_id)?;

    let collector = app_state
        .registry
        .get(session_id)
        .await
        .ok_or_else(|| session_not_found(session_id))?;

    let mut collector = collector.lock().await;
    let outcome = collector
        .continue_conversation(req.message)
        .await
        .map_err(map_collector_error)?;

    let response = SendMessageResponse {
        message: outcome.message().to_string(),
        state: outcome.state(),
        turn: outcome.turn(),
        ready_to_generate: outcome.is_ready(),
        remaining_turns: outcome.remaining_turns(),
        summary: outcome.summary().map(String::from),
    };

    Ok((StatusCode::OK, Json(response)))
}

/// Get conversation state and history
///
/// GET /api/conversations/{session_id}
pub async fn get_conversation(
    State(app_state): State<ConversationAppState>,
    Path(session_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let session_id = parse_session_id(&session_id)?;

    let collector = app_state
        .registry
        .get(session_id)
        .await
        .ok_or_else(|| session_not_found(session_id))?;

    let collector = collector.lock().await;
    let session = collector
        .session()
        .ok_or_else(|| session_not_found(session_id))?;

    let response = ConversationStateResponse {
        session_id: session.session_id().to_string(),
        user_id: session.user_id().to_string(),
        state: session.state(),
        turn_count: session.turn_count(),
        max_turns: session.max_turns(),
        remaining_turns: session.remaining_turns(),
        history: session.history().iter().map(TurnDto::from).collect(),
    };

    Ok((StatusCode::OK, Json(response)))
}

/// Generate the meditation script
///
/// POST /api/conversations/{session_id}/meditation
pub async fn generate_meditation(
    State(app_state): State<ConversationAppState>,
    Path(session_id): Path<String>,
    Json(req): Json<GenerateMeditationRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let session_id = parse_session_id(&session_id)?;

    let collector = app_state
        .registry
        .get(session_id)
        .await
        .ok_or_else(|| session_not_found(session_id))?;

    let mut collector = collector.lock().await;
    let script = collector
        .generate_meditation(req.summary)
        .await
        .map_err(map_collector_error)?;

    let response = MeditationResponse {
        text: script.text,
        summary: script.summary,
        char_count: script.char_count,
        state: script.state,
    };

    Ok((StatusCode::OK, Json(response)))
}

/// End a conversation
///
/// DELETE /api/conversations/{session_id}
pub async fn end_conversation(
    State(app_state): State<ConversationAppState>,
    Path(session_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let session_id = parse_session_id(&session_id)?;

    app_state
        .registry
        .remove(session_id)
        .await
        .ok_or_else(|| session_not_found(session_id))?;

    let response = DeleteConversationResponse {
        message: format!("Conversation {} ended successfully", session_id),
    };

    Ok((StatusCode::OK, Json(response)))
}
