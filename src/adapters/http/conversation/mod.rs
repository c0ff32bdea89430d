//! Conversation HTTP endpoints.

pub mod dto;
pub mod handlers;
pub mod routes;

pub use handlers::ConversationAppState;
pub use routes::routes;
