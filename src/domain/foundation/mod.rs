//! Foundation types shared across the domain layer.

mod errors;
mod ids;
mod state_machine;

pub use errors::ValidationError;
pub use ids::{SessionId, UserId};
pub use state_machine::StateMachine;
