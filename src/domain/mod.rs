//! Domain layer - core business types with no infrastructure dependencies.

pub mod conversation;
pub mod foundation;
