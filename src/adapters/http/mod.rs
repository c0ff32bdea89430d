//! HTTP adapters - the axum surface over the application layer.

pub mod conversation;
