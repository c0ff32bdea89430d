//! Ports - interfaces to external collaborators.

mod text_generator;

pub use text_generator::{GenerationContext, GeneratorError, TextGenerator};
