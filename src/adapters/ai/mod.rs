//! AI adapters - text-generator implementations.

mod deepseek_generator;
mod mock_generator;
mod validating_generator;

pub use deepseek_generator::{DeepSeekConfig, DeepSeekGenerator};
pub use mock_generator::{MockGenerator, RecordedCall};
pub use validating_generator::ValidatingGenerator;
