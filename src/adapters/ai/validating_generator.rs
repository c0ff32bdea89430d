//! Output-validating decorator over any text generator.

use std::sync::Arc;

use async_trait::async_trait;

use crate::ports::{GenerationContext, GeneratorError, TextGenerator};

/// Wraps a generator and rejects unusable output before it reaches the
/// collector: whitespace-only completions become [`GeneratorError::EmptyOutput`]
/// and completions beyond `max_output_chars` become
/// [`GeneratorError::OutputTooLong`]. Accepted output is returned trimmed.
pub struct ValidatingGenerator {
    inner: Arc<dyn TextGenerator>,
    max_output_chars: usize,
}

impl ValidatingGenerator {
    pub fn new(inner: Arc<dyn TextGenerator>, max_output_chars: usize) -> Self {
        Self {
            inner,
            max_output_chars,
        }
    }
}

#[async_trait]
impl TextGenerator for ValidatingGenerator {
    async fn complete(
        &self,
        prompt: &str,
        ctx: &GenerationContext,
    ) -> Result<String, GeneratorError> {
        let output = self.inner.complete(prompt, ctx).await?;
        let trimmed = output.trim();

        if trimmed.is_empty() {
            return Err(GeneratorError::EmptyOutput);
        }

        let chars = trimmed.chars().count();
        if chars > self.max_output_chars {
            return Err(GeneratorError::OutputTooLong {
                chars,
                max: self.max_output_chars,
            });
        }

        Ok(trimmed.to_string())
    }
}
