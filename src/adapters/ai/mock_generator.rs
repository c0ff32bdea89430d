//! Mock text generator for tests.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::ports::{GenerationContext, GeneratorError, TextGenerator};

/// One captured `complete` invocation.
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub prompt: String,
    pub ctx: GenerationContext,
}

/// Test double that replays queued responses and records every call.
///
/// Responses are consumed in FIFO order; once the queue is empty a fixed
/// fallback response is returned so tests only queue the turns they assert
/// on. Clones share the queue and the call log.
#[derive(Clone)]
pub struct MockGenerator {
    responses: Arc<Mutex<VecDeque<Result<String, GeneratorError>>>>,
    calls: Arc<Mutex<Vec<RecordedCall>>>,
}

impl MockGenerator {
    pub fn new() -> Self {
        Self {
            responses: Arc::new(Mutex::new(VecDeque::new())),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Queues a successful response.
    pub fn with_response(self, response: impl Into<String>) -> Self {
        if let Ok(mut queue) = self.responses.lock() {
            queue.push_back(Ok(response.into()));
        }
        self
    }

    /// Queues a failure.
    pub fn with_error(self, error: GeneratorError) -> Self {
        if let Ok(mut queue) = self.responses.lock() {
            queue.push_back(Err(error));
        }
        self
    }

    /// All calls captured so far.
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().map(|c| c.len()).unwrap_or(0)
    }

    /// Prompt of the most recent call, if any.
    pub fn last_prompt(&self) -> Option<String> {
        self.calls
            .lock()
            .ok()
            .and_then(|c| c.last().map(|call| call.prompt.clone()))
    }
}

impl Default for MockGenerator {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TextGenerator for MockGenerator {
    async fn complete(
        &self,
        prompt: &str,
        ctx: &GenerationContext,
    ) -> Result<String, GeneratorError> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(RecordedCall {
                prompt: prompt.to_string(),
                ctx: ctx.clone(),
            });
        }

        let queued = self
            .responses
            .lock()
            .ok()
            .and_then(|mut queue| queue.pop_front());

        match queued {
            Some(result) => result,
            None => Ok("mock response".to_string()),
        }
    }
}
