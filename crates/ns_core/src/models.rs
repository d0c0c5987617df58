use std::fmt;

use async_trait::async_trait;
use serde::Serialize;

use crate::Result;

/// Hard ceiling on generated length, in word-units.
pub const MAX_GENERATION_LENGTH: usize = 100;
/// Floor on generated length, in word-units.
pub const MIN_GENERATION_LENGTH: usize = 20;
/// Characters per word-unit used to turn a character budget into a word budget.
pub const CHARS_PER_WORD: usize = 3;

/// Constraints handed to the summarization model for a single call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GenerationParams {
    pub max_length: usize,
    pub min_length: usize,
    pub do_sample: bool,
}

impl GenerationParams {
    /// Converts a character budget into word-unit constraints.
    ///
    /// The word budget is `chars / 3` capped at 100, the minimum is always 20
    /// and sampling is always off so identical inputs produce identical output.
    pub fn from_char_budget(max_chars: usize) -> Self {
        Self {
            max_length: (max_chars / CHARS_PER_WORD).min(MAX_GENERATION_LENGTH),
            min_length: MIN_GENERATION_LENGTH,
            do_sample: false,
        }
    }
}

/// A pretrained text-to-text summarization model, treated as a black box.
#[async_trait]
pub trait SummarizationModel: Send + Sync + fmt::Debug {
    /// Constant label reported back to clients.
    fn name(&self) -> &str;

    /// Whether simultaneous calls on one instance are safe. Callers serialize
    /// access when this is false.
    fn is_reentrant(&self) -> bool {
        false
    }

    /// Summarize `text` under the given constraints.
    async fn summarize(&self, text: &str, params: &GenerationParams) -> Result<String>;
}
