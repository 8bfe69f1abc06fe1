use anyhow::Context;
use async_trait::async_trait;
use std::sync::Arc;

pub mod openai;
pub mod options;
pub mod prompt;

pub use openai::OpenAiClient;
pub use options::{SummaryFormat, SummaryLength, SummaryOptions};

use crate::{Result, StageResult, SummarizerError};

pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo";
pub const DEFAULT_TEMPERATURE: f32 = 0.3;
/// Transcripts longer than this many characters are summarized in chunks
pub const DEFAULT_MAX_TRANSCRIPT_CHARS: usize = 48_000;

/// A generative text service
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String>;
}

/// Turns transcripts into prose summaries
pub struct Summarizer {
    generator: Arc<dyn TextGenerator>,
    max_transcript_chars: usize,
}

impl Summarizer {
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        Self {
            generator,
            max_transcript_chars: DEFAULT_MAX_TRANSCRIPT_CHARS,
        }
    }

    pub fn with_max_transcript_chars(mut self, max_transcript_chars: usize) -> Self {
        self.max_transcript_chars = max_transcript_chars;
        self
    }

    /// Summarize a transcript according to the options
    pub async fn summarize(&self, transcript: &str, options: &SummaryOptions) -> StageResult<String> {
        tracing::info!(
            "Summarizing transcript ({} format, {} length, {})",
            options.format,
            options.length,
            options.language
        );

        self.summarize_chunks(transcript, options)
            .await
            .map_err(SummarizerError::SummarizationFailed)
    }

    async fn summarize_chunks(&self, transcript: &str, options: &SummaryOptions) -> Result<String> {
        let chunks = chunk_text(transcript, self.max_transcript_chars);
        if chunks.len() <= 1 {
            return self.complete(&prompt::summary_prompt(transcript, options)).await;
        }

        let total = chunks.len();
        tracing::info!(
            "Transcript has {} chars, summarizing in {} chunks",
            transcript.chars().count(),
            total
        );

        let mut partials = Vec::with_capacity(total);
        for (index, chunk) in chunks.iter().enumerate() {
            let partial = self
                .complete(&prompt::partial_prompt(chunk, index, total, options))
                .await
                .with_context(|| format!("Failed to summarize part {} of {}", index + 1, total))?;
            partials.push(partial);
        }

        self.complete(&prompt::combine_prompt(&partials, options))
            .await
            .context("Failed to combine partial summaries")
    }

    async fn complete(&self, prompt: &str) -> Result<String> {
        let response = self.generator.generate(prompt).await?;
        let summary = response.trim();
        if summary.is_empty() {
            anyhow::bail!("Generative text service returned an empty summary");
        }
        Ok(summary.to_string())
    }
}

/// Split text at whitespace into chunks of at most `max_chars` characters.
///
/// A single word longer than the limit becomes its own chunk. A limit of zero
/// disables chunking.
pub fn chunk_text(text: &str, max_chars: usize) -> Vec<String> {
    if max_chars == 0 || text.chars().count() <= max_chars {
        return vec![text.to_string()];
    }

    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for word in text.split_whitespace() {
        let word_len = word.chars().count();
        let needed = if current.is_empty() { word_len } else { word_len + 1 };

        if current_len + needed > max_chars && !current.is_empty() {
            chunks.push(std::mem::take(&mut current));
            current_len = 0;
        }

        if !current.is_empty() {
            current.push(' ');
            current_len += 1;
        }
        current.push_str(word);
        current_len += word_len;
    }

    if !current.is_empty() {
        chunks.push(current);
    }

    chunks
}
