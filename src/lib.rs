//! Video Summarizer - turn videos into summaries, sentiment and keywords
//!
//! This library acquires a transcript for a YouTube video or a local video file
//! (captions first, speech-to-text as the fallback), summarizes it with a
//! generative text service and derives sentiment and keyword data from it.

pub mod analysis;
pub mod cli;
pub mod config;
pub mod extractors;
pub mod output;
pub mod pipeline;
pub mod storage;
pub mod summarize;
pub mod transcribe;
pub mod utils;

pub use analysis::{Sentiment, SentimentLabel};
pub use cli::{Cli, Commands, OutputFormat};
pub use config::Config;
pub use extractors::{MediaContainer, VideoId, VideoMetadata};
pub use pipeline::{MediaInput, RecordMetadata, SummaryPipeline, SummaryRecord};
pub use storage::{InMemoryStore, JsonDirStore, SummaryStore};
pub use summarize::{SummaryFormat, SummaryLength, SummaryOptions};
pub use transcribe::{Transcript, TranscriptAcquirer, TranscriptSource};

/// Result type used by providers and the binary
pub type Result<T> = anyhow::Result<T>;

/// Result type of the pipeline stages
pub type StageResult<T> = std::result::Result<T, SummarizerError>;

/// Error types specific to the summarizer pipeline
#[derive(thiserror::Error, Debug)]
pub enum SummarizerError {
    #[error("Invalid video locator: {0}")]
    InvalidLocator(String),

    #[error("Metadata unavailable for video {id}: {source}")]
    MetadataUnavailable {
        id: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("Transcription failed for {media}: {source}")]
    TranscriptionFailed {
        media: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("Transcript unavailable: {source}")]
    TranscriptUnavailable {
        #[source]
        source: Box<SummarizerError>,
    },

    #[error("Summarization failed: {0}")]
    SummarizationFailed(#[source] anyhow::Error),

    #[error("Unsupported media format: {0} (accepted: mp4, avi, mov, mkv)")]
    UnsupportedMediaFormat(String),

    #[error("Summary storage failed: {0}")]
    Storage(#[source] anyhow::Error),
}

impl SummarizerError {
    /// Name of the pipeline stage the error came from
    pub fn stage(&self) -> &'static str {
        match self {
            SummarizerError::InvalidLocator(_) => "identifier",
            SummarizerError::MetadataUnavailable { .. } => "metadata",
            SummarizerError::TranscriptionFailed { .. } => "transcription",
            SummarizerError::TranscriptUnavailable { .. } => "transcript",
            SummarizerError::SummarizationFailed(_) => "summary",
            SummarizerError::UnsupportedMediaFormat(_) => "input",
            SummarizerError::Storage(_) => "storage",
        }
    }
}
