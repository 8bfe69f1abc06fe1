use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::sync::Arc;

use crate::extractors::{CaptionProvider, VideoId};
use crate::{StageResult, SummarizerError};

pub mod aws;
pub mod fallback;
pub mod processor;

pub use fallback::{AudioExtractor, AudioTranscriber, FfmpegAudioExtractor, MediaSource, SpeechToText};

/// Which acquisition path produced a transcript
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TranscriptSource {
    Captions,
    SpeechToText,
}

impl fmt::Display for TranscriptSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TranscriptSource::Captions => write!(f, "captions"),
            TranscriptSource::SpeechToText => write!(f, "speech-to-text"),
        }
    }
}

/// Plain transcript text with the path that produced it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transcript {
    pub text: String,
    pub source: TranscriptSource,
}

/// States of a single acquisition.
///
/// `TryPrimary` only exists for identifier input; file input starts at
/// `TrySecondary`. Each path is attempted at most once.
#[derive(Debug)]
enum AcquisitionState {
    TryPrimary(VideoId),
    FallbackNeeded {
        media: MediaSource,
        reason: anyhow::Error,
    },
    TrySecondary(MediaSource),
    Success(Transcript),
    Failure(SummarizerError),
}

/// Produces transcript text, captions first and speech-to-text second
pub struct TranscriptAcquirer {
    captions: Arc<dyn CaptionProvider>,
    fallback: AudioTranscriber,
}

impl TranscriptAcquirer {
    pub fn new(captions: Arc<dyn CaptionProvider>, fallback: AudioTranscriber) -> Self {
        Self { captions, fallback }
    }

    /// Acquire a transcript for a remote video
    pub async fn acquire_from_identifier(&self, id: &VideoId) -> StageResult<Transcript> {
        self.run(AcquisitionState::TryPrimary(id.clone())).await
    }

    /// Acquire a transcript for a local file, skipping the caption path
    pub async fn acquire_from_file(&self, path: &Path) -> StageResult<Transcript> {
        self.run(AcquisitionState::TrySecondary(MediaSource::File(path.to_path_buf())))
            .await
    }

    async fn run(&self, mut state: AcquisitionState) -> StageResult<Transcript> {
        loop {
            state = match state {
                AcquisitionState::TryPrimary(id) => self.try_primary(id).await,
                AcquisitionState::FallbackNeeded { media, reason } => {
                    tracing::warn!("Captions unavailable, falling back to speech-to-text: {:#}", reason);
                    AcquisitionState::TrySecondary(media)
                }
                AcquisitionState::TrySecondary(media) => self.try_secondary(media).await,
                AcquisitionState::Success(transcript) => {
                    tracing::info!(
                        "Transcript acquired via {} ({} chars)",
                        transcript.source,
                        transcript.text.len()
                    );
                    return Ok(transcript);
                }
                AcquisitionState::Failure(error) => return Err(error),
            };
        }
    }

    async fn try_primary(&self, id: VideoId) -> AcquisitionState {
        tracing::info!("Fetching captions for video {}", id);
        let media = MediaSource::Url(id.watch_url());

        match self.captions.get_captions(&id).await {
            Ok(fragments) => {
                let text = join_fragments(fragments.iter().map(|f| f.text.as_str()));
                if text.is_empty() {
                    AcquisitionState::FallbackNeeded {
                        media,
                        reason: anyhow::anyhow!("caption track for {} is empty", id),
                    }
                } else {
                    AcquisitionState::Success(Transcript {
                        text,
                        source: TranscriptSource::Captions,
                    })
                }
            }
            Err(reason) => AcquisitionState::FallbackNeeded { media, reason },
        }
    }

    async fn try_secondary(&self, media: MediaSource) -> AcquisitionState {
        match self.fallback.transcribe(&media).await {
            Ok(text) => AcquisitionState::Success(Transcript {
                text,
                source: TranscriptSource::SpeechToText,
            }),
            Err(error) => AcquisitionState::Failure(SummarizerError::TranscriptUnavailable {
                source: Box::new(error),
            }),
        }
    }
}

/// Join fragments with single spaces, preserving order
pub fn join_fragments<'a>(fragments: impl IntoIterator<Item = &'a str>) -> String {
    fragments
        .into_iter()
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}
