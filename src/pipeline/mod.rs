use anyhow::Context;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use indicatif::ProgressBar;
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::analysis::{self, Sentiment};
use crate::config::Config;
use crate::extractors::local::{self, FileMetadata};
use crate::extractors::youtube::YtDlpClient;
use crate::extractors::{
    extract_video_id, fetch_metadata, is_local_file, MediaContainer, MetadataProvider, VideoMetadata,
};
use crate::storage::{JsonDirStore, SummaryStore};
use crate::summarize::{OpenAiClient, Summarizer, SummaryOptions};
use crate::transcribe::aws::AwsSpeechToText;
use crate::transcribe::{
    AudioTranscriber, FfmpegAudioExtractor, SpeechToText, Transcript, TranscriptAcquirer,
    TranscriptSource,
};
use crate::{Result, StageResult, SummarizerError};

/// Media a summary can be produced from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MediaInput {
    /// A video page URL carrying an 11-character identifier
    Url(String),
    /// A video file on local disk
    File(PathBuf),
    /// Video bytes received from a caller, with the caller's file name
    Upload {
        file_name: String,
        bytes: Vec<u8>,
        content_type: Option<String>,
    },
}

impl MediaInput {
    /// Classify a command-line argument as a local path or a URL
    pub fn from_arg(arg: &str) -> Self {
        if is_local_file(arg) {
            MediaInput::File(PathBuf::from(arg))
        } else {
            MediaInput::Url(arg.to_string())
        }
    }

    /// Checks that need no network or configuration
    pub fn precheck(&self) -> StageResult<()> {
        match self {
            MediaInput::Url(locator) => extract_video_id(locator).map(|_| ()),
            MediaInput::File(path) => MediaContainer::from_path(path).map(|_| ()),
            MediaInput::Upload { file_name, .. } => {
                MediaContainer::from_path(Path::new(file_name)).map(|_| ())
            }
        }
    }
}

/// Descriptive data of the summarized media
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RecordMetadata {
    Video(VideoMetadata),
    File(FileMetadata),
}

impl RecordMetadata {
    pub fn title(&self) -> &str {
        match self {
            RecordMetadata::Video(video) => &video.title,
            RecordMetadata::File(file) => &file.title,
        }
    }
}

/// Result of one successful run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryRecord {
    pub id: String,
    pub summary: String,
    pub metadata: RecordMetadata,
    pub transcript: String,
    pub transcript_source: TranscriptSource,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sentiment: Option<Sentiment>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keywords: Option<Vec<String>>,
    pub created_at: DateTime<Utc>,
}

impl SummaryRecord {
    pub fn title(&self) -> &str {
        self.metadata.title()
    }
}

pub trait IdGenerator: Send + Sync {
    fn next_id(&self) -> String;
}

/// Random v4 UUIDs
pub struct UuidGenerator;

impl IdGenerator for UuidGenerator {
    fn next_id(&self) -> String {
        uuid::Uuid::new_v4().to_string()
    }
}

pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Stands in for speech-to-text when AWS is not configured
struct UnconfiguredSpeechToText {
    reason: String,
}

#[async_trait]
impl SpeechToText for UnconfiguredSpeechToText {
    async fn transcribe(&self, _audio: &Path) -> Result<String> {
        anyhow::bail!("Speech-to-text is not available: {}", self.reason)
    }
}

/// Orchestrates identifier, metadata, transcript, summary and analysis stages
pub struct SummaryPipeline {
    metadata: Arc<dyn MetadataProvider>,
    acquirer: TranscriptAcquirer,
    summarizer: Summarizer,
    store: Arc<dyn SummaryStore>,
    ids: Arc<dyn IdGenerator>,
    clock: Arc<dyn Clock>,
    temp_dir: Option<PathBuf>,
}

impl SummaryPipeline {
    pub fn new(
        metadata: Arc<dyn MetadataProvider>,
        acquirer: TranscriptAcquirer,
        summarizer: Summarizer,
        store: Arc<dyn SummaryStore>,
    ) -> Self {
        Self {
            metadata,
            acquirer,
            summarizer,
            store,
            ids: Arc::new(UuidGenerator),
            clock: Arc::new(SystemClock),
            temp_dir: None,
        }
    }

    pub fn with_id_generator(mut self, ids: Arc<dyn IdGenerator>) -> Self {
        self.ids = ids;
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Directory for upload staging files
    pub fn with_temp_dir(mut self, dir: Option<PathBuf>) -> Self {
        self.temp_dir = dir;
        self
    }

    /// Wire the default providers from configuration.
    ///
    /// Long-running transcription reports its status on `progress`.
    pub async fn from_config(config: &Config, progress: ProgressBar) -> Result<Self> {
        let yt_dlp = YtDlpClient::new(
            config.app.yt_dlp_path.clone(),
            config.summarizer.caption_languages.clone(),
        );

        let speech: Arc<dyn SpeechToText> = match AwsSpeechToText::from_config(config).await {
            Ok(aws) => Arc::new(aws.with_progress(progress)),
            Err(e) => {
                tracing::warn!("Speech-to-text fallback disabled: {:#}", e);
                Arc::new(UnconfiguredSpeechToText {
                    reason: format!("{:#}", e),
                })
            }
        };

        let extractor = Arc::new(FfmpegAudioExtractor::new(
            config.app.ffmpeg_path.clone(),
            yt_dlp.clone(),
        ));
        let fallback =
            AudioTranscriber::new(extractor, speech).with_temp_dir(config.app.temp_dir.clone());
        let acquirer = TranscriptAcquirer::new(Arc::new(yt_dlp.clone()), fallback);

        let generator = OpenAiClient::new(&config.openai, config.openai_api_key()?)?;
        let summarizer = Summarizer::new(Arc::new(generator))
            .with_max_transcript_chars(config.summarizer.max_transcript_chars);

        let store = JsonDirStore::new(config.data_dir()?);

        Ok(Self::new(Arc::new(yt_dlp), acquirer, summarizer, Arc::new(store))
            .with_temp_dir(config.app.temp_dir.clone()))
    }

    /// Run every stage for one input and store the resulting record.
    ///
    /// Nothing is stored unless every stage succeeded.
    pub async fn produce_summary(
        &self,
        input: MediaInput,
        options: SummaryOptions,
    ) -> StageResult<SummaryRecord> {
        let (metadata, transcript) = match input {
            MediaInput::Url(locator) => self.acquire_video(&locator).await?,
            MediaInput::File(path) => self.acquire_file(&path, None, None).await?,
            MediaInput::Upload {
                file_name,
                bytes,
                content_type,
            } => {
                self.acquire_upload(&file_name, &bytes, content_type.as_deref())
                    .await?
            }
        };

        let summary = self.summarizer.summarize(&transcript.text, &options).await?;

        let sentiment = options
            .include_sentiment
            .then(|| analysis::sentiment(&transcript.text));
        let keywords = analysis::keywords(&transcript.text);

        let record = SummaryRecord {
            id: self.ids.next_id(),
            summary,
            metadata,
            transcript: transcript.text,
            transcript_source: transcript.source,
            sentiment,
            keywords: Some(keywords),
            created_at: self.clock.now(),
        };

        self.store
            .put(record.clone())
            .await
            .map_err(SummarizerError::Storage)?;

        tracing::info!("Stored summary {} for \"{}\"", record.id, record.title());
        Ok(record)
    }

    async fn acquire_video(&self, locator: &str) -> StageResult<(RecordMetadata, Transcript)> {
        let id = extract_video_id(locator)?;
        tracing::info!("Processing video {}", id);

        let metadata = fetch_metadata(self.metadata.as_ref(), &id);
        let transcript = self.acquirer.acquire_from_identifier(&id);
        tokio::pin!(metadata, transcript);

        // A metadata failure drops the transcript work still in flight. When
        // both fail, the metadata error wins.
        tokio::select! {
            metadata = &mut metadata => {
                let metadata = metadata?;
                Ok((RecordMetadata::Video(metadata), transcript.await?))
            }
            transcript = &mut transcript => {
                let metadata = metadata.await?;
                Ok((RecordMetadata::Video(metadata), transcript?))
            }
        }
    }

    async fn acquire_file(
        &self,
        path: &Path,
        title: Option<&str>,
        content_type: Option<&str>,
    ) -> StageResult<(RecordMetadata, Transcript)> {
        let container = MediaContainer::from_path(path)?;
        tracing::info!("Processing {} file {}", container.as_str(), path.display());

        let metadata = local::describe_file(path, container, title, content_type)
            .await
            .map_err(|source| SummarizerError::TranscriptionFailed {
                media: path.display().to_string(),
                source,
            })?;

        let transcript = self.acquirer.acquire_from_file(path).await?;
        Ok((RecordMetadata::File(metadata), transcript))
    }

    async fn acquire_upload(
        &self,
        file_name: &str,
        bytes: &[u8],
        content_type: Option<&str>,
    ) -> StageResult<(RecordMetadata, Transcript)> {
        let container = MediaContainer::from_path(Path::new(file_name))?;

        let upload = self
            .stage_upload(container, bytes)
            .map_err(|source| SummarizerError::TranscriptionFailed {
                media: file_name.to_string(),
                source,
            })?;
        let upload_path = upload.path().to_path_buf();

        let result = self
            .acquire_file(&upload_path, Some(file_name), content_type)
            .await;

        if let Err(e) = upload.close() {
            tracing::warn!("Failed to remove uploaded file {}: {}", upload_path.display(), e);
        }

        result
    }

    fn stage_upload(&self, container: MediaContainer, bytes: &[u8]) -> Result<tempfile::NamedTempFile> {
        let suffix = format!(".{}", container.as_str());
        let mut builder = tempfile::Builder::new();
        builder.prefix("upload_").suffix(&suffix);

        let mut upload = match &self.temp_dir {
            Some(dir) => {
                fs_err::create_dir_all(dir)?;
                builder.tempfile_in(dir)
            }
            None => builder.tempfile(),
        }
        .context("Failed to create upload file")?;

        upload
            .as_file_mut()
            .write_all(bytes)
            .context("Failed to write upload file")?;
        upload.as_file_mut().flush()?;

        Ok(upload)
    }
}
