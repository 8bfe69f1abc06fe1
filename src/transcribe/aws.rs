use anyhow::{Context, Result};
use async_trait::async_trait;
use aws_sdk_s3::Client as S3Client;
use aws_sdk_transcribe::Client as TranscribeClient;
use indicatif::ProgressBar;
use std::path::Path;
use uuid::Uuid;

use super::fallback::SpeechToText;
use super::processor::TranscriptionProcessor;
use crate::config::Config;
use crate::utils::normalize_language_code;

/// Speech-to-text through AWS Transcribe, staging audio in S3
pub struct AwsSpeechToText {
    s3_client: S3Client,
    transcribe_client: TranscribeClient,
    bucket: String,
    key_prefix: String,
    language: Option<String>,
    progress: ProgressBar,
}

impl AwsSpeechToText {
    /// Create clients from the AWS section of the configuration
    pub async fn from_config(config: &Config) -> Result<Self> {
        config.validate_aws()?;

        let aws_config = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .region(config.aws_region())
            .load()
            .await;

        Ok(Self {
            s3_client: S3Client::new(&aws_config),
            transcribe_client: TranscribeClient::new(&aws_config),
            bucket: config.aws.s3_bucket.clone(),
            key_prefix: config.aws.s3_key_prefix.clone().unwrap_or_default(),
            language: config.aws.transcription.default_language.clone(),
            progress: ProgressBar::hidden(),
        })
    }

    /// Report job status on the caller's progress bar
    pub fn with_progress(mut self, progress: ProgressBar) -> Self {
        self.progress = progress;
        self
    }

    fn object_key(&self) -> String {
        format!(
            "{}audio_{}_{}.wav",
            self.key_prefix,
            Uuid::new_v4(),
            chrono::Utc::now().format("%Y%m%d_%H%M%S"),
        )
    }

    /// Upload audio file to S3
    async fn upload_to_s3(&self, audio_path: &Path, key: &str) -> Result<()> {
        tracing::info!("Uploading audio to S3: s3://{}/{}", self.bucket, key);

        let content = fs_err::read(audio_path)?;

        self.s3_client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(content.into())
            .content_type("audio/wav")
            .send()
            .await
            .context("Failed to upload audio to S3")?;

        Ok(())
    }

    /// Start AWS Transcribe job, auto-detecting the language unless one is configured
    async fn start_transcription_job(&self, s3_key: &str) -> Result<String> {
        use aws_sdk_transcribe::types::{LanguageCode, Media, MediaFormat};

        let job_name = format!("summarizer_{}", Uuid::new_v4());
        let media_uri = format!("s3://{}/{}", self.bucket, s3_key);

        tracing::info!("Starting transcription job: {}", job_name);

        let media = Media::builder().media_file_uri(media_uri).build();

        let mut job_builder = self
            .transcribe_client
            .start_transcription_job()
            .transcription_job_name(&job_name)
            .media_format(MediaFormat::Wav)
            .media_sample_rate_hertz(16000)
            .media(media);

        if let Some(lang) = self.language.as_deref() {
            tracing::info!("Using specified language: {}", lang);
            let code = normalize_language_code(lang);
            job_builder = job_builder.language_code(LanguageCode::from(code.as_str()));
        } else {
            tracing::info!("Using automatic language detection");
            job_builder = job_builder.identify_language(true);
        }

        job_builder
            .send()
            .await
            .context("Failed to start transcription job")?;

        Ok(job_name)
    }

    async fn run_job(&self, s3_key: &str) -> Result<String> {
        let job_id = self.start_transcription_job(s3_key).await?;
        TranscriptionProcessor::new(self.transcribe_client.clone(), job_id, self.progress.clone())
            .wait_for_completion()
            .await
    }
}

async fn delete_object(client: &S3Client, bucket: &str, key: &str) -> Result<()> {
    tracing::debug!("Cleaning up S3 object: {}", key);

    client
        .delete_object()
        .bucket(bucket)
        .key(key)
        .send()
        .await
        .context("Failed to clean up S3 object")?;

    Ok(())
}

/// An S3 object staged for one transcription.
///
/// Call [`StagedObject::remove`] on every completed path. If the owning future
/// is dropped first, the delete is spawned on the current runtime instead.
struct StagedObject {
    client: S3Client,
    bucket: String,
    key: String,
    armed: bool,
}

impl StagedObject {
    fn new(owner: &AwsSpeechToText, key: String) -> Self {
        Self {
            client: owner.s3_client.clone(),
            bucket: owner.bucket.clone(),
            key,
            armed: true,
        }
    }

    async fn remove(mut self) -> Result<()> {
        self.armed = false;
        delete_object(&self.client, &self.bucket, &self.key).await
    }
}

impl Drop for StagedObject {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }

        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            tracing::warn!("No runtime to remove abandoned S3 object {}", self.key);
            return;
        };

        tracing::debug!("Transcription abandoned, removing S3 object {}", self.key);
        let client = self.client.clone();
        let bucket = std::mem::take(&mut self.bucket);
        let key = std::mem::take(&mut self.key);
        runtime.spawn(async move {
            if let Err(e) = delete_object(&client, &bucket, &key).await {
                tracing::warn!("{:#}", e);
            }
        });
    }
}

#[async_trait]
impl SpeechToText for AwsSpeechToText {
    async fn transcribe(&self, audio: &Path) -> Result<String> {
        // Guard before the upload so a cancelled upload is still cleaned up
        let staged = StagedObject::new(self, self.object_key());
        self.upload_to_s3(audio, &staged.key).await?;

        let result = self.run_job(&staged.key).await;

        if let Err(e) = staged.remove().await {
            tracing::warn!("{:#}", e);
        }

        result
    }
}
