use anyhow::Context;
use async_trait::async_trait;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::NamedTempFile;
use tokio::process::Command;

use crate::extractors::{local, youtube::YtDlpClient};
use crate::{Result, StageResult, SummarizerError};

/// Media handed to the audio-to-text fallback
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MediaSource {
    /// A playable page or stream URL
    Url(String),
    /// A local media file
    File(PathBuf),
}

impl fmt::Display for MediaSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MediaSource::Url(url) => f.write_str(url),
            MediaSource::File(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Demultiplexes the audio track of a media source into a WAV file
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AudioExtractor: Send + Sync {
    async fn extract_audio(&self, media: &MediaSource, output: &Path) -> Result<()>;
}

/// Converts speech in an audio file to text
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SpeechToText: Send + Sync {
    async fn transcribe(&self, audio: &Path) -> Result<String>;
}

/// Audio-to-text fallback.
///
/// Every call owns exactly one temporary audio artifact, which is removed on
/// every exit path, including when the returned future is dropped early.
pub struct AudioTranscriber {
    extractor: Arc<dyn AudioExtractor>,
    speech: Arc<dyn SpeechToText>,
    temp_dir: Option<PathBuf>,
}

impl AudioTranscriber {
    pub fn new(extractor: Arc<dyn AudioExtractor>, speech: Arc<dyn SpeechToText>) -> Self {
        Self {
            extractor,
            speech,
            temp_dir: None,
        }
    }

    /// Place temporary artifacts under `dir` instead of the system temp dir
    pub fn with_temp_dir(mut self, dir: Option<PathBuf>) -> Self {
        self.temp_dir = dir;
        self
    }

    pub async fn transcribe(&self, media: &MediaSource) -> StageResult<String> {
        let failed = |source: anyhow::Error| SummarizerError::TranscriptionFailed {
            media: media.to_string(),
            source,
        };

        let artifact = self.create_artifact().map_err(failed)?;
        let artifact_path = artifact.path().to_path_buf();

        let result = self.transcribe_artifact(media, &artifact_path).await;

        if let Err(e) = artifact.close() {
            tracing::warn!("Failed to remove temporary audio {}: {}", artifact_path.display(), e);
        }

        result.map_err(failed)
    }

    fn create_artifact(&self) -> Result<NamedTempFile> {
        let mut builder = tempfile::Builder::new();
        builder.prefix("audio_").suffix(".wav");

        let artifact = match &self.temp_dir {
            Some(dir) => {
                fs_err::create_dir_all(dir)?;
                builder.tempfile_in(dir)
            }
            None => builder.tempfile(),
        };

        artifact.context("Failed to create temporary audio file")
    }

    async fn transcribe_artifact(&self, media: &MediaSource, artifact: &Path) -> Result<String> {
        tracing::info!("Extracting audio from {} to {}", media, artifact.display());
        self.extractor.extract_audio(media, artifact).await?;

        let text = self.speech.transcribe(artifact).await?;
        let text = text.trim();
        if text.is_empty() {
            anyhow::bail!("Speech-to-text returned an empty transcript");
        }

        Ok(text.to_string())
    }
}

/// Audio extraction using ffmpeg, with yt-dlp resolving remote pages to streams
pub struct FfmpegAudioExtractor {
    ffmpeg_path: String,
    yt_dlp: YtDlpClient,
}

impl FfmpegAudioExtractor {
    pub fn new(ffmpeg_path: impl Into<String>, yt_dlp: YtDlpClient) -> Self {
        Self {
            ffmpeg_path: ffmpeg_path.into(),
            yt_dlp,
        }
    }

    /// Convert any input ffmpeg can read into 16 kHz mono PCM WAV
    async fn convert_to_wav(&self, input: &str, output: &Path) -> Result<()> {
        tracing::debug!("Converting {} to WAV", input);
        let output_arg = output.to_string_lossy();

        let result = Command::new(&self.ffmpeg_path)
            .args([
                "-hide_banner",
                "-loglevel", "error",
                "-i", input,
                "-vn", // No video
                "-ac", "1",
                "-ar", "16000",
                "-acodec", "pcm_s16le",
                "-f", "wav",
                "-y", // Overwrite the placeholder artifact
                output_arg.as_ref(),
            ])
            .output()
            .await
            .with_context(|| format!("Failed to launch {}", self.ffmpeg_path))?;

        if !result.status.success() {
            let error = String::from_utf8_lossy(&result.stderr);
            anyhow::bail!("Failed to extract audio with ffmpeg: {}", error.trim());
        }

        Ok(())
    }
}

#[async_trait]
impl AudioExtractor for FfmpegAudioExtractor {
    async fn extract_audio(&self, media: &MediaSource, output: &Path) -> Result<()> {
        let input = match media {
            MediaSource::Url(url) => self.yt_dlp.resolve_stream_url(url).await?,
            MediaSource::File(path) => {
                local::validate_file(path).await?;
                path.to_string_lossy().into_owned()
            }
        };

        self.convert_to_wav(&input, output).await?;

        let written = tokio::fs::metadata(output).await?.len();
        if written == 0 {
            anyhow::bail!("No audio track found in {}", media);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    fn recording_extractor(seen: Arc<Mutex<Option<PathBuf>>>) -> MockAudioExtractor {
        let mut extractor = MockAudioExtractor::new();
        extractor.expect_extract_audio().times(1).returning(move |_, output| {
            assert!(output.exists());
            *seen.lock().unwrap() = Some(output.to_path_buf());
            fs_err::write(output, b"RIFF....WAVE").unwrap();
            Ok(())
        });
        extractor
    }

    #[tokio::test]
    async fn test_artifact_removed_after_success() {
        let seen = Arc::new(Mutex::new(None));
        let mut speech = MockSpeechToText::new();
        speech.expect_transcribe().times(1).returning(|_| Ok("  hello there \n".to_string()));

        let transcriber = AudioTranscriber::new(Arc::new(recording_extractor(seen.clone())), Arc::new(speech));
        let text = transcriber
            .transcribe(&MediaSource::File(PathBuf::from("talk.mp4")))
            .await
            .unwrap();

        assert_eq!(text, "hello there");
        let artifact = seen.lock().unwrap().clone().unwrap();
        assert_eq!(artifact.extension().unwrap(), "wav");
        assert!(!artifact.exists());
    }

    #[tokio::test]
    async fn test_artifact_removed_after_speech_failure() {
        let seen = Arc::new(Mutex::new(None));
        let mut speech = MockSpeechToText::new();
        speech
            .expect_transcribe()
            .times(1)
            .returning(|_| Err(anyhow::anyhow!("speech not recognized")));

        let transcriber = AudioTranscriber::new(Arc::new(recording_extractor(seen.clone())), Arc::new(speech));
        let err = transcriber
            .transcribe(&MediaSource::Url("https://www.youtube.com/watch?v=AAAAAAAAAAA".into()))
            .await
            .unwrap_err();

        assert!(matches!(err, SummarizerError::TranscriptionFailed { .. }));
        assert!(err.to_string().contains("speech not recognized"));
        assert!(!seen.lock().unwrap().clone().unwrap().exists());
    }

    #[tokio::test]
    async fn test_artifact_removed_after_extraction_failure() {
        let dir = tempfile::tempdir().unwrap();
        let mut extractor = MockAudioExtractor::new();
        extractor
            .expect_extract_audio()
            .times(1)
            .returning(|_, _| Err(anyhow::anyhow!("unreadable container")));
        let mut speech = MockSpeechToText::new();
        speech.expect_transcribe().never();

        let transcriber = AudioTranscriber::new(Arc::new(extractor), Arc::new(speech))
            .with_temp_dir(Some(dir.path().to_path_buf()));
        let result = transcriber.transcribe(&MediaSource::File(PathBuf::from("broken.mkv"))).await;

        assert!(result.is_err());
        assert_eq!(fs_err::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_empty_speech_result_is_a_failure() {
        let mut extractor = MockAudioExtractor::new();
        extractor.expect_extract_audio().returning(|_, _| Ok(()));
        let mut speech = MockSpeechToText::new();
        speech.expect_transcribe().returning(|_| Ok("   ".to_string()));

        let transcriber = AudioTranscriber::new(Arc::new(extractor), Arc::new(speech));
        let err = transcriber
            .transcribe(&MediaSource::File(PathBuf::from("silent.mp4")))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("empty transcript"));
    }

    #[tokio::test]
    async fn test_concurrent_calls_use_distinct_artifacts() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let recorder = seen.clone();
        let mut extractor = MockAudioExtractor::new();
        extractor.expect_extract_audio().times(2).returning(move |_, output| {
            recorder.lock().unwrap().push(output.to_path_buf());
            Ok(())
        });
        let mut speech = MockSpeechToText::new();
        speech.expect_transcribe().times(2).returning(|_| Ok("text".to_string()));

        let transcriber = AudioTranscriber::new(Arc::new(extractor), Arc::new(speech));
        let a = MediaSource::File(PathBuf::from("a.mp4"));
        let b = MediaSource::File(PathBuf::from("b.mp4"));
        let (ra, rb) = tokio::join!(transcriber.transcribe(&a), transcriber.transcribe(&b));
        assert!(ra.is_ok() && rb.is_ok());

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 2);
        assert_ne!(seen[0], seen[1]);
    }

    /// Speech service that never answers
    struct HangingSpeech;

    #[async_trait]
    impl SpeechToText for HangingSpeech {
        async fn transcribe(&self, _audio: &Path) -> Result<String> {
            std::future::pending().await
        }
    }

    #[tokio::test]
    async fn test_artifact_removed_when_call_is_abandoned() {
        let dir = tempfile::tempdir().unwrap();
        let seen = Arc::new(Mutex::new(None));
        let transcriber =
            AudioTranscriber::new(Arc::new(recording_extractor(seen.clone())), Arc::new(HangingSpeech))
                .with_temp_dir(Some(dir.path().to_path_buf()));

        let media = MediaSource::File(PathBuf::from("talk.mp4"));
        let outcome = tokio::time::timeout(
            std::time::Duration::from_millis(50),
            transcriber.transcribe(&media),
        )
        .await;

        assert!(outcome.is_err());
        assert!(!seen.lock().unwrap().clone().unwrap().exists());
        assert_eq!(fs_err::read_dir(dir.path()).unwrap().count(), 0);
    }
}
