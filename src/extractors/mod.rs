use async_trait::async_trait;
use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use url::Url;

pub mod local;
pub mod vtt;
pub mod youtube;

use crate::{Result, StageResult, SummarizerError};

/// 11-character video token following a `v=` query marker or a path separator
static VIDEO_ID_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:v=|/)([0-9A-Za-z_-]{11})").expect("video id pattern is valid")
});

/// Canonical identifier of a remote video
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VideoId(String);

impl VideoId {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Watch URL reconstructed from the identifier
    pub fn watch_url(&self) -> String {
        format!("https://www.youtube.com/watch?v={}", self.0)
    }
}

impl fmt::Display for VideoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Extract the video identifier from a locator such as a shareable URL.
///
/// The first 11-character token preceded by `v=` or `/` wins, so
/// `https://youtu.be/<id>`, `.../watch?v=<id>` and `.../embed/<id>` all work.
pub fn extract_video_id(locator: &str) -> StageResult<VideoId> {
    VIDEO_ID_PATTERN
        .captures(locator)
        .and_then(|caps| caps.get(1))
        .map(|m| VideoId(m.as_str().to_string()))
        .ok_or_else(|| SummarizerError::InvalidLocator(locator.to_string()))
}

/// Descriptive attributes of a remote video
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoMetadata {
    pub title: String,
    pub author: String,
    /// Duration in whole seconds
    pub duration_secs: u64,
    /// View count, when the provider reports one
    pub view_count: Option<u64>,
    pub publish_date: Option<NaiveDate>,
    pub thumbnail: String,
}

/// A single caption cue as returned by a caption provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaptionFragment {
    pub text: String,
    /// Start offset in seconds
    pub start: f64,
    /// Cue duration in seconds
    pub duration: f64,
}

/// Looks up descriptive metadata for a video
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MetadataProvider: Send + Sync {
    async fn lookup(&self, id: &VideoId) -> Result<VideoMetadata>;
}

/// Fetches an existing caption track for a video
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CaptionProvider: Send + Sync {
    async fn get_captions(&self, id: &VideoId) -> Result<Vec<CaptionFragment>>;
}

/// Fetch metadata once, wrapping any provider failure
pub async fn fetch_metadata(
    provider: &dyn MetadataProvider,
    id: &VideoId,
) -> StageResult<VideoMetadata> {
    tracing::info!("Fetching metadata for video {}", id);
    provider
        .lookup(id)
        .await
        .map_err(|source| SummarizerError::MetadataUnavailable {
            id: id.to_string(),
            source,
        })
}

/// Video containers accepted for file input
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MediaContainer {
    Mp4,
    Avi,
    Mov,
    Mkv,
}

impl MediaContainer {
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaContainer::Mp4 => "mp4",
            MediaContainer::Avi => "avi",
            MediaContainer::Mov => "mov",
            MediaContainer::Mkv => "mkv",
        }
    }

    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "mp4" => Some(MediaContainer::Mp4),
            "avi" => Some(MediaContainer::Avi),
            "mov" => Some(MediaContainer::Mov),
            "mkv" => Some(MediaContainer::Mkv),
            _ => None,
        }
    }

    /// Resolve the container from a file name, failing for anything not accepted
    pub fn from_path(path: &Path) -> StageResult<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(Self::from_extension)
            .ok_or_else(|| SummarizerError::UnsupportedMediaFormat(path.display().to_string()))
    }

    /// Get MIME type for the container
    pub fn mime_type(&self) -> &'static str {
        match self {
            MediaContainer::Mp4 => "video/mp4",
            MediaContainer::Avi => "video/x-msvideo",
            MediaContainer::Mov => "video/quicktime",
            MediaContainer::Mkv => "video/x-matroska",
        }
    }
}

/// Check if input is a local file path rather than a URL.
///
/// Existing paths and accepted container extensions are files. A scheme-less
/// locator that carries a video identifier, such as `youtu.be/<id>`, is a URL.
pub fn is_local_file(input: &str) -> bool {
    if input.contains("://") {
        return false;
    }

    let path = Path::new(input);
    if path.exists() || MediaContainer::from_path(path).is_ok() {
        return true;
    }

    let explicit_path = ["./", ".\\", "../", "..\\", "/", "\\"]
        .iter()
        .any(|prefix| input.starts_with(prefix));
    if explicit_path {
        return true;
    }
    if extract_video_id(input).is_ok() {
        return false;
    }

    let has_extension = path.extension().is_some();
    let has_path_separators = input.contains('/') || input.contains('\\');
    has_extension || has_path_separators
}

/// Validate and normalize URLs
pub fn validate_url(url: &str) -> Result<Url> {
    let parsed = Url::parse(url)
        .map_err(|_| anyhow::anyhow!("Invalid URL format: {}", url))?;

    if !matches!(parsed.scheme(), "http" | "https") {
        anyhow::bail!("URL must use HTTP or HTTPS protocol");
    }

    Ok(parsed)
}
