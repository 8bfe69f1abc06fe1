use anyhow::Context;
use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Deserialize;
use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;

use super::{
    validate_url, vtt, CaptionFragment, CaptionProvider, MetadataProvider, VideoId, VideoMetadata,
};
use crate::Result;

/// Subset of the `yt-dlp --dump-json` payload used for metadata
#[derive(Debug, Deserialize)]
struct YtDlpInfo {
    title: String,
    uploader: Option<String>,
    channel: Option<String>,
    duration: Option<f64>,
    view_count: Option<u64>,
    thumbnail: Option<String>,
    /// `YYYYMMDD`
    upload_date: Option<String>,
}

impl YtDlpInfo {
    fn into_metadata(self) -> VideoMetadata {
        let publish_date = self
            .upload_date
            .as_deref()
            .and_then(|d| NaiveDate::parse_from_str(d, "%Y%m%d").ok());

        VideoMetadata {
            title: self.title,
            author: self.uploader.or(self.channel).unwrap_or_default(),
            duration_secs: self.duration.map(|d| d.max(0.0) as u64).unwrap_or(0),
            view_count: self.view_count,
            publish_date,
            thumbnail: self.thumbnail.unwrap_or_default(),
        }
    }
}

/// YouTube metadata and caption provider backed by yt-dlp
#[derive(Debug, Clone)]
pub struct YtDlpClient {
    yt_dlp_path: String,
    caption_languages: Vec<String>,
}

impl YtDlpClient {
    pub fn new(yt_dlp_path: impl Into<String>, caption_languages: Vec<String>) -> Self {
        Self {
            yt_dlp_path: yt_dlp_path.into(),
            caption_languages,
        }
    }

    /// Check if yt-dlp is available
    pub async fn check_availability(&self) -> bool {
        Command::new(&self.yt_dlp_path)
            .arg("--version")
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map(|output| output.status.success())
            .unwrap_or(false)
    }

    async fn run(&self, args: &[&str]) -> Result<Vec<u8>> {
        tracing::debug!("Running {} {}", self.yt_dlp_path, args.join(" "));

        let output = Command::new(&self.yt_dlp_path)
            .args(args)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .with_context(|| format!("Failed to launch {}", self.yt_dlp_path))?;

        if !output.status.success() {
            let error = String::from_utf8_lossy(&output.stderr);
            anyhow::bail!("yt-dlp failed: {}", error.trim());
        }

        Ok(output.stdout)
    }

    /// Resolve a playable page URL to a direct audio stream URL
    pub async fn resolve_stream_url(&self, url: &str) -> Result<String> {
        let stdout = self
            .run(&["--get-url", "--format", "bestaudio/best", "--no-playlist", url])
            .await?;

        let stream = String::from_utf8(stdout)?
            .lines()
            .map(str::trim)
            .find(|line| !line.is_empty())
            .map(str::to_string)
            .ok_or_else(|| anyhow::anyhow!("yt-dlp returned no stream URL for {}", url))?;

        Ok(validate_url(&stream)?.to_string())
    }

    fn caption_languages_arg(&self) -> String {
        if self.caption_languages.is_empty() {
            "en.*,en".to_string()
        } else {
            self.caption_languages.join(",")
        }
    }
}

#[async_trait]
impl MetadataProvider for YtDlpClient {
    async fn lookup(&self, id: &VideoId) -> Result<VideoMetadata> {
        let url = id.watch_url();
        let stdout = self
            .run(&["--dump-json", "--no-playlist", "--skip-download", &url])
            .await?;

        let info: YtDlpInfo = serde_json::from_slice(&stdout)
            .context("Failed to parse yt-dlp metadata")?;

        Ok(info.into_metadata())
    }
}

#[async_trait]
impl CaptionProvider for YtDlpClient {
    async fn get_captions(&self, id: &VideoId) -> Result<Vec<CaptionFragment>> {
        let tmpdir = tempfile::tempdir().context("Failed to create caption directory")?;
        let template = tmpdir.path().join("%(id)s.%(ext)s");
        let template = template.to_string_lossy();
        let languages = self.caption_languages_arg();
        let url = id.watch_url();

        self.run(&[
            "--skip-download",
            "--write-sub",
            "--write-auto-sub",
            "--sub-lang",
            &languages,
            "--sub-format",
            "vtt",
            "--no-warnings",
            "--output",
            &template,
            &url,
        ])
        .await?;

        let caption_file = find_vtt(tmpdir.path())?
            .ok_or_else(|| anyhow::anyhow!("No captions available for video {}", id))?;
        let content = fs_err::read_to_string(&caption_file)?;

        let fragments = vtt::parse(&content);
        tracing::debug!("Parsed {} caption fragments for {}", fragments.len(), id);
        Ok(fragments)
    }
}

fn find_vtt(dir: &Path) -> Result<Option<std::path::PathBuf>> {
    let mut candidates: Vec<_> = fs_err::read_dir(dir)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.extension().and_then(|ext| ext.to_str()) == Some("vtt"))
        .collect();
    candidates.sort();
    Ok(candidates.into_iter().next())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metadata_from_dump_json() {
        let json = r#"{
            "id": "dQw4w9WgXcQ",
            "title": "Never Gonna Give You Up",
            "uploader": "Rick Astley",
            "duration": 212.0,
            "view_count": 1500000000,
            "thumbnail": "https://i.ytimg.com/vi/dQw4w9WgXcQ/maxresdefault.jpg",
            "upload_date": "20091025"
        }"#;

        let info: YtDlpInfo = serde_json::from_str(json).unwrap();
        let metadata = info.into_metadata();

        assert_eq!(metadata.title, "Never Gonna Give You Up");
        assert_eq!(metadata.author, "Rick Astley");
        assert_eq!(metadata.duration_secs, 212);
        assert_eq!(metadata.view_count, Some(1_500_000_000));
        assert_eq!(metadata.publish_date, NaiveDate::from_ymd_opt(2009, 10, 25));
    }

    #[test]
    fn test_metadata_tolerates_missing_optional_fields() {
        let info: YtDlpInfo = serde_json::from_str(r#"{"title": "Live", "channel": "News"}"#).unwrap();
        let metadata = info.into_metadata();

        assert_eq!(metadata.author, "News");
        assert_eq!(metadata.duration_secs, 0);
        assert_eq!(metadata.view_count, None);
        assert_eq!(metadata.publish_date, None);
        assert!(metadata.thumbnail.is_empty());
    }

    #[test]
    fn test_metadata_without_title_is_rejected() {
        assert!(serde_json::from_str::<YtDlpInfo>(r#"{"uploader": "x"}"#).is_err());
    }

    #[test]
    fn test_find_vtt_picks_caption_file() {
        let dir = tempfile::tempdir().unwrap();
        fs_err::write(dir.path().join("abc.info.json"), "{}").unwrap();
        fs_err::write(dir.path().join("abc.en.vtt"), "WEBVTT").unwrap();

        let found = find_vtt(dir.path()).unwrap().unwrap();
        assert_eq!(found.file_name().unwrap(), "abc.en.vtt");
    }

    #[tokio::test]
    async fn test_missing_binary_is_reported_unavailable() {
        let client = YtDlpClient::new("definitely-not-a-real-yt-dlp", vec![]);
        assert!(!client.check_availability().await);
    }
}
