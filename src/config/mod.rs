use anyhow::{Context, Result};
use aws_config::Region;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::summarize::{DEFAULT_MAX_TRANSCRIPT_CHARS, DEFAULT_MODEL, DEFAULT_TEMPERATURE};

const APP_DIR: &str = "video-summarizer";
const API_KEY_ENV: &str = "OPENAI_API_KEY";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// AWS configuration for the speech-to-text fallback
    pub aws: AwsConfig,

    /// Generative text service
    pub openai: OpenAiConfig,

    /// Summarization behaviour
    pub summarizer: SummarizerConfig,

    /// Application settings
    pub app: AppConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AwsConfig {
    /// AWS region
    pub region: String,

    /// S3 bucket for temporary audio storage
    pub s3_bucket: String,

    /// Optional S3 key prefix
    pub s3_key_prefix: Option<String>,

    /// Transcription job settings
    pub transcription: TranscriptionConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TranscriptionConfig {
    /// Language code; the language is identified automatically when unset
    pub default_language: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OpenAiConfig {
    /// Base URL of an OpenAI-compatible API
    pub api_base: String,

    pub model: String,

    pub temperature: f32,

    /// API key; `OPENAI_API_KEY` is used when unset
    pub api_key: Option<String>,

    /// Request timeout in seconds
    pub timeout_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SummarizerConfig {
    /// Longer transcripts are summarized in chunks
    pub max_transcript_chars: usize,

    /// Caption languages requested from yt-dlp, in preference order
    pub caption_languages: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Temporary directory for audio artifacts
    pub temp_dir: Option<PathBuf>,

    /// Directory holding stored summaries
    pub data_dir: Option<PathBuf>,

    pub yt_dlp_path: String,

    pub ffmpeg_path: String,

    /// Default output format
    pub default_output_format: String,
}

impl Default for AwsConfig {
    fn default() -> Self {
        Self {
            region: "us-east-1".to_string(),
            s3_bucket: "".to_string(),
            s3_key_prefix: Some("video-summarizer/".to_string()),
            transcription: TranscriptionConfig::default(),
        }
    }
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            api_base: "https://api.openai.com/v1".to_string(),
            model: DEFAULT_MODEL.to_string(),
            temperature: DEFAULT_TEMPERATURE,
            api_key: None,
            timeout_seconds: 120,
        }
    }
}

impl Default for SummarizerConfig {
    fn default() -> Self {
        Self {
            max_transcript_chars: DEFAULT_MAX_TRANSCRIPT_CHARS,
            caption_languages: vec!["en.*".to_string(), "en".to_string()],
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            temp_dir: None,
            data_dir: None,
            yt_dlp_path: "yt-dlp".to_string(),
            ffmpeg_path: "ffmpeg".to_string(),
            default_output_format: "text".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from file or create default
    pub async fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            let config = Self::default();
            config.save_to(&config_path)?;
            tracing::info!("Wrote default configuration to {}", config_path.display());
            Ok(config)
        }
    }

    /// Load and validate a configuration file
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs_err::read_to_string(path).context("Failed to read config file")?;

        let config: Config =
            serde_yaml::from_str(&content).context("Failed to parse config file")?;

        config.validate()?;
        Ok(config)
    }

    /// Save configuration to file
    fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs_err::create_dir_all(parent)?;
        }

        let content = serde_yaml::to_string(self).context("Failed to serialize config")?;

        fs_err::write(path, content).context("Failed to write config file")?;

        Ok(())
    }

    /// Get configuration file path
    pub fn config_path() -> Result<PathBuf> {
        // First try current directory for easy testing
        let local_config = PathBuf::from("config.yaml");
        if local_config.exists() {
            return Ok(local_config);
        }

        let config_dir = dirs::config_dir().context("Could not determine config directory")?;

        Ok(config_dir.join(APP_DIR).join("config.yaml"))
    }

    /// Validate settings every command depends on
    fn validate(&self) -> Result<()> {
        if !(0.0..=2.0).contains(&self.openai.temperature) {
            anyhow::bail!(
                "openai.temperature must be between 0 and 2, got {}",
                self.openai.temperature
            );
        }

        if self.openai.timeout_seconds == 0 {
            anyhow::bail!("openai.timeout_seconds must be greater than zero");
        }

        if self.openai.api_base.trim().is_empty() {
            anyhow::bail!("openai.api_base must be configured");
        }

        Ok(())
    }

    /// Validate the settings the speech-to-text fallback needs
    pub fn validate_aws(&self) -> Result<()> {
        if self.aws.s3_bucket.is_empty() {
            anyhow::bail!("AWS S3 bucket must be configured (aws.s3_bucket)");
        }

        if self.aws.region.trim().is_empty() {
            anyhow::bail!("AWS region must be configured (aws.region)");
        }

        Ok(())
    }

    /// API key for the generative text service, from config or environment
    pub fn openai_api_key(&self) -> Result<String> {
        if let Some(key) = self.openai.api_key.as_ref().filter(|k| !k.trim().is_empty()) {
            return Ok(key.clone());
        }

        std::env::var(API_KEY_ENV)
            .ok()
            .filter(|k| !k.trim().is_empty())
            .with_context(|| format!("Set openai.api_key in the config file or the {} environment variable", API_KEY_ENV))
    }

    /// Directory where summaries are stored
    pub fn data_dir(&self) -> Result<PathBuf> {
        if let Some(dir) = &self.app.data_dir {
            return Ok(dir.clone());
        }

        let data_dir = dirs::data_dir().context("Could not determine data directory")?;

        Ok(data_dir.join(APP_DIR).join("summaries"))
    }

    /// Display current configuration
    pub fn display(&self) {
        println!("Current Configuration:");
        println!("  AWS Region: {}", self.aws.region);
        println!("  S3 Bucket: {}", self.aws.s3_bucket);
        if let Some(prefix) = &self.aws.s3_key_prefix {
            println!("  S3 Prefix: {}", prefix);
        }
        println!("  API Base: {}", self.openai.api_base);
        println!("  Model: {}", self.openai.model);
        println!("  Temperature: {}", self.openai.temperature);
        println!(
            "  API Key: {}",
            if self.openai_api_key().is_ok() { "set" } else { "not set" }
        );
        println!("  Max Transcript Chars: {}", self.summarizer.max_transcript_chars);
        println!("  Caption Languages: {}", self.summarizer.caption_languages.join(", "));
        match self.data_dir() {
            Ok(dir) => println!("  Data Directory: {}", dir.display()),
            Err(_) => println!("  Data Directory: unavailable"),
        }
        println!("  Default Format: {}", self.app.default_output_format);
    }

    /// Get AWS region
    pub fn aws_region(&self) -> Region {
        Region::new(self.aws.region.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.openai.model, "gpt-3.5-turbo");
        assert!((config.openai.temperature - 0.3).abs() < f32::EPSILON);
        assert_eq!(config.summarizer.max_transcript_chars, 48_000);
        assert_eq!(config.app.yt_dlp_path, "yt-dlp");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        fs_err::write(
            &path,
            "aws:\n  s3_bucket: my-bucket\nopenai:\n  model: gpt-4o-mini\n",
        )
        .unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.aws.s3_bucket, "my-bucket");
        assert_eq!(config.aws.region, "us-east-1");
        assert_eq!(config.openai.model, "gpt-4o-mini");
        assert_eq!(config.openai.timeout_seconds, 120);
        assert!(config.validate_aws().is_ok());
    }

    #[test]
    fn test_invalid_temperature_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        fs_err::write(&path, "openai:\n  temperature: 3.5\n").unwrap();

        let err = Config::load_from(&path).unwrap_err();
        assert!(err.to_string().contains("temperature"));
    }

    #[test]
    fn test_aws_requires_bucket() {
        assert!(Config::default().validate_aws().is_err());
    }

    #[test]
    fn test_api_key_from_config() {
        let mut config = Config::default();
        config.openai.api_key = Some("sk-test".to_string());
        assert_eq!(config.openai_api_key().unwrap(), "sk-test");
    }

    #[test]
    fn test_explicit_data_dir() {
        let mut config = Config::default();
        config.app.data_dir = Some(PathBuf::from("/tmp/summaries"));
        assert_eq!(config.data_dir().unwrap(), PathBuf::from("/tmp/summaries"));
    }

    #[test]
    fn test_yaml_roundtrip_keeps_sections() {
        let yaml = serde_yaml::to_string(&Config::default()).unwrap();
        assert!(yaml.contains("aws:"));
        assert!(yaml.contains("openai:"));
        assert!(yaml.contains("summarizer:"));
        assert!(yaml.contains("app:"));
    }

    #[test]
    fn test_saved_defaults_load_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.yaml");

        Config::default().save_to(&path).unwrap();
        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.app.yt_dlp_path, "yt-dlp");
        assert_eq!(loaded.openai.api_base, "https://api.openai.com/v1");
    }
}
