use serde::{Deserialize, Serialize};
use std::fmt;

/// Layout of the generated summary
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum SummaryFormat {
    #[default]
    BulletPoints,
    Narrative,
    Markdown,
}

impl SummaryFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            SummaryFormat::BulletPoints => "bullet_points",
            SummaryFormat::Narrative => "narrative",
            SummaryFormat::Markdown => "markdown",
        }
    }

    /// Parse a format name, falling back to bullet points for anything unknown
    pub fn parse_lossy(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "bullet_points" => SummaryFormat::BulletPoints,
            "narrative" => SummaryFormat::Narrative,
            "markdown" => SummaryFormat::Markdown,
            other => {
                tracing::debug!("Unknown summary format {:?}, using bullet_points", other);
                SummaryFormat::default()
            }
        }
    }
}

impl From<String> for SummaryFormat {
    fn from(value: String) -> Self {
        Self::parse_lossy(&value)
    }
}

impl From<SummaryFormat> for String {
    fn from(value: SummaryFormat) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for SummaryFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Target length of the generated summary
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum SummaryLength {
    Short,
    #[default]
    Medium,
    Long,
}

impl SummaryLength {
    pub fn as_str(&self) -> &'static str {
        match self {
            SummaryLength::Short => "short",
            SummaryLength::Medium => "medium",
            SummaryLength::Long => "long",
        }
    }

    /// Parse a length name, falling back to medium for anything unknown
    pub fn parse_lossy(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "short" => SummaryLength::Short,
            "medium" => SummaryLength::Medium,
            "long" => SummaryLength::Long,
            other => {
                tracing::debug!("Unknown summary length {:?}, using medium", other);
                SummaryLength::default()
            }
        }
    }
}

impl From<String> for SummaryLength {
    fn from(value: String) -> Self {
        Self::parse_lossy(&value)
    }
}

impl From<SummaryLength> for String {
    fn from(value: SummaryLength) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for SummaryLength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// User-chosen summary options; unknown values degrade to defaults
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SummaryOptions {
    pub format: SummaryFormat,
    pub length: SummaryLength,
    /// Output language, inserted literally into the instruction
    pub language: String,
    pub include_sentiment: bool,
}

impl Default for SummaryOptions {
    fn default() -> Self {
        Self {
            format: SummaryFormat::BulletPoints,
            length: SummaryLength::Medium,
            language: "english".to_string(),
            include_sentiment: false,
        }
    }
}

impl SummaryOptions {
    /// Build options from raw strings as a caller would supply them
    pub fn from_raw(format: &str, length: &str, language: &str, include_sentiment: bool) -> Self {
        let language = language.trim();
        Self {
            format: SummaryFormat::parse_lossy(format),
            length: SummaryLength::parse_lossy(length),
            language: if language.is_empty() {
                "english".to_string()
            } else {
                language.to_string()
            },
            include_sentiment,
        }
    }
}
