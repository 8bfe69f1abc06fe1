use anyhow::{Context, Result};
use chrono::SecondsFormat;
use console::style;
use std::fmt::Write;
use std::path::Path;

use crate::cli::OutputFormat;
use crate::pipeline::{RecordMetadata, SummaryRecord};
use crate::utils::{format_duration, format_file_size};

/// Render a record in the requested format
pub fn render(record: &SummaryRecord, format: &OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Text => Ok(render_text(record)),
        OutputFormat::Json => render_json(record),
        OutputFormat::Markdown => Ok(render_markdown(record)),
    }
}

/// Plain-text export: title, generation time, summary, keywords and sentiment
pub fn render_text(record: &SummaryRecord) -> String {
    let mut content = format!(
        "Title: {}\nGenerated: {}\n\nSummary:\n{}\n\nKeywords: {}\n",
        record.title(),
        timestamp(record),
        record.summary,
        keyword_list(record),
    );

    if let Some(sentiment) = &record.sentiment {
        content.push_str(&format!(
            "\nSentiment: {} (Score: {:.2})",
            sentiment.overall, sentiment.compound
        ));
    }

    content
}

pub fn render_json(record: &SummaryRecord) -> Result<String> {
    serde_json::to_string_pretty(record).context("Failed to serialize summary")
}

pub fn render_markdown(record: &SummaryRecord) -> String {
    let mut content = format!("# {}\n\n", record.title());

    match &record.metadata {
        RecordMetadata::Video(video) => {
            let _ = writeln!(content, "- **Author:** {}", video.author);
            let _ = writeln!(content, "- **Duration:** {}", format_duration(video.duration_secs as f64));
            if let Some(views) = video.view_count {
                let _ = writeln!(content, "- **Views:** {}", views);
            }
            if let Some(date) = video.publish_date {
                let _ = writeln!(content, "- **Published:** {}", date);
            }
        }
        RecordMetadata::File(file) => {
            let _ = writeln!(content, "- **Size:** {}", format_file_size(file.file_size));
            let _ = writeln!(content, "- **Type:** {}", file.content_type);
        }
    }
    let _ = writeln!(content, "- **Transcript source:** {}", record.transcript_source);
    let _ = writeln!(content, "- **Generated:** {}", timestamp(record));

    let _ = write!(content, "\n## Summary\n\n{}\n", record.summary);

    if let Some(keywords) = record.keywords.as_ref().filter(|k| !k.is_empty()) {
        let _ = write!(content, "\n## Keywords\n\n{}\n", keywords.join(", "));
    }

    if let Some(sentiment) = &record.sentiment {
        let _ = write!(
            content,
            "\n## Sentiment\n\n**{}** (compound {:.2}; positive {:.0}%, neutral {:.0}%, negative {:.0}%)\n",
            sentiment.overall,
            sentiment.compound,
            sentiment.positive * 100.0,
            sentiment.neutral * 100.0,
            sentiment.negative * 100.0,
        );
    }

    content
}

/// Save a rendered record to file
pub async fn save_to_file(record: &SummaryRecord, path: &Path, format: &OutputFormat) -> Result<()> {
    let content = render(record, format)?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs_err::create_dir_all(parent)?;
    }
    fs_err::write(path, content)?;
    Ok(())
}

/// Print a rendered record to console
pub fn print_to_console(record: &SummaryRecord, format: &OutputFormat) -> Result<()> {
    let content = render(record, format)?;
    println!("{}", content);
    Ok(())
}

/// One line per stored record, newest last
pub fn print_record_list(records: &[SummaryRecord]) {
    if records.is_empty() {
        println!("No summaries stored yet.");
        return;
    }

    println!("{}", style(format!("{} stored summaries", records.len())).bold());
    for record in records {
        println!(
            "  {}  {}  {}",
            style(&record.id).cyan(),
            style(record.created_at.format("%Y-%m-%d %H:%M")).dim(),
            record.title()
        );
    }
}

fn timestamp(record: &SummaryRecord) -> String {
    record.created_at.to_rfc3339_opts(SecondsFormat::Secs, true)
}

fn keyword_list(record: &SummaryRecord) -> String {
    record
        .keywords
        .as_deref()
        .map(|k| k.join(", "))
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{Sentiment, SentimentLabel};
    use crate::extractors::VideoMetadata;
    use crate::transcribe::TranscriptSource;
    use chrono::{TimeZone, Utc};

    fn record() -> SummaryRecord {
        SummaryRecord {
            id: "3f2a".to_string(),
            summary: "- Rust is fast".to_string(),
            metadata: RecordMetadata::Video(VideoMetadata {
                title: "Rust in Production".to_string(),
                author: "Ferris".to_string(),
                duration_secs: 90,
                view_count: Some(42),
                publish_date: None,
                thumbnail: String::new(),
            }),
            transcript: "Rust is fast".to_string(),
            transcript_source: TranscriptSource::Captions,
            sentiment: None,
            keywords: Some(vec!["rust".to_string(), "speed".to_string()]),
            created_at: Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap(),
        }
    }

    #[test]
    fn test_text_export_layout() {
        assert_eq!(
            render_text(&record()),
            "Title: Rust in Production\nGenerated: 2024-05-01T12:00:00Z\n\nSummary:\n- Rust is fast\n\nKeywords: rust, speed\n"
        );
    }

    #[test]
    fn test_text_export_appends_sentiment() {
        let mut record = record();
        record.sentiment = Some(Sentiment {
            overall: SentimentLabel::Positive,
            positive: 0.4,
            neutral: 0.6,
            negative: 0.0,
            compound: 0.6249,
        });

        assert!(render_text(&record).ends_with("Keywords: rust, speed\n\nSentiment: positive (Score: 0.62)"));
    }

    #[test]
    fn test_markdown_sections() {
        let markdown = render_markdown(&record());
        assert!(markdown.starts_with("# Rust in Production\n"));
        assert!(markdown.contains("- **Duration:** 1m 30s"));
        assert!(markdown.contains("## Summary\n\n- Rust is fast"));
        assert!(markdown.contains("## Keywords\n\nrust, speed"));
        assert!(!markdown.contains("## Sentiment"));
    }

    #[test]
    fn test_json_is_tagged() {
        let json: serde_json::Value = serde_json::from_str(&render_json(&record()).unwrap()).unwrap();
        assert_eq!(json["metadata"]["kind"], "video");
        assert_eq!(json["transcript_source"], "captions");
        assert!(json.get("sentiment").is_none());
    }

    #[tokio::test]
    async fn test_save_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out").join("summary.md");
        save_to_file(&record(), &path, &OutputFormat::Markdown).await.unwrap();
        assert!(fs_err::read_to_string(&path).unwrap().contains("## Summary"));
    }
}
