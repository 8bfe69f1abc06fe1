use anyhow::{Context, Result};
use aws_sdk_transcribe::types::{TranscriptionJob, TranscriptionJobStatus};
use aws_sdk_transcribe::Client as TranscribeClient;
use indicatif::ProgressBar;
use serde::Deserialize;
use std::time::Duration;
use tokio::time::sleep;

/// AWS Transcribe transcript format
#[derive(Debug, Deserialize)]
struct AwsTranscript {
    results: TranscriptResults,
}

#[derive(Debug, Deserialize)]
struct TranscriptResults {
    transcripts: Vec<TranscriptText>,
    #[serde(default)]
    items: Vec<TranscriptItem>,
}

#[derive(Debug, Deserialize)]
struct TranscriptText {
    transcript: String,
}

#[derive(Debug, Deserialize)]
struct TranscriptItem {
    #[serde(rename = "type")]
    item_type: String,
    alternatives: Vec<Alternative>,
}

#[derive(Debug, Deserialize)]
struct Alternative {
    content: String,
}

/// Transcription job processor.
///
/// Status goes to the caller's progress bar, which the caller owns and clears.
pub struct TranscriptionProcessor {
    client: TranscribeClient,
    job_id: String,
    progress: ProgressBar,
}

impl TranscriptionProcessor {
    pub fn new(client: TranscribeClient, job_id: String, progress: ProgressBar) -> Self {
        Self {
            client,
            job_id,
            progress,
        }
    }

    /// Wait for transcription job completion and return the transcript text
    pub async fn wait_for_completion(&self) -> Result<String> {
        let progress = &self.progress;
        progress.set_message("Starting transcription job...");

        let start_time = std::time::Instant::now();
        let mut check_count: u64 = 0;

        let job = loop {
            check_count += 1;

            let job = self.get_transcription_job().await?;

            match job.transcription_job_status() {
                Some(TranscriptionJobStatus::InProgress) | Some(TranscriptionJobStatus::Queued) => {
                    report_progress(progress, start_time.elapsed(), check_count);

                    sleep(Duration::from_secs(poll_interval_secs(check_count))).await;
                }
                Some(TranscriptionJobStatus::Completed) => {
                    progress.set_message("Transcription completed");
                    break job;
                }
                Some(TranscriptionJobStatus::Failed) => {
                    progress.set_message("Transcription failed");

                    let failure_reason = job.failure_reason().unwrap_or("Unknown error");
                    anyhow::bail!("Transcription job failed: {}", failure_reason);
                }
                _ => {
                    progress.set_message("Transcription status unknown");
                    anyhow::bail!("Unexpected transcription job status");
                }
            }
        };

        tracing::info!(
            "Transcription job {} finished in {:.1}s",
            self.job_id,
            start_time.elapsed().as_secs_f64()
        );

        let transcript_uri = job
            .transcript()
            .and_then(|t| t.transcript_file_uri())
            .ok_or_else(|| anyhow::anyhow!("No transcript URI found"))?;

        let transcript_json = self.download_transcript(transcript_uri).await?;
        parse_transcript(&transcript_json)
    }

    /// Get transcription job details
    async fn get_transcription_job(&self) -> Result<TranscriptionJob> {
        let response = self
            .client
            .get_transcription_job()
            .transcription_job_name(&self.job_id)
            .send()
            .await
            .context("Failed to get transcription job status")?;

        response
            .transcription_job()
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("Transcription job not found"))
    }

    async fn download_transcript(&self, uri: &str) -> Result<String> {
        let response = reqwest::get(uri)
            .await
            .context("Failed to download transcript")?;

        if !response.status().is_success() {
            anyhow::bail!("Failed to download transcript: HTTP {}", response.status());
        }

        response
            .text()
            .await
            .context("Failed to read transcript content")
    }
}

fn report_progress(progress: &ProgressBar, elapsed: Duration, check_count: u64) {
    progress.set_message(format!(
        "Transcribing... ({}s elapsed, check #{})",
        elapsed.as_secs(),
        check_count
    ));
}

/// Seconds to wait before the next status check, growing up to 30
fn poll_interval_secs(check_count: u64) -> u64 {
    std::cmp::min(5 + (check_count.saturating_sub(1)) * 2, 30)
}

/// Extract the transcript text, rebuilding it from items when the summary is blank
fn parse_transcript(json: &str) -> Result<String> {
    let aws_transcript: AwsTranscript =
        serde_json::from_str(json).context("Failed to parse transcript JSON")?;

    let text = aws_transcript
        .results
        .transcripts
        .iter()
        .map(|t| t.transcript.trim())
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(" ");

    if !text.is_empty() {
        return Ok(text);
    }

    let mut rebuilt = String::new();
    for item in &aws_transcript.results.items {
        let Some(alt) = item.alternatives.first() else {
            continue;
        };
        if item.item_type == "pronunciation" && !rebuilt.is_empty() {
            rebuilt.push(' ');
        }
        rebuilt.push_str(&alt.content);
    }

    Ok(rebuilt)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_poll_interval_backs_off_to_cap() {
        assert_eq!(poll_interval_secs(1), 5);
        assert_eq!(poll_interval_secs(2), 7);
        assert_eq!(poll_interval_secs(50), 30);
    }

    #[test]
    fn test_status_goes_to_callers_bar() {
        let progress = ProgressBar::hidden();
        report_progress(&progress, Duration::from_secs(42), 3);

        assert!(progress.is_hidden());
        assert_eq!(progress.message(), "Transcribing... (42s elapsed, check #3)");
    }

    #[test]
    fn test_parse_transcript_uses_summary_text() {
        let json = r#"{"jobName":"j","accountId":"1","status":"COMPLETED","results":{"transcripts":[{"transcript":"Hello world."}],"items":[]}}"#;
        assert_eq!(parse_transcript(json).unwrap(), "Hello world.");
    }

    #[test]
    fn test_parse_transcript_rebuilds_from_items() {
        let json = r#"{"results":{"transcripts":[{"transcript":""}],"items":[
            {"type":"pronunciation","alternatives":[{"confidence":"0.9","content":"Hello"}]},
            {"type":"pronunciation","alternatives":[{"confidence":"0.9","content":"world"}]},
            {"type":"punctuation","alternatives":[{"content":"."}]}
        ]}}"#;
        assert_eq!(parse_transcript(json).unwrap(), "Hello world.");
    }

    #[test]
    fn test_parse_transcript_rejects_malformed_payload() {
        assert!(parse_transcript("{\"results\": 3}").is_err());
    }
}
