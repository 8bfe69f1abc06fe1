use tokio::process::Command;

use crate::config::Config;
use crate::extractors::youtube::YtDlpClient;

/// Format file size in human-readable format
pub fn format_file_size(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB"];
    const THRESHOLD: f64 = 1024.0;

    if bytes == 0 {
        return "0 B".to_string();
    }

    let bytes_f = bytes as f64;
    let unit_index = (bytes_f.log10() / THRESHOLD.log10()).floor() as usize;
    let unit_index = unit_index.min(UNITS.len() - 1);

    let size = bytes_f / THRESHOLD.powi(unit_index as i32);

    if unit_index == 0 {
        format!("{} {}", bytes, UNITS[unit_index])
    } else {
        format!("{:.1} {}", size, UNITS[unit_index])
    }
}

/// Format duration in human-readable format
pub fn format_duration(seconds: f64) -> String {
    let total_seconds = seconds as u64;
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let secs = total_seconds % 60;

    if hours > 0 {
        format!("{}h {}m {}s", hours, minutes, secs)
    } else if minutes > 0 {
        format!("{}m {}s", minutes, secs)
    } else {
        format!("{}s", secs)
    }
}

/// Sanitize filename for safe filesystem usage
pub fn sanitize_filename(filename: &str) -> String {
    filename
        .chars()
        .map(|c| match c {
            c if c.is_alphanumeric() || c == ' ' || c == '-' || c == '_' || c == '.' => c,
            _ => '_',
        })
        .collect::<String>()
        .trim()
        .to_string()
}

/// Export file name derived from a summary title
pub fn export_filename(title: &str, id: &str, extension: &str) -> String {
    let base = sanitize_filename(title).replace(' ', "_");
    let short_id: String = id.chars().take(8).collect();

    if base.is_empty() {
        format!("summary_{}.{}", short_id, extension)
    } else {
        format!("summary_{}_{}.{}", base, short_id, extension)
    }
}

/// Map common language names to AWS Transcribe language codes
pub fn normalize_language_code(lang: &str) -> String {
    let normalized = match lang.to_lowercase().as_str() {
        "en" | "english" => "en-US",
        "es" | "spanish" => "es-ES",
        "fr" | "french" => "fr-FR",
        "de" | "german" => "de-DE",
        "it" | "italian" => "it-IT",
        "pt" | "portuguese" => "pt-BR",
        "ja" | "japanese" => "ja-JP",
        "ko" | "korean" => "ko-KR",
        "zh" | "chinese" => "zh-CN",
        "ar" | "arabic" => "ar-SA",
        "hi" | "hindi" => "hi-IN",
        "ru" | "russian" => "ru-RU",
        _ => lang,
    };

    normalized.to_string()
}

/// Report missing external tools; never fatal
pub async fn check_dependencies(config: &Config) -> Vec<String> {
    let mut missing = Vec::new();

    let yt_dlp = YtDlpClient::new(config.app.yt_dlp_path.clone(), Vec::new());
    if !yt_dlp.check_availability().await {
        missing.push(format!(
            "{} - required for YouTube metadata, captions and audio streams",
            config.app.yt_dlp_path
        ));
    }

    if !check_command_available(&config.app.ffmpeg_path).await {
        missing.push(format!(
            "{} - required for the speech-to-text fallback",
            config.app.ffmpeg_path
        ));
    }

    missing
}

/// Check if a command is available in PATH
async fn check_command_available(command: &str) -> bool {
    Command::new(command)
        .arg("-version")
        .output()
        .await
        .map(|output| output.status.success())
        .unwrap_or(false)
}
