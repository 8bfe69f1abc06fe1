//! WebVTT caption parsing.
//!
//! Auto-generated YouTube captions carry inline word timing tags and repeat the
//! previous line at the top of each cue. On such tracks a line identical to the
//! last emitted one is dropped. Manual tracks keep every line.

use once_cell::sync::Lazy;
use regex::Regex;

use super::CaptionFragment;

static INLINE_TAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<[^>]*>").expect("inline tag pattern is valid"));

static WORD_TIMING_TAG: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"<\d{2}:\d{2}(?::\d{2})?\.\d{3}>|<c[.>]").expect("word timing pattern is valid")
});

/// Parse a WebVTT document into ordered caption fragments
pub fn parse(content: &str) -> Vec<CaptionFragment> {
    let mut fragments = Vec::new();
    let rolling = is_auto_generated(content);
    let mut last_line = String::new();
    let mut lines = content.lines().peekable();

    while let Some(line) = lines.next() {
        let Some((start, end)) = parse_timing(line.trim()) else {
            continue;
        };

        let mut cue_text: Vec<String> = Vec::new();
        while let Some(next) = lines.peek() {
            if next.trim().is_empty() {
                break;
            }
            let cleaned = clean_line(next);
            lines.next();

            if cleaned.is_empty() || (rolling && cleaned == last_line) {
                continue;
            }
            last_line = cleaned.clone();
            cue_text.push(cleaned);
        }

        if !cue_text.is_empty() {
            fragments.push(CaptionFragment {
                text: cue_text.join(" "),
                start,
                duration: (end - start).max(0.0),
            });
        }
    }

    fragments
}

/// Auto-generated tracks time individual words inline
fn is_auto_generated(content: &str) -> bool {
    WORD_TIMING_TAG.is_match(content)
}

/// Parse a `start --> end [settings]` line into seconds
fn parse_timing(line: &str) -> Option<(f64, f64)> {
    let (start, rest) = line.split_once("-->")?;
    let end = rest.split_whitespace().next()?;
    Some((parse_timestamp(start.trim())?, parse_timestamp(end)?))
}

/// `hh:mm:ss.mmm` or `mm:ss.mmm`
fn parse_timestamp(value: &str) -> Option<f64> {
    let mut seconds = 0.0;
    for part in value.split(':') {
        seconds = seconds * 60.0 + part.parse::<f64>().ok()?;
    }
    Some(seconds)
}

fn clean_line(line: &str) -> String {
    let stripped = INLINE_TAG.replace_all(line, "");
    stripped
        .replace("&amp;", "&")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&nbsp;", " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}
