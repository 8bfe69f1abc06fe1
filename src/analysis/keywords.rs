use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;

/// Maximum number of keywords returned
pub const MAX_KEYWORDS: usize = 10;

/// Common words excluded from keyword ranking
pub const STOP_WORDS: [&str; 24] = [
    "this", "that", "with", "have", "will", "from", "they", "been", "were", "said", "each",
    "which", "their", "time", "about", "would", "there", "could", "other", "more", "very",
    "what", "know", "just",
];

// Four-letter words are captured here and then dropped by the length filter,
// so the effective minimum keyword length is five.
static WORD_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b[a-zA-Z]{4,}\b").expect("word pattern is valid"));

/// Rank the most frequent non-stop-words of at least five letters.
///
/// Ties keep the order in which words first appeared.
pub fn keywords(text: &str) -> Vec<String> {
    let lowered = text.to_lowercase();

    let mut counts: HashMap<&str, usize> = HashMap::new();
    let mut first_seen: Vec<&str> = Vec::new();

    for word in WORD_PATTERN
        .find_iter(&lowered)
        .map(|m| m.as_str())
        .filter(|word| word.len() > 4 && !STOP_WORDS.contains(word))
    {
        let count = counts.entry(word).or_insert(0);
        if *count == 0 {
            first_seen.push(word);
        }
        *count += 1;
    }

    // Stable sort keeps first-occurrence order among equal counts
    first_seen.sort_by(|a, b| counts[b].cmp(&counts[a]));

    first_seen
        .into_iter()
        .take(MAX_KEYWORDS)
        .map(str::to_string)
        .collect()
}
