use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::fmt;
use vader_sentiment::SentimentIntensityAnalyzer;

/// Lexicon and rule set behind every score
pub const LEXICON_VERSION: &str = "vader_sentiment-0.1";

static ANALYZER: Lazy<SentimentIntensityAnalyzer<'static>> =
    Lazy::new(SentimentIntensityAnalyzer::new);

const POSITIVE_THRESHOLD: f64 = 0.05;
const NEGATIVE_THRESHOLD: f64 = -0.05;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SentimentLabel {
    Positive,
    Negative,
    Neutral,
}

impl SentimentLabel {
    /// Classify a compound score: `>= 0.05` positive, `<= -0.05` negative
    pub fn from_compound(compound: f64) -> Self {
        if compound >= POSITIVE_THRESHOLD {
            SentimentLabel::Positive
        } else if compound <= NEGATIVE_THRESHOLD {
            SentimentLabel::Negative
        } else {
            SentimentLabel::Neutral
        }
    }
}

impl fmt::Display for SentimentLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SentimentLabel::Positive => write!(f, "positive"),
            SentimentLabel::Negative => write!(f, "negative"),
            SentimentLabel::Neutral => write!(f, "neutral"),
        }
    }
}

/// Polarity of a text.
///
/// `positive + neutral + negative` is 1.0 and `compound` lies in `[-1, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sentiment {
    pub overall: SentimentLabel,
    pub positive: f64,
    pub neutral: f64,
    pub negative: f64,
    pub compound: f64,
}

/// VADER sentiment of a text
pub fn sentiment(text: &str) -> Sentiment {
    if !text.chars().any(char::is_alphanumeric) {
        return Sentiment::neutral();
    }

    let scores = ANALYZER.polarity_scores(text);
    let score = |key: &str| scores.get(key).copied().unwrap_or(0.0);
    let compound = score("compound").clamp(-1.0, 1.0);
    let (positive, neutral, negative) = (score("pos"), score("neu"), score("neg"));

    // The analyzer rounds each fraction to three places
    let total = positive + neutral + negative;
    if total <= 0.0 {
        return Sentiment::neutral();
    }

    Sentiment {
        overall: SentimentLabel::from_compound(compound),
        positive: positive / total,
        neutral: neutral / total,
        negative: negative / total,
        compound,
    }
}

impl Sentiment {
    fn neutral() -> Self {
        Sentiment {
            overall: SentimentLabel::Neutral,
            positive: 0.0,
            neutral: 1.0,
            negative: 0.0,
            compound: 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_fractions_sum_to_one(s: &Sentiment) {
        let total = s.positive + s.neutral + s.negative;
        assert!((total - 1.0).abs() < 1e-6, "fractions sum to {total}");
        assert!((-1.0..=1.0).contains(&s.compound));
        for f in [s.positive, s.neutral, s.negative] {
            assert!((0.0..=1.0).contains(&f));
        }
    }

    #[test]
    fn test_label_thresholds() {
        assert_eq!(SentimentLabel::from_compound(0.06), SentimentLabel::Positive);
        assert_eq!(SentimentLabel::from_compound(0.05), SentimentLabel::Positive);
        assert_eq!(SentimentLabel::from_compound(0.0), SentimentLabel::Neutral);
        assert_eq!(SentimentLabel::from_compound(0.049), SentimentLabel::Neutral);
        assert_eq!(SentimentLabel::from_compound(-0.05), SentimentLabel::Negative);
        assert_eq!(SentimentLabel::from_compound(-0.10), SentimentLabel::Negative);
    }

    #[test]
    fn test_positive_and_negative_text() {
        let good = sentiment("This is a great and wonderful day");
        assert_eq!(good.overall, SentimentLabel::Positive);
        assert!(good.positive > good.negative);

        let bad = sentiment("The service was terrible and the food was awful");
        assert_eq!(bad.overall, SentimentLabel::Negative);
        assert!(bad.negative > bad.positive);
    }

    #[test]
    fn test_neutral_and_empty_text() {
        let empty = sentiment("");
        assert_eq!(empty.overall, SentimentLabel::Neutral);
        assert_eq!(empty.neutral, 1.0);
        assert_eq!(empty.compound, 0.0);

        let plain = sentiment("Hello world.");
        assert_eq!(plain.overall, SentimentLabel::Neutral);
        assert_eq!(plain.neutral, 1.0);
    }

    #[test]
    fn test_known_vader_compound_scores() {
        for (text, expected) in [
            ("VADER is smart, handsome, and funny.", 0.8316),
            ("The book was good.", 0.4404),
            ("A really bad, horrible book.", -0.8211),
        ] {
            let compound = sentiment(text).compound;
            assert!(
                (compound - expected).abs() < 0.01,
                "{text:?} scored {compound}, expected {expected}"
            );
        }
    }

    #[test]
    fn test_full_lexicon_words_are_scored() {
        assert_eq!(
            sentiment("The lecture was outstanding").overall,
            SentimentLabel::Positive
        );
        assert_eq!(
            sentiment("Everyone was interested and the demo worked easily").overall,
            SentimentLabel::Positive
        );
        assert_eq!(
            sentiment("Thousands were killed in the attack").overall,
            SentimentLabel::Negative
        );
    }

    #[test]
    fn test_negation_flips_polarity() {
        assert_eq!(sentiment("The food is not good").overall, SentimentLabel::Negative);
    }

    #[test]
    fn test_intensifiers_raise_compound() {
        let base = sentiment("The movie was good").compound;
        assert!(sentiment("The movie was very good").compound > base);
        assert!(sentiment("The movie was GOOD").compound > base);
        assert!(sentiment("The movie was good!!!").compound > base);
        assert!(sentiment("The movie was slightly good").compound < base);
    }

    #[test]
    fn test_contrast_favours_clause_after_but() {
        let s = sentiment("The plot was bad but the acting was great");
        assert_eq!(s.overall, SentimentLabel::Positive);
    }

    #[test]
    fn test_fractions_always_sum_to_one() {
        for text in [
            "",
            "!!!",
            "The lecture was outstanding",
            "love love love",
            "I hate this, it is the worst thing ever!!",
            "NOT GOOD at all",
        ] {
            assert_fractions_sum_to_one(&sentiment(text));
        }
    }

    #[test]
    fn test_scoring_is_deterministic() {
        let text = "A surprisingly helpful, if slightly boring, tutorial";
        assert_eq!(sentiment(text), sentiment(text));
    }
}
