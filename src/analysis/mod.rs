//! Stateless text analysis over transcripts: sentiment and keywords.

mod keywords;
mod sentiment;

pub use keywords::{keywords, MAX_KEYWORDS, STOP_WORDS};
pub use sentiment::{sentiment, Sentiment, SentimentLabel, LEXICON_VERSION};
