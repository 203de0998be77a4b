//! Comment analysis stages
//!
//! Three stages run on every submission, in order:
//! 1. [`ToxicityGate`] - scores the text, rejects above [`TOXICITY_THRESHOLD`]
//! 2. [`SentimentClassifier`] - positive / negative / neutral with a confidence
//! 3. [`Summarizer`] - shortens comments longer than 15 words
//!
//! Each stage wraps an external model behind a trait and owns its fallback.
//! Model failures ([`ModelError`]) are recovered inside the stage and never
//! reach the caller.

pub mod inference;
pub mod keywords;
pub mod sentiment;
pub mod summarizer;
pub mod toxicity;

pub use inference::HttpModel;
pub use sentiment::{
    KeywordSentiment, ModelSentiment, SentimentClassifier, SentimentLabel, SentimentResult,
    SentimentStrategy,
};
pub use summarizer::{ModelSummary, Summarizer, SummaryStrategy, TruncationSummary};
pub use toxicity::{ToxicityGate, ToxicityVerdict, TOXICITY_THRESHOLD};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Failure of an external model collaborator
#[derive(Debug, Error)]
pub enum ModelError {
    /// Model endpoint reachable but not serving (loading, overloaded, 5xx)
    #[error("Model unavailable: {0}")]
    Unavailable(String),

    /// Transport failure talking to the inference server
    #[error("Inference request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Response did not have the expected shape
    #[error("Unexpected model response: {0}")]
    UnexpectedResponse(String),
}

/// One class and its probability, as reported by a classifier
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelScore {
    pub label: String,
    pub score: f64,
}

/// Generation bounds for abstractive summarization
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenerationParams {
    pub max_length: u32,
    pub min_length: u32,
    pub do_sample: bool,
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            max_length: 90,
            min_length: 20,
            do_sample: false,
        }
    }
}

/// External toxicity classifier
///
/// Returns one score in [0, 1] per sub-category (toxicity, insult, threat, ...).
#[async_trait]
pub trait ToxicityModel: Send + Sync {
    fn name(&self) -> &str;

    async fn score(&self, text: &str) -> Result<Vec<f64>, ModelError>;
}

/// External sequence-classification model for sentiment
#[async_trait]
pub trait SentimentModel: Send + Sync {
    fn name(&self) -> &str;

    async fn predict(&self, text: &str) -> Result<Vec<LabelScore>, ModelError>;
}

/// External abstractive summarizer
#[async_trait]
pub trait SummaryModel: Send + Sync {
    fn name(&self) -> &str;

    async fn generate(&self, text: &str, params: &GenerationParams) -> Result<String, ModelError>;
}

/// Whitespace-separated word count
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_word_count_ignores_repeated_whitespace() {
        assert_eq!(word_count(""), 0);
        assert_eq!(word_count("   \n\t "), 0);
        assert_eq!(word_count("one"), 1);
        assert_eq!(word_count("  one   two\nthree\t"), 3);
    }
}
