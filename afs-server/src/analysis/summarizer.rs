//! Summarization stage
//!
//! Comments of 15 words or fewer are returned unchanged. Longer comments go to
//! the configured [`SummaryStrategy`]; if that fails, or produces something that
//! is not actually shorter, the first 50 words plus an ellipsis are used.
//! Empty or whitespace-only text yields [`NO_CONTENT`].

use super::{word_count, GenerationParams, ModelError, SummaryModel};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, warn};

/// Comments at or under this many words are not summarized
pub const SUMMARY_WORD_THRESHOLD: usize = 15;

/// Model input is cut to this many characters to bound latency
pub const MAX_MODEL_INPUT_CHARS: usize = 1000;

/// Words kept by the truncation fallback
pub const TRUNCATION_WORDS: usize = 50;

/// Marker appended by the truncation fallback
pub const ELLIPSIS: &str = "...";

/// Returned for empty or whitespace-only input
pub const NO_CONTENT: &str = "No content to summarize";

/// A way of shortening a comment that exceeds the word threshold
#[async_trait]
pub trait SummaryStrategy: Send + Sync {
    fn name(&self) -> String;

    async fn summarize_long(&self, text: &str) -> Result<String, ModelError>;
}

/// Abstractive summary from an external model
pub struct ModelSummary {
    model: Arc<dyn SummaryModel>,
    params: GenerationParams,
}

impl ModelSummary {
    pub fn new(model: Arc<dyn SummaryModel>, params: GenerationParams) -> Self {
        Self { model, params }
    }
}

#[async_trait]
impl SummaryStrategy for ModelSummary {
    fn name(&self) -> String {
        self.model.name().to_string()
    }

    async fn summarize_long(&self, text: &str) -> Result<String, ModelError> {
        let input = truncate_chars(text, MAX_MODEL_INPUT_CHARS);
        let summary = self.model.generate(input, &self.params).await?;
        Ok(summary.trim().to_string())
    }
}

/// First [`TRUNCATION_WORDS`] words plus [`ELLIPSIS`]
#[derive(Debug, Clone, Copy, Default)]
pub struct TruncationSummary;

#[async_trait]
impl SummaryStrategy for TruncationSummary {
    fn name(&self) -> String {
        "truncation".to_string()
    }

    async fn summarize_long(&self, text: &str) -> Result<String, ModelError> {
        Ok(truncate_words(text))
    }
}

/// Third pipeline stage
pub struct Summarizer {
    strategy: Arc<dyn SummaryStrategy>,
}

impl Summarizer {
    pub fn new(strategy: Arc<dyn SummaryStrategy>) -> Self {
        Self { strategy }
    }

    /// Model-backed summarizer with truncation fallback
    pub fn model_backed(model: Arc<dyn SummaryModel>, params: GenerationParams) -> Self {
        Self::new(Arc::new(ModelSummary::new(model, params)))
    }

    /// Truncation-only summarizer
    pub fn truncation() -> Self {
        Self::new(Arc::new(TruncationSummary))
    }

    pub fn backend_name(&self) -> String {
        self.strategy.name()
    }

    /// Summarize `text`. Never fails.
    pub async fn summarize(&self, text: &str) -> String {
        if text.trim().is_empty() {
            return NO_CONTENT.to_string();
        }

        let words = word_count(text);
        if words <= SUMMARY_WORD_THRESHOLD {
            debug!("Text has {} words (<= {}), returning original", words, SUMMARY_WORD_THRESHOLD);
            return text.to_string();
        }

        match self.strategy.summarize_long(text).await {
            Ok(summary) if is_usable_summary(&summary, text, words) => {
                debug!(
                    "Summarized {} words -> {} words ({})",
                    words,
                    word_count(&summary),
                    self.strategy.name()
                );
                summary
            }
            Ok(_) => {
                warn!(
                    "Summary from '{}' was empty or not shorter than the input, truncating",
                    self.strategy.name()
                );
                truncate_words(text)
            }
            Err(e) => {
                warn!("Summarizer '{}' failed, truncating: {}", self.strategy.name(), e);
                truncate_words(text)
            }
        }
    }
}

/// A summary must exist, differ from the input, and not add words
fn is_usable_summary(summary: &str, original: &str, original_words: usize) -> bool {
    !summary.trim().is_empty()
        && summary.trim() != original.trim()
        && word_count(summary) <= original_words
}

/// Truncation fallback: first [`TRUNCATION_WORDS`] words joined by single spaces
pub fn truncate_words(text: &str) -> String {
    let mut truncated = text
        .split_whitespace()
        .take(TRUNCATION_WORDS)
        .collect::<Vec<_>>()
        .join(" ");
    truncated.push_str(ELLIPSIS);
    truncated
}

/// Cut `text` to at most `max_chars` characters on a char boundary
fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((byte_index, _)) => &text[..byte_index],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Records what it was asked to summarize and replies with a fixed result
    struct Recording {
        reply: Result<String, String>,
        seen: Mutex<Vec<(String, GenerationParams)>>,
    }

    impl Recording {
        fn replying(reply: Result<&str, &str>) -> Arc<Self> {
            Arc::new(Self {
                reply: reply.map(str::to_string).map_err(str::to_string),
                seen: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl SummaryModel for Recording {
        fn name(&self) -> &str {
            "recording"
        }

        async fn generate(&self, text: &str, params: &GenerationParams) -> Result<String, ModelError> {
            self.seen.lock().unwrap().push((text.to_string(), params.clone()));
            self.reply.clone().map_err(ModelError::Unavailable)
        }
    }

    fn words(n: usize) -> String {
        (1..=n).map(|i| format!("word{}", i)).collect::<Vec<_>>().join(" ")
    }

    #[tokio::test]
    async fn test_short_text_returned_unchanged() {
        let summarizer = Summarizer::truncation();
        let text = "  Great job on this amendment!  ";
        assert_eq!(summarizer.summarize(text).await, text);

        let fifteen = words(15);
        assert_eq!(summarizer.summarize(&fifteen).await, fifteen);
    }

    #[tokio::test]
    async fn test_short_text_never_reaches_model() {
        let model = Recording::replying(Ok("should not be used"));
        let summarizer = Summarizer::model_backed(model.clone(), GenerationParams::default());

        summarizer.summarize(&words(15)).await;
        assert!(model.seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_blank_text_yields_sentinel() {
        let summarizer = Summarizer::truncation();
        assert_eq!(summarizer.summarize("").await, NO_CONTENT);
        assert_eq!(summarizer.summarize(" \n\t ").await, NO_CONTENT);
    }

    #[tokio::test]
    async fn test_truncation_keeps_fifty_words() {
        let summarizer = Summarizer::truncation();

        let sixteen = words(16);
        let summary = summarizer.summarize(&sixteen).await;
        assert_eq!(summary, format!("{}...", sixteen));
        assert_ne!(summary, sixteen);

        let summary = summarizer.summarize(&words(80)).await;
        assert_eq!(summary, format!("{}...", words(50)));
        assert_eq!(word_count(&summary), 50);
    }

    #[tokio::test]
    async fn test_model_summary_used_when_shorter() {
        let model = Recording::replying(Ok(" A concise summary. "));
        let summarizer = Summarizer::model_backed(model.clone(), GenerationParams::default());

        let summary = summarizer.summarize(&words(40)).await;
        assert_eq!(summary, "A concise summary.");

        let seen = model.seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].1, GenerationParams { max_length: 90, min_length: 20, do_sample: false });
    }

    #[tokio::test]
    async fn test_model_input_truncated_to_limit() {
        let model = Recording::replying(Ok("short"));
        let summarizer = Summarizer::model_backed(model.clone(), GenerationParams::default());

        let long_text = words(400);
        assert!(long_text.chars().count() > MAX_MODEL_INPUT_CHARS);
        summarizer.summarize(&long_text).await;

        let seen = model.seen.lock().unwrap();
        assert_eq!(seen[0].0.chars().count(), MAX_MODEL_INPUT_CHARS);
        assert!(long_text.starts_with(&seen[0].0));
    }

    #[tokio::test]
    async fn test_model_failure_falls_back_to_truncation() {
        let summarizer = Summarizer::model_backed(
            Recording::replying(Err("CUDA out of memory")),
            GenerationParams::default(),
        );
        assert_eq!(summarizer.summarize(&words(60)).await, format!("{}...", words(50)));
    }

    #[tokio::test]
    async fn test_unusable_model_output_falls_back_to_truncation() {
        let text = words(20);

        let echo = Summarizer::model_backed(Recording::replying(Ok(text.as_str())), GenerationParams::default());
        assert_eq!(echo.summarize(&text).await, format!("{}...", text));

        let longer = format!("{} and then some more", text);
        let verbose = Summarizer::model_backed(Recording::replying(Ok(longer.as_str())), GenerationParams::default());
        assert_eq!(verbose.summarize(&text).await, format!("{}...", text));

        let empty = Summarizer::model_backed(Recording::replying(Ok("   ")), GenerationParams::default());
        assert_eq!(empty.summarize(&text).await, format!("{}...", text));
    }

    #[test]
    fn test_truncate_chars_respects_char_boundaries() {
        assert_eq!(truncate_chars("héllo", 2), "hé");
        assert_eq!(truncate_chars("abc", 10), "abc");
        assert_eq!(truncate_chars("", 3), "");
    }
}
