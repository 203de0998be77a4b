//! Feedback submission pipeline
//!
//! ```text
//! RECEIVED -> TOXICITY_CHECKED -> REJECTED ---------------------> RECORDED
//!                              -> CLASSIFIED -> SUMMARIZED -----> RECORDED
//! ```
//!
//! Stages run strictly in order within one submission. Nothing is shared
//! between submissions except the read-only stages and the database pool, so
//! a slow model call for one comment never holds up another.

use crate::analysis::{
    GenerationParams, HttpModel, SentimentClassifier, SentimentResult, Summarizer, ToxicityGate,
    ToxicityVerdict,
};
use crate::recorder::{Analysis, FeedbackRecorder};
use afs_common::config::{AnalysisConfig, SentimentBackend, SummarizerBackend, ToxicityBackend};
use afs_common::db::{amendment_exists, Feedback};
use afs_common::{Error, Result};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, info_span, warn, Instrument};
use uuid::Uuid;

/// Longest accepted comment, in characters
pub const MAX_FEEDBACK_CHARS: usize = 5000;

/// A public comment on an amendment
#[derive(Debug, Clone, Deserialize)]
pub struct FeedbackSubmission {
    pub amendment_id: i64,
    pub original_text: String,
}

impl FeedbackSubmission {
    /// Reject malformed input before any stage runs
    pub fn validate(&self) -> Result<()> {
        if self.amendment_id <= 0 {
            return Err(Error::InvalidInput(format!(
                "amendment_id must be a positive integer, got {}",
                self.amendment_id
            )));
        }

        if self.original_text.trim().is_empty() {
            return Err(Error::InvalidInput(
                "original_text must not be empty".to_string(),
            ));
        }

        let chars = self.original_text.chars().count();
        if chars > MAX_FEEDBACK_CHARS {
            return Err(Error::InvalidInput(format!(
                "original_text is {} characters (max {})",
                chars, MAX_FEEDBACK_CHARS
            )));
        }

        Ok(())
    }
}

/// Pipeline state, logged as a submission advances
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStage {
    Received,
    ToxicityChecked,
    Rejected,
    Classified,
    Summarized,
    Recorded,
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Received => "RECEIVED",
            Self::ToxicityChecked => "TOXICITY_CHECKED",
            Self::Rejected => "REJECTED",
            Self::Classified => "CLASSIFIED",
            Self::Summarized => "SUMMARIZED",
            Self::Recorded => "RECORDED",
        };
        f.write_str(name)
    }
}

/// Result of running the analysis stages on one comment
#[derive(Debug, Clone, PartialEq)]
pub struct CommentAnalysis {
    pub verdict: ToxicityVerdict,
    /// None when the gate rejected the comment
    pub analysis: Option<Analysis>,
}

/// Outcome of a recorded submission
#[derive(Debug, Clone)]
pub enum SubmissionOutcome {
    /// Gate rejected the comment; a toxic-marked row was stored
    Rejected { feedback: Feedback, toxicity_score: f64 },
    /// Comment was classified, summarized and stored
    Accepted {
        feedback: Feedback,
        analysis: Analysis,
        toxicity_score: f64,
    },
}

impl SubmissionOutcome {
    pub fn feedback(&self) -> &Feedback {
        match self {
            Self::Rejected { feedback, .. } | Self::Accepted { feedback, .. } => feedback,
        }
    }
}

/// Configured backend name per stage
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StageBackends {
    pub toxicity: String,
    pub sentiment: String,
    pub summarizer: String,
}

/// The four stages wired together
pub struct FeedbackPipeline {
    toxicity: ToxicityGate,
    sentiment: SentimentClassifier,
    summarizer: Summarizer,
    recorder: FeedbackRecorder,
}

impl FeedbackPipeline {
    /// Builder starting from the rule-based defaults
    pub fn builder(db: SqlitePool) -> FeedbackPipelineBuilder {
        FeedbackPipelineBuilder::new(db)
    }

    /// Build every stage from the `[analysis]` configuration
    pub fn from_config(db: SqlitePool, config: &AnalysisConfig) -> Result<Self> {
        let needs_client = config.toxicity == ToxicityBackend::Model
            || config.sentiment == SentimentBackend::Model
            || config.summarizer == SummarizerBackend::Model;

        let client = if needs_client {
            let client = HttpModel::client(Duration::from_secs(config.model_timeout_secs))
                .map_err(|e| Error::Config(format!("Inference client setup failed: {}", e)))?;
            info!("Inference server: {}", config.inference_url);
            Some(client)
        } else {
            None
        };
        let model = |name: &str| {
            client
                .clone()
                .map(|client| Arc::new(HttpModel::new(client, &config.inference_url, name)))
        };

        let mut builder = Self::builder(db);

        if config.toxicity == ToxicityBackend::Model {
            if let Some(m) = model(&config.toxicity_model) {
                builder = builder.toxicity(ToxicityGate::new(m));
            }
        } else {
            warn!("Toxicity classifier disabled; every comment passes the gate");
        }

        if config.sentiment == SentimentBackend::Model {
            if let Some(m) = model(&config.sentiment_model) {
                builder = builder.sentiment(SentimentClassifier::model_backed(m));
            }
        }

        if config.summarizer == SummarizerBackend::Model {
            if let Some(m) = model(&config.summarization_model) {
                let params = GenerationParams {
                    max_length: config.summary_max_length,
                    min_length: config.summary_min_length,
                    do_sample: false,
                };
                builder = builder.summarizer(Summarizer::model_backed(m, params));
            }
        }

        let pipeline = builder.build();
        let backends = pipeline.backends();
        info!(
            "Pipeline backends: toxicity={}, sentiment={}, summarizer={}",
            backends.toxicity, backends.sentiment, backends.summarizer
        );
        Ok(pipeline)
    }

    pub fn backends(&self) -> StageBackends {
        StageBackends {
            toxicity: self.toxicity.backend_name(),
            sentiment: self.sentiment.backend_name(),
            summarizer: self.summarizer.backend_name(),
        }
    }

    /// Run the gate and, if it passes, classification and summarization
    ///
    /// Never fails: every stage recovers from model errors internally.
    pub async fn analyze(&self, text: &str) -> CommentAnalysis {
        let verdict = self.toxicity.evaluate(text).await;
        debug!("Stage {} (score={:.3})", PipelineStage::ToxicityChecked, verdict.score);

        if verdict.is_toxic {
            debug!("Stage {}", PipelineStage::Rejected);
            return CommentAnalysis {
                verdict,
                analysis: None,
            };
        }

        let sentiment: SentimentResult = self.sentiment.classify(text).await;
        debug!(
            "Stage {} ({} @ {:.2})",
            PipelineStage::Classified,
            sentiment.label,
            sentiment.confidence
        );

        let summary = self.summarizer.summarize(text).await;
        debug!("Stage {}", PipelineStage::Summarized);

        CommentAnalysis {
            verdict,
            analysis: Some(Analysis { sentiment, summary }),
        }
    }

    /// Validate, analyze and record one submission
    ///
    /// # Errors
    /// - `InvalidInput` for malformed submissions (nothing runs)
    /// - `NotFound` if the amendment does not exist (nothing written)
    /// - `Database` if the write fails (nothing written)
    pub async fn submit(&self, submission: &FeedbackSubmission) -> Result<SubmissionOutcome> {
        let span = info_span!(
            "submission",
            id = %Uuid::new_v4(),
            amendment_id = submission.amendment_id
        );

        async move {
            submission.validate()?;

            // Checked up front so model calls are not wasted on unknown amendments;
            // the recorder re-checks inside its transaction.
            if !amendment_exists(self.recorder_pool(), submission.amendment_id).await? {
                return Err(Error::NotFound(format!(
                    "Amendment {} not found",
                    submission.amendment_id
                )));
            }
            debug!("Stage {}", PipelineStage::Received);

            let text = submission.original_text.as_str();
            let CommentAnalysis { verdict, analysis } = self.analyze(text).await;

            let feedback = self
                .recorder
                .record(submission.amendment_id, text, verdict, analysis.as_ref())
                .await?;
            debug!("Stage {} (feedback {})", PipelineStage::Recorded, feedback.id);

            Ok(match analysis {
                None => {
                    warn!("Rejected toxic comment (score={:.3})", verdict.score);
                    SubmissionOutcome::Rejected {
                        feedback,
                        toxicity_score: verdict.score,
                    }
                }
                Some(analysis) => SubmissionOutcome::Accepted {
                    feedback,
                    analysis,
                    toxicity_score: verdict.score,
                },
            })
        }
        .instrument(span)
        .await
    }

    fn recorder_pool(&self) -> &SqlitePool {
        self.recorder.pool()
    }
}

/// Assembles a [`FeedbackPipeline`] stage by stage
///
/// Defaults: toxicity disabled, keyword sentiment, truncation summaries.
pub struct FeedbackPipelineBuilder {
    db: SqlitePool,
    toxicity: ToxicityGate,
    sentiment: SentimentClassifier,
    summarizer: Summarizer,
}

impl FeedbackPipelineBuilder {
    fn new(db: SqlitePool) -> Self {
        Self {
            db,
            toxicity: ToxicityGate::disabled(),
            sentiment: SentimentClassifier::keyword(),
            summarizer: Summarizer::truncation(),
        }
    }

    pub fn toxicity(mut self, gate: ToxicityGate) -> Self {
        self.toxicity = gate;
        self
    }

    pub fn sentiment(mut self, classifier: SentimentClassifier) -> Self {
        self.sentiment = classifier;
        self
    }

    pub fn summarizer(mut self, summarizer: Summarizer) -> Self {
        self.summarizer = summarizer;
        self
    }

    pub fn build(self) -> FeedbackPipeline {
        FeedbackPipeline {
            toxicity: self.toxicity,
            sentiment: self.sentiment,
            summarizer: self.summarizer,
            recorder: FeedbackRecorder::new(self.db),
        }
    }
}
