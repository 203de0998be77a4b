//! Batch analysis endpoint
//!
//! Runs the analysis stages over a list of comments without storing anything.
//! Useful for previewing how a set of comments would be treated. Comments come
//! either as a JSON list or as an uploaded CSV file with a `comment_text`
//! column.

use super::json_body;
use crate::analysis::summarizer::SUMMARY_WORD_THRESHOLD;
use crate::analysis::{word_count, SentimentLabel};
use crate::pipeline::{CommentAnalysis, MAX_FEEDBACK_CHARS};
use crate::{ApiError, ApiResult, AppState};
use axum::{
    extract::{
        multipart::{MultipartError, MultipartRejection},
        FromRequest, Multipart, Request, State,
    },
    http::header,
    routing::post,
    Json, Router,
};
use futures::stream::{self, StreamExt};
use serde::{Deserialize, Serialize};
use tracing::info;

/// Most comments accepted in one request
pub const MAX_BATCH_COMMENTS: usize = 500;

/// Comments analyzed concurrently within one batch
const BATCH_CONCURRENCY: usize = 8;

#[derive(Debug, Deserialize)]
pub struct AnalyzeRequest {
    pub comments: Vec<String>,
}

/// Analysis of one comment
#[derive(Debug, Clone, Serialize)]
pub struct CommentResult {
    pub original_text: String,
    pub word_count: usize,
    pub toxic: bool,
    pub toxic_score: f64,
    pub sentiment: Option<SentimentLabel>,
    pub confidence: Option<f64>,
    pub summary: Option<String>,
    pub was_summarized: bool,
}

impl CommentResult {
    fn new(text: String, result: CommentAnalysis) -> Self {
        let words = word_count(&text);
        let CommentAnalysis { verdict, analysis } = result;

        match analysis {
            Some(analysis) => Self {
                word_count: words,
                toxic: false,
                toxic_score: verdict.score,
                sentiment: Some(analysis.sentiment.label),
                confidence: Some(analysis.sentiment.confidence),
                summary: Some(analysis.summary),
                was_summarized: words > SUMMARY_WORD_THRESHOLD,
                original_text: text,
            },
            None => Self {
                word_count: words,
                toxic: true,
                toxic_score: verdict.score,
                sentiment: None,
                confidence: None,
                summary: None,
                was_summarized: false,
                original_text: text,
            },
        }
    }
}

/// Per-label values; every label is always present
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct LabelBreakdown<T> {
    pub positive: T,
    pub negative: T,
    pub neutral: T,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisStatistics {
    pub total_comments: usize,
    pub sentiment_counts: LabelBreakdown<usize>,
    /// Share of non-toxic comments per label, rounded to 2 decimals
    pub sentiment_percentages: LabelBreakdown<f64>,
    pub toxic: usize,
    pub short_texts_unchanged: usize,
    pub long_texts_summarized: usize,
}

#[derive(Debug, Serialize)]
pub struct AnalyzeResponse {
    pub success: bool,
    pub message: String,
    pub results: Vec<CommentResult>,
    pub statistics: AnalysisStatistics,
}

/// Aggregate per-comment results
pub fn compute_statistics(results: &[CommentResult]) -> AnalysisStatistics {
    let mut counts = LabelBreakdown::<usize>::default();
    let mut toxic = 0;
    let mut short_texts_unchanged = 0;
    let mut long_texts_summarized = 0;

    for result in results {
        match result.sentiment {
            Some(SentimentLabel::Positive) => counts.positive += 1,
            Some(SentimentLabel::Negative) => counts.negative += 1,
            Some(SentimentLabel::Neutral) => counts.neutral += 1,
            None => {}
        }

        if result.toxic {
            toxic += 1;
        } else if result.was_summarized {
            long_texts_summarized += 1;
        } else {
            short_texts_unchanged += 1;
        }
    }

    let classified = counts.positive + counts.negative + counts.neutral;
    let percent = |count: usize| {
        if classified == 0 {
            0.0
        } else {
            (count as f64 * 10_000.0 / classified as f64).round() / 100.0
        }
    };

    AnalysisStatistics {
        total_comments: results.len(),
        sentiment_percentages: LabelBreakdown {
            positive: percent(counts.positive),
            negative: percent(counts.negative),
            neutral: percent(counts.neutral),
        },
        sentiment_counts: counts,
        toxic,
        short_texts_unchanged,
        long_texts_summarized,
    }
}

/// One row of an uploaded comment file; other columns are ignored
#[derive(Debug, Deserialize)]
struct CsvRow {
    comment_text: String,
}

/// Multipart field carrying the uploaded file
const CSV_FIELD: &str = "file";

/// Read the `comment_text` column of an uploaded CSV file
pub fn parse_comment_csv(bytes: &[u8]) -> ApiResult<Vec<String>> {
    let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Err(ApiError::BadRequest("CSV file is empty".to_string()));
    }

    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::Headers)
        .from_reader(bytes);

    let headers = reader
        .headers()
        .map_err(|e| ApiError::BadRequest(format!("Invalid CSV format: {}", e)))?;
    if !headers.iter().any(|h| h == "comment_text") {
        return Err(ApiError::BadRequest(
            "CSV must have a 'comment_text' column".to_string(),
        ));
    }

    let comments = reader
        .deserialize::<CsvRow>()
        .map(|row| {
            row.map(|row| row.comment_text)
                .map_err(|e| ApiError::BadRequest(format!("Invalid CSV format: {}", e)))
        })
        .collect::<ApiResult<Vec<String>>>()?;
    Ok(comments)
}

/// Pull the CSV upload out of a multipart body and parse it
async fn comments_from_upload(mut multipart: Multipart) -> ApiResult<Vec<String>> {
    let multipart_error = |e: MultipartError| ApiError::BadRequest(e.body_text());

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some(CSV_FIELD) {
            continue;
        }

        let is_csv = field
            .file_name()
            .map(|name| name.to_ascii_lowercase().ends_with(".csv"))
            .unwrap_or(false);
        if !is_csv {
            return Err(ApiError::BadRequest("File must be a CSV".to_string()));
        }

        let bytes = field.bytes().await.map_err(multipart_error)?;
        return parse_comment_csv(&bytes);
    }

    Err(ApiError::BadRequest(format!(
        "multipart body must include a '{}' field",
        CSV_FIELD
    )))
}

/// Validate a batch and run every comment through the analysis stages
async fn analyze_batch(state: &AppState, comments: Vec<String>) -> ApiResult<Json<AnalyzeResponse>> {
    if comments.len() > MAX_BATCH_COMMENTS {
        return Err(ApiError::BadRequest(format!(
            "{} comments submitted (max {})",
            comments.len(),
            MAX_BATCH_COMMENTS
        )));
    }

    let comments: Vec<String> = comments
        .into_iter()
        .filter(|c| !c.trim().is_empty())
        .collect();

    if comments.is_empty() {
        return Err(ApiError::BadRequest(
            "comments must contain at least one non-empty comment".to_string(),
        ));
    }

    if let Some(too_long) = comments
        .iter()
        .position(|c| c.chars().count() > MAX_FEEDBACK_CHARS)
    {
        return Err(ApiError::BadRequest(format!(
            "comment {} exceeds {} characters",
            too_long + 1,
            MAX_FEEDBACK_CHARS
        )));
    }

    // Each comment still runs its stages in order; results keep input order
    let pipeline = &state.pipeline;
    let results: Vec<CommentResult> = stream::iter(comments)
        .map(|comment| async move {
            let analysis = pipeline.analyze(&comment).await;
            CommentResult::new(comment, analysis)
        })
        .buffered(BATCH_CONCURRENCY)
        .collect()
        .await;

    let statistics = compute_statistics(&results);
    info!(
        "Analyzed {} comments ({} toxic)",
        statistics.total_comments, statistics.toxic
    );

    Ok(Json(AnalyzeResponse {
        success: true,
        message: format!("Analyzed {} comments", results.len()),
        results,
        statistics,
    }))
}

fn is_multipart(request: &Request) -> bool {
    request
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map(|value| value.starts_with("multipart/form-data"))
        .unwrap_or(false)
}

/// POST /analyze
///
/// **Request:** either `{"comments": ["...", "..."]}` (1 to 500 comments) or a
/// `multipart/form-data` upload whose `file` field is a CSV with a
/// `comment_text` column.
///
/// Blank comments are skipped. Nothing is stored.
///
/// **Errors:**
/// - 400 Bad Request: no non-blank comments, too many comments, a comment over
///   5000 characters, an upload that is not a CSV, an empty CSV, a CSV without
///   `comment_text`
pub async fn analyze_comments(
    State(state): State<AppState>,
    request: Request,
) -> ApiResult<Json<AnalyzeResponse>> {
    let comments = if is_multipart(&request) {
        let multipart = Multipart::from_request(request, &state)
            .await
            .map_err(|rejection| ApiError::BadRequest(rejection.body_text()))?;
        comments_from_upload(multipart).await?
    } else {
        let payload = Json::<AnalyzeRequest>::from_request(request, &state).await;
        json_body(payload)?.comments
    };

    analyze_batch(&state, comments).await
}

/// POST /analyze_csv
///
/// Older clients upload their comment file here; same processing as a
/// multipart `/analyze`.
pub async fn analyze_csv(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<Json<AnalyzeResponse>> {
    let multipart = multipart.map_err(|rejection| ApiError::BadRequest(rejection.body_text()))?;
    let comments = comments_from_upload(multipart).await?;
    analyze_batch(&state, comments).await
}

pub fn analyze_routes() -> Router<AppState> {
    Router::new()
        .route("/analyze", post(analyze_comments))
        .route("/analyze_csv", post(analyze_csv))
}
