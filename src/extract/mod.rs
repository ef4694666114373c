use anyhow::Result;
use tracing::{debug, warn};

use crate::error::AnalysisError;
use crate::model::{Sentiment, StructuredResult};

mod matchers;

use matchers::{
    CueWords, KeywordOrder, LabeledScore, MarkerStyle, MatcherChain, ReasoningSection,
    RubricSection, ScoreCalculation, SentimentMarker, resolve,
};

const SENTINEL_PREFIXES: [&str; 2] = ["INVALID", "ERROR"];
const DEFAULT_SCORE_MAGNITUDE: f64 = 1.0;
const COHERENCE_SCORE_MAGNITUDE: f64 = 0.1;

#[derive(Debug, Clone, PartialEq)]
struct ExtractedFields {
    sentiment: Sentiment,
    score: f64,
    reasoning: String,
    rubric_analysis: Option<String>,
}

/// Turns a free-text engine reply into a [`StructuredResult`].
///
/// Patterns are compiled once in [`Extractor::new`]; extraction itself keeps
/// no state, so one extractor can serve any number of requests.
pub struct Extractor {
    sentiment: MatcherChain<Sentiment>,
    score: MatcherChain<f64>,
    reasoning: MatcherChain<String>,
    rubric_analysis: MatcherChain<String>,
}

impl Extractor {
    pub fn new() -> Result<Self> {
        Ok(Self {
            sentiment: vec![
                Box::new(SentimentMarker::new()?),
                Box::new(KeywordOrder),
                Box::new(CueWords::new()?),
            ],
            score: vec![
                Box::new(ScoreCalculation::new(MarkerStyle::Template)?),
                Box::new(ScoreCalculation::new(MarkerStyle::AnyCase)?),
                Box::new(LabeledScore::new()?),
            ],
            reasoning: vec![
                Box::new(ReasoningSection::new(MarkerStyle::Template)?),
                Box::new(ReasoningSection::new(MarkerStyle::AnyCase)?),
            ],
            rubric_analysis: vec![
                Box::new(RubricSection::new(MarkerStyle::Template)?),
                Box::new(RubricSection::new(MarkerStyle::AnyCase)?),
            ],
        })
    }

    /// Extracts a reply that came back from the engine in this process.
    pub fn extract(&self, raw: &str) -> StructuredResult {
        match self.extract_fields(raw) {
            Ok(fields) => StructuredResult::success(
                fields.sentiment,
                fields.score,
                fields.reasoning,
                fields.rubric_analysis,
                raw,
            ),
            Err(err) => {
                warn!(error = %err, raw_len = raw.len(), "structured extraction failed");
                StructuredResult::failure(&err, Some(raw))
            }
        }
    }

    /// Extracts a reply read back from disk.
    ///
    /// Saved `raw` output may be a failure line written by an earlier run
    /// (`INVALID REVIEW: ...`, `ERROR: ...`); those come back as failures
    /// carrying that line instead of being parsed.
    pub fn extract_saved(&self, raw: &str) -> StructuredResult {
        if let Some(sentinel) = sentinel_message(raw) {
            debug!(message = %sentinel, "saved reply carries a failure sentinel");
            return StructuredResult::failure(&AnalysisError::Sentinel(sentinel), None);
        }
        self.extract(raw)
    }

    fn extract_fields(&self, raw: &str) -> Result<ExtractedFields, AnalysisError> {
        let sentiment = match resolve(self.sentiment.as_slice(), raw)? {
            Some((sentiment, matcher)) => {
                debug!(matcher, sentiment = %sentiment, "sentiment resolved");
                sentiment
            }
            None => Sentiment::Unknown,
        };

        let extracted_score = resolve(self.score.as_slice(), raw)?.map(|(score, matcher)| {
            debug!(matcher, score, "score resolved");
            score
        });
        let score =
            reconcile_score(sentiment, extracted_score).ok_or(AnalysisError::UnknownSentiment)?;

        let reasoning = match resolve(self.reasoning.as_slice(), raw)? {
            Some((reasoning, _)) => reasoning,
            None => default_reasoning(sentiment),
        };
        let rubric_analysis =
            resolve(self.rubric_analysis.as_slice(), raw)?.map(|(analysis, _)| analysis);

        Ok(ExtractedFields {
            sentiment,
            score,
            reasoning,
            rubric_analysis,
        })
    }
}

fn sentinel_message(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    SENTINEL_PREFIXES
        .iter()
        .any(|prefix| trimmed.starts_with(prefix))
        .then(|| trimmed.to_string())
}

/// Applies the score defaulting and sign-coherence rules.
///
/// A missing score takes the default magnitude with the label's sign. A present
/// score whose sign disagrees with the label (zero included) is pulled to the
/// small coherence magnitude on the label's side. `None` only for `Unknown`.
fn reconcile_score(sentiment: Sentiment, score: Option<f64>) -> Option<f64> {
    let sign = sentiment.sign()?;
    let reconciled = match score {
        None => sign * DEFAULT_SCORE_MAGNITUDE,
        Some(value) if value * sign > 0.0 => value,
        Some(_) => sign * COHERENCE_SCORE_MAGNITUDE,
    };
    Some(reconciled)
}

fn default_reasoning(sentiment: Sentiment) -> String {
    format!(
        "The review was determined to be {} based on overall tone and content analysis.",
        sentiment.as_str().to_lowercase()
    )
}
