use std::fmt;

use serde::Serialize;

use crate::error::AnalysisError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Sentiment {
    Positive,
    Negative,
    Unknown,
}

impl Sentiment {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Positive => "POSITIVE",
            Self::Negative => "NEGATIVE",
            Self::Unknown => "UNKNOWN",
        }
    }

    /// Sign a score for this label must carry; `None` for `Unknown`.
    pub fn sign(self) -> Option<f64> {
        match self {
            Self::Positive => Some(1.0),
            Self::Negative => Some(-1.0),
            Self::Unknown => None,
        }
    }
}

impl fmt::Display for Sentiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of one analysis.
///
/// Only [`StructuredResult::success`] and [`StructuredResult::failure`] build
/// values, so a failed result never carries sentiment, score, or explanations,
/// and a successful one always carries a decided label with a matching score sign.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StructuredResult {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sentiment: Option<Sentiment>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reasoning: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rubric_analysis: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_response: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl StructuredResult {
    pub(crate) fn success(
        sentiment: Sentiment,
        score: f64,
        reasoning: String,
        rubric_analysis: Option<String>,
        raw_response: &str,
    ) -> Self {
        debug_assert!(sentiment != Sentiment::Unknown);
        debug_assert!(sentiment.sign().is_some_and(|sign| sign * score > 0.0));

        Self {
            success: true,
            sentiment: Some(sentiment),
            score: Some(score),
            reasoning: Some(reasoning),
            rubric_analysis,
            raw_response: Some(raw_response.to_string()),
            error: None,
        }
    }

    pub(crate) fn failure(error: &AnalysisError, raw_response: Option<&str>) -> Self {
        Self {
            success: false,
            sentiment: None,
            score: None,
            reasoning: None,
            rubric_analysis: None,
            raw_response: raw_response.map(str::to_string),
            error: Some(error.to_string()),
        }
    }

    pub fn without_raw_response(mut self) -> Self {
        self.raw_response = None;
        self
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    pub analyzed_at: String,
    pub model: Option<String>,
    pub prompt_sha256: Option<String>,
    pub result: StructuredResult,
}
