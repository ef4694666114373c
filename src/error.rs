use thiserror::Error;

pub const INVALID_REVIEW_MESSAGE: &str =
    "INVALID REVIEW: The review is empty or contains no meaningful content.";

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ExtractionError {
    #[error("pattern `{matcher}` matched without capturing a value")]
    MissingCapture { matcher: &'static str },

    #[error("score `{raw}` is not a finite number")]
    NonFiniteScore { raw: String },
}

/// Every way a single analysis can fail. The `Display` text is what callers
/// see in `StructuredResult::error`.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AnalysisError {
    #[error("{}", INVALID_REVIEW_MESSAGE)]
    InvalidInput,

    #[error("ERROR: Failed to analyze sentiment. {0}")]
    Engine(String),

    /// A raw reply that already carries an `INVALID`/`ERROR` sentinel.
    #[error("{0}")]
    Sentinel(String),

    #[error("Failed to parse results: {0}")]
    Extraction(#[from] ExtractionError),

    #[error("Failed to parse results: no POSITIVE or NEGATIVE determination found in engine response")]
    UnknownSentiment,
}
