use anyhow::Result;
use tracing::{debug, warn};

use crate::engine::{CompletionRequest, ReasoningEngine, SamplingParams};
use crate::error::AnalysisError;
use crate::extract::Extractor;
use crate::model::StructuredResult;
use crate::prompt::compose_prompt;

/// A review is worth sending only if something remains after trimming.
pub fn validate_review(review_text: &str) -> bool {
    !review_text.trim().is_empty()
}

/// validate → compose → one engine round-trip → extract.
pub struct Analyzer<E> {
    engine: E,
    extractor: Extractor,
    sampling: SamplingParams,
}

impl<E: ReasoningEngine> Analyzer<E> {
    pub fn new(engine: E, sampling: SamplingParams) -> Result<Self> {
        Ok(Self {
            engine,
            extractor: Extractor::new()?,
            sampling,
        })
    }

    pub fn model(&self) -> Option<&str> {
        self.engine.model()
    }

    pub fn analyze(&self, review_text: &str) -> StructuredResult {
        match self.complete(review_text) {
            Ok(raw) => self.extractor.extract(&raw),
            Err(err) => StructuredResult::failure(&err, None),
        }
    }

    /// Untouched engine text, or the failure sentinel when there is none.
    pub fn analyze_raw(&self, review_text: &str) -> String {
        match self.complete(review_text) {
            Ok(raw) => raw,
            Err(err) => err.to_string(),
        }
    }

    fn complete(&self, review_text: &str) -> Result<String, AnalysisError> {
        if !validate_review(review_text) {
            warn!("review is empty or whitespace-only; skipping engine call");
            return Err(AnalysisError::InvalidInput);
        }

        let prompt = compose_prompt(review_text);
        debug!(prompt_len = prompt.len(), "composed prompt");
        let request = CompletionRequest::for_prompt(prompt, self.sampling);

        self.engine.complete(&request).map_err(|err| {
            warn!(error = %err, "engine call failed");
            AnalysisError::Engine(err.to_string())
        })
    }
}

#[cfg(test)]
mod tests {
    use std::cell::{Cell, RefCell};

    use super::*;
    use crate::engine::{EngineError, Role};
    use crate::model::Sentiment;

    struct CannedEngine {
        reply: String,
        calls: Cell<usize>,
        last_request: RefCell<Option<CompletionRequest>>,
    }

    impl CannedEngine {
        fn new(reply: &str) -> Self {
            Self {
                reply: reply.to_string(),
                calls: Cell::new(0),
                last_request: RefCell::new(None),
            }
        }
    }

    impl ReasoningEngine for &CannedEngine {
        fn complete(&self, request: &CompletionRequest) -> Result<String, EngineError> {
            self.calls.set(self.calls.get() + 1);
            *self.last_request.borrow_mut() = Some(request.clone());
            Ok(self.reply.clone())
        }
    }

    struct RateLimitedEngine;

    impl ReasoningEngine for RateLimitedEngine {
        fn complete(&self, _request: &CompletionRequest) -> Result<String, EngineError> {
            Err(EngineError::Status {
                status: 429,
                body: "rate limit reached".to_string(),
            })
        }
    }

    const LOVED_IT_REPLY: &str = "RUBRIC ANALYSIS:
- Positive Language: YES - \"absolutely loved\"

SCORE CALCULATION:
1 + 1.5 + 1.5 + 2 + 0.5 = 6.5

FINAL SENTIMENT: POSITIVE
REASONING: Enthusiastic praise with no complaints.";

    #[test]
    fn analyze_returns_structured_positive_result() {
        let engine = CannedEngine::new(LOVED_IT_REPLY);
        let analyzer = Analyzer::new(&engine, SamplingParams::default()).unwrap();

        let result = analyzer.analyze("I absolutely loved this product!");

        assert!(result.success);
        assert_eq!(result.sentiment, Some(Sentiment::Positive));
        assert_eq!(result.score, Some(6.5));
        assert_eq!(engine.calls.get(), 1);
    }

    #[test]
    fn engine_receives_composed_prompt_and_sampling() {
        let engine = CannedEngine::new(LOVED_IT_REPLY);
        let sampling = SamplingParams {
            temperature: 0.0,
            max_tokens: 256,
        };
        let analyzer = Analyzer::new(&engine, sampling).unwrap();

        analyzer.analyze("Decent value.");

        let request = engine.last_request.borrow().clone().unwrap();
        assert_eq!(request.sampling, sampling);
        assert_eq!(request.messages[1].role, Role::User);
        assert_eq!(request.messages[1].content, compose_prompt("Decent value."));
    }

    #[test]
    fn blank_reviews_never_reach_the_engine() {
        let engine = CannedEngine::new(LOVED_IT_REPLY);
        let analyzer = Analyzer::new(&engine, SamplingParams::default()).unwrap();

        for review in ["", " ", "\n\t  \r\n"] {
            let result = analyzer.analyze(review);
            assert!(!result.success);
            assert!(result.error.as_deref().unwrap().contains("INVALID"));
            assert_eq!(result.sentiment, None);
            assert_eq!(result.score, None);
        }
        assert_eq!(engine.calls.get(), 0);
    }

    #[test]
    fn analyze_raw_returns_untouched_reply_or_sentinel() {
        let engine = CannedEngine::new("no template at all");
        let analyzer = Analyzer::new(&engine, SamplingParams::default()).unwrap();

        assert_eq!(analyzer.analyze_raw("fine"), "no template at all");
        assert!(analyzer.analyze_raw("   ").starts_with("INVALID REVIEW:"));
        assert_eq!(engine.calls.get(), 1);
    }

    #[test]
    fn engine_failures_surface_as_error_results() {
        let analyzer = Analyzer::new(RateLimitedEngine, SamplingParams::default()).unwrap();

        let result = analyzer.analyze("Terrible support.");
        assert!(!result.success);
        assert_eq!(
            result.error.as_deref(),
            Some("ERROR: Failed to analyze sentiment. engine returned status 429: rate limit reached")
        );

        let raw = analyzer.analyze_raw("Terrible support.");
        assert!(raw.starts_with("ERROR: Failed to analyze sentiment."));
        let reextracted = Extractor::new().unwrap().extract_saved(&raw);
        assert!(!reextracted.success);
        assert_eq!(reextracted.error, result.error);
    }

    #[test]
    fn engine_text_starting_with_error_is_extracted() {
        let reply = "ERROR-free setup, the blender works.\nFINAL SENTIMENT: POSITIVE";
        let engine = CannedEngine::new(reply);
        let analyzer = Analyzer::new(&engine, SamplingParams::default()).unwrap();

        let result = analyzer.analyze("Setup took two minutes and it blends well.");
        assert!(result.success);
        assert_eq!(result.sentiment, Some(Sentiment::Positive));
        assert_eq!(result.raw_response.as_deref(), Some(reply));
    }

    #[test]
    fn undecidable_reply_is_reported_not_guessed() {
        let engine = CannedEngine::new("I cannot determine this.");
        let analyzer = Analyzer::new(&engine, SamplingParams::default()).unwrap();

        let result = analyzer.analyze("Meh.");
        assert!(!result.success);
        assert_eq!(result.sentiment, None);
        assert_eq!(result.raw_response.as_deref(), Some("I cannot determine this."));
    }

    #[test]
    fn validation_trims_whitespace() {
        assert!(validate_review(" ok "));
        assert!(validate_review("très bien"));
        assert!(!validate_review(""));
        assert!(!validate_review(" \t\n"));
    }
}
