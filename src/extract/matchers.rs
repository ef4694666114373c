use anyhow::{Context, Result};
use regex::{Captures, Regex};

use crate::error::ExtractionError;
use crate::model::Sentiment;

const SCORE_NUMBER: &str = r"([-+]?[0-9]*\.?[0-9]+)";

/// One tolerant way of recovering a field from engine text.
///
/// `Ok(None)` means "this pattern does not apply"; the next matcher in the
/// chain gets a turn. `Err` aborts extraction for the whole reply.
pub trait FieldMatcher<T>: Send + Sync {
    fn name(&self) -> &'static str;

    fn find(&self, text: &str) -> Result<Option<T>, ExtractionError>;
}

pub type MatcherChain<T> = Vec<Box<dyn FieldMatcher<T>>>;

pub fn resolve<T>(
    chain: &[Box<dyn FieldMatcher<T>>],
    text: &str,
) -> Result<Option<(T, &'static str)>, ExtractionError> {
    for matcher in chain {
        if let Some(value) = matcher.find(text)? {
            return Ok(Some((value, matcher.name())));
        }
    }
    Ok(None)
}

/// How strictly a section heading must look like the template.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerStyle {
    /// Upper case as the template spells it (`SCORE CALCULATION`), colon optional.
    Template,
    /// Any casing, colon required (`Score calculation:`). Inline labels such as
    /// `Reasoning:` inside rubric lines also match this form, so it is only a
    /// fallback for replies without template headings.
    AnyCase,
}

pub fn section_marker(words: &[&str], style: MarkerStyle) -> String {
    let phrase = words.join(r"[ \t]+");
    match style {
        MarkerStyle::Template => format!(r"\**{phrase}"),
        MarkerStyle::AnyCase => format!(r"\**(?i:{phrase})[ \t]*\**[ \t]*:"),
    }
}

fn required_capture<'t>(
    captures: &Captures<'t>,
    matcher: &'static str,
) -> Result<&'t str, ExtractionError> {
    captures
        .get(1)
        .map(|value| value.as_str())
        .ok_or(ExtractionError::MissingCapture { matcher })
}

fn label_from_word(word: &str) -> Option<Sentiment> {
    if word.eq_ignore_ascii_case("positive") {
        Some(Sentiment::Positive)
    } else if word.eq_ignore_ascii_case("negative") {
        Some(Sentiment::Negative)
    } else {
        None
    }
}

fn parse_score(raw: &str) -> Result<Option<f64>, ExtractionError> {
    match raw.parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(Some(value)),
        Ok(_) => Err(ExtractionError::NonFiniteScore {
            raw: raw.to_string(),
        }),
        Err(_) => Ok(None),
    }
}

pub struct SentimentMarker {
    pattern: Regex,
}

impl SentimentMarker {
    pub fn new() -> Result<Self> {
        let pattern = Regex::new(
            r#"(?i)FINAL[ \t]+SENTIMENT[\s:*"'`\[\]]*\b(POSITIVE|NEGATIVE)\b"#,
        )
        .context("failed to compile final sentiment regex")?;
        Ok(Self { pattern })
    }
}

impl FieldMatcher<Sentiment> for SentimentMarker {
    fn name(&self) -> &'static str {
        "final-sentiment-marker"
    }

    // The template line may be echoed before the real verdict, so the last
    // marker wins.
    fn find(&self, text: &str) -> Result<Option<Sentiment>, ExtractionError> {
        let Some(captures) = self.pattern.captures_iter(text).last() else {
            return Ok(None);
        };
        let word = required_capture(&captures, self.name())?;
        Ok(label_from_word(word))
    }
}

/// Earliest of the literal words "positive" / "negative", anywhere.
pub struct KeywordOrder;

impl FieldMatcher<Sentiment> for KeywordOrder {
    fn name(&self) -> &'static str {
        "keyword-order"
    }

    fn find(&self, text: &str) -> Result<Option<Sentiment>, ExtractionError> {
        let lowered = text.to_lowercase();
        let positive = lowered.find("positive");
        let negative = lowered.find("negative");

        let label = match (positive, negative) {
            (Some(pos), Some(neg)) if neg < pos => Some(Sentiment::Negative),
            (Some(_), _) => Some(Sentiment::Positive),
            (None, Some(_)) => Some(Sentiment::Negative),
            (None, None) => None,
        };
        Ok(label)
    }
}

/// Praise/complaint cues matched from a word start, so inflections such as
/// "greatest" count but "dislike" does not; the earliest cue decides.
pub struct CueWords {
    positive: Regex,
    negative: Regex,
}

impl CueWords {
    pub fn new() -> Result<Self> {
        let positive = Regex::new(
            r"(?i)\b(?:(?:good|great|excellen|lov|enjoy)\w*|lik(?:e[ds]?|ing)\b)",
        )
        .context("failed to compile positive cue regex")?;
        let negative = Regex::new(
            r"(?i)\b(?:(?:bad|poor|terribl|awful|disappoint)\w*|hat(?:e[ds]?|ing)\b)",
        )
        .context("failed to compile negative cue regex")?;
        Ok(Self { positive, negative })
    }
}

impl FieldMatcher<Sentiment> for CueWords {
    fn name(&self) -> &'static str {
        "cue-words"
    }

    fn find(&self, text: &str) -> Result<Option<Sentiment>, ExtractionError> {
        let positive = self.positive.find(text).map(|found| found.start());
        let negative = self.negative.find(text).map(|found| found.start());

        let label = match (positive, negative) {
            (Some(pos), Some(neg)) if neg < pos => Some(Sentiment::Negative),
            (Some(_), _) => Some(Sentiment::Positive),
            (None, Some(_)) => Some(Sentiment::Negative),
            (None, None) => None,
        };
        Ok(label)
    }
}

/// Last `= <number>` inside the SCORE CALCULATION section.
pub struct ScoreCalculation {
    style: MarkerStyle,
    section: Regex,
    equals: Regex,
}

impl ScoreCalculation {
    pub fn new(style: MarkerStyle) -> Result<Self> {
        let section = Regex::new(&format!(
            r"(?s){}[ \t]*\**[ \t]*:?(.*?)(?:{}|{}|\z)",
            section_marker(&["SCORE", "CALCULATION"], style),
            section_marker(&["FINAL", "SENTIMENT"], style),
            section_marker(&["REASONING"], style),
        ))
        .context("failed to compile score section regex")?;
        let equals = Regex::new(&format!(r"=[ \t]*\**[ \t]*{SCORE_NUMBER}"))
            .context("failed to compile score value regex")?;
        Ok(Self {
            style,
            section,
            equals,
        })
    }
}

impl FieldMatcher<f64> for ScoreCalculation {
    fn name(&self) -> &'static str {
        match self.style {
            MarkerStyle::Template => "score-calculation",
            MarkerStyle::AnyCase => "score-calculation-any-case",
        }
    }

    fn find(&self, text: &str) -> Result<Option<f64>, ExtractionError> {
        let Some(section) = self.section.captures(text) else {
            return Ok(None);
        };
        let body = required_capture(&section, self.name())?;
        let Some(last) = self.equals.captures_iter(body).last() else {
            return Ok(None);
        };
        parse_score(required_capture(&last, self.name())?)
    }
}

/// `Final score: 2.5` / `Total score = -1` lines outside the template.
pub struct LabeledScore {
    pattern: Regex,
}

impl LabeledScore {
    pub fn new() -> Result<Self> {
        let pattern = Regex::new(&format!(
            r"(?i)\b(?:final|total|weighted)(?:[ \t]+sentiment)?[ \t]+score[ \t]*\**[ \t]*(?:is|:|=)?[ \t]*\**[ \t]*{SCORE_NUMBER}"
        ))
        .context("failed to compile labeled score regex")?;
        Ok(Self { pattern })
    }
}

impl FieldMatcher<f64> for LabeledScore {
    fn name(&self) -> &'static str {
        "labeled-score"
    }

    fn find(&self, text: &str) -> Result<Option<f64>, ExtractionError> {
        let Some(captures) = self.pattern.captures_iter(text).last() else {
            return Ok(None);
        };
        parse_score(required_capture(&captures, self.name())?)
    }
}

/// Text after REASONING up to the next blank line or end of input.
///
/// With [`MarkerStyle::AnyCase`] the last heading wins: the verdict section
/// follows any inline `Reasoning:` labels in the rubric lines.
pub struct ReasoningSection {
    style: MarkerStyle,
    heading: Regex,
    pattern: Regex,
}

impl ReasoningSection {
    pub fn new(style: MarkerStyle) -> Result<Self> {
        let heading = section_marker(&["REASONING"], style);
        let pattern = Regex::new(&format!(
            r"(?s){heading}[ \t]*\**[ \t]*:?\s*(.*?)(?:\r?\n[ \t]*\r?\n|\z)"
        ))
        .context("failed to compile reasoning regex")?;
        let heading = Regex::new(&heading).context("failed to compile reasoning heading regex")?;
        Ok(Self {
            style,
            heading,
            pattern,
        })
    }
}

impl FieldMatcher<String> for ReasoningSection {
    fn name(&self) -> &'static str {
        match self.style {
            MarkerStyle::Template => "reasoning-section",
            MarkerStyle::AnyCase => "reasoning-section-any-case",
        }
    }

    fn find(&self, text: &str) -> Result<Option<String>, ExtractionError> {
        let heading = match self.style {
            MarkerStyle::Template => self.heading.find(text),
            MarkerStyle::AnyCase => self.heading.find_iter(text).last(),
        };
        let Some(heading) = heading else {
            return Ok(None);
        };
        let Some(captures) = self.pattern.captures(&text[heading.start()..]) else {
            return Ok(None);
        };
        Ok(non_empty(required_capture(&captures, self.name())?))
    }
}

/// Text between RUBRIC ANALYSIS and the score or verdict section.
pub struct RubricSection {
    style: MarkerStyle,
    pattern: Regex,
}

impl RubricSection {
    pub fn new(style: MarkerStyle) -> Result<Self> {
        let pattern = Regex::new(&format!(
            r"(?s){}[ \t]*\**[ \t]*:?(.*?)(?:{}|{}|\z)",
            section_marker(&["RUBRIC", "ANALYSIS"], style),
            section_marker(&["SCORE", "CALCULATION"], style),
            section_marker(&["FINAL", "SENTIMENT"], style),
        ))
        .context("failed to compile rubric analysis regex")?;
        Ok(Self { style, pattern })
    }
}

impl FieldMatcher<String> for RubricSection {
    fn name(&self) -> &'static str {
        match self.style {
            MarkerStyle::Template => "rubric-section",
            MarkerStyle::AnyCase => "rubric-section-any-case",
        }
    }

    fn find(&self, text: &str) -> Result<Option<String>, ExtractionError> {
        let Some(captures) = self.pattern.captures(text) else {
            return Ok(None);
        };
        Ok(non_empty(required_capture(&captures, self.name())?))
    }
}

fn non_empty(value: &str) -> Option<String> {
    let trimmed = value.trim_matches(|c: char| c.is_whitespace() || c == '*');
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
