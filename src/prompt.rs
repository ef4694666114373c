use std::fmt::Write as _;

use sha2::{Digest, Sha256};

use crate::rubric::RUBRIC;

pub const SYSTEM_INSTRUCTION: &str = "You are an objective sentiment analysis assistant. \
Analyze the review based on the provided rubric and determine if it's positive or negative. \
Always provide a clear POSITIVE or NEGATIVE determination, even for short or ambiguous reviews.";

const SCORING_INSTRUCTIONS: &str = "
After completing the rubric, calculate the weighted sentiment score as follows:
1. For each criterion marked YES, add its associated weight to the score
2. Sum all weights to get a final score

Based on the final score:
- If score > 0: Label as POSITIVE and explain why
- If score < 0: Label as NEGATIVE and explain why
- If score = 0: Analyze the intensity and specificity of positive vs negative elements to make a determination

IMPORTANT: Even for very short or ambiguous reviews, you MUST make a definitive POSITIVE or NEGATIVE determination. \
For neutral or ambiguous reviews, consider subtle cues or default to slightly positive if truly neutral.

Format your response as:
RUBRIC ANALYSIS:
[Analysis of each criterion with YES/NO and brief explanation]

SCORE CALCULATION:
[Show your calculation with weights]

FINAL SENTIMENT: [POSITIVE/NEGATIVE]
REASONING: [Objective explanation based on the evidence]
";

/// Renders the instruction document sent as the user message.
///
/// The output depends only on `review_text` and [`RUBRIC`], so identical reviews
/// always produce byte-identical prompts.
pub fn compose_prompt(review_text: &str) -> String {
    let mut prompt = String::with_capacity(2048 + review_text.len());

    prompt.push_str("\nPlease analyze the following review for sentiment:\n\n");
    let _ = writeln!(prompt, "\"{review_text}\"");
    prompt.push_str(
        "\nFor each criterion in the rubric below, respond with YES or NO, \
         and provide a brief explanation with specific evidence from the text:\n\n",
    );

    for criterion in &RUBRIC {
        let _ = writeln!(
            prompt,
            "- {} (Weight: {}): {}",
            criterion.name, criterion.weight, criterion.description
        );
    }

    prompt.push_str(SCORING_INSTRUCTIONS);
    prompt
}

pub fn prompt_fingerprint(prompt: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(prompt.as_bytes());
    format!("{:x}", hasher.finalize())
}
