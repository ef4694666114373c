use std::time::Duration;

use anyhow::Result;

use crate::analyzer::Analyzer;
use crate::cli::EngineArgs;
use crate::engine::{ChatCompletionsEngine, EngineConfig, SamplingParams};

pub mod analyze;
pub mod extract;
pub mod interactive;
pub mod output;
pub mod prompt;
pub mod raw;
pub mod rubric;

fn build_analyzer(args: &EngineArgs) -> Result<Analyzer<ChatCompletionsEngine>> {
    let engine = ChatCompletionsEngine::new(EngineConfig {
        api_key: args.api_key.clone(),
        base_url: args.base_url.clone(),
        model: args.model.clone(),
        timeout: Duration::from_secs(args.timeout_secs.max(1)),
    })?;
    let sampling = SamplingParams {
        temperature: args.temperature,
        max_tokens: args.max_tokens.max(1),
    };
    Analyzer::new(engine, sampling)
}
