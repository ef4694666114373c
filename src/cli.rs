use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::engine::{
    DEFAULT_BASE_URL, DEFAULT_MAX_TOKENS, DEFAULT_MODEL, DEFAULT_TEMPERATURE, DEFAULT_TIMEOUT_SECS,
};

#[derive(Parser, Debug)]
#[command(
    name = "review-sentiment",
    version,
    about = "Rubric-guided POSITIVE/NEGATIVE classification of product and service reviews"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Classify a review and print the structured result.
    Analyze(AnalyzeArgs),
    /// Print the engine's reply without structured extraction.
    Raw(RawArgs),
    /// Run extraction over a saved engine reply; no network access.
    Extract(ExtractArgs),
    /// Analyze reviews typed one per line until `quit`.
    Interactive(InteractiveArgs),
    /// Print the prompt that would be sent for a review.
    Prompt(PromptArgs),
    /// List the weighted rubric.
    Rubric(RubricArgs),
}

#[derive(Args, Debug, Clone)]
pub struct ReviewSource {
    /// Review text; read from --file or stdin when omitted.
    pub review: Option<String>,

    #[arg(long, short, conflicts_with = "review")]
    pub file: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
pub struct EngineArgs {
    #[arg(long, env = "GROQ_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    #[arg(long, env = "REVIEW_SENTIMENT_BASE_URL", default_value = DEFAULT_BASE_URL)]
    pub base_url: String,

    #[arg(long, env = "REVIEW_SENTIMENT_MODEL", default_value = DEFAULT_MODEL)]
    pub model: String,

    #[arg(long, default_value_t = DEFAULT_TEMPERATURE)]
    pub temperature: f32,

    #[arg(long, default_value_t = DEFAULT_MAX_TOKENS)]
    pub max_tokens: u32,

    #[arg(long, default_value_t = DEFAULT_TIMEOUT_SECS)]
    pub timeout_secs: u64,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Args, Debug, Clone)]
pub struct AnalyzeArgs {
    #[command(flatten)]
    pub source: ReviewSource,

    #[command(flatten)]
    pub engine: EngineArgs,

    #[arg(long, short, value_enum, default_value_t = OutputFormat::Text)]
    pub output: OutputFormat,

    /// Include rubric analysis and the raw engine reply.
    #[arg(long, short, default_value_t = false)]
    pub verbose: bool,

    #[arg(long)]
    pub report_path: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
pub struct RawArgs {
    #[command(flatten)]
    pub source: ReviewSource,

    #[command(flatten)]
    pub engine: EngineArgs,
}

#[derive(Args, Debug, Clone)]
pub struct ExtractArgs {
    /// Saved engine reply; `-` reads stdin.
    #[arg(long, short)]
    pub file: PathBuf,

    #[arg(long, short, value_enum, default_value_t = OutputFormat::Text)]
    pub output: OutputFormat,

    #[arg(long, short, default_value_t = false)]
    pub verbose: bool,
}

#[derive(Args, Debug, Clone)]
pub struct InteractiveArgs {
    #[command(flatten)]
    pub engine: EngineArgs,
}

#[derive(Args, Debug, Clone)]
pub struct PromptArgs {
    #[command(flatten)]
    pub source: ReviewSource,

    #[arg(long, default_value_t = false)]
    pub fingerprint_only: bool,
}

#[derive(Args, Debug, Clone)]
pub struct RubricArgs {
    #[arg(long, default_value_t = false)]
    pub json: bool,
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn command_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn analyze_accepts_file_and_json_output() {
        let cli = Cli::try_parse_from([
            "review-sentiment",
            "analyze",
            "--file",
            "review.txt",
            "--output",
            "json",
            "--verbose",
            "--api-key",
            "test-key",
        ])
        .unwrap();

        let Commands::Analyze(args) = cli.command else {
            panic!("expected analyze");
        };
        assert_eq!(args.source.file, Some(PathBuf::from("review.txt")));
        assert_eq!(args.source.review, None);
        assert_eq!(args.output, OutputFormat::Json);
        assert!(args.verbose);
        assert_eq!(args.engine.api_key.as_deref(), Some("test-key"));
        assert_eq!(args.engine.max_tokens, 1024);
    }

    #[test]
    fn interactive_takes_engine_flags_only() {
        let cli = Cli::try_parse_from([
            "review-sentiment",
            "interactive",
            "--model",
            "llama-3.1-8b-instant",
        ])
        .unwrap();

        let Commands::Interactive(args) = cli.command else {
            panic!("expected interactive");
        };
        assert_eq!(args.engine.model, "llama-3.1-8b-instant");

        let parsed = Cli::try_parse_from(["review-sentiment", "interactive", "Great stuff"]);
        assert!(parsed.is_err());
    }

    #[test]
    fn review_text_and_file_are_mutually_exclusive() {
        let parsed = Cli::try_parse_from([
            "review-sentiment",
            "prompt",
            "Great stuff",
            "--file",
            "review.txt",
        ]);
        assert!(parsed.is_err());
    }
}
