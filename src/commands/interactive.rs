use std::io::{self, BufRead, Write};

use anyhow::{Context, Result};
use tracing::info;

use crate::analyzer::Analyzer;
use crate::cli::InteractiveArgs;
use crate::commands::{build_analyzer, output};
use crate::engine::ReasoningEngine;

const QUIT_WORDS: [&str; 2] = ["quit", "exit"];

pub fn run(args: InteractiveArgs) -> Result<()> {
    let analyzer = build_analyzer(&args.engine)?;
    info!(model = %args.engine.model, "starting interactive session");

    let stdin = io::stdin();
    let mut input = stdin.lock();
    let mut output = io::stdout().lock();
    let reviews = run_session(&analyzer, &mut input, &mut output)?;

    info!(reviews, "interactive session ended");
    Ok(())
}

/// Reads one review per line until a quit word or end of input.
///
/// Returns how many reviews were submitted, blank ones included.
pub fn run_session<E, R, W>(analyzer: &Analyzer<E>, input: &mut R, output: &mut W) -> Result<usize>
where
    E: ReasoningEngine,
    R: BufRead,
    W: Write,
{
    writeln!(output, "Review sentiment analyzer")?;
    writeln!(output, "Enter a review to analyze (or 'quit' to exit):")?;

    let mut reviews = 0;
    loop {
        write!(output, "\nReview: ")?;
        output.flush()?;
        let Some(review) = read_line(input)? else {
            break;
        };
        if QUIT_WORDS
            .iter()
            .any(|word| review.trim().eq_ignore_ascii_case(word))
        {
            break;
        }

        reviews += 1;
        let result = analyzer.analyze(&review);
        if !result.success {
            writeln!(output)?;
            output::write_text_result(output, &result, false)?;
            continue;
        }

        writeln!(output, "\n=== Analysis Result ===")?;
        output::write_text_result(output, &result, false)?;

        if ask_yes_no(input, output, "Show the detailed rubric analysis?")? {
            writeln!(output, "\n=== Rubric Analysis ===")?;
            writeln!(
                output,
                "{}",
                result.rubric_analysis.as_deref().unwrap_or("(none)")
            )?;
        }
        if ask_yes_no(input, output, "Show the raw engine reply?")? {
            writeln!(output, "\n=== Raw Result ===")?;
            writeln!(output, "{}", result.raw_response.as_deref().unwrap_or(""))?;
        }
    }

    writeln!(output)?;
    output.flush()?;
    Ok(reviews)
}

fn read_line<R: BufRead>(input: &mut R) -> Result<Option<String>> {
    let mut line = String::new();
    let read = input
        .read_line(&mut line)
        .context("failed to read interactive input")?;
    if read == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
}

fn ask_yes_no<R: BufRead, W: Write>(input: &mut R, output: &mut W, question: &str) -> Result<bool> {
    write!(output, "\n{question} (y/n) ")?;
    output.flush()?;
    let answer = read_line(input)?.unwrap_or_default();
    Ok(matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes"))
}
