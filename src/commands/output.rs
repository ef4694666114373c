use std::io::{self, Write};

use anyhow::{Context, Result};

use crate::cli::OutputFormat;
use crate::model::StructuredResult;

pub fn write_result(result: &StructuredResult, format: OutputFormat, verbose: bool) -> Result<()> {
    let mut output = io::BufWriter::new(io::stdout().lock());
    match format {
        OutputFormat::Json => write_json_result(&mut output, result, verbose)?,
        OutputFormat::Text => write_text_result(&mut output, result, verbose)?,
    }
    output.flush()?;
    Ok(())
}

fn write_json_result<W: Write>(
    output: &mut W,
    result: &StructuredResult,
    verbose: bool,
) -> Result<()> {
    let result = if verbose {
        result.clone()
    } else {
        result.clone().without_raw_response()
    };
    serde_json::to_writer_pretty(&mut *output, &result)
        .context("failed to serialize result json output")?;
    writeln!(output)?;
    Ok(())
}

pub(super) fn write_text_result<W: Write>(
    output: &mut W,
    result: &StructuredResult,
    verbose: bool,
) -> Result<()> {
    if !result.success {
        let error = result.error.as_deref().unwrap_or("unknown error");
        writeln!(output, "Error: {error}")?;
        return Ok(());
    }

    if let Some(sentiment) = result.sentiment {
        writeln!(output, "Sentiment: {sentiment}")?;
    }
    if let Some(score) = result.score {
        writeln!(output, "Score: {score:?}")?;
    }
    if let Some(reasoning) = &result.reasoning {
        writeln!(output, "Reasoning: {reasoning}")?;
    }

    if verbose {
        writeln!(output, "\nRubric Analysis:")?;
        let rubric_analysis = result.rubric_analysis.as_deref().unwrap_or("(none)");
        writeln!(output, "{rubric_analysis}")?;
        writeln!(output, "\nRaw Result:")?;
        writeln!(output, "{}", result.raw_response.as_deref().unwrap_or(""))?;
    }
    Ok(())
}
