use std::io::{self, Write};

use anyhow::{Context, Result};

use crate::cli::RubricArgs;
use crate::rubric::RUBRIC;

pub fn run(args: RubricArgs) -> Result<()> {
    let mut output = io::BufWriter::new(io::stdout().lock());

    if args.json {
        serde_json::to_writer_pretty(&mut output, &RUBRIC)
            .context("failed to serialize rubric json output")?;
        writeln!(output)?;
    } else {
        for criterion in &RUBRIC {
            writeln!(
                output,
                "{:>+5.1}\t{}\t{}",
                criterion.weight, criterion.name, criterion.description
            )?;
        }
    }

    output.flush()?;
    Ok(())
}
