use std::io::{self, Write};

use anyhow::{Context, Result};
use tracing::info;

use crate::cli::RawArgs;
use crate::commands::build_analyzer;
use crate::util::read_review;

pub fn run(args: RawArgs) -> Result<()> {
    let review = read_review(&args.source)?;
    let analyzer = build_analyzer(&args.engine)?;

    let raw = analyzer.analyze_raw(&review);
    info!(raw_len = raw.len(), "engine reply received");

    let mut output = io::BufWriter::new(io::stdout().lock());
    writeln!(output, "{raw}").context("failed to write raw reply")?;
    output.flush()?;
    Ok(())
}
