use anyhow::{Result, bail};
use tracing::info;

use crate::cli::ExtractArgs;
use crate::commands::output;
use crate::extract::Extractor;
use crate::util::read_text_input;

pub fn run(args: ExtractArgs) -> Result<()> {
    let raw = read_text_input(&args.file)?;
    info!(path = %args.file.display(), raw_len = raw.len(), "extracting saved reply");

    let extractor = Extractor::new()?;
    let result = extractor.extract_saved(&raw);
    output::write_result(&result, args.output, args.verbose)?;

    if !result.success {
        bail!("extraction did not produce a sentiment");
    }
    Ok(())
}
