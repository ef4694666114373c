use std::io::{self, Write};

use anyhow::Result;
use tracing::{info, warn};

use crate::analyzer::validate_review;
use crate::cli::PromptArgs;
use crate::prompt::{compose_prompt, prompt_fingerprint};
use crate::util::read_review;

pub fn run(args: PromptArgs) -> Result<()> {
    let review = read_review(&args.source)?;
    if !validate_review(&review) {
        warn!("review is empty; analyze would reject it before composing a prompt");
    }

    let prompt = compose_prompt(&review);
    let fingerprint = prompt_fingerprint(&prompt);

    let mut output = io::BufWriter::new(io::stdout().lock());
    if args.fingerprint_only {
        writeln!(output, "{fingerprint}")?;
    } else {
        write!(output, "{prompt}")?;
        info!(prompt_sha256 = %fingerprint, prompt_len = prompt.len(), "composed prompt");
    }
    output.flush()?;
    Ok(())
}
