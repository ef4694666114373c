use anyhow::{Result, bail};
use tracing::info;

use crate::analyzer::validate_review;
use crate::cli::AnalyzeArgs;
use crate::commands::{build_analyzer, output};
use crate::model::AnalysisReport;
use crate::prompt::{compose_prompt, prompt_fingerprint};
use crate::util::{now_utc_string, read_review, write_json_pretty};

pub fn run(args: AnalyzeArgs) -> Result<()> {
    let review = read_review(&args.source)?;
    let analyzer = build_analyzer(&args.engine)?;

    info!(
        model = %args.engine.model,
        review_chars = review.chars().count(),
        "analyzing review"
    );
    let result = analyzer.analyze(&review);

    if let Some(report_path) = &args.report_path {
        let report = AnalysisReport {
            analyzed_at: now_utc_string(),
            model: analyzer.model().map(str::to_string),
            prompt_sha256: validate_review(&review)
                .then(|| prompt_fingerprint(&compose_prompt(&review))),
            result: result.clone(),
        };
        write_json_pretty(report_path, &report)?;
        info!(path = %report_path.display(), "wrote analysis report");
    }

    output::write_result(&result, args.output, args.verbose)?;

    if !result.success {
        bail!("analysis did not produce a sentiment");
    }
    Ok(())
}
