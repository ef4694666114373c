use std::fs::{self, File};
use std::io::{self, IsTerminal, Read, Write};
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{SecondsFormat, Utc};
use serde::Serialize;

use crate::cli::ReviewSource;

pub fn now_utc_string() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)
}

pub fn ensure_directory(path: &Path) -> Result<()> {
    fs::create_dir_all(path)
        .with_context(|| format!("failed to create directory: {}", path.display()))
}

pub fn write_json_pretty<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        ensure_directory(parent)?;
    }

    let data = serde_json::to_vec_pretty(value)
        .with_context(|| format!("failed to serialize json: {}", path.display()))?;

    let mut file = File::create(path)
        .with_context(|| format!("failed to create json file: {}", path.display()))?;
    file.write_all(&data)
        .with_context(|| format!("failed to write json file: {}", path.display()))?;
    file.write_all(b"\n")
        .with_context(|| format!("failed to finalize json file: {}", path.display()))?;

    Ok(())
}

/// Text from `path`, or stdin when `path` is `-`.
pub fn read_text_input(path: &Path) -> Result<String> {
    if path.as_os_str() == "-" {
        return read_stdin(None);
    }
    fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}

/// Review from the positional argument, `--file`, or stdin, in that order.
pub fn read_review(source: &ReviewSource) -> Result<String> {
    if let Some(review) = &source.review {
        return Ok(review.clone());
    }
    if let Some(path) = &source.file {
        return read_text_input(path);
    }
    read_stdin(Some("Enter the review text, then press Ctrl-D:"))
}

fn read_stdin(interactive_prompt: Option<&str>) -> Result<String> {
    let mut stdin = io::stdin();
    if let Some(prompt) = interactive_prompt.filter(|_| stdin.is_terminal()) {
        eprintln!("{prompt}");
    }

    let mut buffer = String::new();
    stdin
        .read_to_string(&mut buffer)
        .context("failed to read stdin")?;
    Ok(buffer)
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    #[test]
    fn positional_review_wins() {
        let source = ReviewSource {
            review: Some("Loved it".to_string()),
            file: None,
        };
        assert_eq!(read_review(&source).unwrap(), "Loved it");
    }

    #[test]
    fn review_file_is_read_verbatim() {
        let path = std::env::temp_dir()
            .join(format!("review-sentiment-{}.txt", std::process::id()));
        fs::write(&path, "  Slow shipping.\n").unwrap();

        let source = ReviewSource {
            review: None,
            file: Some(path.clone()),
        };
        assert_eq!(read_review(&source).unwrap(), "  Slow shipping.\n");

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn missing_file_reports_path() {
        let err = read_text_input(&PathBuf::from("/definitely/not/here.txt")).unwrap_err();
        assert!(err.to_string().contains("/definitely/not/here.txt"));
    }

    #[test]
    fn json_report_creates_parent_directories() {
        let dir = std::env::temp_dir()
            .join(format!("review-sentiment-report-{}", std::process::id()));
        let path = dir.join("nested").join("report.json");

        write_json_pretty(&path, &serde_json::json!({ "ok": true })).unwrap();
        let written = fs::read_to_string(&path).unwrap();
        assert!(written.ends_with("}\n"));

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn timestamps_are_rfc3339_utc() {
        let stamp = now_utc_string();
        assert!(stamp.ends_with('Z'));
        assert!(chrono::DateTime::parse_from_rfc3339(&stamp).is_ok());
    }
}
