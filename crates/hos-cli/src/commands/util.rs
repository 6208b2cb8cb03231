//! Shared utilities for CLI commands.

use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

/// Page separator emitted by PDF-to-text converters.
const FORM_FEED: char = '\u{c}';

/// Reads a file, or stdin when `path` is `None`.
pub fn read_input(path: Option<&Path>) -> Result<String> {
    match path {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display())),
        None => {
            let mut input = String::new();
            std::io::stdin()
                .read_to_string(&mut input)
                .context("failed to read stdin")?;
            Ok(input)
        }
    }
}

/// Reads every file (or stdin) as one input each, in argument order.
pub fn read_inputs(files: &[PathBuf]) -> Result<Vec<String>> {
    if files.is_empty() {
        return Ok(vec![read_input(None)?]);
    }
    files.iter().map(|path| read_input(Some(path))).collect()
}

/// Splits document text into pages on form feeds.
///
/// A trailing form feed does not start another page.
pub fn split_pages(text: &str) -> Vec<&str> {
    let mut pages: Vec<&str> = text.split(FORM_FEED).collect();
    if pages.len() > 1 && pages.last().is_some_and(|page| page.trim().is_empty()) {
        pages.pop();
    }
    pages
}

/// Reads the pages of every file (or stdin), numbered across files.
pub fn read_pages(files: &[PathBuf]) -> Result<Vec<String>> {
    let pages: Vec<String> = read_inputs(files)?
        .iter()
        .flat_map(|text| split_pages(text).into_iter().map(str::to_string))
        .collect();
    tracing::debug!(files = files.len(), pages = pages.len(), "read pages");
    Ok(pages)
}

/// Formats a length in minutes as e.g. "2h 30m" or "45m".
#[expect(
    clippy::cast_possible_truncation,
    reason = "rounded minutes of a duty log fit in i64"
)]
pub fn format_minutes(minutes: f64) -> String {
    let total_minutes = minutes.round() as i64;
    if total_minutes < 0 {
        return "0m".to_string();
    }
    let hours = total_minutes / 60;
    let minutes = total_minutes % 60;

    if hours >= 1 {
        format!("{hours}h {minutes}m")
    } else {
        format!("{minutes}m")
    }
}
