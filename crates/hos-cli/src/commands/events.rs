//! Events command: print normalized events as JSON lines.

use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};

use super::util::read_pages;

/// Writes each normalized event as one line of JSON, in chronological order.
///
/// Parse issues go to the log, not the output.
pub fn run<W: Write>(writer: &mut W, files: &[PathBuf]) -> Result<()> {
    let pages = read_pages(files)?;
    let normalized = hos_core::extract_and_normalize(&pages);

    for event in &normalized.events {
        let line = serde_json::to_string(event).context("failed to serialize event")?;
        writeln!(writer, "{line}")?;
    }

    tracing::info!(
        events = normalized.events.len(),
        issues = normalized.issues.len(),
        "wrote events"
    );
    Ok(())
}
