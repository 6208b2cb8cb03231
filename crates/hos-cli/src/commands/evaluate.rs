//! Evaluate command: check a JSON array of events.

use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use hos_core::{Evaluation, HosLimits};

use super::check::{CheckOutput, write_report};
use super::util::read_input;

/// Evaluates the events in `input` against `limits`.
pub fn evaluate_input(input: &str, limits: &HosLimits) -> Result<CheckOutput> {
    let events = hos_core::parse_events_json(input).context("failed to read events")?;
    let Evaluation {
        statistics,
        violations,
    } = hos_core::analyze(&events, limits).context("failed to evaluate events")?;
    tracing::info!(
        events = events.len(),
        violations = violations.total(),
        "evaluated events"
    );
    Ok(CheckOutput {
        events: events.len(),
        statistics,
        issues: Vec::new(),
        violations,
    })
}

/// Runs the evaluate command.
pub fn run<W: Write>(
    writer: &mut W,
    file: Option<&Path>,
    json: bool,
    limits: &HosLimits,
) -> Result<()> {
    let input = read_input(file)?;
    let output = evaluate_input(&input, limits)?;
    write_report(writer, &output, json)
}
