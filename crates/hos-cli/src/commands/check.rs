//! Check command: extract, normalize and evaluate log pages.
//!
//! This module implements `hos check` with human-readable and JSON output.

use std::fmt::Write as _;
use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::Serialize;

use hos_core::{
    DutyStatus, Evaluation, HosLimits, Normalized, ParseIssue, RawEntry, Statistics, Violation,
    ViolationReport,
};

use super::util::{format_minutes, read_inputs, read_pages};

/// Outcome of checking one set of pages.
#[derive(Debug, Serialize)]
pub struct CheckOutput {
    /// Number of events that were evaluated.
    pub events: usize,
    pub statistics: Statistics,
    /// Entries that could not be turned into events.
    pub issues: Vec<ParseIssue>,
    pub violations: ViolationReport,
}

/// Evaluates already-normalized events, keeping their parse issues.
pub fn check_normalized(normalized: Normalized, limits: &HosLimits) -> Result<CheckOutput> {
    let Normalized { events, issues } = normalized;
    let Evaluation {
        statistics,
        violations,
    } = hos_core::analyze(&events, limits).context("failed to evaluate events")?;
    tracing::info!(
        events = events.len(),
        issues = issues.len(),
        violations = violations.total(),
        "checked duty log"
    );
    Ok(CheckOutput {
        events: events.len(),
        statistics,
        issues,
        violations,
    })
}

/// Checks the text of log pages.
pub fn check_pages<S: AsRef<str> + Sync>(pages: &[S], limits: &HosLimits) -> Result<CheckOutput> {
    check_normalized(hos_core::extract_and_normalize(pages), limits)
}

/// Checks pre-extracted entries.
pub fn check_entries(entries: &[RawEntry], limits: &HosLimits) -> Result<CheckOutput> {
    check_normalized(hos_core::normalize(entries), limits)
}

// ========== Formatting ==========

/// One-line summary of a violation's measurements.
fn describe(violation: &Violation) -> String {
    let mut parts = Vec::new();
    if let Some(duty_type) = violation.duty_type {
        parts.push(duty_type.to_string());
    }
    if let Some(minutes) = violation.duration_minutes {
        parts.push(format_minutes(minutes));
    }
    if let Some(required) = violation.required_minutes {
        parts.push(format!("{} required", format_minutes(required)));
    }
    if let Some(total) = violation.total_hours {
        parts.push(format!("total {total:.1}h"));
    }
    if let Some(note) = &violation.note {
        parts.push(format!("note \"{note}\""));
    }
    parts.join(", ")
}

/// Event counts in duty-status order, e.g. "DRIVING 1, ON_DUTY 3".
fn format_counts(statistics: &Statistics) -> String {
    DutyStatus::ALL
        .iter()
        .map(|status| format!("{status} {}", statistics.count(*status)))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Formats the human-readable report output.
pub fn format_report(output: &CheckOutput) -> String {
    let mut report = String::new();

    writeln!(report, "HOS CHECK").unwrap();
    writeln!(report, "Events:     {}", output.events).unwrap();
    writeln!(report, "Violations: {}", output.violations.total()).unwrap();
    writeln!(
        report,
        "Driving:    {}",
        format_minutes(output.statistics.total_driving_hours * 60.0)
    )
    .unwrap();
    writeln!(
        report,
        "On duty:    {}",
        format_minutes(output.statistics.total_on_duty_hours * 60.0)
    )
    .unwrap();
    writeln!(report, "By status:  {}", format_counts(&output.statistics)).unwrap();

    if output.violations.is_empty() {
        writeln!(report).unwrap();
        writeln!(report, "No violations found.").unwrap();
    }

    for (category, violations) in output.violations.iter() {
        if violations.is_empty() {
            continue;
        }
        writeln!(report).unwrap();
        writeln!(report, "{} ({})", category.title(), violations.len()).unwrap();
        for violation in violations {
            let location = violation
                .location
                .as_ref()
                .map_or_else(|| "unknown location".to_string(), ToString::to_string);
            writeln!(
                report,
                "  #{} {} {}: {}",
                violation.event_index,
                violation.timestamp.format("%Y-%m-%d %H:%M"),
                location,
                describe(violation)
            )
            .unwrap();
        }
    }

    if !output.issues.is_empty() {
        writeln!(report).unwrap();
        writeln!(report, "PARSE ISSUES ({})", output.issues.len()).unwrap();
        for issue in &output.issues {
            writeln!(report, "  {issue}").unwrap();
        }
    }

    report
}

/// Formats the report as pretty-printed JSON.
pub fn format_report_json(output: &CheckOutput) -> Result<String> {
    serde_json::to_string_pretty(output).context("failed to serialize report")
}

/// Writes the report in the requested format.
pub fn write_report<W: Write>(writer: &mut W, output: &CheckOutput, json: bool) -> Result<()> {
    if json {
        writeln!(writer, "{}", format_report_json(output)?)?;
    } else {
        write!(writer, "{}", format_report(output))?;
    }
    Ok(())
}

// ========== Public Interface ==========

/// Runs the check command.
pub fn run<W: Write>(
    writer: &mut W,
    files: &[PathBuf],
    entries: bool,
    json: bool,
    limits: &HosLimits,
) -> Result<()> {
    let output = if entries {
        let mut raw = Vec::new();
        for input in read_inputs(files)? {
            let parsed: Vec<RawEntry> =
                serde_json::from_str(&input).context("failed to parse entries")?;
            raw.extend(parsed);
        }
        check_entries(&raw, limits)?
    } else {
        let pages = read_pages(files)?;
        check_pages(&pages, limits)?
    };

    write_report(writer, &output, json)
}

#[cfg(test)]
mod tests {
    use super::*;
    use insta::assert_snapshot;

    const LOG: &str = "\
DRIVER'S DAILY LOG
1/15/2024
5:00am 5:10am ON DUTY (Pilot #412) Dallas, TX, US, pti
5:10am 4:40pm DRIVING (Pilot #412) Dallas, TX, US
4:40pm 5:10pm ON DUTY (Acme DC) Austin, TX, US
5:10pm 5:25pm ON DUTY (Acme DC) Austin, TX, US | Remark: unloading
5:25pm 5:25pm OFF DUTY
25:00 6:00pm DRIVING
";

    fn check(pages: &[&str]) -> CheckOutput {
        check_pages(pages, &HosLimits::default()).unwrap()
    }

    // ========== Check Tests ==========

    #[test]
    fn test_check_collects_violations_and_issues() {
        let output = check(&[LOG]);
        assert_eq!(output.events, 5);
        assert_eq!(output.issues.len(), 1);
        assert_eq!(output.violations.total(), 4);
    }

    #[test]
    fn test_check_keeps_final_totals() {
        let output = check(&[LOG]);
        assert!((output.statistics.total_driving_hours - 11.5).abs() < f64::EPSILON);
        assert_eq!(output.statistics.count(DutyStatus::OnDuty), 3);
        assert_eq!(output.statistics.count(DutyStatus::Sleeper), 0);
        assert_eq!(
            format_counts(&output.statistics),
            "DRIVING 1, ON_DUTY 3, OFF_DUTY 1, SLEEPER 0"
        );
    }

    #[test]
    fn test_check_uses_configured_limits() {
        let limits = HosLimits {
            driving_hours: 12.0,
            pti_minutes: 5.0,
            ..HosLimits::default()
        };
        let output = check_pages(&[LOG], &limits).unwrap();
        assert_eq!(output.violations.total(), 2);
    }

    #[test]
    fn test_check_entries_skips_extraction() {
        let entries: Vec<RawEntry> = serde_json::from_str(
            r#"[{"page": 1, "line": 4, "date_hint": "1/15/2024",
                 "start_time_text": "8:00am", "end_time_text": "8:05am",
                 "status_text": "ON DUTY", "location_text": "(Yard) Tulsa, OK, US, pretrip"}]"#,
        )
        .unwrap();
        let output = check_entries(&entries, &HosLimits::default()).unwrap();
        assert_eq!(output.events, 1);
        assert_eq!(output.violations.total(), 1);
    }

    #[test]
    fn test_invalid_limits_fail_the_check() {
        let limits = HosLimits {
            cycle_days: 0,
            ..HosLimits::default()
        };
        let err = check_pages(&[LOG], &limits).unwrap_err();
        assert_eq!(err.to_string(), "failed to evaluate events");
    }

    // ========== Formatting Tests ==========

    #[test]
    fn test_report_with_violations() {
        let output = format_report(&check(&[LOG]));
        assert_snapshot!(output);
    }

    #[test]
    fn test_report_without_violations() {
        let page = "1/15/2024\n6:00am 6:20am ON DUTY | Remark: pre-trip inspection\n";
        let output = format_report(&check(&[page]));
        assert_snapshot!(output);
    }

    #[test]
    fn test_report_json_keeps_every_bucket() {
        let json = format_report_json(&check(&[LOG])).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["events"], 5);
        assert_eq!(value["statistics"]["total_driving_hours"], 11.5);
        assert_eq!(
            value["statistics"]["event_counts"],
            serde_json::json!({"DRIVING": 1, "ON_DUTY": 3, "OFF_DUTY": 1, "SLEEPER": 0})
        );
        assert_eq!(value["violations"].as_object().unwrap().len(), 7);
        assert_eq!(
            value["violations"]["off_duty_violations"],
            serde_json::json!([])
        );

        let driving = &value["violations"]["driving_limit_violations"][0];
        assert_eq!(driving["event_index"], 1);
        assert_eq!(driving["timestamp"], "2024-01-15T05:10:00");
        assert_eq!(driving["total_hours"], 11.5);
        assert_eq!(driving["location"]["place"], "Dallas");

        assert_eq!(
            value["issues"][0]["error"],
            "unrecognized timestamp: \"25:00\""
        );
        assert_eq!(value["issues"][0]["line"], 8);
    }

    #[test]
    fn test_describe_lists_only_present_measurements() {
        let output = check(&[LOG]);
        let loading = &output
            .violations
            .get(hos_core::ViolationCategory::LoadingDuration)[0];
        assert_eq!(
            describe(loading),
            "delivery, 15m, 17m required, note \"unloading\""
        );
    }
}
