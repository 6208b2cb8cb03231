//! Core logic for checking ELD duty logs against Hours-of-Service rules.
//!
//! This crate contains:
//! - Extraction: turning page text into raw duty-status entries
//! - Normalization: typed, chronologically ordered events
//! - Classification: on-duty sub-activities from free-text notes
//! - Rules: cumulative HOS limits and on-duty activity minimums

mod activity;
pub mod duty_type;
pub mod extract;
mod hours;
pub mod normalize;
mod rules;
mod statistics;
pub mod types;
pub mod violation;

pub use activity::check_on_duty_activities;
pub use duty_type::DutyType;
pub use extract::{RawEntry, extract_page, extract_pages};
pub use hours::{HoursCheck, HoursTally, check_hours_of_service};
pub use normalize::{Normalized, ParseError, ParseIssue, normalize};
pub use rules::{
    Evaluation, EvaluationError, HosLimits, Pass, RuleError, analyze, evaluate, evaluate_json,
    parse_events_json,
};
pub use statistics::Statistics;
pub use types::{DutyStatus, Event, Location, ValidationError};
pub use violation::{Violation, ViolationCategory, ViolationReport};

/// Extracts and normalizes the text of every page of one document.
///
/// Pages are extracted in parallel; entries are concatenated in page order
/// before the stable chronological sort.
pub fn extract_and_normalize<S: AsRef<str> + Sync>(pages: &[S]) -> Normalized {
    let entries = extract_pages(pages);
    let normalized = normalize(&entries);
    tracing::debug!(
        pages = pages.len(),
        entries = entries.len(),
        events = normalized.events.len(),
        issues = normalized.issues.len(),
        "normalized document"
    );
    normalized
}
