//! Conversion of raw entries into validated, chronologically ordered events.

use std::fmt;
use std::sync::LazyLock;

use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta};
use regex::{Captures, Regex};
use serde::{Serialize, Serializer};
use thiserror::Error;

use crate::extract::RawEntry;
use crate::types::{DutyStatus, Event, Location, UnknownStatus, ValidationError};

/// `6:44am`, `6:44 PM`, `18:05`, `05:53:07 am`.
static BARE_TIME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s*([0-9]{1,2}):([0-9]{2})(?::([0-9]{2}))?\s*([ap]m)?\s*$").unwrap()
});

/// `Dec 01, 05:53:07 am`.
static COMBINED_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^\s*([a-z]{3})\s+([0-9]{1,2}),\s*([0-9]{1,2}):([0-9]{2}):([0-9]{2})\s*([ap]m)\s*$",
    )
    .unwrap()
});

static DATE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*([0-9]{1,2})/([0-9]{1,2})/([0-9]{4})\s*$").unwrap());

/// `(landmark) place, ST, US[, trailing note]`. Text after `US` that is not
/// introduced by a comma is ignored.
static LOCATION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\(([^)]*)\)\s*(.*?),\s*([A-Z]{2}),\s*US\b(?:\s*,\s*(.*))?").unwrap()
});

/// Why a single entry could not become an [`Event`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// The text matches neither supported timestamp layout.
    #[error("unrecognized timestamp: {text:?}")]
    UnrecognizedTimestamp { text: String },

    /// The timestamp needs a date context and the entry has none.
    #[error("no date context for timestamp: {text:?}")]
    MissingDate { text: String },

    /// The date context is not a real calendar date.
    #[error("invalid date: {text:?}")]
    InvalidDate { text: String },

    #[error(transparent)]
    UnknownStatus(#[from] UnknownStatus),

    #[error(transparent)]
    Invalid(#[from] ValidationError),
}

/// A parse failure attributed to its source line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParseIssue {
    pub page: usize,
    pub line: usize,
    #[serde(serialize_with = "serialize_display")]
    pub error: ParseError,
}

impl fmt::Display for ParseIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "page {}, line {}: {}", self.page, self.line, self.error)
    }
}

fn serialize_display<T: fmt::Display, S: Serializer>(
    value: &T,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.collect_str(value)
}

/// Events that parsed, in chronological order, plus the entries that did not.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Normalized {
    pub events: Vec<Event>,
    pub issues: Vec<ParseIssue>,
}

fn unrecognized(text: &str) -> ParseError {
    ParseError::UnrecognizedTimestamp {
        text: text.to_string(),
    }
}

/// Parses a `M/D/YYYY` date context.
pub fn parse_date(text: &str) -> Result<NaiveDate, ParseError> {
    let invalid = || ParseError::InvalidDate {
        text: text.to_string(),
    };
    let caps = DATE_RE.captures(text).ok_or_else(invalid)?;
    let month = caps[1].parse().map_err(|_| invalid())?;
    let day = caps[2].parse().map_err(|_| invalid())?;
    let year = caps[3].parse().map_err(|_| invalid())?;
    NaiveDate::from_ymd_opt(year, month, day).ok_or_else(invalid)
}

fn date_context(text: &str, date_hint: Option<&str>) -> Result<NaiveDate, ParseError> {
    let hint = date_hint
        .filter(|hint| !hint.trim().is_empty())
        .ok_or_else(|| ParseError::MissingDate {
            text: text.to_string(),
        })?;
    parse_date(hint)
}

fn capture_u32(caps: &Captures<'_>, idx: usize) -> Option<u32> {
    caps.get(idx).map_or(Some(0), |m| m.as_str().parse().ok())
}

/// Builds a wall-clock time, reading the hour on a 12-hour clock when a
/// meridiem is given and on a 24-hour clock otherwise.
fn clock_time(hour: u32, minute: u32, second: u32, meridiem: Option<&str>) -> Option<NaiveTime> {
    let hour = match meridiem.map(str::to_ascii_lowercase).as_deref() {
        None => hour,
        Some(_) if !(1..=12).contains(&hour) => return None,
        Some("pm") => hour % 12 + 12,
        Some(_) => hour % 12,
    };
    NaiveTime::from_hms_opt(hour, minute, second)
}

fn month_number(abbrev: &str) -> Option<u32> {
    let month = match abbrev.to_ascii_lowercase().as_str() {
        "jan" => 1,
        "feb" => 2,
        "mar" => 3,
        "apr" => 4,
        "may" => 5,
        "jun" => 6,
        "jul" => 7,
        "aug" => 8,
        "sep" => 9,
        "oct" => 10,
        "nov" => 11,
        "dec" => 12,
        _ => return None,
    };
    Some(month)
}

/// Parses a timestamp in one of the two supported layouts.
///
/// - A bare time (`6:44am`) is placed on the `date_hint` date.
/// - A combined string (`Dec 01, 05:53:07 am`) takes its year from `date_hint`.
pub fn parse_timestamp(text: &str, date_hint: Option<&str>) -> Result<NaiveDateTime, ParseError> {
    if let Some(caps) = BARE_TIME_RE.captures(text) {
        let date = date_context(text, date_hint)?;
        let time = match (
            capture_u32(&caps, 1),
            capture_u32(&caps, 2),
            capture_u32(&caps, 3),
        ) {
            (Some(h), Some(m), Some(s)) => clock_time(h, m, s, caps.get(4).map(|m| m.as_str())),
            _ => None,
        };
        return time
            .map(|time| date.and_time(time))
            .ok_or_else(|| unrecognized(text));
    }

    if let Some(caps) = COMBINED_RE.captures(text) {
        let year = date_context(text, date_hint)?.year();
        let month = month_number(&caps[1]).ok_or_else(|| unrecognized(text))?;
        let day = capture_u32(&caps, 2).ok_or_else(|| unrecognized(text))?;
        let date = NaiveDate::from_ymd_opt(year, month, day).ok_or_else(|| {
            ParseError::InvalidDate {
                text: text.to_string(),
            }
        })?;
        let time = match (
            capture_u32(&caps, 3),
            capture_u32(&caps, 4),
            capture_u32(&caps, 5),
        ) {
            (Some(h), Some(m), Some(s)) => clock_time(h, m, s, Some(&caps[6])),
            _ => None,
        };
        return time
            .map(|time| date.and_time(time))
            .ok_or_else(|| unrecognized(text));
    }

    Err(unrecognized(text))
}

/// Splits a location string into its structured part and trailing note.
///
/// Strings that do not contain the `(landmark) place, ST, US` shape produce no
/// location and an empty note.
pub fn parse_location(text: &str) -> (Option<Location>, String) {
    let Some(caps) = LOCATION_RE.captures(text) else {
        return (None, String::new());
    };

    let location = Location {
        landmark: caps[1].trim().to_string(),
        place: caps[2].trim().to_string(),
        state: caps[3].to_string(),
    };
    let note = caps
        .get(4)
        .map(|m| m.as_str().trim().to_string())
        .unwrap_or_default();
    (Some(location), note)
}

/// Joins the location note and the line annotation, dropping one that the
/// other already contains.
fn combine_notes(location_note: &str, annotation: &str) -> String {
    match (location_note.trim(), annotation.trim()) {
        ("", annotation) => annotation.to_string(),
        (location_note, "") => location_note.to_string(),
        (location_note, annotation) if location_note.contains(annotation) => {
            location_note.to_string()
        }
        (location_note, annotation) if annotation.contains(location_note) => {
            annotation.to_string()
        }
        (location_note, annotation) => format!("{location_note}; {annotation}"),
    }
}

/// Converts one raw entry into an event.
pub fn normalize_entry(entry: &RawEntry) -> Result<Event, ParseError> {
    let status: DutyStatus = entry.status_text.parse()?;
    let date_hint = entry.date_hint.as_deref();

    let start = parse_timestamp(&entry.start_time_text, date_hint)?;
    let end = if entry.end_time_text.trim().is_empty() {
        None
    } else {
        let mut end = parse_timestamp(&entry.end_time_text, date_hint)?;
        // A period like 11:30pm-12:15am crosses midnight
        if end < start && end.date() == start.date() {
            end += TimeDelta::days(1);
        }
        Some(end)
    };

    let (location, location_note) = parse_location(&entry.location_text);
    let event = Event::new(start, end, status)?
        .with_location(location)
        .with_note(combine_notes(&location_note, &entry.annotation_text))
        .with_vehicle_id(entry.vehicle_id.trim())
        .with_bol_number(entry.bol_number.trim())
        .with_trailer_number(entry.trailer_number.trim())
        .with_certified(entry.certified);
    Ok(event)
}

/// Normalizes every entry, keeping the failures as issues, and sorts the
/// events by start time. The sort is stable so equal start times keep input
/// order.
pub fn normalize(entries: &[RawEntry]) -> Normalized {
    let mut normalized = Normalized::default();

    for entry in entries {
        match normalize_entry(entry) {
            Ok(event) => normalized.events.push(event),
            Err(error) => {
                tracing::warn!(
                    page = entry.page,
                    line = entry.line,
                    error = %error,
                    "skipping unparseable entry"
                );
                normalized.issues.push(ParseIssue {
                    page: entry.page,
                    line: entry.line,
                    error,
                });
            }
        }
    }

    normalized.events.sort_by_key(Event::start_time);
    normalized
}
