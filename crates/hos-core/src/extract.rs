//! Record extraction from the plain text of ELD log pages.
//!
//! Each page is scanned line by line. Date lines set the date context for the
//! lines that follow them on the same page; lines carrying both a time and a
//! duty status become [`RawEntry`] values. Everything else is page furniture
//! and is skipped.

use std::sync::LazyLock;

use rayon::prelude::*;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Pre-compiled pattern for `D/D/YYYY` date lines.
static DATE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(\d{1,2}/\d{1,2}/\d{4})\b").unwrap());

/// `H:MM` with an optional `am`/`pm` suffix.
static TIME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(\d{1,2}:\d{2}(?:\s?[ap]m)?)\b").unwrap());

static STATUS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(ON\s+DUTY|OFF\s+DUTY|DRIVING|SLEEPER)\b").unwrap()
});

static PAREN_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\([^)]*\)").unwrap());

static VEHICLE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\btruck[:#\s]+(\w+)").unwrap());

static BOL_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)\bBOL[:#\s]+(\w+)").unwrap());

static TRAILER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\btrailer[:#\s]+(\w+)").unwrap());

/// Annotation labels, tried in order. Values run to the next `|` separator.
static ANNOTATION_RES: LazyLock<[Regex; 3]> = LazyLock::new(|| {
    [
        Regex::new(r"(?i)\bremarks?:\s*([^|]*)").unwrap(),
        Regex::new(r"(?i)\bnotes?:\s*([^|]*)").unwrap(),
        Regex::new(r"(?i)\bcomments?:\s*([^|]*)").unwrap(),
    ]
});

static CERTIFIED_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(not\s+|un)?certified\b").unwrap());

/// One candidate duty-status line, still as text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawEntry {
    /// 1-based page number the line came from.
    pub page: usize,
    /// 1-based line number within the page.
    pub line: usize,
    /// Most recent `D/D/YYYY` date seen before this line.
    pub date_hint: Option<String>,
    pub start_time_text: String,
    pub end_time_text: String,
    pub status_text: String,
    pub location_text: String,
    /// Remark, note or comment attached to the line.
    pub annotation_text: String,
    pub vehicle_id: String,
    pub bol_number: String,
    pub trailer_number: String,
    pub certified: bool,
}

/// Optional fields scanned independently from every candidate line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    VehicleId,
    Annotation,
    BolNumber,
    TrailerNumber,
}

/// Pulls one optional field out of a line.
type FieldExtractor = fn(&str) -> Option<String>;

const FIELD_EXTRACTORS: &[(Field, FieldExtractor)] = &[
    (Field::VehicleId, vehicle_id),
    (Field::Annotation, annotation),
    (Field::BolNumber, bol_number),
    (Field::TrailerNumber, trailer_number),
];

fn first_capture(re: &Regex, line: &str) -> Option<String> {
    re.captures(line)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
        .filter(|value| !value.is_empty())
}

fn vehicle_id(line: &str) -> Option<String> {
    first_capture(&VEHICLE_RE, line)
}

/// The first label present wins, even when its value is empty.
fn annotation(line: &str) -> Option<String> {
    ANNOTATION_RES.iter().find_map(|re| {
        re.captures(line)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().trim().to_string())
    })
}

fn bol_number(line: &str) -> Option<String> {
    first_capture(&BOL_RE, line)
}

fn trailer_number(line: &str) -> Option<String> {
    first_capture(&TRAILER_RE, line)
}

/// A standalone "certified" that is not negated.
fn is_certified(line: &str) -> bool {
    CERTIFIED_RE
        .captures_iter(line)
        .any(|caps| caps.get(1).is_none())
}

/// Location segment: from the first parenthesized landmark up to the next `|`.
fn location_text(line: &str) -> Option<String> {
    let start = PAREN_RE.find(line)?.start();
    let rest = &line[start..];
    let end = rest.find('|').unwrap_or(rest.len());
    Some(rest[..end].trim().to_string())
}

/// Builds an entry from a line if it has both a time and a status token.
///
/// The date context is filled in by the caller.
fn extract_line(line: &str) -> Option<RawEntry> {
    let mut times = TIME_RE.find_iter(line);
    let start_time_text = times.next()?.as_str().trim().to_string();
    let status = STATUS_RE.captures(line)?;

    let status_text = status[1]
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_ascii_uppercase();
    let end_time_text = times
        .next()
        .map_or_else(|| start_time_text.clone(), |m| m.as_str().trim().to_string());

    let mut entry = RawEntry {
        start_time_text,
        end_time_text,
        status_text,
        location_text: location_text(line).unwrap_or_default(),
        certified: is_certified(line),
        ..RawEntry::default()
    };

    for (field, extract) in FIELD_EXTRACTORS {
        let value = extract(line).unwrap_or_default();
        match field {
            Field::VehicleId => entry.vehicle_id = value,
            Field::Annotation => entry.annotation_text = value,
            Field::BolNumber => entry.bol_number = value,
            Field::TrailerNumber => entry.trailer_number = value,
        }
    }

    Some(entry)
}

/// Extracts raw entries from the text of one page, in line order.
///
/// Entries that appear before any date line on the page are dropped rather
/// than given an invented date.
pub fn extract_page(page: usize, text: &str) -> Vec<RawEntry> {
    let mut current_date: Option<String> = None;
    let mut entries = Vec::new();

    for (idx, line) in text.lines().enumerate() {
        let line_number = idx + 1;
        if line.trim().is_empty() {
            continue;
        }

        if let Some(caps) = DATE_RE.captures(line) {
            current_date = Some(caps[1].to_string());
            continue;
        }

        let Some(mut entry) = extract_line(line) else {
            continue;
        };

        let Some(date) = &current_date else {
            tracing::debug!(page, line = line_number, "dropping entry before any date line");
            continue;
        };

        entry.page = page;
        entry.line = line_number;
        entry.date_hint = Some(date.clone());
        entries.push(entry);
    }

    tracing::debug!(page, entries = entries.len(), "extracted page");
    entries
}

/// Extracts every page in parallel and concatenates the results in page order.
pub fn extract_pages<S: AsRef<str> + Sync>(pages: &[S]) -> Vec<RawEntry> {
    pages
        .par_iter()
        .enumerate()
        .map(|(idx, text)| extract_page(idx + 1, text.as_ref()))
        .collect::<Vec<_>>()
        .into_iter()
        .flatten()
        .collect()
}
