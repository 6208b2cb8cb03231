//! Violation records and the bucketed report.

use std::collections::BTreeMap;
use std::fmt;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::duty_type::DutyType;
use crate::types::{Event, Location};

/// Named violation bucket.
///
/// The serialized names are the report keys consumers look up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ViolationCategory {
    #[serde(rename = "driving_limit_violations")]
    DrivingLimit,
    #[serde(rename = "on_duty_limit_violations")]
    OnDutyLimit,
    #[serde(rename = "off_duty_violations")]
    OffDuty,
    #[serde(rename = "cycle_limit_violations")]
    CycleLimit,
    #[serde(rename = "pti_duration_violations")]
    PtiDuration,
    #[serde(rename = "loading_duration_violations")]
    LoadingDuration,
    #[serde(rename = "missing_remark_violations")]
    MissingRemark,
}

impl ViolationCategory {
    /// Every category, in report order.
    pub const ALL: [Self; 7] = [
        Self::DrivingLimit,
        Self::OnDutyLimit,
        Self::OffDuty,
        Self::CycleLimit,
        Self::PtiDuration,
        Self::LoadingDuration,
        Self::MissingRemark,
    ];

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::DrivingLimit => "driving_limit_violations",
            Self::OnDutyLimit => "on_duty_limit_violations",
            Self::OffDuty => "off_duty_violations",
            Self::CycleLimit => "cycle_limit_violations",
            Self::PtiDuration => "pti_duration_violations",
            Self::LoadingDuration => "loading_duration_violations",
            Self::MissingRemark => "missing_remark_violations",
        }
    }

    /// Heading used in human-readable output.
    #[must_use]
    pub const fn title(&self) -> &'static str {
        match self {
            Self::DrivingLimit => "DRIVING LIMIT",
            Self::OnDutyLimit => "ON-DUTY LIMIT",
            Self::OffDuty => "OFF-DUTY REST",
            Self::CycleLimit => "CYCLE LIMIT",
            Self::PtiDuration => "PRE-TRIP INSPECTION",
            Self::LoadingDuration => "LOADING / UNLOADING",
            Self::MissingRemark => "MISSING REMARK",
        }
    }
}

impl fmt::Display for ViolationCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A rule breach, pointing back at the event that triggered it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Violation {
    pub category: ViolationCategory,
    /// Position of the triggering event in the evaluated sequence.
    pub event_index: usize,
    pub timestamp: NaiveDateTime,
    pub location: Option<Location>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duty_type: Option<DutyType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_minutes: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub required_minutes: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_hours: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl Violation {
    /// Starts a violation for `event`, stamped with its start time and location.
    pub fn new(category: ViolationCategory, event_index: usize, event: &Event) -> Self {
        Self {
            category,
            event_index,
            timestamp: event.start_time(),
            location: event.location().cloned(),
            duty_type: None,
            duration_minutes: None,
            required_minutes: None,
            total_hours: None,
            note: None,
        }
    }
}

/// Violations grouped by category. Every category is always present.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ViolationReport {
    buckets: BTreeMap<ViolationCategory, Vec<Violation>>,
}

impl Default for ViolationReport {
    fn default() -> Self {
        Self::new()
    }
}

impl ViolationReport {
    /// Creates a report with every bucket empty.
    pub fn new() -> Self {
        Self {
            buckets: ViolationCategory::ALL
                .into_iter()
                .map(|category| (category, Vec::new()))
                .collect(),
        }
    }

    /// Appends a violation to the bucket named by its category.
    pub fn push(&mut self, violation: Violation) {
        self.buckets
            .entry(violation.category)
            .or_default()
            .push(violation);
    }

    pub fn get(&self, category: ViolationCategory) -> &[Violation] {
        self.buckets
            .get(&category)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Combines two reports bucket by bucket, `self` first.
    #[must_use]
    pub fn merge(mut self, other: Self) -> Self {
        for (category, violations) in other.buckets {
            self.buckets.entry(category).or_default().extend(violations);
        }
        self
    }

    /// Buckets in report order.
    pub fn iter(&self) -> impl Iterator<Item = (ViolationCategory, &[Violation])> {
        self.buckets
            .iter()
            .map(|(category, violations)| (*category, violations.as_slice()))
    }

    /// Total number of violations across all buckets.
    pub fn total(&self) -> usize {
        self.buckets.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }
}
