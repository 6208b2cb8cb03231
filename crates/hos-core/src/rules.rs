//! Compliance rule engine entry point.
//!
//! Evaluation runs two independent passes over a chronologically ordered
//! event sequence and merges their buckets:
//!
//! 1. [`check_hours_of_service`]: cumulative driving, on-duty and cycle limits
//!    plus the overnight rest minimum.
//! 2. [`check_on_duty_activities`]: minimum durations of on-duty sub-activities
//!    and missing remarks.

use std::fmt;

use chrono::TimeDelta;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::activity::check_on_duty_activities;
use crate::hours::check_hours_of_service;
use crate::statistics::Statistics;
use crate::types::Event;
use crate::violation::ViolationReport;

/// Regulatory thresholds. Defaults are the U.S. federal property-carrier values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HosLimits {
    /// Maximum cumulative driving hours.
    pub driving_hours: f64,
    /// Maximum cumulative on-duty (driving + on duty) hours.
    pub on_duty_hours: f64,
    /// Minimum overnight rest between duty periods.
    pub off_duty_hours: f64,
    /// Maximum on-duty hours within the rolling cycle window.
    pub cycle_hours: f64,
    /// Length of the rolling cycle window in calendar days.
    pub cycle_days: u32,
    /// Minimum length of a pre-trip inspection.
    pub pti_minutes: f64,
    /// Minimum length of a pickup, delivery or dock stop.
    pub loading_minutes: f64,
}

impl Default for HosLimits {
    fn default() -> Self {
        Self {
            driving_hours: 11.0,
            on_duty_hours: 14.0,
            off_duty_hours: 10.0,
            cycle_hours: 70.0,
            cycle_days: 8,
            pti_minutes: 15.0,
            loading_minutes: 17.0,
        }
    }
}

impl HosLimits {
    /// Rejects thresholds that are not positive finite numbers.
    pub fn validate(&self) -> Result<(), EvaluationError> {
        let thresholds = [
            ("driving_hours", self.driving_hours),
            ("on_duty_hours", self.on_duty_hours),
            ("off_duty_hours", self.off_duty_hours),
            ("cycle_hours", self.cycle_hours),
            ("pti_minutes", self.pti_minutes),
            ("loading_minutes", self.loading_minutes),
        ];
        for (name, value) in thresholds {
            if !value.is_finite() || value <= 0.0 {
                return Err(EvaluationError::InvalidLimit {
                    name,
                    value: value.to_string(),
                });
            }
        }
        if self.cycle_days == 0 {
            return Err(EvaluationError::InvalidLimit {
                name: "cycle_days",
                value: "0".to_string(),
            });
        }
        Ok(())
    }
}

/// Which evaluation pass a failure came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pass {
    HoursOfService,
    OnDutyActivities,
}

impl fmt::Display for Pass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::HoursOfService => "hours-of-service",
            Self::OnDutyActivities => "on-duty activity",
        })
    }
}

/// Failure inside a single rule pass.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RuleError {
    /// An event's effective duration came out negative.
    #[error("event {index} has a negative duration")]
    NegativeDuration { index: usize },
}

/// Errors from [`evaluate`]. None of them carry a partial report.
#[derive(Debug, Error)]
pub enum EvaluationError {
    /// The input is not a sequence of events.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The events are not ordered by start time.
    #[error("events are not in chronological order at index {index}")]
    Unordered { index: usize },

    #[error("invalid limit {name}: {value}")]
    InvalidLimit { name: &'static str, value: String },

    /// A rule pass failed; no violations from either pass are returned.
    #[error("{pass} pass failed")]
    Pass {
        pass: Pass,
        #[source]
        source: RuleError,
    },
}

#[expect(
    clippy::cast_precision_loss,
    reason = "durations are well under 2^52 milliseconds"
)]
pub(crate) fn hours(delta: TimeDelta) -> f64 {
    delta.num_milliseconds() as f64 / 3_600_000.0
}

#[expect(
    clippy::cast_precision_loss,
    reason = "durations are well under 2^52 milliseconds"
)]
pub(crate) fn minutes(delta: TimeDelta) -> f64 {
    delta.num_milliseconds() as f64 / 60_000.0
}

/// Effective length of every event.
///
/// An event without an end time lasts until the next event starts; the last
/// such event counts as zero length.
pub(crate) fn event_durations(events: &[Event]) -> Result<Vec<TimeDelta>, RuleError> {
    events
        .iter()
        .enumerate()
        .map(|(index, event)| {
            let duration = event.duration().unwrap_or_else(|| {
                events.get(index + 1).map_or_else(TimeDelta::zero, |next| {
                    next.start_time() - event.start_time()
                })
            });
            if duration < TimeDelta::zero() {
                Err(RuleError::NegativeDuration { index })
            } else {
                Ok(duration)
            }
        })
        .collect()
}

/// Violations of one run together with its summary figures.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Evaluation {
    pub statistics: Statistics,
    pub violations: ViolationReport,
}

/// Evaluates a chronologically ordered event sequence against every rule and
/// keeps the final hours-of-service totals.
pub fn analyze(events: &[Event], limits: &HosLimits) -> Result<Evaluation, EvaluationError> {
    limits.validate()?;

    if let Some(index) = events
        .windows(2)
        .position(|pair| pair[1].start_time() < pair[0].start_time())
    {
        return Err(EvaluationError::Unordered { index: index + 1 });
    }

    let hours = check_hours_of_service(events, limits).map_err(|source| EvaluationError::Pass {
        pass: Pass::HoursOfService,
        source,
    })?;
    let activities =
        check_on_duty_activities(events, limits).map_err(|source| EvaluationError::Pass {
            pass: Pass::OnDutyActivities,
            source,
        })?;

    let statistics = Statistics::new(events, &hours.tally);
    let violations = hours.report.merge(activities);
    tracing::debug!(
        events = events.len(),
        violations = violations.total(),
        driving_hours = statistics.total_driving_hours,
        on_duty_hours = statistics.total_on_duty_hours,
        "evaluated events"
    );
    Ok(Evaluation {
        statistics,
        violations,
    })
}

/// Evaluates a chronologically ordered event sequence against every rule.
pub fn evaluate(events: &[Event], limits: &HosLimits) -> Result<ViolationReport, EvaluationError> {
    analyze(events, limits).map(|evaluation| evaluation.violations)
}

/// Parses a JSON array of events.
pub fn parse_events_json(input: &str) -> Result<Vec<Event>, EvaluationError> {
    let value: serde_json::Value = serde_json::from_str(input)
        .map_err(|e| EvaluationError::InvalidInput(format!("not valid JSON: {e}")))?;

    let kind = match &value {
        serde_json::Value::Array(_) => None,
        serde_json::Value::Null => Some("null"),
        serde_json::Value::Bool(_) => Some("a boolean"),
        serde_json::Value::Number(_) => Some("a number"),
        serde_json::Value::String(_) => Some("a string"),
        serde_json::Value::Object(_) => Some("an object"),
    };
    if let Some(kind) = kind {
        return Err(EvaluationError::InvalidInput(format!(
            "expected an array of events, got {kind}"
        )));
    }

    serde_json::from_value(value).map_err(|e| EvaluationError::InvalidInput(e.to_string()))
}

/// Evaluates a JSON array of events.
pub fn evaluate_json(input: &str, limits: &HosLimits) -> Result<ViolationReport, EvaluationError> {
    let events = parse_events_json(input)?;
    evaluate(&events, limits)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::DutyStatus;
    use crate::violation::ViolationCategory;
    use chrono::{NaiveDate, NaiveDateTime};

    fn at(hour: u32, minute: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(hour, minute, 0)
            .unwrap()
    }

    fn on_duty(start: NaiveDateTime, minutes: i64, note: &str) -> Event {
        Event::new(
            start,
            Some(start + TimeDelta::minutes(minutes)),
            DutyStatus::OnDuty,
        )
        .unwrap()
        .with_note(note)
    }

    fn driving(start: NaiveDateTime, hours: i64) -> Event {
        Event::new(
            start,
            Some(start + TimeDelta::hours(hours)),
            DutyStatus::Driving,
        )
        .unwrap()
    }

    #[test]
    fn test_report_contains_every_bucket() {
        let report = evaluate(&[], &HosLimits::default()).unwrap();
        assert!(report.is_empty());
        assert_eq!(report.iter().count(), 7);
    }

    #[test]
    fn test_merges_both_passes() {
        let events = [
            on_duty(at(0, 0), 10, "pti"),
            driving(at(0, 10), 6),
            driving(at(6, 10), 6),
        ];
        let report = evaluate(&events, &HosLimits::default()).unwrap();
        assert_eq!(report.get(ViolationCategory::PtiDuration).len(), 1);
        assert_eq!(report.get(ViolationCategory::DrivingLimit).len(), 1);
        assert_eq!(report.get(ViolationCategory::DrivingLimit)[0].event_index, 2);
    }

    #[test]
    fn test_analyze_returns_totals_with_the_report() {
        let events = [
            on_duty(at(0, 0), 10, "pti"),
            driving(at(0, 10), 6),
            driving(at(6, 10), 6),
        ];
        let evaluation = analyze(&events, &HosLimits::default()).unwrap();
        assert!((evaluation.statistics.total_driving_hours - 12.0).abs() < f64::EPSILON);
        assert_eq!(evaluation.statistics.count(DutyStatus::Driving), 2);
        assert_eq!(evaluation.statistics.count(DutyStatus::OnDuty), 1);
        assert_eq!(
            evaluation.violations,
            evaluate(&events, &HosLimits::default()).unwrap()
        );
    }

    #[test]
    fn test_evaluation_is_idempotent() {
        let events = [
            on_duty(at(0, 0), 30, ""),
            driving(at(0, 30), 8),
            on_duty(at(8, 30), 10, "delivery"),
            driving(at(8, 40), 5),
        ];
        let limits = HosLimits::default();
        let first = evaluate(&events, &limits).unwrap();
        let second = evaluate(&events, &limits).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_rejects_unordered_events() {
        let events = [driving(at(5, 0), 1), driving(at(1, 0), 1)];
        let err = evaluate(&events, &HosLimits::default()).unwrap_err();
        assert!(matches!(err, EvaluationError::Unordered { index: 1 }));
    }

    #[test]
    fn test_rejects_invalid_limits() {
        let limits = HosLimits {
            driving_hours: f64::NAN,
            ..HosLimits::default()
        };
        let err = evaluate(&[], &limits).unwrap_err();
        assert!(matches!(
            err,
            EvaluationError::InvalidLimit {
                name: "driving_hours",
                ..
            }
        ));

        let limits = HosLimits {
            cycle_days: 0,
            ..HosLimits::default()
        };
        assert!(limits.validate().is_err());
    }

    #[test]
    fn test_widest_valid_cycle_window_evaluates() {
        let limits = HosLimits {
            cycle_days: u32::MAX,
            ..HosLimits::default()
        };
        assert!(limits.validate().is_ok());
        let report = evaluate(&[on_duty(at(8, 0), 60, "pti")], &limits).unwrap();
        assert!(report.get(ViolationCategory::CycleLimit).is_empty());
    }

    #[test]
    fn test_open_ended_events_last_until_the_next_start() {
        let events = [
            Event::new(at(8, 0), None, DutyStatus::OnDuty).unwrap(),
            Event::new(at(8, 25), None, DutyStatus::Driving).unwrap(),
        ];
        let durations = event_durations(&events).unwrap();
        assert_eq!(durations, [TimeDelta::minutes(25), TimeDelta::zero()]);
    }

    #[test]
    fn test_pass_failures_name_the_pass() {
        let err = EvaluationError::Pass {
            pass: Pass::OnDutyActivities,
            source: RuleError::NegativeDuration { index: 3 },
        };
        assert_eq!(err.to_string(), "on-duty activity pass failed");
        let source = std::error::Error::source(&err).unwrap();
        assert_eq!(source.to_string(), "event 3 has a negative duration");
    }

    #[test]
    fn test_json_input_must_be_an_array() {
        let limits = HosLimits::default();
        let err = evaluate_json(r#"{"start_time": "2024-01-01T08:00:00"}"#, &limits).unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid input: expected an array of events, got an object"
        );

        let err = evaluate_json("not json", &limits).unwrap_err();
        assert!(matches!(err, EvaluationError::InvalidInput(_)));

        let err = evaluate_json(r#"[{"status": "DRIVING"}]"#, &limits).unwrap_err();
        assert!(matches!(err, EvaluationError::InvalidInput(_)));
    }

    #[test]
    fn test_json_input_is_evaluated() {
        let input = r#"[
            {"start_time": "2024-01-01T08:00:00", "end_time": "2024-01-01T08:10:00",
             "status": "ON_DUTY", "note": "pti"}
        ]"#;
        let report = evaluate_json(input, &HosLimits::default()).unwrap();
        assert_eq!(report.get(ViolationCategory::PtiDuration).len(), 1);
    }

    #[test]
    fn test_limits_deserialize_with_defaults() {
        let limits: HosLimits = serde_json::from_str(r#"{"driving_hours": 10}"#).unwrap();
        assert!((limits.driving_hours - 10.0).abs() < f64::EPSILON);
        assert_eq!(limits.cycle_days, 8);
    }
}
