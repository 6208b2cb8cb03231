//! Canonical duty-status records with validation.

use std::fmt;
use std::str::FromStr;

use chrono::{NaiveDateTime, TimeDelta};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::duty_type::DutyType;

/// Validation errors for core types.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// The end of an event lies before its start.
    #[error("event ends at {end} before it starts at {start}")]
    EndBeforeStart {
        start: NaiveDateTime,
        end: NaiveDateTime,
    },
}

/// A driver's legal activity category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DutyStatus {
    Driving,
    OnDuty,
    OffDuty,
    Sleeper,
}

impl DutyStatus {
    pub const ALL: [Self; 4] = [Self::Driving, Self::OnDuty, Self::OffDuty, Self::Sleeper];

    /// Canonical string form, used for serialization.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Driving => "DRIVING",
            Self::OnDuty => "ON_DUTY",
            Self::OffDuty => "OFF_DUTY",
            Self::Sleeper => "SLEEPER",
        }
    }

    /// Whether time in this status counts toward the on-duty limits.
    #[must_use]
    pub const fn is_on_duty(&self) -> bool {
        matches!(self, Self::Driving | Self::OnDuty)
    }
}

impl fmt::Display for DutyStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DutyStatus {
    type Err = UnknownStatus;

    /// Accepts the log sheet spelling (`ON DUTY`) as well as `ON_DUTY` and
    /// `on-duty`, in any case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s
            .split(|c: char| c.is_whitespace() || c == '_' || c == '-')
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
            .to_ascii_uppercase();

        match normalized.as_str() {
            "DRIVING" => Ok(Self::Driving),
            "ON DUTY" => Ok(Self::OnDuty),
            "OFF DUTY" => Ok(Self::OffDuty),
            "SLEEPER" | "SLEEPER BERTH" => Ok(Self::Sleeper),
            _ => Err(UnknownStatus(s.to_string())),
        }
    }
}

impl Serialize for DutyStatus {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for DutyStatus {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Error type for unrecognized duty status strings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownStatus(String);

impl fmt::Display for UnknownStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown duty status: {}", self.0)
    }
}

impl std::error::Error for UnknownStatus {}

/// Where a duty status change was recorded, e.g. `(Pilot #412) Dallas, TX, US`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    /// Text inside the parentheses, usually a truck stop or customer name.
    pub landmark: String,
    /// City or place name.
    pub place: String,
    /// Two-letter state code.
    pub state: String,
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.landmark.is_empty() {
            write!(f, "{}, {}", self.place, self.state)
        } else {
            write!(f, "({}) {}, {}", self.landmark, self.place, self.state)
        }
    }
}

/// One duty-status period from a driver's record of duty status.
///
/// Events are built once and never modified afterwards. The constructor
/// guarantees `end_time >= start_time`; deserialization goes through the same
/// check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "EventRecord")]
pub struct Event {
    start_time: NaiveDateTime,
    end_time: Option<NaiveDateTime>,
    status: DutyStatus,
    location: Option<Location>,
    note: String,
    vehicle_id: String,
    bol_number: String,
    trailer_number: String,
    is_certified: bool,
}

impl Event {
    /// Creates an event after checking that it does not end before it starts.
    pub fn new(
        start_time: NaiveDateTime,
        end_time: Option<NaiveDateTime>,
        status: DutyStatus,
    ) -> Result<Self, ValidationError> {
        if let Some(end) = end_time {
            if end < start_time {
                return Err(ValidationError::EndBeforeStart {
                    start: start_time,
                    end,
                });
            }
        }
        Ok(Self {
            start_time,
            end_time,
            status,
            location: None,
            note: String::new(),
            vehicle_id: String::new(),
            bol_number: String::new(),
            trailer_number: String::new(),
            is_certified: false,
        })
    }

    #[must_use]
    pub fn with_location(mut self, location: Option<Location>) -> Self {
        self.location = location;
        self
    }

    #[must_use]
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = note.into();
        self
    }

    #[must_use]
    pub fn with_vehicle_id(mut self, vehicle_id: impl Into<String>) -> Self {
        self.vehicle_id = vehicle_id.into();
        self
    }

    #[must_use]
    pub fn with_bol_number(mut self, bol_number: impl Into<String>) -> Self {
        self.bol_number = bol_number.into();
        self
    }

    #[must_use]
    pub fn with_trailer_number(mut self, trailer_number: impl Into<String>) -> Self {
        self.trailer_number = trailer_number.into();
        self
    }

    #[must_use]
    pub fn with_certified(mut self, is_certified: bool) -> Self {
        self.is_certified = is_certified;
        self
    }

    pub const fn start_time(&self) -> NaiveDateTime {
        self.start_time
    }

    pub const fn end_time(&self) -> Option<NaiveDateTime> {
        self.end_time
    }

    pub const fn status(&self) -> DutyStatus {
        self.status
    }

    pub const fn location(&self) -> Option<&Location> {
        self.location.as_ref()
    }

    pub fn note(&self) -> &str {
        &self.note
    }

    pub fn vehicle_id(&self) -> &str {
        &self.vehicle_id
    }

    pub fn bol_number(&self) -> &str {
        &self.bol_number
    }

    pub fn trailer_number(&self) -> &str {
        &self.trailer_number
    }

    pub const fn is_certified(&self) -> bool {
        self.is_certified
    }

    /// Recorded length of the event, if it has an end time.
    pub fn duration(&self) -> Option<TimeDelta> {
        self.end_time.map(|end| end - self.start_time)
    }

    /// Semantic sub-type derived from the note. Computed on every call.
    pub fn duty_type(&self) -> DutyType {
        DutyType::classify(&self.note)
    }
}

/// Wire shape of an [`Event`], validated on conversion.
#[derive(Debug, Deserialize)]
struct EventRecord {
    start_time: NaiveDateTime,
    #[serde(default)]
    end_time: Option<NaiveDateTime>,
    status: DutyStatus,
    #[serde(default)]
    location: Option<Location>,
    #[serde(default)]
    note: String,
    #[serde(default)]
    vehicle_id: String,
    #[serde(default)]
    bol_number: String,
    #[serde(default)]
    trailer_number: String,
    #[serde(default)]
    is_certified: bool,
}

impl TryFrom<EventRecord> for Event {
    type Error = ValidationError;

    fn try_from(record: EventRecord) -> Result<Self, Self::Error> {
        Ok(Self::new(record.start_time, record.end_time, record.status)?
            .with_location(record.location)
            .with_note(record.note)
            .with_vehicle_id(record.vehicle_id)
            .with_bol_number(record.bol_number)
            .with_trailer_number(record.trailer_number)
            .with_certified(record.is_certified))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(hour: u32, minute: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(hour, minute, 0)
            .unwrap()
    }

    #[test]
    fn test_status_parses_log_sheet_spellings() {
        assert_eq!("ON DUTY".parse::<DutyStatus>().unwrap(), DutyStatus::OnDuty);
        assert_eq!("on duty".parse::<DutyStatus>().unwrap(), DutyStatus::OnDuty);
        assert_eq!("ON_DUTY".parse::<DutyStatus>().unwrap(), DutyStatus::OnDuty);
        assert_eq!(
            "off-duty".parse::<DutyStatus>().unwrap(),
            DutyStatus::OffDuty
        );
        assert_eq!(
            "Sleeper Berth".parse::<DutyStatus>().unwrap(),
            DutyStatus::Sleeper
        );
        assert_eq!(
            "driving".parse::<DutyStatus>().unwrap(),
            DutyStatus::Driving
        );
    }

    #[test]
    fn test_status_roundtrips_through_as_str() {
        for status in DutyStatus::ALL {
            let parsed: DutyStatus = status.as_str().parse().expect("should parse");
            assert_eq!(parsed, status);
        }
    }

    #[test]
    fn test_unknown_status_errors() {
        let err = "PERSONAL USE".parse::<DutyStatus>().unwrap_err();
        assert_eq!(err.to_string(), "unknown duty status: PERSONAL USE");
    }

    #[test]
    fn test_event_rejects_end_before_start() {
        let result = Event::new(at(9, 0), Some(at(8, 0)), DutyStatus::Driving);
        assert_eq!(
            result.unwrap_err(),
            ValidationError::EndBeforeStart {
                start: at(9, 0),
                end: at(8, 0),
            }
        );
    }

    #[test]
    fn test_event_allows_point_duration() {
        let event = Event::new(at(8, 0), Some(at(8, 0)), DutyStatus::OnDuty).unwrap();
        assert_eq!(event.duration(), Some(TimeDelta::zero()));
    }

    #[test]
    fn test_event_serialization_roundtrip() {
        let event = Event::new(at(8, 0), Some(at(8, 20)), DutyStatus::OnDuty)
            .unwrap()
            .with_location(Some(Location {
                landmark: "Pilot #412".into(),
                place: "Dallas".into(),
                state: "TX".into(),
            }))
            .with_note("pre-trip inspection")
            .with_vehicle_id("4521");

        let json = serde_json::to_string(&event).unwrap();
        let parsed: Event = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, event);
    }

    #[test]
    fn test_event_deserialization_validates_times() {
        let json = r#"{
            "start_time": "2024-01-01T09:00:00",
            "end_time": "2024-01-01T08:00:00",
            "status": "DRIVING"
        }"#;
        let result: Result<Event, _> = serde_json::from_str(json);
        assert!(result.is_err());
    }

    #[test]
    fn test_event_deserialization_defaults_optional_fields() {
        let json = r#"{"start_time": "2024-01-01T09:00:00", "status": "on duty"}"#;
        let event: Event = serde_json::from_str(json).unwrap();
        assert_eq!(event.status(), DutyStatus::OnDuty);
        assert_eq!(event.end_time(), None);
        assert!(event.note().is_empty());
        assert!(!event.is_certified());
    }

    #[test]
    fn test_location_display_includes_landmark() {
        let location = Location {
            landmark: "Pilot #412".into(),
            place: "Dallas".into(),
            state: "TX".into(),
        };
        assert_eq!(location.to_string(), "(Pilot #412) Dallas, TX");
    }
}
