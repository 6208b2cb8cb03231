//! Minimum durations for on-duty sub-activities.

use crate::duty_type::DutyType;
use crate::rules::{HosLimits, RuleError, event_durations, minutes};
use crate::types::{DutyStatus, Event};
use crate::violation::{Violation, ViolationCategory, ViolationReport};

/// Checks every `ON_DUTY` event against the activity minimums.
///
/// - A pre-trip inspection shorter than the PTI minimum.
/// - Otherwise, a pickup, delivery or dock stop shorter than the loading minimum.
/// - Independently, a stop of at least the loading minimum whose note does
///   not say what it was.
pub fn check_on_duty_activities(
    events: &[Event],
    limits: &HosLimits,
) -> Result<ViolationReport, RuleError> {
    let durations = event_durations(events)?;
    let mut report = ViolationReport::new();

    let on_duty = events
        .iter()
        .zip(durations)
        .enumerate()
        .filter(|(_, (event, _))| event.status() == DutyStatus::OnDuty);

    for (index, (event, duration)) in on_duty {
        let duration_minutes = minutes(duration);
        let duty_type = event.duty_type();
        let note = event.note();

        if duty_type == DutyType::Pti && duration_minutes < limits.pti_minutes {
            report.push(Violation {
                duration_minutes: Some(duration_minutes),
                required_minutes: Some(limits.pti_minutes),
                note: Some(note.to_string()),
                ..Violation::new(ViolationCategory::PtiDuration, index, event)
            });
        } else if duty_type.is_freight_handling() && duration_minutes < limits.loading_minutes {
            report.push(Violation {
                duty_type: Some(duty_type),
                duration_minutes: Some(duration_minutes),
                required_minutes: Some(limits.loading_minutes),
                note: Some(note.to_string()),
                ..Violation::new(ViolationCategory::LoadingDuration, index, event)
            });
        }

        if duration_minutes >= limits.loading_minutes && duty_type == DutyType::Unknown {
            let note = if note.trim().is_empty() {
                "No remark"
            } else {
                note
            };
            report.push(Violation {
                duration_minutes: Some(duration_minutes),
                note: Some(note.to_string()),
                ..Violation::new(ViolationCategory::MissingRemark, index, event)
            });
        }
    }

    Ok(report)
}
