//! Cumulative Hours-of-Service limits.
//!
//! A single left-to-right fold carries a [`HoursTally`] through the events.
//! The driving and on-duty totals only ever grow: off-duty and sleeper time
//! neither adds to them nor resets them. To measure time since the last rest,
//! pass in only the events of one duty window.

use std::collections::BTreeMap;

use chrono::{Days, NaiveDate, NaiveDateTime, TimeDelta};

use crate::rules::{HosLimits, RuleError, event_durations, hours, minutes};
use crate::types::{DutyStatus, Event};
use crate::violation::{Violation, ViolationCategory, ViolationReport};

/// Running totals of the hours-of-service scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HoursTally {
    /// Total driving time so far.
    pub driving: TimeDelta,
    /// Total driving plus on-duty time so far.
    pub on_duty: TimeDelta,
    /// On-duty time booked to the calendar day each event started on.
    pub daily_on_duty: BTreeMap<NaiveDate, TimeDelta>,
    /// End of the most recent driving or on-duty event.
    pub last_duty_end: Option<NaiveDateTime>,
    /// Off-duty and sleeper time logged since that event.
    pub rest_since_duty: TimeDelta,
}

impl Default for HoursTally {
    fn default() -> Self {
        Self {
            driving: TimeDelta::zero(),
            on_duty: TimeDelta::zero(),
            daily_on_duty: BTreeMap::new(),
            last_duty_end: None,
            rest_since_duty: TimeDelta::zero(),
        }
    }
}

impl HoursTally {
    pub fn driving_hours(&self) -> f64 {
        hours(self.driving)
    }

    pub fn on_duty_hours(&self) -> f64 {
        hours(self.on_duty)
    }

    /// On-duty hours in the `cycle_days` calendar days ending on `day`.
    pub fn cycle_hours(&self, day: NaiveDate, cycle_days: u32) -> f64 {
        // Windows reaching past the calendar start cover every booked day
        let first_day = day
            .checked_sub_days(Days::new(u64::from(cycle_days.saturating_sub(1))))
            .unwrap_or(NaiveDate::MIN);
        let total = self
            .daily_on_duty
            .range(first_day..=day)
            .fold(TimeDelta::zero(), |acc, (_, time)| acc + *time);
        hours(total)
    }

    /// Folds one event into the tally, pushing any limit it crosses.
    fn record(
        mut self,
        index: usize,
        event: &Event,
        duration: TimeDelta,
        limits: &HosLimits,
        report: &mut ViolationReport,
    ) -> Self {
        let status = event.status();
        if !status.is_on_duty() {
            self.rest_since_duty += duration;
            return self;
        }

        if let Some(rest) = self.short_overnight_rest(event, limits) {
            report.push(Violation {
                duration_minutes: Some(minutes(rest)),
                required_minutes: Some(limits.off_duty_hours * 60.0),
                ..Violation::new(ViolationCategory::OffDuty, index, event)
            });
        }

        if status == DutyStatus::Driving {
            self.driving += duration;
            if self.driving_hours() > limits.driving_hours {
                report.push(Violation {
                    duration_minutes: Some(minutes(duration)),
                    total_hours: Some(self.driving_hours()),
                    ..Violation::new(ViolationCategory::DrivingLimit, index, event)
                });
            }
        }

        self.on_duty += duration;
        if self.on_duty_hours() > limits.on_duty_hours {
            report.push(Violation {
                duration_minutes: Some(minutes(duration)),
                total_hours: Some(self.on_duty_hours()),
                ..Violation::new(ViolationCategory::OnDutyLimit, index, event)
            });
        }

        let day = event.start_time().date();
        *self.daily_on_duty.entry(day).or_insert_with(TimeDelta::zero) += duration;
        let cycle_hours = self.cycle_hours(day, limits.cycle_days);
        if cycle_hours > limits.cycle_hours {
            report.push(Violation {
                duration_minutes: Some(minutes(duration)),
                total_hours: Some(cycle_hours),
                ..Violation::new(ViolationCategory::CycleLimit, index, event)
            });
        }

        self.last_duty_end = Some(event.start_time() + duration);
        self.rest_since_duty = TimeDelta::zero();
        self
    }

    /// Length of the rest before `event` if it was an overnight rest shorter
    /// than the off-duty minimum.
    ///
    /// Only gaps with logged off-duty or sleeper time that end on a later
    /// calendar day than they began count as overnight rests.
    fn short_overnight_rest(&self, event: &Event, limits: &HosLimits) -> Option<TimeDelta> {
        let last_end = self.last_duty_end?;
        if self.rest_since_duty <= TimeDelta::zero() || event.start_time().date() <= last_end.date() {
            return None;
        }
        let rest = event.start_time() - last_end;
        (hours(rest) < limits.off_duty_hours).then_some(rest)
    }
}

/// Result of the hours-of-service pass.
#[derive(Debug, Clone, PartialEq)]
pub struct HoursCheck {
    /// Final running totals.
    pub tally: HoursTally,
    pub report: ViolationReport,
}

/// Checks cumulative driving, on-duty and cycle limits and overnight rests.
pub fn check_hours_of_service(
    events: &[Event],
    limits: &HosLimits,
) -> Result<HoursCheck, RuleError> {
    let durations = event_durations(events)?;
    let mut report = ViolationReport::new();

    let tally = events.iter().zip(durations).enumerate().fold(
        HoursTally::default(),
        |tally, (index, (event, duration))| tally.record(index, event, duration, limits, &mut report),
    );

    Ok(HoursCheck { tally, report })
}
