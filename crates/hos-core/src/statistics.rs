//! Summary figures of an evaluated event sequence.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::hours::HoursTally;
use crate::types::{DutyStatus, Event};

/// Totals reported next to the violations.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Statistics {
    pub total_driving_hours: f64,
    /// Driving plus on-duty hours.
    pub total_on_duty_hours: f64,
    /// Number of events per duty status. Every status is present.
    pub event_counts: BTreeMap<DutyStatus, usize>,
}

impl Statistics {
    /// Builds the figures from the events and the final hours-of-service tally.
    pub fn new(events: &[Event], tally: &HoursTally) -> Self {
        let mut event_counts: BTreeMap<DutyStatus, usize> =
            DutyStatus::ALL.into_iter().map(|status| (status, 0)).collect();
        for event in events {
            *event_counts.entry(event.status()).or_default() += 1;
        }

        Self {
            total_driving_hours: tally.driving_hours(),
            total_on_duty_hours: tally.on_duty_hours(),
            event_counts,
        }
    }

    pub fn count(&self, status: DutyStatus) -> usize {
        self.event_counts.get(&status).copied().unwrap_or_default()
    }
}
