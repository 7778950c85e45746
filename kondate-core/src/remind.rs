//! Reminder selection.

use chrono::{DateTime, FixedOffset, Utc};

use crate::event::{ScheduleEvent, ScheduleKind};

/// Filter resolved deadlines down to the ones worth a reminder right now.
///
/// A deadline qualifies iff its order resolves to an actual delivery and
/// strictly less than `horizon_hours` remain until the deadline date.
/// Skipped or unresolved orders never qualify; there is nothing useful to
/// remind about. Pure and deterministic; `now` is injected by the caller.
pub fn due_for_reminder(
    deadlines: &[ScheduleEvent],
    horizon_hours: f64,
    now: DateTime<Utc>,
) -> Vec<ScheduleEvent> {
    deadlines
        .iter()
        .filter(|event| event.kind == ScheduleKind::Deadline)
        .filter(|event| event.outcome == Some(ScheduleKind::Delivery))
        .filter(|event| hours_until(event.date, now) < horizon_hours)
        .cloned()
        .collect()
}

fn hours_until(date: DateTime<FixedOffset>, now: DateTime<Utc>) -> f64 {
    (date.with_timezone(&Utc) - now).num_seconds() as f64 / 3600.0
}
