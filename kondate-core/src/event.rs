//! Schedule event types.
//!
//! One `ScheduleEvent` is one entry on the subscription calendar. The same
//! order shows up under several kinds over its lifecycle (a change
//! deadline, then either a skip or a delivery) and all of them share the
//! order's `link`, which is the join key across kinds.

use chrono::{DateTime, FixedOffset};
use std::fmt;

/// Fixed UTC+9 offset used for every calendar date.
///
/// The dashboard renders everything in Japan time; day cells carry no zone
/// of their own.
pub fn jst() -> FixedOffset {
    // 9h east of UTC is always in range
    FixedOffset::east_opt(9 * 60 * 60).unwrap()
}

/// The year/month of the calendar view following `(year, month)`.
pub fn next_month(year: i32, month: u32) -> (i32, u32) {
    if month == 12 { (year + 1, 1) } else { (year, month + 1) }
}

/// Category of a calendar entry.
///
/// `Unknown` is the classification-failure sentinel: it is what an
/// unrecognized day marker maps to, and it never appears in classifier
/// output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScheduleKind {
    Deadline,
    Skip,
    Delivery,
    Unknown,
}

impl fmt::Display for ScheduleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ScheduleKind::Deadline => "deadline",
            ScheduleKind::Skip => "skip",
            ScheduleKind::Delivery => "delivery",
            ScheduleKind::Unknown => "unknown",
        };
        f.write_str(s)
    }
}

/// One subscription calendar entry.
#[derive(Debug, Clone, PartialEq)]
pub struct ScheduleEvent {
    /// Numeric order identifier, taken from the trailing path segment of
    /// `link`. Stable across the order's lifecycle.
    pub schedule_id: i64,
    pub kind: ScheduleKind,
    /// The date shown on the calendar cell, at midnight UTC+9.
    pub date: DateTime<FixedOffset>,
    /// Canonical order path; shared by all entries of the same order.
    pub link: String,
    /// Deadline entries only: the date the order will actually arrive,
    /// parsed from the cell's descriptive text.
    pub delivery_date: Option<DateTime<FixedOffset>>,
    /// Deadline entries only, filled by the resolver: the kind the linked
    /// order is ultimately heading toward. `None` means the outcome is not
    /// knowable from the fetched window.
    pub outcome: Option<ScheduleKind>,
}
