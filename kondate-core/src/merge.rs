//! Cross-month deduplication.

use std::collections::HashSet;

use crate::event::ScheduleEvent;

/// Merge two month views of the same category into one deduplicated list.
///
/// Every event of `primary` is kept in its original order, followed by the
/// events of `secondary` whose `link` was not already seen, in theirs.
/// Callers pass the *next* month's view as `primary` so that an entry
/// rendered on both views (common near month boundaries) keeps the next
/// month's data.
pub fn merge(primary: Vec<ScheduleEvent>, secondary: Vec<ScheduleEvent>) -> Vec<ScheduleEvent> {
    let seen: HashSet<String> = primary.iter().map(|event| event.link.clone()).collect();

    let mut merged = primary;
    merged.extend(
        secondary
            .into_iter()
            .filter(|event| !seen.contains(&event.link)),
    );
    merged
}
