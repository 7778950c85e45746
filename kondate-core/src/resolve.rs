//! Deadline outcome resolution.
//!
//! A deadline entry guards an order whose fate shows up elsewhere on the
//! calendar: either a skip entry (delivery cancelled for the cycle) or a
//! delivery entry, joined on the shared order `link`. Resolution is a pure
//! join over the merged two-month window; it performs no I/O.

use std::collections::HashMap;

use crate::event::{ScheduleEvent, ScheduleKind};

/// Fill each deadline's `outcome` from the skip and delivery entries that
/// share its order link.
///
/// Deliveries overwrite skips for the same link: a confirmed delivery is
/// the later-stage signal. A deadline whose link matches neither keeps
/// `outcome: None`: its fate is not knowable from the fetched window.
pub fn resolve_outcomes(
    deadlines: Vec<ScheduleEvent>,
    skips: &[ScheduleEvent],
    deliveries: &[ScheduleEvent],
) -> Vec<ScheduleEvent> {
    let mut outcome_by_link: HashMap<&str, ScheduleKind> = HashMap::new();
    for skip in skips {
        outcome_by_link.insert(skip.link.as_str(), skip.kind);
    }
    for delivery in deliveries {
        outcome_by_link.insert(delivery.link.as_str(), delivery.kind);
    }

    deadlines
        .into_iter()
        .map(|mut deadline| {
            deadline.outcome = outcome_by_link.get(deadline.link.as_str()).copied();
            deadline
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::jst;
    use chrono::TimeZone;

    fn event(kind: ScheduleKind, schedule_id: i64, day: u32) -> ScheduleEvent {
        ScheduleEvent {
            schedule_id,
            kind,
            date: jst().with_ymd_and_hms(2026, 4, day, 0, 0, 0).unwrap(),
            link: format!("https://nosh.jp/mypage/11111/{schedule_id}"),
            delivery_date: None,
            outcome: None,
        }
    }

    #[test]
    fn deadline_resolves_to_matching_delivery() {
        let deadlines = vec![event(ScheduleKind::Deadline, 1, 10)];
        let deliveries = vec![event(ScheduleKind::Delivery, 1, 13)];

        let resolved = resolve_outcomes(deadlines, &[], &deliveries);
        assert_eq!(resolved[0].outcome, Some(ScheduleKind::Delivery));
    }

    #[test]
    fn deadline_resolves_to_matching_skip() {
        let deadlines = vec![event(ScheduleKind::Deadline, 1, 10)];
        let skips = vec![event(ScheduleKind::Skip, 1, 13)];

        let resolved = resolve_outcomes(deadlines, &skips, &[]);
        assert_eq!(resolved[0].outcome, Some(ScheduleKind::Skip));
    }

    #[test]
    fn delivery_overrides_skip_for_same_link() {
        let deadlines = vec![event(ScheduleKind::Deadline, 1, 10)];
        let skips = vec![event(ScheduleKind::Skip, 1, 13)];
        let deliveries = vec![event(ScheduleKind::Delivery, 1, 13)];

        let resolved = resolve_outcomes(deadlines, &skips, &deliveries);
        assert_eq!(resolved[0].outcome, Some(ScheduleKind::Delivery));
    }

    #[test]
    fn unmatched_deadline_stays_unresolved() {
        let deadlines = vec![event(ScheduleKind::Deadline, 1, 10)];
        let deliveries = vec![event(ScheduleKind::Delivery, 2, 13)];

        let resolved = resolve_outcomes(deadlines, &[], &deliveries);
        assert_eq!(resolved[0].outcome, None);
    }
}
