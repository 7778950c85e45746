//! Run orchestration.
//!
//! One run is a straight line: authenticate, fetch the current and next
//! month calendar views, merge and resolve them over the two-month window,
//! select the deadlines inside the reminder horizon, then fetch menus and
//! notify per selected deadline. Any fetch/parse/notify failure aborts the
//! rest of the run; the notifier's "nothing to post" signal skips just
//! that one event.

use anyhow::{Context, Result};
use chrono::{DateTime, Datelike, Utc};
use log::debug;

use kondate_core::{
    Menu, MonthSchedule, ScheduleEvent, due_for_reminder, jst, merge, next_month, parse_calendar,
    parse_menu_page, resolve_outcomes,
};

use crate::config::Config;
use crate::notify::NotifyError;

/// Read access to the authenticated member pages, abstracted so tests can
/// serve static markup fixtures instead of driving a live session.
pub trait Dashboard {
    type Session;

    async fn login(&self, email: &str, password: &str) -> Result<Self::Session>;
    async fn calendar_html(&self, session: &Self::Session, year: i32, month: u32)
    -> Result<String>;
    async fn menu_html(&self, session: &Self::Session, schedule_id: i64) -> Result<String>;
}

/// Outbound reminder delivery.
pub trait Notifier {
    async fn remind(&self, menus: &[Menu], deadline: &ScheduleEvent) -> Result<(), NotifyError>;
}

/// Execute one full reminder run.
pub async fn run<D: Dashboard, N: Notifier>(
    config: &Config,
    dashboard: &D,
    notifier: &N,
    now: DateTime<Utc>,
) -> Result<()> {
    debug!("start login...");
    let session = dashboard.login(&config.email, &config.password).await?;
    debug!("login successful");

    let today = now.with_timezone(&jst());
    let deadlines = fetch_deadlines(dashboard, &session, today.year(), today.month()).await?;

    let due = due_for_reminder(&deadlines, config.remind_hours, now);
    if due.is_empty() {
        debug!("no reminders due");
        return Ok(());
    }
    debug!("will notify {} deadline(s): {due:?}", due.len());

    for deadline in &due {
        let html = dashboard
            .menu_html(&session, deadline.schedule_id)
            .await
            .with_context(|| format!("fetching menu for order {}", deadline.schedule_id))?;
        let menus = parse_menu_page(&html);

        match notifier.remind(&menus, deadline).await {
            Ok(()) => {}
            Err(err) if err.is_nothing_to_post() => {
                debug!("order {}: {err}", deadline.schedule_id);
            }
            Err(err) => {
                return Err(err)
                    .with_context(|| format!("notifying about order {}", deadline.schedule_id));
            }
        }
    }

    debug!("remind done");
    Ok(())
}

/// Fetch and classify the current and next month views, merge them per
/// category with the next month as primary, and resolve deadline outcomes
/// over the merged window.
async fn fetch_deadlines<D: Dashboard>(
    dashboard: &D,
    session: &D::Session,
    year: i32,
    month: u32,
) -> Result<Vec<ScheduleEvent>> {
    let current = fetch_month(dashboard, session, year, month).await?;
    let (ny, nm) = next_month(year, month);
    let next = fetch_month(dashboard, session, ny, nm).await?;

    let deadlines = merge(next.deadlines, current.deadlines);
    let skips = merge(next.skips, current.skips);
    let deliveries = merge(next.deliveries, current.deliveries);

    Ok(resolve_outcomes(deadlines, &skips, &deliveries))
}

async fn fetch_month<D: Dashboard>(
    dashboard: &D,
    session: &D::Session,
    year: i32,
    month: u32,
) -> Result<MonthSchedule> {
    let html = dashboard
        .calendar_html(session, year, month)
        .await
        .with_context(|| format!("fetching the {year}-{month:02} calendar"))?;
    parse_calendar(&html, year, month)
        .with_context(|| format!("classifying the {year}-{month:02} calendar"))
}
