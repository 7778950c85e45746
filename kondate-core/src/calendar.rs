//! Calendar page classifier.
//!
//! Takes one rendered monthly calendar view and extracts the day markers
//! for the three known entry kinds, converting each into a
//! [`ScheduleEvent`]. Markers that don't match a known kind are never
//! selected in the first place, so `Unknown` cannot leak into the output.
//!
//! A malformed cell (unparseable day number, no enclosing anchor,
//! non-numeric order id, unreadable delivery date) is dropped and logged;
//! its siblings still classify. Only the absence of the calendar wrapper
//! itself is fatal to the call.

use chrono::{DateTime, FixedOffset, TimeZone};
use log::info;
use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};
use thiserror::Error;

use crate::error::{ScheduleError, ScheduleResult};
use crate::event::{ScheduleEvent, ScheduleKind, jst};

// Day-marker selectors on the monthly calendar view
const MARKER_DEADLINE: &str = "dt.date--deadline";
const MARKER_SKIP: &str = "dt.date--plan-skip";
const MARKER_DELIVERY: &str = "dt.date--confirm-delivery";

/// Wrapper element the whole month view lives in. A page without it is not
/// a calendar page and aborts the call.
const CALENDAR_CONTAINER: &str = "div.schedule-calendar";

/// Descriptive text inside a deadline cell naming the delivery day.
const DEADLINE_DESC: &str = "p.schedule-daybox__desc";

static CONTAINER_SEL: Lazy<Selector> = Lazy::new(|| static_selector(CALENDAR_CONTAINER));
static DEADLINE_SEL: Lazy<Selector> = Lazy::new(|| static_selector(MARKER_DEADLINE));
static SKIP_SEL: Lazy<Selector> = Lazy::new(|| static_selector(MARKER_SKIP));
static DELIVERY_SEL: Lazy<Selector> = Lazy::new(|| static_selector(MARKER_DELIVERY));
static DESC_SEL: Lazy<Selector> = Lazy::new(|| static_selector(DEADLINE_DESC));

fn static_selector(css: &str) -> Selector {
    // Only called on the class constants above
    Selector::parse(css).expect("day-marker selectors are valid CSS")
}

/// Map a day-marker selector to its schedule kind.
///
/// Unrecognized markers map to `Unknown`; the classifier never feeds it
/// one.
pub fn kind_for_marker(marker: &str) -> ScheduleKind {
    match marker {
        MARKER_DEADLINE => ScheduleKind::Deadline,
        MARKER_SKIP => ScheduleKind::Skip,
        MARKER_DELIVERY => ScheduleKind::Delivery,
        _ => ScheduleKind::Unknown,
    }
}

/// Classifier output for one monthly view.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MonthSchedule {
    pub deadlines: Vec<ScheduleEvent>,
    pub skips: Vec<ScheduleEvent>,
    pub deliveries: Vec<ScheduleEvent>,
}

/// Extract all schedule events from one rendered monthly calendar page.
///
/// `year`/`month` are the month the page was requested for; day cells only
/// carry the day number, so the full date is reconstructed from them in
/// UTC+9. Deadline outcomes are left unresolved here; resolution runs
/// after the two month views have been merged.
pub fn parse_calendar(html: &str, year: i32, month: u32) -> ScheduleResult<MonthSchedule> {
    let doc = Html::parse_document(html);

    if doc.select(&CONTAINER_SEL).next().is_none() {
        return Err(ScheduleError::MissingCalendar { year, month });
    }

    Ok(MonthSchedule {
        deadlines: collect_markers(&doc, &DEADLINE_SEL, ScheduleKind::Deadline, year, month),
        skips: collect_markers(&doc, &SKIP_SEL, ScheduleKind::Skip, year, month),
        deliveries: collect_markers(&doc, &DELIVERY_SEL, ScheduleKind::Delivery, year, month),
    })
}

fn collect_markers(
    doc: &Html,
    marker: &Selector,
    kind: ScheduleKind,
    year: i32,
    month: u32,
) -> Vec<ScheduleEvent> {
    doc.select(marker)
        .filter_map(|cell| match schedule_event(cell, kind, year, month) {
            Ok(event) => Some(event),
            Err(err) => {
                info!("dropping {kind} cell in {year}-{month:02}: {err}");
                None
            }
        })
        .collect()
}

/// Reasons one day cell gets rejected. Never fatal to the page.
#[derive(Error, Debug)]
enum CellError {
    #[error("day number {0:?} is not a number")]
    BadDay(String),
    #[error("day {0} does not exist in {1}-{2:02}")]
    DayOutOfRange(u32, i32, u32),
    #[error("no enclosing anchor")]
    NoAnchor,
    #[error("order link {0:?} has no numeric trailing segment")]
    BadScheduleId(String),
    #[error("deadline cell has no descriptive text")]
    NoDeliveryDesc,
    #[error("descriptive text {0:?} does not name a month and day")]
    BadDeliveryDate(String),
}

fn schedule_event(
    cell: ElementRef<'_>,
    kind: ScheduleKind,
    year: i32,
    month: u32,
) -> Result<ScheduleEvent, CellError> {
    let day_text = cell.text().collect::<String>();
    let day_text = day_text.trim();
    let day: u32 = day_text
        .parse()
        .map_err(|_| CellError::BadDay(day_text.to_string()))?;
    let date = midnight(year, month, day).ok_or(CellError::DayOutOfRange(day, year, month))?;

    let link = enclosing_anchor(cell).ok_or(CellError::NoAnchor)?;
    let schedule_id = trailing_id(&link).ok_or_else(|| CellError::BadScheduleId(link.clone()))?;

    // A deadline without a readable delivery date cannot be reminded about,
    // so the whole cell is rejected rather than kept without one.
    let delivery_date = if kind == ScheduleKind::Deadline {
        Some(delivery_date(cell, year)?)
    } else {
        None
    };

    Ok(ScheduleEvent {
        schedule_id,
        kind,
        date,
        link,
        delivery_date,
        outcome: None,
    })
}

/// Midnight UTC+9 on the given calendar day, if the day exists.
fn midnight(year: i32, month: u32, day: u32) -> Option<DateTime<FixedOffset>> {
    jst().with_ymd_and_hms(year, month, day, 0, 0, 0).single()
}

/// `href` of the nearest enclosing `<a>` of a day marker.
fn enclosing_anchor(cell: ElementRef<'_>) -> Option<String> {
    cell.ancestors()
        .filter_map(ElementRef::wrap)
        .find(|el| el.value().name() == "a")
        .and_then(|a| a.value().attr("href"))
        .map(str::to_string)
}

/// Trailing numeric path segment of an order link, e.g.
/// `https://nosh.jp/mypage/11111/22222` -> `22222`.
fn trailing_id(link: &str) -> Option<i64> {
    link.rsplit('/').next()?.parse().ok()
}

/// Delivery date named by the descriptive text of a deadline cell.
///
/// The text reads like "5月12日\n変更締切"; whitespace is removed, the
/// label characters are trimmed, and the remaining "M月D日" (no year) is
/// combined with the page's year.
fn delivery_date(cell: ElementRef<'_>, year: i32) -> Result<DateTime<FixedOffset>, CellError> {
    let daybox = cell
        .ancestors()
        .filter_map(ElementRef::wrap)
        .find(|el| el.value().name() == "dl")
        .ok_or(CellError::NoDeliveryDesc)?;
    let desc = daybox
        .select(&DESC_SEL)
        .next()
        .ok_or(CellError::NoDeliveryDesc)?;

    let text: String = desc
        .text()
        .collect::<String>()
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect();
    let text = text.trim_matches(['変', '更', '締', '切']);

    let (m, d) = parse_month_day(text).ok_or_else(|| CellError::BadDeliveryDate(text.into()))?;
    midnight(year, m, d).ok_or_else(|| CellError::BadDeliveryDate(text.into()))
}

/// Parse "M月D日" into month and day numbers.
fn parse_month_day(s: &str) -> Option<(u32, u32)> {
    let (month, rest) = s.split_once('月')?;
    let day = rest.strip_suffix('日')?;
    Some((month.parse().ok()?, day.parse().ok()?))
}
