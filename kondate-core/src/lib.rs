//! Core calendar engine for kondate.
//!
//! This crate turns rendered subscription-calendar markup into structured
//! schedule events and decides which menu-change deadlines are worth a
//! reminder:
//! - `event` - schedule event types and the fixed UTC+9 calendar zone
//! - `calendar` - per-month page classifier (markup -> events)
//! - `merge` - cross-month deduplication
//! - `resolve` - links each deadline to the fate of its order
//! - `remind` - horizon filter over resolved deadlines
//! - `menu` - menu page parser (markup -> menu items)
//!
//! Everything here is pure: no I/O, no clocks. Callers fetch pages and
//! inject `now`.

pub mod calendar;
pub mod error;
pub mod event;
pub mod menu;
pub mod merge;
pub mod remind;
pub mod resolve;

// Re-export the main types and operations at crate root for convenience
pub use calendar::{MonthSchedule, parse_calendar};
pub use error::{ScheduleError, ScheduleResult};
pub use event::{ScheduleEvent, ScheduleKind, jst, next_month};
pub use menu::{Menu, Nutrition, parse_menu_page};
pub use merge::merge;
pub use remind::due_for_reminder;
pub use resolve::resolve_outcomes;
