//! Error types for the kondate calendar engine.
//!
//! Only page-level failures surface here. Node-level problems (a malformed
//! day cell, an unparseable date) are dropped and logged where they occur,
//! so one bad cell never aborts a page.

use thiserror::Error;

/// Errors that abort processing of a whole calendar page.
#[derive(Error, Debug)]
pub enum ScheduleError {
    #[error("no schedule calendar found in the {year}-{month:02} page")]
    MissingCalendar { year: i32, month: u32 },
}

/// Result type alias for calendar engine operations.
pub type ScheduleResult<T> = Result<T, ScheduleError>;
