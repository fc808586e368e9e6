// SPDX-License-Identifier: GPL-3.0-or-later

//!
//! Errors arising from calendar arithmetic
//!

use crate::ModuleError;
use thiserror::Error;
use timeline_builder_core::{BrokenDate, BrokenTimespan, Date};

/// Errors that can arise when working with dates in a calendar
#[derive(Error, Debug)]
pub enum CalendarError {
    /// A date has a day but no month
    #[error("Date `{0}` has a day but no month")]
    DayWithoutMonth(Date),

    /// The year doesn't exist (i.e. year 0 in a calendar without one)
    #[error("Year `{0}` doesn't exist in this calendar")]
    InvalidYear(i64),

    /// The month isn't one of the calendar's months
    #[error("Month `{0}` doesn't exist in this calendar")]
    InvalidMonth(i64),

    /// The day is beyond the end of the month (or before its start)
    #[error("Day `{day}` doesn't exist in month `{month}` of year `{year}`")]
    InvalidDay { year: i64, month: i64, day: i64 },

    /// The season isn't one of the calendar's seasons
    #[error("Season `{0}` doesn't exist in this calendar")]
    InvalidSeason(i64),

    /// A weekday was asked for, but the calendar has none
    #[error("The calendar has no weekdays")]
    NoWeekdays,

    /// A weekday was asked for a date with neither a month nor a day
    #[error("Date `{0}` has no month or day, so has no weekday")]
    NoMonth(Date),

    /// A broken date doesn't have between 1 and 3 fields
    #[error("Broken date `{0}` has the wrong number of fields")]
    InvalidBrokenDate(BrokenDate),

    /// A broken timespan doesn't have between 1 and 3 fields
    #[error("Timespan `{0}` has the wrong number of fields")]
    InvalidTimespan(BrokenTimespan),

    /// The date (or the span to it) is too far from the epoch to count
    #[error("Date is too far from the epoch to count")]
    OutOfRange,

    /// The calendar's years have no days, so dates can't be broken out
    #[error("The calendar's years have no days")]
    EmptyYear,

    /// A calendar script failed
    #[error(transparent)]
    Module(#[from] ModuleError),
}
