// SPDX-License-Identifier: MIT

//!
//! The TimelineBuilder date type (a year with an optional month, day, or
//! season)
//!

use crate::{JsonLoader, LoadFromJson};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use thiserror::Error;

/// Errors that can arise in relation to a [`Date`]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DateError {
    /// The day has been set without the month also being set
    #[error("Day `{0}` can't be set without also setting the month")]
    DayWithoutMonth(u16),

    /// A season has been set on a date that has a month
    #[error("Season `{0}` can only be set when the month isn't")]
    SeasonWithMonth(u8),
}

/// How much of a [`Date`] has been specified
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Precision {
    /// Only the year is known
    Year,

    /// The year and the season are known
    Season,

    /// The year and the month are known
    Month,

    /// The year, month, and day are known
    Day,
}

/// The TimelineBuilder date type
///
/// Nothing here bounds the values, because only a calendar's rules can say
/// whether (for example) month 13 exists.  A `month` of 0 means the date only
/// has year precision, a `day` of 0 (with a month) means it only has month
/// precision, and a `season` is only meaningful when there is no month.
///
/// A day without a month is never valid, no matter how the date was built
/// (see [`Date::is_valid`]).
#[derive(Serialize, Deserialize, Default, Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Date {
    year: i64,
    #[serde(default)]
    month: u16,
    #[serde(default)]
    day: u16,
    #[serde(default)]
    season: u8,
}

impl Date {
    /// Create a [`Date`] without checking it.  Use [`Date::is_valid`] before
    /// relying on it.
    pub const fn new(year: i64, month: u16, day: u16) -> Self {
        Date {
            year,
            month,
            day,
            season: 0,
        }
    }

    /// A date that only has year precision
    pub const fn year_only(year: i64) -> Self {
        Date::new(year, 0, 0)
    }

    /// A date that only has season precision (no month or day)
    pub const fn with_season(year: i64, season: u8) -> Self {
        Date {
            year,
            month: 0,
            day: 0,
            season,
        }
    }

    /// Create a new [`Date`] if the result will be valid
    pub fn from(year: i64, month: u16, day: u16, season: u8) -> Result<Date, DateError> {
        let mut date = Date::year_only(year);
        date.set_month(month)?;
        date.set_day(day)?;
        date.set_season(season)?;
        Ok(date)
    }

    /// Get the [`Date`]'s year
    pub fn year(&self) -> i64 {
        self.year
    }

    /// Get the [`Date`]'s month (0 if unspecified)
    pub fn month(&self) -> u16 {
        self.month
    }

    /// Get the [`Date`]'s day (0 if unspecified)
    pub fn day(&self) -> u16 {
        self.day
    }

    /// Get the [`Date`]'s season (0 if unspecified)
    pub fn season(&self) -> u8 {
        self.season
    }

    /// Update the [`Date`]'s year
    pub fn set_year(&mut self, year: i64) {
        self.year = year;
    }

    /// Update an existing [`Date`]'s month if the result will be valid
    pub fn set_month(&mut self, month: u16) -> Result<(), DateError> {
        let mut new_date = *self;
        new_date.month = month;
        new_date.check()?;
        *self = new_date;
        Ok(())
    }

    /// Update an existing [`Date`]'s day if the result will be valid
    pub fn set_day(&mut self, day: u16) -> Result<(), DateError> {
        let mut new_date = *self;
        new_date.day = day;
        new_date.check()?;
        *self = new_date;
        Ok(())
    }

    /// Update an existing [`Date`]'s season.  Seasons are only meaningful
    /// when there is no month, so this fails if the month is set.
    pub fn set_season(&mut self, season: u8) -> Result<(), DateError> {
        if season > 0 && self.has_month() {
            return Err(DateError::SeasonWithMonth(season));
        }
        self.season = season;
        Ok(())
    }

    /// Whether the date has a month
    pub fn has_month(&self) -> bool {
        self.month > 0
    }

    /// Whether the date has a day (which also requires a month)
    pub fn has_day(&self) -> bool {
        self.has_month() && self.day > 0
    }

    /// Whether the date has a season (which requires there be no month)
    pub fn has_season(&self) -> bool {
        !self.has_month() && self.season > 0
    }

    /// How much of the date is known
    pub fn precision(&self) -> Precision {
        if self.has_day() {
            Precision::Day
        } else if self.has_month() {
            Precision::Month
        } else if self.has_season() {
            Precision::Season
        } else {
            Precision::Year
        }
    }

    /// Check if the [`Date`] is structurally valid.  A day without a month is
    /// meaningless.
    pub fn is_valid(&self) -> bool {
        self.check().is_ok()
    }

    fn check(&self) -> Result<(), DateError> {
        if self.day > 0 && self.month == 0 {
            return Err(DateError::DayWithoutMonth(self.day));
        }
        Ok(())
    }
}

/// Orders by the fields, so a year sorts before its months and months sort
/// by number.  That is only chronological for dates without a season, as
/// when a season starts depends on the calendar.  Calendars provide their own
/// chronological comparison.
impl Ord for Date {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.year, self.month, self.day, self.season).cmp(&(
            other.year,
            other.month,
            other.day,
            other.season,
        ))
    }
}

impl PartialOrd for Date {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Calendar agnostic, e.g. `1205-3-7`, `1205-3`, `1205 (season 2)`, `1205`
impl fmt::Display for Date {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.precision() {
            Precision::Day => write!(f, "{}-{}-{}", self.year, self.month, self.day),
            Precision::Month => write!(f, "{}-{}", self.year, self.month),
            Precision::Season => write!(f, "{} (season {})", self.year, self.season),
            Precision::Year => write!(f, "{}", self.year),
        }
    }
}

impl LoadFromJson for Date {
    fn load_from_json(loader: &mut JsonLoader<'_>) -> Self {
        let date = Date {
            year: loader.i64("year"),
            month: loader.optional_integer("month"),
            day: loader.optional_integer("day"),
            season: loader.optional_integer("season"),
        };
        if let Err(error) = date.check() {
            loader.invalid("day", error.to_string());
        }
        date
    }
}
