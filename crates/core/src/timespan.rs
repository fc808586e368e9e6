// SPDX-License-Identifier: MIT

//!
//! The TimelineBuilder timespan type
//!

use crate::JsonEnum;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// How a timespan is rounded to whole units for display
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RoundingMethod {
    /// Towards negative infinity
    #[default]
    Floor,

    /// To the nearest whole unit (halves round up)
    Nearest,

    /// Towards positive infinity
    Ceiling,

    /// Towards zero
    ToZero,

    /// Away from zero
    FromZero,
}

impl JsonEnum for RoundingMethod {
    fn from_code(code: i64) -> Option<Self> {
        match code {
            1 => Some(RoundingMethod::Floor),
            2 => Some(RoundingMethod::Nearest),
            3 => Some(RoundingMethod::Ceiling),
            4 => Some(RoundingMethod::ToZero),
            5 => Some(RoundingMethod::FromZero),
            _ => None,
        }
    }
}

/// A span of time between two dates
///
/// The day count is always non-negative.  Whether the span runs backwards
/// (i.e. the dates were compared in reverse chronological order) is recorded
/// by `past`.  The remaining fields break the span down for display, and are
/// all non-negative too.
#[derive(Debug, Default, Clone, Copy, Serialize, Deserialize)]
pub struct Timespan {
    /// Whether the compared dates were in reverse chronological order
    pub past: bool,

    /// Whole years
    pub years: u64,

    /// Months beyond whole years
    pub months: u64,

    /// Days beyond whole months
    pub days: u64,

    /// Seasons beyond whole years (only when both dates have season precision)
    pub seasons: u64,

    /// Weeks beyond whole years
    pub weeks_remaining_after_years: u64,

    /// Days beyond whole years
    pub days_remaining_after_years: u64,

    /// Weeks beyond whole months
    pub weeks_remaining_after_months: u64,

    /// Total months, rounded down
    pub total_months: u64,

    /// Total weeks, rounded down
    pub total_weeks: u64,

    /// Total days
    pub total_days: u64,

    /// Total seasons (only when both dates have season precision)
    pub total_seasons: u64,
}

impl Timespan {
    /// A span of the given number of days with no breakdown
    pub fn from_days(signed_days: i64) -> Self {
        Timespan {
            past: signed_days < 0,
            total_days: signed_days.unsigned_abs(),
            ..Default::default()
        }
    }

    /// Total days with the sign applied (negative when `past`)
    pub fn signed_total_days(&self) -> i64 {
        // Spans longer than i64::MAX days don't occur for i64 day offsets
        let days = self.total_days as i64;
        if self.past { -days } else { days }
    }

    /// Round the span to whole years, given how many days a year has.  The
    /// result is signed like [`Timespan::signed_total_days`].
    pub fn rounded_years(&self, method: RoundingMethod, days_per_year: u64) -> i64 {
        if days_per_year == 0 {
            return 0;
        }
        let days = self.signed_total_days();
        let per_year = i64::try_from(days_per_year).unwrap_or(i64::MAX);
        let floor = days.div_euclid(per_year);
        let remainder = days.rem_euclid(per_year);
        let ceiling = floor + i64::from(remainder > 0);
        match method {
            RoundingMethod::Floor => floor,
            RoundingMethod::Ceiling => ceiling,
            RoundingMethod::Nearest => {
                floor + i64::from(i128::from(remainder) * 2 >= i128::from(per_year))
            }
            RoundingMethod::ToZero => {
                if days >= 0 {
                    floor
                } else {
                    ceiling
                }
            }
            RoundingMethod::FromZero => {
                if days >= 0 {
                    ceiling
                } else {
                    floor
                }
            }
        }
    }
}

/// Two spans are equal if they cover the same (signed) number of days
impl PartialEq for Timespan {
    fn eq(&self, other: &Self) -> bool {
        self.signed_total_days() == other.signed_total_days()
    }
}

impl Eq for Timespan {}

impl Ord for Timespan {
    fn cmp(&self, other: &Self) -> Ordering {
        self.signed_total_days().cmp(&other.signed_total_days())
    }
}

impl PartialOrd for Timespan {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
