// SPDX-License-Identifier: MIT

//!
//! The TimelineBuilder day count type
//!

/// A point in time, stored only as the number of days since the epoch (day 0)
/// of whichever calendar it belongs to.
///
/// The value carries no calendar information, so any `i64` is a valid
/// `DateValue`.  Only a calendar can say what it looks like broken down.
#[rustfmt::skip]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[derive(derive_more::Display, derive_more::From, derive_more::Into, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct DateValue(i64);

impl DateValue {
    /// Day 0
    pub const EPOCH: DateValue = DateValue(0);

    /// Create a new [`DateValue`]
    pub const fn new(days: i64) -> Self {
        Self(days)
    }

    /// Number of days since the epoch (negative for days before it)
    pub const fn days(&self) -> i64 {
        self.0
    }

    /// The date the given number of days later (or earlier, if negative),
    /// or `None` if that's beyond the range of a [`DateValue`]
    pub const fn checked_offset(self, days: i64) -> Option<Self> {
        match self.0.checked_add(days) {
            Some(days) => Some(Self(days)),
            None => None,
        }
    }

    /// Signed number of days from `self` to `other`, or `None` if there are
    /// too many to count
    pub const fn checked_days_until(self, other: DateValue) -> Option<i64> {
        other.0.checked_sub(self.0)
    }
}
