// SPDX-License-Identifier: MIT

//!
//! Broken down dates and timespans.
//!
//! Fields are always stored most significant first, so a full date is
//! `[year, month, day]` and a full timespan is `[years, months, days]`.  Fewer
//! fields means less precision (e.g. `[year]` or `[year, month]`).
//!

use serde::{Deserialize, Serialize};
use std::fmt;

/// A date broken out into calendar specific fields, most significant first
#[rustfmt::skip]
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[derive(derive_more::Deref, derive_more::From, derive_more::IntoIterator)]
#[into_iterator(owned, ref)]
#[serde(transparent)]
pub struct BrokenDate(Vec<i64>);

/// A timespan broken out into calendar specific fields, most significant first
#[rustfmt::skip]
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[derive(derive_more::Deref, derive_more::From, derive_more::IntoIterator)]
#[into_iterator(owned, ref)]
#[serde(transparent)]
pub struct BrokenTimespan(Vec<i64>);

impl BrokenDate {
    /// Create a new [`BrokenDate`]
    pub fn new(fields: Vec<i64>) -> Self {
        Self(fields)
    }

    /// A date with `len` fields all set to `value` (e.g. `[7, 7, 7]`)
    pub fn filled(len: usize, value: i64) -> Self {
        Self(vec![value; len])
    }

    /// The same date with the sign of the year flipped
    pub fn with_negated_year(&self) -> Self {
        let mut fields = self.0.clone();
        if let Some(year) = fields.first_mut() {
            *year = -*year;
        }
        Self(fields)
    }

    /// The year field
    pub fn year(&self) -> Option<i64> {
        self.0.first().copied()
    }

    /// The month field
    pub fn month(&self) -> Option<i64> {
        self.0.get(1).copied()
    }

    /// The day field
    pub fn day(&self) -> Option<i64> {
        self.0.get(2).copied()
    }

    /// Borrow the fields
    pub fn fields(&self) -> &[i64] {
        &self.0
    }
}

impl BrokenTimespan {
    /// Create a new [`BrokenTimespan`]
    pub fn new(fields: Vec<i64>) -> Self {
        Self(fields)
    }

    /// A timespan with `len` fields all set to `value`
    pub fn filled(len: usize, value: i64) -> Self {
        Self(vec![value; len])
    }

    /// Whole years
    pub fn years(&self) -> i64 {
        self.0.first().copied().unwrap_or_default()
    }

    /// Months beyond the whole years
    pub fn months(&self) -> i64 {
        self.0.get(1).copied().unwrap_or_default()
    }

    /// Days beyond the whole months
    pub fn days(&self) -> i64 {
        self.0.get(2).copied().unwrap_or_default()
    }

    /// Borrow the fields
    pub fn fields(&self) -> &[i64] {
        &self.0
    }
}

fn write_fields(f: &mut fmt::Formatter<'_>, fields: &[i64]) -> fmt::Result {
    write!(f, "[")?;
    for (index, field) in fields.iter().enumerate() {
        if index > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{field}")?;
    }
    write!(f, "]")
}

impl fmt::Display for BrokenDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_fields(f, &self.0)
    }
}

impl fmt::Display for BrokenTimespan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_fields(f, &self.0)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn accessors() {
        let date = BrokenDate::new(vec![1205, 3, 7]);
        assert_eq!(date.year(), Some(1205));
        assert_eq!(date.month(), Some(3));
        assert_eq!(date.day(), Some(7));
        assert_eq!(date.len(), 3);

        let date = BrokenDate::new(vec![-4]);
        assert_eq!(date.month(), None);
        assert_eq!(date.with_negated_year(), BrokenDate::new(vec![4]));

        let span = BrokenTimespan::new(vec![2, 11]);
        assert_eq!((span.years(), span.months(), span.days()), (2, 11, 0));
    }

    #[test]
    fn filled_and_display() {
        let date = BrokenDate::filled(3, 20).with_negated_year();
        assert_eq!(date.fields(), &[-20, 20, 20]);
        assert_eq!(date.to_string(), "[-20, 20, 20]");
        assert_eq!(BrokenTimespan::filled(2, -1).to_string(), "[-1, -1]");

        let total: i64 = (&BrokenTimespan::new(vec![1, 2, 3])).into_iter().sum();
        assert_eq!(total, 6);
    }

    #[test]
    fn serialisation() {
        let json = serde_json::to_string(&BrokenDate::new(vec![1, 2, 3])).unwrap();
        assert_eq!(json, "[1,2,3]");
        let span: BrokenTimespan = serde_json::from_str("[0,4]").unwrap();
        assert_eq!(span, BrokenTimespan::from(vec![0, 4]));
    }
}
