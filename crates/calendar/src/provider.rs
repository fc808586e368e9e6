// SPDX-License-Identifier: GPL-3.0-or-later

//!
//! The common interface to calendars, whichever way they do their arithmetic
//!

use crate::{CalendarError, CalendarFormatter, CalendarMath, CalendarRules, DateFormat};
use timeline_builder_core::{BrokenDate, BrokenTimespan, DateValue};

/// Everything the rest of the program needs from a calendar.  Dates are
/// passed around as day counts, and broken out into fields (most significant
/// first) only when a person needs to see or enter them.
pub trait CalendarMathProvider: Send + Sync {
    /// How many fields a full broken date has
    fn broken_date_field_count(&self) -> usize;

    /// How broken date fields are laid out for entry, e.g. `%2 %1 %0` for
    /// day, month, year (numbers are indices into the fields)
    fn date_format(&self) -> &str;

    /// How broken timespan fields are laid out for entry
    fn timespan_format(&self) -> &str;

    fn format_date(&self, date: DateValue) -> Result<String, CalendarError>;

    fn format_broken_date(&self, date: &BrokenDate) -> Result<String, CalendarError>;

    fn format_date_span(&self, from: DateValue, to: DateValue) -> Result<String, CalendarError>;

    fn format_timespan(&self, span: &BrokenTimespan) -> Result<String, CalendarError>;

    fn break_date(&self, date: DateValue) -> Result<BrokenDate, CalendarError>;

    fn break_date_span(&self, from: DateValue, to: DateValue)
    -> Result<BrokenTimespan, CalendarError>;

    fn combine_date(&self, date: &BrokenDate) -> Result<DateValue, CalendarError>;

    fn move_date(&self, date: DateValue, delta: &BrokenTimespan)
    -> Result<DateValue, CalendarError>;

    fn validate_broken_date(&self, date: &BrokenDate) -> Result<bool, CalendarError>;
}

/// A calendar that follows a set of [`CalendarRules`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NativeCalendar {
    rules: CalendarRules,
}

impl NativeCalendar {
    pub fn new(rules: CalendarRules) -> Self {
        NativeCalendar { rules }
    }

    pub fn rules(&self) -> &CalendarRules {
        &self.rules
    }

    pub fn math(&self) -> CalendarMath<'_> {
        CalendarMath::new(&self.rules)
    }

    pub fn formatter(&self) -> CalendarFormatter<'_> {
        CalendarFormatter::new(&self.rules)
    }
}

impl CalendarMathProvider for NativeCalendar {
    fn broken_date_field_count(&self) -> usize {
        3
    }

    fn date_format(&self) -> &str {
        match self.rules.date_format() {
            DateFormat::Mdy => "%1 %2 %0",
            DateFormat::Dmy => "%2 %1 %0",
            DateFormat::Ymd => "%0 %1 %2",
        }
    }

    fn timespan_format(&self) -> &str {
        "%0 years %1 months %2 days"
    }

    fn format_date(&self, date: DateValue) -> Result<String, CalendarError> {
        Ok(self.formatter().format_value(date))
    }

    fn format_broken_date(&self, date: &BrokenDate) -> Result<String, CalendarError> {
        Ok(self.formatter().format_broken_date(date))
    }

    fn format_date_span(&self, from: DateValue, to: DateValue) -> Result<String, CalendarError> {
        Ok(self.formatter().format_date_span(from, to))
    }

    fn format_timespan(&self, span: &BrokenTimespan) -> Result<String, CalendarError> {
        Ok(self.formatter().format_timespan(span))
    }

    fn break_date(&self, date: DateValue) -> Result<BrokenDate, CalendarError> {
        self.math().break_date(date)
    }

    fn break_date_span(
        &self,
        from: DateValue,
        to: DateValue,
    ) -> Result<BrokenTimespan, CalendarError> {
        self.math().break_date_span(from, to)
    }

    fn combine_date(&self, date: &BrokenDate) -> Result<DateValue, CalendarError> {
        self.math().combine_date(date)
    }

    fn move_date(
        &self,
        date: DateValue,
        delta: &BrokenTimespan,
    ) -> Result<DateValue, CalendarError> {
        self.math().move_date(date, delta)
    }

    fn validate_broken_date(&self, date: &BrokenDate) -> Result<bool, CalendarError> {
        Ok(self.math().validate_broken_date(date))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::rules::test::{earth_like, earth_like_with};
    use serde_json::json;

    #[test]
    fn native_calendar() {
        let calendar = NativeCalendar::new(earth_like());
        assert_eq!(calendar.broken_date_field_count(), 3);
        assert_eq!(calendar.date_format(), "%2 %1 %0");

        let broken = BrokenDate::new(vec![1205, 3, 7]);
        let value = calendar.combine_date(&broken).unwrap();
        assert_eq!(calendar.break_date(value).unwrap(), broken);
        assert_eq!(calendar.format_date(value).unwrap(), "7 March 1205");
        assert_eq!(calendar.format_broken_date(&broken).unwrap(), "7 March 1205");
        assert!(calendar.validate_broken_date(&broken).unwrap());
        assert!(!calendar.validate_broken_date(&BrokenDate::new(vec![0])).unwrap());

        let later = calendar
            .move_date(value, &BrokenTimespan::new(vec![1, 1, 1]))
            .unwrap();
        assert_eq!(calendar.break_date(later).unwrap().fields(), &[1206, 4, 8]);
        assert_eq!(
            calendar.break_date_span(value, later).unwrap().fields(),
            &[1, 1, 1]
        );
        assert_eq!(
            calendar.format_date_span(later, value).unwrap(),
            "1 year, 1 month, 1 day ago"
        );
        assert_eq!(
            calendar.format_timespan(&BrokenTimespan::new(vec![2])).unwrap(),
            "2 years"
        );
    }

    #[test]
    fn entry_layout_follows_the_date_format() {
        let calendar = NativeCalendar::new(earth_like_with(json!({"dateFormat": "ymd"})));
        assert_eq!(calendar.date_format(), "%0 %1 %2");
        let calendar = NativeCalendar::new(earth_like_with(json!({"dateFormat": "mdy"})));
        assert_eq!(calendar.date_format(), "%1 %2 %0");
    }
}
