// SPDX-License-Identifier: GPL-3.0-or-later

//!
//! Writing dates and timespans out as text
//!

use crate::{
    CalendarError, CalendarMath, CalendarRules, DateFormat, MonthFormat, WeekdayFormat,
};
use timeline_builder_core::{BrokenDate, BrokenTimespan, Date, DateValue, Timespan};

pub const INVALID_DATE: &str = "INVALID DATE";
pub const INVALID_WEEKDAY: &str = "INVALID WEEKDAY";
pub const INVALID_MONTH: &str = "INVALID MONTH";
pub const INVALID_SEASON: &str = "INVALID SEASON";
pub const INVALID_TIMESPAN: &str = "INVALID TIMESPAN";

/// Formats dates according to a calendar's rules.  Formatting never fails:
/// anything that can't be written comes out as one of the `INVALID_*`
/// sentinels instead.
#[derive(Debug, Clone, Copy)]
pub struct CalendarFormatter<'r> {
    rules: &'r CalendarRules,
    math: CalendarMath<'r>,
}

impl<'r> CalendarFormatter<'r> {
    pub fn new(rules: &'r CalendarRules) -> Self {
        CalendarFormatter {
            rules,
            math: CalendarMath::new(rules),
        }
    }

    /// Write the date out, e.g. `Tuesday, 7 March 1205 AD`.  Dates with a
    /// season are written with the season's name in place of the month.
    ///
    /// Problems are looked for in order: a day without a month, then the
    /// month (or season), then the year and day, and the weekday last.  The
    /// first one found picks the sentinel.
    pub fn format_date(&self, date: &Date) -> String {
        if !date.is_valid() {
            return INVALID_DATE.to_owned();
        }

        let month = if date.has_month() {
            match self.month_text(date.month()) {
                Some(month) => month,
                None => return INVALID_MONTH.to_owned(),
            }
        } else if date.has_season() {
            match self.rules.season(usize::from(date.season())) {
                Some(season) => season.name.clone(),
                None => return INVALID_SEASON.to_owned(),
            }
        } else {
            String::new()
        };

        // Also refuses dates too far out to count the weekday from
        if self.math.date_to_value(date).is_err() {
            return INVALID_DATE.to_owned();
        }

        let weekday = if date.has_day() && self.rules.weekday_format() != WeekdayFormat::None {
            match self.weekday_text(date) {
                Some(weekday) => Some(weekday),
                None => return INVALID_WEEKDAY.to_owned(),
            }
        } else {
            None
        };

        let separator = if date.has_month() && self.rules.month_format() == MonthFormat::Number {
            "-"
        } else {
            " "
        };
        let year = self.year_text(date.year());
        let body = if date.has_day() {
            let day = date.day();
            match self.rules.date_format() {
                DateFormat::Dmy => format!("{day}{separator}{month}{separator}{year}"),
                DateFormat::Mdy => format!("{month}{separator}{day}{separator}{year}"),
                DateFormat::Ymd => format!("{year}{separator}{month}{separator}{day}"),
            }
        } else if month.is_empty() {
            year
        } else {
            match self.rules.date_format() {
                DateFormat::Dmy | DateFormat::Mdy => format!("{month}{separator}{year}"),
                DateFormat::Ymd => format!("{year}{separator}{month}"),
            }
        };

        match weekday {
            Some(weekday) => format!("{weekday}, {body}"),
            None => body,
        }
    }

    /// Write out the date at the day count
    pub fn format_value(&self, value: DateValue) -> String {
        match self.math.value_to_date(value) {
            Ok(date) => self.format_date(&date),
            Err(_) => INVALID_DATE.to_owned(),
        }
    }

    /// Write out the broken date (`[year]`, `[year, month]`, or
    /// `[year, month, day]`)
    pub fn format_broken_date(&self, date: &BrokenDate) -> String {
        match self.broken_to_date(date) {
            Ok(date) => self.format_date(&date),
            Err(_) => INVALID_DATE.to_owned(),
        }
    }

    /// Write out the span between two day counts, e.g. `1 year, 2 days`
    pub fn format_date_span(&self, from: DateValue, to: DateValue) -> String {
        match self.math.break_date_span(from, to) {
            Ok(span) => self.format_timespan(&span),
            Err(_) => INVALID_TIMESPAN.to_owned(),
        }
    }

    /// Write out a broken timespan.  A span whose fields are all zero or
    /// negative is written as positive, followed by `ago`.
    pub fn format_timespan(&self, span: &BrokenTimespan) -> String {
        if span.is_empty() || span.len() > 3 {
            return INVALID_TIMESPAN.to_owned();
        }
        let past = span.iter().any(|field| *field < 0) && span.iter().all(|field| *field <= 0);
        let field = |value: i64| if past { value.abs() } else { value };
        write_span(
            field(span.years()),
            field(span.months()),
            field(span.days()),
            past,
        )
    }

    /// Write out the years, months, and days of a timespan
    pub fn format_span(&self, span: &Timespan) -> String {
        write_span(
            span.years as i64,
            span.months as i64,
            span.days as i64,
            span.past,
        )
    }

    /// Write out a timespan rounded to whole years, e.g. `about 12 years`
    pub fn format_approximate(&self, span: &Timespan) -> String {
        let years = span.rounded_years(self.rules.rounding_method(), self.rules.days_in_normal_year());
        let ago = if years < 0 { " ago" } else { "" };
        let years = years.abs();
        format!("about {years} {}{ago}", plural(years, "year"))
    }

    fn month_text(&self, month: u16) -> Option<String> {
        let settings = self.rules.month(month)?;
        Some(match self.rules.month_format() {
            MonthFormat::Name => settings.name.clone(),
            MonthFormat::Abbreviation => settings.abbreviation.clone(),
            MonthFormat::Number => month.to_string(),
        })
    }

    fn weekday_text(&self, date: &Date) -> Option<String> {
        let weekday = self
            .math
            .weekday_of(date)
            .ok()
            .and_then(|index| self.rules.weekday(index))?;
        match self.rules.weekday_format() {
            WeekdayFormat::Full => Some(weekday.name.clone()),
            WeekdayFormat::Abbreviated => Some(weekday.abbreviation.clone()),
            WeekdayFormat::None => None,
        }
    }

    fn year_text(&self, year: i64) -> String {
        let year = if self.rules.hide_year_sign() {
            year.unsigned_abs().to_string()
        } else {
            year.to_string()
        };
        let affix = self.rules.year_affix();
        if affix.is_empty() {
            year
        } else if self.rules.year_prefix() {
            format!("{affix} {year}")
        } else {
            format!("{year} {affix}")
        }
    }

    fn broken_to_date(&self, date: &BrokenDate) -> Result<Date, CalendarError> {
        self.math.combine_date(date)?;
        let field = |value: Option<i64>| u16::try_from(value.unwrap_or_default()).unwrap_or_default();
        Ok(Date::new(
            date.year().unwrap_or_default(),
            field(date.month()),
            field(date.day()),
        ))
    }
}

fn plural(count: i64, unit: &str) -> String {
    if count == 1 {
        unit.to_owned()
    } else {
        format!("{unit}s")
    }
}

fn write_span(years: i64, months: i64, days: i64, past: bool) -> String {
    let parts: Vec<String> = [(years, "year"), (months, "month"), (days, "day")]
        .into_iter()
        .filter(|(count, _)| *count != 0)
        .map(|(count, unit)| format!("{count} {}", plural(count, unit)))
        .collect();
    let text = if parts.is_empty() {
        "0 days".to_owned()
    } else {
        parts.join(", ")
    };
    if past { format!("{text} ago") } else { text }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::rules::test::{earth_like, earth_like_with};
    use serde_json::json;
    use timeline_builder_core::{date, season_date};

    #[test]
    fn orders_and_separators() {
        let date = date!(1205, 3, 7);

        let rules = earth_like();
        assert_eq!(CalendarFormatter::new(&rules).format_date(&date), "7 March 1205");

        let rules = earth_like_with(json!({"dateFormat": "mdy", "monthFormat": "abbreviation"}));
        assert_eq!(CalendarFormatter::new(&rules).format_date(&date), "Mar 7 1205");

        let rules = earth_like_with(json!({"dateFormat": "ymd", "monthFormat": "number"}));
        let formatter = CalendarFormatter::new(&rules);
        assert_eq!(formatter.format_date(&date), "1205-3-7");
        assert_eq!(formatter.format_date(&date!(1205, 3)), "1205-3");
        assert_eq!(formatter.format_date(&Date::year_only(1205)), "1205");
    }

    #[test]
    fn partial_dates() {
        let rules = earth_like();
        let formatter = CalendarFormatter::new(&rules);
        assert_eq!(formatter.format_date(&Date::new(1205, 3, 0)), "March 1205");
        assert_eq!(formatter.format_date(&Date::year_only(-40)), "-40");
        assert_eq!(formatter.format_date(&season_date!(1205, 2)), "Summer 1205");
    }

    #[test]
    fn weekdays() {
        let rules = earth_like_with(json!({"weekdayFormat": "full"}));
        let formatter = CalendarFormatter::new(&rules);
        // Day 0 is a Monday
        assert_eq!(formatter.format_value(DateValue::EPOCH), "Monday, 1 January 1");
        assert_eq!(formatter.format_value(DateValue::new(-1)), "Sunday, 31 December -1");
        // Weekdays only appear on dates with a day
        assert_eq!(formatter.format_date(&Date::new(1, 1, 0)), "January 1");

        let rules = earth_like_with(json!({"weekdayFormat": "abbreviated", "startDateDay": 4}));
        let formatter = CalendarFormatter::new(&rules);
        assert_eq!(formatter.format_value(DateValue::new(2)), "Sun, 3 January 1");
    }

    #[test]
    fn year_affix_and_sign() {
        let date = date!(-300, 1, 2);
        let rules = earth_like_with(json!({"yearAffix": "BCE", "hideYearSign": true}));
        assert_eq!(CalendarFormatter::new(&rules).format_date(&date), "2 January 300 BCE");

        let rules = earth_like_with(json!({"yearAffix": "AD", "yearPrefix": true}));
        assert_eq!(CalendarFormatter::new(&rules).format_date(&date!(12)), "AD 12");
    }

    #[test]
    fn sentinels() {
        let rules = earth_like();
        let formatter = CalendarFormatter::new(&rules);
        assert_eq!(formatter.format_date(&Date::new(1205, 0, 7)), INVALID_DATE);
        assert_eq!(formatter.format_date(&Date::new(1205, 13, 7)), INVALID_MONTH);
        assert_eq!(formatter.format_date(&Date::new(1205, 13, 0)), INVALID_MONTH);
        assert_eq!(formatter.format_date(&Date::with_season(1205, 5)), INVALID_SEASON);
        assert_eq!(formatter.format_date(&Date::new(1205, 2, 30)), INVALID_DATE);
        assert_eq!(formatter.format_date(&Date::year_only(0)), INVALID_DATE);
        assert_eq!(formatter.format_date(&Date::year_only(i64::MAX)), INVALID_DATE);
        assert_eq!(
            formatter.format_broken_date(&BrokenDate::new(vec![i64::MIN, 1, 1])),
            INVALID_DATE
        );
        assert_eq!(
            formatter.format_timespan(&BrokenTimespan::new(vec![])),
            INVALID_TIMESPAN
        );
        assert_eq!(
            formatter.format_broken_date(&BrokenDate::new(vec![1, 2, 3, 4])),
            INVALID_DATE
        );

        let rules = earth_like_with(json!({"weekdays": [], "weekdayFormat": "full"}));
        let formatter = CalendarFormatter::new(&rules);
        assert_eq!(formatter.format_date(&Date::new(1205, 3, 7)), INVALID_WEEKDAY);
        assert_eq!(formatter.format_date(&Date::new(1205, 3, 0)), "March 1205");
    }

    #[test]
    fn broken_dates() {
        let rules = earth_like();
        let formatter = CalendarFormatter::new(&rules);
        assert_eq!(
            formatter.format_broken_date(&BrokenDate::new(vec![-3, 12, 1])),
            "1 December -3"
        );
        assert_eq!(formatter.format_broken_date(&BrokenDate::new(vec![9, 6])), "June 9");
        assert_eq!(formatter.format_broken_date(&BrokenDate::new(vec![9])), "9");
        assert_eq!(
            formatter.format_broken_date(&BrokenDate::new(vec![9, 2, 29])),
            INVALID_DATE
        );
    }

    #[test]
    fn timespans() {
        let rules = earth_like();
        let formatter = CalendarFormatter::new(&rules);
        assert_eq!(
            formatter.format_timespan(&BrokenTimespan::new(vec![1, 2, 3])),
            "1 year, 2 months, 3 days"
        );
        assert_eq!(
            formatter.format_timespan(&BrokenTimespan::new(vec![0, 1])),
            "1 month"
        );
        assert_eq!(
            formatter.format_timespan(&BrokenTimespan::new(vec![0, -4, -23])),
            "4 months, 23 days ago"
        );
        assert_eq!(
            formatter.format_timespan(&BrokenTimespan::filled(3, 0)),
            "0 days"
        );

        let math = CalendarMath::new(&rules);
        let from = math.date_to_value(&Date::new(1, 10, 15)).unwrap();
        let to = math.date_to_value(&Date::new(2, 3, 10)).unwrap();
        assert_eq!(formatter.format_date_span(from, to), "4 months, 23 days");

        let span = math
            .days_between(&Date::new(2, 3, 10), &Date::new(1, 10, 15))
            .unwrap();
        assert_eq!(formatter.format_span(&span), "4 months, 23 days ago");
    }

    #[test]
    fn approximate_timespans() {
        let rules = earth_like();
        let formatter = CalendarFormatter::new(&rules);
        assert_eq!(formatter.format_approximate(&Timespan::from_days(800)), "about 2 years");
        assert_eq!(formatter.format_approximate(&Timespan::from_days(400)), "about 1 year");
        assert_eq!(formatter.format_approximate(&Timespan::from_days(-400)), "about 2 years ago");

        let rules = earth_like_with(json!({"roundingMethod": "toZero"}));
        let formatter = CalendarFormatter::new(&rules);
        assert_eq!(formatter.format_approximate(&Timespan::from_days(-400)), "about 1 year ago");
        assert_eq!(formatter.format_approximate(&Timespan::from_days(100)), "about 0 years");
    }
}
