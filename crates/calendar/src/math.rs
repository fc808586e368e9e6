// SPDX-License-Identifier: GPL-3.0-or-later

//!
//! Day counting for calendars defined by [`CalendarRules`].
//!
//! Internally every year is counted continuously (see
//! [`CalendarRules::year_to_index`]) so that calendars without a year 0 need
//! no special cases.  Day 0 is day 1 of month 1 of year 1.
//!
//! Day counts are worked out as `i128`, which no `i64` year can overflow, and
//! only narrowed when they leave the engine.  Anything that doesn't fit is
//! [`CalendarError::OutOfRange`].
//!

use crate::{CalendarError, CalendarRules};
use std::cmp::Ordering;
use timeline_builder_core::{BrokenDate, BrokenTimespan, Date, DateValue, Timespan};

/// The date at day 0
pub const EPOCH_DATE: Date = Date::new(1, 1, 1);

/// A date resolved to a single day, with the year counted continuously
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
struct DayPosition {
    index: i64,
    month: u16,
    day: u16,
}

/// Date arithmetic for one set of rules
#[derive(Debug, Clone, Copy)]
pub struct CalendarMath<'r> {
    rules: &'r CalendarRules,
}

impl<'r> CalendarMath<'r> {
    pub fn new(rules: &'r CalendarRules) -> Self {
        CalendarMath { rules }
    }

    pub fn rules(&self) -> &'r CalendarRules {
        self.rules
    }

    /// Check that the date exists in this calendar
    pub fn check_date(&self, date: &Date) -> Result<(), CalendarError> {
        self.check_rules()?;
        if !date.is_valid() {
            return Err(CalendarError::DayWithoutMonth(*date));
        }
        if !self.rules.year_exists(date.year()) {
            return Err(CalendarError::InvalidYear(date.year()));
        }
        if date.has_month() {
            // Months with no days this year (e.g. leap year only months)
            // don't exist this year
            let length = self.rules.days_in_month(date.year(), date.month());
            if length == 0 {
                return Err(CalendarError::InvalidMonth(i64::from(date.month())));
            }
            if date.has_day() && date.day() > length {
                return Err(CalendarError::InvalidDay {
                    year: date.year(),
                    month: i64::from(date.month()),
                    day: i64::from(date.day()),
                });
            }
        } else if date.has_season() && self.rules.season(usize::from(date.season())).is_none() {
            return Err(CalendarError::InvalidSeason(i64::from(date.season())));
        }
        Ok(())
    }

    /// Chronological order of two dates, each taken as its first day (a
    /// season date as the day its season starts).  Dates that start on the
    /// same day are equal, whatever their precision.
    ///
    /// This is the order [`CalendarMath::days_between`] agrees with.  The
    /// `Ord` of [`Date`] only compares the fields.
    pub fn compare(&self, a: &Date, b: &Date) -> Result<Ordering, CalendarError> {
        self.check_date(a)?;
        self.check_date(b)?;
        Ok(self.resolve(a).cmp(&self.resolve(b)))
    }

    /// Days from the start of the date's year to the date
    pub fn days_since_year_start(&self, date: &Date) -> Result<u64, CalendarError> {
        self.check_date(date)?;
        narrow(self.day_of_year(self.resolve(date)))
    }

    /// Days from the date to the start of the following year
    pub fn days_until_year_end(&self, date: &Date) -> Result<u64, CalendarError> {
        self.check_date(date)?;
        let position = self.resolve(date);
        narrow(self.year_length(position.index) - self.day_of_year(position))
    }

    /// The span from one date to another.  Dates without a day are treated
    /// as their first day (a season starts on its start date).  If `to` comes
    /// before `from`, the span is the same as from `to` to `from` but marked
    /// as past.
    pub fn days_between(&self, from: &Date, to: &Date) -> Result<Timespan, CalendarError> {
        self.check_date(from)?;
        self.check_date(to)?;
        let (start, end) = (self.resolve(from), self.resolve(to));
        let past = start > end;
        let (earlier, later, earlier_date, later_date) = if past {
            (end, start, to, from)
        } else {
            (start, end, from, to)
        };

        // Whole years from the start of the earlier date's year to the start of
        // the later date's year, then move to the days themselves
        let whole_years = i128::from(later.index) - i128::from(earlier.index);
        let leap_years = self.leap_years_between(earlier.index, later.index);
        let total_days = whole_years * self.normal_year_length()
            + leap_years * self.leap_days()
            - self.day_of_year(earlier)
            + self.day_of_year(later);
        // The total has to be signable as a day count
        let total_days: i64 = narrow(total_days)?;

        let mut span = self.decompose(earlier, later)?;
        span.past = past;
        span.total_days = total_days.unsigned_abs();

        let weekdays = self.rules.weekday_count() as u64;
        if weekdays > 0 {
            span.total_weeks = span.total_days / weekdays;
            span.weeks_remaining_after_years = span.days_remaining_after_years / weekdays;
            span.weeks_remaining_after_months = span.days / weekdays;
        }

        let seasons = self.rules.season_count() as i128;
        if earlier_date.has_season() && later_date.has_season() && seasons > 0 {
            let total_seasons = whole_years * seasons + i128::from(later_date.season())
                - i128::from(earlier_date.season());
            if total_seasons > 0 {
                span.total_seasons = narrow(total_seasons)?;
                span.seasons = narrow(total_seasons % seasons)?;
            }
        }
        Ok(span)
    }

    /// The span from day 1 of month 1 of year 1 to the date
    pub fn days_since_epoch(&self, date: &Date) -> Result<Timespan, CalendarError> {
        self.days_between(&EPOCH_DATE, date)
    }

    /// The span from the start of the era (the start override, if there is
    /// one) to the date
    pub fn days_since_era_start(&self, date: &Date) -> Result<Timespan, CalendarError> {
        match self.rules.start_override() {
            Some(start) => self.days_between(start, date),
            None => self.days_since_epoch(date),
        }
    }

    /// Index (from 0) of the date's weekday
    pub fn weekday_of(&self, date: &Date) -> Result<usize, CalendarError> {
        self.check_date(date)?;
        let weekdays = self.rules.weekday_count() as i128;
        if weekdays == 0 {
            return Err(CalendarError::NoWeekdays);
        }
        if !date.has_month() {
            return Err(CalendarError::NoMonth(*date));
        }
        let days = i128::from(self.days_since_era_start(date)?.signed_total_days());
        narrow((days + self.rules.epoch_weekday() as i128).rem_euclid(weekdays))
    }

    /// Days in the season (counting both its first and last day) when it
    /// starts in the given year
    pub fn days_in_season(&self, season: usize, year: i64) -> Result<u64, CalendarError> {
        self.check_rules()?;
        let settings = self
            .rules
            .season(season)
            .ok_or(CalendarError::InvalidSeason(season as i64))?;
        if !self.rules.year_exists(year) {
            return Err(CalendarError::InvalidYear(year));
        }
        let index = self.rules.year_to_index(year);
        let start = self.clamped(index, settings.start.month(), settings.start.day());
        let ends_next_year =
            (settings.end.month(), settings.end.day()) < (settings.start.month(), settings.start.day());
        let end_index = if ends_next_year {
            index.checked_add(1).ok_or(CalendarError::OutOfRange)?
        } else {
            index
        };
        let end = self.clamped(end_index, settings.end.month(), settings.end.day());
        narrow(self.days_before(end) - self.days_before(start) + 1)
    }

    /// Number (from 1) of the season the date falls in, if any.  Dates with
    /// only a year have no season.
    pub fn season_of(&self, date: &Date) -> Result<Option<usize>, CalendarError> {
        self.check_date(date)?;
        if date.has_season() {
            return Ok(Some(usize::from(date.season())));
        }
        if !date.has_month() {
            return Ok(None);
        }
        let here = (date.month(), date.day().max(1));
        let season = self.rules.seasons().iter().position(|season| {
            let start = (season.start.month(), season.start.day());
            let end = (season.end.month(), season.end.day());
            if start <= end {
                start <= here && here <= end
            } else {
                here >= start || here <= end
            }
        });
        Ok(season.map(|index| index + 1))
    }

    /// The day count of the date (its first day, for dates without a day)
    pub fn date_to_value(&self, date: &Date) -> Result<DateValue, CalendarError> {
        self.check_date(date)?;
        self.value_of(self.resolve(date))
    }

    /// The full date at the day count
    pub fn value_to_date(&self, value: DateValue) -> Result<Date, CalendarError> {
        let position = self.position_of(value)?;
        Ok(Date::new(
            self.year_of(position.index)?,
            position.month,
            position.day,
        ))
    }

    /// Whether the broken date (`[year]`, `[year, month]`, or
    /// `[year, month, day]`) exists in this calendar
    pub fn validate_broken_date(&self, date: &BrokenDate) -> bool {
        self.broken_position(date).is_ok()
    }

    /// The day count of the broken date (its first day, for partial dates)
    pub fn combine_date(&self, date: &BrokenDate) -> Result<DateValue, CalendarError> {
        self.value_of(self.broken_position(date)?)
    }

    /// Break the day count into `[year, month, day]`
    pub fn break_date(&self, value: DateValue) -> Result<BrokenDate, CalendarError> {
        let position = self.position_of(value)?;
        Ok(BrokenDate::new(vec![
            self.year_of(position.index)?,
            i64::from(position.month),
            i64::from(position.day),
        ]))
    }

    /// The span between two day counts as `[years, months, days]`, all
    /// negated when `to` comes before `from`
    pub fn break_date_span(
        &self,
        from: DateValue,
        to: DateValue,
    ) -> Result<BrokenTimespan, CalendarError> {
        let span = self.days_between(&self.value_to_date(from)?, &self.value_to_date(to)?)?;
        let sign = if span.past { -1 } else { 1 };
        let field = |count: u64| {
            i64::try_from(count)
                .map(|count| sign * count)
                .map_err(|_| CalendarError::OutOfRange)
        };
        Ok(BrokenTimespan::new(vec![
            field(span.years)?,
            field(span.months)?,
            field(span.days)?,
        ]))
    }

    /// Move the day count by `[years, months, days]`.  Years and months move
    /// the date field by field (keeping the day within the new month), then
    /// the days are added.
    pub fn move_date(
        &self,
        value: DateValue,
        delta: &BrokenTimespan,
    ) -> Result<DateValue, CalendarError> {
        if delta.is_empty() || delta.len() > 3 {
            return Err(CalendarError::InvalidTimespan(delta.clone()));
        }
        let position = self.position_of(value)?;
        let moved = self.advance(position, delta.years(), delta.months())?;
        self.value_of(moved)?
            .checked_offset(delta.days())
            .ok_or(CalendarError::OutOfRange)
    }

    fn check_rules(&self) -> Result<(), CalendarError> {
        if self.rules.month_count() == 0 || self.rules.days_in_normal_year() == 0 {
            return Err(CalendarError::EmptyYear);
        }
        Ok(())
    }

    fn year_of(&self, index: i64) -> Result<i64, CalendarError> {
        self.rules
            .index_to_year(index)
            .ok_or(CalendarError::OutOfRange)
    }

    fn normal_year_length(&self) -> i128 {
        i128::from(self.rules.days_in_normal_year())
    }

    fn leap_days(&self) -> i128 {
        i128::from(self.rules.leap_days_per_year())
    }

    fn year_length(&self, index: i64) -> i128 {
        if self.rules.is_leap_index(index) {
            self.normal_year_length() + self.leap_days()
        } else {
            self.normal_year_length()
        }
    }

    fn month_length(&self, index: i64, month: u16) -> u16 {
        self.rules.month_length(self.rules.is_leap_index(index), month)
    }

    /// Number of leap years in `[first, last)`
    fn leap_years_between(&self, first: i64, last: i64) -> i128 {
        let frequency = i128::from(self.rules.leap_year_frequency());
        if frequency == 0 || last <= first {
            return 0;
        }
        let (first, last) = (i128::from(first), i128::from(last));
        let mut leap_years = (last - first) / frequency;
        // One more if the range wraps past a leap year in the cycle
        if (first - 1).rem_euclid(frequency) > (last - 1).rem_euclid(frequency) {
            leap_years += 1;
        }
        leap_years
    }

    /// Days from day 0 to the start of the year
    fn days_before_year(&self, index: i64) -> i128 {
        let frequency = i128::from(self.rules.leap_year_frequency());
        let years = i128::from(index) - 1;
        let leap_years = if frequency == 0 {
            0
        } else {
            years.div_euclid(frequency)
        };
        years * self.normal_year_length() + leap_years * self.leap_days()
    }

    fn day_of_year(&self, position: DayPosition) -> i128 {
        let before: i128 = (1..position.month)
            .map(|month| i128::from(self.month_length(position.index, month)))
            .sum();
        before + i128::from(position.day) - 1
    }

    fn days_before(&self, position: DayPosition) -> i128 {
        self.days_before_year(position.index) + self.day_of_year(position)
    }

    fn value_of(&self, position: DayPosition) -> Result<DateValue, CalendarError> {
        narrow(self.days_before(position)).map(DateValue::new)
    }

    /// The month and day in the year, with the day pulled back into the month
    /// if the month is shorter this year
    fn clamped(&self, index: i64, month: u16, day: u16) -> DayPosition {
        DayPosition {
            index,
            month,
            day: day.min(self.month_length(index, month)).max(1),
        }
    }

    /// Resolve a checked date to its first day
    fn resolve(&self, date: &Date) -> DayPosition {
        let index = self.rules.year_to_index(date.year());
        if date.has_month() {
            return DayPosition {
                index,
                month: date.month(),
                day: date.day().max(1),
            };
        }
        match self.rules.season(usize::from(date.season())) {
            Some(season) if date.has_season() => {
                self.clamped(index, season.start.month(), season.start.day())
            }
            _ => DayPosition {
                index,
                month: 1,
                day: 1,
            },
        }
    }

    fn broken_position(&self, date: &BrokenDate) -> Result<DayPosition, CalendarError> {
        self.check_rules()?;
        let Some(year) = date.year().filter(|_| date.len() <= 3) else {
            return Err(CalendarError::InvalidBrokenDate(date.clone()));
        };
        if !self.rules.year_exists(year) {
            return Err(CalendarError::InvalidYear(year));
        }
        let index = self.rules.year_to_index(year);
        let Some(month) = date.month() else {
            return Ok(DayPosition {
                index,
                month: 1,
                day: 1,
            });
        };
        let invalid_month = CalendarError::InvalidMonth(month);
        let month = u16::try_from(month)
            .ok()
            .filter(|month| self.rules.month(*month).is_some())
            .ok_or(invalid_month)?;
        let length = self.month_length(index, month);
        if length == 0 {
            return Err(CalendarError::InvalidMonth(i64::from(month)));
        }
        let day = match date.day() {
            None => 1,
            Some(day) => u16::try_from(day)
                .ok()
                .filter(|day| *day >= 1 && *day <= length)
                .ok_or(CalendarError::InvalidDay {
                    year,
                    month: i64::from(month),
                    day,
                })?,
        };
        Ok(DayPosition { index, month, day })
    }

    fn position_of(&self, value: DateValue) -> Result<DayPosition, CalendarError> {
        self.check_rules()?;
        let days = i128::from(value.days());
        let normal = self.normal_year_length();
        let frequency = i128::from(self.rules.leap_year_frequency());

        // Jump straight to the start of the leap cycle, which always holds
        // exactly one leap year (its last)
        let (index, mut remaining) = if frequency > 0 {
            let cycle = frequency * normal + self.leap_days();
            (1 + days.div_euclid(cycle) * frequency, days.rem_euclid(cycle))
        } else {
            (1 + days.div_euclid(normal), days.rem_euclid(normal))
        };
        let mut index: i64 = narrow(index)?;
        loop {
            let length = self.year_length(index);
            if remaining < length {
                break;
            }
            remaining -= length;
            index = index.checked_add(1).ok_or(CalendarError::OutOfRange)?;
        }

        let mut month = 1;
        loop {
            let length = i128::from(self.month_length(index, month));
            if remaining < length {
                break;
            }
            remaining -= length;
            month += 1;
        }
        Ok(DayPosition {
            index,
            month,
            day: narrow(remaining + 1)?,
        })
    }

    /// Move by whole years and months, keeping the day within the new month
    fn advance(
        &self,
        position: DayPosition,
        years: i64,
        months: i64,
    ) -> Result<DayPosition, CalendarError> {
        let month_count = self.rules.month_count() as i128;
        let zero_based = i128::from(position.month) - 1 + i128::from(months);
        let index =
            i128::from(position.index) + i128::from(years) + zero_based.div_euclid(month_count);
        let month = narrow(zero_based.rem_euclid(month_count) + 1)?;
        Ok(self.clamped(narrow(index)?, month, position.day))
    }

    /// Fill in the years, months, and days between two ordered positions
    fn decompose(&self, earlier: DayPosition, later: DayPosition) -> Result<Timespan, CalendarError> {
        let month_count = self.rules.month_count() as i64;

        let mut years = i128::from(later.index) - i128::from(earlier.index);
        if (later.month, later.day) < (earlier.month, earlier.day) {
            years -= 1;
        }
        let years: i64 = narrow(years)?;
        let mut months = i64::from(later.month) - i64::from(earlier.month);
        if later.day < earlier.day {
            months -= 1;
        }
        let months = months.rem_euclid(month_count);

        let end = self.days_before(later);
        let after_years = self.days_before(self.advance(earlier, years, 0)?);
        let after_months = self.days_before(self.advance(earlier, years, months)?);

        Ok(Timespan {
            years: narrow(i128::from(years))?,
            months: narrow(i128::from(months))?,
            days: narrow((end - after_months).abs())?,
            days_remaining_after_years: narrow((end - after_years).abs())?,
            total_months: narrow(i128::from(years) * i128::from(month_count) + i128::from(months))?,
            ..Default::default()
        })
    }
}

/// Narrow a day (or year, or month) count worked out as `i128`
fn narrow<T: TryFrom<i128>>(value: i128) -> Result<T, CalendarError> {
    T::try_from(value).map_err(|_| CalendarError::OutOfRange)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::rules::test::{earth_like, earth_like_with};
    use serde_json::json;

    /// Ten months of 30 days, and a thirteenth month that only exists in
    /// leap years
    fn intercalary() -> CalendarRules {
        let mut months: Vec<_> = (1..=10)
            .map(|month| json!({"name": format!("M{month}"), "abbreviation": format!("m{month}"), "days": 30, "leapDays": 0}))
            .collect();
        months.push(json!({"name": "Leap", "abbreviation": "L", "days": 0, "leapDays": 5}));
        earth_like_with(json!({"months": months, "leapYearFreq": 3, "seasons": []}))
    }

    fn every_rule_set() -> Vec<CalendarRules> {
        vec![
            earth_like(),
            earth_like_with(json!({"hasYear0": true})),
            earth_like_with(json!({"leapYearFreq": 0})),
            intercalary(),
        ]
    }

    /// Year lengths added up one at a time
    fn days_from_year_one(rules: &CalendarRules, year: i64) -> i64 {
        let to = rules.year_to_index(year);
        let length = |index: i64| {
            let leap = rules.is_leap_index(index);
            rules.days_in_normal_year() as i64
                + if leap { rules.leap_days_per_year() as i64 } else { 0 }
        };
        if to >= 1 {
            (1..to).map(length).sum()
        } else {
            -(to..1).map(length).sum::<i64>()
        }
    }

    #[test]
    fn epoch() {
        let rules = earth_like();
        let math = CalendarMath::new(&rules);
        assert_eq!(math.date_to_value(&EPOCH_DATE).unwrap(), DateValue::EPOCH);
        assert_eq!(math.break_date(DateValue::EPOCH).unwrap().fields(), &[1, 1, 1]);
        // Year -1 is a leap year (the fourth year back from year 4)
        assert_eq!(math.break_date(DateValue::new(-1)).unwrap().fields(), &[-1, 12, 31]);
        assert_eq!(math.break_date(DateValue::new(-366)).unwrap().fields(), &[-1, 1, 1]);
        assert_eq!(math.break_date(DateValue::new(-367)).unwrap().fields(), &[-2, 12, 31]);

        let rules = earth_like_with(json!({"hasYear0": true}));
        let math = CalendarMath::new(&rules);
        assert_eq!(math.break_date(DateValue::new(-1)).unwrap().fields(), &[0, 12, 31]);
    }

    #[test]
    fn break_then_combine_is_identity() {
        for rules in every_rule_set() {
            let math = CalendarMath::new(&rules);
            for days in (-5000..5000).chain([1 << 20, -(1 << 20), 123_456_789]) {
                let value = DateValue::new(days);
                let broken = math.break_date(value).unwrap();
                assert!(math.validate_broken_date(&broken), "{broken}");
                assert_eq!(math.combine_date(&broken).unwrap(), value, "{broken}");
                assert_eq!(
                    math.date_to_value(&math.value_to_date(value).unwrap()).unwrap(),
                    value
                );
            }
        }
    }

    #[test]
    fn year_starts_match_brute_force() {
        for rules in every_rule_set() {
            let math = CalendarMath::new(&rules);
            for year in -40..40 {
                if !rules.year_exists(year) {
                    continue;
                }
                let expected = days_from_year_one(&rules, year);
                let start = Date::year_only(year);
                assert_eq!(math.date_to_value(&start).unwrap().days(), expected, "year {year}");
                assert_eq!(
                    math.days_since_epoch(&start).unwrap().signed_total_days(),
                    expected,
                    "year {year}"
                );
            }
        }
    }

    #[test]
    fn spans_agree_with_day_counts() {
        for rules in every_rule_set() {
            let math = CalendarMath::new(&rules);
            let dates: Vec<Date> = (-900..900)
                .step_by(37)
                .map(|days| math.value_to_date(DateValue::new(days * 11)).unwrap())
                .collect();
            for from in &dates {
                for to in &dates {
                    let expected = math.date_to_value(from).unwrap().checked_days_until(math.date_to_value(to).unwrap()).unwrap();
                    let span = math.days_between(from, to).unwrap();
                    assert_eq!(span.signed_total_days(), expected, "{from} to {to}");
                }
            }
        }
    }

    #[test]
    fn ordering_and_symmetry() {
        let rules = earth_like();
        let math = CalendarMath::new(&rules);
        let a = Date::new(-3, 5, 20);
        let b = Date::new(7, 2, 1);
        assert!(a < b);

        let forward = math.days_between(&a, &b).unwrap();
        let backward = math.days_between(&b, &a).unwrap();
        assert!(!forward.past);
        assert!(forward.total_days > 0);
        assert!(backward.past);
        assert_eq!(forward.total_days, backward.total_days);
        assert_eq!(forward.years, backward.years);
        assert_eq!(forward.signed_total_days(), -backward.signed_total_days());

        let same = math.days_between(&a, &a).unwrap();
        assert!(!same.past);
        assert_eq!(same.total_days, 0);
    }

    #[test]
    fn leap_days_are_counted_once_per_cycle() {
        let rules = earth_like();
        let math = CalendarMath::new(&rules);

        // Years 1, 2, 3, 4 hold one leap year between them
        let span = math
            .days_between(&Date::new(1, 1, 1), &Date::new(5, 1, 1))
            .unwrap();
        assert_eq!(span.total_days, 4 * 365 + 1);
        assert_eq!(span.years, 4);

        // So do any four consecutive years
        for start in [-7, -3, 2, 3, 9] {
            let end = start + 4 + i64::from(start < 0 && start + 4 >= 0);
            let span = math
                .days_between(&Date::year_only(start), &Date::year_only(end))
                .unwrap();
            assert_eq!(span.total_days, 4 * 365 + 1, "{start} to {end}");
        }

        // A year that is only nearly a leap cycle
        let span = math
            .days_between(&Date::new(4, 3, 1), &Date::new(5, 3, 1))
            .unwrap();
        assert_eq!(span.total_days, 365);
        let span = math
            .days_between(&Date::new(4, 2, 1), &Date::new(5, 2, 1))
            .unwrap();
        assert_eq!(span.total_days, 366);
    }

    #[test]
    fn decomposition() {
        let rules = earth_like();
        let math = CalendarMath::new(&rules);

        let span = math
            .days_between(&Date::new(1, 10, 15), &Date::new(2, 3, 10))
            .unwrap();
        assert_eq!((span.years, span.months, span.days), (0, 4, 23));
        assert_eq!(span.total_days, 146);
        assert_eq!(span.total_months, 4);
        assert_eq!(span.total_weeks, 20);
        assert_eq!(span.days_remaining_after_years, 146);

        let span = math
            .days_between(&Date::new(4, 2, 29), &Date::new(9, 2, 28))
            .unwrap();
        assert_eq!((span.years, span.months, span.days), (4, 11, 30));
        assert_eq!(span.total_months, 59);

        let span = math
            .days_between(&Date::new(10, 6, 1), &Date::new(3, 6, 1))
            .unwrap();
        assert!(span.past);
        assert_eq!((span.years, span.months, span.days), (7, 0, 0));
    }

    #[test]
    fn seasons() {
        let rules = earth_like();
        let math = CalendarMath::new(&rules);

        assert_eq!(math.days_in_season(1, 3).unwrap(), 92);
        // Winter runs into a leap year, then out of one
        assert_eq!(math.days_in_season(4, 3).unwrap(), 91);
        assert_eq!(math.days_in_season(4, 4).unwrap(), 90);
        assert!(matches!(
            math.days_in_season(5, 3),
            Err(CalendarError::InvalidSeason(5))
        ));

        assert_eq!(math.season_of(&Date::new(3, 1, 15)).unwrap(), Some(4));
        assert_eq!(math.season_of(&Date::new(3, 4, 10)).unwrap(), Some(1));
        assert_eq!(math.season_of(&Date::new(3, 12, 1)).unwrap(), Some(4));
        assert_eq!(math.season_of(&Date::with_season(3, 2)).unwrap(), Some(2));
        assert_eq!(math.season_of(&Date::year_only(3)).unwrap(), None);

        // A season date resolves to the season's first day
        let span = math
            .days_between(&Date::new(3, 6, 1), &Date::with_season(3, 2))
            .unwrap();
        assert_eq!(span.total_days, 0);
        let span = math
            .days_between(&Date::with_season(3, 1), &Date::with_season(5, 3))
            .unwrap();
        assert_eq!((span.total_seasons, span.seasons), (10, 2));
    }

    #[test]
    fn year_boundaries() {
        let rules = earth_like();
        let math = CalendarMath::new(&rules);
        let date = Date::new(5, 3, 1);
        assert_eq!(math.days_since_year_start(&date).unwrap(), 59);
        assert_eq!(math.days_until_year_end(&date).unwrap(), 306);
        let date = Date::new(4, 12, 31);
        assert_eq!(math.days_since_year_start(&date).unwrap(), 365);
        assert_eq!(math.days_until_year_end(&date).unwrap(), 1);
    }

    #[test]
    fn weekdays_follow_each_other() {
        let rules = earth_like_with(json!({"startDateDay": 3}));
        let math = CalendarMath::new(&rules);
        assert_eq!(math.weekday_of(&EPOCH_DATE).unwrap(), 3);

        let mut previous = None;
        for days in -800..800 {
            let date = math.value_to_date(DateValue::new(days)).unwrap();
            let weekday = math.weekday_of(&date).unwrap();
            if let Some(previous) = previous {
                assert_eq!(weekday, (previous + 1) % 7, "{date}");
            }
            previous = Some(weekday);
        }

        // A month without a day falls on the weekday of its first day
        assert_eq!(
            math.weekday_of(&Date::new(3, 4, 0)).unwrap(),
            math.weekday_of(&Date::new(3, 4, 1)).unwrap()
        );
        for date in [Date::year_only(3), Date::with_season(3, 2)] {
            assert!(matches!(
                math.weekday_of(&date),
                Err(CalendarError::NoMonth(_))
            ));
        }
        let rules = earth_like_with(json!({"weekdays": []}));
        assert!(matches!(
            CalendarMath::new(&rules).weekday_of(&EPOCH_DATE),
            Err(CalendarError::NoWeekdays)
        ));
    }

    #[test]
    fn start_override_moves_the_weekdays() {
        let rules = earth_like_with(json!({
            "startDateDay": 2,
            "startOverride": {"year": 100, "month": 6, "day": 1}
        }));
        let math = CalendarMath::new(&rules);
        assert_eq!(math.weekday_of(&Date::new(100, 6, 1)).unwrap(), 2);
        assert_eq!(math.weekday_of(&Date::new(100, 6, 9)).unwrap(), 3);
        assert_eq!(math.weekday_of(&Date::new(100, 5, 31)).unwrap(), 1);
        assert_eq!(
            math.days_since_era_start(&Date::new(100, 5, 31))
                .unwrap()
                .signed_total_days(),
            -1
        );
    }

    #[test]
    fn moving_dates() {
        let rules = earth_like();
        let math = CalendarMath::new(&rules);
        let value = |year, month, day| math.date_to_value(&Date::new(year, month, day)).unwrap();
        let moved = |from, delta: Vec<i64>| {
            math.move_date(from, &BrokenTimespan::new(delta)).unwrap()
        };

        assert_eq!(moved(value(1, 1, 31), vec![0, 1, 0]), value(1, 2, 28));
        assert_eq!(moved(value(4, 2, 29), vec![1]), value(5, 2, 28));
        assert_eq!(moved(value(1, 1, 1), vec![0, -1]), value(-1, 12, 1));
        assert_eq!(moved(value(1, 12, 25), vec![0, 0, 10]), value(2, 1, 4));
        assert_eq!(moved(value(2, 3, 3), vec![-2, -3, -3]), value(-2, 11, 30));

        assert!(matches!(
            math.move_date(DateValue::EPOCH, &BrokenTimespan::new(vec![])),
            Err(CalendarError::InvalidTimespan(_))
        ));
        assert!(matches!(
            math.move_date(DateValue::EPOCH, &BrokenTimespan::filled(4, 1)),
            Err(CalendarError::InvalidTimespan(_))
        ));
    }

    #[test]
    fn broken_spans() {
        let rules = earth_like();
        let math = CalendarMath::new(&rules);
        let from = math.date_to_value(&Date::new(1, 10, 15)).unwrap();
        let to = math.date_to_value(&Date::new(2, 3, 10)).unwrap();
        assert_eq!(math.break_date_span(from, to).unwrap().fields(), &[0, 4, 23]);
        assert_eq!(math.break_date_span(to, from).unwrap().fields(), &[0, -4, -23]);
    }

    #[test]
    fn invalid_dates() {
        let rules = earth_like();
        let math = CalendarMath::new(&rules);
        assert!(matches!(
            math.check_date(&Date::new(1, 13, 1)),
            Err(CalendarError::InvalidMonth(13))
        ));
        assert!(matches!(
            math.check_date(&Date::new(5, 2, 29)),
            Err(CalendarError::InvalidDay { .. })
        ));
        assert!(math.check_date(&Date::new(4, 2, 29)).is_ok());
        assert!(matches!(
            math.check_date(&Date::year_only(0)),
            Err(CalendarError::InvalidYear(0))
        ));
        assert!(matches!(
            math.check_date(&Date::new(1, 0, 3)),
            Err(CalendarError::DayWithoutMonth(_))
        ));
        assert!(matches!(
            math.check_date(&Date::with_season(1, 9)),
            Err(CalendarError::InvalidSeason(9))
        ));

        for fields in [vec![], vec![1, 2, 3, 4], vec![0], vec![1, 0], vec![1, 13], vec![1, 2, 0], vec![1, 2, 29]] {
            let broken = BrokenDate::new(fields);
            assert!(!math.validate_broken_date(&broken), "{broken}");
            assert!(math.combine_date(&broken).is_err());
        }
        for fields in [vec![1], vec![-1, 2], vec![4, 2, 29]] {
            assert!(math.validate_broken_date(&BrokenDate::new(fields)));
        }
    }

    #[test]
    fn partial_broken_dates_combine_to_their_first_day() {
        let rules = earth_like();
        let math = CalendarMath::new(&rules);
        assert_eq!(
            math.combine_date(&BrokenDate::new(vec![2])).unwrap(),
            math.combine_date(&BrokenDate::new(vec![2, 1, 1])).unwrap()
        );
        assert_eq!(
            math.combine_date(&BrokenDate::new(vec![2, 5])).unwrap(),
            math.combine_date(&BrokenDate::new(vec![2, 5, 1])).unwrap()
        );
    }

    #[test]
    fn months_that_only_exist_in_leap_years() {
        let rules = intercalary();
        let math = CalendarMath::new(&rules);
        assert!(!math.validate_broken_date(&BrokenDate::new(vec![1, 11, 1])));
        assert!(math.validate_broken_date(&BrokenDate::new(vec![3, 11, 5])));
        assert_eq!(
            math.break_date(DateValue::new(299)).unwrap().fields(),
            &[1, 10, 30]
        );
        assert_eq!(
            math.break_date(DateValue::new(300)).unwrap().fields(),
            &[2, 1, 1]
        );
        assert_eq!(
            math.break_date(DateValue::new(3 * 300 - 1)).unwrap().fields(),
            &[3, 10, 30]
        );
        assert_eq!(
            math.break_date(DateValue::new(3 * 300)).unwrap().fields(),
            &[3, 11, 1]
        );

        // Outside leap years month 11 has no days, so there's no such month
        assert!(matches!(
            math.check_date(&Date::new(1, 11, 0)),
            Err(CalendarError::InvalidMonth(11))
        ));
        assert!(matches!(
            math.date_to_value(&Date::new(1, 11, 0)),
            Err(CalendarError::InvalidMonth(11))
        ));
        assert!(!math.validate_broken_date(&BrokenDate::new(vec![1, 11])));
        assert_eq!(math.date_to_value(&Date::new(3, 11, 0)).unwrap(), DateValue::new(900));
        assert_eq!(
            math.combine_date(&BrokenDate::new(vec![3, 11])).unwrap(),
            DateValue::new(900)
        );
    }

    #[test]
    fn chronological_order_agrees_with_spans() {
        let rules = earth_like();
        let math = CalendarMath::new(&rules);
        let dates = [
            Date::year_only(3),
            Date::with_season(3, 1),
            Date::with_season(3, 4),
            Date::new(3, 1, 1),
            Date::new(3, 2, 0),
            Date::new(3, 3, 1),
            Date::new(3, 12, 31),
            Date::new(-1, 12, 0),
            Date::with_season(-1, 2),
            Date::year_only(4),
            Date::new(4, 1, 1),
        ];
        for a in &dates {
            for b in &dates {
                let span = math.days_between(a, b).unwrap();
                let order = math.compare(a, b).unwrap();
                assert_eq!(order == Ordering::Less, !span.past && span.total_days > 0, "{a} to {b}");
                assert_eq!(order == Ordering::Equal, span.total_days == 0, "{a} to {b}");
                assert_eq!(order == Ordering::Greater, span.past, "{a} to {b}");
            }
        }

        // Spring starts in March, so after February, though its fields sort
        // before February's
        let spring = Date::with_season(3, 1);
        let february = Date::new(3, 2, 0);
        assert!(spring < february);
        assert_eq!(math.compare(&spring, &february).unwrap(), Ordering::Greater);
        assert_eq!(
            math.compare(&Date::year_only(4), &Date::new(4, 1, 1)).unwrap(),
            Ordering::Equal
        );
        assert!(matches!(
            math.compare(&Date::year_only(0), &spring),
            Err(CalendarError::InvalidYear(0))
        ));
    }

    #[test]
    fn extreme_years_and_deltas_are_out_of_range() {
        let rules = earth_like();
        let math = CalendarMath::new(&rules);
        let far = i64::MAX / 100;
        for date in [vec![far, 1, 1], vec![i64::MIN, 1, 1], vec![i64::MAX]] {
            assert!(matches!(
                math.combine_date(&BrokenDate::new(date)),
                Err(CalendarError::OutOfRange)
            ));
        }
        assert!(matches!(
            math.days_between(&Date::year_only(-far), &Date::year_only(far)),
            Err(CalendarError::OutOfRange)
        ));
        assert!(matches!(
            math.date_to_value(&Date::year_only(i64::MAX)),
            Err(CalendarError::OutOfRange)
        ));
        for delta in [
            vec![0, 0, i64::MAX],
            vec![i64::MAX],
            vec![i64::MIN, 0, 0],
            vec![0, i64::MIN],
        ] {
            assert!(matches!(
                math.move_date(DateValue::new(10), &BrokenTimespan::new(delta)),
                Err(CalendarError::OutOfRange)
            ));
        }

        // Every day count still breaks out, and back
        for days in [i64::MAX, i64::MIN] {
            let broken = math.break_date(DateValue::new(days)).unwrap();
            assert_eq!(math.combine_date(&broken).unwrap(), DateValue::new(days));
        }

        // With one day a year, the last day counts are past the last year
        let rules = earth_like_with(json!({
            "months": [{"name": "Only", "abbreviation": "O", "days": 1, "leapDays": 0}],
            "leapYearFreq": 0,
            "seasons": []
        }));
        let math = CalendarMath::new(&rules);
        assert!(matches!(
            math.break_date(DateValue::new(i64::MAX)),
            Err(CalendarError::OutOfRange)
        ));
        assert_eq!(
            math.break_date(DateValue::new(i64::MAX - 1)).unwrap().fields(),
            &[i64::MAX, 1, 1]
        );
        assert_eq!(
            math.break_date(DateValue::new(i64::MIN)).unwrap().fields(),
            &[i64::MIN, 1, 1]
        );
        assert_eq!(
            math.combine_date(&BrokenDate::new(vec![i64::MIN, 1, 1])).unwrap(),
            DateValue::new(i64::MIN)
        );
    }

    #[test]
    fn empty_calendars_are_refused() {
        let loaded = CalendarRules::load(&json!({}));
        let rules = loaded.into_inner();
        let math = CalendarMath::new(&rules);
        assert!(matches!(
            math.break_date(DateValue::EPOCH),
            Err(CalendarError::EmptyYear)
        ));
        assert!(matches!(
            math.check_date(&EPOCH_DATE),
            Err(CalendarError::EmptyYear)
        ));
    }
}
