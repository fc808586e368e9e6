// SPDX-License-Identifier: GPL-3.0-or-later

//!
//! The declarative definition of a calendar
//!

use log::info;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::Path;
use timeline_builder_core::{
    Date, JsonEnum, JsonFileError, JsonLoader, LoadFromJson, Loaded, RoundingMethod,
    load_from_value, read_json_file,
};

/// The order the day, month, and year are written in
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DateFormat {
    /// e.g. `3 7 1205`
    #[default]
    #[serde(alias = "MDY")]
    Mdy,

    /// e.g. `7 3 1205`
    #[serde(alias = "DMY")]
    Dmy,

    /// e.g. `1205 3 7`
    #[serde(alias = "YMD")]
    Ymd,
}

/// How a month is written
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MonthFormat {
    /// The month's full name
    #[default]
    #[serde(alias = "Name")]
    Name,

    /// The month's abbreviation
    #[serde(alias = "Abbreviation")]
    Abbreviation,

    /// The month's (1-based) number
    #[serde(alias = "Number")]
    Number,
}

/// How (and whether) the weekday is written
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeekdayFormat {
    /// Not written
    #[default]
    #[serde(alias = "None")]
    None,

    /// The weekday's full name
    #[serde(alias = "Full")]
    Full,

    /// The weekday's abbreviation
    #[serde(alias = "Abbreviated")]
    Abbreviated,
}

impl JsonEnum for DateFormat {
    fn from_code(code: i64) -> Option<Self> {
        match code {
            1 => Some(DateFormat::Mdy),
            2 => Some(DateFormat::Dmy),
            3 => Some(DateFormat::Ymd),
            _ => None,
        }
    }
}

impl JsonEnum for MonthFormat {
    fn from_code(code: i64) -> Option<Self> {
        match code {
            1 => Some(MonthFormat::Name),
            2 => Some(MonthFormat::Abbreviation),
            3 => Some(MonthFormat::Number),
            _ => None,
        }
    }
}

impl JsonEnum for WeekdayFormat {
    fn from_code(code: i64) -> Option<Self> {
        match code {
            1 => Some(WeekdayFormat::None),
            2 => Some(WeekdayFormat::Full),
            3 => Some(WeekdayFormat::Abbreviated),
            _ => None,
        }
    }
}

/// A month of the year
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct MonthSettings {
    /// e.g. "September"
    pub name: String,

    /// e.g. "Sept"
    pub abbreviation: String,

    /// Days in the month during a normal year
    pub days: u16,

    /// Additional days in the month during a leap year
    #[serde(rename = "leapDays")]
    pub leap_days: u16,
}

/// A day of the week
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct WeekdaySettings {
    /// e.g. "Tuesday"
    pub name: String,

    /// e.g. "Tue"
    pub abbreviation: String,

    /// e.g. "Tu"
    #[serde(rename = "minimalAbbv")]
    pub minimal_abbreviation: String,
}

/// A season, which is used to describe dates that have no month
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct SeasonSettings {
    /// e.g. "Winter"
    pub name: String,

    /// First day of the season (only the month and day are used)
    #[serde(rename = "startDate")]
    pub start: Date,

    /// Last day of the season (only the month and day are used).  If this
    /// comes before the start, the season runs into the following year.
    #[serde(rename = "endDate")]
    pub end: Date,
}

impl LoadFromJson for MonthSettings {
    fn load_from_json(loader: &mut JsonLoader<'_>) -> Self {
        MonthSettings {
            name: loader.string("name"),
            abbreviation: loader.string("abbreviation"),
            days: loader.integer("days"),
            leap_days: loader.integer("leapDays"),
        }
    }
}

impl LoadFromJson for WeekdaySettings {
    fn load_from_json(loader: &mut JsonLoader<'_>) -> Self {
        WeekdaySettings {
            name: loader.string("name"),
            abbreviation: loader.string("abbreviation"),
            minimal_abbreviation: loader.string("minimalAbbv"),
        }
    }
}

impl LoadFromJson for SeasonSettings {
    fn load_from_json(loader: &mut JsonLoader<'_>) -> Self {
        let season = SeasonSettings {
            name: loader.string("name"),
            start: loader.object("startDate"),
            end: loader.object("endDate"),
        };
        for (key, date) in [("startDate", &season.start), ("endDate", &season.end)] {
            if !date.has_day() {
                loader.invalid(key, "a season boundary needs a month and a day");
            }
        }
        season
    }
}

/// The rules of a calendar: its months, weekdays, seasons, leap years, and
/// how its dates are written.
///
/// Months and seasons are numbered from 1 (so that 0 can mean "unspecified"
/// in a [`Date`]), weekdays are numbered from 0.
///
/// Rules are loaded once (see [`CalendarRules::load`]) and never change
/// afterwards.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct CalendarRules {
    /// Years from one leap year to the next (0 means no leap years)
    #[serde(rename = "leapYearFreq")]
    leap_year_frequency: u16,

    months: Vec<MonthSettings>,

    weekdays: Vec<WeekdaySettings>,

    seasons: Vec<SeasonSettings>,

    /// Weekday of the era's start date (day 1 of month 1 of year 1 unless
    /// overridden)
    #[serde(rename = "startDateDay")]
    epoch_weekday: u16,

    /// For eras that reset the calendar, but not to day 1 of month 1 of year 1
    #[serde(rename = "startOverride")]
    start_override: Option<Date>,

    /// Whether year 0 exists, or the calendar goes straight from -1 to 1
    #[serde(rename = "hasYear0")]
    has_year_zero: bool,

    #[serde(rename = "yearAffix")]
    year_affix: String,

    /// Whether the affix goes before (true) or after (false) the year
    #[serde(rename = "yearPrefix")]
    year_prefix: bool,

    /// For calendars that count backwards, where negative years are the norm
    #[serde(rename = "hideYearSign")]
    hide_year_sign: bool,

    #[serde(rename = "dateFormat")]
    date_format: DateFormat,

    #[serde(rename = "monthFormat")]
    month_format: MonthFormat,

    #[serde(rename = "weekdayFormat")]
    weekday_format: WeekdayFormat,

    #[serde(rename = "roundingMethod")]
    rounding_method: RoundingMethod,
}

impl LoadFromJson for CalendarRules {
    fn load_from_json(loader: &mut JsonLoader<'_>) -> Self {
        let rules = CalendarRules {
            leap_year_frequency: loader.integer("leapYearFreq"),
            months: loader.list("months"),
            weekdays: loader.list("weekdays"),
            seasons: loader.list("seasons"),
            epoch_weekday: loader.integer("startDateDay"),
            start_override: loader.optional_object("startOverride"),
            has_year_zero: loader.bool("hasYear0"),
            year_affix: loader.string("yearAffix"),
            year_prefix: loader.bool("yearPrefix"),
            hide_year_sign: loader.bool("hideYearSign"),
            date_format: loader.enumeration("dateFormat"),
            month_format: loader.enumeration("monthFormat"),
            weekday_format: loader.enumeration("weekdayFormat"),
            rounding_method: loader.enumeration("roundingMethod"),
        };
        rules.check(loader);
        rules
    }
}

impl CalendarRules {
    /// Load the rules from a JSON object.  Check [`Loaded::is_valid`] before
    /// using them.
    pub fn load(json: &Value) -> Loaded<CalendarRules> {
        let loaded = load_from_value::<CalendarRules>(json);
        if loaded.is_valid() {
            info!(
                "Loaded calendar rules with {} months, {} weekdays, and {} seasons",
                loaded.value().month_count(),
                loaded.value().weekday_count(),
                loaded.value().season_count()
            );
        }
        loaded
    }

    /// Load the rules from a JSON file
    pub fn load_file<P: AsRef<Path>>(path: P) -> Result<Loaded<CalendarRules>, JsonFileError> {
        Ok(Self::load(&read_json_file(path)?))
    }

    /// Semantic checks, run once every field has been attempted
    fn check(&self, loader: &mut JsonLoader<'_>) {
        if loader.has("months") {
            if self.months.is_empty() {
                loader.invalid("months", "a calendar needs at least one month");
            } else if self.days_in_normal_year() == 0 {
                loader.invalid("months", "a normal year needs at least one day");
            }
            for (index, month) in self.months.iter().enumerate() {
                if month.days.checked_add(month.leap_days).is_none() {
                    loader.invalid(
                        &format!("months[{index}]"),
                        format!("a month can't be longer than {} days", u16::MAX),
                    );
                }
            }
        }

        if !self.weekdays.is_empty() && usize::from(self.epoch_weekday) >= self.weekdays.len() {
            loader.invalid(
                "startDateDay",
                format!(
                    "weekday {} is out of range (there are {} weekdays)",
                    self.epoch_weekday,
                    self.weekdays.len()
                ),
            );
        }

        if !self.months.is_empty() {
            for (index, season) in self.seasons.iter().enumerate() {
                for date in [&season.start, &season.end] {
                    if date.has_day() && !self.month_day_exists(date.month(), date.day()) {
                        loader.invalid(
                            &format!("seasons[{index}]"),
                            format!("month {} day {} doesn't exist", date.month(), date.day()),
                        );
                    }
                }
            }

            if let Some(start) = &self.start_override {
                if !start.is_valid()
                    || !self.year_exists(start.year())
                    || (start.has_month() && self.days_in_month(start.year(), start.month()) == 0)
                    || (start.has_day() && start.day() > self.days_in_month(start.year(), start.month()))
                {
                    loader.invalid("startOverride", format!("`{start}` isn't a date in this calendar"));
                }
            }
        }
    }

    /// Whether the month and day exist in at least some years
    fn month_day_exists(&self, month: u16, day: u16) -> bool {
        self.month(month)
            .is_some_and(|month| day >= 1 && day <= month.days + month.leap_days)
    }

    /// Years from one leap year to the next (0 means no leap years)
    pub fn leap_year_frequency(&self) -> u16 {
        self.leap_year_frequency
    }

    /// All of the months, in order
    pub fn months(&self) -> &[MonthSettings] {
        &self.months
    }

    /// All of the weekdays, in order
    pub fn weekdays(&self) -> &[WeekdaySettings] {
        &self.weekdays
    }

    /// All of the seasons, in order
    pub fn seasons(&self) -> &[SeasonSettings] {
        &self.seasons
    }

    pub fn month_count(&self) -> usize {
        self.months.len()
    }

    pub fn weekday_count(&self) -> usize {
        self.weekdays.len()
    }

    pub fn season_count(&self) -> usize {
        self.seasons.len()
    }

    /// Get a month by its number (months start at 1)
    pub fn month(&self, month: u16) -> Option<&MonthSettings> {
        usize::from(month)
            .checked_sub(1)
            .and_then(|index| self.months.get(index))
    }

    /// Get a weekday by its index (weekdays start at 0)
    pub fn weekday(&self, weekday: usize) -> Option<&WeekdaySettings> {
        self.weekdays.get(weekday)
    }

    /// Get a season by its number (seasons start at 1)
    pub fn season(&self, season: usize) -> Option<&SeasonSettings> {
        season
            .checked_sub(1)
            .and_then(|index| self.seasons.get(index))
    }

    /// Weekday index of the era's start date
    pub fn epoch_weekday(&self) -> usize {
        usize::from(self.epoch_weekday)
    }

    /// Where day counting starts for the era, if not day 1 of month 1 of year 1
    pub fn start_override(&self) -> Option<&Date> {
        self.start_override.as_ref()
    }

    pub fn has_year_zero(&self) -> bool {
        self.has_year_zero
    }

    pub fn year_affix(&self) -> &str {
        &self.year_affix
    }

    pub fn year_prefix(&self) -> bool {
        self.year_prefix
    }

    pub fn hide_year_sign(&self) -> bool {
        self.hide_year_sign
    }

    pub fn date_format(&self) -> DateFormat {
        self.date_format
    }

    pub fn month_format(&self) -> MonthFormat {
        self.month_format
    }

    pub fn weekday_format(&self) -> WeekdayFormat {
        self.weekday_format
    }

    pub fn rounding_method(&self) -> RoundingMethod {
        self.rounding_method
    }

    /// Whether the year exists (year 0 only exists in some calendars)
    pub fn year_exists(&self, year: i64) -> bool {
        self.has_year_zero || year != 0
    }

    /// Convert a year as written into a continuous count, in which year 0
    /// always exists.  Without a year 0, year -1 becomes 0, -2 becomes -1, and
    /// so on.
    pub fn year_to_index(&self, year: i64) -> i64 {
        if !self.has_year_zero && year < 0 {
            year + 1
        } else {
            year
        }
    }

    /// The inverse of [`CalendarRules::year_to_index`], or `None` if the year
    /// is too far back to be written
    pub fn index_to_year(&self, index: i64) -> Option<i64> {
        if !self.has_year_zero && index <= 0 {
            index.checked_sub(1)
        } else {
            Some(index)
        }
    }

    /// Whether the year (counted continuously) is a leap year
    pub fn is_leap_index(&self, index: i64) -> bool {
        self.leap_year_frequency > 0 && index.rem_euclid(i64::from(self.leap_year_frequency)) == 0
    }

    /// Whether the year is a leap year
    pub fn is_leap_year(&self, year: i64) -> bool {
        self.is_leap_index(self.year_to_index(year))
    }

    /// Days in a normal (non-leap) year
    pub fn days_in_normal_year(&self) -> u64 {
        self.months.iter().map(|month| u64::from(month.days)).sum()
    }

    /// Additional days in a leap year
    pub fn leap_days_per_year(&self) -> u64 {
        self.months.iter().map(|month| u64::from(month.leap_days)).sum()
    }

    /// Days in the year
    pub fn days_in_year(&self, year: i64) -> u64 {
        self.days_in_normal_year()
            + if self.is_leap_year(year) {
                self.leap_days_per_year()
            } else {
                0
            }
    }

    /// Days in the month of the given year (0 if the month doesn't exist)
    pub fn days_in_month(&self, year: i64, month: u16) -> u16 {
        self.month_length(self.is_leap_year(year), month)
    }

    /// Days in the month, in a leap year or not (0 if the month doesn't exist)
    pub(crate) fn month_length(&self, leap: bool, month: u16) -> u16 {
        match self.month(month) {
            // Loading refuses months this long
            Some(month) if leap => month.days.saturating_add(month.leap_days),
            Some(month) => month.days,
            None => 0,
        }
    }
}
