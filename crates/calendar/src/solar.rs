// SPDX-License-Identifier: GPL-3.0-or-later

//!
//! A simple solar calendar, built in as a calendar module: 10 months of 30
//! days, 6 day weeks, and no year 0.  Day 0 is `Oneday, 1 Onemonth 1`.
//!

use crate::{CalendarModule, ModuleError};
use serde_json::{Value, json};

const MONTHS: [&str; 10] = [
    "Onemonth",
    "Twomonth",
    "Threemonth",
    "Fourmonth",
    "Fivemonth",
    "Sixmonth",
    "Sevenmonth",
    "Eightmonth",
    "Ninemonth",
    "Tenmonth",
];

const WEEKDAYS: [&str; 6] = ["Oneday", "Twoday", "Threeday", "Fourday", "Fiveday", "Sixday"];

const DAYS_PER_MONTH: i64 = 30;
const DAYS_PER_YEAR: i64 = DAYS_PER_MONTH * MONTHS.len() as i64;
const FIELD_COUNT: usize = 3;

/// The built in solar calendar module
#[derive(Debug, Default, Clone, Copy)]
pub struct SolarCalendarModule;

impl SolarCalendarModule {
    pub const NAME: &'static str = "base_solar_cal";

    fn validate_date(date: &[i64]) -> bool {
        let in_range = |field: Option<&i64>, last: i64| field.is_none_or(|field| (1..=last).contains(field));
        !date.is_empty()
            && date.len() <= FIELD_COUNT
            && date[0] != 0
            && in_range(date.get(1), MONTHS.len() as i64)
            && in_range(date.get(2), DAYS_PER_MONTH)
    }

    fn break_date(days: i64) -> Vec<i64> {
        let year = days.div_euclid(DAYS_PER_YEAR);
        vec![
            if year >= 0 { year + 1 } else { year },
            days.div_euclid(DAYS_PER_MONTH).rem_euclid(MONTHS.len() as i64) + 1,
            days.rem_euclid(DAYS_PER_MONTH) + 1,
        ]
    }

    fn combine_date(date: &[i64]) -> Result<i64, String> {
        if !Self::validate_date(date) {
            return Err("Invalid date!".to_owned());
        }
        let year = if date[0] > 0 { date[0] - 1 } else { date[0] };
        let month = date.get(1).map_or(0, |month| month - 1);
        let day = date.get(2).map_or(0, |day| day - 1);
        year.checked_mul(DAYS_PER_YEAR)
            .and_then(|days| days.checked_add(month * DAYS_PER_MONTH + day))
            .ok_or_else(out_of_range)
    }

    fn format_broken_date(date: &[i64]) -> Result<String, String> {
        let days = Self::combine_date(date)?;
        let month = |index: i64| MONTHS[(index - 1).unsigned_abs() as usize % MONTHS.len()];
        Ok(match date {
            [year, month_index, day] => format!(
                "{}, {day} {} {year}",
                WEEKDAYS[days.rem_euclid(WEEKDAYS.len() as i64).unsigned_abs() as usize],
                month(*month_index)
            ),
            [year, month_index] => format!("{} {year}", month(*month_index)),
            _ => date[0].to_string(),
        })
    }

    fn break_date_span(from: i64, to: i64) -> Result<Vec<i64>, String> {
        // Every year and month has the same length, so the span splits evenly
        let days = i128::from(to) - i128::from(from);
        let sign = days.signum();
        let days = days.abs();
        [
            sign * (days / i128::from(DAYS_PER_YEAR)),
            sign * (days % i128::from(DAYS_PER_YEAR) / i128::from(DAYS_PER_MONTH)),
            sign * (days % i128::from(DAYS_PER_MONTH)),
        ]
        .into_iter()
        .map(|field| i64::try_from(field).map_err(|_| out_of_range()))
        .collect()
    }

    fn format_timespan(span: &[i64]) -> Result<String, String> {
        if span.is_empty() || span.len() > FIELD_COUNT {
            return Err("Invalid timespan!".to_owned());
        }
        let parts: Vec<String> = span
            .iter()
            .zip(["year", "month", "day"])
            .filter(|(count, _)| **count != 0)
            .map(|(count, unit)| match count {
                1 => format!("1 {unit}"),
                _ => format!("{count} {unit}s"),
            })
            .collect();
        Ok(if parts.is_empty() {
            "0 days".to_owned()
        } else {
            parts.join(", ")
        })
    }

    fn move_date(days: i64, delta: &[i64]) -> Result<i64, String> {
        if delta.is_empty() || delta.len() > FIELD_COUNT {
            return Err("Invalid delta span!".to_owned());
        }
        let factors = [DAYS_PER_YEAR, DAYS_PER_MONTH, 1];
        delta
            .iter()
            .zip(factors)
            .try_fold(days, |days, (field, factor)| {
                field.checked_mul(factor).and_then(|moved| days.checked_add(moved))
            })
            .ok_or_else(out_of_range)
    }
}

fn out_of_range() -> String {
    "Date out of range!".to_owned()
}

impl CalendarModule for SolarCalendarModule {
    fn call(&mut self, function: &str, args: Vec<Value>) -> Result<Value, ModuleError> {
        let args = Args { function, args };
        let result = match function {
            "init_calendar" => Ok(Value::Null),
            "get_broken_date_length" => Ok(json!(FIELD_COUNT)),
            "get_date_format" => Ok(json!("%2 %1 %0")),
            "get_timespan_format" => Ok(json!("%0 years %1 months %2 days")),
            "format_date" => {
                Self::format_broken_date(&Self::break_date(args.integer(0)?)).map(Value::from)
            }
            "format_broken_date" => Self::format_broken_date(&args.list(0)?).map(Value::from),
            "format_date_span" => {
                Self::break_date_span(args.integer(0)?, args.integer(1)?)
                    .and_then(|span| Self::format_timespan(&span))
                    .map(Value::from)
            }
            "format_timespan" => Self::format_timespan(&args.list(0)?).map(Value::from),
            "break_date" => Ok(json!(Self::break_date(args.integer(0)?))),
            "break_date_span" => {
                Self::break_date_span(args.integer(0)?, args.integer(1)?).map(|span| json!(span))
            }
            "combine_date" => Self::combine_date(&args.list(0)?).map(Value::from),
            "move_date" => Self::move_date(args.integer(0)?, &args.list(1)?).map(Value::from),
            "validate_date" => Ok(json!(Self::validate_date(&args.list(0)?))),
            _ => return Err(ModuleError::UnknownFunction(function.to_owned())),
        };
        result.map_err(|message| ModuleError::Raised {
            function: function.to_owned(),
            message,
        })
    }
}

/// A call's arguments, checked as they are taken
struct Args<'a> {
    function: &'a str,
    args: Vec<Value>,
}

impl Args<'_> {
    fn bad_argument(&self, index: usize, expected: &str) -> ModuleError {
        ModuleError::Raised {
            function: self.function.to_owned(),
            message: format!("argument {index} should be {expected}"),
        }
    }

    fn integer(&self, index: usize) -> Result<i64, ModuleError> {
        self.args
            .get(index)
            .and_then(Value::as_i64)
            .ok_or_else(|| self.bad_argument(index, "an integer"))
    }

    fn list(&self, index: usize) -> Result<Vec<i64>, ModuleError> {
        self.args
            .get(index)
            .and_then(Value::as_array)
            .and_then(|fields| fields.iter().map(Value::as_i64).collect())
            .ok_or_else(|| self.bad_argument(index, "a list of integers"))
    }
}
