// SPDX-License-Identifier: GPL-3.0-or-later

//!
//! A fixed battery of inputs for checking a calendar by eye.  Every test
//! writes one numbered line, which is logged and kept in a
//! [`BatteryReport`].
//!

use crate::{CalendarError, CalendarMathProvider, CalendarSystem, ModuleError, ModuleLoader};
use log::{info, warn};
use std::path::Path;
use thiserror::Error;
use timeline_builder_core::{BrokenDate, BrokenTimespan, DateValue, JsonFileError, LoadError};

/// Day counts that are formatted, and whose spans are formatted pairwise
pub const TEST_DAYS: [i64; 7] = [0, 64, 1024, 1 << 20, -1, -64, -1024];

/// Day count that spans are added to
pub const MOVE_BASE_DAY: i64 = 1 << 17;

/// Broken dates and spans are filled with each of these
const REPEATED_FIELDS: std::ops::RangeInclusive<i64> = 0..=20;

/// Errors that stop a calendar file being tested at all
#[derive(Error, Debug)]
pub enum BatteryError {
    #[error("Could not read the calendar file: {0}")]
    File(#[from] JsonFileError),

    #[error("Error populating calendar system from JSON data: {0}")]
    Load(#[from] LoadError),

    #[error("Error initializing calendar script: {0}")]
    Module(#[from] ModuleError),
}

/// Every line written by a battery run
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct BatteryReport {
    lines: Vec<String>,
    failures: usize,
}

impl BatteryReport {
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Tests whose calendar call returned an error
    pub fn failures(&self) -> usize {
        self.failures
    }

    fn record(&mut self, description: String, outcome: Result<String, CalendarError>) {
        let index = self.lines.len() + 1;
        let line = match outcome {
            Ok(result) => {
                let line = format!("Test {index}: {description}: {result}");
                info!("{line}");
                line
            }
            Err(error) => {
                self.failures += 1;
                let line = format!("Test {index}: {description} failed: {error}");
                warn!("{line}");
                line
            }
        };
        self.lines.push(line);
    }
}

/// Run every test against the calendar
pub fn run_battery(calendar: &dyn CalendarMathProvider) -> BatteryReport {
    let mut report = BatteryReport::default();
    let field_count = calendar.broken_date_field_count();

    report.record(
        "Checking length of date format".to_owned(),
        Ok(field_count.to_string()),
    );

    for day in TEST_DAYS {
        report.record(
            format!("Formatting day {day}"),
            calendar.format_date(DateValue::new(day)),
        );
    }

    for n in REPEATED_FIELDS {
        let date = BrokenDate::filled(field_count, n);
        report.record(
            format!("Formatting date of all '{n}'"),
            calendar.format_broken_date(&date),
        );
        report.record(
            format!("Formatting date of all '{n}' with negative year"),
            calendar.format_broken_date(&date.with_negated_year()),
        );
    }

    for from in TEST_DAYS {
        for to in TEST_DAYS.into_iter().filter(|to| *to != from) {
            report.record(
                format!("Formatting span between day {from} and day {to}"),
                calendar.format_date_span(DateValue::new(from), DateValue::new(to)),
            );
        }
    }

    for n in REPEATED_FIELDS {
        let date = BrokenDate::filled(field_count, n);
        report.record(format!("Combining date of all '{n}'"), combine(calendar, &date));
        report.record(
            format!("Combining date of all '{n}' with negative year"),
            combine(calendar, &date.with_negated_year()),
        );
    }

    let base = DateValue::new(MOVE_BASE_DAY);
    for n in REPEATED_FIELDS {
        for delta in [n, -n] {
            let span = BrokenTimespan::filled(field_count, delta);
            report.record(
                format!("Offsetting day {base} by span of all '{delta}'"),
                calendar
                    .move_date(base, &span)
                    .map(|moved| moved.to_string()),
            );
        }
    }

    report
}

/// Combine the date only if it's valid, as combining an invalid date is an
/// error rather than a result
fn combine(calendar: &dyn CalendarMathProvider, date: &BrokenDate) -> Result<String, CalendarError> {
    if calendar.validate_broken_date(date)? {
        Ok(format!("day {}", calendar.combine_date(date)?))
    } else {
        Ok("invalid, so not combined".to_owned())
    }
}

/// Load `<directory>/<name>.json`, build the calendar, and run the battery
pub fn run_calendar_test(
    directory: &Path,
    name: &str,
    loader: &dyn ModuleLoader,
) -> Result<BatteryReport, BatteryError> {
    info!("Beginning calendar system test: {name}");
    let path = directory.join(format!("{name}.json"));
    let system = CalendarSystem::load_file(&path)
        .inspect_err(|error| warn!("{error}.  Test aborted."))?
        .into_valid()
        .inspect_err(|error| warn!("Error populating calendar system from JSON data: {error}.  Test aborted."))?;
    info!("Calendar system data successfully loaded.");
    info!("{} --- {}", system.name(), system.description());

    let calendar = system
        .into_provider(loader)
        .inspect_err(|error| warn!("Error initializing calendar script: {error}.  Test aborted."))?;
    info!("Calendar system initialized.  Beginning test suite.");

    let report = run_battery(calendar.as_ref());
    info!(
        "Calendar system test suite complete ({} tests, {} failed).",
        report.lines().len(),
        report.failures()
    );
    Ok(report)
}
