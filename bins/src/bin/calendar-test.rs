// SPDX-License-Identifier: GPL-3.0-or-later

//!
//! *Part of the wider TimelineBuilder project*
//!
//! Runs the calendar test battery against a calendar file, so that a calendar
//! (or a calendar module) can be checked by eye
//!

use clap::{CommandFactory, Parser};
use simplelog::{
    ColorChoice, CombinedLogger, ConfigBuilder, LevelFilter, TermLogger, TerminalMode,
};
use std::path::PathBuf;
use timeline_builder_calendar::{ModuleRegistry, Settings, SettingsLocation, run_calendar_test};

#[macro_use]
extern crate log;
extern crate simplelog;

/// Entry point for the calendar test harness
fn main() {
    let args = Cli::parse();

    // The settings say where calendars live unless told otherwise
    let location = if args.dev_config_path {
        SettingsLocation::dev()
    } else {
        SettingsLocation::Platform
    };
    let settings = Settings::ensure_setup(&location);

    // Setup logging
    let debug = args.verbose
        || settings
            .as_ref()
            .is_ok_and(|settings| settings.debug_logging());
    let level = if debug {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    let config_log = ConfigBuilder::new()
        .add_filter_allow_str("timeline_builder")
        .add_filter_allow_str("calendar_test")
        .build();
    if let Err(error) = CombinedLogger::init(vec![TermLogger::new(
        level,
        config_log,
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )]) {
        eprintln!("Error setting up logging: {error}");
    }

    let settings = match settings {
        Ok(settings) => settings,
        Err(error) => {
            warn!("Using the default settings: {error}");
            Settings::default()
        }
    };

    // Check the options
    let Some(calendar) = args.calendar else {
        eprintln!("CLI Error: no calendar given");
        if let Err(error) = Cli::command().print_long_help() {
            eprintln!("{error}");
        }
        std::process::exit(1);
    };
    let dir = args
        .dir
        .unwrap_or_else(|| settings.calendar_dir().to_path_buf());
    debug!("Calendar directory = {}", dir.display());

    let registry = ModuleRegistry::with_builtins().with_script_directory(dir.clone());
    match run_calendar_test(&dir, &calendar, &registry) {
        Ok(report) if report.failures() == 0 => println!("Success"),
        Ok(report) => {
            eprintln!(
                "{} of {} tests failed",
                report.failures(),
                report.lines().len()
            );
            std::process::exit(2);
        }
        Err(error) => {
            eprintln!("Error: {error}");
            std::process::exit(1);
        }
    }
}

/// TimelineBuilder calendar test CLI args using [clap]
#[derive(Parser, Debug)]
#[command(
    version,
    about = "TimelineBuilder tool for checking a calendar",
    after_help = "Every test result is logged, so that the output can be read through by eye"
)]
pub struct Cli {
    /// Name of the calendar, i.e. `<dir>/<name>.json`
    #[arg(long)]
    pub calendar: Option<String>,

    /// Directory holding the calendar files and scripts (defaults to the one
    /// in the settings)
    #[arg(long)]
    pub dir: Option<PathBuf>,

    /// Keep the settings in `saved/config` rather than the platform's config
    /// directory
    #[arg(long)]
    pub dev_config_path: bool,

    /// Log at debug level
    #[arg(long, short)]
    pub verbose: bool,
}
