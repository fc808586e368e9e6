// SPDX-License-Identifier: GPL-3.0-or-later

//!
//! *Part of the wider TimelineBuilder project*
//!
//! This library crate turns the calendar independent day counts of the
//! `timeline-builder-core` crate into dates that people can read.  It does the
//! following:
//!
//! - Loads calendar files, and the rules of custom calendars
//! - Does date arithmetic for any rules based calendar (leap years, seasons,
//! weekdays, spans)
//! - Formats dates & timespans the way a calendar asks
//! - Hands calendars that can't be described by rules to an external calendar
//! module
//! - Runs a battery of checks against a calendar
//! - Loads & saves the user's settings
//!

mod battery;
mod error;
mod format;
mod math;
mod module;
mod provider;
mod rules;
mod script;
mod settings;
mod solar;
mod system;

pub use battery::*;
pub use error::*;
pub use format::*;
pub use math::*;
pub use module::*;
pub use provider::*;
pub use rules::*;
pub use script::*;
pub use settings::*;
pub use solar::*;
pub use system::*;
