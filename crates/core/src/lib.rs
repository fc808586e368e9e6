// SPDX-License-Identifier: MIT

//!
//! *Part of the wider TimelineBuilder project*
//!
//! This crate defines the basic date and time datatypes used across the
//! TimelineBuilder project: day counts, broken out dates, and timespans.  None
//! of them know anything about a particular calendar (see the
//! `timeline-builder-calendar` crate for that).
//!
//! It also holds the JSON loading machinery shared by every type that is read
//! from a user's files.
//!

mod broken;
mod date;
mod json;
mod json_file;
mod timespan;
mod value;

pub use broken::*;
pub use date::*;
pub use json::*;
pub use json_file::*;
pub use timespan::*;
pub use value::*;

pub use timeline_builder_macros::{date, season_date};
