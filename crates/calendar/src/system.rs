// SPDX-License-Identifier: GPL-3.0-or-later

//!
//! A named calendar, as saved in a calendar file
//!

use crate::{
    CalendarMathProvider, CalendarRules, ModuleError, ModuleLoader, NativeCalendar,
    ScriptCalendar,
};
use log::info;
use serde::Serialize;
use serde_json::Value;
use std::path::Path;
use timeline_builder_core::{
    JsonFileError, JsonLoader, LoadFromJson, Loaded, load_from_value, read_json_file,
};

/// Where a calendar's arithmetic comes from
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum CalendarKind {
    /// Follows a set of rules
    #[serde(rename = "rules")]
    Native(CalendarRules),

    /// Handed to the named calendar module
    #[serde(rename = "script_name")]
    Script(String),
}

/// A calendar file: a name and description, plus either the calendar's
/// rules or the name of the module that implements it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CalendarSystem {
    name: String,
    description: String,
    #[serde(flatten)]
    kind: CalendarKind,
}

impl LoadFromJson for CalendarSystem {
    fn load_from_json(loader: &mut JsonLoader<'_>) -> Self {
        let name = loader.string("name");
        let description = loader.string("description");
        let kind = match (loader.has("rules"), loader.has("script_name")) {
            (true, false) => CalendarKind::Native(loader.object("rules")),
            (false, true) => CalendarKind::Script(loader.string("script_name")),
            (true, true) => {
                loader.invalid("script_name", "a calendar has either rules or a script, not both");
                CalendarKind::Native(loader.object("rules"))
            }
            (false, false) => {
                loader.invalid("rules", "a calendar needs either rules or a script_name");
                CalendarKind::Script(String::new())
            }
        };
        CalendarSystem {
            name,
            description,
            kind,
        }
    }
}

impl CalendarSystem {
    pub fn new<N: Into<String>, D: Into<String>>(name: N, description: D, kind: CalendarKind) -> Self {
        CalendarSystem {
            name: name.into(),
            description: description.into(),
            kind,
        }
    }

    /// Load a calendar from a JSON object.  Check [`Loaded::is_valid`] before
    /// using it.
    pub fn load(json: &Value) -> Loaded<CalendarSystem> {
        load_from_value(json)
    }

    /// Load a calendar from a JSON file
    pub fn load_file<P: AsRef<Path>>(path: P) -> Result<Loaded<CalendarSystem>, JsonFileError> {
        Ok(Self::load(&read_json_file(path)?))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn kind(&self) -> &CalendarKind {
        &self.kind
    }

    /// Build the calendar, loading its module if it has one
    pub fn into_provider(
        self,
        loader: &dyn ModuleLoader,
    ) -> Result<Box<dyn CalendarMathProvider>, ModuleError> {
        info!("Building calendar {}", self.name);
        let provider: Box<dyn CalendarMathProvider> = match self.kind {
            CalendarKind::Native(rules) => Box::new(NativeCalendar::new(rules)),
            CalendarKind::Script(script_name) => {
                let mut calendar = ScriptCalendar::new(script_name);
                calendar.initialize(loader)?;
                Box::new(calendar)
            }
        };
        Ok(provider)
    }
}
