// SPDX-License-Identifier: GPL-3.0-or-later

//!
//! Calendars whose arithmetic is done by a calendar module
//!

use crate::{CalendarError, CalendarMathProvider, CalendarModule, ModuleError, ModuleLoader};
use log::{error, info, warn};
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use std::panic::Location;
use std::sync::Mutex;
use timeline_builder_core::{BrokenDate, BrokenTimespan, DateValue};

struct LoadedScript {
    module: Mutex<Box<dyn CalendarModule>>,
    field_count: usize,
    date_format: String,
    timespan_format: String,
}

/// A calendar that hands every operation to a named calendar module.  The
/// module has to be loaded with [`ScriptCalendar::initialize`] before use.
///
/// Errors from the module are logged (with the function and the caller)
/// and then returned.
pub struct ScriptCalendar {
    script_name: String,
    script: Option<LoadedScript>,
}

impl ScriptCalendar {
    pub fn new<S: Into<String>>(script_name: S) -> Self {
        ScriptCalendar {
            script_name: script_name.into(),
            script: None,
        }
    }

    pub fn script_name(&self) -> &str {
        &self.script_name
    }

    pub fn is_initialized(&self) -> bool {
        self.script.is_some()
    }

    /// Load the module, run its `init_calendar`, and fetch the values that
    /// never change (the broken date field count and the entry layouts)
    pub fn initialize(&mut self, loader: &dyn ModuleLoader) -> Result<(), ModuleError> {
        if self.script_name.is_empty() {
            warn!("Attempting to initialize calendar script with an empty name");
            return Err(ModuleError::EmptyName);
        }
        let mut module = loader.load(&self.script_name).inspect_err(|error| {
            warn!("Failed to load calendar script {}: {error}", self.script_name);
        })?;

        let name = &self.script_name;
        call_initializing::<Value>(&mut *module, name, "init_calendar")?;
        let field_count: usize = call_initializing(&mut *module, name, "get_broken_date_length")?;
        let date_format: String = call_initializing(&mut *module, name, "get_date_format")?;
        let timespan_format = call_initializing(&mut *module, name, "get_timespan_format")?;
        info!(
            "Initialized calendar script {} ({field_count} fields, layout `{date_format}`)",
            self.script_name
        );
        self.script = Some(LoadedScript {
            module: Mutex::new(module),
            field_count,
            date_format,
            timespan_format,
        });
        Ok(())
    }

    #[track_caller]
    fn call<T: DeserializeOwned>(&self, function: &str, args: Vec<Value>) -> Result<T, CalendarError> {
        let caller = Location::caller();
        let result = match &self.script {
            Some(script) => match script.module.lock() {
                Ok(mut module) => call_typed(&mut **module, function, args),
                Err(_) => Err(ModuleError::Poisoned),
            },
            None => Err(ModuleError::NotInitialized),
        };
        result.map_err(|error| {
            error!("Error when calling calendar script function '{function}' from {caller}: {error}");
            CalendarError::Module(error)
        })
    }
}

fn call_initializing<T: DeserializeOwned>(
    module: &mut dyn CalendarModule,
    script_name: &str,
    function: &str,
) -> Result<T, ModuleError> {
    call_typed(module, function, vec![]).inspect_err(|error| {
        error!("Error when calling calendar script function '{function}' while initializing {script_name}: {error}");
    })
}

fn call_typed<T: DeserializeOwned>(
    module: &mut dyn CalendarModule,
    function: &str,
    args: Vec<Value>,
) -> Result<T, ModuleError> {
    let value = module.call(function, args)?;
    serde_json::from_value(value).map_err(|error| ModuleError::UnexpectedResult {
        function: function.to_owned(),
        message: error.to_string(),
    })
}

impl CalendarMathProvider for ScriptCalendar {
    fn broken_date_field_count(&self) -> usize {
        self.script.as_ref().map_or(0, |script| script.field_count)
    }

    fn date_format(&self) -> &str {
        self.script
            .as_ref()
            .map_or("", |script| script.date_format.as_str())
    }

    fn timespan_format(&self) -> &str {
        self.script
            .as_ref()
            .map_or("", |script| script.timespan_format.as_str())
    }

    fn format_date(&self, date: DateValue) -> Result<String, CalendarError> {
        self.call("format_date", vec![json!(date)])
    }

    fn format_broken_date(&self, date: &BrokenDate) -> Result<String, CalendarError> {
        self.call("format_broken_date", vec![json!(date)])
    }

    fn format_date_span(&self, from: DateValue, to: DateValue) -> Result<String, CalendarError> {
        self.call("format_date_span", vec![json!(from), json!(to)])
    }

    fn format_timespan(&self, span: &BrokenTimespan) -> Result<String, CalendarError> {
        self.call("format_timespan", vec![json!(span)])
    }

    fn break_date(&self, date: DateValue) -> Result<BrokenDate, CalendarError> {
        self.call("break_date", vec![json!(date)])
    }

    fn break_date_span(
        &self,
        from: DateValue,
        to: DateValue,
    ) -> Result<BrokenTimespan, CalendarError> {
        self.call("break_date_span", vec![json!(from), json!(to)])
    }

    fn combine_date(&self, date: &BrokenDate) -> Result<DateValue, CalendarError> {
        self.call("combine_date", vec![json!(date)])
    }

    fn move_date(
        &self,
        date: DateValue,
        delta: &BrokenTimespan,
    ) -> Result<DateValue, CalendarError> {
        self.call("move_date", vec![json!(date), json!(delta)])
    }

    fn validate_broken_date(&self, date: &BrokenDate) -> Result<bool, CalendarError> {
        self.call("validate_date", vec![json!(date)])
    }
}
