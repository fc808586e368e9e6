// SPDX-License-Identifier: MIT

//!
//! Loading types from JSON objects without stopping at the first problem.
//!
//! serde gives up as soon as one field is wrong, which is no good when a user
//! has hand written a calendar file and wants to know everything that's wrong
//! with it.  Types implementing [`LoadFromJson`] ask a [`JsonLoader`] for each
//! of their fields.  A field that is missing or malformed is recorded as a
//! [`LoadProblem`] and replaced with its default, and the loader carries on
//! with the rest.  The result is a [`Loaded`] value which is only valid if no
//! problems were recorded.
//!

use log::warn;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use thiserror::Error;

/// What went wrong with a single field
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LoadProblemKind {
    #[error("missing")]
    Missing,

    #[error("expected {0}")]
    WrongType(&'static str),

    #[error("value `{0}` is out of range")]
    OutOfRange(i64),

    #[error("{0}")]
    Invalid(String),
}

/// A problem found with one field while loading
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("`{key}`: {kind}")]
pub struct LoadProblem {
    /// Path to the field, e.g. `months[2].days`
    pub key: String,

    /// What was wrong with it
    pub kind: LoadProblemKind,
}

/// Returned when a [`Loaded`] value is required to be valid but isn't
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{} problem(s) found while loading JSON (first: {})", .0.len(), .0.first().map(ToString::to_string).unwrap_or_default())]
pub struct LoadError(pub Vec<LoadProblem>);

/// Implementing types can be populated field by field from a JSON object,
/// collecting problems along the way rather than failing outright
pub trait LoadFromJson: Sized {
    /// Build the value from the loader's object.  Every field should be
    /// attempted, even once one has failed.
    fn load_from_json(loader: &mut JsonLoader<'_>) -> Self;
}

/// Implementing enums can be read from either their numeric code or their
/// (serde) name
pub trait JsonEnum: Sized + DeserializeOwned {
    /// Convert the numeric code used by older calendar files
    fn from_code(code: i64) -> Option<Self>;
}

/// The result of loading a value
#[derive(Debug, Clone, PartialEq)]
pub struct Loaded<T> {
    value: T,
    problems: Vec<LoadProblem>,
}

impl<T> Loaded<T> {
    /// Whether the value loaded without any problems
    pub fn is_valid(&self) -> bool {
        self.problems.is_empty()
    }

    /// Borrow the (possibly partially populated) value
    pub fn value(&self) -> &T {
        &self.value
    }

    /// Every problem found while loading
    pub fn problems(&self) -> &[LoadProblem] {
        &self.problems
    }

    /// Take the value whether or not it's valid
    pub fn into_inner(self) -> T {
        self.value
    }

    /// Take the value only if it loaded without problems
    pub fn into_valid(self) -> Result<T, LoadError> {
        if self.problems.is_empty() {
            Ok(self.value)
        } else {
            Err(LoadError(self.problems))
        }
    }
}

/// Load a `T` from a JSON value, collecting every problem
pub fn load_from_value<T: LoadFromJson>(value: &Value) -> Loaded<T> {
    let mut loader = JsonLoader::new(value);
    let value = T::load_from_json(&mut loader);
    Loaded {
        value,
        problems: loader.into_problems(),
    }
}

/// Hands out a JSON object's fields, recording problems as it goes
#[derive(Debug)]
pub struct JsonLoader<'a> {
    object: Option<&'a Map<String, Value>>,
    path: String,
    problems: Vec<LoadProblem>,
}

impl<'a> JsonLoader<'a> {
    /// Create a loader for the JSON value (which should be an object)
    pub fn new(value: &'a Value) -> Self {
        Self::at_path(value, String::new())
    }

    fn at_path(value: &'a Value, path: String) -> Self {
        let mut loader = JsonLoader {
            object: value.as_object(),
            path,
            problems: Vec::new(),
        };
        if loader.object.is_none() {
            let key = loader.path.clone();
            loader.push(key, LoadProblemKind::WrongType("an object"));
        }
        loader
    }

    /// Take the problems found so far
    pub fn into_problems(self) -> Vec<LoadProblem> {
        self.problems
    }

    /// Whether any problems have been found so far
    pub fn has_problems(&self) -> bool {
        !self.problems.is_empty()
    }

    /// Whether the key is present (and not `null`)
    pub fn has(&self, key: &str) -> bool {
        self.object
            .and_then(|object| object.get(key))
            .is_some_and(|value| !value.is_null())
    }

    /// Record a semantic problem with a field that did load
    pub fn invalid<S: ToString>(&mut self, key: &str, reason: S) {
        let key = self.key_path(key);
        self.push(key, LoadProblemKind::Invalid(reason.to_string()));
    }

    /// A required string
    pub fn string(&mut self, key: &str) -> String {
        self.required(key, "a string", |value| value.as_str().map(str::to_owned))
            .unwrap_or_default()
    }

    /// An optional string (absent or `null` is `None`)
    pub fn optional_string(&mut self, key: &str) -> Option<String> {
        if !self.has(key) {
            return None;
        }
        self.required(key, "a string", |value| value.as_str().map(str::to_owned))
    }

    /// A required boolean
    pub fn bool(&mut self, key: &str) -> bool {
        self.required(key, "a boolean", Value::as_bool)
            .unwrap_or_default()
    }

    /// A required signed 64 bit integer
    pub fn i64(&mut self, key: &str) -> i64 {
        self.required(key, "an integer", Value::as_i64)
            .unwrap_or_default()
    }

    /// A required integer that must fit in `T`
    pub fn integer<T: TryFrom<i64> + Default>(&mut self, key: &str) -> T {
        match self.required(key, "an integer", Value::as_i64) {
            Some(value) => self.narrow(key, value),
            None => T::default(),
        }
    }

    /// An integer that defaults (without complaint) when absent
    pub fn optional_integer<T: TryFrom<i64> + Default>(&mut self, key: &str) -> T {
        if self.has(key) {
            self.integer(key)
        } else {
            T::default()
        }
    }

    /// A required enum, given either as its numeric code or its name
    pub fn enumeration<E: JsonEnum + Default>(&mut self, key: &str) -> E {
        let Some(value) = self.required(key, "an enum code or name", |value| {
            (value.is_i64() || value.is_string()).then(|| value.clone())
        }) else {
            return E::default();
        };

        let parsed = match &value {
            Value::Number(number) => number.as_i64().and_then(E::from_code),
            _ => serde_json::from_value::<E>(value.clone()).ok(),
        };
        match parsed {
            Some(parsed) => parsed,
            None => {
                self.invalid(key, format!("unknown value {value}"));
                E::default()
            }
        }
    }

    /// A required nested object
    pub fn object<T: LoadFromJson + Default>(&mut self, key: &str) -> T {
        match self.required(key, "an object", |value| value.is_object().then_some(value)) {
            Some(value) => self.nested(value, self.key_path(key)),
            None => T::default(),
        }
    }

    /// An optional nested object (absent or `null` is `None`)
    pub fn optional_object<T: LoadFromJson>(&mut self, key: &str) -> Option<T> {
        if !self.has(key) {
            return None;
        }
        let value = self.required(key, "an object", |value| value.is_object().then_some(value))?;
        Some(self.nested(value, self.key_path(key)))
    }

    /// A required array of objects.  Every element is attempted, and each
    /// element's problems are reported against its index.
    pub fn list<T: LoadFromJson>(&mut self, key: &str) -> Vec<T> {
        let Some(array) = self.required(key, "an array", Value::as_array) else {
            return Vec::new();
        };
        let base = self.key_path(key);
        array
            .iter()
            .enumerate()
            .map(|(index, element)| self.nested(element, format!("{base}[{index}]")))
            .collect()
    }

    fn nested<T: LoadFromJson>(&mut self, value: &Value, path: String) -> T {
        let mut child = JsonLoader::at_path(value, path);
        let loaded = T::load_from_json(&mut child);
        self.problems.extend(child.problems);
        loaded
    }

    fn required<T>(
        &mut self,
        key: &str,
        expected: &'static str,
        get: impl FnOnce(&'a Value) -> Option<T>,
    ) -> Option<T> {
        let object = self.object?;
        match object.get(key) {
            None | Some(Value::Null) => {
                let key = self.key_path(key);
                self.push(key, LoadProblemKind::Missing);
                None
            }
            Some(value) => {
                let got = get(value);
                if got.is_none() {
                    let key = self.key_path(key);
                    self.push(key, LoadProblemKind::WrongType(expected));
                }
                got
            }
        }
    }

    fn narrow<T: TryFrom<i64> + Default>(&mut self, key: &str, value: i64) -> T {
        T::try_from(value).unwrap_or_else(|_| {
            let key = self.key_path(key);
            self.push(key, LoadProblemKind::OutOfRange(value));
            T::default()
        })
    }

    fn key_path(&self, key: &str) -> String {
        if self.path.is_empty() {
            key.to_owned()
        } else {
            format!("{}.{key}", self.path)
        }
    }

    fn push(&mut self, key: String, kind: LoadProblemKind) {
        let problem = LoadProblem { key, kind };
        warn!("Error loading JSON: {problem}");
        self.problems.push(problem);
    }
}
