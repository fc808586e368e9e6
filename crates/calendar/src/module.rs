// SPDX-License-Identifier: GPL-3.0-or-later

//!
//! Calendar modules: named sets of functions that do a calendar's arithmetic
//! themselves, rather than following a set of [`CalendarRules`].
//!
//! Modules are looked up by name through a [`ModuleLoader`].  Built in modules
//! live in a [`ModuleRegistry`], and anything else is found in a
//! [`ScriptDirectory`] and run as a child process.  A child process is sent
//! one JSON object per line (`{"function": ..., "args": [...]}`) on its
//! standard input, and must answer each with one line on its standard output,
//! either `{"result": ...}` or `{"error": "..."}`.
//!
//! [`CalendarRules`]: crate::CalendarRules
//!

use crate::SolarCalendarModule;
use log::{debug, info, warn};
use serde::Deserialize;
use serde_json::{Value, json};
use std::collections::BTreeMap;
use std::io::{self, BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};
use thiserror::Error;

/// Errors that can arise when loading or calling a calendar module
#[derive(Error, Debug)]
pub enum ModuleError {
    /// No module name was given
    #[error("No calendar script name given")]
    EmptyName,

    /// Nothing is registered or on disk with the name
    #[error("Calendar script `{0}` could not be found")]
    NotFound(String),

    /// The script was found but couldn't be started
    #[error("Calendar script `{name}` could not be started: {source}")]
    Spawn {
        name: String,
        #[source]
        source: io::Error,
    },

    /// A function was called before the module was loaded
    #[error("Calendar script hasn't been initialized")]
    NotInitialized,

    /// The module has no function with the name
    #[error("Calendar script doesn't provide `{0}`")]
    UnknownFunction(String),

    /// The function ran, but reported an error
    #[error("`{function}` raised: {message}")]
    Raised { function: String, message: String },

    /// The function's result wasn't what the caller needed
    #[error("`{function}` returned an unexpected result: {message}")]
    UnexpectedResult { function: String, message: String },

    /// Communication with a script process broke down
    #[error("Lost contact with calendar script: {0}")]
    Io(#[from] io::Error),

    /// A script process sent something that wasn't JSON
    #[error("Calendar script sent invalid JSON: {0}")]
    Protocol(#[from] serde_json::Error),

    /// A previous call panicked while holding the module
    #[error("Calendar script is unusable after an earlier failure")]
    Poisoned,
}

/// A loaded calendar module
pub trait CalendarModule: Send {
    /// Call one of the module's functions
    fn call(&mut self, function: &str, args: Vec<Value>) -> Result<Value, ModuleError>;
}

/// Finds calendar modules by name
pub trait ModuleLoader {
    fn load(&self, name: &str) -> Result<Box<dyn CalendarModule>, ModuleError>;
}

type ModuleFactory = Box<dyn Fn() -> Box<dyn CalendarModule> + Send + Sync>;

/// Modules compiled into the program, optionally falling back to a
/// directory of scripts
#[derive(Default)]
pub struct ModuleRegistry {
    factories: BTreeMap<String, ModuleFactory>,
    fallback: Option<ScriptDirectory>,
}

impl ModuleRegistry {
    /// An empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding every module that ships with the program
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register(SolarCalendarModule::NAME, || Box::new(SolarCalendarModule));
        registry
    }

    /// Look in `directory` for modules that aren't registered
    pub fn with_script_directory<P: Into<PathBuf>>(mut self, directory: P) -> Self {
        self.fallback = Some(ScriptDirectory::new(directory));
        self
    }

    /// Register (or replace) a module
    pub fn register<F>(&mut self, name: &str, factory: F)
    where
        F: Fn() -> Box<dyn CalendarModule> + Send + Sync + 'static,
    {
        debug!("Registering calendar module {name}");
        self.factories.insert(name.to_owned(), Box::new(factory));
    }

    /// Names of the registered modules
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.factories.keys().map(String::as_str)
    }
}

impl ModuleLoader for ModuleRegistry {
    fn load(&self, name: &str) -> Result<Box<dyn CalendarModule>, ModuleError> {
        if name.is_empty() {
            return Err(ModuleError::EmptyName);
        }
        match (self.factories.get(name), &self.fallback) {
            (Some(factory), _) => {
                info!("Loading built in calendar module {name}");
                Ok(factory())
            }
            (None, Some(directory)) => directory.load(name),
            (None, None) => Err(ModuleError::NotFound(name.to_owned())),
        }
    }
}

/// A directory of calendar scripts.  `<name>.sh` is run with `sh`,
/// `<name>.py` with `python3`, and a plain `<name>` is run directly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptDirectory {
    directory: PathBuf,
}

impl ScriptDirectory {
    pub fn new<P: Into<PathBuf>>(directory: P) -> Self {
        ScriptDirectory {
            directory: directory.into(),
        }
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    fn command(&self, name: &str) -> Option<Command> {
        // Only plain names, so scripts can't be loaded from elsewhere
        if name.contains(['/', '\\']) || name.starts_with('.') {
            return None;
        }
        let interpreters = [("sh", Some("sh")), ("py", Some("python3")), ("", None)];
        interpreters.into_iter().find_map(|(extension, interpreter)| {
            let path = if extension.is_empty() {
                self.directory.join(name)
            } else {
                self.directory.join(format!("{name}.{extension}"))
            };
            path.is_file().then(|| match interpreter {
                Some(interpreter) => {
                    let mut command = Command::new(interpreter);
                    command.arg(path);
                    command
                }
                None => Command::new(path),
            })
        })
    }
}

impl ModuleLoader for ScriptDirectory {
    fn load(&self, name: &str) -> Result<Box<dyn CalendarModule>, ModuleError> {
        if name.is_empty() {
            return Err(ModuleError::EmptyName);
        }
        let Some(command) = self.command(name) else {
            warn!(
                "No calendar script named {name} in {}",
                self.directory.display()
            );
            return Err(ModuleError::NotFound(name.to_owned()));
        };
        Ok(Box::new(ProcessModule::spawn(name, command)?))
    }
}

#[derive(Deserialize)]
struct Response {
    #[serde(default)]
    result: Value,
    error: Option<String>,
}

/// A calendar module running as a child process
#[derive(Debug)]
pub struct ProcessModule {
    name: String,
    child: Child,
    stdin: ChildStdin,
    stdout: BufReader<ChildStdout>,
}

impl ProcessModule {
    /// Start the command with piped standard input and output
    pub fn spawn(name: &str, mut command: Command) -> Result<Self, ModuleError> {
        let spawn_error = |source| ModuleError::Spawn {
            name: name.to_owned(),
            source,
        };
        let mut child = command
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .spawn()
            .map_err(spawn_error)?;
        let (Some(stdin), Some(stdout)) = (child.stdin.take(), child.stdout.take()) else {
            // Unreachable with piped stdio, but don't leave the child behind
            let _ = child.kill();
            let _ = child.wait();
            return Err(spawn_error(io::Error::other("no pipes to the script")));
        };
        info!("Started calendar script {name} (pid {})", child.id());
        Ok(ProcessModule {
            name: name.to_owned(),
            child,
            stdin,
            stdout: BufReader::new(stdout),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl CalendarModule for ProcessModule {
    fn call(&mut self, function: &str, args: Vec<Value>) -> Result<Value, ModuleError> {
        let request = json!({"function": function, "args": args});
        writeln!(self.stdin, "{request}")?;
        self.stdin.flush()?;

        let mut line = String::new();
        if self.stdout.read_line(&mut line)? == 0 {
            return Err(ModuleError::Io(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!("{} closed its output", self.name),
            )));
        }
        let response: Response = serde_json::from_str(&line)?;
        match response.error {
            Some(message) if message.starts_with("unknown function") => {
                Err(ModuleError::UnknownFunction(function.to_owned()))
            }
            Some(message) => Err(ModuleError::Raised {
                function: function.to_owned(),
                message,
            }),
            None => Ok(response.result),
        }
    }
}

impl Drop for ProcessModule {
    fn drop(&mut self) {
        debug!("Stopping calendar script {}", self.name);
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}
