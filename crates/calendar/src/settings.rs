// SPDX-License-Identifier: GPL-3.0-or-later

//!
//! TimelineBuilder settings
//!

use directories_next::ProjectDirs;
use log::info;
use serde::Serialize;
use std::path::{Path, PathBuf};
use thiserror::Error;
use timeline_builder_core::{
    JsonFileError, JsonLoader, LoadError, LoadFromJson, load_from_value, read_json_file,
    write_json_file,
};

const PROJECT_QUALIFIER: &str = "org";
const ORG_NAME: &str = "TimelineBuilder";
const APPLICATION_NAME: &str = "TimelineBuilder";
const SETTINGS_FILE_NAME: &str = "settings.json";
const DEV_SETTINGS_DIR: &str = "saved/config";
const DEFAULT_CALENDAR_DIR: &str = "scripts";

/// Errors that can arise when loading or saving the settings
#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("Could not find a directory for the settings")]
    NoSettingsDir,

    #[error(transparent)]
    File(#[from] JsonFileError),

    #[error("Settings file is invalid: {0}")]
    Invalid(#[from] LoadError),
}

/// Where the settings file lives
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SettingsLocation {
    /// The platform's config directory
    Platform,

    /// A directory of our choosing
    Directory(PathBuf),
}

impl SettingsLocation {
    /// `saved/config`, relative to the working directory, for development
    pub fn dev() -> Self {
        SettingsLocation::Directory(PathBuf::from(DEV_SETTINGS_DIR))
    }

    /// Path to the settings file
    pub fn file_path(&self) -> Result<PathBuf, SettingsError> {
        let dir = match self {
            SettingsLocation::Platform => {
                ProjectDirs::from(PROJECT_QUALIFIER, ORG_NAME, APPLICATION_NAME)
                    .ok_or(SettingsError::NoSettingsDir)?
                    .config_dir()
                    .to_path_buf()
            }
            SettingsLocation::Directory(dir) => dir.clone(),
        };
        let path = dir.join(SETTINGS_FILE_NAME);
        info!("Settings file path = {}", path.display());
        Ok(path)
    }
}

/// The settings that are saved to disk
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Settings {
    /// Where calendar files (and calendar scripts) are found
    calendar_dir: PathBuf,

    /// Whether to log at debug level
    debug_logging: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            calendar_dir: PathBuf::from(DEFAULT_CALENDAR_DIR),
            debug_logging: false,
        }
    }
}

impl LoadFromJson for Settings {
    fn load_from_json(loader: &mut JsonLoader<'_>) -> Self {
        Settings {
            calendar_dir: PathBuf::from(loader.string("calendar_dir")),
            debug_logging: loader.bool("debug_logging"),
        }
    }
}

impl Settings {
    pub fn load(location: &SettingsLocation) -> Result<Self, SettingsError> {
        info!("Loading settings");
        let json = read_json_file(location.file_path()?)?;
        let settings = load_from_value::<Settings>(&json).into_valid()?;
        info!("Settings loaded = {settings:?}");
        Ok(settings)
    }

    pub fn save(&self, location: &SettingsLocation) -> Result<(), SettingsError> {
        write_json_file(location.file_path()?, self)?;
        info!("Settings saved");
        Ok(())
    }

    /// Load the settings, first writing the defaults if there's no settings
    /// file yet
    pub fn ensure_setup(location: &SettingsLocation) -> Result<Self, SettingsError> {
        info!("Ensuring settings exist");
        if !location.file_path()?.exists() {
            info!("No settings file found");
            Settings::default().save(location)?;
        }
        Settings::load(location)
    }

    pub fn set_to_default(&mut self) {
        *self = Settings::default();
    }

    pub fn calendar_dir(&self) -> &Path {
        &self.calendar_dir
    }

    pub fn set_calendar_dir<P: Into<PathBuf>>(&mut self, dir: P) {
        self.calendar_dir = dir.into();
    }

    pub fn debug_logging(&self) -> bool {
        self.debug_logging
    }

    pub fn set_debug_logging(&mut self, debug_logging: bool) {
        self.debug_logging = debug_logging;
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::fs;
    use tempdir::TempDir;

    #[test]
    fn ensure_setup_then_save() {
        let dir = TempDir::new("settings").unwrap();
        let location = SettingsLocation::Directory(dir.path().join("config"));

        let mut settings = Settings::ensure_setup(&location).unwrap();
        assert_eq!(settings, Settings::default());
        assert!(location.file_path().unwrap().exists());

        settings.set_calendar_dir("/calendars");
        settings.set_debug_logging(true);
        settings.save(&location).unwrap();
        assert_eq!(Settings::ensure_setup(&location).unwrap(), settings);

        settings.set_to_default();
        assert_eq!(settings.calendar_dir(), Path::new("scripts"));
        assert!(!settings.debug_logging());
    }

    #[test]
    fn bad_settings_files() {
        let dir = TempDir::new("settings").unwrap();
        let location = SettingsLocation::Directory(dir.path().to_path_buf());
        assert!(matches!(
            Settings::load(&location),
            Err(SettingsError::File(JsonFileError::FileNotFound { .. }))
        ));

        let path = location.file_path().unwrap();
        fs::write(&path, r#"{"calendar_dir": "scripts"}"#).unwrap();
        assert!(matches!(
            Settings::load(&location),
            Err(SettingsError::Invalid(_))
        ));

        fs::write(&path, "calendar_dir = scripts").unwrap();
        assert!(matches!(
            Settings::load(&location),
            Err(SettingsError::File(JsonFileError::FileNotJson { .. }))
        ));
    }

    #[test]
    fn dev_location() {
        assert_eq!(
            SettingsLocation::dev().file_path().unwrap(),
            Path::new("saved/config/settings.json")
        );
    }
}
