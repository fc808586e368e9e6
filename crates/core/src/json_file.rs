// SPDX-License-Identifier: MIT

//!
//! Reading and writing JSON files
//!

use log::{info, warn};
use serde::Serialize;
use serde_json::Value;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can arise when reading or writing a JSON file
#[derive(Error, Debug)]
pub enum JsonFileError {
    /// An empty path was given
    #[error("No file specified")]
    NoFileSpecified,

    /// The file couldn't be opened
    #[error("Could not open `{path}`: {source}")]
    FileNotFound {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The file doesn't contain valid JSON
    #[error("`{path}` did not contain valid JSON: {source}")]
    FileNotJson {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The file couldn't be written
    #[error("Could not write `{path}`: {source}")]
    Unwritable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The value couldn't be turned into JSON
    #[error("Could not serialise JSON: {0}")]
    Serialise(#[from] serde_json::Error),
}

/// Read and parse the JSON file at `path`
pub fn read_json_file<P: AsRef<Path>>(path: P) -> Result<Value, JsonFileError> {
    let path = path.as_ref();
    if path.as_os_str().is_empty() {
        return Err(JsonFileError::NoFileSpecified);
    }
    info!("Reading JSON file {}", path.display());
    let data = fs::read_to_string(path).map_err(|source| JsonFileError::FileNotFound {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&data).map_err(|source| {
        warn!("Error parsing JSON file {}: {source}", path.display());
        JsonFileError::FileNotJson {
            path: path.to_path_buf(),
            source,
        }
    })
}

/// Write `value` as pretty JSON to `path`, creating parent directories
pub fn write_json_file<P: AsRef<Path>, T: Serialize>(
    path: P,
    value: &T,
) -> Result<(), JsonFileError> {
    let path = path.as_ref();
    if path.as_os_str().is_empty() {
        return Err(JsonFileError::NoFileSpecified);
    }
    let json = serde_json::to_string_pretty(value)?;
    let unwritable = |source| JsonFileError::Unwritable {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(unwritable)?;
    }
    fs::write(path, json).map_err(unwritable)?;
    info!("Wrote JSON file {}", path.display());
    Ok(())
}
