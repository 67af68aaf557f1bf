// src/config/loader.rs

use std::fs;
use std::path::Path;

use crate::config::model::{RawSeriesFile, SeriesFile};
use crate::errors::Result;

/// Load a series file from a given path without validating it.
///
/// Use [`load_and_validate`] for anything that is going to be run.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<RawSeriesFile> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)?;

    let config: RawSeriesFile = toml::from_str(&contents)?;

    Ok(config)
}

/// Load a series file and check it:
///
/// - at least one task,
/// - every `cmd` names a program,
/// - `[run]` values that are set are non-empty.
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<SeriesFile> {
    let raw_config = load_from_path(&path)?;
    let config = SeriesFile::try_from(raw_config)?;
    Ok(config)
}

/// Series file looked up in the working directory when `--config` is absent.
pub const DEFAULT_CONFIG_FILE: &str = "Seqexec.toml";
