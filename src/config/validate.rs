// src/config/validate.rs

use crate::config::model::{RawSeriesFile, SeriesFile};
use crate::errors::{Result, SeqexecError};

impl TryFrom<RawSeriesFile> for SeriesFile {
    type Error = crate::errors::SeqexecError;

    fn try_from(raw: RawSeriesFile) -> std::result::Result<Self, Self::Error> {
        validate_raw_series(&raw)?;
        Ok(SeriesFile::new_unchecked(raw.run, raw.task))
    }
}

fn validate_raw_series(cfg: &RawSeriesFile) -> Result<()> {
    ensure_has_tasks(cfg)?;
    validate_run_section(cfg)?;
    validate_commands(cfg)?;
    Ok(())
}

fn ensure_has_tasks(cfg: &RawSeriesFile) -> Result<()> {
    if cfg.task.is_empty() {
        return Err(SeqexecError::ConfigError(
            "series file must contain at least one [[task]] entry".to_string(),
        ));
    }
    Ok(())
}

fn validate_run_section(cfg: &RawSeriesFile) -> Result<()> {
    if let Some(container) = &cfg.run.container {
        if container.trim().is_empty() {
            return Err(SeqexecError::ConfigError(
                "[run].container must not be empty when set".to_string(),
            ));
        }
    }

    if let Some(host) = &cfg.run.docker_host {
        if host.trim().is_empty() {
            return Err(SeqexecError::ConfigError(
                "[run].docker_host must not be empty when set".to_string(),
            ));
        }
    }

    Ok(())
}

fn validate_commands(cfg: &RawSeriesFile) -> Result<()> {
    for (index, task) in cfg.task.iter().enumerate() {
        match task.cmd.first() {
            None => {
                return Err(SeqexecError::ConfigError(format!(
                    "task {index} has an empty `cmd`"
                )));
            }
            Some(program) if program.trim().is_empty() => {
                return Err(SeqexecError::ConfigError(format!(
                    "task {index} has an empty program name in `cmd`"
                )));
            }
            Some(_) => {}
        }
    }
    Ok(())
}
