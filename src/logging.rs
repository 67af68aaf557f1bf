// src/logging.rs

//! Diagnostics go to stderr through a `tracing` fmt subscriber; stdout is
//! reserved for task output. `--log-level` wins over `SEQEXEC_LOG`, and
//! `info` applies when neither is usable.

use anyhow::{Result, anyhow};
use tracing::Level;
use tracing_subscriber::fmt;

use crate::cli::LogLevel;

pub const LOG_ENV_VAR: &str = "SEQEXEC_LOG";

pub fn init_logging(cli_level: Option<LogLevel>) -> Result<()> {
    let env_level = std::env::var(LOG_ENV_VAR).ok();
    let level = resolve_level(cli_level, env_level.as_deref());

    fmt()
        .with_max_level(level)
        .with_target(true)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow!("installing tracing subscriber: {e}"))
}

fn resolve_level(cli_level: Option<LogLevel>, env_level: Option<&str>) -> Level {
    if let Some(lvl) = cli_level {
        return match lvl {
            LogLevel::Error => Level::ERROR,
            LogLevel::Warn => Level::WARN,
            LogLevel::Info => Level::INFO,
            LogLevel::Debug => Level::DEBUG,
            LogLevel::Trace => Level::TRACE,
        };
    }

    // Unknown env values are ignored rather than rejected.
    match env_level.map(|s| s.trim().to_lowercase()).as_deref() {
        Some("error") => Level::ERROR,
        Some("warn" | "warning") => Level::WARN,
        Some("debug") => Level::DEBUG,
        Some("trace") => Level::TRACE,
        _ => Level::INFO,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flag_beats_env() {
        assert_eq!(resolve_level(Some(LogLevel::Error), Some("trace")), Level::ERROR);
    }

    #[test]
    fn env_strings_and_fallback() {
        assert_eq!(resolve_level(None, Some(" Warning ")), Level::WARN);
        assert_eq!(resolve_level(None, Some("TRACE")), Level::TRACE);
        assert_eq!(resolve_level(None, Some("loud")), Level::INFO);
        assert_eq!(resolve_level(None, None), Level::INFO);
    }
}
