// src/cli.rs

//! Command-line surface. Every flag here overrides a value from the series
//! file; anything left unset falls back to the file.

use clap::{Parser, ValueEnum};

use crate::config::DEFAULT_CONFIG_FILE;

#[derive(Debug, Clone, Parser)]
#[command(
    name = "seqexec",
    version,
    about = "Run a series of commands inside a running container and stream their output.",
    long_about = None
)]
pub struct CliArgs {
    /// Series file to run.
    #[arg(long, value_name = "PATH", default_value = DEFAULT_CONFIG_FILE)]
    pub config: String,

    /// Container to exec into, instead of `[run].container`.
    #[arg(long, value_name = "ID")]
    pub container: Option<String>,

    /// Start every task at once; `abort_series_on_fail` is then ignored.
    #[arg(long)]
    pub parallel: bool,

    /// Docker daemon address, instead of `[run].docker_host`.
    #[arg(long, value_name = "URL")]
    pub docker_host: Option<String>,

    /// Verbosity. Falls back to `SEQEXEC_LOG`, then `info`.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Load and check the series file, print what would run, and exit.
    #[arg(long)]
    pub dry_run: bool,
}

#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

pub fn parse() -> CliArgs {
    CliArgs::parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_without_flags() {
        let args = CliArgs::try_parse_from(["seqexec"]).unwrap();
        assert_eq!(args.config, DEFAULT_CONFIG_FILE);
        assert!(args.container.is_none());
        assert!(!args.parallel);
        assert!(!args.dry_run);
    }

    #[test]
    fn overrides_are_parsed() {
        let args = CliArgs::try_parse_from([
            "seqexec",
            "--config",
            "ci/series.toml",
            "--container",
            "web-1",
            "--parallel",
            "--log-level",
            "debug",
        ])
        .unwrap();
        assert_eq!(args.config, "ci/series.toml");
        assert_eq!(args.container.as_deref(), Some("web-1"));
        assert!(args.parallel);
        assert!(matches!(args.log_level, Some(LogLevel::Debug)));
    }
}
