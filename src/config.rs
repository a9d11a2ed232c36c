// SPDX-License-Identifier: MIT
//
// Command-line configuration.
//
//   kiln [PATH] [--log-file FILE] [--log-filter DIRECTIVES]
//
// Zero positional arguments opens an empty buffer with the welcome banner;
// one opens that file. Logging is off unless a log file is given, because
// stdout and stderr belong to the full-screen display while raw mode is on.

use std::path::PathBuf;

use clap::Parser;

/// Default `tracing` filter when logging is enabled.
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Command-line arguments.
#[derive(Parser, Debug, Clone)]
#[command(name = "kiln")]
#[command(version)]
#[command(about = "A minimal screen-oriented terminal text viewer", long_about = None)]
pub struct Cli {
    /// File to view. Omit for an empty buffer.
    #[arg(value_name = "PATH")]
    pub path: Option<PathBuf>,

    /// Append diagnostic logs to this file
    #[arg(long, value_name = "FILE", env = "KILN_LOG_FILE")]
    pub log_file: Option<PathBuf>,

    /// Log filter directives, e.g. `debug` or `kiln_term=trace`
    #[arg(long, value_name = "DIRECTIVES", env = "KILN_LOG", default_value = DEFAULT_LOG_FILTER)]
    pub log_filter: String,
}

/// Resolved settings handed to the rest of the binary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub path: Option<PathBuf>,
    pub log: Option<LogConfig>,
}

/// Where and how much to log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    pub file: PathBuf,
    pub filter: String,
}

impl From<Cli> for Config {
    fn from(cli: Cli) -> Self {
        Self {
            path: cli.path,
            log: cli.log_file.map(|file| LogConfig {
                file,
                filter: cli.log_filter,
            }),
        }
    }
}
