// SPDX-License-Identifier: MIT
//
// Diagnostic logging.
//
// While raw mode is on, stdout carries frames and stderr is painted over by
// them, so logs can only go to a file. Without `--log-file` no subscriber is
// installed and every `tracing` macro is a no-op.

use std::fs::{File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use thiserror::Error;
use tracing_subscriber::filter::ParseError;
use tracing_subscriber::util::TryInitError;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::LogConfig;

/// Logging could not be set up.
#[derive(Debug, Error)]
pub enum LogError {
    #[error("open log file {}: {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("log filter: {0}")]
    Filter(#[from] ParseError),

    #[error("install log subscriber: {0}")]
    Install(#[from] TryInitError),
}

/// Install the file logger if one is configured.
///
/// # Errors
///
/// Fails if the file cannot be opened, the filter does not parse, or a
/// global subscriber is already installed.
pub fn init(config: Option<&LogConfig>) -> Result<(), LogError> {
    let Some(config) = config else {
        return Ok(());
    };

    let filter = EnvFilter::try_new(&config.filter)?;
    let file = open_log(&config.file)?;

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(Mutex::new(file))
                .with_ansi(false),
        )
        .try_init()?;

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "kiln starting");
    Ok(())
}

fn open_log(path: &Path) -> Result<File, LogError> {
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|source| LogError::Open {
            path: path.to_path_buf(),
            source,
        })
}
