//! File loading errors.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Loading a file into a [`LineStore`](crate::lines::LineStore) failed.
#[derive(Debug, Error)]
pub enum LoadError {
    /// The file could not be opened for reading.
    #[error("fopen {}: {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Reading failed partway through the file.
    #[error("read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}
