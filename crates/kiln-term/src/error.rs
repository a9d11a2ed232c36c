// SPDX-License-Identifier: MIT
//
// Terminal error taxonomy.
//
// Every variant is fatal to the viewer: there is no degraded mode that can
// run without the terminal's attributes, its input stream, or its size.
// The one expected non-error, a read timeout with zero bytes, never becomes
// an `Error` — the reader reports it as `Ok(None)`.

use std::io;

use thiserror::Error;

/// Terminal layer error.
#[derive(Debug, Error)]
pub enum Error {
    /// Reading or applying the terminal's line-discipline attributes failed.
    ///
    /// `op` names the failing call (`tcgetattr` / `tcsetattr`).
    #[error("{op}: {source}")]
    TerminalQuery {
        op: &'static str,
        #[source]
        source: io::Error,
    },

    /// Reading from the terminal failed for a reason other than "no data yet".
    #[error("read: {0}")]
    InputRead(#[source] io::Error),

    /// Neither `TIOCGWINSZ` nor the cursor-report fallback produced a size.
    #[error("window size: {0}")]
    GeometryQuery(#[source] io::Error),

    /// Writing a frame or control sequence to the terminal failed.
    #[error("write: {0}")]
    Output(#[from] io::Error),
}

impl Error {
    /// Build a [`TerminalQuery`](Self::TerminalQuery) from `errno`.
    pub(crate) fn terminal_query(op: &'static str) -> Self {
        Self::TerminalQuery {
            op,
            source: io::Error::last_os_error(),
        }
    }
}

/// Result alias for the terminal layer.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminal_query_names_the_operation() {
        let err = Error::TerminalQuery {
            op: "tcgetattr",
            source: io::Error::from_raw_os_error(libc::ENOTTY),
        };
        let msg = err.to_string();
        assert!(msg.starts_with("tcgetattr: "), "{msg}");
    }

    #[test]
    fn input_read_prefix() {
        let err = Error::InputRead(io::Error::other("boom"));
        assert_eq!(err.to_string(), "read: boom");
    }

    #[test]
    fn geometry_prefix() {
        let err = Error::GeometryQuery(io::Error::other("no report"));
        assert_eq!(err.to_string(), "window size: no report");
    }

    #[test]
    fn io_error_converts_to_output() {
        let err: Error = io::Error::other("pipe closed").into();
        assert!(matches!(err, Error::Output(_)));
    }

    #[test]
    fn source_is_preserved() {
        use std::error::Error as _;
        let err = Error::InputRead(io::Error::other("inner"));
        assert_eq!(err.source().map(ToString::to_string), Some("inner".into()));
    }
}
