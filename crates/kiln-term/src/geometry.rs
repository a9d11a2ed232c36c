// SPDX-License-Identifier: MIT
#![allow(unsafe_code)]
//
// Window geometry.
//
// The direct route is `ioctl(TIOCGWINSZ)`. Some terminals (serial lines,
// certain multiplexers) answer with zero columns or not at all. For those we
// push the cursor as far down and right as it will go and ask the terminal
// where it ended up. The cursor-position report is the screen size.
//
// The fallback reads its answer through the same byte source the key
// decoder uses, so it must run before the input loop starts.

use std::io::{self, Write};

use tracing::{debug, warn};

use crate::ansi;
use crate::error::{Error, Result};
use crate::reader::ByteSource;

/// Longest cursor-position report we will read (`ESC [ rrrrr ; ccccc R`).
const REPORT_MAX: usize = 31;

// ─── Size ───────────────────────────────────────────────────────────────────

/// Terminal dimensions in character cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Size {
    /// Number of columns (width in character cells).
    pub cols: u16,
    /// Number of rows (height in character cells).
    pub rows: u16,
}

impl Size {
    /// Build a size from columns and rows.
    #[inline]
    #[must_use]
    pub const fn new(cols: u16, rows: u16) -> Self {
        Self { cols, rows }
    }
}

// ─── Queries ────────────────────────────────────────────────────────────────

/// Query the current terminal size via `ioctl(TIOCGWINSZ)`.
///
/// Returns `None` if stdout is not a terminal, the query fails, or the
/// terminal reports a zero dimension.
#[must_use]
pub fn window_size() -> Option<Size> {
    let mut ws: libc::winsize = unsafe { std::mem::zeroed() };
    let result = unsafe { libc::ioctl(libc::STDOUT_FILENO, libc::TIOCGWINSZ, &raw mut ws) };

    if result == 0 && ws.ws_col > 0 && ws.ws_row > 0 {
        Some(Size::new(ws.ws_col, ws.ws_row))
    } else {
        None
    }
}

/// Determine the screen size, falling back to a cursor-position report.
///
/// # Errors
///
/// Returns [`Error::GeometryQuery`] if the direct query fails and the
/// terminal does not answer the cursor report with a usable size.
pub fn query_size(out: &mut impl Write, input: &mut impl ByteSource) -> Result<Size> {
    resolve_size(window_size(), out, input)
}

/// [`query_size`] with the direct result supplied by the caller.
///
/// # Errors
///
/// Same as [`query_size`].
pub fn resolve_size(
    direct: Option<Size>,
    out: &mut impl Write,
    input: &mut impl ByteSource,
) -> Result<Size> {
    if let Some(size) = direct {
        debug!(cols = size.cols, rows = size.rows, "window size from TIOCGWINSZ");
        return Ok(size);
    }

    warn!("TIOCGWINSZ unavailable, asking the terminal for its cursor position");
    let size = cursor_report_size(out, input).map_err(Error::GeometryQuery)?;
    debug!(cols = size.cols, rows = size.rows, "window size from cursor report");
    Ok(size)
}

fn cursor_report_size(out: &mut impl Write, input: &mut impl ByteSource) -> io::Result<Size> {
    ansi::cursor_to_bottom_right(out)?;
    ansi::request_cursor_position(out)?;
    out.flush()?;

    let mut report = Vec::with_capacity(REPORT_MAX);
    while report.len() < REPORT_MAX {
        match input.read_byte()? {
            Some(b'R') | None => break,
            Some(b) => report.push(b),
        }
    }

    parse_cursor_report(&report).ok_or_else(|| {
        io::Error::new(
            io::ErrorKind::InvalidData,
            "malformed cursor position report",
        )
    })
}

/// Parse the body of a cursor-position report, `ESC [ <rows> ; <cols>`.
///
/// The terminating `R` is not included. Zero dimensions are rejected.
#[must_use]
pub fn parse_cursor_report(report: &[u8]) -> Option<Size> {
    let body = report.strip_prefix(b"\x1b[")?;
    let text = std::str::from_utf8(body).ok()?;
    let (rows, cols) = text.split_once(';')?;
    let rows: u16 = rows.parse().ok()?;
    let cols: u16 = cols.parse().ok()?;

    (rows > 0 && cols > 0).then_some(Size::new(cols, rows))
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reader::TtyInput;
    use pretty_assertions::assert_eq;

    #[test]
    fn parse_valid_report() {
        assert_eq!(parse_cursor_report(b"\x1b[24;80"), Some(Size::new(80, 24)));
    }

    #[test]
    fn parse_large_report() {
        assert_eq!(
            parse_cursor_report(b"\x1b[200;500"),
            Some(Size::new(500, 200))
        );
    }

    #[test]
    fn parse_rejects_missing_prefix() {
        assert_eq!(parse_cursor_report(b"24;80"), None);
        assert_eq!(parse_cursor_report(b"\x1b24;80"), None);
    }

    #[test]
    fn parse_rejects_missing_separator() {
        assert_eq!(parse_cursor_report(b"\x1b[2480"), None);
    }

    #[test]
    fn parse_rejects_zero() {
        assert_eq!(parse_cursor_report(b"\x1b[0;80"), None);
        assert_eq!(parse_cursor_report(b"\x1b[24;0"), None);
    }

    #[test]
    fn parse_rejects_garbage() {
        assert_eq!(parse_cursor_report(b"\x1b[a;b"), None);
        assert_eq!(parse_cursor_report(b""), None);
    }

    #[test]
    fn direct_size_wins() {
        let mut out = Vec::new();
        let mut input = TtyInput::new(&b"\x1b[1;1R"[..]);
        let size = resolve_size(Some(Size::new(120, 40)), &mut out, &mut input).unwrap();
        assert_eq!(size, Size::new(120, 40));
        assert!(out.is_empty(), "no fallback sequences when ioctl works");
    }

    #[test]
    fn fallback_moves_cursor_and_asks() {
        let mut out = Vec::new();
        let mut input = TtyInput::new(&b"\x1b[24;80R"[..]);
        let size = resolve_size(None, &mut out, &mut input).unwrap();
        assert_eq!(size, Size::new(80, 24));
        assert_eq!(out, b"\x1b[999C\x1b[999B\x1b[6n");
    }

    #[test]
    fn fallback_leaves_following_input_alone() {
        let mut out = Vec::new();
        let mut input = TtyInput::new(&b"\x1b[10;40Rq"[..]);
        resolve_size(None, &mut out, &mut input).unwrap();
        assert_eq!(input.read_byte().unwrap(), Some(b'q'));
    }

    #[test]
    fn fallback_without_answer_fails() {
        let mut out = Vec::new();
        let mut input = TtyInput::new(&b""[..]);
        let err = resolve_size(None, &mut out, &mut input).unwrap_err();
        assert!(matches!(err, Error::GeometryQuery(_)));
    }

    #[test]
    fn fallback_with_overlong_answer_fails() {
        let mut out = Vec::new();
        let noise = [b'9'; 64];
        let mut input = TtyInput::new(&noise[..]);
        assert!(resolve_size(None, &mut out, &mut input).is_err());
    }

    #[test]
    fn window_size_does_not_panic() {
        let _ = window_size();
    }
}
