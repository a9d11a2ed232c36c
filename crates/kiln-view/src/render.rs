//! Renderer — one frame, one write.
//!
//! A frame is composed into an [`OutputBuffer`] and handed to the terminal
//! in a single write:
//!
//! ```text
//! ESC[?25l  ESC[H                       hide cursor, home
//! <row 0> ESC[K \r\n                    content or "~", erase rest of line
//! ...
//! <row n-1> ESC[K                       no \r\n after the last row
//! ESC[<y>;<x>H  ESC[?25h                place and show the cursor
//! ```
//!
//! The screen is not erased per frame. Each row erases its own tail with
//! `ESC[K`, which clears whatever a previous, longer frame left behind
//! without blanking the whole display first.
//!
//! Composition is deterministic: the same viewport and lines always produce
//! the same bytes.

use std::io::{self, Write};

use kiln_term::ansi;
use kiln_term::output::OutputBuffer;
use tracing::trace;

use crate::lines::LineStore;
use crate::viewport::Viewport;

/// Program name shown in the welcome banner.
pub const PROGRAM_NAME: &str = "Kiln editor";

/// Program version shown in the welcome banner.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// The welcome banner text, e.g. `Kiln editor -- version 0.1.0`.
#[must_use]
pub fn banner() -> String {
    format!("{PROGRAM_NAME} -- version {VERSION}")
}

/// Bring the cursor into view, compose a frame, and write it in one go.
///
/// # Errors
///
/// Returns an error if writing to `out` fails.
pub fn refresh_screen(
    view: &mut Viewport,
    lines: &LineStore,
    out: &mut impl Write,
) -> io::Result<()> {
    view.scroll_to_cursor();
    let mut frame = compose(view, lines)?;
    trace!(bytes = frame.len(), rowoff = view.rowoff(), "frame");
    frame.flush_to(out)
}

/// Compose one frame for the current viewport and lines.
///
/// Does not scroll; call [`Viewport::scroll_to_cursor`] first (as
/// [`refresh_screen`] does) if the cursor may have left the window.
///
/// # Errors
///
/// Only if writing to the in-memory buffer fails, which it does not.
pub fn compose(view: &Viewport, lines: &LineStore) -> io::Result<OutputBuffer> {
    let mut frame = OutputBuffer::new();

    ansi::cursor_hide(&mut frame)?;
    ansi::cursor_home(&mut frame)?;

    draw_rows(&mut frame, view, lines)?;

    let (x, y) = view.screen_cursor();
    ansi::cursor_to(&mut frame, x, y)?;
    ansi::cursor_show(&mut frame)?;

    Ok(frame)
}

/// Draw every screen row: file content, the banner, or `~` filler.
///
/// # Errors
///
/// Propagates writer errors.
pub fn draw_rows(out: &mut OutputBuffer, view: &Viewport, lines: &LineStore) -> io::Result<()> {
    let rows = view.rows();
    let cols = view.cols();

    for y in 0..rows {
        let filerow = y + view.rowoff();

        match lines.get(filerow) {
            Some(line) => {
                let text = line.as_bytes();
                out.append(&text[..text.len().min(cols)]);
            }
            None if lines.is_empty() && y == rows / 3 => draw_banner(out, cols),
            None => out.append(b"~"),
        }

        ansi::erase_line(out)?;
        if y + 1 < rows {
            out.append(b"\r\n");
        }
    }

    Ok(())
}

/// Centre the banner in `cols`. The `~` filler takes the first padding
/// column.
fn draw_banner(out: &mut OutputBuffer, cols: usize) {
    let text = banner();
    let text = &text.as_bytes()[..text.len().min(cols)];

    let mut padding = (cols - text.len()) / 2;
    if padding > 0 {
        out.append(b"~");
        padding -= 1;
    }
    for _ in 0..padding {
        out.append(b" ");
    }
    out.append(text);
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
