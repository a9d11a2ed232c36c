// SPDX-License-Identifier: MIT
//
// kiln-term — Terminal layer for kiln.
//
// Everything that touches the controlling terminal lives here: the raw-mode
// session and its guaranteed restore, the byte source behind the key
// decoder, the escape vocabulary we emit, the frame output buffer, and the
// window-geometry query with its cursor-report fallback.
//
// No TUI framework sits underneath. Raw termios via libc, ANSI escape
// sequences written by hand, one write per frame.

#[cfg(not(unix))]
compile_error!("kiln-term drives the terminal through termios and requires a Unix target");

pub mod ansi;
pub mod error;
pub mod geometry;
pub mod input;
pub mod output;
pub mod reader;
pub mod resize;
pub mod terminal;

pub use error::{Error, Result};
