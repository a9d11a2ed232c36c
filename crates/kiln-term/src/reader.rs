// SPDX-License-Identifier: MIT
//
// Terminal byte source — where the key decoder gets its bytes.
//
// In raw mode the terminal is configured with VMIN=0 / VTIME=1: a `read()`
// returns as soon as at least one byte is available, or after 100 ms with
// zero bytes. That timeout is the loop's only suspension point. It is not an
// error, so the source reports it as `Ok(None)` and the decoder keeps
// polling. `EAGAIN` and `EINTR` are folded into the same "nothing yet"
// answer; anything else is a real input failure.
//
// Reads are chunked: a single keypress that arrives as a three-byte escape
// sequence costs one syscall, not three.

use std::collections::VecDeque;
use std::io::{self, Read};

/// Upper bound on bytes pulled per `read()`.
///
/// A keypress is 1–4 bytes; a cursor-position report is under 16. 64 is
/// plenty without holding large pastes in the queue.
const READ_CHUNK: usize = 64;

/// A source of raw terminal bytes with timeout semantics.
pub trait ByteSource {
    /// Return the next byte, or `Ok(None)` if none arrived within the
    /// read timeout.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying read fails for a reason other
    /// than "no data yet".
    fn read_byte(&mut self) -> io::Result<Option<u8>>;
}

/// Byte source over any [`Read`], with a small internal queue.
///
/// `Ok(0)` from the reader is the raw-mode timeout. Over a plain slice
/// that means "exhausted" — every further read is a timeout, which is
/// exactly what tests want.
pub struct TtyInput<R> {
    inner: R,
    pending: VecDeque<u8>,
}

impl TtyInput<io::Stdin> {
    /// Byte source over the process's standard input.
    #[must_use]
    pub fn stdin() -> Self {
        Self::new(io::stdin())
    }
}

impl<R: Read> TtyInput<R> {
    /// Wrap a reader.
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            pending: VecDeque::with_capacity(READ_CHUNK),
        }
    }
}

impl<R: Read> ByteSource for TtyInput<R> {
    fn read_byte(&mut self) -> io::Result<Option<u8>> {
        if let Some(b) = self.pending.pop_front() {
            return Ok(Some(b));
        }

        let mut chunk = [0u8; READ_CHUNK];
        match self.inner.read(&mut chunk) {
            Ok(0) => Ok(None),
            Ok(n) => {
                self.pending.extend(&chunk[..n]);
                Ok(self.pending.pop_front())
            }
            Err(e)
                if matches!(
                    e.kind(),
                    io::ErrorKind::WouldBlock | io::ErrorKind::Interrupted
                ) =>
            {
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
