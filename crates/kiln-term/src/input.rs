// SPDX-License-Identifier: MIT
//
// Key decoder.
//
// Turns the raw terminal byte stream into one logical key per call:
// printable and control bytes pass through as `Key::Char`, and the
// ESC-prefixed sequences terminals send for navigation keys become named
// keys.
//
// # Design
//
// Matching is split from reading. `match_sequence` is a pure function over
// the bytes seen after ESC; it says whether they form a complete key, need
// more input, or can never match. The `Decoder` reads one byte at a time
// and asks the matcher after each. If the stream starves mid-sequence (the
// 100 ms read timeout fires), the ESC was a real Escape keypress.
//
// Recognised sequences:
//
//   ESC [ A / B / C / D        arrows
//   ESC [ H / F, ESC O H / F   Home / End
//   ESC [ 1~ 7~                Home
//   ESC [ 4~ 8~                End
//   ESC [ 3~                   Delete
//   ESC [ 5~ 6~                PageUp / PageDown
//
// Everything else that starts with ESC decodes as `Key::Escape`. A byte
// that could not have been part of the sequence is kept in the look-ahead
// buffer and decoded on the next call, so Alt+x (ESC x) still yields the
// `x` and `ESC [ ESC [ A` still yields Up. Only bytes in `@`..`~` can end
// a sequence.

use tracing::trace;

use crate::error::{Error, Result};
use crate::reader::ByteSource;

/// The escape byte.
pub const ESC: u8 = 0x1b;

/// Longest sequence tail after ESC (`[`, digit, `~`).
const MAX_TAIL: usize = 3;

// ─── Keys ───────────────────────────────────────────────────────────────────

/// A decoded key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    /// A single byte: printable ASCII, a control byte, or a high byte.
    Char(u8),
    /// A lone ESC, or an ESC sequence we do not recognise.
    Escape,
    Up,
    Down,
    Left,
    Right,
    Home,
    End,
    PageUp,
    PageDown,
    Delete,
}

/// The byte a terminal sends for Ctrl plus `letter`.
///
/// Ctrl clears bits 5 and 6 of the letter, so `ctrl(b'q')` is `0x11`.
#[inline]
#[must_use]
pub const fn ctrl(letter: u8) -> u8 {
    letter & 0x1f
}

impl Key {
    /// Whether this key is Ctrl plus `letter`.
    #[inline]
    #[must_use]
    pub const fn is_ctrl(self, letter: u8) -> bool {
        matches!(self, Self::Char(b) if b == ctrl(letter))
    }
}

// ─── Sequence matching ──────────────────────────────────────────────────────

/// What the bytes after ESC amount to so far.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Match {
    /// A complete, recognised sequence.
    Key(Key),
    /// A valid prefix; read another byte.
    Partial,
    /// A complete sequence we do not map. Consumed; decodes as Escape.
    Unrecognized,
    /// The last byte cannot continue this sequence. Decodes as Escape and
    /// the last byte is pushed back for the next call.
    Mismatch,
}

/// Classify the bytes that followed an ESC.
///
/// Pure: the same tail always gives the same answer.
#[must_use]
pub fn match_sequence(tail: &[u8]) -> Match {
    match tail {
        [] | [b'[' | b'O'] => Match::Partial,

        [b'[', d] if d.is_ascii_digit() => Match::Partial,
        [b'[', d, b'~'] => tilde_key(*d).map_or(Match::Unrecognized, Match::Key),
        [b'[', d, _] if d.is_ascii_digit() => Match::Mismatch,
        [b'[', final_byte] => match final_byte {
            b'A' => Match::Key(Key::Up),
            b'B' => Match::Key(Key::Down),
            b'C' => Match::Key(Key::Right),
            b'D' => Match::Key(Key::Left),
            b'H' => Match::Key(Key::Home),
            b'F' => Match::Key(Key::End),
            b if is_final_byte(*b) => Match::Unrecognized,
            _ => Match::Mismatch,
        },

        [b'O', b'H'] => Match::Key(Key::Home),
        [b'O', b'F'] => Match::Key(Key::End),
        [b'O', b] if is_final_byte(*b) => Match::Unrecognized,

        _ => Match::Mismatch,
    }
}

/// Whether `b` can end a CSI or SS3 sequence (`@` through `~`).
///
/// Anything else, ESC included, starts the next key instead.
#[inline]
#[must_use]
pub const fn is_final_byte(b: u8) -> bool {
    matches!(b, 0x40..=0x7e)
}

/// Named key for `ESC [ <digit> ~`.
#[must_use]
pub const fn tilde_key(digit: u8) -> Option<Key> {
    match digit {
        b'1' | b'7' => Some(Key::Home),
        b'3' => Some(Key::Delete),
        b'4' | b'8' => Some(Key::End),
        b'5' => Some(Key::PageUp),
        b'6' => Some(Key::PageDown),
        _ => None,
    }
}

// ─── Decoder ────────────────────────────────────────────────────────────────

/// Pull-based key decoder over a [`ByteSource`].
///
/// The only state kept between calls is at most one pushed-back byte.
pub struct Decoder<S> {
    source: S,
    lookahead: Option<u8>,
}

impl<S: ByteSource> Decoder<S> {
    /// Decode keys from `source`.
    pub const fn new(source: S) -> Self {
        Self {
            source,
            lookahead: None,
        }
    }

    /// Borrow the byte source (the geometry fallback shares it).
    pub const fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }

    /// Block until one key is decoded.
    ///
    /// Polls through read timeouts indefinitely; only a failing read ends
    /// the wait early.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InputRead`] if the terminal read fails.
    pub fn read_key(&mut self) -> Result<Key> {
        loop {
            if let Some(key) = self.poll_key()? {
                return Ok(key);
            }
        }
    }

    /// Decode one key if a byte arrives within one read timeout.
    ///
    /// Returns `Ok(None)` when the timeout passes with no input.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InputRead`] if the terminal read fails.
    pub fn poll_key(&mut self) -> Result<Option<Key>> {
        let first = match self.lookahead.take() {
            Some(b) => b,
            None => match self.next_byte()? {
                Some(b) => b,
                None => return Ok(None),
            },
        };

        let key = if first == ESC {
            self.decode_escape()?
        } else {
            Key::Char(first)
        };
        trace!(?key, "decoded key");
        Ok(Some(key))
    }

    /// Decode the rest of a sequence after ESC has been read.
    fn decode_escape(&mut self) -> Result<Key> {
        let mut tail = [0u8; MAX_TAIL];
        let mut len = 0;

        loop {
            match match_sequence(&tail[..len]) {
                Match::Key(key) => return Ok(key),
                Match::Unrecognized => return Ok(Key::Escape),
                Match::Mismatch => {
                    self.lookahead = Some(tail[len - 1]);
                    return Ok(Key::Escape);
                }
                Match::Partial => {}
            }

            // The matcher never asks for more than MAX_TAIL bytes.
            debug_assert!(len < MAX_TAIL);
            match self.next_byte()? {
                Some(b) => {
                    tail[len] = b;
                    len += 1;
                }
                None => return Ok(Key::Escape),
            }
        }
    }

    fn next_byte(&mut self) -> Result<Option<u8>> {
        self.source.read_byte().map_err(Error::InputRead)
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
