// SPDX-License-Identifier: MIT
//
// Terminal session — raw mode with guaranteed restore.
//
// Safety: This module necessarily uses `unsafe` for termios (tcgetattr,
// tcsetattr), isatty, and raw fd writes. These are the standard POSIX
// interfaces for terminal control — there is no safe alternative. Each
// unsafe block is minimal.
#![allow(unsafe_code)]
//
// `TerminalSession::enable` captures the terminal's attributes once, derives
// a raw copy, and applies it. The captured original is never mutated; it is
// what `disable` puts back. Restoration is guaranteed three ways:
//
//   - `disable()` on the normal quit path, so a failure can be reported;
//   - `Drop`, for any early return or `?` out of the caller;
//   - a panic hook, which cannot reach the session, so it restores from a
//     global backup of the same attributes.
//
// The panic hook bypasses Rust's stdout lock entirely, writing a pre-built
// restore sequence directly to fd 1. If the panic happened while a frame
// flush held the lock, going through `io::stdout()` would deadlock.

use std::os::fd::RawFd;
use std::sync::{Mutex, Once};

use tracing::debug;

use crate::error::{Error, Result};

// ─── Raw attributes ─────────────────────────────────────────────────────────

/// Derive the raw-mode attribute set from the captured original.
///
/// - input: no CR→NL, no XON/XOFF, no break interrupt, no parity check,
///   no 8th-bit strip;
/// - output: no post-processing, so `\n` is not expanded to `\r\n`;
/// - local: no echo, no canonical line buffering, no signal keys, no
///   extended input processing (Ctrl+V);
/// - control: 8-bit characters;
/// - timing: `read()` returns after one byte or 100 ms, whichever first.
#[must_use]
pub fn raw_attributes(original: &libc::termios) -> libc::termios {
    let mut raw = *original;

    raw.c_iflag &= !(libc::ICRNL | libc::IXON | libc::BRKINT | libc::INPCK | libc::ISTRIP);
    raw.c_oflag &= !libc::OPOST;
    raw.c_lflag &= !(libc::ECHO | libc::ICANON | libc::ISIG | libc::IEXTEN);
    raw.c_cflag |= libc::CS8;

    // VMIN=0, VTIME=1: return with whatever arrived, after at most 1/10 s.
    raw.c_cc[libc::VMIN] = 0;
    raw.c_cc[libc::VTIME] = 1;

    raw
}

fn get_attributes(fd: RawFd) -> Result<libc::termios> {
    let mut termios: libc::termios = unsafe { std::mem::zeroed() };
    if unsafe { libc::tcgetattr(fd, &raw mut termios) } != 0 {
        return Err(Error::terminal_query("tcgetattr"));
    }
    Ok(termios)
}

fn set_attributes(fd: RawFd, termios: &libc::termios) -> Result<()> {
    if unsafe { libc::tcsetattr(fd, libc::TCSAFLUSH, termios) } != 0 {
        return Err(Error::terminal_query("tcsetattr"));
    }
    Ok(())
}

// ─── Panic-Safe Terminal Restore ────────────────────────────────────────────

/// Global backup of the original attributes for panic recovery.
///
/// The [`TerminalSession`] owns its own copy, but the panic hook can't
/// access it. This backup — behind a [`Mutex`], not `static mut` — lets the
/// hook restore cooked mode without the struct.
static TERMIOS_BACKUP: Mutex<Option<libc::termios>> = Mutex::new(None);

/// Restore termios from the global backup. Best-effort, ignores errors.
fn restore_termios_from_backup() {
    if let Ok(guard) = TERMIOS_BACKUP.lock() {
        if let Some(ref original) = *guard {
            unsafe {
                let _ = libc::tcsetattr(libc::STDIN_FILENO, libc::TCSAFLUSH, original);
            }
        }
    }
}

/// Screen reset for fatal exits: clear, home, show cursor.
pub const EMERGENCY_RESTORE: &[u8] = b"\x1b[2J\x1b[H\x1b[?25h";

/// Panic hook guard — ensures the hook is installed at most once per process.
static PANIC_HOOK_INSTALLED: Once = Once::new();

/// Install a panic hook that restores the terminal before printing the error.
fn install_panic_hook() {
    PANIC_HOOK_INSTALLED.call_once(|| {
        let original = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            emergency_restore();
            restore_termios_from_backup();
            original(info);
        }));
    });
}

/// Write [`EMERGENCY_RESTORE`] directly to stdout's file descriptor.
///
/// Bypasses Rust's `io::stdout()` lock to avoid deadlocking if the panic
/// occurred while the lock was held (e.g., mid-frame flush).
pub fn emergency_restore() {
    unsafe {
        let _ = libc::write(
            libc::STDOUT_FILENO,
            EMERGENCY_RESTORE.as_ptr().cast::<libc::c_void>(),
            EMERGENCY_RESTORE.len(),
        );
    }
}

// ─── TerminalSession ────────────────────────────────────────────────────────

/// Exclusive ownership of the terminal's line discipline while raw.
///
/// # Example
///
/// ```no_run
/// use kiln_term::terminal::TerminalSession;
///
/// let mut session = TerminalSession::enable()?;
/// // ... render frames, decode keys ...
/// session.disable()?;
/// # Ok::<(), kiln_term::Error>(())
/// ```
pub struct TerminalSession {
    fd: RawFd,
    /// Attributes captured before entering raw mode. Never mutated.
    original: libc::termios,
    active: bool,
}

impl TerminalSession {
    /// Capture the terminal's attributes and switch it to raw mode.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TerminalQuery`] if the attributes cannot be read
    /// (stdin is not a terminal) or the raw set cannot be applied.
    pub fn enable() -> Result<Self> {
        Self::enable_on(libc::STDIN_FILENO)
    }

    fn enable_on(fd: RawFd) -> Result<Self> {
        let original = get_attributes(fd)?;

        if let Ok(mut guard) = TERMIOS_BACKUP.lock() {
            *guard = Some(original);
        }
        install_panic_hook();

        // From here on, Drop puts the original back even if applying fails
        // halfway.
        let session = Self {
            fd,
            original,
            active: true,
        };
        set_attributes(fd, &raw_attributes(&session.original))?;

        debug!(fd, "terminal in raw mode");
        Ok(session)
    }

    /// Whether raw mode is still applied.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.active
    }

    /// Reapply the captured attributes.
    ///
    /// Idempotent: calling `disable()` again after success is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TerminalQuery`] if `tcsetattr` fails. The terminal
    /// is then left raw; the caller should treat it as fatal.
    pub fn disable(&mut self) -> Result<()> {
        if !self.active {
            return Ok(());
        }

        set_attributes(self.fd, &self.original)?;
        self.active = false;

        if let Ok(mut guard) = TERMIOS_BACKUP.lock() {
            *guard = None;
        }

        debug!(fd = self.fd, "terminal attributes restored");
        Ok(())
    }
}

impl Drop for TerminalSession {
    fn drop(&mut self) {
        let _ = self.disable();
    }
}

impl std::fmt::Debug for TerminalSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TerminalSession")
            .field("fd", &self.fd)
            .field("active", &self.active)
            .finish_non_exhaustive()
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
