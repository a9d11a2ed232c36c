// SPDX-License-Identifier: MIT
#![allow(unsafe_code)]
//
// Terminal resize notification.
//
// A SIGWINCH handler sets an `AtomicBool`; the input loop checks it once
// per poll (at most every 100 ms) and re-queries the window size. Storing
// to an atomic is one of the few operations that are async-signal-safe.

use std::sync::Once;
use std::sync::atomic::{AtomicBool, Ordering};

/// Set by the SIGWINCH handler, cleared by [`take_pending`].
static SIGWINCH_RECEIVED: AtomicBool = AtomicBool::new(false);

static HANDLER_INSTALLED: Once = Once::new();

/// Install the SIGWINCH handler. Safe to call more than once.
pub fn install_handler() {
    HANDLER_INSTALLED.call_once(|| unsafe {
        let mut sa: libc::sigaction = std::mem::zeroed();
        sa.sa_sigaction = sigwinch_handler as *const () as usize;
        sa.sa_flags = libc::SA_RESTART;
        libc::sigemptyset(&raw mut sa.sa_mask);
        libc::sigaction(libc::SIGWINCH, &raw const sa, std::ptr::null_mut());
    });
}

extern "C" fn sigwinch_handler(_sig: libc::c_int) {
    SIGWINCH_RECEIVED.store(true, Ordering::Relaxed);
}

/// Whether a resize arrived since the last call. Clears the flag.
#[must_use]
pub fn take_pending() -> bool {
    SIGWINCH_RECEIVED.swap(false, Ordering::Relaxed)
}
