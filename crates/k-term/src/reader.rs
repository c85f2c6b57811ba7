// SPDX-License-Identifier: MIT
#![allow(unsafe_code)]
//
// Terminal key reader — blocking single-key reads with resize detection.
//
// The editor is single-threaded around one blocking point: the key read.
// `TermKeys` polls stdin with a ~100 ms timeout so that, between polls, it
// can observe the SIGWINCH flag and synthesize a `Key::Resize` event. The
// signal handler itself only sets an `AtomicBool` (one of the few
// operations that is async-signal-safe); everything else happens on the
// main thread.
//
// Escape sequences are collected with a short staged timeout: after an ESC
// byte, each payload byte gets `ESC_TIMEOUT_MS` to arrive. A user pressing
// the Escape key alone therefore sees a lone ESC after one short timeout,
// while a terminal-generated sequence (which arrives in a single burst)
// decodes immediately.

use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Once;

use crate::input::{decode_escape, Key, KeySource, ESC};

/// How long one poll waits before checking the resize flag (milliseconds).
const POLL_TIMEOUT_MS: i32 = 100;

/// How long each escape payload byte gets to arrive (milliseconds).
///
/// Terminal-generated sequences arrive in one burst, so this only delays
/// a human pressing the Escape key by itself.
const ESC_TIMEOUT_MS: i32 = 25;

// ─── SIGWINCH ────────────────────────────────────────────────────────────────

/// Global flag set by the SIGWINCH handler, drained by the reader.
static RESIZE_PENDING: AtomicBool = AtomicBool::new(false);

/// Handler installation guard — at most once per process.
static SIGWINCH_INSTALLED: Once = Once::new();

/// Install the SIGWINCH (terminal resize) handler.
///
/// The handler simply sets [`RESIZE_PENDING`]. Writing an atomic is
/// async-signal-safe; recomputing dimensions is not, so that happens on
/// the main thread when the flag is observed.
#[cfg(unix)]
fn install_sigwinch_handler() {
    SIGWINCH_INSTALLED.call_once(|| unsafe {
        let mut sa: libc::sigaction = std::mem::zeroed();
        sa.sa_sigaction = sigwinch_handler as *const () as usize;
        sa.sa_flags = libc::SA_RESTART;
        libc::sigemptyset(&mut sa.sa_mask);
        libc::sigaction(libc::SIGWINCH, &sa, std::ptr::null_mut());
    });
}

#[cfg(unix)]
extern "C" fn sigwinch_handler(_sig: libc::c_int) {
    RESIZE_PENDING.store(true, Ordering::Relaxed);
}

#[cfg(not(unix))]
fn install_sigwinch_handler() {
    // No-op on non-unix platforms.
}

/// Consume the pending-resize flag. Returns `true` at most once per signal.
#[must_use]
pub fn take_resize() -> bool {
    RESIZE_PENDING.swap(false, Ordering::Relaxed)
}

// ─── TermKeys ───────────────────────────────────────────────────────────────

/// Terminal-backed [`KeySource`].
///
/// Reads raw bytes from stdin (which must be in raw mode; see
/// [`Terminal`](crate::terminal::Terminal)) and decodes them into [`Key`]
/// values. Installs the SIGWINCH handler on construction.
pub struct TermKeys {
    #[cfg(unix)]
    fd: libc::c_int,
}

impl TermKeys {
    /// Create a reader over stdin and install the resize handler.
    #[must_use]
    pub fn new() -> Self {
        install_sigwinch_handler();

        #[cfg(unix)]
        {
            Self {
                fd: libc::STDIN_FILENO,
            }
        }

        #[cfg(not(unix))]
        {
            Self {}
        }
    }

    /// Wait up to `timeout_ms` for one byte from the terminal.
    ///
    /// Returns `Ok(None)` on timeout or interruption by a signal (the
    /// caller re-checks the resize flag and polls again).
    #[cfg(unix)]
    fn read_byte(&self, timeout_ms: i32) -> io::Result<Option<u8>> {
        let ready = unsafe {
            let mut pfd = libc::pollfd {
                fd: self.fd,
                events: libc::POLLIN,
                revents: 0,
            };
            libc::poll(&mut pfd, 1, timeout_ms)
        };

        if ready < 0 {
            let err = io::Error::last_os_error();
            // A signal (SIGWINCH) interrupts poll; treat it as a timeout
            // so the caller observes the resize flag.
            if err.kind() == io::ErrorKind::Interrupted {
                return Ok(None);
            }
            return Err(err);
        }
        if ready == 0 {
            return Ok(None);
        }

        let mut b: u8 = 0;
        let n = unsafe { libc::read(self.fd, std::ptr::addr_of_mut!(b).cast(), 1) };
        match n {
            1 => Ok(Some(b)),
            0 => Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "stdin closed",
            )),
            _ => {
                let err = io::Error::last_os_error();
                if err.kind() == io::ErrorKind::Interrupted {
                    Ok(None)
                } else {
                    Err(err)
                }
            }
        }
    }

    /// Non-unix fallback: blocking reads with no timeout and no resize
    /// detection. Functional, but escape disambiguation degrades.
    #[cfg(not(unix))]
    fn read_byte(&self, _timeout_ms: i32) -> io::Result<Option<u8>> {
        use std::io::Read;

        let mut b = [0u8; 1];
        match io::stdin().lock().read(&mut b)? {
            0 => Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "stdin closed",
            )),
            _ => Ok(Some(b[0])),
        }
    }
}

impl Default for TermKeys {
    fn default() -> Self {
        Self::new()
    }
}

impl KeySource for TermKeys {
    /// Block until the next keystroke, waking every [`POLL_TIMEOUT_MS`] to
    /// check for a pending resize.
    fn read_key(&mut self) -> io::Result<Key> {
        let first = loop {
            match self.read_byte(POLL_TIMEOUT_MS)? {
                Some(b) => break b,
                None => {
                    if take_resize() {
                        return Ok(Key::Resize);
                    }
                }
            }
        };

        if first != ESC {
            return Ok(Key::Char(first));
        }

        // Collect the escape payload. A timeout at any stage means the
        // user pressed the Escape key by itself (or sent a sequence we
        // cannot decode), which decays to a lone ESC.
        let Some(b0) = self.read_byte(ESC_TIMEOUT_MS)? else {
            return Ok(Key::Char(ESC));
        };
        let Some(b1) = self.read_byte(ESC_TIMEOUT_MS)? else {
            return Ok(Key::Char(ESC));
        };

        if b0 == b'[' && b1.is_ascii_digit() {
            let Some(b2) = self.read_byte(ESC_TIMEOUT_MS)? else {
                return Ok(Key::Char(ESC));
            };
            return Ok(decode_escape(&[b0, b1, b2]));
        }

        Ok(decode_escape(&[b0, b1]))
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn poll_timeout_reasonable() {
        assert!(POLL_TIMEOUT_MS >= 50);
        assert!(POLL_TIMEOUT_MS <= 500);
    }

    #[test]
    fn esc_timeout_shorter_than_poll() {
        assert!(ESC_TIMEOUT_MS < POLL_TIMEOUT_MS);
    }

    #[test]
    fn take_resize_is_one_shot() {
        RESIZE_PENDING.store(true, Ordering::Relaxed);
        assert!(take_resize());
        assert!(!take_resize());
    }

    #[test]
    fn construction_does_not_panic() {
        let _ = TermKeys::new();
        let _ = TermKeys::default();
    }
}
