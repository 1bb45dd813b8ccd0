#![allow(unsafe_code)]

//! Process-wide restoration hooks.
//!
//! Raw mode must be undone on every exit path, including the ones where no
//! Rust code of ours gets to run normally:
//!
//! | Path                      | Hook                                   |
//! |---------------------------|----------------------------------------|
//! | leave / scope exit        | `TerminalController` (explicit, `Drop`) |
//! | panic (unwind or abort)   | panic hook → [`restore_armed`]          |
//! | `std::process::exit`      | caller runs [`restore_for_exit`]        |
//! | terminating signal        | handler → [`RestoreSlot::restore_from_signal`] |
//!
//! All paths read the same [`RestoreSlot`]. Normal paths claim it with a
//! compare-exchange, so the first successful restoration wins and later ones
//! are no-ops. A failed `tcsetattr` re-arms the slot so the remaining hooks
//! still try. The signal path only needs the slot to be non-disarmed; it
//! never allocates, locks, or logs.
//!
//! # Signal Handler Lifetime
//!
//! Handlers are registered once per process, on the first raw-mode entry,
//! and are never removed: `signal-hook` cannot hand a signal back to its
//! default disposition. After teardown they still end the process with
//! status `128 + signal`, matching the default "terminate" action closely
//! enough for a shell to report it. `SIGPIPE` is the exception: Rust
//! programs start with it ignored, so once disarmed the handler returns and
//! the failed write surfaces as `EPIPE` instead.

use std::cell::UnsafeCell;
use std::ffi::c_int;
use std::io;
use std::sync::OnceLock;
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};

use rustix::fd::BorrowedFd;
use rustix::termios::{self, OptionalActions, Termios};
use signal_hook::consts::signal::{
    SIGALRM, SIGHUP, SIGINT, SIGIO, SIGPIPE, SIGQUIT, SIGTERM, SIGXCPU, SIGXFSZ,
};

/// Signals whose default action would leave the terminal in raw mode.
pub const TERMINATING_SIGNALS: [c_int; 9] = [
    SIGHUP, SIGINT, SIGQUIT, SIGTERM, SIGXCPU, SIGXFSZ, SIGIO, SIGPIPE, SIGALRM,
];

/// Exit status used when a terminating signal ends the process.
#[must_use]
pub const fn signal_exit_status(signal: c_int) -> c_int {
    128 + signal
}

const DISARMED: u8 = 0;
const ARMED: u8 = 1;
const RESTORING: u8 = 2;

struct Snapshot {
    fd: BorrowedFd<'static>,
    original: Termios,
}

/// Attributes to put back, readable from a signal handler.
pub(crate) struct RestoreSlot {
    state: AtomicU8,
    snapshot: UnsafeCell<Option<Snapshot>>,
}

// SAFETY: `snapshot` is written only by `arm`, which runs while the state is
// DISARMED and under the raw-mode lock, and is published with a Release store.
// Readers load the state with Acquire and only read when it is not DISARMED.
unsafe impl Sync for RestoreSlot {}

impl RestoreSlot {
    const fn new() -> Self {
        Self {
            state: AtomicU8::new(DISARMED),
            snapshot: UnsafeCell::new(None),
        }
    }

    /// Record `original` as the attributes to restore on `fd`.
    ///
    /// Caller must hold the raw-mode lock.
    fn arm(&self, fd: BorrowedFd<'static>, original: &Termios) {
        debug_assert_eq!(self.state.load(Ordering::Acquire), DISARMED);
        // SAFETY: disarmed and lock held, so no reader dereferences the slot
        // and no other writer exists.
        unsafe {
            *self.snapshot.get() = Some(Snapshot {
                fd,
                original: original.clone(),
            });
        }
        self.state.store(ARMED, Ordering::Release);
    }

    /// Restore the snapshot if nobody has yet. Returns whether this call
    /// performed the restoration.
    ///
    /// On failure the slot is armed again, so a later hook can retry.
    fn restore_armed(&self) -> io::Result<bool> {
        if self
            .state
            .compare_exchange(ARMED, RESTORING, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Ok(false);
        }
        // SAFETY: state was ARMED, so the snapshot is published and stable.
        let result = match unsafe { &*self.snapshot.get() } {
            Some(snapshot) => {
                termios::tcsetattr(snapshot.fd, OptionalActions::Now, &snapshot.original)
            }
            None => Ok(()),
        };
        match result {
            Ok(()) => {
                self.state.store(DISARMED, Ordering::Release);
                Ok(true)
            }
            Err(err) => {
                self.state.store(ARMED, Ordering::Release);
                Err(io::Error::from(err))
            }
        }
    }

    /// Drop the snapshot's claim without writing to the terminal.
    fn disarm(&self) {
        self.state.store(DISARMED, Ordering::Release);
    }

    fn is_armed(&self) -> bool {
        self.state.load(Ordering::Acquire) != DISARMED
    }

    /// Async-signal-safe restoration: one atomic load and one `tcsetattr`.
    ///
    /// Also restores while a normal path is mid-way (RESTORING), since that
    /// path may be the thread this signal interrupted. Returns whether the
    /// slot was armed.
    fn restore_from_signal(&self) -> bool {
        if self.state.load(Ordering::Acquire) == DISARMED {
            return false;
        }
        // SAFETY: not disarmed, so the snapshot is published. A concurrent
        // re-arm from another thread would need a full leave/enter cycle in
        // between, which cannot complete while the process is exiting here.
        if let Some(snapshot) = unsafe { &*self.snapshot.get() } {
            let _ = termios::tcsetattr(snapshot.fd, OptionalActions::Now, &snapshot.original);
        }
        true
    }
}

static SLOT: RestoreSlot = RestoreSlot::new();
static SIGNAL_HANDLERS_INSTALLED: AtomicBool = AtomicBool::new(false);

pub(crate) fn arm(fd: BorrowedFd<'static>, original: &Termios) {
    SLOT.arm(fd, original);
}

pub(crate) fn disarm() {
    SLOT.disarm();
}

/// Whether a raw-mode snapshot is currently waiting to be restored.
#[must_use]
pub fn is_armed() -> bool {
    SLOT.is_armed()
}

/// Restore the terminal if raw mode is active and nobody restored it yet.
///
/// Returns `Ok(true)` if this call wrote the original attributes back.
pub fn restore_armed() -> io::Result<bool> {
    SLOT.restore_armed()
}

/// Best-effort restoration for termination paths that skip `Drop`.
///
/// Call this before `std::process::exit` while a
/// [`TerminalController`](crate::TerminalController) is still in raw mode.
pub fn restore_for_exit() {
    let _ = restore_armed();
}

/// Register the restoring handler for every [`TERMINATING_SIGNALS`] entry.
///
/// Idempotent once it has succeeded.
pub(crate) fn install_signal_handlers() -> io::Result<()> {
    if SIGNAL_HANDLERS_INSTALLED.load(Ordering::Acquire) {
        return Ok(());
    }
    for signal in TERMINATING_SIGNALS {
        // SAFETY: the action only performs an atomic load, a tcsetattr ioctl
        // on a pre-captured snapshot, and _exit; all async-signal-safe.
        unsafe {
            signal_hook::low_level::register(signal, move || {
                if !SLOT.restore_from_signal() && signal == SIGPIPE {
                    return;
                }
                signal_hook::low_level::exit(signal_exit_status(signal));
            })?;
        }
    }
    SIGNAL_HANDLERS_INSTALLED.store(true, Ordering::Release);
    Ok(())
}

/// Install the panic hook that restores the terminal before the message is
/// printed.
pub(crate) fn install_panic_hook() -> io::Result<()> {
    static HOOK: OnceLock<()> = OnceLock::new();
    if HOOK.get().is_some() {
        return Ok(());
    }
    // `set_hook` panics when called from a panicking thread.
    if std::thread::panicking() {
        return Err(io::Error::other(
            "cannot register the exit hook while the thread is panicking",
        ));
    }
    HOOK.get_or_init(|| {
        let previous = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            restore_for_exit();
            previous(info);
        }));
    });
    Ok(())
}
