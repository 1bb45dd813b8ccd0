//! Raw-mode lifecycle controller.
//!
//! [`TerminalController`] owns the process's single raw-mode session. It
//! captures the terminal's attributes on entry and puts them back on leave,
//! on drop, on panic, and when a terminating signal arrives.
//!
//! # Lifecycle Guarantees
//!
//! 1. **Idempotent entry** - [`ensure_raw_mode`] on an active controller is a
//!    no-op, so the saved attributes are never overwritten with raw ones.
//!
//! 2. **Idempotent exit** - [`leave_raw_mode`] on an inactive controller is a
//!    no-op; after any sequence of calls ending in a leave, the terminal
//!    holds the attributes captured at the first entry.
//!
//! 3. **State follows the terminal** - if another exit path (the panic hook,
//!    [`restore_for_exit`]) restored the terminal, the controller reports
//!    inactive and the next [`ensure_raw_mode`] enters raw mode again.
//!
//! 4. **One session per process** - a second controller cannot enter raw
//!    mode while another is active ([`SetupError::AlreadyActive`]).
//!
//! 5. **Untouched on failure** - setup errors are reported before the raw
//!    attributes are written, with the restore slot disarmed and the lock
//!    released.
//!
//! 6. **No leaked state on any catchable exit path** - `Drop`, the panic hook
//!    and the signal handlers all restore. `SIGKILL` cannot be intercepted.
//!
//! # Setup Order
//!
//! 1. Probe stderr, stdin, stdout for a terminal
//! 2. Acquire the process-wide raw-mode lock
//! 3. Capture the original attributes, derive the raw ones
//! 4. Flush buffered std output on terminal streams
//! 5. Arm the exit hooks (restore slot, panic hook)
//! 6. Install the signal handlers
//! 7. Apply the raw attributes
//!
//! [`ensure_raw_mode`]: TerminalController::ensure_raw_mode
//! [`leave_raw_mode`]: TerminalController::leave_raw_mode
//! [`restore_for_exit`]: crate::restore_for_exit
//!
//! # Usage
//!
//! ```no_run
//! use arrowkey_tty::TerminalController;
//!
//! let mut terminal = TerminalController::new();
//! terminal.ensure_raw_mode()?;
//! // ... read bytes ...
//! terminal.leave_raw_mode()?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use std::fmt;
use std::io::{self, Write};
use std::sync::atomic::{AtomicBool, Ordering};

use arrowkey_core::{debug, info, warn};
use rustix::fd::BorrowedFd;
use rustix::termios::{self, OptionalActions, Termios};

use crate::attributes::raw_attributes;
use crate::error::{SetupError, SetupStage};
use crate::restore;
use crate::stream::{StdStream, TerminalProbe};

static RAW_MODE_HELD: AtomicBool = AtomicBool::new(false);

#[derive(Debug)]
struct RawModeLock;

impl RawModeLock {
    fn acquire() -> Result<Self, SetupError> {
        if RAW_MODE_HELD
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Err(SetupError::AlreadyActive);
        }
        Ok(Self)
    }
}

impl Drop for RawModeLock {
    fn drop(&mut self) {
        RAW_MODE_HELD.store(false, Ordering::SeqCst);
    }
}

/// Controller configuration.
///
/// Both hooks default to on; turning them off is meant for embedding in a
/// program that already manages signals or panics itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControllerOptions {
    /// Install restoring handlers for the terminating signals.
    pub intercept_signals: bool,

    /// Install a panic hook that restores the terminal before the panic
    /// message is printed. Needed when `panic = "abort"` skips `Drop`.
    pub install_panic_hook: bool,
}

impl Default for ControllerOptions {
    fn default() -> Self {
        Self {
            intercept_signals: true,
            install_panic_hook: true,
        }
    }
}

/// The terminal-facing steps of entering raw mode.
#[derive(Debug, Clone, Copy)]
struct TerminalOps {
    fd: fn(StdStream) -> BorrowedFd<'static>,
    query: fn(BorrowedFd<'static>) -> io::Result<Termios>,
    install_signal_handlers: fn() -> io::Result<()>,
    apply: fn(BorrowedFd<'static>, &Termios) -> io::Result<()>,
}

impl TerminalOps {
    const SYSTEM: Self = Self {
        fd: StdStream::fd,
        query: query_attributes,
        install_signal_handlers: restore::install_signal_handlers,
        apply: apply_attributes,
    };
}

impl Default for TerminalOps {
    fn default() -> Self {
        Self::SYSTEM
    }
}

fn query_attributes(fd: BorrowedFd<'static>) -> io::Result<Termios> {
    termios::tcgetattr(fd).map_err(io::Error::from)
}

fn apply_attributes(fd: BorrowedFd<'static>, raw: &Termios) -> io::Result<()> {
    termios::tcsetattr(fd, OptionalActions::Now, raw).map_err(io::Error::from)
}

struct RawSession {
    stream: StdStream,
    original: Termios,
    raw: Termios,
    /// Released only after the original attributes are written back.
    _lock: RawModeLock,
}

impl fmt::Debug for RawSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RawSession")
            .field("stream", &self.stream)
            .field("original_local", &self.original.local_modes)
            .field("raw_local", &self.raw.local_modes)
            .finish_non_exhaustive()
    }
}

/// Owner of the process's raw-mode session.
///
/// Pass it by `&mut` to whatever reads keys. Dropping it leaves raw mode.
#[derive(Debug, Default)]
pub struct TerminalController {
    options: ControllerOptions,
    ops: TerminalOps,
    session: Option<RawSession>,
}

impl TerminalController {
    /// A controller with default options. Does not touch the terminal.
    #[must_use]
    pub fn new() -> Self {
        Self::with_options(ControllerOptions::default())
    }

    #[must_use]
    pub fn with_options(options: ControllerOptions) -> Self {
        Self {
            options,
            ops: TerminalOps::SYSTEM,
            session: None,
        }
    }

    /// Put the first terminal-attached standard stream into raw mode.
    ///
    /// No-op if this controller is already active.
    ///
    /// # Errors
    ///
    /// - [`SetupError::NoTerminalAvailable`] if no standard stream is a terminal.
    /// - [`SetupError::AlreadyActive`] if another controller holds raw mode.
    /// - [`SetupError::Unsupported`] if an attribute or hook step fails.
    ///
    /// In every error case the terminal attributes are unchanged.
    pub fn ensure_raw_mode(&mut self) -> Result<(), SetupError> {
        self.ensure_with(TerminalProbe::detect)
    }

    fn ensure_with(&mut self, probe: impl FnOnce() -> TerminalProbe) -> Result<(), SetupError> {
        if self.is_active() {
            return Ok(());
        }
        if self.session.take().is_some() {
            debug!("terminal was restored by another exit path; re-entering raw mode");
        }
        self.enter(probe())
    }

    fn enter(&mut self, probe: TerminalProbe) -> Result<(), SetupError> {
        let Some(stream) = probe.active() else {
            debug!("no standard stream is attached to a terminal");
            return Err(SetupError::NoTerminalAvailable);
        };
        let lock = RawModeLock::acquire()?;

        // A previous session whose restore failed is still armed; finish it
        // before capturing, or the snapshot would hold raw attributes.
        if restore::is_armed() {
            restore::restore_armed()
                .map_err(|err| SetupError::unsupported(SetupStage::QueryAttributes, err))?;
        }

        let fd = (self.ops.fd)(stream);
        let original = (self.ops.query)(fd)
            .map_err(|err| SetupError::unsupported(SetupStage::QueryAttributes, err))?;
        let raw = raw_attributes(&original);

        flush_terminal_output(&probe);

        if self.options.install_panic_hook {
            restore::install_panic_hook()
                .map_err(|err| SetupError::unsupported(SetupStage::ExitHook, err))?;
        }
        restore::arm(fd, &original);

        if self.options.intercept_signals
            && let Err(err) = (self.ops.install_signal_handlers)()
        {
            restore::disarm();
            warn!(error = %err, "failed to install terminating-signal handlers");
            return Err(SetupError::unsupported(SetupStage::SignalHandlers, err));
        }

        if let Err(err) = (self.ops.apply)(fd, &raw) {
            restore::disarm();
            return Err(SetupError::unsupported(SetupStage::ApplyAttributes, err));
        }

        info!(descriptor = %stream, "terminal raw mode enabled");
        self.session = Some(RawSession {
            stream,
            original,
            raw,
            _lock: lock,
        });
        Ok(())
    }

    /// Restore the attributes captured on entry.
    ///
    /// No-op if inactive.
    ///
    /// # Errors
    ///
    /// Returns the `tcsetattr` failure, if any. The controller then stays
    /// active and the restore stays armed, so `Drop`, the panic hook and the
    /// signal handlers try again.
    pub fn leave_raw_mode(&mut self) -> io::Result<()> {
        let Some(session) = self.session.take() else {
            return Ok(());
        };
        match restore::restore_armed() {
            Ok(true) => {
                info!(descriptor = %session.stream, "terminal raw mode disabled");
                Ok(())
            }
            Ok(false) => {
                debug!("terminal already restored by another exit path");
                Ok(())
            }
            Err(err) => {
                warn!(descriptor = %session.stream, error = %err, "failed to restore terminal");
                self.session = Some(session);
                Err(err)
            }
        }
    }

    /// Whether raw mode is in effect for this controller.
    ///
    /// False once any exit path has restored the terminal, even if
    /// [`leave_raw_mode`](Self::leave_raw_mode) was never called.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.session.is_some() && restore::is_armed()
    }

    /// The stream raw mode was applied to, while active.
    #[must_use]
    pub fn descriptor(&self) -> Option<StdStream> {
        self.live_session().map(|session| session.stream)
    }

    /// Attributes captured when raw mode was entered.
    #[must_use]
    pub fn original_attributes(&self) -> Option<&Termios> {
        self.live_session().map(|session| &session.original)
    }

    /// Attributes applied for raw mode.
    #[must_use]
    pub fn raw_attributes(&self) -> Option<&Termios> {
        self.live_session().map(|session| &session.raw)
    }

    #[must_use]
    pub fn options(&self) -> &ControllerOptions {
        &self.options
    }

    fn live_session(&self) -> Option<&RawSession> {
        self.session.as_ref().filter(|_| restore::is_armed())
    }
}

impl Drop for TerminalController {
    fn drop(&mut self) {
        let _ = self.leave_raw_mode();
    }
}

/// Push out anything std has buffered for the terminal streams so output
/// written before raw mode does not interleave with input handling.
fn flush_terminal_output(probe: &TerminalProbe) {
    if probe.stdout {
        let _ = io::stdout().flush();
    }
    if probe.stderr {
        let _ = io::stderr().flush();
    }
}
