#![forbid(unsafe_code)]

//! Read one keystroke from the terminal.
//!
//! `arrowkey` ties the two halves of the workspace together: `arrowkey-tty`
//! puts the terminal into raw mode and `arrowkey-core` classifies the bytes
//! that arrive. [`read_key`] does one full round trip.
//!
//! ```no_run
//! use arrowkey::{KeyEvent, TerminalController, read_key};
//!
//! let mut terminal = TerminalController::new();
//! match read_key(&mut terminal)? {
//!     KeyEvent::Up => println!("up"),
//!     KeyEvent::Down => println!("down"),
//!     other => println!("{other}"),
//! }
//! # Ok::<(), arrowkey::KeyError>(())
//! ```
//!
//! Callers that want to stay in raw mode across many keys can call
//! [`TerminalController::ensure_raw_mode`] and then [`decode_key`] on a
//! [`RawStdin`] for each key. The ensure call is a no-op while raw mode
//! holds and re-enters it if a caught panic restored the terminal.

#[cfg(unix)]
pub mod cli;
pub mod error;

pub use arrowkey_core::{DecoderState, KeyEvent, ReadError, Step, decode_key};
pub use arrowkey_tty::{SetupError, SetupStage};
#[cfg(unix)]
pub use arrowkey_tty::{ControllerOptions, RawStdin, StdStream, TerminalController, restore_for_exit};
pub use error::{KeyError, Result};

#[cfg(unix)]
use arrowkey_core::{debug, debug_span, warn};

/// Read and classify one key.
///
/// Enters raw mode if `terminal` is not already in it, reads one to three
/// bytes straight from standard input, then leaves raw mode whatever the
/// outcome. If leaving fails it is logged and `terminal` stays active with
/// its restore armed, so dropping it, the panic hook and the signal
/// handlers retry.
///
/// # Errors
///
/// [`KeyError::Setup`] if raw mode could not be entered (nothing is read),
/// [`KeyError::Read`] if input ended or failed before the key was complete.
#[cfg(unix)]
pub fn read_key(terminal: &mut TerminalController) -> Result<KeyEvent> {
    let span = debug_span!("arrowkey.read_key");
    let _guard = span.enter();

    terminal.ensure_raw_mode()?;
    let outcome = decode_key(&mut RawStdin::new());
    if let Err(err) = terminal.leave_raw_mode() {
        warn!(error = %err, "failed to leave raw mode after reading a key");
    }

    let key = outcome?;
    debug!(key = %key, "decoded key");
    Ok(key)
}
