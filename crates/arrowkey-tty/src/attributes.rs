//! Raw-mode attribute derivation.
//!
//! This is not `cfmakeraw`: signal generation (`ISIG`) stays on so that
//! Ctrl+C, Ctrl+\ and Ctrl+Z keep working, output post-processing is left
//! alone so `\n` still returns the carriage, and `BREAK` raises `SIGINT`.

use rustix::termios::{ControlModes, InputModes, LocalModes, SpecialCodeIndex, Termios};

/// Input flags cleared in raw mode.
pub const CLEARED_INPUT: InputModes = InputModes::IGNBRK
    .union(InputModes::PARMRK)
    .union(InputModes::ISTRIP)
    .union(InputModes::INLCR)
    .union(InputModes::IGNCR)
    .union(InputModes::ICRNL);

/// Input flags set in raw mode.
pub const SET_INPUT: InputModes = InputModes::BRKINT.union(InputModes::IGNPAR);

/// Local flags cleared in raw mode.
pub const CLEARED_LOCAL: LocalModes = LocalModes::ICANON
    .union(LocalModes::ECHO)
    .union(LocalModes::ECHOE)
    .union(LocalModes::ECHOK)
    .union(LocalModes::ECHONL)
    .union(LocalModes::IEXTEN);

/// Rewrite `termios` in place for unbuffered, non-echoing byte input.
pub fn make_raw(termios: &mut Termios) {
    termios.input_modes.remove(CLEARED_INPUT);
    termios.input_modes.insert(SET_INPUT);
    #[cfg(any(target_os = "linux", target_os = "android"))]
    termios.input_modes.remove(InputModes::IUCLC);

    termios.control_modes.remove(ControlModes::CSIZE);
    termios
        .control_modes
        .insert(ControlModes::CS8 | ControlModes::CREAD);

    termios.local_modes.insert(LocalModes::ISIG);
    termios.local_modes.remove(CLEARED_LOCAL);

    // read() returns as soon as one byte is available, with no timer.
    termios.special_codes[SpecialCodeIndex::VMIN] = 1;
    termios.special_codes[SpecialCodeIndex::VTIME] = 0;
}

/// A raw-mode copy of `original`; `original` itself is untouched.
#[must_use]
pub fn raw_attributes(original: &Termios) -> Termios {
    let mut raw = original.clone();
    make_raw(&mut raw);
    raw
}
