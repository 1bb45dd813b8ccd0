// Unsafe is confined to the signal-visible restore slot (see `restore`).
#![deny(unsafe_code)]
#![doc = "Raw-mode lifecycle for arrowkey (Unix)."]
#![doc = ""]
#![doc = "Puts one standard stream into raw, non-echoing, signal-preserving mode"]
#![doc = "and guarantees the original attributes come back: on leave, on drop,"]
#![doc = "on panic, and on any catchable terminating signal."]
#![doc = ""]
#![doc = "Windows consoles are not supported; on non-Unix targets this crate is empty."]

#[cfg(unix)]
pub mod attributes;
#[cfg(unix)]
pub mod controller;
pub mod error;
#[cfg(unix)]
pub mod reader;
#[cfg(unix)]
pub mod restore;
#[cfg(unix)]
pub mod stream;

#[cfg(unix)]
pub use controller::{ControllerOptions, TerminalController};
pub use error::{SetupError, SetupStage};
#[cfg(unix)]
pub use reader::RawStdin;
#[cfg(unix)]
pub use restore::{TERMINATING_SIGNALS, restore_for_exit, signal_exit_status};
#[cfg(unix)]
pub use rustix::termios::Termios;
#[cfg(unix)]
pub use stream::{StdStream, TerminalProbe};
