#![forbid(unsafe_code)]

//! Core: key events, the arrow-key escape decoder, and logging macros.
//!
//! # Role in arrowkey
//! `arrowkey-core` is the platform-independent half of the workspace. It has
//! no idea what a terminal is; it turns a byte stream into [`KeyEvent`]s.
//! `arrowkey-tty` owns raw mode and hands this crate an unbuffered reader.
//!
//! # Primary responsibilities
//! - **KeyEvent**: the four logical outcomes of one key read.
//! - **DecoderState**: the three-state escape machine (`ESC [ A` / `ESC [ B`).
//! - **decode_key**: drive the machine over any [`std::io::Read`].
//! - **logging**: `tracing` macros, or no-op stand-ins when the feature is off.

pub mod error;
pub mod key;
pub mod logging;

pub use error::ReadError;
pub use key::{DecoderState, KeyEvent, Step, decode_key};

// Re-export tracing macros at crate root for ergonomic use.
#[cfg(feature = "tracing")]
pub use logging::{
    debug, debug_span, error, error_span, info, info_span, trace, trace_span, warn, warn_span,
};
