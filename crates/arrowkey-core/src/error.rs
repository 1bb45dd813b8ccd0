use std::io;

use thiserror::Error;

/// Failure to obtain the bytes of a key.
///
/// Kept separate from [`KeyEvent::Malformed`](crate::KeyEvent::Malformed):
/// a malformed sequence was fully read, these mean the input itself failed.
#[derive(Debug, Error)]
pub enum ReadError {
    /// End of input reached before the key was complete.
    #[error("input closed after {consumed} byte(s) of a key")]
    InputClosed {
        /// Bytes of the key consumed before end of input (0..=2).
        consumed: usize,
    },

    /// The underlying read failed.
    #[error("failed to read key input: {0}")]
    Io(#[from] io::Error),
}

impl ReadError {
    /// Whether this is the end-of-input condition.
    #[must_use]
    pub fn is_input_closed(&self) -> bool {
        matches!(self, Self::InputClosed { .. })
    }
}
