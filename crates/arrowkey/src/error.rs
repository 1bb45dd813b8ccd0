use arrowkey_core::ReadError;
use arrowkey_tty::SetupError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, KeyError>;

/// Setup failures exit with `EXIT_FAILURE`.
pub const EXIT_SETUP_FAILURE: i32 = 1;
/// Read failures exit with `EX_IOERR` from sysexits.
pub const EXIT_READ_FAILURE: i32 = 74;

/// Everything that can stop [`read_key`](crate::read_key) from producing a key.
#[derive(Debug, Error)]
pub enum KeyError {
    /// The terminal could not be put into raw mode. Nothing was read.
    #[error(transparent)]
    Setup(#[from] SetupError),

    /// Raw mode was entered but reading the key failed.
    #[error("Cannot read key: {0}.")]
    Read(#[from] ReadError),

    /// Writing the decoded key to the output failed (CLI only).
    #[error("Cannot write key: {0}.")]
    Output(#[source] std::io::Error),
}

impl KeyError {
    /// Process exit status for this failure.
    ///
    /// Setup failure is 1, which collides with the Down status of
    /// `--exit-status` in the same way the legacy interface did.
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Setup(_) => EXIT_SETUP_FAILURE,
            Self::Read(_) | Self::Output(_) => EXIT_READ_FAILURE,
        }
    }

    #[must_use]
    pub fn is_setup(&self) -> bool {
        matches!(self, Self::Setup(_))
    }
}
