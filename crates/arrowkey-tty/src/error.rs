use std::fmt;
use std::io;

use thiserror::Error;

/// Step of raw-mode setup that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetupStage {
    /// Reading the terminal's current attributes.
    QueryAttributes,
    /// Registering the exit-time restoration hook.
    ExitHook,
    /// Installing the terminating-signal handlers.
    SignalHandlers,
    /// Writing the raw attributes.
    ApplyAttributes,
}

impl SetupStage {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::QueryAttributes => "query-attributes",
            Self::ExitHook => "exit-hook",
            Self::SignalHandlers => "signal-handlers",
            Self::ApplyAttributes => "apply-attributes",
        }
    }
}

impl fmt::Display for SetupStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raw mode could not be entered. The terminal is unmodified.
#[derive(Debug, Error)]
pub enum SetupError {
    /// None of stderr, stdin or stdout is a terminal.
    #[error("This program requires a terminal.")]
    NoTerminalAvailable,

    /// The terminal exists but could not be configured.
    #[error("Cannot initialize terminal: {source}.")]
    Unsupported {
        stage: SetupStage,
        #[source]
        source: io::Error,
    },

    /// Another controller in this process already holds raw mode.
    #[error("Cannot initialize terminal: raw mode is already held by another controller.")]
    AlreadyActive,
}

impl SetupError {
    pub(crate) fn unsupported(stage: SetupStage, source: impl Into<io::Error>) -> Self {
        Self::Unsupported {
            stage,
            source: source.into(),
        }
    }

    #[must_use]
    pub fn is_no_terminal(&self) -> bool {
        matches!(self, Self::NoTerminalAvailable)
    }

    /// The failed stage, for [`SetupError::Unsupported`].
    #[must_use]
    pub fn stage(&self) -> Option<SetupStage> {
        match self {
            Self::Unsupported { stage, .. } => Some(*stage),
            _ => None,
        }
    }
}
