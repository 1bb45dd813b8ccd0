//! Standard stream selection.

use std::fmt;

use rustix::fd::BorrowedFd;

/// One of the three standard streams.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StdStream {
    Stdin,
    Stdout,
    Stderr,
}

impl StdStream {
    /// Order in which streams are probed for a terminal.
    ///
    /// Stderr comes first: it is the stream least likely to be redirected
    /// when a program's input or output is piped.
    pub const PROBE_ORDER: [Self; 3] = [Self::Stderr, Self::Stdin, Self::Stdout];

    /// Borrow the stream's file descriptor.
    ///
    /// Does not touch std's `Stdin`/`Stdout` handles, so it is usable from
    /// a signal handler.
    #[must_use]
    pub fn fd(self) -> BorrowedFd<'static> {
        match self {
            Self::Stdin => rustix::stdio::stdin(),
            Self::Stdout => rustix::stdio::stdout(),
            Self::Stderr => rustix::stdio::stderr(),
        }
    }

    #[must_use]
    pub fn is_terminal(self) -> bool {
        rustix::termios::isatty(self.fd())
    }

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Stdin => "stdin",
            Self::Stdout => "stdout",
            Self::Stderr => "stderr",
        }
    }
}

impl fmt::Display for StdStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Which standard streams are attached to a terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TerminalProbe {
    pub stdin: bool,
    pub stdout: bool,
    pub stderr: bool,
}

impl TerminalProbe {
    /// Probe the process's real standard streams.
    #[must_use]
    pub fn detect() -> Self {
        Self {
            stdin: StdStream::Stdin.is_terminal(),
            stdout: StdStream::Stdout.is_terminal(),
            stderr: StdStream::Stderr.is_terminal(),
        }
    }

    #[must_use]
    pub const fn is_terminal(&self, stream: StdStream) -> bool {
        match stream {
            StdStream::Stdin => self.stdin,
            StdStream::Stdout => self.stdout,
            StdStream::Stderr => self.stderr,
        }
    }

    /// The stream raw mode should be applied to, in [`StdStream::PROBE_ORDER`].
    #[must_use]
    pub fn active(&self) -> Option<StdStream> {
        StdStream::PROBE_ORDER
            .into_iter()
            .find(|stream| self.is_terminal(*stream))
    }

    /// All terminal-attached streams, in probe order.
    pub fn terminals(&self) -> impl Iterator<Item = StdStream> + '_ {
        StdStream::PROBE_ORDER
            .into_iter()
            .filter(|stream| self.is_terminal(*stream))
    }
}
