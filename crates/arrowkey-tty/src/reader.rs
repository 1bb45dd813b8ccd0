//! Unbuffered standard input.

use std::io::{self, Read};

/// Reads standard input straight from file descriptor 0.
///
/// `std::io::Stdin` keeps an internal buffer; bytes it pulled in would be
/// invisible to the next raw-mode read and could be left behind when the
/// terminal switches back to canonical mode. This reader issues one `read(2)`
/// per call and never holds anything back.
#[derive(Debug, Default, Clone, Copy)]
pub struct RawStdin;

impl RawStdin {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Read for RawStdin {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }
        rustix::io::read(rustix::stdio::stdin(), buf).map_err(io::Error::from)
    }
}
