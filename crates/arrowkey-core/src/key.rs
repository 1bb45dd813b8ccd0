#![forbid(unsafe_code)]

//! Key events and the arrow-key escape decoder.
//!
//! One call to [`decode_key`] classifies one logical key press:
//!
//! | Bytes          | Outcome               |
//! |----------------|-----------------------|
//! | `ESC [ A`      | [`KeyEvent::Up`]      |
//! | `ESC [ B`      | [`KeyEvent::Down`]    |
//! | `ESC [ x`      | [`KeyEvent::Malformed`] |
//! | `ESC x`        | [`KeyEvent::Malformed`] |
//! | any other `b`  | [`KeyEvent::Literal`] |
//!
//! # Design Notes
//!
//! - The machine never looks past the byte that decides the outcome, so it
//!   consumes exactly 1, 2 or 3 bytes and nothing is pushed back.
//! - There is no timeout: a lone `ESC` blocks until the next byte arrives.
//! - Bytes are not interpreted as UTF-8; a multibyte character arrives as
//!   one `Literal` per byte across successive reads.

use std::fmt;
use std::io::{ErrorKind, Read};

use crate::error::ReadError;

/// Escape byte (`ESC`, 0x1b).
pub const ESC: u8 = 27;
/// Control sequence introducer after `ESC` (`[`).
pub const BRACKET: u8 = b'[';
/// Final byte of the cursor-up sequence.
pub const ARROW_UP: u8 = b'A';
/// Final byte of the cursor-down sequence.
pub const ARROW_DOWN: u8 = b'B';

/// The logical outcome of reading one key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyEvent {
    /// Up arrow (`ESC [ A`).
    Up,
    /// Down arrow (`ESC [ B`).
    Down,
    /// Any byte that does not start an escape sequence.
    Literal(u8),
    /// An escape sequence this decoder does not recognize.
    Malformed,
}

impl KeyEvent {
    /// Integer status used by callers that need exit-code compatibility.
    ///
    /// Up is 0, Down is 1, a literal is its byte value and a malformed
    /// sequence is -1. Note that Down and `Literal(1)` share a value.
    #[must_use]
    pub const fn status_code(self) -> i32 {
        match self {
            Self::Up => 0,
            Self::Down => 1,
            Self::Literal(byte) => byte as i32,
            Self::Malformed => -1,
        }
    }

    /// The byte of a literal key, if this is one.
    #[must_use]
    pub const fn literal(self) -> Option<u8> {
        match self {
            Self::Literal(byte) => Some(byte),
            _ => None,
        }
    }

    #[must_use]
    pub const fn is_arrow(self) -> bool {
        matches!(self, Self::Up | Self::Down)
    }
}

impl fmt::Display for KeyEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Up => f.write_str("up"),
            Self::Down => f.write_str("down"),
            Self::Literal(byte) if byte.is_ascii_graphic() || *byte == b' ' => {
                write!(f, "literal {byte:#04x} '{}'", char::from(*byte))
            }
            Self::Literal(byte) => write!(f, "literal {byte:#04x}"),
            Self::Malformed => f.write_str("malformed"),
        }
    }
}

/// Position within the escape sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DecoderState {
    /// Nothing consumed yet.
    #[default]
    Start,
    /// Consumed `ESC`.
    SawEscape,
    /// Consumed `ESC [`.
    SawBracket,
}

/// Result of feeding one byte to a [`DecoderState`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// More input is needed; continue from this state.
    Next(DecoderState),
    /// The key is complete.
    Done(KeyEvent),
}

impl DecoderState {
    /// Advance the machine by one byte.
    #[must_use]
    pub const fn advance(self, byte: u8) -> Step {
        match self {
            Self::Start => match byte {
                ESC => Step::Next(Self::SawEscape),
                other => Step::Done(KeyEvent::Literal(other)),
            },
            Self::SawEscape => match byte {
                BRACKET => Step::Next(Self::SawBracket),
                _ => Step::Done(KeyEvent::Malformed),
            },
            Self::SawBracket => match byte {
                ARROW_UP => Step::Done(KeyEvent::Up),
                ARROW_DOWN => Step::Done(KeyEvent::Down),
                _ => Step::Done(KeyEvent::Malformed),
            },
        }
    }

    /// Number of bytes consumed to reach this state.
    #[must_use]
    pub const fn consumed(self) -> usize {
        match self {
            Self::Start => 0,
            Self::SawEscape => 1,
            Self::SawBracket => 2,
        }
    }
}

/// Read and classify one key from `reader`.
///
/// Performs one `read` of a single byte per transition and retries reads
/// interrupted by a signal.
///
/// # Errors
///
/// [`ReadError::InputClosed`] if the reader reports end of input before the
/// key is complete, [`ReadError::Io`] for any other read failure.
pub fn decode_key<R: Read + ?Sized>(reader: &mut R) -> Result<KeyEvent, ReadError> {
    let mut state = DecoderState::Start;
    loop {
        let byte = read_byte(reader, state)?;
        match state.advance(byte) {
            Step::Next(next) => state = next,
            Step::Done(key) => return Ok(key),
        }
    }
}

fn read_byte<R: Read + ?Sized>(reader: &mut R, state: DecoderState) -> Result<u8, ReadError> {
    let mut buf = [0u8; 1];
    loop {
        match reader.read(&mut buf) {
            Ok(0) => {
                return Err(ReadError::InputClosed {
                    consumed: state.consumed(),
                });
            }
            Ok(_) => return Ok(buf[0]),
            Err(err) if err.kind() == ErrorKind::Interrupted => continue,
            Err(err) => return Err(ReadError::Io(err)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{self, Cursor};

    fn decode(bytes: &[u8]) -> Result<KeyEvent, ReadError> {
        decode_key(&mut Cursor::new(bytes.to_vec()))
    }

    #[test]
    fn up_arrow() {
        assert_eq!(decode(&[27, 91, 65]).unwrap(), KeyEvent::Up);
    }

    #[test]
    fn down_arrow() {
        assert_eq!(decode(&[27, 91, 66]).unwrap(), KeyEvent::Down);
    }

    #[test]
    fn plain_letter_is_literal() {
        assert_eq!(decode(&[65]).unwrap(), KeyEvent::Literal(b'A'));
    }

    #[test]
    fn unknown_final_byte_is_malformed() {
        assert_eq!(decode(&[27, 91, 90]).unwrap(), KeyEvent::Malformed);
    }

    #[test]
    fn escape_without_bracket_is_malformed() {
        assert_eq!(decode(&[27, 90]).unwrap(), KeyEvent::Malformed);
    }

    #[test]
    fn lone_escape_then_eof_is_input_closed() {
        let err = decode(&[27]).unwrap_err();
        assert!(matches!(err, ReadError::InputClosed { consumed: 1 }));
    }

    #[test]
    fn escape_bracket_then_eof_is_input_closed() {
        let err = decode(&[27, 91]).unwrap_err();
        assert!(matches!(err, ReadError::InputClosed { consumed: 2 }));
    }

    #[test]
    fn empty_input_is_input_closed() {
        let err = decode(&[]).unwrap_err();
        assert!(matches!(err, ReadError::InputClosed { consumed: 0 }));
    }

    #[test]
    fn trailing_bytes_are_left_unread() {
        let mut cursor = Cursor::new(b"\x1b[Axyz".to_vec());
        assert_eq!(decode_key(&mut cursor).unwrap(), KeyEvent::Up);
        assert_eq!(cursor.position(), 3);
        assert_eq!(decode_key(&mut cursor).unwrap(), KeyEvent::Literal(b'x'));
        assert_eq!(cursor.position(), 4);
    }

    #[test]
    fn malformed_consumes_only_the_deciding_byte() {
        let mut cursor = Cursor::new(b"\x1bZq".to_vec());
        assert_eq!(decode_key(&mut cursor).unwrap(), KeyEvent::Malformed);
        assert_eq!(decode_key(&mut cursor).unwrap(), KeyEvent::Literal(b'q'));
    }

    #[test]
    fn double_escape_is_malformed() {
        let mut cursor = Cursor::new(b"\x1b\x1b[A".to_vec());
        assert_eq!(decode_key(&mut cursor).unwrap(), KeyEvent::Malformed);
        assert_eq!(decode_key(&mut cursor).unwrap(), KeyEvent::Literal(b'['));
    }

    /// Yields `Interrupted` once before every byte.
    struct Flaky {
        bytes: Vec<u8>,
        pos: usize,
        interrupt_next: bool,
    }

    impl Read for Flaky {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            if self.interrupt_next {
                self.interrupt_next = false;
                return Err(io::Error::from(ErrorKind::Interrupted));
            }
            self.interrupt_next = true;
            let Some(&byte) = self.bytes.get(self.pos) else {
                return Ok(0);
            };
            self.pos += 1;
            buf[0] = byte;
            Ok(1)
        }
    }

    #[test]
    fn interrupted_reads_are_retried() {
        let mut reader = Flaky {
            bytes: vec![27, 91, 66],
            pos: 0,
            interrupt_next: true,
        };
        assert_eq!(decode_key(&mut reader).unwrap(), KeyEvent::Down);
    }

    struct Broken;

    impl Read for Broken {
        fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
            Err(io::Error::new(ErrorKind::BrokenPipe, "gone"))
        }
    }

    #[test]
    fn io_failure_is_not_malformed() {
        let err = decode_key(&mut Broken).unwrap_err();
        match err {
            ReadError::Io(inner) => assert_eq!(inner.kind(), ErrorKind::BrokenPipe),
            other => panic!("expected Io, got {other:?}"),
        }
    }

    #[test]
    fn status_codes_follow_compat_mapping() {
        assert_eq!(KeyEvent::Up.status_code(), 0);
        assert_eq!(KeyEvent::Down.status_code(), 1);
        assert_eq!(KeyEvent::Literal(b'a').status_code(), 97);
        assert_eq!(KeyEvent::Malformed.status_code(), -1);
    }

    #[test]
    fn consumed_tracks_state_depth() {
        assert_eq!(DecoderState::Start.consumed(), 0);
        assert_eq!(DecoderState::SawEscape.consumed(), 1);
        assert_eq!(DecoderState::SawBracket.consumed(), 2);
    }

    #[test]
    fn display_labels() {
        assert_eq!(KeyEvent::Up.to_string(), "up");
        assert_eq!(KeyEvent::Down.to_string(), "down");
        assert_eq!(KeyEvent::Literal(b'a').to_string(), "literal 0x61 'a'");
        assert_eq!(KeyEvent::Literal(b'\r').to_string(), "literal 0x0d");
        assert_eq!(KeyEvent::Malformed.to_string(), "malformed");
    }

    #[test]
    fn helpers() {
        assert_eq!(KeyEvent::Literal(b'q').literal(), Some(b'q'));
        assert_eq!(KeyEvent::Up.literal(), None);
        assert!(KeyEvent::Down.is_arrow());
        assert!(!KeyEvent::Malformed.is_arrow());
    }
}
