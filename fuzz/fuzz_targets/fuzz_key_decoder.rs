#![no_main]

use std::io::Cursor;

use arrowkey_core::{DecoderState, KeyEvent, ReadError, Step, decode_key};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Decode keys back to back until the input runs out. Every call must
    // consume 1..=3 bytes and end in a key or InputClosed.
    let mut cursor = Cursor::new(data);
    loop {
        let before = cursor.position();
        match decode_key(&mut cursor) {
            Ok(key) => {
                let used = cursor.position() - before;
                assert!((1..=3).contains(&used));
                if key.is_arrow() {
                    assert_eq!(used, 3);
                }
                if let KeyEvent::Literal(byte) = key {
                    assert_eq!(used, 1);
                    assert_ne!(byte, 27);
                }
            }
            Err(ReadError::InputClosed { consumed }) => {
                assert!(consumed < 3);
                assert_eq!(cursor.position(), data.len() as u64);
                break;
            }
            Err(ReadError::Io(err)) => panic!("cursor read failed: {err}"),
        }
    }

    // The step machine alone must agree with the reader-driven decoder.
    let mut state = DecoderState::Start;
    for &byte in data.iter().take(3) {
        match state.advance(byte) {
            Step::Next(next) => state = next,
            Step::Done(key) => {
                let mut replay = Cursor::new(data);
                assert_eq!(decode_key(&mut replay).ok(), Some(key));
                break;
            }
        }
    }
});
