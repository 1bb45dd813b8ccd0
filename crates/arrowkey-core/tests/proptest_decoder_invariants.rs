//! Property-based invariant tests for the key decoder (public API only).
//!
//! 1. Totality: every 1..=3 byte input reaches exactly one outcome
//! 2. Consumption: the decoder reads 1, 2 or 3 bytes and never more
//! 3. Literal: any non-ESC first byte is returned verbatim after one byte
//! 4. Arrow-only: Up/Down are produced by exactly `ESC [ A` / `ESC [ B`
//! 5. Truncation: every strict prefix of an escape key yields InputClosed
//! 6. Step machine: at most three `advance` calls reach `Done`

use std::io::Cursor;

use arrowkey_core::{DecoderState, KeyEvent, ReadError, Step, decode_key};
use proptest::prelude::*;

// ── Helpers ──────────────────────────────────────────────────────────

/// Bytes biased toward the interesting alphabet.
fn arb_byte() -> impl Strategy<Value = u8> {
    prop_oneof![
        3 => Just(27u8),
        3 => Just(b'['),
        2 => Just(b'A'),
        2 => Just(b'B'),
        4 => any::<u8>(),
    ]
}

fn arb_input() -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(arb_byte(), 0..=6)
}

/// Reference classification written independently of the decoder.
fn expected_len(bytes: &[u8]) -> Option<usize> {
    match bytes {
        [] => None,
        [27] => None,
        [27, b'['] => None,
        [27, b'[', _, ..] => Some(3),
        [27, _, ..] => Some(2),
        [_, ..] => Some(1),
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 1 + 2. Totality and bounded consumption
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn decoder_is_total_and_bounded(bytes in arb_input()) {
        let mut cursor = Cursor::new(bytes.clone());
        let result = decode_key(&mut cursor);
        let consumed = cursor.position() as usize;
        prop_assert!(consumed <= 3, "consumed {} bytes", consumed);

        match (expected_len(&bytes), result) {
            (Some(len), Ok(_)) => prop_assert_eq!(consumed, len),
            (None, Err(ReadError::InputClosed { consumed: seen })) => {
                prop_assert_eq!(seen, bytes.len());
                prop_assert_eq!(consumed, bytes.len());
            }
            (expected, other) => {
                prop_assert!(false, "input {:?}: expected len {:?}, got {:?}", bytes, expected, other);
            }
        }
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 3. Non-ESC first byte is a literal
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn non_escape_is_literal(first in any::<u8>().prop_filter("not ESC", |b| *b != 27), rest in arb_input()) {
        let mut input = vec![first];
        input.extend(rest);
        let mut cursor = Cursor::new(input);
        let key = decode_key(&mut cursor).unwrap();
        prop_assert_eq!(key, KeyEvent::Literal(first));
        prop_assert_eq!(cursor.position(), 1);
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 4. Arrows come only from the exact sequences
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn arrows_only_from_exact_sequences(bytes in arb_input()) {
        if let Ok(key) = decode_key(&mut Cursor::new(bytes.clone())) {
            match key {
                KeyEvent::Up => prop_assert_eq!(&bytes[..3], b"\x1b[A"),
                KeyEvent::Down => prop_assert_eq!(&bytes[..3], b"\x1b[B"),
                KeyEvent::Malformed => prop_assert_eq!(bytes[0], 27),
                KeyEvent::Literal(b) => prop_assert_eq!(bytes[0], b),
            }
        }
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 5. Truncated escape sequences are InputClosed, never Malformed
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn truncated_sequences_are_input_closed(cut in 0usize..3, last in arb_byte()) {
        let full = [27u8, b'[', last];
        let err = decode_key(&mut Cursor::new(full[..cut].to_vec())).unwrap_err();
        prop_assert!(
            matches!(err, ReadError::InputClosed { consumed } if consumed == cut),
            "prefix of len {} gave {:?}", cut, err
        );
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 6. The raw step machine terminates within three bytes
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn step_machine_terminates(a in any::<u8>(), b in any::<u8>(), c in any::<u8>()) {
        let mut state = DecoderState::Start;
        let mut outcome = None;
        for (i, byte) in [a, b, c].into_iter().enumerate() {
            prop_assert_eq!(state.consumed(), i);
            match state.advance(byte) {
                Step::Next(next) => state = next,
                Step::Done(key) => {
                    outcome = Some(key);
                    break;
                }
            }
        }
        prop_assert!(outcome.is_some(), "no outcome after 3 bytes");
    }
}
