#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
//! Edge-case tests: boundaries, closed streams, error tiers and byte-order switches

use wire_io::core::codec::{Input, Output};
use wire_io::core::stream::Stream;
use wire_io::error::{ErrorTier, IoError};
use wire_io::io;

// ============================================================================
// CODEC EDGE CASES
// ============================================================================

#[test]
fn test_empty_string_is_one_byte() {
    let mut out = io::array_output(1);
    out.write_string("").unwrap();
    assert_eq!(out.written(), &[0]);

    let mut input = io::array_input(out.into_bytes());
    assert_eq!(input.read_string().unwrap(), "");
}

#[test]
fn test_string_at_limit_and_one_past() {
    let exact = "x".repeat(255);
    let over = "y".repeat(256);

    let mut out = io::array_output(512);
    out.write_string(&exact).unwrap();
    out.write_string(&over).unwrap();
    assert_eq!(out.position(), 512);

    let mut input = io::array_input(out.into_bytes());
    assert_eq!(input.read_string().unwrap(), exact);
    assert_eq!(input.read_string().unwrap(), "y".repeat(255));
}

#[test]
fn test_non_latin1_chars_are_narrowed() {
    let mut out = io::array_output(2);
    out.write_char('\u{0141}').unwrap();
    out.write_char('\u{00ff}').unwrap();
    assert_eq!(out.written(), &[0x41, 0xff]);
}

#[test]
fn test_fixed_string_example() {
    let mut out = io::array_output(5);
    out.write_fixed_string("hi", 5).unwrap();
    assert_eq!(out.written(), b"hi\0\0\0");

    let mut input = io::array_input(out.into_bytes());
    assert_eq!(input.read_fixed_string(5).unwrap(), "hi\0\0\0");
}

#[test]
fn test_bool_is_any_nonzero_byte() {
    let mut input = io::array_input(vec![0, 1, 0x80]);
    assert_eq!(input.read_bools(3).unwrap(), vec![false, true, true]);
}

#[test]
fn test_extreme_values_roundtrip() {
    let mut out = io::array_output(30);
    out.write_short(i16::MIN).unwrap();
    out.write_unsigned_short(u16::MAX).unwrap();
    out.write_int(i32::MIN).unwrap();
    out.write_long(i64::MAX).unwrap();
    out.write_double(f64::NEG_INFINITY).unwrap();
    out.write_float(f32::MIN_POSITIVE).unwrap();

    let mut input = io::array_input(out.into_bytes());
    assert_eq!(input.read_short().unwrap(), i16::MIN);
    assert_eq!(input.read_unsigned_short().unwrap(), u16::MAX);
    assert_eq!(input.read_int().unwrap(), i32::MIN);
    assert_eq!(input.read_long().unwrap(), i64::MAX);
    assert_eq!(input.read_double().unwrap(), f64::NEG_INFINITY);
    assert_eq!(input.read_float().unwrap(), f32::MIN_POSITIVE);
}

#[test]
fn test_read_until_overlapping_prefix() {
    // "aab" against "ab": the second 'a' restarts the match
    let mut input = io::array_input(b"xaab-tail".to_vec());
    assert_eq!(input.read_until(b"ab").unwrap(), b"xa");
    assert_eq!(input.read_vec(5).unwrap(), b"-tail");
}

#[test]
fn test_read_until_without_terminator_drains() {
    let mut input = io::array_input(b"no newline".to_vec());
    assert_eq!(input.read_line().unwrap(), "no newline");
    assert!(!input.has_remaining().unwrap());
}

// ============================================================================
// BOUNDARY AND LIFECYCLE EDGE CASES
// ============================================================================

#[test]
fn test_zero_capacity_array() {
    let mut out = io::array_output(0);
    let err = out.write_byte(1).unwrap_err();
    assert_eq!(err.tier(), ErrorTier::Contract);

    let mut input = io::array_input(Vec::new());
    assert!(!input.has_remaining().unwrap());
    assert!(input.read_byte().is_err());
}

#[test]
fn test_partial_multibyte_read_fails() {
    let mut input = io::array_input(vec![0, 0, 1]);
    assert!(matches!(
        input.read_int(),
        Err(IoError::CapacityExhausted { .. })
    ));
}

#[test]
fn test_skip_to_exact_end_is_allowed() {
    let mut input = io::array_input(vec![0; 4]);
    input.skip(4).unwrap();
    assert_eq!(input.remaining(), 0);
    assert!(input.skip(1).is_err());
    assert_eq!(input.position(), 4);
}

#[test]
fn test_every_operation_fails_after_close() {
    let mut buffer = io::buffer(4);
    buffer.close().unwrap();

    assert!(matches!(buffer.read_byte(), Err(IoError::Closed)));
    assert!(matches!(buffer.write_byte(0), Err(IoError::Closed)));
    assert!(matches!(buffer.skip(0), Err(IoError::Closed)));
    assert!(matches!(buffer.reset(), Err(IoError::Closed)));
    assert!(matches!(buffer.move_to(0), Err(IoError::Closed)));
    assert!(buffer.is_closed().unwrap());
    assert!(buffer.close().is_ok());
}

#[test]
fn test_inversion_switch_affects_only_later_values() {
    let mut out = io::array_output(4);
    out.write_short(0x0102).unwrap();
    out.set_inverted(true);
    out.write_short(0x0102).unwrap();
    assert_eq!(out.written(), &[1, 2, 2, 1]);
}

#[test]
fn test_error_tiers() {
    assert_eq!(IoError::ConnectionClosed.tier(), ErrorTier::Recoverable);
    assert_eq!(
        IoError::MalformedOption { tag: 9, offset: 0 }.tier(),
        ErrorTier::Recoverable
    );
    assert_eq!(IoError::Closed.tier(), ErrorTier::Contract);
    assert_eq!(IoError::Unsupported("reset").tier(), ErrorTier::Unsupported);
}
