//! Property-based tests using proptest
//!
//! Codec round-trips in both byte orders, cross-order byte reversal, string
//! truncation and the buffer's coupled cursors.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use proptest::prelude::*;
use wire_io::core::codec::{Input, Output};
use wire_io::core::stream::Stream;
use wire_io::io;

fn writer(capacity: usize, inverted: bool) -> wire_io::transport::ArrayOutput {
    let mut out = io::array_output(capacity);
    out.set_inverted(inverted);
    out
}

fn reader(bytes: bytes::Bytes, inverted: bool) -> wire_io::transport::ArrayInput {
    let mut input = io::array_input(bytes);
    input.set_inverted(inverted);
    input
}

// Property: every integer width round-trips in the mode it was written in
proptest! {
    #[test]
    fn prop_integers_roundtrip(
        s in any::<i16>(),
        i in any::<i32>(),
        l in any::<i64>(),
        inverted in any::<bool>()
    ) {
        let mut out = writer(14, inverted);
        out.write_short(s).unwrap();
        out.write_int(i).unwrap();
        out.write_long(l).unwrap();

        let mut input = reader(out.into_bytes(), inverted);
        prop_assert_eq!(input.read_short().unwrap(), s);
        prop_assert_eq!(input.read_int().unwrap(), i);
        prop_assert_eq!(input.read_long().unwrap(), l);
        prop_assert!(!input.has_remaining().unwrap());
    }
}

// Property: floating values keep their exact bit pattern, NaN payloads included
proptest! {
    #[test]
    fn prop_floats_roundtrip_bits(
        f in any::<u32>(),
        d in any::<u64>(),
        inverted in any::<bool>()
    ) {
        let (f, d) = (f32::from_bits(f), f64::from_bits(d));
        let mut out = writer(12, inverted);
        out.write_float(f).unwrap();
        out.write_double(d).unwrap();

        let mut input = reader(out.into_bytes(), inverted);
        prop_assert_eq!(input.read_float().unwrap().to_bits(), f.to_bits());
        prop_assert_eq!(input.read_double().unwrap().to_bits(), d.to_bits());
    }
}

// Property: reading in the opposite mode yields the byte-reversed value
proptest! {
    #[test]
    fn prop_cross_mode_reverses_bytes(
        s in any::<i16>(),
        i in any::<i32>(),
        l in any::<i64>(),
        d in any::<u64>(),
        inverted in any::<bool>()
    ) {
        let mut out = writer(22, inverted);
        out.write_short(s).unwrap();
        out.write_int(i).unwrap();
        out.write_long(l).unwrap();
        out.write_double(f64::from_bits(d)).unwrap();

        let mut input = reader(out.into_bytes(), !inverted);
        prop_assert_eq!(input.read_short().unwrap(), s.swap_bytes());
        prop_assert_eq!(input.read_int().unwrap(), i.swap_bytes());
        prop_assert_eq!(input.read_long().unwrap(), l.swap_bytes());
        prop_assert_eq!(input.read_double().unwrap().to_bits(), d.swap_bytes());
    }
}

// Property: arrays round-trip element by element with no framing
proptest! {
    #[test]
    fn prop_int_arrays_roundtrip(
        values in prop::collection::vec(any::<i32>(), 0..64),
        inverted in any::<bool>()
    ) {
        let mut out = writer(values.len() * 4, inverted);
        out.write_ints(&values).unwrap();
        prop_assert_eq!(out.position(), values.len() * 4);

        let mut input = reader(out.into_bytes(), inverted);
        prop_assert_eq!(input.read_ints(values.len()).unwrap(), values);
    }
}

// Property: Latin-1 strings up to 255 characters survive, longer ones keep the first 255
proptest! {
    #[test]
    fn prop_length_prefixed_strings(raw in prop::collection::vec(any::<u8>(), 0..400)) {
        let text: String = raw.iter().copied().map(char::from).collect();
        let mut out = io::array_output(256);
        out.write_string(&text).unwrap();

        let mut input = io::array_input(out.into_written());
        let decoded = input.read_string().unwrap();
        let expected: String = text.chars().take(255).collect();
        prop_assert_eq!(decoded, expected);
        prop_assert!(!input.has_remaining().unwrap());
    }
}

// Property: fixed-width strings always occupy exactly `len` bytes
proptest! {
    #[test]
    fn prop_fixed_strings_are_fixed_width(
        raw in prop::collection::vec(1u8..=255, 0..40),
        len in 0usize..32
    ) {
        let text: String = raw.iter().copied().map(char::from).collect();
        let mut out = io::array_output(len);
        out.write_fixed_string(&text, len).unwrap();
        prop_assert_eq!(out.position(), len);

        let mut input = io::array_input(out.into_bytes());
        let decoded = input.read_fixed_string(len).unwrap();
        let mut expected: String = text.chars().take(len).collect();
        while expected.chars().count() < len {
            expected.push('\0');
        }
        prop_assert_eq!(decoded, expected);
    }
}

#[derive(Debug, Clone)]
enum BufferOp {
    Read(usize),
    Write(Vec<u8>),
    MoveTo(usize),
    Skip(i64),
    Reset,
}

fn buffer_op() -> impl Strategy<Value = BufferOp> {
    prop_oneof![
        (0usize..8).prop_map(BufferOp::Read),
        prop::collection::vec(any::<u8>(), 0..8).prop_map(BufferOp::Write),
        (0usize..40).prop_map(BufferOp::MoveTo),
        (-16i64..16).prop_map(BufferOp::Skip),
        Just(BufferOp::Reset),
    ]
}

// Property: reader and writer cursors stay equal whatever the caller does
proptest! {
    #[test]
    fn prop_buffer_cursors_stay_coupled(ops in prop::collection::vec(buffer_op(), 0..64)) {
        let mut buffer = io::buffer(32);
        for op in ops {
            let _ = match op {
                BufferOp::Read(n) => buffer.read_vec(n).map(|_| ()),
                BufferOp::Write(bytes) => buffer.write_bytes(&bytes),
                BufferOp::MoveTo(pos) => buffer.move_to(pos),
                BufferOp::Skip(delta) => buffer.skip(delta),
                BufferOp::Reset => buffer.reset(),
            };
            prop_assert_eq!(buffer.reader_position(), buffer.writer_position());
            prop_assert!(buffer.position() <= buffer.capacity());
        }
    }
}

// Property: read_until never panics and never returns the terminator when it is found
proptest! {
    #[test]
    fn prop_read_until_strips_terminator(
        prefix in prop::collection::vec(0u8..4, 0..32),
        suffix in prop::collection::vec(any::<u8>(), 0..8)
    ) {
        let terminator = [9u8, 9, 7];
        let mut data = prefix.clone();
        data.extend_from_slice(&terminator);
        data.extend_from_slice(&suffix);

        let mut input = io::array_input(data);
        let found = input.read_until(&terminator).unwrap();
        prop_assert_eq!(found, prefix.clone());
        prop_assert_eq!(input.position(), prefix.len() + terminator.len());
    }
}
