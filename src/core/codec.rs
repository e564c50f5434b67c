//! # Primitive Codec Engine
//!
//! Every multi-byte operation is derived from a single-byte primitive supplied by
//! the backend (`read_byte` / `write_byte`). Backends implement only that
//! primitive plus the [`Stream`] bookkeeping; the provided trait methods here do
//! the rest.
//!
//! ## Byte order
//! With inversion off, multi-byte values travel most-significant byte first
//! (network order). With inversion on, the same widths travel least-significant
//! byte first. The flag is read on every call, so toggling it affects only later
//! operations.
//!
//! ## Strings
//! Characters are narrowed to one byte each (Latin-1). Length-prefixed strings
//! carry a one byte length, so at most [`MAX_STRING_LENGTH`] characters survive.
//! Fixed-width strings are zero-padded or truncated to the declared width and
//! are returned untrimmed when read back.

use crate::core::stream::Stream;
use crate::error::Result;

/// Longest string representable by the one byte length prefix.
pub const MAX_STRING_LENGTH: usize = u8::MAX as usize;

/// Terminator used by line reads and writes.
pub const LINE_TERMINATOR: &[u8] = b"\n";

/// Narrow a character to one byte, dropping the high bits.
#[inline]
pub fn narrow(c: char) -> u8 {
    c as u32 as u8
}

/// Decode bytes as one character per byte.
pub fn decode_latin1(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| char::from(b)).collect()
}

fn compose<I: Input + ?Sized>(input: &mut I, width: usize) -> Result<u64> {
    let inverted = input.is_inverted();
    let mut value = 0u64;
    for index in 0..width {
        let byte = u64::from(input.read_byte()?);
        if inverted {
            value |= byte << (8 * index);
        } else {
            value = (value << 8) | byte;
        }
    }
    Ok(value)
}

fn decompose<O: Output + ?Sized>(output: &mut O, value: u64, width: usize) -> Result<()> {
    let inverted = output.is_inverted();
    for index in 0..width {
        let shift = if inverted {
            8 * index
        } else {
            8 * (width - 1 - index)
        };
        output.write_byte((value >> shift) as u8)?;
    }
    Ok(())
}

/// Read side of the codec.
pub trait Input: Stream {
    /// Read exactly one byte. The only operation a backend must supply.
    fn read_byte(&mut self) -> Result<u8>;

    /// Whether another byte can be read without hitting the end of data.
    ///
    /// Bounded backends answer from `remaining`; unbounded streams override this
    /// with a lookahead.
    fn has_remaining(&mut self) -> Result<bool> {
        Ok(self.remaining() > 0)
    }

    /// Fill `buf` completely.
    fn read_bytes(&mut self, buf: &mut [u8]) -> Result<()> {
        for slot in buf.iter_mut() {
            *slot = self.read_byte()?;
        }
        Ok(())
    }

    /// Read `len` bytes into a fresh vector.
    fn read_vec(&mut self, len: usize) -> Result<Vec<u8>> {
        let mut bytes = vec![0u8; len];
        self.read_bytes(&mut bytes)?;
        Ok(bytes)
    }

    fn read_signed_byte(&mut self) -> Result<i8> {
        Ok(self.read_byte()? as i8)
    }

    fn read_bool(&mut self) -> Result<bool> {
        Ok(self.read_byte()? != 0)
    }

    fn read_char(&mut self) -> Result<char> {
        Ok(char::from(self.read_byte()?))
    }

    fn read_short(&mut self) -> Result<i16> {
        Ok(compose(self, 2)? as u16 as i16)
    }

    fn read_unsigned_short(&mut self) -> Result<u16> {
        Ok(compose(self, 2)? as u16)
    }

    fn read_int(&mut self) -> Result<i32> {
        Ok(compose(self, 4)? as u32 as i32)
    }

    fn read_long(&mut self) -> Result<i64> {
        Ok(compose(self, 8)? as i64)
    }

    fn read_float(&mut self) -> Result<f32> {
        Ok(f32::from_bits(compose(self, 4)? as u32))
    }

    fn read_double(&mut self) -> Result<f64> {
        Ok(f64::from_bits(compose(self, 8)?))
    }

    /// Read a length-prefixed string.
    fn read_string(&mut self) -> Result<String> {
        let len = usize::from(self.read_byte()?);
        let bytes = self.read_vec(len)?;
        Ok(decode_latin1(&bytes))
    }

    /// Read exactly `len` bytes as characters, padding included.
    fn read_fixed_string(&mut self, len: usize) -> Result<String> {
        let bytes = self.read_vec(len)?;
        Ok(decode_latin1(&bytes))
    }

    /// Consume bytes up to and including `terminator`, returning everything before it.
    ///
    /// Bytes that extend a partial match are held back until the match either
    /// completes (they are dropped with the terminator) or breaks (they are
    /// released). A mismatch restarts matching from the terminator's first byte
    /// only; there is no failure table. At end of data the accumulated bytes are
    /// returned, including any held-back partial match.
    fn read_until(&mut self, terminator: &[u8]) -> Result<Vec<u8>> {
        let mut out = Vec::new();
        if terminator.is_empty() {
            return Ok(out);
        }

        let mut matched = 0;
        while self.has_remaining()? {
            let byte = self.read_byte()?;
            if byte == terminator[matched] {
                matched += 1;
                if matched == terminator.len() {
                    return Ok(out);
                }
                continue;
            }

            out.extend_from_slice(&terminator[..matched]);
            if matched > 0 && byte == terminator[0] {
                matched = 1;
            } else {
                matched = 0;
                out.push(byte);
            }
        }

        out.extend_from_slice(&terminator[..matched]);
        Ok(out)
    }

    /// Read one `\n` terminated line, terminator excluded.
    fn read_line(&mut self) -> Result<String> {
        let bytes = self.read_until(LINE_TERMINATOR)?;
        Ok(decode_latin1(&bytes))
    }

    fn read_bools(&mut self, count: usize) -> Result<Vec<bool>> {
        (0..count).map(|_| self.read_bool()).collect()
    }

    fn read_chars(&mut self, count: usize) -> Result<Vec<char>> {
        (0..count).map(|_| self.read_char()).collect()
    }

    fn read_shorts(&mut self, count: usize) -> Result<Vec<i16>> {
        (0..count).map(|_| self.read_short()).collect()
    }

    fn read_ints(&mut self, count: usize) -> Result<Vec<i32>> {
        (0..count).map(|_| self.read_int()).collect()
    }

    fn read_longs(&mut self, count: usize) -> Result<Vec<i64>> {
        (0..count).map(|_| self.read_long()).collect()
    }

    fn read_floats(&mut self, count: usize) -> Result<Vec<f32>> {
        (0..count).map(|_| self.read_float()).collect()
    }

    fn read_doubles(&mut self, count: usize) -> Result<Vec<f64>> {
        (0..count).map(|_| self.read_double()).collect()
    }
}

/// Write side of the codec.
pub trait Output: Stream {
    /// Write exactly one byte. The only operation a backend must supply.
    fn write_byte(&mut self, value: u8) -> Result<()>;

    /// Push buffered bytes to the backing sink. No-op for in-memory backends.
    fn flush(&mut self) -> Result<()> {
        Ok(())
    }

    fn write_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        for &byte in bytes {
            self.write_byte(byte)?;
        }
        Ok(())
    }

    fn write_signed_byte(&mut self, value: i8) -> Result<()> {
        self.write_byte(value as u8)
    }

    fn write_bool(&mut self, value: bool) -> Result<()> {
        self.write_byte(u8::from(value))
    }

    /// Write one character, truncated to its low byte.
    fn write_char(&mut self, value: char) -> Result<()> {
        self.write_byte(narrow(value))
    }

    fn write_short(&mut self, value: i16) -> Result<()> {
        decompose(self, u64::from(value as u16), 2)
    }

    fn write_unsigned_short(&mut self, value: u16) -> Result<()> {
        decompose(self, u64::from(value), 2)
    }

    fn write_int(&mut self, value: i32) -> Result<()> {
        decompose(self, u64::from(value as u32), 4)
    }

    fn write_long(&mut self, value: i64) -> Result<()> {
        decompose(self, value as u64, 8)
    }

    fn write_float(&mut self, value: f32) -> Result<()> {
        decompose(self, u64::from(value.to_bits()), 4)
    }

    fn write_double(&mut self, value: f64) -> Result<()> {
        decompose(self, value.to_bits(), 8)
    }

    /// Write a length-prefixed string; characters past the 255th are dropped.
    fn write_string(&mut self, value: &str) -> Result<()> {
        let bytes: Vec<u8> = value.chars().take(MAX_STRING_LENGTH).map(narrow).collect();
        self.write_byte(bytes.len() as u8)?;
        self.write_bytes(&bytes)
    }

    /// Write exactly `len` bytes: the string's characters, then zero padding.
    fn write_fixed_string(&mut self, value: &str, len: usize) -> Result<()> {
        let mut written = 0;
        for c in value.chars().take(len) {
            self.write_byte(narrow(c))?;
            written += 1;
        }
        for _ in written..len {
            self.write_byte(0)?;
        }
        Ok(())
    }

    /// Write the characters of `line` followed by `\n`, no length prefix.
    fn write_line(&mut self, line: &str) -> Result<()> {
        for c in line.chars() {
            self.write_byte(narrow(c))?;
        }
        self.write_bytes(LINE_TERMINATOR)
    }

    fn write_bools(&mut self, values: &[bool]) -> Result<()> {
        values.iter().try_for_each(|&v| self.write_bool(v))
    }

    fn write_chars(&mut self, values: &[char]) -> Result<()> {
        values.iter().try_for_each(|&v| self.write_char(v))
    }

    fn write_shorts(&mut self, values: &[i16]) -> Result<()> {
        values.iter().try_for_each(|&v| self.write_short(v))
    }

    fn write_ints(&mut self, values: &[i32]) -> Result<()> {
        values.iter().try_for_each(|&v| self.write_int(v))
    }

    fn write_longs(&mut self, values: &[i64]) -> Result<()> {
        values.iter().try_for_each(|&v| self.write_long(v))
    }

    fn write_floats(&mut self, values: &[f32]) -> Result<()> {
        values.iter().try_for_each(|&v| self.write_float(v))
    }

    fn write_doubles(&mut self, values: &[f64]) -> Result<()> {
        values.iter().try_for_each(|&v| self.write_double(v))
    }
}

impl<I: Input + ?Sized> Input for Box<I> {
    fn read_byte(&mut self) -> Result<u8> {
        (**self).read_byte()
    }

    fn has_remaining(&mut self) -> Result<bool> {
        (**self).has_remaining()
    }

    fn read_bytes(&mut self, buf: &mut [u8]) -> Result<()> {
        (**self).read_bytes(buf)
    }
}

impl<O: Output + ?Sized> Output for Box<O> {
    fn write_byte(&mut self, value: u8) -> Result<()> {
        (**self).write_byte(value)
    }

    fn flush(&mut self) -> Result<()> {
        (**self).flush()
    }

    fn write_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        (**self).write_bytes(bytes)
    }
}
