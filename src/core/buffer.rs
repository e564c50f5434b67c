//! # Buffer
//!
//! One byte array read and written through a single logical cursor.
//!
//! The buffer keeps a reader position and a writer position, and every public
//! operation moves both by the same amount: reading `n` bytes also advances the
//! writer by `n`, writing `n` bytes also advances the reader by `n`. Callers can
//! therefore read a record, step back with [`Buffer::move_to`], and rewrite it in
//! place, while still handing the buffer to code that expects an [`Input`] or an
//! [`Output`].

use crate::core::codec::{Input, Output};
use crate::core::stream::{ensure_room, offset_within, Stream};
use crate::error::{IoError, Result};

#[derive(Debug, Clone)]
pub struct Buffer {
    data: Option<Vec<u8>>,
    reader_position: usize,
    writer_position: usize,
    inverted: bool,
}

impl Buffer {
    /// Zero-filled buffer of `capacity` bytes.
    pub fn new(capacity: usize) -> Self {
        Self::from_vec(vec![0u8; capacity])
    }

    /// Wrap existing bytes; the cursor starts at 0.
    pub fn from_vec(data: Vec<u8>) -> Self {
        Self {
            data: Some(data),
            reader_position: 0,
            writer_position: 0,
            inverted: false,
        }
    }

    pub fn reader_position(&self) -> usize {
        self.reader_position
    }

    pub fn writer_position(&self) -> usize {
        self.writer_position
    }

    /// Place both cursors at `position`.
    pub fn move_to(&mut self, position: usize) -> Result<()> {
        let delta = position as i64 - self.reader_position as i64;
        self.skip(delta)
    }

    pub fn as_slice(&self) -> &[u8] {
        self.data.as_deref().unwrap_or(&[])
    }

    /// Take the backing array, `None` once closed.
    pub fn into_inner(self) -> Option<Vec<u8>> {
        self.data
    }

    fn len(&self) -> Result<usize> {
        self.data.as_ref().map(Vec::len).ok_or(IoError::Closed)
    }

    fn advance(&mut self, count: usize) {
        self.reader_position += count;
        self.writer_position = self.reader_position;
    }
}

impl Stream for Buffer {
    fn position(&self) -> usize {
        self.reader_position
    }

    fn capacity(&self) -> usize {
        self.data.as_ref().map_or(0, Vec::len)
    }

    fn is_inverted(&self) -> bool {
        self.inverted
    }

    fn set_inverted(&mut self, inverted: bool) {
        self.inverted = inverted;
    }

    fn is_closed(&self) -> Result<bool> {
        Ok(self.data.is_none())
    }

    fn skip(&mut self, delta: i64) -> Result<()> {
        let capacity = self.len()?;
        let target = offset_within(self.reader_position, delta, capacity)?;
        self.reader_position = target;
        self.writer_position = target;
        Ok(())
    }

    fn reset(&mut self) -> Result<()> {
        self.len()?;
        self.reader_position = 0;
        self.writer_position = 0;
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        self.data = None;
        Ok(())
    }
}

impl Input for Buffer {
    fn read_byte(&mut self) -> Result<u8> {
        let capacity = self.len()?;
        ensure_room(self.reader_position, 1, capacity)?;
        let byte = self.as_slice()[self.reader_position];
        self.advance(1);
        Ok(byte)
    }

    fn read_bytes(&mut self, buf: &mut [u8]) -> Result<()> {
        let capacity = self.len()?;
        ensure_room(self.reader_position, buf.len(), capacity)?;
        let start = self.reader_position;
        buf.copy_from_slice(&self.as_slice()[start..start + buf.len()]);
        self.advance(buf.len());
        Ok(())
    }
}

impl Output for Buffer {
    fn write_byte(&mut self, value: u8) -> Result<()> {
        self.write_bytes(&[value])
    }

    fn write_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        let start = self.writer_position;
        let data = self.data.as_mut().ok_or(IoError::Closed)?;
        ensure_room(start, bytes.len(), data.len())?;
        data[start..start + bytes.len()].copy_from_slice(bytes);
        self.advance(bytes.len());
        Ok(())
    }
}
