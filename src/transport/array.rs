//! In-memory array backend.
//!
//! Fixed-capacity storage: reads and writes index straight into the array and
//! fail with [`IoError::CapacityExhausted`] once the cursor reaches the end.

use bytes::{Bytes, BytesMut};

use crate::core::codec::{Input, Output};
use crate::core::stream::{ensure_room, offset_within, Stream};
use crate::error::{IoError, Result};

/// Reads primitives out of an immutable byte array.
#[derive(Debug, Clone)]
pub struct ArrayInput {
    data: Option<Bytes>,
    position: usize,
    inverted: bool,
}

impl ArrayInput {
    pub fn new(data: impl Into<Bytes>) -> Self {
        Self {
            data: Some(data.into()),
            position: 0,
            inverted: false,
        }
    }

    fn data(&self) -> Result<&Bytes> {
        self.data.as_ref().ok_or(IoError::Closed)
    }

    /// Bytes not yet consumed.
    pub fn unread(&self) -> &[u8] {
        match &self.data {
            Some(data) => &data[self.position..],
            None => &[],
        }
    }
}

impl Stream for ArrayInput {
    fn position(&self) -> usize {
        self.position
    }

    fn capacity(&self) -> usize {
        self.data.as_ref().map_or(0, Bytes::len)
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
        let capacity = self.data()?.len();
        self.position = offset_within(self.position, delta, capacity)?;
        Ok(())
    }

    fn reset(&mut self) -> Result<()> {
        self.data()?;
        self.position = 0;
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        self.data = None;
        Ok(())
    }
}

impl Input for ArrayInput {
    fn read_byte(&mut self) -> Result<u8> {
        let data = self.data()?;
        ensure_room(self.position, 1, data.len())?;
        let byte = data[self.position];
        self.position += 1;
        Ok(byte)
    }

    fn read_bytes(&mut self, buf: &mut [u8]) -> Result<()> {
        let data = self.data()?;
        ensure_room(self.position, buf.len(), data.len())?;
        buf.copy_from_slice(&data[self.position..self.position + buf.len()]);
        self.position += buf.len();
        Ok(())
    }
}

/// Writes primitives into a fixed-capacity, zero-initialised byte array.
#[derive(Debug)]
pub struct ArrayOutput {
    data: Option<BytesMut>,
    position: usize,
    inverted: bool,
}

impl ArrayOutput {
    pub fn new(capacity: usize) -> Self {
        Self {
            data: Some(BytesMut::zeroed(capacity)),
            position: 0,
            inverted: false,
        }
    }

    fn data_mut(&mut self) -> Result<&mut BytesMut> {
        self.data.as_mut().ok_or(IoError::Closed)
    }

    /// The whole backing array, written or not.
    pub fn as_slice(&self) -> &[u8] {
        self.data.as_deref().unwrap_or(&[])
    }

    /// Bytes before the cursor.
    pub fn written(&self) -> &[u8] {
        let all = self.as_slice();
        &all[..self.position.min(all.len())]
    }

    /// Freeze the whole backing array.
    pub fn into_bytes(self) -> Bytes {
        self.data.map(BytesMut::freeze).unwrap_or_default()
    }

    /// Freeze only the bytes before the cursor.
    pub fn into_written(self) -> Bytes {
        let position = self.position;
        match self.data {
            Some(mut data) => {
                data.truncate(position);
                data.freeze()
            }
            None => Bytes::new(),
        }
    }
}

impl Stream for ArrayOutput {
    fn position(&self) -> usize {
        self.position
    }

    fn capacity(&self) -> usize {
        self.data.as_ref().map_or(0, BytesMut::len)
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
        let capacity = self.data_mut()?.len();
        self.position = offset_within(self.position, delta, capacity)?;
        Ok(())
    }

    fn reset(&mut self) -> Result<()> {
        self.data_mut()?;
        self.position = 0;
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        self.data = None;
        Ok(())
    }
}

impl Output for ArrayOutput {
    fn write_byte(&mut self, value: u8) -> Result<()> {
        let position = self.position;
        let data = self.data_mut()?;
        ensure_room(position, 1, data.len())?;
        data[position] = value;
        self.position += 1;
        Ok(())
    }

    fn write_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        let position = self.position;
        let data = self.data_mut()?;
        ensure_room(position, bytes.len(), data.len())?;
        data[position..position + bytes.len()].copy_from_slice(bytes);
        self.position += bytes.len();
        Ok(())
    }
}
