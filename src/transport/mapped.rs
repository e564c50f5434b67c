//! Memory-mapped file backend.
//!
//! Inputs map an existing file read-only. Outputs map a read-write file that
//! grows by a fixed increment whenever a write would run past the current
//! mapping: the mapping is flushed and dropped, the file is extended with
//! `set_len`, and a fresh mapping is taken over the longer file.
//!
//! Closing an output flushes the mapping, unmaps it and trims the file back to
//! the furthest byte ever written, so growth slack never reaches disk.

use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};

use memmap2::{Mmap, MmapMut, MmapOptions};
use tracing::{debug, instrument};

use crate::config::MappedConfig;
use crate::core::codec::{Input, Output};
use crate::core::stream::{ensure_room, offset_within, Stream};
use crate::error::{IoError, Result};

/// Read-only view of a mapped file.
#[derive(Debug)]
pub struct MappedInput {
    map: Option<Mmap>,
    open: bool,
    position: usize,
    inverted: bool,
}

impl MappedInput {
    /// Map `path` for reading. Empty files are accepted and read as zero bytes.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        let len = file.metadata()?.len();
        let map = if len == 0 {
            None
        } else {
            // SAFETY: the mapping is private to this value; concurrent truncation
            // of the file by another process is outside the supported model.
            Some(unsafe { MmapOptions::new().map(&file)? })
        };
        Ok(Self {
            map,
            open: true,
            position: 0,
            inverted: false,
        })
    }

    fn data(&self) -> Result<&[u8]> {
        if !self.open {
            return Err(IoError::Closed);
        }
        Ok(self.map.as_deref().unwrap_or(&[]))
    }
}

impl Stream for MappedInput {
    fn position(&self) -> usize {
        self.position
    }

    fn capacity(&self) -> usize {
        self.map.as_ref().map_or(0, |map| map.len())
    }

    fn is_inverted(&self) -> bool {
        self.inverted
    }

    fn set_inverted(&mut self, inverted: bool) {
        self.inverted = inverted;
    }

    fn is_closed(&self) -> Result<bool> {
        Ok(!self.open)
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
        self.map = None;
        self.open = false;
        Ok(())
    }
}

impl Input for MappedInput {
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

/// Growable read-write mapping over a file.
#[derive(Debug)]
pub struct MappedOutput {
    path: PathBuf,
    file: Option<File>,
    map: Option<MmapMut>,
    capacity: usize,
    growth_increment: usize,
    high_water: usize,
    position: usize,
    inverted: bool,
}

impl MappedOutput {
    /// Create (or truncate) `path` and map `config.initial_capacity` bytes of it.
    pub fn create<P: AsRef<Path>>(path: P, config: &MappedConfig) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(true)
            .open(&path)?;

        let mut output = Self {
            path,
            file: Some(file),
            map: None,
            capacity: 0,
            growth_increment: config.growth_increment.max(1),
            high_water: 0,
            position: 0,
            inverted: false,
        };
        output.remap(config.initial_capacity)?;
        Ok(output)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Extend the file to `capacity` bytes and map the whole of it.
    ///
    /// The current mapping stays in place until the new one exists, so a failed
    /// remap leaves the output writable at its old capacity.
    fn remap(&mut self, capacity: usize) -> Result<()> {
        let file = self.file.as_ref().ok_or(IoError::Closed)?;
        if let Some(map) = self.map.as_ref() {
            map.flush()?;
        }
        file.set_len(capacity as u64)?;
        self.map = if capacity > 0 {
            // SAFETY: the file handle is owned exclusively by this output and the
            // previous mapping is only dropped once this one replaces it.
            Some(unsafe { MmapOptions::new().len(capacity).map_mut(file)? })
        } else {
            None
        };
        self.capacity = capacity;
        Ok(())
    }

    #[instrument(skip(self), fields(path = %self.path.display()))]
    fn grow_to_fit(&mut self, needed: usize) -> Result<()> {
        if needed <= self.capacity {
            return Ok(());
        }
        let steps = (needed - self.capacity).div_ceil(self.growth_increment);
        let capacity = steps
            .checked_mul(self.growth_increment)
            .and_then(|growth| self.capacity.checked_add(growth))
            .ok_or(IoError::CapacityExhausted {
                position: self.position,
                capacity: self.capacity,
                requested: needed - self.position,
            })?;
        debug!(from = self.capacity, to = capacity, "Growing mapped file");
        self.remap(capacity)
    }

    fn write_at(&mut self, bytes: &[u8]) -> Result<()> {
        if self.file.is_none() {
            return Err(IoError::Closed);
        }
        let end = self
            .position
            .checked_add(bytes.len())
            .ok_or(IoError::CapacityExhausted {
                position: self.position,
                capacity: self.capacity,
                requested: bytes.len(),
            })?;
        self.grow_to_fit(end)?;
        if !bytes.is_empty() {
            let map = self.map.as_mut().ok_or(IoError::CapacityExhausted {
                position: self.position,
                capacity: self.capacity,
                requested: bytes.len(),
            })?;
            map[self.position..end].copy_from_slice(bytes);
        }
        self.position = end;
        self.high_water = self.high_water.max(end);
        Ok(())
    }
}

impl Stream for MappedOutput {
    fn position(&self) -> usize {
        self.position
    }

    fn capacity(&self) -> usize {
        self.capacity
    }

    fn is_inverted(&self) -> bool {
        self.inverted
    }

    fn set_inverted(&mut self, inverted: bool) {
        self.inverted = inverted;
    }

    fn is_closed(&self) -> Result<bool> {
        Ok(self.file.is_none())
    }

    fn skip(&mut self, delta: i64) -> Result<()> {
        if self.file.is_none() {
            return Err(IoError::Closed);
        }
        self.position = offset_within(self.position, delta, self.capacity)?;
        Ok(())
    }

    fn reset(&mut self) -> Result<()> {
        if self.file.is_none() {
            return Err(IoError::Closed);
        }
        self.position = 0;
        Ok(())
    }

    #[instrument(skip(self), fields(path = %self.path.display()))]
    fn close(&mut self) -> Result<()> {
        let Some(file) = self.file.take() else {
            return Ok(());
        };
        if let Some(map) = self.map.take() {
            map.flush()?;
        }
        file.set_len(self.high_water as u64)?;
        debug!(length = self.high_water, "Closed mapped output");
        self.capacity = 0;
        Ok(())
    }
}

impl Output for MappedOutput {
    fn write_byte(&mut self, value: u8) -> Result<()> {
        self.write_at(&[value])
    }

    fn write_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        self.write_at(bytes)
    }

    fn flush(&mut self) -> Result<()> {
        if self.file.is_none() {
            return Err(IoError::Closed);
        }
        if let Some(map) = self.map.as_ref() {
            map.flush()?;
        }
        Ok(())
    }
}

impl Drop for MappedOutput {
    fn drop(&mut self) {
        if let Err(e) = self.close() {
            debug!(
                error = %e,
                path = %self.path.display(),
                "Failed to close mapped output on drop"
            );
        }
    }
}
