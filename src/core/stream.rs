//! # Stream Contract
//!
//! Bookkeeping capabilities shared by every backend: cursor position, capacity,
//! byte-order inversion flag, skipping, resetting and closing.
//!
//! A capacity of `0` means the backend is unbounded or does not know its size
//! (blocking streams without a declared length, text sinks).

use crate::error::{IoError, Result};

/// Capability set implemented by every backend.
pub trait Stream {
    /// Current cursor offset in bytes.
    fn position(&self) -> usize;

    /// Total addressable bytes, `0` when unbounded or unknown.
    fn capacity(&self) -> usize;

    /// Bytes left before the cursor hits `capacity`.
    fn remaining(&self) -> usize {
        self.capacity().saturating_sub(self.position())
    }

    /// Whether multi-byte values are composed least-significant byte first.
    fn is_inverted(&self) -> bool;

    /// Switch byte order for all subsequent multi-byte operations.
    fn set_inverted(&mut self, inverted: bool);

    /// Whether `close` has been called. Some blocking backends cannot answer and
    /// return [`IoError::Unsupported`].
    fn is_closed(&self) -> Result<bool>;

    /// Move the cursor by `delta` bytes (negative moves backwards where supported).
    fn skip(&mut self, delta: i64) -> Result<()>;

    /// Return the cursor to the start of the storage.
    fn reset(&mut self) -> Result<()>;

    /// Release the underlying storage. One-way: every later call fails with
    /// [`IoError::Closed`], a repeated `close` is accepted.
    fn close(&mut self) -> Result<()>;
}

impl<S: Stream + ?Sized> Stream for Box<S> {
    fn position(&self) -> usize {
        (**self).position()
    }

    fn capacity(&self) -> usize {
        (**self).capacity()
    }

    fn remaining(&self) -> usize {
        (**self).remaining()
    }

    fn is_inverted(&self) -> bool {
        (**self).is_inverted()
    }

    fn set_inverted(&mut self, inverted: bool) {
        (**self).set_inverted(inverted)
    }

    fn is_closed(&self) -> Result<bool> {
        (**self).is_closed()
    }

    fn skip(&mut self, delta: i64) -> Result<()> {
        (**self).skip(delta)
    }

    fn reset(&mut self) -> Result<()> {
        (**self).reset()
    }

    fn close(&mut self) -> Result<()> {
        (**self).close()
    }
}

/// Resolve `position + delta` against a known capacity.
///
/// Out-of-range targets leave the caller's cursor untouched and report
/// [`IoError::CapacityExhausted`].
pub(crate) fn offset_within(position: usize, delta: i64, capacity: usize) -> Result<usize> {
    let target = position as i128 + i128::from(delta);
    if target < 0 || target > capacity as i128 {
        return Err(IoError::CapacityExhausted {
            position,
            capacity,
            requested: delta.unsigned_abs() as usize,
        });
    }
    Ok(target as usize)
}

/// Check that `requested` more bytes fit before `capacity`.
pub(crate) fn ensure_room(position: usize, requested: usize, capacity: usize) -> Result<()> {
    match position.checked_add(requested) {
        Some(end) if end <= capacity => Ok(()),
        _ => Err(IoError::CapacityExhausted {
            position,
            capacity,
            requested,
        }),
    }
}
