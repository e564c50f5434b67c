//! Blocking sequential backend over any `Read` / `Write` channel (files,
//! sockets, pipes).
//!
//! There is no random access. A declared length of `0` means the stream is
//! unbounded; any positive length turns reads or writes past it into
//! [`IoError::LengthExceeded`]. `reset` is never supported, neither is
//! `is_closed`, and `skip` only moves forward on inputs by discarding bytes.

use std::io::{self, Read, Write};

use crate::core::codec::{Input, Output};
use crate::core::stream::Stream;
use crate::error::{constants, IoError, Result};

/// Blocking input over a byte channel.
#[derive(Debug)]
pub struct StreamInput<R: Read> {
    inner: Option<R>,
    lookahead: Option<u8>,
    length: usize,
    position: usize,
    inverted: bool,
}

impl<R: Read> StreamInput<R> {
    /// Unbounded input.
    pub fn new(inner: R) -> Self {
        Self::with_length(inner, 0)
    }

    /// Input that refuses to read more than `length` bytes (`0` = unbounded).
    pub fn with_length(inner: R, length: usize) -> Self {
        Self {
            inner: Some(inner),
            lookahead: None,
            length,
            position: 0,
            inverted: false,
        }
    }

    pub fn get_ref(&self) -> Option<&R> {
        self.inner.as_ref()
    }

    pub fn into_inner(self) -> Option<R> {
        self.inner
    }

    fn check_length(&self, requested: usize) -> Result<()> {
        if self.length > 0 && self.position + requested > self.length {
            return Err(IoError::LengthExceeded {
                length: self.length,
            });
        }
        Ok(())
    }

    /// Pull one byte from the channel, `None` on a clean end of stream.
    fn fetch(&mut self) -> Result<Option<u8>> {
        if let Some(byte) = self.lookahead.take() {
            return Ok(Some(byte));
        }
        let inner = self.inner.as_mut().ok_or(IoError::Closed)?;
        let mut byte = [0u8; 1];
        loop {
            match inner.read(&mut byte) {
                Ok(0) => return Ok(None),
                Ok(_) => return Ok(Some(byte[0])),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }
    }
}

impl<R: Read> Stream for StreamInput<R> {
    fn position(&self) -> usize {
        self.position
    }

    fn capacity(&self) -> usize {
        self.length
    }

    fn is_inverted(&self) -> bool {
        self.inverted
    }

    fn set_inverted(&mut self, inverted: bool) {
        self.inverted = inverted;
    }

    fn is_closed(&self) -> Result<bool> {
        Err(IoError::Unsupported(constants::CAP_IS_CLOSED))
    }

    fn skip(&mut self, delta: i64) -> Result<()> {
        if delta < 0 {
            return Err(IoError::Unsupported(constants::CAP_SKIP_BACKWARD));
        }
        for _ in 0..delta {
            self.read_byte()?;
        }
        Ok(())
    }

    fn reset(&mut self) -> Result<()> {
        Err(IoError::Unsupported(constants::CAP_RESET))
    }

    fn close(&mut self) -> Result<()> {
        self.inner = None;
        self.lookahead = None;
        Ok(())
    }
}

impl<R: Read> Input for StreamInput<R> {
    fn read_byte(&mut self) -> Result<u8> {
        self.check_length(1)?;
        match self.fetch()? {
            Some(byte) => {
                self.position += 1;
                Ok(byte)
            }
            None => Err(IoError::EndOfStream {
                position: self.position,
            }),
        }
    }

    fn has_remaining(&mut self) -> Result<bool> {
        if self.length > 0 && self.position >= self.length {
            return Ok(false);
        }
        if self.lookahead.is_none() {
            self.lookahead = self.fetch()?;
        }
        Ok(self.lookahead.is_some())
    }

    fn read_bytes(&mut self, buf: &mut [u8]) -> Result<()> {
        self.check_length(buf.len())?;
        let mut start = 0;
        if !buf.is_empty() {
            if let Some(byte) = self.lookahead.take() {
                buf[0] = byte;
                start = 1;
            }
        }
        let inner = self.inner.as_mut().ok_or(IoError::Closed)?;
        match inner.read_exact(&mut buf[start..]) {
            Ok(()) => {
                self.position += buf.len();
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => Err(IoError::EndOfStream {
                position: self.position,
            }),
            Err(e) => Err(e.into()),
        }
    }
}

/// Blocking output over a byte sink. Bytes go straight through to the sink.
#[derive(Debug)]
pub struct StreamOutput<W: Write> {
    inner: Option<W>,
    length: usize,
    position: usize,
    inverted: bool,
}

impl<W: Write> StreamOutput<W> {
    pub fn new(inner: W) -> Self {
        Self::with_length(inner, 0)
    }

    pub fn with_length(inner: W, length: usize) -> Self {
        Self {
            inner: Some(inner),
            length,
            position: 0,
            inverted: false,
        }
    }

    pub fn get_ref(&self) -> Option<&W> {
        self.inner.as_ref()
    }

    pub fn into_inner(self) -> Option<W> {
        self.inner
    }
}

impl<W: Write> Stream for StreamOutput<W> {
    fn position(&self) -> usize {
        self.position
    }

    fn capacity(&self) -> usize {
        self.length
    }

    fn is_inverted(&self) -> bool {
        self.inverted
    }

    fn set_inverted(&mut self, inverted: bool) {
        self.inverted = inverted;
    }

    fn is_closed(&self) -> Result<bool> {
        Err(IoError::Unsupported(constants::CAP_IS_CLOSED))
    }

    fn skip(&mut self, _delta: i64) -> Result<()> {
        Err(IoError::Unsupported(constants::CAP_SKIP_OUTPUT))
    }

    fn reset(&mut self) -> Result<()> {
        Err(IoError::Unsupported(constants::CAP_RESET))
    }

    fn close(&mut self) -> Result<()> {
        if let Some(mut inner) = self.inner.take() {
            inner.flush()?;
        }
        Ok(())
    }
}

impl<W: Write> Output for StreamOutput<W> {
    fn write_byte(&mut self, value: u8) -> Result<()> {
        self.write_bytes(&[value])
    }

    fn write_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        if self.length > 0 && self.position + bytes.len() > self.length {
            return Err(IoError::LengthExceeded {
                length: self.length,
            });
        }
        let inner = self.inner.as_mut().ok_or(IoError::Closed)?;
        inner.write_all(bytes)?;
        self.position += bytes.len();
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        let inner = self.inner.as_mut().ok_or(IoError::Closed)?;
        inner.flush()?;
        Ok(())
    }
}
