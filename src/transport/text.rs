//! Character-stream backend for human-readable, log-style output.
//!
//! Each primitive byte becomes one `char` (Latin-1 widening) pushed into a
//! `fmt::Write` sink such as a `String`. Multi-byte values still pass through
//! the codec, so inversion only reorders characters; it carries no useful
//! meaning for text.

use std::fmt::{self, Write};

use crate::core::codec::{narrow, Output};
use crate::core::stream::Stream;
use crate::error::{constants, IoError, Result};

/// Sink for whole lines of text, as consumed by console front-ends.
pub trait LineSink {
    fn print_line(&mut self, line: &str) -> Result<()>;
}

#[derive(Debug)]
pub struct TextOutput<W: Write> {
    inner: Option<W>,
    position: usize,
    inverted: bool,
}

impl<W: Write> TextOutput<W> {
    pub fn new(inner: W) -> Self {
        Self {
            inner: Some(inner),
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

    /// Write raw text with no prefix or terminator.
    pub fn write_text(&mut self, text: &str) -> Result<()> {
        for c in text.chars() {
            self.write_byte(narrow(c))?;
        }
        Ok(())
    }
}

fn sink_error(_: fmt::Error) -> IoError {
    IoError::Io(std::io::Error::new(
        std::io::ErrorKind::Other,
        "text sink rejected write",
    ))
}

impl<W: Write> Stream for TextOutput<W> {
    fn position(&self) -> usize {
        self.position
    }

    fn capacity(&self) -> usize {
        0
    }

    fn is_inverted(&self) -> bool {
        self.inverted
    }

    fn set_inverted(&mut self, inverted: bool) {
        self.inverted = inverted;
    }

    fn is_closed(&self) -> Result<bool> {
        Ok(self.inner.is_none())
    }

    fn skip(&mut self, _delta: i64) -> Result<()> {
        Err(IoError::Unsupported(constants::CAP_SKIP_OUTPUT))
    }

    fn reset(&mut self) -> Result<()> {
        Err(IoError::Unsupported(constants::CAP_RESET))
    }

    fn close(&mut self) -> Result<()> {
        self.inner = None;
        Ok(())
    }
}

impl<W: Write> Output for TextOutput<W> {
    fn write_byte(&mut self, value: u8) -> Result<()> {
        let inner = self.inner.as_mut().ok_or(IoError::Closed)?;
        inner.write_char(char::from(value)).map_err(sink_error)?;
        self.position += 1;
        Ok(())
    }
}

impl<W: Write> LineSink for TextOutput<W> {
    fn print_line(&mut self, line: &str) -> Result<()> {
        self.write_line(line)
    }
}
