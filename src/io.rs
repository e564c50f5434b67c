//! # Backend Factory
//!
//! Shorthand constructors for every backend, so callers can pick storage
//! without naming transport types.
//!
//! ```rust
//! use wire_io::core::codec::{Input, Output};
//! use wire_io::io;
//!
//! let mut out = io::array_output(4);
//! out.write_int(7).unwrap();
//!
//! let mut input = io::array_input(out.into_bytes());
//! assert_eq!(input.read_int().unwrap(), 7);
//! ```

use std::fmt;
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use bytes::Bytes;

use crate::config::MappedConfig;
use crate::core::buffer::Buffer;
use crate::error::Result;
use crate::transport::{
    ArrayInput, ArrayOutput, MappedInput, MappedOutput, StreamInput, StreamOutput, TextOutput,
};

/// Read from an in-memory array.
pub fn array_input(data: impl Into<Bytes>) -> ArrayInput {
    ArrayInput::new(data)
}

/// Write into a zeroed array of `capacity` bytes.
pub fn array_output(capacity: usize) -> ArrayOutput {
    ArrayOutput::new(capacity)
}

/// Shared read/write buffer of `capacity` bytes.
pub fn buffer(capacity: usize) -> Buffer {
    Buffer::new(capacity)
}

/// Sequential reader over a file, bounded by its current length.
pub fn file_input<P: AsRef<Path>>(path: P) -> Result<StreamInput<BufReader<File>>> {
    let file = File::open(path)?;
    let length = file.metadata()?.len() as usize;
    Ok(StreamInput::with_length(BufReader::new(file), length))
}

/// Sequential writer creating or truncating a file.
pub fn file_output<P: AsRef<Path>>(path: P) -> Result<StreamOutput<BufWriter<File>>> {
    let file = File::create(path)?;
    Ok(StreamOutput::new(BufWriter::new(file)))
}

/// Memory-map an existing file for reading.
pub fn mapped_input<P: AsRef<Path>>(path: P) -> Result<MappedInput> {
    MappedInput::open(path)
}

/// Create a growable memory-mapped file.
pub fn mapped_output<P: AsRef<Path>>(path: P, config: &MappedConfig) -> Result<MappedOutput> {
    MappedOutput::create(path, config)
}

/// Character sink writing one char per byte.
pub fn text_output<W: fmt::Write>(sink: W) -> TextOutput<W> {
    TextOutput::new(sink)
}

/// Unbounded blocking input over any reader.
pub fn reader_input<R: Read>(reader: R) -> StreamInput<R> {
    StreamInput::new(reader)
}

/// Unbounded blocking output over any writer.
pub fn writer_output<W: Write>(writer: W) -> StreamOutput<W> {
    StreamOutput::new(writer)
}
