//! # wire-io
//!
//! Byte-oriented I/O: primitive values in and out of arrays, memory-mapped
//! files, blocking channels, text sinks and framed TCP packets, with explicit
//! byte-order control.
//!
//! ## Layers
//! - [`core::stream`]: position, capacity, byte order and lifecycle
//! - [`core::codec`]: `Input`/`Output` derive every primitive from one byte
//! - [`core::buffer`] and [`core::options`]: formats built on the codec
//! - [`transport`]: the backends, including the socket [`transport::packet`] framer
//! - [`io`]: factory functions
//! - [`config`], [`error`], [`utils`]: configuration, errors, logging and metrics
//!
//! ## Example
//! ```rust
//! use wire_io::core::codec::{Input, Output};
//! use wire_io::core::stream::Stream;
//! use wire_io::io;
//!
//! let mut out = io::array_output(6);
//! out.set_inverted(true);
//! out.write_short(0x0102).unwrap();
//! out.write_string("ok").unwrap();
//!
//! let bytes = out.into_bytes();
//! assert_eq!(&bytes[..2], &[0x02, 0x01]);
//!
//! let mut input = io::array_input(bytes);
//! input.set_inverted(true);
//! assert_eq!(input.read_short().unwrap(), 0x0102);
//! assert_eq!(input.read_string().unwrap(), "ok");
//! ```

pub mod config;
pub mod core;
pub mod error;
pub mod io;
pub mod transport;
pub mod utils;

pub use crate::config::IoConfig;
pub use crate::core::buffer::Buffer;
pub use crate::core::codec::{Input, Output};
pub use crate::core::options::{OptionEntry, OptionInput, OptionKind, OptionOutput, OptionValue};
pub use crate::core::stream::Stream;
pub use crate::error::{ErrorTier, IoError, Result};
pub use crate::transport::packet::{Framing, Packet, PacketFramer};
