//! # Core Components
//!
//! The stream contract, the primitive codec and the formats built on it.
//!
//! ## Components
//! - **Stream**: position, capacity, byte order and lifecycle shared by all backends
//! - **Codec**: `Input`/`Output` traits composing primitives from single bytes
//! - **Buffer**: in-memory store usable as input and output at once
//! - **Options**: tagged name-value records
//!
//! ## Wire Format
//! ```text
//! short/int/long     big-endian, little-endian when inverted
//! string             [Length(1)] [Latin-1 chars(N <= 255)]
//! option record      [Tag(1)] [Name string] [Value]
//! ```

pub mod buffer;
pub mod codec;
pub mod options;
pub mod stream;
