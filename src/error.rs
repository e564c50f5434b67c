//! # Error Types
//!
//! Error handling for every backend, codec and framer in the crate.
//!
//! Errors fall into three tiers (see [`ErrorTier`]):
//! - **Recoverable**: the peer or the data misbehaved (socket closed mid-read,
//!   short static packet, malformed option tag). Expected to be handled at the
//!   call site that started the I/O.
//! - **Contract**: the caller misused a backend (read past capacity, write after
//!   close). These indicate a bug and are meant to be propagated with `?` up to a
//!   top-level handler.
//! - **Unsupported**: the backend never implements the requested capability
//!   (`reset` on a socket stream, `is_closed` on a plain blocking stream).
//!
//! ## Example Usage
//! ```rust
//! use wire_io::error::{ErrorTier, IoError, Result};
//! use wire_io::io;
//! use wire_io::core::codec::Input;
//!
//! fn first_int(bytes: &[u8]) -> Result<i32> {
//!     let mut input = io::array_input(bytes.to_vec());
//!     input.read_int()
//! }
//!
//! match first_int(&[0x00, 0x01]) {
//!     Ok(value) => println!("{value}"),
//!     Err(e) => assert_eq!(e.tier(), ErrorTier::Contract),
//! }
//! ```

use std::io;
use thiserror::Error;

/// Error message constants shared by several backends.
pub mod constants {
    /// Connection errors
    pub const ERR_CONNECTION_CLOSED: &str = "Socket closed unexpectedly";
    pub const ERR_TIMEOUT: &str = "Timed out waiting for packet data";
    pub const ERR_CANCELLED: &str = "Packet wait cancelled";

    /// Packet declaration errors
    pub const ERR_ZERO_STATIC_INPUT: &str = "Static input packets need a length greater than 0";

    /// Capability names reported through `IoError::Unsupported`
    pub const CAP_RESET: &str = "reset";
    pub const CAP_IS_CLOSED: &str = "is_closed";
    pub const CAP_SKIP_BACKWARD: &str = "skip backward";
    pub const CAP_SKIP_OUTPUT: &str = "skip on a sequential output";
}

/// How an error is expected to be handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorTier {
    /// Data or peer failure, handle at the call site.
    Recoverable,
    /// Caller bug or backend mismatch, propagate to a top-level handler.
    Contract,
    /// Capability not provided by this backend.
    Unsupported,
}

// IoError is the primary error type for all stream operations
#[derive(Error, Debug)]
pub enum IoError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Connection closed")]
    ConnectionClosed,

    #[error("End of stream reached at position {position}")]
    EndOfStream { position: usize },

    #[error("Data shortage: expected {expected} bytes, received {actual}")]
    DataShortage { expected: usize, actual: usize },

    #[error("Invalid packet length: {0}")]
    InvalidPacketLength(String),

    #[error("Malformed option: unknown tag {tag} at byte offset {offset}")]
    MalformedOption { tag: u8, offset: usize },

    #[error("Timeout occurred")]
    Timeout,

    #[error("Operation cancelled")]
    Cancelled,

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Capacity exhausted: {requested} byte(s) at {position} of {capacity}")]
    CapacityExhausted {
        position: usize,
        capacity: usize,
        requested: usize,
    },

    #[error("Declared stream length of {length} bytes exceeded")]
    LengthExceeded { length: usize },

    #[error("Stream is closed")]
    Closed,

    #[error("Operation not supported by this backend: {0}")]
    Unsupported(&'static str),
}

impl IoError {
    /// Classify the error into its handling tier.
    pub fn tier(&self) -> ErrorTier {
        match self {
            IoError::CapacityExhausted { .. }
            | IoError::LengthExceeded { .. }
            | IoError::Closed => ErrorTier::Contract,
            IoError::Unsupported(_) => ErrorTier::Unsupported,
            _ => ErrorTier::Recoverable,
        }
    }

    /// Shorthand for `tier() == ErrorTier::Contract`.
    pub fn is_contract_violation(&self) -> bool {
        self.tier() == ErrorTier::Contract
    }
}

/// Type alias for Results using IoError
pub type Result<T> = std::result::Result<T, IoError>;
