//! # Transport Backends
//!
//! Physical storage behind the `Input`/`Output` traits.
//!
//! ## Backends
//! - **Array**: fixed-capacity in-memory bytes
//! - **Mapped**: memory-mapped files, outputs grow on demand
//! - **Stream**: blocking sequential `Read`/`Write` channels
//! - **Text**: character sinks, one char per byte
//! - **Packet**: dynamic and static framing over a connected TCP socket

pub mod array;
pub mod mapped;
pub mod packet;
pub mod stream;
pub mod text;

pub use array::{ArrayInput, ArrayOutput};
pub use mapped::{MappedInput, MappedOutput};
pub use packet::{Framing, Packet, PacketFramer, StaticPacketOutput};
pub use stream::{StreamInput, StreamOutput};
pub use text::{LineSink, TextOutput};
