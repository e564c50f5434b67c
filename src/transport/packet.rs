//! # Socket Packet Framing
//!
//! Builds [`Input`]/[`Output`] objects bound to one connected [`TcpStream`].
//!
//! ## Framing
//! - **Dynamic**: no declared length. Inputs wait for the first byte and then
//!   read straight from the socket; outputs write straight through.
//! - **Static(n)**: a declared byte length. Inputs wait for the data and read
//!   exactly `n` bytes into a private array; outputs accumulate into a private
//!   buffer that is sent on `flush`.
//! - **Available**: input only, captures whatever is readable once the first
//!   byte shows up.
//!
//! Framing is agreed out of band, nothing is added on the wire.
//!
//! ## Waiting
//! Waits are made of blocking `peek`/`read` calls bounded by
//! `PacketConfig::poll_interval`. Between slices the framer checks its
//! [`CancellationToken`], whether the peer is still connected and the optional
//! `read_timeout` deadline.

use std::io::{self, ErrorKind, Read, Write};
use std::net::TcpStream;
use std::time::{Duration, Instant};

use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument, warn};

use crate::config::PacketConfig;
use crate::core::codec::{Input, Output};
use crate::core::stream::Stream;
use crate::error::{constants, IoError, Result};
use crate::transport::array::{ArrayInput, ArrayOutput};
use crate::transport::stream::{StreamInput, StreamOutput};
use crate::utils::metrics::{global_metrics, Timer};

/// Shortest slice handed to `set_read_timeout`, which rejects zero.
const MIN_SLICE: Duration = Duration::from_millis(1);

/// How a packet is delimited.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Framing {
    /// No declared length.
    Dynamic,
    /// Fixed byte length. `0` means the configured default on outputs and is
    /// rejected on inputs.
    Static(usize),
    /// Whatever is readable when data first appears (inputs only).
    Available,
}

/// A named packet declaration. The name only shows up in logs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Packet {
    pub name: String,
    pub framing: Framing,
}

impl Packet {
    pub fn new(name: impl Into<String>, framing: Framing) -> Self {
        Self {
            name: name.into(),
            framing,
        }
    }

    pub fn dynamic(name: impl Into<String>) -> Self {
        Self::new(name, Framing::Dynamic)
    }

    pub fn fixed(name: impl Into<String>, length: usize) -> Self {
        Self::new(name, Framing::Static(length))
    }

    pub fn available(name: impl Into<String>) -> Self {
        Self::new(name, Framing::Available)
    }
}

/// Creates packets over one connected socket.
#[derive(Debug)]
pub struct PacketFramer {
    socket: TcpStream,
    config: PacketConfig,
    cancel: CancellationToken,
}

impl PacketFramer {
    pub fn new(socket: TcpStream, config: PacketConfig) -> Self {
        Self {
            socket,
            config,
            cancel: CancellationToken::new(),
        }
    }

    /// Replace the token checked between wait slices.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    /// Token that aborts pending and future waits when cancelled.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn socket(&self) -> &TcpStream {
        &self.socket
    }

    pub fn config(&self) -> &PacketConfig {
        &self.config
    }

    /// Non-blocking liveness check. A peer that shut down its write half reads
    /// as disconnected.
    pub fn is_connected(&self) -> bool {
        if self.socket.set_nonblocking(true).is_err() {
            return false;
        }
        let mut peeked = [0u8; 1];
        let connected = match self.socket.peek(&mut peeked) {
            Ok(0) => false,
            Ok(_) => true,
            Err(e) => e.kind() == ErrorKind::WouldBlock,
        };
        if let Err(e) = self.socket.set_nonblocking(false) {
            global_metrics().connection_error();
            warn!(error = %e, "Failed to restore blocking mode after liveness check");
            return false;
        }
        connected
    }

    /// Open an input packet according to its framing.
    #[instrument(skip(self, packet), fields(packet = %packet.name))]
    pub fn open_input(&self, packet: &Packet) -> Result<Box<dyn Input>> {
        Ok(match packet.framing {
            Framing::Dynamic => Box::new(self.dynamic_input()?),
            Framing::Static(length) => Box::new(self.static_input(length)?),
            Framing::Available => Box::new(self.available_input()?),
        })
    }

    /// Open an output packet according to its framing.
    #[instrument(skip(self, packet), fields(packet = %packet.name))]
    pub fn open_output(&self, packet: &Packet) -> Result<Box<dyn Output>> {
        Ok(match packet.framing {
            Framing::Dynamic => Box::new(self.dynamic_output()?),
            Framing::Static(length) => Box::new(self.static_output(length)?),
            Framing::Available => {
                return Err(IoError::InvalidPacketLength(
                    "Available framing only applies to input packets".to_string(),
                ))
            }
        })
    }

    /// Wait for the first byte, then read directly from the socket.
    pub fn dynamic_input(&self) -> Result<StreamInput<TcpStream>> {
        self.with_wait(|deadline| {
            let mut peeked = [0u8; 1];
            self.wait_readable(&mut peeked, deadline)?;
            Ok(())
        })?;
        global_metrics().packet_received(0);
        debug!("Dynamic input packet ready");
        Ok(StreamInput::new(self.socket.try_clone()?))
    }

    /// Wait for `length` bytes and capture them in a private array.
    pub fn static_input(&self, length: usize) -> Result<ArrayInput> {
        if length == 0 {
            return Err(IoError::InvalidPacketLength(
                constants::ERR_ZERO_STATIC_INPUT.to_string(),
            ));
        }

        let _timer = Timer::start("static_input");
        let data = self.with_wait(|deadline| {
            let mut peeked = [0u8; 1];
            self.wait_readable(&mut peeked, deadline)?;

            let mut data = vec![0u8; length];
            let filled = self.fill(&mut data, deadline)?;
            if filled < length {
                global_metrics().connection_error();
                warn!(expected = length, actual = filled, "Short static packet");
                return Err(IoError::DataShortage {
                    expected: length,
                    actual: filled,
                });
            }
            Ok(data)
        })?;

        global_metrics().packet_received(length as u64);
        debug!(length, "Static input packet read");
        Ok(ArrayInput::new(data))
    }

    /// Capture whatever is readable once data first appears, bounded by
    /// `max_available_read`.
    pub fn available_input(&self) -> Result<ArrayInput> {
        let data = self.with_wait(|deadline| {
            let mut peeked = vec![0u8; self.config.max_available_read.max(1)];
            let available = self.wait_readable(&mut peeked, deadline)?;

            let mut data = vec![0u8; available];
            let filled = self.fill(&mut data, deadline)?;
            if filled < available {
                return Err(IoError::DataShortage {
                    expected: available,
                    actual: filled,
                });
            }
            Ok(data)
        })?;

        global_metrics().packet_received(data.len() as u64);
        debug!(length = data.len(), "Available input packet read");
        Ok(ArrayInput::new(data))
    }

    /// Write straight through to the socket.
    pub fn dynamic_output(&self) -> Result<StreamOutput<TcpStream>> {
        Ok(StreamOutput::new(self.socket.try_clone()?))
    }

    /// Buffer up to `length` bytes (`0` = configured default) and send them on
    /// `flush`.
    pub fn static_output(&self, length: usize) -> Result<StaticPacketOutput> {
        let length = if length == 0 {
            self.config.default_static_length
        } else {
            length
        };
        Ok(StaticPacketOutput::new(self.socket.try_clone()?, length))
    }

    fn deadline(&self) -> Option<Instant> {
        self.config.read_timeout.map(|timeout| Instant::now() + timeout)
    }

    /// Run a wait with a fresh deadline, then put the socket back to its
    /// configured blocking behaviour whatever the outcome.
    fn with_wait<T>(&self, wait: impl FnOnce(Option<Instant>) -> Result<T>) -> Result<T> {
        let result = wait(self.deadline());
        let restored = self
            .socket
            .set_read_timeout(self.config.read_timeout.filter(|t| !t.is_zero()));
        let value = result?;
        restored?;
        Ok(value)
    }

    /// Length of the next blocking slice, or why waiting must stop.
    fn next_slice(&self, deadline: Option<Instant>) -> Result<Duration> {
        if self.cancel.is_cancelled() {
            debug!("{}", constants::ERR_CANCELLED);
            return Err(IoError::Cancelled);
        }
        let slice = match deadline {
            Some(deadline) => {
                let left = deadline.saturating_duration_since(Instant::now());
                if left.is_zero() {
                    debug!("{}", constants::ERR_TIMEOUT);
                    return Err(IoError::Timeout);
                }
                left.min(self.config.poll_interval)
            }
            None => self.config.poll_interval,
        };
        Ok(slice.max(MIN_SLICE))
    }

    /// Block until at least one byte is readable. Returns how many bytes are
    /// buffered, up to `peeked.len()`.
    fn wait_readable(&self, peeked: &mut [u8], deadline: Option<Instant>) -> Result<usize> {
        loop {
            let slice = self.next_slice(deadline)?;
            self.socket.set_read_timeout(Some(slice))?;
            match self.socket.peek(peeked) {
                Ok(0) => {
                    global_metrics().connection_error();
                    warn!("{}", constants::ERR_CONNECTION_CLOSED);
                    return Err(IoError::ConnectionClosed);
                }
                Ok(n) => return Ok(n),
                Err(e) if slice_elapsed(&e) => continue,
                Err(e) => {
                    global_metrics().connection_error();
                    return Err(e.into());
                }
            }
        }
    }

    /// Read until `buf` is full or the peer closes. Returns the bytes read.
    fn fill(&self, buf: &mut [u8], deadline: Option<Instant>) -> Result<usize> {
        let mut reader = &self.socket;
        let mut filled = 0;
        while filled < buf.len() {
            let slice = self.next_slice(deadline)?;
            self.socket.set_read_timeout(Some(slice))?;
            match reader.read(&mut buf[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if slice_elapsed(&e) => continue,
                Err(e) => {
                    global_metrics().connection_error();
                    return Err(e.into());
                }
            }
        }
        Ok(filled)
    }
}

fn slice_elapsed(e: &io::Error) -> bool {
    matches!(
        e.kind(),
        ErrorKind::WouldBlock | ErrorKind::TimedOut | ErrorKind::Interrupted
    )
}

/// Buffered output packet of fixed size.
///
/// `flush` sends the bytes written since the previous flush and advances the
/// flushed offset. `reset` rewinds both the cursor and the flushed offset.
#[derive(Debug)]
pub struct StaticPacketOutput {
    socket: Option<TcpStream>,
    buffer: ArrayOutput,
    flushed: usize,
}

impl StaticPacketOutput {
    fn new(socket: TcpStream, length: usize) -> Self {
        Self {
            socket: Some(socket),
            buffer: ArrayOutput::new(length),
            flushed: 0,
        }
    }

    /// Offset up to which bytes have been sent.
    pub fn flushed_offset(&self) -> usize {
        self.flushed
    }

    /// Bytes written but not yet sent.
    pub fn pending(&self) -> &[u8] {
        let written = self.buffer.written();
        &written[self.flushed.min(written.len())..]
    }
}

impl Stream for StaticPacketOutput {
    fn position(&self) -> usize {
        self.buffer.position()
    }

    fn capacity(&self) -> usize {
        self.buffer.capacity()
    }

    fn is_inverted(&self) -> bool {
        self.buffer.is_inverted()
    }

    fn set_inverted(&mut self, inverted: bool) {
        self.buffer.set_inverted(inverted);
    }

    fn is_closed(&self) -> Result<bool> {
        Ok(self.socket.is_none())
    }

    fn skip(&mut self, delta: i64) -> Result<()> {
        self.buffer.skip(delta)
    }

    fn reset(&mut self) -> Result<()> {
        self.buffer.reset()?;
        self.flushed = 0;
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        if self.socket.is_none() {
            return Ok(());
        }
        self.flush()?;
        self.socket = None;
        self.buffer.close()
    }
}

impl Output for StaticPacketOutput {
    fn write_byte(&mut self, value: u8) -> Result<()> {
        self.buffer.write_byte(value)
    }

    fn write_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        self.buffer.write_bytes(bytes)
    }

    fn flush(&mut self) -> Result<()> {
        let socket = self.socket.as_mut().ok_or(IoError::Closed)?;
        let written = self.buffer.written();
        if written.len() > self.flushed {
            let chunk = &written[self.flushed..];
            socket.write_all(chunk)?;
            socket.flush()?;
            global_metrics().packet_sent(chunk.len() as u64);
            debug!(from = self.flushed, to = written.len(), "Static packet flushed");
            self.flushed = written.len();
        }
        global_metrics().flush();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use std::net::TcpListener;
    use std::thread;

    fn pair() -> (TcpStream, TcpStream) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let client = TcpStream::connect(listener.local_addr().unwrap()).unwrap();
        let (server, _) = listener.accept().unwrap();
        (client, server)
    }

    fn quick_config() -> PacketConfig {
        PacketConfig {
            poll_interval: Duration::from_millis(10),
            read_timeout: Some(Duration::from_secs(5)),
            ..PacketConfig::default()
        }
    }

    #[test]
    fn test_static_input_reads_declared_length() {
        let (mut client, server) = pair();
        client.write_all(&[0, 0, 0, 42, 9]).unwrap();

        let framer = PacketFramer::new(server, quick_config());
        let mut input = framer.static_input(4).unwrap();
        assert_eq!(input.capacity(), 4);
        assert_eq!(input.read_int().unwrap(), 42);
        assert!(!input.has_remaining().unwrap());

        // the trailing byte stays on the socket
        let mut rest = framer.static_input(1).unwrap();
        assert_eq!(rest.read_byte().unwrap(), 9);
    }

    #[test]
    fn test_static_input_short_read() {
        let (mut client, server) = pair();
        client.write_all(&[1, 2]).unwrap();
        drop(client);

        let framer = PacketFramer::new(server, quick_config());
        assert!(matches!(
            framer.static_input(4),
            Err(IoError::DataShortage {
                expected: 4,
                actual: 2
            })
        ));
    }

    #[test]
    fn test_static_input_rejects_zero_length() {
        let (_client, server) = pair();
        let framer = PacketFramer::new(server, quick_config());
        assert!(matches!(
            framer.static_input(0),
            Err(IoError::InvalidPacketLength(_))
        ));
    }

    #[test]
    fn test_dynamic_input_waits_for_late_data() {
        let (mut client, server) = pair();
        let writer = thread::spawn(move || {
            thread::sleep(Duration::from_millis(50));
            client.write_all(&[0x01, 0x02]).unwrap();
            client
        });

        let framer = PacketFramer::new(server, quick_config());
        let mut input = framer.dynamic_input().unwrap();
        assert_eq!(input.read_short().unwrap(), 0x0102);
        writer.join().unwrap();
    }

    #[test]
    fn test_dynamic_input_peer_closed() {
        let (client, server) = pair();
        drop(client);

        let framer = PacketFramer::new(server, quick_config());
        assert!(matches!(
            framer.dynamic_input(),
            Err(IoError::ConnectionClosed)
        ));
    }

    #[test]
    fn test_wait_times_out() {
        let (_client, server) = pair();
        let config = PacketConfig {
            poll_interval: Duration::from_millis(10),
            read_timeout: Some(Duration::from_millis(60)),
            ..PacketConfig::default()
        };
        let framer = PacketFramer::new(server, config);
        assert!(matches!(framer.static_input(2), Err(IoError::Timeout)));
    }

    #[test]
    fn test_cancellation_stops_wait() {
        let (_client, server) = pair();
        let token = CancellationToken::new();
        let framer = PacketFramer::new(
            server,
            PacketConfig {
                poll_interval: Duration::from_millis(10),
                ..PacketConfig::default()
            },
        )
        .with_cancellation(token.clone());

        let canceller = thread::spawn(move || {
            thread::sleep(Duration::from_millis(50));
            token.cancel();
        });

        assert!(matches!(framer.dynamic_input(), Err(IoError::Cancelled)));
        canceller.join().unwrap();
    }

    #[test]
    fn test_dynamic_output_preserves_write_order() {
        let (mut client, server) = pair();
        let framer = PacketFramer::new(server, quick_config());

        let mut out = framer.dynamic_output().unwrap();
        out.write_short(0x0102).unwrap();
        out.write_byte(3).unwrap();
        out.flush().unwrap();

        let mut received = [0u8; 3];
        client.read_exact(&mut received).unwrap();
        assert_eq!(received, [1, 2, 3]);
    }

    #[test]
    fn test_static_output_sends_only_new_bytes() {
        let (mut client, server) = pair();
        let framer = PacketFramer::new(server, quick_config());

        let mut out = framer.static_output(8).unwrap();
        out.write_int(1).unwrap();
        out.flush().unwrap();
        assert_eq!(out.flushed_offset(), 4);
        out.write_short(2).unwrap();
        assert_eq!(out.pending(), &[0, 2]);
        out.flush().unwrap();
        out.flush().unwrap();

        let mut received = [0u8; 6];
        client.read_exact(&mut received).unwrap();
        assert_eq!(received, [0, 0, 0, 1, 0, 2]);
    }

    #[test]
    fn test_static_output_close_flushes_pending() {
        let (mut client, server) = pair();
        let framer = PacketFramer::new(server, quick_config());

        let mut out = framer.static_output(4).unwrap();
        out.write_bytes(&[7, 8]).unwrap();
        out.close().unwrap();
        assert!(out.is_closed().unwrap());
        assert!(matches!(out.write_byte(1), Err(IoError::Closed)));
        assert!(out.close().is_ok());

        let mut received = [0u8; 2];
        client.read_exact(&mut received).unwrap();
        assert_eq!(received, [7, 8]);
    }

    #[test]
    fn test_static_output_zero_uses_default_length() {
        let (_client, server) = pair();
        let framer = PacketFramer::new(server, quick_config());
        let out = framer.static_output(0).unwrap();
        assert_eq!(out.capacity(), framer.config().default_static_length);
    }

    #[test]
    fn test_available_output_rejected() {
        let (_client, server) = pair();
        let framer = PacketFramer::new(server, quick_config());
        assert!(matches!(
            framer.open_output(&Packet::available("chunk")),
            Err(IoError::InvalidPacketLength(_))
        ));
    }

    #[test]
    fn test_liveness_check_leaves_socket_blocking() {
        let (mut client, server) = pair();
        let framer = PacketFramer::new(server, quick_config());
        assert!(framer.is_connected());

        let writer = thread::spawn(move || {
            thread::sleep(Duration::from_millis(30));
            client.write_all(&[5]).unwrap();
            client
        });

        let mut reader = framer.socket();
        let mut byte = [0u8; 1];
        assert_eq!(reader.read(&mut byte).unwrap(), 1);
        assert_eq!(byte, [5]);
        writer.join().unwrap();
    }

    #[test]
    fn test_is_connected() {
        let (client, server) = pair();
        let framer = PacketFramer::new(server, quick_config());
        assert!(framer.is_connected());
        drop(client);
        thread::sleep(Duration::from_millis(20));
        assert!(!framer.is_connected());
    }
}
