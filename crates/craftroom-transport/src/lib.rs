//! Transport layer for Craftroom.
//!
//! A [`Transport`] accepts [`Connection`]s; each connection splits into a
//! [`FrameSink`] owned by a writer task and a [`FrameSource`] owned by the
//! reader loop, so a slow client never blocks incoming frames.
//!
//! All futures are `Send` so connection handlers can run on spawned tasks.

mod error;
#[cfg(feature = "websocket")]
mod websocket;

pub use error::TransportError;
#[cfg(feature = "websocket")]
pub use websocket::{WebSocketConnection, WebSocketSink, WebSocketSource, WebSocketTransport};

use std::fmt;
use std::future::Future;
use std::net::SocketAddr;

use tokio::time::Instant;

// ---------------------------------------------------------------------------
// ConnectionId
// ---------------------------------------------------------------------------

/// Process-unique id of an accepted connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(u64);

impl ConnectionId {
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn into_inner(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Frames
// ---------------------------------------------------------------------------

/// One outbound message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    Text(String),
    Binary(Vec<u8>),
    /// Keepalive probe; the peer's pong counts as activity.
    Ping,
}

impl Frame {
    /// Wraps encoded bytes, as text when asked and the bytes are UTF-8.
    pub fn encoded(bytes: Vec<u8>, text: bool) -> Self {
        if !text {
            return Frame::Binary(bytes);
        }
        match String::from_utf8(bytes) {
            Ok(text) => Frame::Text(text),
            Err(err) => Frame::Binary(err.into_bytes()),
        }
    }
}

// ---------------------------------------------------------------------------
// Traits
// ---------------------------------------------------------------------------

pub trait Transport: Send + 'static {
    type Connection: Connection;

    /// Waits for the next client and completes its handshake.
    fn accept(&mut self) -> impl Future<Output = Result<Self::Connection, TransportError>> + Send;

    fn local_addr(&self) -> Result<SocketAddr, TransportError>;
}

pub trait Connection: Send + 'static {
    type Sink: FrameSink;
    type Source: FrameSource;

    fn id(&self) -> ConnectionId;

    fn split(self) -> (Self::Sink, Self::Source);
}

/// Write half of a connection.
pub trait FrameSink: Send + 'static {
    fn send(&mut self, frame: Frame) -> impl Future<Output = Result<(), TransportError>> + Send;

    /// Sends a close frame. Errors on an already-dead peer are not
    /// interesting to callers and are swallowed.
    fn close(&mut self) -> impl Future<Output = ()> + Send;
}

/// Read half of a connection.
pub trait FrameSource: Send + 'static {
    /// Next data frame, or `None` once the peer closed cleanly.
    ///
    /// Control frames are consumed here but still count as activity.
    /// Cancel-safe: dropping the future loses no data frame.
    fn recv(&mut self) -> impl Future<Output = Result<Option<Vec<u8>>, TransportError>> + Send;

    /// When the peer last sent any frame, control frames included.
    fn last_activity(&self) -> Instant;
}
