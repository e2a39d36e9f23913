//! `CraftroomServer` builder and accept loop.
//!
//! This ties the layers together: transport → protocol → session → room.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use craftroom_protocol::{Codec, JsonCodec};
use craftroom_room::{RoomConfig, RoomManager};
use craftroom_session::{PlayerStore, SessionManager};
use craftroom_transport::{Transport, WebSocketTransport};
use tokio::sync::Mutex;

use crate::handler::handle_connection;
use crate::{CraftroomError, ServerConfig};

/// Shared server state passed to each connection handler task.
pub(crate) struct ServerState<S: PlayerStore, C: Codec> {
    pub(crate) sessions: Mutex<SessionManager>,
    pub(crate) rooms: Mutex<RoomManager>,
    pub(crate) store: S,
    pub(crate) codec: C,
    pub(crate) config: ServerConfig,
}

/// Builder for configuring and starting a Craftroom server.
///
/// # Example
///
/// ```rust,ignore
/// use craftroom::prelude::*;
///
/// let server = CraftroomServer::builder()
///     .bind("0.0.0.0:5001")
///     .build(MemoryStore::new())
///     .await?;
/// server.run().await
/// ```
pub struct CraftroomServerBuilder {
    config: ServerConfig,
    room_config: RoomConfig,
}

impl CraftroomServerBuilder {
    pub fn new() -> Self {
        Self {
            config: ServerConfig::default(),
            room_config: RoomConfig::default(),
        }
    }

    pub fn bind(mut self, addr: &str) -> Self {
        self.config.bind_addr = addr.to_string();
        self
    }

    pub fn config(mut self, config: ServerConfig) -> Self {
        self.config = config;
        self
    }

    /// Settings for every room the server creates.
    pub fn room_config(mut self, config: RoomConfig) -> Self {
        self.room_config = config;
        self
    }

    pub fn idle_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.config.idle_timeout = timeout;
        self
    }

    /// Binds the listener. Uses `JsonCodec` over `WebSocketTransport`.
    pub async fn build<S: PlayerStore>(
        self,
        store: S,
    ) -> Result<CraftroomServer<S, JsonCodec>, CraftroomError> {
        let transport = WebSocketTransport::bind(&self.config.bind_addr).await?;

        let state = Arc::new(ServerState {
            sessions: Mutex::new(SessionManager::new()),
            rooms: Mutex::new(RoomManager::new(self.room_config)),
            store,
            codec: JsonCodec,
            config: self.config,
        });

        Ok(CraftroomServer { transport, state })
    }
}

impl Default for CraftroomServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A bound Craftroom server.
///
/// Call [`run()`](Self::run) to start accepting connections.
pub struct CraftroomServer<S: PlayerStore, C: Codec> {
    transport: WebSocketTransport,
    state: Arc<ServerState<S, C>>,
}

impl CraftroomServer<craftroom_session::MemoryStore, JsonCodec> {
    pub fn builder() -> CraftroomServerBuilder {
        CraftroomServerBuilder::new()
    }
}

impl<S: PlayerStore, C: Codec> CraftroomServer<S, C> {
    pub fn local_addr(&self) -> Result<SocketAddr, CraftroomError> {
        Ok(self.transport.local_addr()?)
    }

    /// Accepts connections and spawns a handler task for each. Runs until
    /// the task is dropped.
    pub async fn run(mut self) -> Result<(), CraftroomError> {
        tracing::info!(addr = %self.local_addr()?, "Craftroom server running");

        loop {
            match self.transport.accept().await {
                Ok(conn) => {
                    let state = Arc::clone(&self.state);
                    tokio::spawn(async move {
                        if let Err(e) = handle_connection(conn, state).await {
                            tracing::debug!(error = %e, "connection ended with error");
                        }
                    });
                }
                Err(e) => {
                    tracing::warn!(error = %e, "accept failed");
                }
            }
        }
    }
}
