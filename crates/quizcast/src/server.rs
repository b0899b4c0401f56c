//! `QuizcastServer` builder and server loop.
//!
//! This is the entry point for running a quiz server. It ties together
//! all the layers: transport → protocol → router → rooms.

use std::sync::Arc;

use quizcast_protocol::JsonCodec;
use quizcast_room::{RoomConfig, RoomEvent};
use quizcast_transport::{Transport, WebSocketTransport};
use tokio::sync::{mpsc, Mutex};

use crate::handler::handle_connection;
use crate::{QuizcastError, Router};

/// Shared server state passed to each connection handler task.
///
/// Wrapped in `Arc` so it can be cheaply cloned across tasks. The router
/// (and with it every registry) lives behind one `Mutex` — the single
/// coordination primitive guarding the cross-room shared state.
pub(crate) struct ServerState {
    pub(crate) router: Mutex<Router>,
    pub(crate) codec: JsonCodec,
}

/// Builder for configuring and starting a Quizcast server.
///
/// # Example
///
/// ```rust,ignore
/// let server = QuizcastServer::builder()
///     .bind("0.0.0.0:3001")
///     .build()
///     .await?;
/// server.run().await
/// ```
pub struct QuizcastServerBuilder {
    bind_addr: String,
    room_config: RoomConfig,
}

impl QuizcastServerBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            bind_addr: "127.0.0.1:3001".to_string(),
            room_config: RoomConfig::default(),
        }
    }

    /// Sets the address to bind the server to.
    pub fn bind(mut self, addr: &str) -> Self {
        self.bind_addr = addr.to_string();
        self
    }

    /// Sets the room configuration (grace period, channel sizes).
    pub fn room_config(mut self, config: RoomConfig) -> Self {
        self.room_config = config;
        self
    }

    /// Binds the transport and assembles the server.
    pub async fn build(self) -> Result<QuizcastServer, QuizcastError> {
        let transport = WebSocketTransport::bind(&self.bind_addr).await?;

        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let state = Arc::new(ServerState {
            router: Mutex::new(Router::new(self.room_config, events_tx)),
            codec: JsonCodec,
        });

        Ok(QuizcastServer { transport, state, events_rx })
    }
}

impl Default for QuizcastServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A running quiz server.
///
/// Call [`run()`](Self::run) to start accepting connections.
pub struct QuizcastServer {
    transport: WebSocketTransport,
    state: Arc<ServerState>,
    /// Reports from room actors (expiries, endings), applied to the
    /// router by the event pump in [`run`](Self::run).
    events_rx: mpsc::UnboundedReceiver<RoomEvent>,
}

impl QuizcastServer {
    /// Creates a new builder.
    pub fn builder() -> QuizcastServerBuilder {
        QuizcastServerBuilder::new()
    }

    /// Returns the local address the server is bound to.
    pub fn local_addr(&self) -> std::io::Result<std::net::SocketAddr> {
        self.transport.local_addr()
    }

    /// Runs the server until the process is terminated.
    ///
    /// Spawns the room-event pump (keeping the router's indices
    /// consistent with room lifecycles), then accepts connections and
    /// gives each its own handler task.
    pub async fn run(mut self) -> Result<(), QuizcastError> {
        tracing::info!("quizcast server running");

        // Room events mutate the same indices as message dispatch, so the
        // pump takes the same router lock — rooms report asynchronously,
        // the indices still change atomically.
        let pump_state = Arc::clone(&self.state);
        let mut events_rx = self.events_rx;
        tokio::spawn(async move {
            while let Some(event) = events_rx.recv().await {
                pump_state.router.lock().await.handle_room_event(event);
            }
        });

        loop {
            match self.transport.accept().await {
                Ok(conn) => {
                    let state = Arc::clone(&self.state);
                    tokio::spawn(async move {
                        if let Err(e) = handle_connection(conn, state).await {
                            tracing::debug!(
                                error = %e,
                                "connection ended with error"
                            );
                        }
                    });
                }
                Err(e) => {
                    tracing::error!(error = %e, "accept failed");
                }
            }
        }
    }
}
