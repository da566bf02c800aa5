//! `RelayServer` builder and accept loop.
//!
//! This is the entry point for running the relay. It ties the layers
//! together: transport → protocol → dispatcher, plus the background
//! idle-room reaper.

use std::sync::Arc;

use reelcast_protocol::JsonCodec;
use reelcast_room::RelayConfig;
use reelcast_transport::{Transport, WebSocketTransport};
use tokio::sync::Mutex;

use crate::handler::handle_connection;
use crate::{reaper, Relay, RelayError};

/// Shared server state passed to each connection handler task.
///
/// The whole relay sits behind ONE mutex: a handler holds it for the full
/// duration of an inbound event, which is what makes event processing
/// cooperative and room mutations atomic.
pub(crate) struct ServerState {
    pub(crate) relay: Mutex<Relay>,
    pub(crate) config: RelayConfig,
    pub(crate) codec: JsonCodec,
}

/// Builder for configuring and starting a relay server.
///
/// # Example
///
/// ```rust,no_run
/// use reelcast::RelayServerBuilder;
///
/// # async fn run() -> Result<(), reelcast::RelayError> {
/// let server = RelayServerBuilder::new().bind("0.0.0.0:3000").build().await?;
/// server.run().await
/// # }
/// ```
pub struct RelayServerBuilder {
    bind_addr: String,
    config: RelayConfig,
}

impl RelayServerBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            bind_addr: "127.0.0.1:3000".to_string(),
            config: RelayConfig::default(),
        }
    }

    /// Sets the address to bind the server to.
    pub fn bind(mut self, addr: &str) -> Self {
        self.bind_addr = addr.to_string();
        self
    }

    /// Overrides the relay configuration.
    pub fn config(mut self, config: RelayConfig) -> Self {
        self.config = config;
        self
    }

    /// Binds the listener and builds the server.
    pub async fn build(self) -> Result<RelayServer, RelayError> {
        let transport = WebSocketTransport::bind(&self.bind_addr).await?;

        let state = Arc::new(ServerState {
            relay: Mutex::new(Relay::new(self.config.clone())),
            config: self.config,
            codec: JsonCodec,
        });

        Ok(RelayServer { transport, state })
    }
}

impl Default for RelayServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A running relay server.
///
/// Call [`run()`](Self::run) to start accepting connections.
pub struct RelayServer {
    transport: WebSocketTransport,
    state: Arc<ServerState>,
}

impl RelayServer {
    /// Creates a new builder.
    pub fn builder() -> RelayServerBuilder {
        RelayServerBuilder::new()
    }

    /// Returns the local address the server is bound to.
    pub fn local_addr(&self) -> std::io::Result<std::net::SocketAddr> {
        self.transport.local_addr()
    }

    /// Runs the accept loop.
    ///
    /// Starts the idle-room reaper, then accepts incoming connections and
    /// spawns a handler task for each. Runs until the process terminates.
    pub async fn run(mut self) -> Result<(), RelayError> {
        reaper::spawn_idle_reaper(Arc::clone(&self.state));
        tracing::info!("Reelcast relay running");

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
