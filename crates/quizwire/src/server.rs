//! `QuizServer` builder and accept loop.
//!
//! The entry point for running a trivia server: bind a listener, wire a
//! question source and a score sink into a room registry, then spawn one
//! handler task per accepted WebSocket connection.

use std::time::Duration;

use quizwire_room::{QuestionSource, RoomRegistry, ScoreSink, REVEAL_HOLD};
use tokio::net::TcpListener;

use crate::handler::handle_connection;
use crate::QuizwireError;

/// Builder for configuring and starting a [`QuizServer`].
///
/// # Example
///
/// ```rust,ignore
/// let server = QuizServer::builder()
///     .bind("0.0.0.0:5000")
///     .build(my_source, my_sink)
///     .await?;
/// server.run().await
/// ```
pub struct QuizServerBuilder {
    bind_addr: String,
    reveal_hold: Duration,
}

impl QuizServerBuilder {
    /// Creates a builder with default settings.
    pub fn new() -> Self {
        Self {
            bind_addr: "127.0.0.1:5000".to_string(),
            reveal_hold: REVEAL_HOLD,
        }
    }

    /// Sets the address to bind the server to.
    pub fn bind(mut self, addr: &str) -> Self {
        self.bind_addr = addr.to_string();
        self
    }

    /// Overrides how long the correct answer stays on screen between
    /// questions. Mainly useful for tests.
    pub fn reveal_hold(mut self, hold: Duration) -> Self {
        self.reveal_hold = hold;
        self
    }

    /// Binds the listener and assembles the server.
    pub async fn build<S, K>(
        self,
        source: S,
        sink: K,
    ) -> Result<QuizServer<S, K>, QuizwireError>
    where
        S: QuestionSource,
        K: ScoreSink,
    {
        let listener = TcpListener::bind(&self.bind_addr).await?;
        tracing::info!(addr = %self.bind_addr, "quizwire listening");

        Ok(QuizServer {
            listener,
            registry: RoomRegistry::with_reveal_hold(source, sink, self.reveal_hold),
        })
    }
}

impl Default for QuizServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A running trivia server.
///
/// Call [`run()`](Self::run) to start accepting connections.
pub struct QuizServer<S, K> {
    listener: TcpListener,
    registry: RoomRegistry<S, K>,
}

impl<S, K> QuizServer<S, K>
where
    S: QuestionSource,
    K: ScoreSink,
{
    /// Creates a new builder.
    pub fn builder() -> QuizServerBuilder {
        QuizServerBuilder::new()
    }

    /// Returns the local address the server is bound to.
    pub fn local_addr(&self) -> std::io::Result<std::net::SocketAddr> {
        self.listener.local_addr()
    }

    /// Runs the accept loop until the process is terminated.
    ///
    /// Each accepted connection gets its own handler task; a failed
    /// WebSocket handshake only costs that one connection.
    pub async fn run(self) -> Result<(), QuizwireError> {
        loop {
            match self.listener.accept().await {
                Ok((stream, addr)) => {
                    let registry = self.registry.clone();
                    tokio::spawn(async move {
                        let ws = match tokio_tungstenite::accept_async(stream).await {
                            Ok(ws) => ws,
                            Err(e) => {
                                tracing::debug!(%addr, error = %e, "websocket handshake failed");
                                return;
                            }
                        };
                        tracing::debug!(%addr, "accepted connection");
                        if let Err(e) = handle_connection(ws, registry).await {
                            tracing::debug!(%addr, error = %e, "connection ended with error");
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
