//! Unified error type for the quizwire gateway.

use quizwire_protocol::ProtocolError;
use quizwire_room::RoomError;

/// Top-level error wrapping the failures a gateway can hit.
///
/// The `#[from]` attributes generate `From` impls so `?` converts
/// lower-layer errors automatically.
#[derive(Debug, thiserror::Error)]
pub enum QuizwireError {
    /// Binding or accepting a TCP connection failed.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// The WebSocket handshake or a frame-level operation failed.
    #[error("websocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),

    /// Encoding or decoding a wire message failed.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// A room-level failure (not found, full, code space exhausted).
    #[error(transparent)]
    Room(#[from] RoomError),
}
