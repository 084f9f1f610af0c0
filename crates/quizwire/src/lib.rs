//! # quizwire
//!
//! WebSocket gateway for live multiplayer trivia rooms.
//!
//! Players join a room by its 4-digit code, the owner starts the quiz,
//! and everyone answers the same timed multiple-choice questions in
//! lock-step. Ties together the layers: gateway → protocol → room →
//! engine.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use quizwire::QuizServer;
//! # use quizwire_room::{QuestionSource, ScoreSink};
//! # async fn run<S: QuestionSource, K: ScoreSink>(source: S, sink: K) -> Result<(), quizwire::QuizwireError> {
//! let server = QuizServer::<S, K>::builder()
//!     .bind("0.0.0.0:5000")
//!     .build(source, sink)
//!     .await?;
//! server.run().await
//! # }
//! ```

mod error;
mod handler;
mod server;

pub use error::QuizwireError;
pub use server::{QuizServer, QuizServerBuilder};

/// Commonly used types, re-exported for server binaries.
pub mod prelude {
    pub use crate::{QuizServer, QuizServerBuilder, QuizwireError};
    pub use quizwire_protocol::{ClientCommand, RoomCode, ServerEvent};
    pub use quizwire_room::{QuestionSource, RoomRegistry, ScoreSink, SinkError, SourceError};
}
