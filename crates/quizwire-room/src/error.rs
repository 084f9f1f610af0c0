//! Error types for the room layer.

use quizwire_protocol::RoomCode;

use crate::source::SourceError;

/// Errors that can occur during room operations.
///
/// Single-command validation failures are reported only to the
/// originating requester; `NoQuestionsAvailable` is the one room-wide
/// failure, broadcast to every member because the quiz cannot proceed.
/// A non-owner's start attempt is deliberately *not* here — that is a
/// silent no-op, not an error.
#[derive(Debug, thiserror::Error)]
pub enum RoomError {
    /// The referenced room code does not resolve to a live room.
    #[error("room {0} not found")]
    RoomNotFound(RoomCode),

    /// The display name is already taken in that room.
    #[error("username {0:?} is already taken in this room")]
    UsernameTaken(String),

    /// The room is at its configured player limit.
    #[error("room {code} is full ({max_players} players max)")]
    RoomFull {
        code: RoomCode,
        max_players: usize,
    },

    /// The quiz has already started; joins are lobby-only.
    #[error("quiz in room {0} has already started")]
    QuizInProgress(RoomCode),

    /// The question source produced zero questions for the room's domain.
    #[error("no questions available for domain {0:?}")]
    NoQuestionsAvailable(String),

    /// Code generation gave up after its bounded number of attempts.
    #[error("room code space exhausted")]
    CodesExhausted,

    /// Fetching questions at room creation failed outright.
    #[error(transparent)]
    QuestionSource(#[from] SourceError),

    /// The room's command channel is closed (room shutting down).
    #[error("room {0} is unavailable")]
    Unavailable(RoomCode),
}
