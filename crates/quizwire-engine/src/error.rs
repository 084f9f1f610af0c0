//! Error types for quiz state transitions.

/// Why a join attempt was rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum JoinError {
    /// The display name is already taken in this room.
    #[error("username {0:?} is already taken in this room")]
    UsernameTaken(String),

    /// The room is at its configured player limit.
    #[error("room is full ({0} players max)")]
    RoomFull(usize),

    /// The quiz has already started; joins are lobby-only.
    #[error("quiz already started")]
    QuizStarted,
}

/// Why a start attempt did not start the quiz.
///
/// `NotOwner` and `NotInLobby` are policy outcomes, not faults — the
/// caller is expected to drop them silently. `NoQuestions` is a hard
/// room-level failure that the whole room should hear about.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StartError {
    /// Someone other than the room owner asked to start.
    #[error("only the room owner may start the quiz")]
    NotOwner,

    /// The room is not in the lobby phase.
    #[error("quiz can only start from the lobby")]
    NotInLobby,

    /// The question source produced zero questions for this room.
    #[error("no questions available")]
    NoQuestions,
}
