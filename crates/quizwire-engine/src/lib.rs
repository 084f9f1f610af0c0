//! Synchronous quiz state machine for quizwire.
//!
//! This crate holds everything about a trivia round that does not need a
//! clock or a network: the roster, the question cursor, answer recording,
//! and scoring. Timing lives in `quizwire-room`, which drives this state
//! machine from a per-room actor task. Keeping the transitions synchronous
//! means every rule here is testable without a runtime.
//!
//! # Key types
//!
//! - [`QuizState`] — one room's quiz from lobby to final standings
//! - [`Phase`] — the lifecycle state machine (`Lobby → Question → Reveal →
//!   … → Finished`)
//! - [`Question`] / [`RoomSettings`] / [`Player`] — the data model

mod error;
mod player;
mod question;
mod quiz;
mod settings;

pub use error::{JoinError, StartError};
pub use player::{Answer, Player};
pub use question::Question;
pub use quiz::{Advanced, Phase, QuizState, Submission};
pub use settings::{
    RoomSettings, DEFAULT_MAX_PLAYERS, DEFAULT_NUM_QUESTIONS, DEFAULT_TIME_LIMIT,
    MAX_QUESTIONS,
};
