//! Room settings and quiz-wide constants.

use serde::{Deserialize, Serialize};

/// Seconds per question when the creator does not specify a limit.
pub const DEFAULT_TIME_LIMIT: u32 = 20;

/// Questions per quiz when the creator does not specify a count.
pub const DEFAULT_NUM_QUESTIONS: usize = 10;

/// Hard cap on questions per quiz, regardless of the requested count.
pub const MAX_QUESTIONS: usize = 50;

/// Player slots per room when the creator does not specify a maximum.
pub const DEFAULT_MAX_PLAYERS: usize = 8;

// ---------------------------------------------------------------------------
// RoomSettings
// ---------------------------------------------------------------------------

/// Per-room quiz settings, fixed at creation time.
///
/// `num_questions` starts as the *requested* count; once the question
/// source has answered, [`QuizState::new`](crate::QuizState::new) clamps
/// it to the number of questions actually obtained, so scoring and
/// progress displays never reference questions that don't exist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomSettings {
    /// Question domain, e.g. "Quant", "Verbal", or "Mixed".
    pub domain: String,
    /// Seconds allowed per question.
    pub time_limit: u32,
    /// Number of questions in the quiz.
    pub num_questions: usize,
    /// Maximum players allowed in the room.
    pub max_players: usize,
}

impl RoomSettings {
    /// Replaces zero/overflowing values with usable ones.
    ///
    /// A `time_limit` of 0 falls back to [`DEFAULT_TIME_LIMIT`] (a quiz
    /// with no time to answer is meaningless), `num_questions` is capped
    /// at [`MAX_QUESTIONS`], and a `max_players` of 0 falls back to
    /// [`DEFAULT_MAX_PLAYERS`].
    #[must_use]
    pub fn normalized(mut self) -> Self {
        if self.time_limit == 0 {
            self.time_limit = DEFAULT_TIME_LIMIT;
        }
        if self.num_questions > MAX_QUESTIONS {
            self.num_questions = MAX_QUESTIONS;
        }
        if self.max_players == 0 {
            self.max_players = DEFAULT_MAX_PLAYERS;
        }
        self
    }
}

impl Default for RoomSettings {
    fn default() -> Self {
        Self {
            domain: "Mixed".to_string(),
            time_limit: DEFAULT_TIME_LIMIT,
            num_questions: DEFAULT_NUM_QUESTIONS,
            max_players: DEFAULT_MAX_PLAYERS,
        }
    }
}
