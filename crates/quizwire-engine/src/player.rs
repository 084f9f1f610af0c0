//! Player records, scoped to a single room.

use std::fmt;

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

// ---------------------------------------------------------------------------
// Answer
// ---------------------------------------------------------------------------

/// A player's answer state for the current question.
///
/// `TimedOut` is the recorded sentinel for a player who never answered
/// before the clock ran out — distinct from `Unanswered`, which means the
/// question is still open for them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Answer {
    /// No submission yet for the current question.
    #[default]
    Unanswered,
    /// The timer expired before this player submitted.
    TimedOut,
    /// The player picked this option index.
    Choice(usize),
}

impl Answer {
    /// Whether a submission (or the timeout sentinel) has been recorded.
    pub fn is_recorded(&self) -> bool {
        !matches!(self, Self::Unanswered)
    }
}

impl fmt::Display for Answer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unanswered => write!(f, "unanswered"),
            Self::TimedOut => write!(f, "timed out"),
            Self::Choice(i) => write!(f, "option {i}"),
        }
    }
}

/// On the wire an answer is `null` (unanswered), `-1` (timed out), or the
/// chosen option index — the shape trivia clients already expect.
impl Serialize for Answer {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Unanswered => serializer.serialize_none(),
            Self::TimedOut => serializer.serialize_i64(-1),
            Self::Choice(i) => serializer.serialize_u64(*i as u64),
        }
    }
}

impl<'de> Deserialize<'de> for Answer {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match Option::<i64>::deserialize(deserializer)? {
            None => Ok(Self::Unanswered),
            Some(-1) => Ok(Self::TimedOut),
            Some(n) if n >= 0 => Ok(Self::Choice(n as usize)),
            Some(n) => Err(de::Error::custom(format!("invalid answer value {n}"))),
        }
    }
}

// ---------------------------------------------------------------------------
// Player
// ---------------------------------------------------------------------------

/// One player inside one room.
///
/// Roster order is join order. `score` only ever grows; `answer` and
/// `answer_time_left` are reset at the start of every question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Player {
    /// Display name, unique within the room, immutable after join.
    pub username: String,
    /// Accumulated score across the quiz.
    pub score: u32,
    /// Answer state for the current question.
    #[serde(default)]
    pub answer: Answer,
    /// Seconds left on the clock at the moment of answering. Captured
    /// once per question, used for the time bonus only.
    #[serde(default, rename = "answerTime")]
    pub answer_time_left: u32,
}

impl Player {
    pub(crate) fn new(username: String) -> Self {
        Self {
            username,
            score: 0,
            answer: Answer::Unanswered,
            answer_time_left: 0,
        }
    }

    /// Clears per-question state ahead of the next question.
    pub(crate) fn reset_answer(&mut self) {
        self.answer = Answer::Unanswered;
        self.answer_time_left = 0;
    }
}
