//! Wire message types: room codes, inbound commands, outbound events.

use std::fmt;
use std::str::FromStr;

use quizwire_engine::{Phase, Player, RoomSettings};
use serde::{Deserialize, Deserializer, Serialize};

// ---------------------------------------------------------------------------
// RoomCode
// ---------------------------------------------------------------------------

/// Smallest value of a room code (inclusive).
const MIN_CODE: u16 = 1000;
/// Largest value of a room code (inclusive).
const MAX_CODE: u16 = 9999;

/// Error returned when parsing a string that is not a valid room code.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("room code must be a 4-digit number")]
pub struct InvalidRoomCode;

/// A room's short join code: four decimal digits, `1000`–`9999`.
///
/// Codes are generated server-side only and are string-typed on the wire
/// so clients never treat them as arithmetic values. The newtype keeps a
/// `RoomCode` from being confused with any other number in the codebase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RoomCode(u16);

impl RoomCode {
    /// Smallest valid raw value (inclusive).
    pub const MIN: u16 = MIN_CODE;
    /// Largest valid raw value (inclusive).
    pub const MAX: u16 = MAX_CODE;

    /// Wraps a raw value, rejecting anything outside the 4-digit range.
    pub fn new(value: u16) -> Result<Self, InvalidRoomCode> {
        if (MIN_CODE..=MAX_CODE).contains(&value) {
            Ok(Self(value))
        } else {
            Err(InvalidRoomCode)
        }
    }

    /// The raw numeric value.
    pub fn into_inner(self) -> u16 {
        self.0
    }

    /// Number of distinct room codes.
    pub const SPACE: usize = (MAX_CODE - MIN_CODE + 1) as usize;
}

impl fmt::Display for RoomCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}", self.0)
    }
}

impl FromStr for RoomCode {
    type Err = InvalidRoomCode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() != 4 {
            return Err(InvalidRoomCode);
        }
        let value: u16 = s.parse().map_err(|_| InvalidRoomCode)?;
        Self::new(value)
    }
}

impl Serialize for RoomCode {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for RoomCode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

// ---------------------------------------------------------------------------
// RoomSnapshot
// ---------------------------------------------------------------------------

/// Roster and settings snapshot broadcast on every lobby change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomSnapshot {
    /// The room's join code.
    pub room_code: RoomCode,
    /// Username of the room's creator.
    pub owner: String,
    /// All players, in join order.
    pub players: Vec<Player>,
    /// Effective settings (question count reflects what the source
    /// actually delivered).
    pub settings: RoomSettings,
    /// The room's current phase.
    pub phase: Phase,
}

// ---------------------------------------------------------------------------
// ClientCommand
// ---------------------------------------------------------------------------

/// Commands a connected participant may send.
///
/// Internally tagged as `{ "type": "createRoom", ... }`, mirroring the
/// socket event names trivia clients emit. Required fields are enforced
/// here by serde before anything reaches a room's state machine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum ClientCommand {
    /// Create a room and become its owner. The room code is chosen by
    /// the server, never by the client.
    CreateRoom {
        username: String,
        settings: RoomSettings,
    },

    /// Join an existing room by code.
    JoinRoom {
        room_code: RoomCode,
        username: String,
    },

    /// Start the quiz. Owner-only; anyone else is silently ignored.
    StartQuiz {
        room_code: RoomCode,
        username: String,
    },

    /// Answer the currently open question.
    SubmitAnswer {
        room_code: RoomCode,
        username: String,
        answer: usize,
    },

    /// Relay a chat line to the room. Pure passthrough, no state change.
    ChatMessage {
        room_code: RoomCode,
        username: String,
        message: String,
    },
}

// ---------------------------------------------------------------------------
// ServerEvent
// ---------------------------------------------------------------------------

/// Events the server emits.
///
/// Most are broadcast to every member of a room; `roomCreated`,
/// `roomJoined`, and requester-scoped `error`s go only to the
/// connection whose command produced them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum ServerEvent {
    /// Ack for `createRoom`: the generated code and effective settings.
    RoomCreated {
        room_code: RoomCode,
        settings: RoomSettings,
    },

    /// Ack for `joinRoom`.
    RoomJoined {
        room_code: RoomCode,
        settings: RoomSettings,
    },

    /// Roster/settings snapshot, sent whenever the lobby changes.
    RoomUpdate { room: RoomSnapshot },

    /// A question is now open. The correct index is deliberately absent.
    QuizStarted {
        current_question_index: usize,
        current_question: String,
        current_options: Vec<String>,
        num_questions: usize,
        players: Vec<Player>,
        time_limit: u32,
    },

    /// One second elapsed on the open question's clock.
    Timer { seconds_left: u32 },

    /// A player answered; per-player answer snapshot for the room.
    AnswerSubmitted {
        player: String,
        players: Vec<Player>,
    },

    /// Chat relay, already formatted as `"username: text"`.
    ChatMessage { message: String },

    /// The question closed: correct answer plus current standings.
    QuestionFinished {
        correct_answer: usize,
        players: Vec<Player>,
    },

    /// The quiz is over; final standings.
    QuizFinished { final_scores: Vec<Player> },

    /// A command failed (requester-only) or the room hit a fatal
    /// condition such as an empty question set (broadcast).
    Error { message: String },
}
