//! The room registry: owns the code-to-room table and the shared
//! question source / score sink, and spawns one actor task per room.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use quizwire_engine::RoomSettings;
use quizwire_protocol::RoomCode;
use rand::Rng;
use tokio::sync::Mutex;

use crate::room::{spawn_room, EventSender, RoomHandle, RoomInfo};
use crate::{QuestionSource, RoomError, ScoreSink};

/// How long the correct answer stays on screen before the next question
/// opens (or the final standings go out).
pub const REVEAL_HOLD: Duration = Duration::from_secs(3);

/// Command channel capacity per room.
const ROOM_CHANNEL_SIZE: usize = 64;

/// Attempts at drawing an unused room code before giving up. The code
/// space holds 9000 rooms; anywhere near that many live rooms and the
/// registry is the least of our problems.
const CODE_ATTEMPTS: usize = 32;

/// Shared code-to-handle table. Room actors hold a clone so a finished
/// room can remove itself.
pub(crate) type RoomTable = Arc<Mutex<HashMap<RoomCode, RoomHandle>>>;

/// Registry of live rooms.
///
/// Clones share the same table, source and sink, so one registry can be
/// handed to every connection handler.
pub struct RoomRegistry<S, K> {
    rooms: RoomTable,
    source: Arc<S>,
    sink: Arc<K>,
    reveal_hold: Duration,
}

impl<S, K> Clone for RoomRegistry<S, K> {
    fn clone(&self) -> Self {
        Self {
            rooms: Arc::clone(&self.rooms),
            source: Arc::clone(&self.source),
            sink: Arc::clone(&self.sink),
            reveal_hold: self.reveal_hold,
        }
    }
}

impl<S, K> RoomRegistry<S, K>
where
    S: QuestionSource,
    K: ScoreSink,
{
    /// Creates a registry with the default 3-second reveal hold.
    pub fn new(source: S, sink: K) -> Self {
        Self::with_reveal_hold(source, sink, REVEAL_HOLD)
    }

    /// Creates a registry with a custom reveal hold. Mainly useful for
    /// tests that want a fast question cadence.
    pub fn with_reveal_hold(source: S, sink: K, reveal_hold: Duration) -> Self {
        Self {
            rooms: Arc::new(Mutex::new(HashMap::new())),
            source: Arc::new(source),
            sink: Arc::new(sink),
            reveal_hold,
        }
    }

    /// Creates a room: fetches questions for the requested domain,
    /// draws an unused 4-digit code, and spawns the room actor with the
    /// owner already seated.
    ///
    /// Returns the code together with the effective settings (defaults
    /// applied, question count clamped to what the source delivered).
    pub async fn create_room(
        &self,
        owner: impl Into<String>,
        owner_sender: EventSender,
        settings: RoomSettings,
    ) -> Result<(RoomCode, RoomSettings), RoomError> {
        let mut settings = settings.normalized();
        let owner = owner.into();

        // Fetch outside the table lock; a slow source must not stall
        // every other room operation.
        let questions = self
            .source
            .fetch(&settings.domain, settings.num_questions)
            .await?;
        // The source may have delivered fewer questions than asked for,
        // possibly none. An empty room still opens its lobby; the start
        // attempt is what reports the shortfall to everyone in it.
        settings.num_questions = settings.num_questions.min(questions.len());
        if questions.is_empty() {
            tracing::warn!(domain = %settings.domain, "source returned no questions");
        }

        let mut rooms = self.rooms.lock().await;
        let code = Self::draw_code(&rooms)?;
        let handle = spawn_room(
            code,
            owner,
            owner_sender,
            settings.clone(),
            questions,
            self.reveal_hold,
            Arc::clone(&self.sink),
            Arc::clone(&self.rooms),
            ROOM_CHANNEL_SIZE,
        );
        rooms.insert(code, handle);
        Ok((code, settings))
    }

    /// Joins `username` to the room identified by `code`.
    pub async fn join_room(
        &self,
        code: RoomCode,
        username: impl Into<String>,
        sender: EventSender,
    ) -> Result<RoomSettings, RoomError> {
        self.handle(code).await?.join(username, sender).await
    }

    /// Asks a room to start its quiz.
    pub async fn start_quiz(
        &self,
        code: RoomCode,
        username: impl Into<String>,
    ) -> Result<(), RoomError> {
        self.handle(code).await?.start(username).await
    }

    /// Submits an answer to a room's open question.
    pub async fn submit_answer(
        &self,
        code: RoomCode,
        username: impl Into<String>,
        choice: usize,
    ) -> Result<(), RoomError> {
        self.handle(code).await?.submit_answer(username, choice).await
    }

    /// Relays a chat line to a room.
    pub async fn chat(
        &self,
        code: RoomCode,
        username: impl Into<String>,
        message: impl Into<String>,
    ) -> Result<(), RoomError> {
        self.handle(code).await?.chat(username, message).await
    }

    /// Returns metadata for a room.
    pub async fn room_info(&self, code: RoomCode) -> Result<RoomInfo, RoomError> {
        self.handle(code).await?.info().await
    }

    /// Shuts a room down.
    ///
    /// The table entry is not touched here: it stays until the actor
    /// processes the shutdown and retires itself. Removing it eagerly
    /// would open a window where `create_room` re-draws the code for a
    /// fresh room that the old actor's teardown then evicts.
    pub async fn remove_room(&self, code: RoomCode) -> Result<(), RoomError> {
        self.handle(code).await?.shutdown().await
    }

    /// Number of live rooms.
    pub async fn room_count(&self) -> usize {
        self.rooms.lock().await.len()
    }

    async fn handle(&self, code: RoomCode) -> Result<RoomHandle, RoomError> {
        self.rooms
            .lock()
            .await
            .get(&code)
            .cloned()
            .ok_or(RoomError::RoomNotFound(code))
    }

    /// Draws a random unused 4-digit code.
    fn draw_code(rooms: &HashMap<RoomCode, RoomHandle>) -> Result<RoomCode, RoomError> {
        let mut rng = rand::rng();
        for _ in 0..CODE_ATTEMPTS {
            let raw = rng.random_range(RoomCode::MIN..=RoomCode::MAX);
            if let Ok(code) = RoomCode::new(raw) {
                if !rooms.contains_key(&code) {
                    return Ok(code);
                }
            }
        }
        Err(RoomError::CodesExhausted)
    }
}
