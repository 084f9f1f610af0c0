//! Room actor: an isolated Tokio task that owns one quiz.
//!
//! Each room runs in its own task and is driven by two inputs only: its
//! command channel and its [`PhaseTimer`]. Both are served from one
//! `select!` loop, so every mutation of the quiz state is serialized —
//! the race-free scoring and the "no timer events after reveal" ordering
//! guarantee both fall out of this structure.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use quizwire_engine::{
    Advanced, JoinError, Phase, QuizState, Question, RoomSettings, StartError, Submission,
};
use quizwire_protocol::{RoomCode, RoomSnapshot, ServerEvent};
use tokio::sync::{mpsc, oneshot};

use crate::registry::RoomTable;
use crate::timer::{PhaseTimer, TimerEvent};
use crate::{RoomError, ScoreSink};

/// Channel sender for delivering outbound events to one player's
/// connection. Dropped senders (disconnected players) are silently
/// skipped on broadcast.
pub type EventSender = mpsc::UnboundedSender<ServerEvent>;

/// Commands sent to a room actor through its channel.
pub(crate) enum RoomCommand {
    /// Add a player to the roster (lobby only). The reply carries the
    /// room's effective settings for the join acknowledgement.
    Join {
        username: String,
        sender: EventSender,
        reply: oneshot::Sender<Result<RoomSettings, RoomError>>,
    },

    /// Start the quiz. No reply: a non-owner start is a silent no-op,
    /// and a no-questions failure is broadcast room-wide instead.
    Start { username: String },

    /// Record an answer to the open question.
    SubmitAnswer { username: String, choice: usize },

    /// Relay a chat line to all members.
    Chat { username: String, message: String },

    /// Request room metadata.
    Info { reply: oneshot::Sender<RoomInfo> },

    /// Tear the room down without finishing the quiz.
    Shutdown,
}

/// A snapshot of room metadata (not the quiz state itself).
#[derive(Debug, Clone)]
pub struct RoomInfo {
    /// The room's join code.
    pub room_code: RoomCode,
    /// Current phase.
    pub phase: Phase,
    /// Number of players in the roster.
    pub player_count: usize,
    /// Maximum players allowed.
    pub max_players: usize,
}

/// Handle to a running room actor. Cheap to clone — just an
/// `mpsc::Sender` wrapper. The registry holds one per live room.
#[derive(Clone)]
pub struct RoomHandle {
    room_code: RoomCode,
    sender: mpsc::Sender<RoomCommand>,
}

impl RoomHandle {
    /// The room's join code.
    pub fn room_code(&self) -> RoomCode {
        self.room_code
    }

    /// Sends a join request and waits for the verdict.
    pub async fn join(
        &self,
        username: impl Into<String>,
        sender: EventSender,
    ) -> Result<RoomSettings, RoomError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.sender
            .send(RoomCommand::Join {
                username: username.into(),
                sender,
                reply: reply_tx,
            })
            .await
            .map_err(|_| RoomError::Unavailable(self.room_code))?;
        reply_rx
            .await
            .map_err(|_| RoomError::Unavailable(self.room_code))?
    }

    /// Asks the room to start its quiz (fire-and-forget).
    pub async fn start(&self, username: impl Into<String>) -> Result<(), RoomError> {
        self.sender
            .send(RoomCommand::Start {
                username: username.into(),
            })
            .await
            .map_err(|_| RoomError::Unavailable(self.room_code))
    }

    /// Submits an answer for the open question (fire-and-forget).
    pub async fn submit_answer(
        &self,
        username: impl Into<String>,
        choice: usize,
    ) -> Result<(), RoomError> {
        self.sender
            .send(RoomCommand::SubmitAnswer {
                username: username.into(),
                choice,
            })
            .await
            .map_err(|_| RoomError::Unavailable(self.room_code))
    }

    /// Relays a chat line to the room (fire-and-forget).
    pub async fn chat(
        &self,
        username: impl Into<String>,
        message: impl Into<String>,
    ) -> Result<(), RoomError> {
        self.sender
            .send(RoomCommand::Chat {
                username: username.into(),
                message: message.into(),
            })
            .await
            .map_err(|_| RoomError::Unavailable(self.room_code))
    }

    /// Requests the room's current metadata.
    pub async fn info(&self) -> Result<RoomInfo, RoomError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.sender
            .send(RoomCommand::Info { reply: reply_tx })
            .await
            .map_err(|_| RoomError::Unavailable(self.room_code))?;
        reply_rx
            .await
            .map_err(|_| RoomError::Unavailable(self.room_code))
    }

    /// Tells the room to shut down without finishing.
    pub async fn shutdown(&self) -> Result<(), RoomError> {
        self.sender
            .send(RoomCommand::Shutdown)
            .await
            .map_err(|_| RoomError::Unavailable(self.room_code))
    }
}

/// The internal room actor. Runs inside its own Tokio task.
struct RoomActor<K: ScoreSink> {
    code: RoomCode,
    state: QuizState,
    /// Per-player outbound channels, keyed by username.
    senders: HashMap<String, EventSender>,
    timer: PhaseTimer,
    reveal_hold: Duration,
    sink: Arc<K>,
    /// Shared room table, for removing ourselves once finished.
    rooms: RoomTable,
    receiver: mpsc::Receiver<RoomCommand>,
    /// Our own command sender, kept so teardown only removes the table
    /// entry if the entry is still ours.
    cmd_tx: mpsc::Sender<RoomCommand>,
}

impl<K: ScoreSink> RoomActor<K> {
    /// Runs the actor loop until the quiz finishes or the room is shut
    /// down, then removes the room from the registry.
    async fn run(mut self) {
        tracing::info!(
            room = %self.code,
            owner = %self.state.owner(),
            domain = %self.state.settings().domain,
            questions = self.state.settings().num_questions,
            "room opened"
        );

        // Initial roster snapshot for the owner.
        self.broadcast(self.room_update());

        loop {
            tokio::select! {
                cmd = self.receiver.recv() => match cmd {
                    Some(cmd) => {
                        if self.handle_command(cmd) {
                            break;
                        }
                    }
                    // All handles dropped — registry is gone.
                    None => break,
                },
                event = self.timer.wait() => match event {
                    TimerEvent::Tick => self.handle_tick(),
                    TimerEvent::RevealElapsed => {
                        if self.handle_reveal_elapsed().await {
                            break;
                        }
                    }
                },
            }
        }

        // Only evict our own entry. The code may already belong to a
        // newer room if this one was shut down and the code re-drawn.
        let mut rooms = self.rooms.lock().await;
        if rooms
            .get(&self.code)
            .is_some_and(|entry| entry.sender.same_channel(&self.cmd_tx))
        {
            rooms.remove(&self.code);
        }
        drop(rooms);
        tracing::info!(room = %self.code, "room closed");
    }

    /// Processes one command. Returns `true` when the room should stop.
    fn handle_command(&mut self, cmd: RoomCommand) -> bool {
        match cmd {
            RoomCommand::Join {
                username,
                sender,
                reply,
            } => {
                let result = self.handle_join(username, sender);
                let _ = reply.send(result);
            }
            RoomCommand::Start { username } => self.handle_start(&username),
            RoomCommand::SubmitAnswer { username, choice } => {
                self.handle_submit(&username, choice);
            }
            RoomCommand::Chat { username, message } => {
                self.broadcast(ServerEvent::ChatMessage {
                    message: format!("{username}: {message}"),
                });
            }
            RoomCommand::Info { reply } => {
                let _ = reply.send(self.info());
            }
            RoomCommand::Shutdown => {
                tracing::info!(room = %self.code, "room shutting down");
                return true;
            }
        }
        false
    }

    fn handle_join(
        &mut self,
        username: String,
        sender: EventSender,
    ) -> Result<RoomSettings, RoomError> {
        match self.state.join(username.clone()) {
            Ok(()) => {
                self.senders.insert(username.clone(), sender);
                tracing::info!(
                    room = %self.code,
                    player = %username,
                    players = self.state.players().len(),
                    "player joined"
                );
                self.broadcast(self.room_update());
                Ok(self.state.settings().clone())
            }
            Err(JoinError::UsernameTaken(name)) => Err(RoomError::UsernameTaken(name)),
            Err(JoinError::RoomFull(max_players)) => Err(RoomError::RoomFull {
                code: self.code,
                max_players,
            }),
            Err(JoinError::QuizStarted) => Err(RoomError::QuizInProgress(self.code)),
        }
    }

    fn handle_start(&mut self, username: &str) {
        match self.state.start(username) {
            Ok(()) => {
                tracing::info!(room = %self.code, "quiz started");
                self.broadcast_open_question();
                self.timer.arm_countdown();
            }
            Err(StartError::NotOwner | StartError::NotInLobby) => {
                // Matches the reference behavior: no feedback at all.
                tracing::debug!(
                    room = %self.code,
                    requester = %username,
                    "ignoring start request"
                );
            }
            Err(StartError::NoQuestions) => {
                let err =
                    RoomError::NoQuestionsAvailable(self.state.settings().domain.clone());
                tracing::warn!(room = %self.code, %err, "start refused");
                self.broadcast(ServerEvent::Error {
                    message: err.to_string(),
                });
            }
        }
    }

    fn handle_submit(&mut self, username: &str, choice: usize) {
        match self.state.submit_answer(username, choice) {
            Submission::Recorded {
                awarded,
                all_answered,
            } => {
                tracing::debug!(
                    room = %self.code,
                    player = %username,
                    choice,
                    awarded,
                    "answer recorded"
                );
                self.broadcast(ServerEvent::AnswerSubmitted {
                    player: username.to_string(),
                    players: self.state.players().to_vec(),
                });
                if all_answered {
                    // Everyone answered — don't wait for the clock.
                    self.finish_question();
                }
            }
            Submission::Ignored => {
                tracing::debug!(
                    room = %self.code,
                    player = %username,
                    "ignoring answer submission"
                );
            }
        }
    }

    fn handle_tick(&mut self) {
        let seconds_left = self.state.tick();
        self.broadcast(ServerEvent::Timer { seconds_left });
        if seconds_left == 0 {
            self.finish_question();
        }
    }

    /// Closes the open question: cancel the countdown *before* anything
    /// else, then broadcast the reveal and arm the hold.
    fn finish_question(&mut self) {
        self.timer.cancel();
        let correct_answer = self.state.close_question();
        self.broadcast(ServerEvent::QuestionFinished {
            correct_answer,
            players: self.state.players().to_vec(),
        });
        self.timer.arm_reveal(self.reveal_hold);
    }

    /// Reveal hold is over. Returns `true` when the quiz finished.
    async fn handle_reveal_elapsed(&mut self) -> bool {
        match self.state.advance() {
            Advanced::NextQuestion => {
                self.broadcast_open_question();
                self.timer.arm_countdown();
                false
            }
            Advanced::Finished => {
                tracing::info!(room = %self.code, "quiz finished");
                self.broadcast(ServerEvent::QuizFinished {
                    final_scores: self.state.players().to_vec(),
                });
                self.persist_scores().await;
                true
            }
        }
    }

    /// Persists each player's final score. Best-effort: a sink failure
    /// is logged and the remaining players are still attempted.
    async fn persist_scores(&self) {
        let domain = &self.state.settings().domain;
        for player in self.state.players() {
            if let Err(err) = self
                .sink
                .persist(&player.username, player.score, domain)
                .await
            {
                tracing::error!(
                    room = %self.code,
                    player = %player.username,
                    %err,
                    "failed to persist score"
                );
            }
        }
    }

    /// Broadcasts the current question to the room.
    fn broadcast_open_question(&self) {
        let Some(question) = self.state.current_question() else {
            return;
        };
        self.broadcast(ServerEvent::QuizStarted {
            current_question_index: self.state.current_index(),
            current_question: question.text.clone(),
            current_options: question.options.clone(),
            num_questions: self.state.settings().num_questions,
            players: self.state.players().to_vec(),
            time_limit: self.state.settings().time_limit,
        });
    }

    fn room_update(&self) -> ServerEvent {
        ServerEvent::RoomUpdate {
            room: RoomSnapshot {
                room_code: self.code,
                owner: self.state.owner().to_string(),
                players: self.state.players().to_vec(),
                settings: self.state.settings().clone(),
                phase: self.state.phase(),
            },
        }
    }

    /// Sends an event to every member. Closed channels (disconnected
    /// players) are skipped silently.
    fn broadcast(&self, event: ServerEvent) {
        for sender in self.senders.values() {
            let _ = sender.send(event.clone());
        }
    }

    fn info(&self) -> RoomInfo {
        RoomInfo {
            room_code: self.code,
            phase: self.state.phase(),
            player_count: self.state.players().len(),
            max_players: self.state.settings().max_players,
        }
    }
}

/// Spawns a room actor task and returns a handle to it.
///
/// The owner is seeded into the roster with their event channel already
/// registered, matching the creation flow where the creator is the first
/// member.
#[allow(clippy::too_many_arguments)]
pub(crate) fn spawn_room<K: ScoreSink>(
    code: RoomCode,
    owner: String,
    owner_sender: EventSender,
    settings: RoomSettings,
    questions: Vec<Question>,
    reveal_hold: Duration,
    sink: Arc<K>,
    rooms: RoomTable,
    channel_size: usize,
) -> RoomHandle {
    let (tx, rx) = mpsc::channel(channel_size);

    let mut senders = HashMap::new();
    senders.insert(owner.clone(), owner_sender);

    let actor = RoomActor {
        code,
        state: QuizState::new(owner, settings, questions),
        senders,
        timer: PhaseTimer::idle(),
        reveal_hold,
        sink,
        rooms,
        receiver: rx,
        cmd_tx: tx.clone(),
    };

    tokio::spawn(actor.run());

    RoomHandle {
        room_code: code,
        sender: tx,
    }
}
