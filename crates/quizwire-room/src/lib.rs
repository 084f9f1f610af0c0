//! Room lifecycle management for quizwire.
//!
//! Each room runs as an isolated Tokio task (actor model) owning one
//! [`QuizState`](quizwire_engine::QuizState), its event timers, and the
//! outbound channels of its members. All mutations to a room's state flow
//! through its command channel, so no two commands for the same room are
//! ever processed concurrently — while distinct rooms run fully in
//! parallel.
//!
//! # Key types
//!
//! - [`RoomRegistry`] — creates rooms, generates join codes, resolves
//!   codes to live rooms, removes finished rooms
//! - [`RoomHandle`] — send commands to a running room actor
//! - [`QuestionSource`] / [`ScoreSink`] — the two capabilities the core
//!   needs from the outside world
//! - [`PhaseTimer`] — the per-room countdown/reveal scheduler

#![allow(async_fn_in_trait)]

mod error;
mod registry;
mod room;
mod source;
mod timer;

pub use error::RoomError;
pub use registry::{RoomRegistry, REVEAL_HOLD};
pub use room::{EventSender, RoomHandle, RoomInfo};
pub use source::{QuestionSource, ScoreSink, SinkError, SourceError};
pub use timer::{PhaseTimer, TimerEvent};
