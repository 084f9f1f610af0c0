//! Wire protocol for quizwire.
//!
//! Defines the language spoken between trivia clients and the server:
//!
//! - **Types** ([`ClientCommand`], [`ServerEvent`], [`RoomCode`],
//!   [`RoomSnapshot`]) — every message that travels on the wire.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]) — how messages become
//!   bytes and back.
//! - **Errors** ([`ProtocolError`]) — what can go wrong at this layer.
//!
//! The protocol layer knows nothing about connections, timers, or rooms'
//! internal state; it only shapes and validates messages. Field and tag
//! names are camelCase on the wire, matching what browser trivia clients
//! expect.

mod codec;
mod error;
mod types;

pub use codec::Codec;
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use error::ProtocolError;
pub use types::{ClientCommand, InvalidRoomCode, RoomCode, RoomSnapshot, ServerEvent};
