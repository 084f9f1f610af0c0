//! Codec trait and the default JSON implementation.
//!
//! The gateway doesn't care how commands and events are serialized; it
//! works against the [`Codec`] trait. [`JsonCodec`] is the default since
//! browser clients speak JSON, but a binary codec can slot in without
//! touching the rest of the stack.

use serde::{de::DeserializeOwned, Serialize};

use crate::ProtocolError;

/// Encodes wire types to bytes and decodes bytes back.
pub trait Codec: Send + Sync + 'static {
    /// Serializes a value into bytes.
    ///
    /// # Errors
    /// Returns `ProtocolError::Encode` if serialization fails.
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError>;

    /// Deserializes bytes back into a value.
    ///
    /// # Errors
    /// Returns `ProtocolError::Decode` if the bytes are malformed or do
    /// not match the expected type.
    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, ProtocolError>;
}

/// A [`Codec`] backed by `serde_json`.
///
/// Behind the `json` feature flag (enabled by default).
#[cfg(feature = "json")]
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

#[cfg(feature = "json")]
impl Codec for JsonCodec {
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError> {
        serde_json::to_vec(value).map_err(ProtocolError::Encode)
    }

    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, ProtocolError> {
        serde_json::from_slice(data).map_err(ProtocolError::Decode)
    }
}

#[cfg(all(test, feature = "json"))]
mod tests {
    use super::*;
    use crate::{ClientCommand, RoomCode, ServerEvent};

    #[test]
    fn test_json_codec_round_trips_commands() {
        let codec = JsonCodec;
        let cmd = ClientCommand::StartQuiz {
            room_code: RoomCode::new(1234).unwrap(),
            username: "ada".into(),
        };
        let bytes = codec.encode(&cmd).unwrap();
        let back: ClientCommand = codec.decode(&bytes).unwrap();
        assert_eq!(cmd, back);
    }

    #[test]
    fn test_json_codec_round_trips_events() {
        let codec = JsonCodec;
        let event = ServerEvent::Timer { seconds_left: 12 };
        let bytes = codec.encode(&event).unwrap();
        let back: ServerEvent = codec.decode(&bytes).unwrap();
        assert_eq!(event, back);
    }

    #[test]
    fn test_json_codec_decode_garbage_fails() {
        let codec = JsonCodec;
        let result: Result<ClientCommand, _> = codec.decode(b"not json at all");
        assert!(matches!(result, Err(ProtocolError::Decode(_))));
    }
}
