//! Codec trait and implementations for serializing/deserializing events.
//!
//! The relay doesn't care HOW events are serialized — it just needs
//! something that implements the [`Codec`] trait. [`JsonCodec`] is the
//! only implementation today: the reference clients are browser JavaScript,
//! so human-readable JSON in text frames is the natural wire format.

use serde::{de::DeserializeOwned, Serialize};

use crate::ProtocolError;

/// A codec that can encode Rust types to bytes and decode bytes back.
///
/// `Send + Sync + 'static` because the codec is shared across connection
/// handler tasks for the lifetime of the server.
pub trait Codec: Send + Sync + 'static {
    /// Serializes a value into bytes.
    ///
    /// # Errors
    /// Returns [`ProtocolError::Encode`] if serialization fails.
    fn encode<T: Serialize>(
        &self,
        value: &T,
    ) -> Result<Vec<u8>, ProtocolError>;

    /// Deserializes bytes back into a value.
    ///
    /// # Errors
    /// Returns [`ProtocolError::Decode`] if the bytes are malformed,
    /// incomplete, or don't match the expected type.
    fn decode<T: DeserializeOwned>(
        &self,
        data: &[u8],
    ) -> Result<T, ProtocolError>;
}

// ---------------------------------------------------------------------------
// JsonCodec
// ---------------------------------------------------------------------------

/// A [`Codec`] that uses JSON (via `serde_json`).
///
/// ## Example
///
/// ```rust
/// use reelcast_protocol::{ClientEvent, Codec, JsonCodec};
///
/// let codec = JsonCodec;
/// let event = ClientEvent::SendChatMessage {
///     message: "anything biting?".into(),
/// };
///
/// let bytes = codec.encode(&event).unwrap();
/// let decoded: ClientEvent = codec.decode(&bytes).unwrap();
/// assert_eq!(event, decoded);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

impl Codec for JsonCodec {
    fn encode<T: Serialize>(
        &self,
        value: &T,
    ) -> Result<Vec<u8>, ProtocolError> {
        serde_json::to_vec(value).map_err(ProtocolError::Encode)
    }

    fn decode<T: DeserializeOwned>(
        &self,
        data: &[u8],
    ) -> Result<T, ProtocolError> {
        serde_json::from_slice(data).map_err(ProtocolError::Decode)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ClientEvent, RoomId, ServerEvent};

    #[test]
    fn test_json_codec_round_trips_client_event() {
        let codec = JsonCodec;
        let event = ClientEvent::JoinRoom {
            room_id: RoomId::new("DOCK42"),
            player_name: "Bob".into(),
        };
        let bytes = codec.encode(&event).unwrap();
        let decoded: ClientEvent = codec.decode(&bytes).unwrap();
        assert_eq!(event, decoded);
    }

    #[test]
    fn test_json_codec_round_trips_server_event() {
        let codec = JsonCodec;
        let event = ServerEvent::RoomFull;
        let bytes = codec.encode(&event).unwrap();
        let decoded: ServerEvent = codec.decode(&bytes).unwrap();
        assert_eq!(event, decoded);
    }

    #[test]
    fn test_json_codec_decode_rejects_garbage() {
        let codec = JsonCodec;
        let result: Result<ClientEvent, _> = codec.decode(b"{{{{");
        assert!(result.is_err());
    }
}
