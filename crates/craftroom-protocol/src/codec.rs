//! Serialization codecs.
//!
//! The gateway only ever talks to a [`Codec`], so another format can be
//! slotted in without touching the connection handler.

use serde::{Serialize, de::DeserializeOwned};

use crate::ProtocolError;

/// Converts messages to and from frame bytes.
///
/// `Send + Sync + 'static` so one codec can be shared by every connection
/// task.
pub trait Codec: Send + Sync + 'static {
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError>;

    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, ProtocolError>;

    /// Whether encoded frames are UTF-8 and should go out as text frames.
    fn is_text(&self) -> bool {
        false
    }
}

/// JSON via `serde_json`, sent as text frames.
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

    fn is_text(&self) -> bool {
        true
    }
}

#[cfg(all(test, feature = "json"))]
mod tests {
    use super::*;
    use crate::{ClientMessage, ServerMessage};

    #[test]
    fn test_json_codec_decodes_client_frame() {
        let codec = JsonCodec;
        let msg: ClientMessage = codec.decode(br#"{"event":"request-map"}"#).unwrap();
        assert_eq!(msg, ClientMessage::RequestMap);
    }

    #[test]
    fn test_json_codec_rejects_garbage() {
        let codec = JsonCodec;
        let result: Result<ClientMessage, _> = codec.decode(b"not json");
        assert!(matches!(result, Err(ProtocolError::Decode(_))));
    }

    #[test]
    fn test_json_codec_encodes_text() {
        let codec = JsonCodec;
        let bytes = codec
            .encode(&ServerMessage::RoomError {
                message: "nope".into(),
            })
            .unwrap();
        assert!(codec.is_text());
        assert_eq!(
            String::from_utf8(bytes).unwrap(),
            r#"{"event":"room-error","data":{"message":"nope"}}"#
        );
    }
}
