//! Codec trait and implementations for serializing/deserializing messages.
//!
//! A "codec" (coder/decoder) converts between Rust types and the payload
//! of one frame. Framing itself (the trailing newline) belongs to the
//! transport; the codec never sees it.

use serde::{de::DeserializeOwned, Serialize};

use crate::ProtocolError;

/// A codec that can encode Rust types to bytes and decode bytes back.
///
/// `Send + Sync + 'static` because one codec instance is shared by every
/// connection task for the lifetime of the server.
pub trait Codec: Send + Sync + 'static {
    /// Serializes a value into the payload of one frame.
    ///
    /// # Errors
    /// Returns `ProtocolError::Encode` if serialization fails.
    fn encode<T: Serialize>(
        &self,
        value: &T,
    ) -> Result<Vec<u8>, ProtocolError>;

    /// Deserializes one frame into a value.
    ///
    /// # Errors
    /// Returns `ProtocolError::Decode` if the bytes are malformed,
    /// incomplete, or don't match the expected type.
    fn decode<T: DeserializeOwned>(
        &self,
        data: &[u8],
    ) -> Result<T, ProtocolError>;

    /// Decodes a frame that may legitimately carry nothing.
    ///
    /// A blank frame, or one holding an explicit `null`, yields `Ok(None)`.
    /// Callers treat that as "nothing to do" and keep reading. Anything
    /// else must decode as `T` or the call fails.
    fn decode_frame<T: DeserializeOwned>(
        &self,
        data: &[u8],
    ) -> Result<Option<T>, ProtocolError> {
        if data.trim_ascii().is_empty() {
            return Ok(None);
        }
        self.decode::<Option<T>>(data)
    }
}

// ---------------------------------------------------------------------------
// JsonCodec
// ---------------------------------------------------------------------------

/// A [`Codec`] that uses JSON (via `serde_json`).
///
/// `serde_json` never emits a raw newline for compact output, so every
/// encoded value fits on a single line.
///
/// ## Example
///
/// ```rust
/// use gladius_protocol::{BattleStatus, Codec, JsonCodec};
///
/// let codec = JsonCodec;
/// let bytes = codec.encode(&BattleStatus::waiting()).unwrap();
/// assert_eq!(bytes, br#"{"game_ready":false,"your_turn":false}"#);
///
/// let decoded: BattleStatus = codec.decode(&bytes).unwrap();
/// assert_eq!(decoded, BattleStatus::waiting());
/// ```
#[cfg(feature = "json")]
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

#[cfg(feature = "json")]
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
