//! Codec trait and implementations for bridge frames.
//!
//! The connection task never looks at the bytes it moves: it hands every
//! [`BridgeCommand`](crate::BridgeCommand) to a [`Codec`] before writing a
//! frame, and every inbound frame to the same codec to get a
//! [`BridgeEvent`](crate::BridgeEvent) back. Swapping the wire format means
//! swapping the codec; the connector stays the same.

use serde::{Serialize, de::DeserializeOwned};

use crate::BridgeError;

/// Converts bridge messages to bytes and back.
///
/// ## Trait bounds
///
/// - `Send + Sync` → the codec is moved into the spawned connection task
///   and may be used from whichever worker thread runs it.
/// - `'static` → the codec owns everything it needs, so it can live as
///   long as that task does.
///
/// ## Generic methods
///
/// `encode<T: Serialize>` accepts anything serde can write, and
/// `decode<T: DeserializeOwned>` produces anything serde can read.
/// `DeserializeOwned` (rather than `Deserialize<'de>`) means the decoded
/// value does not borrow from the frame, so the frame buffer can be dropped
/// as soon as decoding returns.
pub trait Codec: Send + Sync + 'static {
    /// Serializes a value into bytes.
    ///
    /// # Errors
    /// Returns `BridgeError::Encode` if the value cannot be represented in
    /// this format.
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, BridgeError>;

    /// Deserializes bytes back into a value.
    ///
    /// # Errors
    /// Returns `BridgeError::Decode` if the bytes are malformed, truncated,
    /// or describe a different type. The connection task logs and skips
    /// such frames instead of ending the session.
    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, BridgeError>;
}

// ---------------------------------------------------------------------------
// JsonCodec
// ---------------------------------------------------------------------------

/// A [`Codec`] that uses JSON (via `serde_json`).
///
/// JSON keeps the bridge protocol readable: frames can be logged or typed by
/// hand when writing a bridge. Behind the `json` feature (on by default).
///
/// ```rust
/// use idlekeeper_bridge::{BridgeCommand, Codec, JsonCodec};
///
/// let codec = JsonCodec;
/// let bytes = codec.encode(&BridgeCommand::Chat { message: "hi".into() }).unwrap();
/// let decoded: BridgeCommand = codec.decode(&bytes).unwrap();
/// assert_eq!(decoded, BridgeCommand::Chat { message: "hi".into() });
/// ```
#[cfg(feature = "json")]
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

#[cfg(feature = "json")]
impl Codec for JsonCodec {
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, BridgeError> {
        serde_json::to_vec(value).map_err(BridgeError::Encode)
    }

    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, BridgeError> {
        serde_json::from_slice(data).map_err(BridgeError::Decode)
    }
}
