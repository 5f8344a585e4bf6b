//! Error types for the bridge client.

use tokio_tungstenite::tungstenite;

/// Errors raised while talking to the protocol bridge.
///
/// None of these escape to the supervisor as `Err` values: the connection
/// task reports them as a session `Error` event followed by `End`.
#[derive(Debug, thiserror::Error)]
pub enum BridgeError {
    /// The WebSocket handshake with the bridge failed.
    #[error("could not reach bridge at {url}: {source}")]
    Connect {
        url: String,
        #[source]
        source: tungstenite::Error,
    },

    /// The bridge did not answer the WebSocket handshake in time.
    #[error("timed out connecting to bridge at {0}")]
    ConnectTimeout(String),

    /// Writing a frame failed.
    #[error("send failed: {0}")]
    Send(#[source] tungstenite::Error),

    /// Reading a frame failed.
    #[error("receive failed: {0}")]
    Receive(#[source] tungstenite::Error),

    /// Serializing a command failed.
    #[cfg(feature = "json")]
    #[error("encode failed: {0}")]
    Encode(serde_json::Error),

    /// A frame from the bridge could not be parsed.
    #[cfg(feature = "json")]
    #[error("decode failed: {0}")]
    Decode(serde_json::Error),
}
