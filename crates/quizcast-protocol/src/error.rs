//! Error types for the protocol layer.
//!
//! Each Quizcast crate defines its own error enum. This keeps errors
//! specific and meaningful — a `ProtocolError` always means something went
//! wrong turning messages into frames or back, never networking or room
//! state.

/// Errors that can occur in the protocol layer.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Serialization failed (turning a message into a text frame).
    #[cfg(feature = "json")]
    #[error("encode failed: {0}")]
    Encode(serde_json::Error),

    /// Deserialization failed (turning a text frame into a message).
    ///
    /// Common causes: malformed JSON, missing required fields, or an
    /// unknown `type` tag. The connection handler turns this into an
    /// `error` reply to the sender.
    #[cfg(feature = "json")]
    #[error("decode failed: {0}")]
    Decode(serde_json::Error),
}
