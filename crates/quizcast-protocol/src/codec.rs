//! Codec trait and implementations for serializing/deserializing messages.
//!
//! A "codec" (coder/decoder) converts between Rust message types and the
//! text frames that travel on a connection. The protocol layer doesn't care
//! HOW messages are serialized — it just needs something implementing the
//! [`Codec`] trait, so the format can be swapped without touching the
//! routing code.
//!
//! Quizcast speaks JSON text frames (the browser clients call
//! `JSON.parse` on incoming frames), so [`JsonCodec`] is the default and,
//! today, only implementation.

use serde::{de::DeserializeOwned, Serialize};

use crate::ProtocolError;

/// Encodes Rust types to text frames and decodes frames back.
///
/// `Send + Sync + 'static` because a single codec instance is shared by
/// every connection handler task for the lifetime of the server.
///
/// `decode` takes `&str` rather than bytes: the transport hands us whole
/// text frames, and `DeserializeOwned` guarantees the result doesn't borrow
/// from the frame, so the frame buffer can be dropped immediately.
pub trait Codec: Send + Sync + 'static {
    /// Serializes a message into one text frame.
    ///
    /// # Errors
    /// Returns [`ProtocolError::Encode`] if serialization fails.
    fn encode<T: Serialize>(&self, value: &T) -> Result<String, ProtocolError>;

    /// Deserializes one text frame back into a message.
    ///
    /// # Errors
    /// Returns [`ProtocolError::Decode`] if the frame is malformed,
    /// incomplete, or carries an unknown `type` tag.
    fn decode<T: DeserializeOwned>(&self, frame: &str) -> Result<T, ProtocolError>;
}

// ---------------------------------------------------------------------------
// JsonCodec
// ---------------------------------------------------------------------------

/// A [`Codec`] that uses JSON (via `serde_json`).
///
/// Human-readable on the wire — messages can be inspected in browser
/// DevTools and pasted straight into tests. Behind the `json` feature flag
/// (enabled by default).
#[cfg(feature = "json")]
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

#[cfg(feature = "json")]
impl Codec for JsonCodec {
    fn encode<T: Serialize>(&self, value: &T) -> Result<String, ProtocolError> {
        serde_json::to_string(value).map_err(ProtocolError::Encode)
    }

    fn decode<T: DeserializeOwned>(&self, frame: &str) -> Result<T, ProtocolError> {
        serde_json::from_str(frame).map_err(ProtocolError::Decode)
    }
}

// =========================================================================
// Tests
// =========================================================================
