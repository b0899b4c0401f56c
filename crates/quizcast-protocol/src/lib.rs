//! Wire protocol for Quizcast.
//!
//! This crate defines the "language" that quiz clients (the host app and the
//! player app) and the server speak:
//!
//! - **Types** ([`PlayerId`], [`RoomCode`], [`QuizPhase`], [`QuizQuestion`],
//!   etc.) — the identities and data structures that travel on the wire.
//! - **Messages** ([`ClientMessage`], [`ServerMessage`]) — every JSON object
//!   either side may send, each carrying a `type` discriminator.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]) — how those messages are
//!   converted to/from text frames.
//! - **Errors** ([`ProtocolError`]) — what can go wrong during
//!   encoding/decoding.
//!
//! # Architecture
//!
//! The protocol layer sits between transport (raw frames) and session
//! (participant identity). It doesn't know about connections or rooms —
//! it only knows how to serialize and deserialize messages.
//!
//! ```text
//! Transport (text frames) → Protocol (ClientMessage) → Session (who sent it)
//! ```

// ---------------------------------------------------------------------------
// Module declarations
// ---------------------------------------------------------------------------

mod codec;
mod error;
mod messages;
mod types;

// ---------------------------------------------------------------------------
// Re-exports
// ---------------------------------------------------------------------------

// `pub use` makes items from submodules available at the crate root, so
// users write `use quizcast_protocol::ServerMessage` instead of reaching
// into `messages`.

pub use codec::Codec;
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use error::ProtocolError;
pub use messages::{ClientMessage, Ranking, ServerMessage, SyncData};
pub use types::{
    PlayerId, PublicQuestion, QuizPhase, QuizQuestion, RoomCode, SessionToken,
    CHOICES_PER_QUESTION,
};
