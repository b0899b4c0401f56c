//! Unified error type for the Quizcast server crate.

use quizcast_protocol::ProtocolError;
use quizcast_transport::TransportError;

/// Top-level error for server setup and connection handling.
///
/// Participant-facing failures (bad joins, out-of-phase actions, stale
/// tokens) never become this type — the router answers those with an
/// `error` message on the offending connection and moves on. What's left
/// here is genuine plumbing: sockets and frames.
#[derive(Debug, thiserror::Error)]
pub enum QuizcastError {
    /// A transport-level error (bind, accept, send, recv).
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A protocol-level error (encode, decode).
    #[error(transparent)]
    Protocol(#[from] ProtocolError),
}
