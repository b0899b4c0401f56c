//! Error types for the session layer.

use quizcast_transport::ConnectionId;

/// Errors that can occur resolving sessions and bindings.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// The session token doesn't resolve to any live participant.
    ///
    /// Either it was never issued, or the participant's grace period
    /// elapsed and the mapping was garbage-collected. The two cases are
    /// indistinguishable on purpose — a stale token must not reveal
    /// whether the session ever existed.
    #[error("session invalid or expired")]
    InvalidToken,

    /// The connection isn't bound to any room participant, so a
    /// participant-scoped message (an answer, a host action) can't be
    /// routed anywhere. The connection id is kept for logging; the
    /// message itself is what the offending client sees.
    #[error("you are not part of any quiz")]
    NotBound(ConnectionId),
}
