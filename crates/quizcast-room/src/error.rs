//! Error types for the room layer.
//!
//! Every variant's message is user-facing: the router forwards it verbatim
//! to the offending connection as an `error` reply. None of these tears a
//! room down — they are all locally recoverable.

use quizcast_protocol::{PlayerId, QuizPhase, RoomCode};

/// Errors that can occur during room operations.
#[derive(Debug, thiserror::Error)]
pub enum RoomError {
    /// The operation isn't legal in the room's current phase — answering
    /// outside `question`, starting twice, advancing from the lobby.
    /// The phase guards make these the *only* way an out-of-order call
    /// surfaces; internal transitions can't go wrong.
    #[error("cannot {action} while the quiz is in the {phase} phase")]
    InvalidPhase {
        action: &'static str,
        phase: QuizPhase,
    },

    /// The player is no longer part of this quiz (grace period elapsed,
    /// or never existed).
    #[error("player {0} is no longer part of this quiz")]
    UnknownPlayer(PlayerId),

    /// The submitted choice index is outside the question's choices.
    #[error("choice index {0} is out of range")]
    InvalidChoice(usize),

    /// The quiz definition itself is malformed (no questions, wrong
    /// choice count, bad answer index, zero timer).
    #[error("invalid quiz: {0}")]
    InvalidQuiz(String),

    /// Code generation exhausted its retry budget without finding an
    /// unused code. Only plausible when the code space is nearly full.
    #[error("could not allocate an unused quiz code")]
    CodeSpaceExhausted,

    /// The room's actor is gone (quiz ended while the request was in
    /// flight).
    #[error("quiz {0} is no longer available")]
    Unavailable(RoomCode),
}
