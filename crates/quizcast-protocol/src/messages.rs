//! The messages exchanged over a quiz connection.
//!
//! Every frame on the wire is a JSON object with a `type` discriminator.
//! `#[serde(tag = "type")]` produces exactly that "internally tagged"
//! format: `ClientMessage::Join { .. }` becomes
//! `{ "type": "join", "quizCode": "...", "name": "..." }`, which is what
//! the host and player apps already send and parse.
//!
//! Host-originated message types are namespaced `host:*` on the wire, so
//! the variants carry explicit `#[serde(rename = "host:...")]` attributes.

use serde::{Deserialize, Serialize};

use crate::types::{
    PlayerId, PublicQuestion, QuizPhase, QuizQuestion, RoomCode, SessionToken,
};

use std::collections::HashMap;

// ---------------------------------------------------------------------------
// Client → Server
// ---------------------------------------------------------------------------

/// Everything a client (host or player) may send.
///
/// An unknown `type` tag fails deserialization, which the connection
/// handler reports back as an `error` message — there is no catch-all
/// variant on purpose.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ClientMessage {
    /// Host creates a new quiz and becomes its room's host.
    #[serde(rename = "host:create")]
    HostCreate {
        title: String,
        questions: Vec<QuizQuestion>,
    },

    /// Host starts the quiz (lobby → first question).
    #[serde(rename = "host:start")]
    HostStart,

    /// Host advances: results → leaderboard, or leaderboard → next
    /// question / end of quiz.
    #[serde(rename = "host:next")]
    HostNext,

    /// Host ends the quiz early, from any non-terminal phase.
    #[serde(rename = "host:end")]
    HostEnd,

    /// Host resumes a previous session after a network drop.
    #[serde(rename = "host:reconnect", rename_all = "camelCase")]
    HostReconnect { session_token: SessionToken },

    /// Player joins a lobby by quiz code.
    #[serde(rename = "join", rename_all = "camelCase")]
    Join { quiz_code: String, name: String },

    /// Player submits an answer for the current question.
    ///
    /// `question_id` pins the answer to the question the player was
    /// looking at — a stale id (racing a phase change or a reconnect)
    /// makes the answer a no-op instead of scoring the wrong question.
    #[serde(rename = "answer", rename_all = "camelCase")]
    Answer {
        question_id: String,
        choice_index: usize,
    },

    /// Player resumes a previous session after a network drop.
    #[serde(rename = "reconnect", rename_all = "camelCase")]
    Reconnect { session_token: SessionToken },
}

// ---------------------------------------------------------------------------
// Server → Client
// ---------------------------------------------------------------------------

/// Payload of the host-only [`ServerMessage::Sync`] message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncData {
    /// The room's join code, for the host to display.
    pub quiz_code: RoomCode,
    /// Present only on quiz creation — tokens are never reissued, so a
    /// reconnecting host does not get one again.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_token: Option<SessionToken>,
}

/// One row of the ranked standings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ranking {
    pub name: String,
    pub score: u32,
}

/// Everything the server may send.
///
/// Clients render purely off this set; the server never assumes a reply.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ServerMessage {
    /// Host only: sent on quiz creation and host reconnect, carrying the
    /// room code (and, on creation, the host's session token).
    #[serde(rename = "sync")]
    Sync { phase: QuizPhase, data: SyncData },

    /// New player only: the session token to hold for reconnection.
    /// Sent privately — never broadcast.
    #[serde(rename = "session", rename_all = "camelCase")]
    Session { session_token: SessionToken },

    /// The connected-player roster. `player_id` is filled in only on the
    /// copy sent to the player it identifies (their join/reconnect ack);
    /// everyone else receives the list alone.
    #[serde(rename = "joined", rename_all = "camelCase")]
    Joined {
        #[serde(skip_serializing_if = "Option::is_none")]
        player_id: Option<PlayerId>,
        players: Vec<String>,
    },

    /// A question went live. The question carries no answer key.
    #[serde(rename = "question")]
    Question {
        question: PublicQuestion,
        index: usize,
        total: usize,
    },

    /// One second elapsed on the live countdown.
    #[serde(rename = "tick")]
    Tick { remaining: u32 },

    /// The countdown froze (host disconnected mid-question).
    #[serde(rename = "paused")]
    Paused,

    /// The countdown expired: answer key, per-choice answer counts, and
    /// cumulative scores keyed by player name.
    #[serde(rename = "results", rename_all = "camelCase")]
    Results {
        correct_index: usize,
        distribution: Vec<u32>,
        scores: HashMap<String, u32>,
    },

    /// Ranked standings, descending by score.
    #[serde(rename = "leaderboard")]
    Leaderboard { rankings: Vec<Ranking> },

    /// The quiz is over and the room is gone.
    #[serde(rename = "ended")]
    Ended,

    /// Something about the sender's last message was wrong. Always
    /// addressed to the offending connection only, and always locally
    /// recoverable.
    #[serde(rename = "error")]
    Error { message: String },
}

// =========================================================================
// Tests
// =========================================================================
