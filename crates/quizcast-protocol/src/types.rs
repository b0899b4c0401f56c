//! Core protocol types shared by every Quizcast layer.
//!
//! This module defines the identities and data structures that get
//! serialized to JSON, sent over the wire, and deserialized on the other
//! side. The shapes here must match what the host and player apps parse,
//! so each type's serde attributes are covered by tests.

use serde::{Deserialize, Serialize};

use std::fmt;

/// Number of answer choices every question carries. The wire format, the
/// answer distribution, and the client rendering all assume exactly four.
pub const CHOICES_PER_QUESTION: usize = 4;

// ---------------------------------------------------------------------------
// Identity types
// ---------------------------------------------------------------------------

/// A unique identifier for a player within one room.
///
/// A "newtype wrapper" around `u64` — you can't accidentally pass a raw
/// number where a `PlayerId` is expected, and function signatures like
/// `fn remove(player: PlayerId)` stay readable.
///
/// Ids are assigned sequentially per room as players join, so ascending id
/// order *is* join order. The leaderboard relies on this for tie-breaking.
///
/// `#[serde(transparent)]` makes a `PlayerId(42)` serialize as plain `42`,
/// not `{ "0": 42 }` — the client apps expect a bare number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(pub u64);

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P-{}", self.0)
    }
}

/// The short human-typed key that addresses one quiz room.
///
/// Six uppercase alphanumeric characters (e.g. `"B4QT7K"`) the host reads
/// out loud for players to type in. Generation and uniqueness live in the
/// room registry — this type only carries the value around.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoomCode(pub String);

impl RoomCode {
    /// The fixed length of every generated code.
    pub const LEN: usize = 6;

    /// Borrows the code as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RoomCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An opaque credential identifying one participant across reconnects.
///
/// Issued exactly once, at join (players) or quiz creation (host), and never
/// reissued — after a network drop the client presents this token instead of
/// its identity, and the server restores the original participant record.
/// The value is a 32-character hex string (128 bits of randomness), minted
/// by the session layer; guessing a live token is not feasible.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionToken(pub String);

impl SessionToken {
    /// Borrows the token as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// QuizPhase — the room's stage in the fixed sequence
// ---------------------------------------------------------------------------

/// The stage a room is in.
///
/// A closed tagged enumeration with explicit guards — every room operation
/// checks the guard for its phase and returns a typed error instead of
/// trusting string comparison. The sequence is fixed:
///
/// ```text
///   lobby → question → results → leaderboard ─┬→ question (more remain)
///                                             └→ ended    (none remain)
/// ```
///
/// Serializes lowercase (`"lobby"`, `"question"`, …) because that is what
/// the client apps switch on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuizPhase {
    /// Room exists, players may join, nothing has started.
    Lobby,
    /// A question is live and the countdown is running (or paused).
    Question,
    /// The countdown expired; correctness and distribution are on display.
    Results,
    /// Ranked standings between a question's results and the next question.
    Leaderboard,
    /// Terminal. The room is disposed after broadcasting this.
    Ended,
}

impl QuizPhase {
    /// Whether players may join in this phase.
    pub fn allows_join(self) -> bool {
        matches!(self, Self::Lobby)
    }

    /// Whether the quiz may be started from this phase.
    pub fn allows_start(self) -> bool {
        matches!(self, Self::Lobby)
    }

    /// Whether answers are accepted in this phase.
    pub fn allows_answer(self) -> bool {
        matches!(self, Self::Question)
    }

    /// Whether `host:next` is legal in this phase.
    ///
    /// Advancing is a two-step affair: from `results` it shows the
    /// leaderboard, from `leaderboard` it starts the next question (or
    /// ends the quiz).
    pub fn allows_advance(self) -> bool {
        matches!(self, Self::Results | Self::Leaderboard)
    }

    /// Whether the countdown may be paused in this phase.
    pub fn allows_pause(self) -> bool {
        matches!(self, Self::Question)
    }

    /// Whether this is the terminal phase.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Ended)
    }
}

impl fmt::Display for QuizPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Lobby => "lobby",
            Self::Question => "question",
            Self::Results => "results",
            Self::Leaderboard => "leaderboard",
            Self::Ended => "ended",
        };
        write!(f, "{s}")
    }
}

// ---------------------------------------------------------------------------
// Questions
// ---------------------------------------------------------------------------

/// One question as the host authored it, answer key included.
///
/// Immutable once the quiz is created. This full form never travels to a
/// player connection — see [`PublicQuestion`] for the stripped shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizQuestion {
    /// Opaque client-generated identifier (a UUID in the host app).
    pub id: String,
    /// The question text.
    pub text: String,
    /// Exactly [`CHOICES_PER_QUESTION`] answer choices.
    pub choices: Vec<String>,
    /// Index into `choices` of the correct answer.
    pub correct_index: usize,
    /// Countdown duration for this question, in seconds.
    pub timer_sec: u32,
}

/// A question as broadcast to participants: everything except the answer key.
///
/// Stripping happens at the type level — there is no `correctIndex` field
/// here, so no code path can leak it to a player by accident.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicQuestion {
    pub id: String,
    pub text: String,
    pub choices: Vec<String>,
    pub timer_sec: u32,
}

impl From<&QuizQuestion> for PublicQuestion {
    fn from(q: &QuizQuestion) -> Self {
        Self {
            id: q.id.clone(),
            text: q.text.clone(),
            choices: q.choices.clone(),
            timer_sec: q.timer_sec,
        }
    }
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    //! The client apps parse these shapes verbatim — a serde attribute
    //! mismatch here means the host or player UI silently breaks.

    use super::*;

    // =====================================================================
    // Identity types
    // =====================================================================

    #[test]
    fn test_player_id_serializes_as_plain_number() {
        let json = serde_json::to_string(&PlayerId(42)).unwrap();
        assert_eq!(json, "42");
    }

    #[test]
    fn test_player_id_display() {
        assert_eq!(PlayerId(7).to_string(), "P-7");
    }

    #[test]
    fn test_room_code_serializes_as_plain_string() {
        let json = serde_json::to_string(&RoomCode("AB12CD".into())).unwrap();
        assert_eq!(json, "\"AB12CD\"");
    }

    #[test]
    fn test_session_token_round_trip() {
        let token = SessionToken("deadbeefdeadbeefdeadbeefdeadbeef".into());
        let json = serde_json::to_string(&token).unwrap();
        let decoded: SessionToken = serde_json::from_str(&json).unwrap();
        assert_eq!(token, decoded);
    }

    // =====================================================================
    // QuizPhase
    // =====================================================================

    #[test]
    fn test_phase_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&QuizPhase::Lobby).unwrap(),
            "\"lobby\""
        );
        assert_eq!(
            serde_json::to_string(&QuizPhase::Leaderboard).unwrap(),
            "\"leaderboard\""
        );
    }

    #[test]
    fn test_phase_join_only_in_lobby() {
        assert!(QuizPhase::Lobby.allows_join());
        assert!(!QuizPhase::Question.allows_join());
        assert!(!QuizPhase::Results.allows_join());
        assert!(!QuizPhase::Leaderboard.allows_join());
        assert!(!QuizPhase::Ended.allows_join());
    }

    #[test]
    fn test_phase_answer_only_during_question() {
        assert!(QuizPhase::Question.allows_answer());
        assert!(!QuizPhase::Lobby.allows_answer());
        assert!(!QuizPhase::Results.allows_answer());
        assert!(!QuizPhase::Ended.allows_answer());
    }

    #[test]
    fn test_phase_advance_from_results_and_leaderboard_only() {
        assert!(QuizPhase::Results.allows_advance());
        assert!(QuizPhase::Leaderboard.allows_advance());
        assert!(!QuizPhase::Lobby.allows_advance());
        assert!(!QuizPhase::Question.allows_advance());
        assert!(!QuizPhase::Ended.allows_advance());
    }

    #[test]
    fn test_phase_pause_only_during_question() {
        assert!(QuizPhase::Question.allows_pause());
        assert!(!QuizPhase::Lobby.allows_pause());
        assert!(!QuizPhase::Results.allows_pause());
    }

    #[test]
    fn test_phase_terminal() {
        assert!(QuizPhase::Ended.is_terminal());
        assert!(!QuizPhase::Lobby.is_terminal());
    }

    #[test]
    fn test_phase_display_matches_wire_form() {
        assert_eq!(QuizPhase::Question.to_string(), "question");
        assert_eq!(QuizPhase::Ended.to_string(), "ended");
    }

    // =====================================================================
    // Questions
    // =====================================================================

    fn sample_question() -> QuizQuestion {
        QuizQuestion {
            id: "q-1".into(),
            text: "Capital of France?".into(),
            choices: vec![
                "Paris".into(),
                "Lyon".into(),
                "Marseille".into(),
                "Nice".into(),
            ],
            correct_index: 0,
            timer_sec: 20,
        }
    }

    #[test]
    fn test_quiz_question_uses_camel_case_fields() {
        let json: serde_json::Value =
            serde_json::to_value(sample_question()).unwrap();
        assert_eq!(json["correctIndex"], 0);
        assert_eq!(json["timerSec"], 20);
        assert!(json.get("correct_index").is_none());
    }

    #[test]
    fn test_public_question_has_no_answer_key() {
        let public = PublicQuestion::from(&sample_question());
        let json: serde_json::Value = serde_json::to_value(&public).unwrap();

        assert!(
            json.get("correctIndex").is_none(),
            "answer key must never reach player connections"
        );
        assert_eq!(json["timerSec"], 20);
        assert_eq!(json["choices"].as_array().unwrap().len(), 4);
    }

    #[test]
    fn test_public_question_keeps_everything_else() {
        let q = sample_question();
        let public = PublicQuestion::from(&q);
        assert_eq!(public.id, q.id);
        assert_eq!(public.text, q.text);
        assert_eq!(public.choices, q.choices);
        assert_eq!(public.timer_sec, q.timer_sec);
    }
}
