//! Room registry: creates rooms, allocates unique join codes, and tracks
//! every live room by code.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use quizcast_protocol::{
    QuizQuestion, RoomCode, CHOICES_PER_QUESTION,
};
use rand::Rng;
use tokio::sync::mpsc;

use crate::room::{spawn_room, RoomEvent, RoomId};
use crate::{OutboundSender, RoomConfig, RoomError, RoomHandle};

/// Counter for generating unique room IDs.
static NEXT_ROOM_ID: AtomicU64 = AtomicU64::new(1);

/// Alphabet for join codes: uppercase letters and digits, so a code reads
/// aloud cleanly and survives being typed on a phone keyboard.
const CODE_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Give up after this many colliding draws. 36^6 ≈ 2.2 billion codes, so
/// hitting this means the registry is pathologically full, not unlucky.
const MAX_CODE_ATTEMPTS: usize = 64;

/// Creates and tracks all active rooms.
///
/// One per process, owned by the router behind its lock. The registry
/// holds only [`RoomHandle`]s — the rooms themselves live in their own
/// actor tasks.
pub struct RoomRegistry {
    rooms: HashMap<RoomCode, RoomHandle>,
    config: RoomConfig,
    /// Every spawned room reports expiries and its end on this channel.
    events: mpsc::UnboundedSender<RoomEvent>,
}

impl RoomRegistry {
    /// Creates an empty registry. Rooms spawned from it emit their
    /// [`RoomEvent`]s on `events`.
    pub fn new(config: RoomConfig, events: mpsc::UnboundedSender<RoomEvent>) -> Self {
        Self {
            rooms: HashMap::new(),
            config,
            events,
        }
    }

    /// Validates a quiz definition and spawns a room for it in the
    /// `lobby` phase, with the creating connection attached as host.
    ///
    /// # Errors
    /// - [`RoomError::InvalidQuiz`] for a malformed definition
    /// - [`RoomError::CodeSpaceExhausted`] if no unused code can be found
    pub fn create_room(
        &mut self,
        title: String,
        questions: Vec<QuizQuestion>,
        host_sender: OutboundSender,
    ) -> Result<RoomHandle, RoomError> {
        validate_quiz(&title, &questions)?;

        let code = self.generate_code()?;
        let id = RoomId(NEXT_ROOM_ID.fetch_add(1, Ordering::Relaxed));

        let handle = spawn_room(
            id,
            code.clone(),
            title,
            questions,
            host_sender,
            self.config.clone(),
            self.events.clone(),
        );
        self.rooms.insert(code.clone(), handle.clone());

        tracing::info!(%id, %code, rooms = self.rooms.len(), "room created");
        Ok(handle)
    }

    /// Draws random codes until one is unused.
    ///
    /// Codes are short, so collisions are handled, not assumed impossible
    /// — each draw is checked against the live set and retried on a hit.
    fn generate_code(&self) -> Result<RoomCode, RoomError> {
        let mut rng = rand::rng();
        for _ in 0..MAX_CODE_ATTEMPTS {
            let code: String = (0..RoomCode::LEN)
                .map(|_| {
                    let i = rng.random_range(0..CODE_ALPHABET.len());
                    CODE_ALPHABET[i] as char
                })
                .collect();
            let code = RoomCode(code);
            if !self.rooms.contains_key(&code) {
                return Ok(code);
            }
            tracing::debug!(%code, "room code collision, retrying");
        }
        Err(RoomError::CodeSpaceExhausted)
    }

    /// Looks up a live room by code.
    pub fn get(&self, code: &RoomCode) -> Option<&RoomHandle> {
        self.rooms.get(code)
    }

    /// Removes a room from the code index (it has ended). The code is
    /// immediately reusable.
    pub fn remove(&mut self, code: &RoomCode) -> Option<RoomHandle> {
        let removed = self.rooms.remove(code);
        if removed.is_some() {
            tracing::info!(%code, rooms = self.rooms.len(), "room removed");
        }
        removed
    }

    /// Number of live rooms.
    pub fn len(&self) -> usize {
        self.rooms.len()
    }

    /// Whether there are no live rooms.
    pub fn is_empty(&self) -> bool {
        self.rooms.is_empty()
    }
}

/// Rejects quiz definitions the state machine couldn't run: the phase
/// invariants assume at least one question, four choices each, an answer
/// key inside them, and a countdown that can actually tick.
fn validate_quiz(
    title: &str,
    questions: &[QuizQuestion],
) -> Result<(), RoomError> {
    if title.trim().is_empty() {
        return Err(RoomError::InvalidQuiz("title must not be empty".into()));
    }
    if questions.is_empty() {
        return Err(RoomError::InvalidQuiz(
            "a quiz needs at least one question".into(),
        ));
    }
    for (i, q) in questions.iter().enumerate() {
        if q.text.trim().is_empty() {
            return Err(RoomError::InvalidQuiz(format!(
                "question {} has no text",
                i + 1
            )));
        }
        if q.choices.len() != CHOICES_PER_QUESTION {
            return Err(RoomError::InvalidQuiz(format!(
                "question {} must have exactly {} choices",
                i + 1,
                CHOICES_PER_QUESTION
            )));
        }
        if q.correct_index >= q.choices.len() {
            return Err(RoomError::InvalidQuiz(format!(
                "question {} has an out-of-range answer index",
                i + 1
            )));
        }
        if q.timer_sec == 0 {
            return Err(RoomError::InvalidQuiz(format!(
                "question {} needs a timer of at least one second",
                i + 1
            )));
        }
    }
    Ok(())
}

// =========================================================================
// Tests
// =========================================================================
