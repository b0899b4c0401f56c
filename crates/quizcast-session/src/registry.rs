//! The session registry: who is connected as whom, and which token
//! resumes which session.
//!
//! Three indices, kept consistent with room membership by the router:
//!
//! - live connection → binding (host or player of some room)
//! - player session token → (room code, player id)
//! - host session token → room code
//!
//! # Concurrency note
//!
//! `SessionRegistry` is NOT thread-safe by itself — plain `HashMap`s, no
//! locks. That's intentional: the registry lives inside the router, which
//! sits behind a single coarse `Mutex` at the server level. Index
//! book-keeping is the only cross-room shared state in the process, so one
//! lock is both sufficient and simplest.

use std::collections::HashMap;

use quizcast_protocol::{PlayerId, RoomCode, SessionToken};
use quizcast_transport::ConnectionId;

use crate::SessionError;

/// What a live connection currently *is*.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnBinding {
    /// This connection is the host of the given room.
    Host { code: RoomCode },

    /// This connection is a player in the given room.
    Player {
        code: RoomCode,
        player_id: PlayerId,
    },
}

impl ConnBinding {
    /// The room this binding points at, whichever kind it is.
    pub fn code(&self) -> &RoomCode {
        match self {
            Self::Host { code } => code,
            Self::Player { code, .. } => code,
        }
    }
}

/// The process-wide session indices.
///
/// ## Lifecycle of an entry
///
/// ```text
/// join/create ──→ bind + register token ──→ unbind (socket closed)
///                          │                      │
///                          │                (token survives)
///                          │                      │
///                          ▼                      ▼
///                  remove_room (quiz over)   reconnect → bind again
///                          │                      │
///                          ▼                      ▼
///                   all entries gone      remove_player_token
///                                         (grace elapsed, player gone)
/// ```
#[derive(Debug, Default)]
pub struct SessionRegistry {
    /// Live connections only. An entry is removed the moment its socket
    /// closes, so a reused `ConnectionId` can never misroute.
    connections: HashMap<ConnectionId, ConnBinding>,

    /// Player reconnection tokens. Entries outlive the connection — that
    /// is the whole point — and die on grace expiry or room end.
    player_tokens: HashMap<SessionToken, (RoomCode, PlayerId)>,

    /// Host reconnection tokens.
    host_tokens: HashMap<SessionToken, RoomCode>,
}

impl SessionRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    // -- Connection bindings ----------------------------------------------

    /// Binds a connection as the host of a room.
    pub fn bind_host(&mut self, conn: ConnectionId, code: RoomCode) {
        self.connections.insert(conn, ConnBinding::Host { code });
    }

    /// Binds a connection as a player in a room.
    pub fn bind_player(
        &mut self,
        conn: ConnectionId,
        code: RoomCode,
        player_id: PlayerId,
    ) {
        self.connections
            .insert(conn, ConnBinding::Player { code, player_id });
    }

    /// Looks up what a connection currently is, if anything.
    pub fn binding(&self, conn: ConnectionId) -> Option<&ConnBinding> {
        self.connections.get(&conn)
    }

    /// Like [`binding`](Self::binding), but an unbound connection is an
    /// error — for messages that only a participant may send.
    pub fn require_binding(
        &self,
        conn: ConnectionId,
    ) -> Result<&ConnBinding, SessionError> {
        self.connections.get(&conn).ok_or(SessionError::NotBound(conn))
    }

    /// Whether the connection is already bound to a participant.
    ///
    /// The router uses this to make a duplicate `join` a no-op instead of
    /// a duplicate player.
    pub fn is_bound(&self, conn: ConnectionId) -> bool {
        self.connections.contains_key(&conn)
    }

    /// Removes and returns a connection's binding (socket closed).
    ///
    /// Token entries are left alone — the participant may come back.
    pub fn unbind(&mut self, conn: ConnectionId) -> Option<ConnBinding> {
        self.connections.remove(&conn)
    }

    // -- Token indices ----------------------------------------------------

    /// Registers a freshly issued player token.
    pub fn register_player_token(
        &mut self,
        token: SessionToken,
        code: RoomCode,
        player_id: PlayerId,
    ) {
        self.player_tokens.insert(token, (code, player_id));
    }

    /// Registers a freshly issued host token.
    pub fn register_host_token(&mut self, token: SessionToken, code: RoomCode) {
        self.host_tokens.insert(token, code);
    }

    /// Resolves a player token to its identity.
    ///
    /// # Errors
    /// [`SessionError::InvalidToken`] if unknown — never issued, expired
    /// after the grace period, or the room is gone.
    pub fn resolve_player_token(
        &self,
        token: &SessionToken,
    ) -> Result<(RoomCode, PlayerId), SessionError> {
        self.player_tokens
            .get(token)
            .cloned()
            .ok_or(SessionError::InvalidToken)
    }

    /// Resolves a host token to its room.
    ///
    /// # Errors
    /// [`SessionError::InvalidToken`] if unknown.
    pub fn resolve_host_token(
        &self,
        token: &SessionToken,
    ) -> Result<RoomCode, SessionError> {
        self.host_tokens
            .get(token)
            .cloned()
            .ok_or(SessionError::InvalidToken)
    }

    /// Drops one player token (the player's grace period elapsed).
    pub fn remove_player_token(&mut self, token: &SessionToken) {
        if self.player_tokens.remove(token).is_some() {
            tracing::debug!("stale player token dropped");
        }
    }

    // -- Room teardown ----------------------------------------------------

    /// Purges every index entry pointing at a room that has ended:
    /// all of its tokens and all of its live connection bindings.
    ///
    /// Returns the connections that were bound, so the caller can finish
    /// any per-connection cleanup.
    pub fn remove_room(&mut self, code: &RoomCode) -> Vec<ConnectionId> {
        self.player_tokens.retain(|_, (c, _)| c != code);
        self.host_tokens.retain(|_, c| c != code);

        let stale: Vec<ConnectionId> = self
            .connections
            .iter()
            .filter(|(_, b)| b.code() == code)
            .map(|(id, _)| *id)
            .collect();
        for id in &stale {
            self.connections.remove(id);
        }
        stale
    }

    /// Number of live bound connections.
    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }
}

// =========================================================================
// Tests
// =========================================================================
