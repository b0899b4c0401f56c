//! The session router: turns connection-level events into room operations.
//!
//! The router owns the process-wide registries — rooms by code, live
//! connections, session tokens — and is the single place that decides
//! which room and participant an inbound message concerns. It never does
//! quiz logic itself: every decision about phases, scores, and broadcasts
//! belongs to the room actors.
//!
//! ```text
//! connection event ──→ Router ──→ RoomHandle ──→ room actor
//!                        │
//!                        └── replies `error{...}` to the offending
//!                            connection; nothing here tears a room down
//! ```
//!
//! The whole router sits behind one `Mutex` at the server level — index
//! book-keeping is the only cross-room shared state, so a single coarse
//! lock is both sufficient and the simplest thing that is correct.

use quizcast_protocol::{
    ClientMessage, QuizPhase, QuizQuestion, RoomCode, ServerMessage,
    SessionToken, SyncData,
};
use quizcast_room::{
    OutboundSender, RoomConfig, RoomEvent, RoomRegistry,
};
use quizcast_session::{mint_token, ConnBinding, SessionRegistry};
use quizcast_transport::ConnectionId;
use tokio::sync::mpsc;

/// Which of the host's room controls was requested.
#[derive(Debug, Clone, Copy)]
enum HostAction {
    Start,
    Next,
    End,
}

/// Process-wide message router and registry owner.
///
/// Constructed with explicit owned state — no ambient globals — and
/// scoped to the server's lifetime.
pub struct Router {
    rooms: RoomRegistry,
    sessions: SessionRegistry,
}

impl Router {
    /// Creates a router whose rooms report their events on `events`.
    pub fn new(
        config: RoomConfig,
        events: mpsc::UnboundedSender<RoomEvent>,
    ) -> Self {
        Self {
            rooms: RoomRegistry::new(config, events),
            sessions: SessionRegistry::new(),
        }
    }

    /// Routes one decoded client message.
    ///
    /// `out` is the sending half of the connection's outbound pump; it is
    /// both where error replies go and the channel that gets attached to
    /// a room when this connection becomes a participant.
    pub async fn dispatch(
        &mut self,
        conn: ConnectionId,
        msg: ClientMessage,
        out: &OutboundSender,
    ) {
        match msg {
            ClientMessage::HostCreate { title, questions } => {
                self.create_quiz(conn, title, questions, out);
            }
            ClientMessage::HostStart => {
                self.host_action(conn, HostAction::Start, out).await;
            }
            ClientMessage::HostNext => {
                self.host_action(conn, HostAction::Next, out).await;
            }
            ClientMessage::HostEnd => {
                self.host_action(conn, HostAction::End, out).await;
            }
            ClientMessage::HostReconnect { session_token } => {
                self.reconnect_host(conn, session_token, out).await;
            }
            ClientMessage::Join { quiz_code, name } => {
                self.join_room(conn, quiz_code, name, out).await;
            }
            ClientMessage::Answer { question_id, choice_index } => {
                self.submit_answer(conn, question_id, choice_index, out)
                    .await;
            }
            ClientMessage::Reconnect { session_token } => {
                self.reconnect_player(conn, session_token, out).await;
            }
        }
    }

    // -- Quiz creation ----------------------------------------------------

    fn create_quiz(
        &mut self,
        conn: ConnectionId,
        title: String,
        questions: Vec<QuizQuestion>,
        out: &OutboundSender,
    ) {
        if self.sessions.is_bound(conn) {
            send_error(out, "this connection already belongs to a quiz");
            return;
        }

        let handle =
            match self.rooms.create_room(title, questions, out.clone()) {
                Ok(handle) => handle,
                Err(e) => {
                    send_error(out, e.to_string());
                    return;
                }
            };

        let code = handle.code().clone();
        let token = mint_token();
        self.sessions.register_host_token(token.clone(), code.clone());
        self.sessions.bind_host(conn, code.clone());

        tracing::info!(%conn, %code, "quiz created");

        let _ = out.send(ServerMessage::Sync {
            phase: QuizPhase::Lobby,
            data: SyncData {
                quiz_code: code,
                session_token: Some(token),
            },
        });
    }

    // -- Joining ----------------------------------------------------------

    async fn join_room(
        &mut self,
        conn: ConnectionId,
        quiz_code: String,
        name: String,
        out: &OutboundSender,
    ) {
        // A connection already bound to a participant re-sending `join`
        // is a race with reconnection, not a second player: no-op.
        if self.sessions.is_bound(conn) {
            tracing::debug!(%conn, "duplicate join ignored");
            return;
        }

        let quiz_code = quiz_code.trim().to_uppercase();
        if quiz_code.is_empty() {
            send_error(out, "quiz code must not be empty");
            return;
        }
        let name = name.trim().to_string();
        if name.is_empty() {
            send_error(out, "name must not be empty");
            return;
        }

        let code = RoomCode(quiz_code);
        let Some(handle) = self.rooms.get(&code) else {
            send_error(out, "no quiz with that code");
            return;
        };

        match handle.add_player(name, out.clone()).await {
            Ok((player_id, token)) => {
                self.sessions.bind_player(conn, code.clone(), player_id);
                self.sessions.register_player_token(
                    token.clone(),
                    code.clone(),
                    player_id,
                );
                tracing::info!(%conn, %code, %player_id, "player joined");

                // The token goes to the new connection only — it is the
                // player's private reconnection credential.
                let _ = out.send(ServerMessage::Session {
                    session_token: token,
                });
            }
            Err(e) => send_error(out, e.to_string()),
        }
    }

    // -- Answers ----------------------------------------------------------

    async fn submit_answer(
        &mut self,
        conn: ConnectionId,
        question_id: String,
        choice_index: usize,
        out: &OutboundSender,
    ) {
        let (code, player_id) = match self.sessions.require_binding(conn) {
            Ok(ConnBinding::Player { code, player_id }) => {
                (code.clone(), *player_id)
            }
            Ok(ConnBinding::Host { .. }) => {
                send_error(out, "the host cannot submit answers");
                return;
            }
            Err(e) => {
                send_error(out, e.to_string());
                return;
            }
        };

        let Some(handle) = self.rooms.get(&code) else {
            send_error(out, "that quiz is no longer running");
            return;
        };

        if let Err(e) =
            handle.answer(player_id, question_id, choice_index).await
        {
            send_error(out, e.to_string());
        }
    }

    // -- Host controls ----------------------------------------------------

    async fn host_action(
        &mut self,
        conn: ConnectionId,
        action: HostAction,
        out: &OutboundSender,
    ) {
        let code = match self.sessions.binding(conn) {
            Some(ConnBinding::Host { code }) => code.clone(),
            _ => {
                send_error(out, "this connection is not a quiz host");
                return;
            }
        };

        let Some(handle) = self.rooms.get(&code) else {
            send_error(out, "that quiz is no longer running");
            return;
        };

        let result = match action {
            HostAction::Start => handle.start().await,
            HostAction::Next => handle.advance().await,
            HostAction::End => handle.end().await,
        };
        if let Err(e) = result {
            send_error(out, e.to_string());
        }
        // On End, the room's Ended event drives index cleanup — the same
        // path as a quiz running out of questions.
    }

    // -- Reconnection -----------------------------------------------------

    async fn reconnect_player(
        &mut self,
        conn: ConnectionId,
        token: SessionToken,
        out: &OutboundSender,
    ) {
        let Ok((code, player_id)) =
            self.sessions.resolve_player_token(&token)
        else {
            send_error(out, "session invalid or expired");
            return;
        };

        let Some(handle) = self.rooms.get(&code) else {
            // Room ended while the token entry was in flight; the entry
            // is stale — drop it so the next attempt fails fast.
            self.sessions.remove_player_token(&token);
            send_error(out, "session invalid or expired");
            return;
        };

        match handle.reconnect_player(player_id, out.clone()).await {
            Ok(()) => {
                self.sessions.bind_player(conn, code.clone(), player_id);
                tracing::info!(%conn, %code, %player_id, "player reconnected");
            }
            Err(_) => {
                // The grace period won the race — the player is gone.
                self.sessions.remove_player_token(&token);
                send_error(out, "session invalid or expired");
            }
        }
    }

    async fn reconnect_host(
        &mut self,
        conn: ConnectionId,
        token: SessionToken,
        out: &OutboundSender,
    ) {
        let Ok(code) = self.sessions.resolve_host_token(&token) else {
            send_error(out, "session invalid or expired");
            return;
        };

        let Some(handle) = self.rooms.get(&code) else {
            send_error(out, "session invalid or expired");
            return;
        };

        match handle.reconnect_host(out.clone()).await {
            Ok(()) => {
                self.sessions.bind_host(conn, code.clone());
                tracing::info!(%conn, %code, "host reconnected");
            }
            Err(e) => send_error(out, e.to_string()),
        }
    }

    // -- Connection close -------------------------------------------------

    /// Handles a closed socket: detaches the participant from their room
    /// (players get a grace period, the host pauses the quiz) and drops
    /// the connection's index entry immediately so a reused connection
    /// object can never misroute.
    pub async fn on_close(&mut self, conn: ConnectionId) {
        let Some(binding) = self.sessions.unbind(conn) else {
            return; // never joined anything
        };

        match binding {
            ConnBinding::Player { code, player_id } => {
                if let Some(handle) = self.rooms.get(&code) {
                    handle.disconnect_player(player_id).await;
                }
                tracing::info!(%conn, %code, %player_id, "player connection closed");
            }
            ConnBinding::Host { code } => {
                if let Some(handle) = self.rooms.get(&code) {
                    handle.disconnect_host().await;
                }
                tracing::info!(%conn, %code, "host connection closed");
            }
        }
    }

    // -- Room events ------------------------------------------------------

    /// Applies a room's report to the indices: expired players lose their
    /// token, ended rooms vanish from every index.
    pub fn handle_room_event(&mut self, event: RoomEvent) {
        match event {
            RoomEvent::PlayerExpired { code, token } => {
                self.sessions.remove_player_token(&token);
                tracing::debug!(%code, "expired player token dropped");
            }
            RoomEvent::Ended { code } => {
                self.rooms.remove(&code);
                let stale = self.sessions.remove_room(&code);
                tracing::info!(
                    %code,
                    connections = stale.len(),
                    "ended room purged from indices"
                );
            }
        }
    }
}

fn send_error(out: &OutboundSender, message: impl Into<String>) {
    let _ = out.send(ServerMessage::Error { message: message.into() });
}

// =========================================================================
// Tests
// =========================================================================
