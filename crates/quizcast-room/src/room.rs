//! Room actor: an isolated Tokio task that owns one quiz.
//!
//! Each room runs in its own task, communicating with the outside world
//! through an mpsc channel. This is the "actor model" — no shared mutable
//! state, just message passing. The actor's `select!` loop is the only
//! place a room's state is ever touched, which gives every operation
//! run-to-completion semantics for free:
//!
//! ```text
//!   router commands ─┐
//!   countdown ticks ─┼──→ one select! loop ──→ state + broadcasts
//!   grace expiries  ─┘
//! ```
//!
//! The phase sequence the actor enforces:
//!
//! ```text
//!   lobby → question → results → leaderboard ─┬→ question (more remain)
//!                                             └→ ended    (none remain)
//! ```

use std::collections::HashMap;
use std::fmt;

use quizcast_protocol::{
    PlayerId, PublicQuestion, QuizPhase, QuizQuestion, Ranking, RoomCode,
    ServerMessage, SessionToken,
};
use quizcast_session::mint_token;
use quizcast_timer::{Countdown, CountdownEvent};
use tokio::sync::{mpsc, oneshot};
use tokio::task::AbortHandle;

use crate::score::points_for_correct;
use crate::{Broadcaster, OutboundSender, RoomConfig, RoomError};

// ---------------------------------------------------------------------------
// Identity
// ---------------------------------------------------------------------------

/// Internal identifier for a room instance.
///
/// Distinct from the [`RoomCode`]: the code is the human-typed join key
/// and is released when the room ends, while the id is process-unique
/// forever — log lines keyed on it stay unambiguous even if a code gets
/// reused by a later quiz.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RoomId(pub u64);

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "R-{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Commands, events, snapshots
// ---------------------------------------------------------------------------

/// Operations sent to a room actor through its channel.
///
/// The `oneshot::Sender` in most variants is a reply channel — the caller
/// sends a command and awaits the result. Disconnect notifications carry
/// no reply: the socket is already gone, there is nobody to answer.
pub(crate) enum RoomCommand {
    /// Add a player to the lobby.
    AddPlayer {
        name: String,
        sender: OutboundSender,
        reply: oneshot::Sender<Result<(PlayerId, SessionToken), RoomError>>,
    },

    /// Start the quiz (lobby → first question).
    Start {
        reply: oneshot::Sender<Result<(), RoomError>>,
    },

    /// Record a player's answer for the current question.
    Answer {
        player_id: PlayerId,
        question_id: String,
        choice_index: usize,
        reply: oneshot::Sender<Result<(), RoomError>>,
    },

    /// Advance: results → leaderboard, or leaderboard → next question/end.
    Advance {
        reply: oneshot::Sender<Result<(), RoomError>>,
    },

    /// End the quiz now, from any phase.
    End {
        reply: oneshot::Sender<Result<(), RoomError>>,
    },

    /// A player's socket closed. Starts their grace period.
    DisconnectPlayer { player_id: PlayerId },

    /// The host's socket closed. Pauses a running countdown.
    DisconnectHost,

    /// A player presented a valid token on a new socket.
    ReconnectPlayer {
        player_id: PlayerId,
        sender: OutboundSender,
        reply: oneshot::Sender<Result<(), RoomError>>,
    },

    /// The host presented a valid token on a new socket.
    ReconnectHost {
        sender: OutboundSender,
        reply: oneshot::Sender<Result<(), RoomError>>,
    },

    /// A player's grace period ran out (sent by their grace task).
    GraceExpired { player_id: PlayerId },

    /// Request a state snapshot (host dashboard, tests).
    Snapshot {
        reply: oneshot::Sender<RoomSnapshot>,
    },
}

/// What a room reports upward to keep the session indices consistent.
///
/// The room owns participant lifetimes; the router only mirrors them.
/// These events are the mirror's update feed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoomEvent {
    /// A disconnected player's grace period elapsed; their token must
    /// stop resolving.
    PlayerExpired {
        code: RoomCode,
        token: SessionToken,
    },

    /// The quiz ended (host command or final question finished); the
    /// room must disappear from every index.
    Ended { code: RoomCode },
}

/// A point-in-time view of a room's state (not sent on the wire).
#[derive(Debug, Clone)]
pub struct RoomSnapshot {
    pub id: RoomId,
    pub title: String,
    pub phase: QuizPhase,
    /// Index of the current question. Meaningful outside `lobby`.
    pub current: usize,
    pub total: usize,
    /// Seconds left on the countdown. Meaningful in `question`.
    pub remaining: u32,
    pub paused: bool,
    /// How many players have answered the current question — the host
    /// view's live counter.
    pub answered: usize,
    /// All players (connected or in grace), in join order.
    pub players: Vec<PlayerSnapshot>,
}

/// One player's slice of a [`RoomSnapshot`].
#[derive(Debug, Clone)]
pub struct PlayerSnapshot {
    pub id: PlayerId,
    pub name: String,
    pub connected: bool,
    pub score: u32,
}

// ---------------------------------------------------------------------------
// RoomHandle
// ---------------------------------------------------------------------------

/// Handle to a running room actor. Cheap to clone — just a sender.
///
/// Every method forwards one command and (where there is a reply channel)
/// awaits the actor's answer. A closed channel means the quiz ended while
/// the request was in flight; that surfaces as [`RoomError::Unavailable`].
#[derive(Clone)]
pub struct RoomHandle {
    code: RoomCode,
    sender: mpsc::Sender<RoomCommand>,
}

impl RoomHandle {
    /// The room's join code.
    pub fn code(&self) -> &RoomCode {
        &self.code
    }

    async fn request<T>(
        &self,
        make: impl FnOnce(oneshot::Sender<Result<T, RoomError>>) -> RoomCommand,
    ) -> Result<T, RoomError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.sender
            .send(make(reply_tx))
            .await
            .map_err(|_| RoomError::Unavailable(self.code.clone()))?;
        reply_rx
            .await
            .map_err(|_| RoomError::Unavailable(self.code.clone()))?
    }

    /// Adds a player to the lobby. Returns their id and session token.
    pub async fn add_player(
        &self,
        name: String,
        sender: OutboundSender,
    ) -> Result<(PlayerId, SessionToken), RoomError> {
        self.request(|reply| RoomCommand::AddPlayer { name, sender, reply })
            .await
    }

    /// Starts the quiz.
    pub async fn start(&self) -> Result<(), RoomError> {
        self.request(|reply| RoomCommand::Start { reply }).await
    }

    /// Records an answer from a player.
    pub async fn answer(
        &self,
        player_id: PlayerId,
        question_id: String,
        choice_index: usize,
    ) -> Result<(), RoomError> {
        self.request(|reply| RoomCommand::Answer {
            player_id,
            question_id,
            choice_index,
            reply,
        })
        .await
    }

    /// Advances past results or the leaderboard.
    pub async fn advance(&self) -> Result<(), RoomError> {
        self.request(|reply| RoomCommand::Advance { reply }).await
    }

    /// Ends the quiz immediately.
    pub async fn end(&self) -> Result<(), RoomError> {
        self.request(|reply| RoomCommand::End { reply }).await
    }

    /// Reports a player's socket as closed. Best-effort — if the room is
    /// already gone there is nothing left to detach.
    pub async fn disconnect_player(&self, player_id: PlayerId) {
        let _ = self
            .sender
            .send(RoomCommand::DisconnectPlayer { player_id })
            .await;
    }

    /// Reports the host's socket as closed. Best-effort.
    pub async fn disconnect_host(&self) {
        let _ = self.sender.send(RoomCommand::DisconnectHost).await;
    }

    /// Rebinds a returning player and replays the current state to them.
    pub async fn reconnect_player(
        &self,
        player_id: PlayerId,
        sender: OutboundSender,
    ) -> Result<(), RoomError> {
        self.request(|reply| RoomCommand::ReconnectPlayer {
            player_id,
            sender,
            reply,
        })
        .await
    }

    /// Rebinds a returning host, resuming a paused countdown.
    pub async fn reconnect_host(
        &self,
        sender: OutboundSender,
    ) -> Result<(), RoomError> {
        self.request(|reply| RoomCommand::ReconnectHost { sender, reply })
            .await
    }

    /// Fetches a state snapshot.
    pub async fn snapshot(&self) -> Result<RoomSnapshot, RoomError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.sender
            .send(RoomCommand::Snapshot { reply: reply_tx })
            .await
            .map_err(|_| RoomError::Unavailable(self.code.clone()))?;
        reply_rx
            .await
            .map_err(|_| RoomError::Unavailable(self.code.clone()))
    }
}

// ---------------------------------------------------------------------------
// The actor
// ---------------------------------------------------------------------------

/// One player's record inside the actor.
///
/// Disconnection clears the broadcaster entry and flips `disconnected`,
/// but the record itself survives until the grace period elapses — that
/// is what makes reconnection seamless.
struct Player {
    id: PlayerId,
    name: String,
    token: SessionToken,
    disconnected: bool,
    /// The player's recorded choice for the current question. Doubles as
    /// the answered marker (first write wins) and the distribution input.
    choice: Option<usize>,
    /// Abort handle for the pending grace-removal task, present only
    /// while disconnected.
    grace: Option<AbortHandle>,
}

/// The internal room actor state. Runs inside a Tokio task.
struct RoomActor {
    id: RoomId,
    code: RoomCode,
    title: String,
    phase: QuizPhase,
    questions: Vec<QuizQuestion>,
    current: usize,
    players: HashMap<PlayerId, Player>,
    /// Cumulative scores, keyed by player id. Monotonically non-decreasing
    /// per player; entries disappear only with the player.
    scores: HashMap<PlayerId, u32>,
    /// Snapshot of the most recent results broadcast, replayed to anyone
    /// reconnecting during the results phase.
    last_results: Option<ServerMessage>,
    broadcaster: Broadcaster,
    countdown: Countdown,
    next_player_id: u64,
    config: RoomConfig,
    receiver: mpsc::Receiver<RoomCommand>,
    /// Clone handed to grace tasks so their expiry lands in this loop.
    self_sender: mpsc::Sender<RoomCommand>,
    events: mpsc::UnboundedSender<RoomEvent>,
}

impl RoomActor {
    /// Runs the actor loop until the quiz ends or every handle is gone.
    async fn run(mut self) {
        tracing::info!(
            id = %self.id,
            code = %self.code,
            title = %self.title,
            "room actor started"
        );

        loop {
            tokio::select! {
                cmd = self.receiver.recv() => match cmd {
                    Some(cmd) => {
                        if self.handle_command(cmd) {
                            break;
                        }
                    }
                    None => break,
                },
                event = self.countdown.wait() => {
                    self.handle_countdown(event);
                }
            }
        }

        tracing::info!(code = %self.code, "room actor stopped");
    }

    /// Processes one command. Returns `true` when the room is finished
    /// and the actor should stop.
    fn handle_command(&mut self, cmd: RoomCommand) -> bool {
        match cmd {
            RoomCommand::AddPlayer { name, sender, reply } => {
                let _ = reply.send(self.handle_add_player(name, sender));
            }
            RoomCommand::Start { reply } => {
                let _ = reply.send(self.handle_start());
            }
            RoomCommand::Answer {
                player_id,
                question_id,
                choice_index,
                reply,
            } => {
                let _ = reply.send(self.handle_answer(
                    player_id,
                    &question_id,
                    choice_index,
                ));
            }
            RoomCommand::Advance { reply } => {
                let (result, finished) = self.handle_advance();
                let _ = reply.send(result);
                return finished;
            }
            RoomCommand::End { reply } => {
                self.finish();
                let _ = reply.send(Ok(()));
                return true;
            }
            RoomCommand::DisconnectPlayer { player_id } => {
                self.handle_disconnect_player(player_id);
            }
            RoomCommand::DisconnectHost => {
                self.handle_disconnect_host();
            }
            RoomCommand::ReconnectPlayer {
                player_id,
                sender,
                reply,
            } => {
                let _ =
                    reply.send(self.handle_reconnect_player(player_id, sender));
            }
            RoomCommand::ReconnectHost { sender, reply } => {
                self.handle_reconnect_host(sender);
                let _ = reply.send(Ok(()));
            }
            RoomCommand::GraceExpired { player_id } => {
                self.handle_grace_expired(player_id);
            }
            RoomCommand::Snapshot { reply } => {
                let _ = reply.send(self.snapshot());
            }
        }
        false
    }

    // -- Join / start -----------------------------------------------------

    fn handle_add_player(
        &mut self,
        name: String,
        sender: OutboundSender,
    ) -> Result<(PlayerId, SessionToken), RoomError> {
        if !self.phase.allows_join() {
            return Err(RoomError::InvalidPhase {
                action: "join",
                phase: self.phase,
            });
        }

        let id = PlayerId(self.next_player_id);
        self.next_player_id += 1;
        let token = mint_token();

        self.players.insert(
            id,
            Player {
                id,
                name,
                token: token.clone(),
                disconnected: false,
                choice: None,
                grace: None,
            },
        );
        self.scores.insert(id, 0);
        self.broadcaster.insert_player(id, sender);

        tracing::info!(
            code = %self.code,
            player_id = %id,
            players = self.players.len(),
            "player joined"
        );

        // The joining player's copy carries their id; everyone else just
        // gets the refreshed roster.
        let roster = self.roster();
        self.broadcaster.send_player(
            id,
            ServerMessage::Joined {
                player_id: Some(id),
                players: roster.clone(),
            },
        );
        self.broadcaster.broadcast_except(
            id,
            &ServerMessage::Joined { player_id: None, players: roster },
        );

        Ok((id, token))
    }

    fn handle_start(&mut self) -> Result<(), RoomError> {
        if !self.phase.allows_start() {
            return Err(RoomError::InvalidPhase {
                action: "start",
                phase: self.phase,
            });
        }
        self.begin_question(0);
        Ok(())
    }

    /// Enters the `question` phase at `index`: resets answered markers,
    /// arms the countdown, and broadcasts the stripped question.
    fn begin_question(&mut self, index: usize) {
        let question = &self.questions[index];
        let public = PublicQuestion::from(question);
        let timer_sec = question.timer_sec;

        self.current = index;
        self.phase = QuizPhase::Question;
        for player in self.players.values_mut() {
            player.choice = None;
        }
        self.countdown.start(timer_sec);

        tracing::info!(
            code = %self.code,
            index,
            timer_sec,
            "question started"
        );

        self.broadcaster.broadcast(&ServerMessage::Question {
            question: public,
            index,
            total: self.questions.len(),
        });
    }

    // -- Answers and scoring ----------------------------------------------

    fn handle_answer(
        &mut self,
        player_id: PlayerId,
        question_id: &str,
        choice_index: usize,
    ) -> Result<(), RoomError> {
        if !self.phase.allows_answer() {
            return Err(RoomError::InvalidPhase {
                action: "answer",
                phase: self.phase,
            });
        }

        let question = &self.questions[self.current];
        if choice_index >= question.choices.len() {
            return Err(RoomError::InvalidChoice(choice_index));
        }
        // A stale id — an answer racing a phase change or a reconnect —
        // is dropped like a duplicate, not punished.
        if question.id != question_id {
            return Ok(());
        }
        let correct_index = question.correct_index;
        let timer_sec = question.timer_sec;
        let remaining = self.countdown.remaining();

        let player = self
            .players
            .get_mut(&player_id)
            .ok_or(RoomError::UnknownPlayer(player_id))?;

        // Exactly one scored answer per player per question: first write
        // wins, repeats are silently absorbed.
        if player.choice.is_some() {
            return Ok(());
        }
        player.choice = Some(choice_index);

        if choice_index == correct_index {
            let points = points_for_correct(remaining, timer_sec);
            *self.scores.entry(player_id).or_insert(0) += points;
            tracing::debug!(
                code = %self.code,
                player_id = %player_id,
                points,
                remaining,
                "correct answer"
            );
        } else {
            tracing::debug!(
                code = %self.code,
                player_id = %player_id,
                "incorrect answer"
            );
        }

        Ok(())
    }

    /// Closes the current question: builds the answer distribution,
    /// snapshots the results for resync, and broadcasts them.
    fn finish_question(&mut self) {
        let question = &self.questions[self.current];
        let correct_index = question.correct_index;
        let mut distribution = vec![0u32; question.choices.len()];

        for player in self.players.values() {
            if let Some(choice) = player.choice {
                distribution[choice] += 1;
            }
        }

        self.phase = QuizPhase::Results;
        let results = ServerMessage::Results {
            correct_index,
            distribution,
            scores: self.scores_by_name(),
        };
        self.last_results = Some(results.clone());

        tracing::info!(
            code = %self.code,
            index = self.current,
            answered = self.answered_count(),
            "question finished"
        );

        self.broadcaster.broadcast(&results);
    }

    // -- Advancing --------------------------------------------------------

    /// Handles `host:next`. Returns the reply plus whether the quiz just
    /// ended (which stops the actor).
    fn handle_advance(&mut self) -> (Result<(), RoomError>, bool) {
        if !self.phase.allows_advance() {
            return (
                Err(RoomError::InvalidPhase {
                    action: "advance",
                    phase: self.phase,
                }),
                false,
            );
        }

        match self.phase {
            QuizPhase::Results => {
                self.phase = QuizPhase::Leaderboard;
                self.broadcaster.broadcast(&ServerMessage::Leaderboard {
                    rankings: self.rankings(),
                });
                (Ok(()), false)
            }
            QuizPhase::Leaderboard => {
                let next = self.current + 1;
                if next < self.questions.len() {
                    self.begin_question(next);
                    (Ok(()), false)
                } else {
                    self.finish();
                    (Ok(()), true)
                }
            }
            // allows_advance() admits exactly the two phases above.
            _ => unreachable!("advance guard admitted phase {}", self.phase),
        }
    }

    /// Terminal transition: stops the countdown, cancels every grace
    /// task, tells everyone, and reports upward so the indices forget
    /// this room.
    fn finish(&mut self) {
        self.countdown.cancel();
        for player in self.players.values_mut() {
            if let Some(grace) = player.grace.take() {
                grace.abort();
            }
        }
        self.phase = QuizPhase::Ended;
        self.broadcaster.broadcast(&ServerMessage::Ended);
        let _ = self.events.send(RoomEvent::Ended { code: self.code.clone() });
        tracing::info!(code = %self.code, "quiz ended");
    }

    // -- Countdown --------------------------------------------------------

    fn handle_countdown(&mut self, event: CountdownEvent) {
        match event {
            CountdownEvent::Tick { remaining } => {
                self.broadcaster
                    .broadcast(&ServerMessage::Tick { remaining });
            }
            CountdownEvent::Expired => {
                // The countdown only runs during `question`.
                if self.phase.allows_answer() {
                    self.finish_question();
                }
            }
        }
    }

    // -- Disconnection and grace ------------------------------------------

    fn handle_disconnect_player(&mut self, player_id: PlayerId) {
        let grace = self.config.reconnect_grace;
        let Some(player) = self.players.get_mut(&player_id) else {
            return; // already removed
        };
        if player.disconnected {
            return;
        }

        player.disconnected = true;
        self.broadcaster.remove_player(player_id);

        // Schedule the permanent removal. The task is aborted the instant
        // the player reconnects; if it fires anyway (lost race), the
        // expiry handler re-checks the disconnected flag.
        let sender = self.self_sender.clone();
        let task = tokio::spawn(async move {
            tokio::time::sleep(grace).await;
            let _ = sender.send(RoomCommand::GraceExpired { player_id }).await;
        });
        player.grace = Some(task.abort_handle());

        tracing::info!(
            code = %self.code,
            player_id = %player_id,
            grace_secs = grace.as_secs(),
            "player disconnected, grace period started"
        );

        if self.phase == QuizPhase::Lobby {
            self.broadcaster.broadcast(&ServerMessage::Joined {
                player_id: None,
                players: self.roster(),
            });
        }
    }

    fn handle_disconnect_host(&mut self) {
        self.broadcaster.clear_host();
        if self.phase.allows_pause() && !self.countdown.is_paused() {
            self.countdown.pause();
            // Tell players so their countdown displays can halt.
            self.broadcaster.broadcast(&ServerMessage::Paused);
            tracing::info!(code = %self.code, "host disconnected, quiz paused");
        } else {
            tracing::info!(code = %self.code, "host disconnected");
        }
    }

    fn handle_grace_expired(&mut self, player_id: PlayerId) {
        let still_gone = self
            .players
            .get(&player_id)
            .is_some_and(|p| p.disconnected);
        if !still_gone {
            return; // reconnected before the expiry landed
        }

        if let Some(player) = self.players.remove(&player_id) {
            self.scores.remove(&player_id);
            self.broadcaster.remove_player(player_id);
            let _ = self.events.send(RoomEvent::PlayerExpired {
                code: self.code.clone(),
                token: player.token,
            });
            tracing::info!(
                code = %self.code,
                player_id = %player_id,
                "grace period elapsed, player removed"
            );

            if self.phase == QuizPhase::Lobby {
                self.broadcaster.broadcast(&ServerMessage::Joined {
                    player_id: None,
                    players: self.roster(),
                });
            }
        }
    }

    // -- Reconnection and resync ------------------------------------------

    fn handle_reconnect_player(
        &mut self,
        player_id: PlayerId,
        sender: OutboundSender,
    ) -> Result<(), RoomError> {
        let Some(player) = self.players.get_mut(&player_id) else {
            // Token resolved at the router but the grace period won the
            // race — the session is gone.
            return Err(RoomError::UnknownPlayer(player_id));
        };

        if let Some(grace) = player.grace.take() {
            grace.abort();
        }
        player.disconnected = false;
        self.broadcaster.insert_player(player_id, sender);

        tracing::info!(
            code = %self.code,
            player_id = %player_id,
            phase = %self.phase,
            "player reconnected"
        );

        self.resync_player(player_id);
        Ok(())
    }

    fn handle_reconnect_host(&mut self, sender: OutboundSender) {
        self.broadcaster.set_host(sender);

        // Resume before resync so the host never sees a stale pause.
        if self.countdown.is_paused() {
            self.countdown.resume();
            tracing::info!(code = %self.code, "host reconnected, quiz resumed");
        } else {
            tracing::info!(code = %self.code, "host reconnected");
        }

        self.broadcaster.send_host(ServerMessage::Sync {
            phase: self.phase,
            data: quizcast_protocol::SyncData {
                quiz_code: self.code.clone(),
                // Tokens are issued once, at creation — never reissued.
                session_token: None,
            },
        });
        for msg in self.phase_view() {
            self.broadcaster.send_host(msg);
        }
    }

    /// Replays the current phase to one reconnected player: exactly the
    /// state they would hold had they never disconnected. Derived from
    /// current state only — there is no message replay log.
    fn resync_player(&mut self, player_id: PlayerId) {
        if self.phase == QuizPhase::Lobby {
            // The roster changed by coming back; everyone gets the update,
            // the returning player's copy carries their id.
            let roster = self.roster();
            self.broadcaster.send_player(
                player_id,
                ServerMessage::Joined {
                    player_id: Some(player_id),
                    players: roster.clone(),
                },
            );
            self.broadcaster.broadcast_except(
                player_id,
                &ServerMessage::Joined { player_id: None, players: roster },
            );
            return;
        }

        for msg in self.phase_view() {
            self.broadcaster.send_player(player_id, msg);
        }
    }

    /// The messages that reconstruct the current phase for a reconnecting
    /// participant (non-lobby phases).
    fn phase_view(&self) -> Vec<ServerMessage> {
        match self.phase {
            QuizPhase::Lobby => vec![ServerMessage::Joined {
                player_id: None,
                players: self.roster(),
            }],
            QuizPhase::Question => {
                let question = &self.questions[self.current];
                let mut msgs = vec![
                    ServerMessage::Question {
                        question: PublicQuestion::from(question),
                        index: self.current,
                        total: self.questions.len(),
                    },
                    ServerMessage::Tick {
                        remaining: self.countdown.remaining(),
                    },
                ];
                if self.countdown.is_paused() {
                    msgs.push(ServerMessage::Paused);
                }
                msgs
            }
            QuizPhase::Results => {
                // Always Some in this phase — finish_question set it.
                self.last_results.clone().into_iter().collect()
            }
            QuizPhase::Leaderboard => vec![ServerMessage::Leaderboard {
                rankings: self.rankings(),
            }],
            QuizPhase::Ended => vec![ServerMessage::Ended],
        }
    }

    // -- Derived views ----------------------------------------------------

    /// Connected players' names, in join order.
    fn roster(&self) -> Vec<String> {
        let mut connected: Vec<&Player> = self
            .players
            .values()
            .filter(|p| !p.disconnected)
            .collect();
        connected.sort_by_key(|p| p.id);
        connected.iter().map(|p| p.name.clone()).collect()
    }

    /// Standings sorted by descending score; equal scores keep join order.
    fn rankings(&self) -> Vec<Ranking> {
        let mut rows: Vec<(&Player, u32)> = self
            .players
            .values()
            .map(|p| (p, self.scores.get(&p.id).copied().unwrap_or(0)))
            .collect();
        rows.sort_by(|(pa, sa), (pb, sb)| sb.cmp(sa).then(pa.id.cmp(&pb.id)));
        rows.into_iter()
            .map(|(p, score)| Ranking { name: p.name.clone(), score })
            .collect()
    }

    fn scores_by_name(&self) -> HashMap<String, u32> {
        self.players
            .values()
            .map(|p| {
                (
                    p.name.clone(),
                    self.scores.get(&p.id).copied().unwrap_or(0),
                )
            })
            .collect()
    }

    fn answered_count(&self) -> usize {
        self.players.values().filter(|p| p.choice.is_some()).count()
    }

    fn snapshot(&self) -> RoomSnapshot {
        let mut players: Vec<PlayerSnapshot> = self
            .players
            .values()
            .map(|p| PlayerSnapshot {
                id: p.id,
                name: p.name.clone(),
                connected: !p.disconnected,
                score: self.scores.get(&p.id).copied().unwrap_or(0),
            })
            .collect();
        players.sort_by_key(|p| p.id);

        RoomSnapshot {
            id: self.id,
            title: self.title.clone(),
            phase: self.phase,
            current: self.current,
            total: self.questions.len(),
            remaining: self.countdown.remaining(),
            paused: self.countdown.is_paused(),
            answered: self.answered_count(),
            players,
        }
    }
}

/// Spawns a new room actor task and returns a handle to it.
///
/// The host's outbound channel is attached from the start; players arrive
/// through [`RoomHandle::add_player`]. Room events (expiries, the end of
/// the quiz) flow out on `events`.
pub(crate) fn spawn_room(
    id: RoomId,
    code: RoomCode,
    title: String,
    questions: Vec<QuizQuestion>,
    host_sender: OutboundSender,
    config: RoomConfig,
    events: mpsc::UnboundedSender<RoomEvent>,
) -> RoomHandle {
    let (tx, rx) = mpsc::channel(config.command_buffer);

    let mut broadcaster = Broadcaster::new();
    broadcaster.set_host(host_sender);

    let actor = RoomActor {
        id,
        code: code.clone(),
        title,
        phase: QuizPhase::Lobby,
        questions,
        current: 0,
        players: HashMap::new(),
        scores: HashMap::new(),
        last_results: None,
        broadcaster,
        countdown: Countdown::idle(),
        next_player_id: 1,
        config,
        receiver: rx,
        self_sender: tx.clone(),
        events,
    };

    tokio::spawn(actor.run());

    RoomHandle { code, sender: tx }
}
