//! Fan-out of server messages to a room's connected participants.

use std::collections::HashMap;

use quizcast_protocol::{PlayerId, ServerMessage};
use tokio::sync::mpsc;

/// Channel sender delivering outbound messages to one connection's pump.
pub type OutboundSender = mpsc::UnboundedSender<ServerMessage>;

/// Sends messages to a room's currently-connected participants.
///
/// Holds one outbound channel per live connection (host and players) and
/// silently skips anyone without one — a missed recipient catches up via
/// the reconnect resync, so delivery never errors and never blocks the
/// room.
#[derive(Debug, Default)]
pub struct Broadcaster {
    host: Option<OutboundSender>,
    players: HashMap<PlayerId, OutboundSender>,
}

impl Broadcaster {
    /// Creates a broadcaster with no connected participants.
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds (or rebinds) the host connection.
    pub fn set_host(&mut self, sender: OutboundSender) {
        self.host = Some(sender);
    }

    /// Detaches the host connection.
    pub fn clear_host(&mut self) {
        self.host = None;
    }

    /// Whether a host connection is currently attached.
    pub fn host_connected(&self) -> bool {
        self.host.is_some()
    }

    /// Binds (or rebinds) a player's connection.
    pub fn insert_player(&mut self, player_id: PlayerId, sender: OutboundSender) {
        self.players.insert(player_id, sender);
    }

    /// Detaches a player's connection.
    pub fn remove_player(&mut self, player_id: PlayerId) {
        self.players.remove(&player_id);
    }

    /// Sends to the host, if connected.
    pub fn send_host(&self, msg: ServerMessage) {
        if let Some(host) = &self.host {
            let _ = host.send(msg);
        }
    }

    /// Sends to one player, if connected.
    pub fn send_player(&self, player_id: PlayerId, msg: ServerMessage) {
        if let Some(sender) = self.players.get(&player_id) {
            let _ = sender.send(msg);
        }
    }

    /// Fans out to every connected participant: host plus players.
    pub fn broadcast(&self, msg: &ServerMessage) {
        self.send_host(msg.clone());
        for sender in self.players.values() {
            let _ = sender.send(msg.clone());
        }
    }

    /// Fans out to every connected player except one — used for roster
    /// updates where the new player gets a private copy carrying their id.
    pub fn broadcast_except(&self, skip: PlayerId, msg: &ServerMessage) {
        self.send_host(msg.clone());
        for (pid, sender) in &self.players {
            if *pid != skip {
                let _ = sender.send(msg.clone());
            }
        }
    }
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use quizcast_protocol::ServerMessage;
    use tokio::sync::mpsc::unbounded_channel;

    fn tick(n: u32) -> ServerMessage {
        ServerMessage::Tick { remaining: n }
    }

    #[test]
    fn test_broadcast_reaches_host_and_players() {
        let mut b = Broadcaster::new();
        let (host_tx, mut host_rx) = unbounded_channel();
        let (p1_tx, mut p1_rx) = unbounded_channel();
        b.set_host(host_tx);
        b.insert_player(PlayerId(1), p1_tx);

        b.broadcast(&tick(5));

        assert_eq!(host_rx.try_recv().unwrap(), tick(5));
        assert_eq!(p1_rx.try_recv().unwrap(), tick(5));
    }

    #[test]
    fn test_broadcast_skips_disconnected_participants() {
        let mut b = Broadcaster::new();
        let (p1_tx, mut p1_rx) = unbounded_channel();
        b.insert_player(PlayerId(1), p1_tx);
        // No host attached, player 2 never connected: both skipped,
        // nothing panics, nothing errors.
        b.broadcast(&tick(3));

        assert_eq!(p1_rx.try_recv().unwrap(), tick(3));
    }

    #[test]
    fn test_broadcast_survives_dropped_receiver() {
        let mut b = Broadcaster::new();
        let (p1_tx, p1_rx) = unbounded_channel();
        b.insert_player(PlayerId(1), p1_tx);
        drop(p1_rx); // connection task died without telling us

        b.broadcast(&tick(1)); // must not panic
    }

    #[test]
    fn test_send_player_targets_exactly_one() {
        let mut b = Broadcaster::new();
        let (p1_tx, mut p1_rx) = unbounded_channel();
        let (p2_tx, mut p2_rx) = unbounded_channel();
        b.insert_player(PlayerId(1), p1_tx);
        b.insert_player(PlayerId(2), p2_tx);

        b.send_player(PlayerId(2), tick(9));

        assert!(p1_rx.try_recv().is_err());
        assert_eq!(p2_rx.try_recv().unwrap(), tick(9));
    }

    #[test]
    fn test_broadcast_except_skips_that_player_only() {
        let mut b = Broadcaster::new();
        let (host_tx, mut host_rx) = unbounded_channel();
        let (p1_tx, mut p1_rx) = unbounded_channel();
        let (p2_tx, mut p2_rx) = unbounded_channel();
        b.set_host(host_tx);
        b.insert_player(PlayerId(1), p1_tx);
        b.insert_player(PlayerId(2), p2_tx);

        b.broadcast_except(PlayerId(1), &tick(7));

        assert_eq!(host_rx.try_recv().unwrap(), tick(7));
        assert!(p1_rx.try_recv().is_err());
        assert_eq!(p2_rx.try_recv().unwrap(), tick(7));
    }

    #[test]
    fn test_remove_player_stops_delivery() {
        let mut b = Broadcaster::new();
        let (p1_tx, mut p1_rx) = unbounded_channel();
        b.insert_player(PlayerId(1), p1_tx);
        b.remove_player(PlayerId(1));

        b.broadcast(&tick(2));

        assert!(p1_rx.try_recv().is_err());
    }

    #[test]
    fn test_host_connected_tracks_attachment() {
        let mut b = Broadcaster::new();
        assert!(!b.host_connected());
        let (host_tx, _host_rx) = unbounded_channel();
        b.set_host(host_tx);
        assert!(b.host_connected());
        b.clear_host();
        assert!(!b.host_connected());
    }
}
