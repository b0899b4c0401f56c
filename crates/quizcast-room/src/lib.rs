//! Quiz room lifecycle for Quizcast.
//!
//! Each room runs as an isolated Tokio task (actor model) that owns one
//! quiz: its phase, question set, roster, scores, and countdown. Commands
//! arrive on an mpsc channel; the countdown and per-player grace timers
//! feed the same loop, so everything that touches a room's state runs to
//! completion without interleaving — the only concurrency is *between*
//! rooms.
//!
//! # Key types
//!
//! - [`RoomHandle`] — send operations to a running room actor
//! - [`RoomRegistry`] — creates rooms, allocates unique join codes
//! - [`RoomEvent`] — what a room reports upward (player expired, ended)
//! - [`Broadcaster`] — fan-out to connected participants
//! - [`RoomConfig`] — room settings (reconnect grace period, buffers)

mod broadcast;
mod config;
mod error;
mod registry;
mod room;
mod score;

pub use broadcast::{Broadcaster, OutboundSender};
pub use config::RoomConfig;
pub use error::RoomError;
pub use registry::RoomRegistry;
pub use room::{
    PlayerSnapshot, RoomEvent, RoomHandle, RoomId, RoomSnapshot,
};
pub use score::points_for_correct;
