//! Room configuration.

use std::time::Duration;

/// Settings for every room a registry spawns.
#[derive(Debug, Clone)]
pub struct RoomConfig {
    /// How long a disconnected player's slot and score are preserved
    /// before they are permanently removed.
    ///
    /// Default: 30 seconds.
    pub reconnect_grace: Duration,

    /// Capacity of each room's command channel. When full, senders wait —
    /// backpressure, not loss.
    pub command_buffer: usize,
}

impl Default for RoomConfig {
    fn default() -> Self {
        Self {
            reconnect_grace: Duration::from_secs(30),
            command_buffer: 64,
        }
    }
}
