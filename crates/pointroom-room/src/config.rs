//! Room configuration.

/// Default capacity of each room actor's command channel.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 64;

/// Settings applied to every room the registry creates.
#[derive(Debug, Clone)]
pub struct RoomConfig {
    /// Capacity of the room actor's command channel. When full, callers
    /// wait (bounded channel backpressure) rather than drop commands.
    pub channel_capacity: usize,
}

impl Default for RoomConfig {
    fn default() -> Self {
        Self {
            channel_capacity: DEFAULT_CHANNEL_CAPACITY,
        }
    }
}
