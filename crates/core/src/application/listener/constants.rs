// Listener constants (no magic values)
use std::time::Duration;

/// Messages requested per receive call
pub const RECEIVE_BATCH_SIZE: i32 = 4;

/// Long-poll wait per receive call (seconds)
pub const RECEIVE_WAIT_SECONDS: i32 = 10;

/// Capacity of the poller -> dispatcher channel
/// Small on purpose: it bounds how far polling runs ahead of processing
pub const INBOUND_CHANNEL_CAPACITY: usize = 2;

/// Default cap on concurrently running handlers
pub const DEFAULT_MAX_CONCURRENT: usize = 2;

/// Database reachability attempts before startup is abandoned
pub const DB_CONNECT_MAX_ATTEMPTS: u32 = 10;

/// Pause between database reachability attempts (1s)
pub const DB_CONNECT_INTERVAL: Duration = Duration::from_secs(1);

/// Grace period for the HTTP server on shutdown (10s)
pub const SHUTDOWN_GRACE_PERIOD: Duration = Duration::from_secs(10);
