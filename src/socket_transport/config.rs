//! Configuration consumed by the socket transport worker.
//!
//! [`SocketTransportBuilder`](super::SocketTransportBuilder) validates user
//! input and produces these values.

use std::time::Duration;

use crate::rate_limited_warner::DEFAULT_WARN_INTERVAL;

use super::endpoint::{SocketEndpoint, TcpEndpoint};

/// Default bounded channel capacity of the outbound queue.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 1024;
/// Default connection timeout applied when establishing sockets.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);
/// Default write timeout applied to socket writes.
pub const DEFAULT_WRITE_TIMEOUT: Duration = Duration::from_secs(1);
/// Default maximum frame payload in bytes.
pub const DEFAULT_MAX_FRAME_SIZE: usize = 1 << 20; // 1 MiB
/// Default base delay for exponential backoff retries.
pub const DEFAULT_BACKOFF_BASE: Duration = Duration::from_millis(100);
/// Default maximum delay for exponential backoff retries.
pub const DEFAULT_BACKOFF_CAP: Duration = Duration::from_secs(10);
/// Default duration of healthy writes that resets backoff state.
pub const DEFAULT_BACKOFF_RESET: Duration = Duration::from_secs(30);
/// Default absolute deadline for reconnection attempts.
pub const DEFAULT_BACKOFF_DEADLINE: Duration = Duration::from_secs(120);
/// Default TCP port of the logging backend.
pub const DEFAULT_BACKEND_PORT: u16 = 9021;

/// Settings for one [`SocketTransportClient`](super::SocketTransportClient).
#[derive(Clone, Debug)]
pub struct SocketTransportConfig {
    pub capacity: usize,
    pub connect_timeout: Duration,
    pub write_timeout: Duration,
    pub max_frame_size: usize,
    pub endpoint: SocketEndpoint,
    pub backoff: BackoffPolicy,
    pub warn_interval: Duration,
}

/// Defaults point at a backend on localhost; callers normally override the
/// endpoint through the builder.
impl Default for SocketTransportConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CHANNEL_CAPACITY,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            write_timeout: DEFAULT_WRITE_TIMEOUT,
            max_frame_size: DEFAULT_MAX_FRAME_SIZE,
            endpoint: SocketEndpoint::Tcp(TcpEndpoint {
                host: "localhost".into(),
                port: DEFAULT_BACKEND_PORT,
                tls: None,
            }),
            backoff: BackoffPolicy::default(),
            warn_interval: DEFAULT_WARN_INTERVAL,
        }
    }
}

impl SocketTransportConfig {
    /// Override the endpoint.
    pub fn with_endpoint(mut self, endpoint: SocketEndpoint) -> Self {
        self.endpoint = endpoint;
        self
    }
}

/// Exponential backoff policy for reconnection attempts.
#[derive(Clone, Debug)]
pub struct BackoffPolicy {
    pub base: Duration,
    pub cap: Duration,
    pub reset_after: Duration,
    pub deadline: Duration,
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self {
            base: DEFAULT_BACKOFF_BASE,
            cap: DEFAULT_BACKOFF_CAP,
            reset_after: DEFAULT_BACKOFF_RESET,
            deadline: DEFAULT_BACKOFF_DEADLINE,
        }
    }
}
