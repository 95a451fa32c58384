//! Socket-based [`TransportClient`](crate::transport::TransportClient).
//!
//! A worker thread owns the connection to the logging backend, encodes
//! packets as length-prefixed MessagePack frames and reconnects with
//! jittered exponential backoff after failures. Callers enqueue packets on a
//! bounded channel and never block on the network, except for
//! `create_session`, which waits for the correlated reply up to its timeout.

pub(crate) mod backoff;
mod builder;
mod client;
pub(crate) mod codec;
mod config;
mod endpoint;
mod worker;


pub use builder::{BackoffOverrides, SocketTransportBuilder};
pub use client::SocketTransportClient;
pub use config::{
    BackoffPolicy, DEFAULT_BACKEND_PORT, DEFAULT_CHANNEL_CAPACITY, DEFAULT_CONNECT_TIMEOUT,
    DEFAULT_MAX_FRAME_SIZE, DEFAULT_WRITE_TIMEOUT, SocketTransportConfig,
};
pub use endpoint::{SocketEndpoint, TcpEndpoint, TlsOptions, UnixEndpoint};
