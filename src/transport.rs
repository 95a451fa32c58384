//! Contract between the logging core and whatever reaches the backend.

use std::{io, time::Duration};

use thiserror::Error;

use crate::{packet::ClientPacket, session::SessionHandle};

/// Failures reported by a [`TransportClient`].
#[derive(Debug, Error)]
pub enum TransportError {
    /// The outbound queue is full.
    #[error("transport queue is full")]
    QueueFull,
    /// The transport has been closed.
    #[error("transport is closed")]
    Closed,
    /// No reply arrived before the deadline.
    #[error("no reply within {0:?}")]
    Timeout(Duration),
    /// The backend answered with the invalid handle.
    #[error("backend did not return a handle for {path}")]
    NoHandle { path: String },
    /// Underlying socket or encoding failure.
    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Client able to talk to the logging backend.
///
/// Implementations must be callable from any thread. `send` must not block on
/// the network; `create_session` and `send_blocking` may block up to
/// `timeout`.
pub trait TransportClient: Send + Sync {
    /// Request a new session for `path`, waiting at most `timeout`.
    ///
    /// A reply carrying [`SessionHandle::INVALID`] is reported as
    /// [`TransportError::NoHandle`].
    fn create_session(&self, path: &str, timeout: Duration)
    -> Result<SessionHandle, TransportError>;

    /// Queue a fire-and-forget packet.
    fn send(&self, packet: ClientPacket) -> Result<(), TransportError>;

    /// Queue a packet, waiting up to `timeout` for room in a bounded queue.
    ///
    /// Used when draining the backlog buffered before connection, where a
    /// full queue must not lose entries. Transports without a bounded queue
    /// can rely on the default, which is [`TransportClient::send`].
    fn send_blocking(&self, packet: ClientPacket, timeout: Duration) -> Result<(), TransportError> {
        let _ = timeout;
        self.send(packet)
    }
}

impl<T: TransportClient + ?Sized> TransportClient for std::sync::Arc<T> {
    fn create_session(
        &self,
        path: &str,
        timeout: Duration,
    ) -> Result<SessionHandle, TransportError> {
        (**self).create_session(path, timeout)
    }

    fn send(&self, packet: ClientPacket) -> Result<(), TransportError> {
        (**self).send(packet)
    }

    fn send_blocking(&self, packet: ClientPacket, timeout: Duration) -> Result<(), TransportError> {
        (**self).send_blocking(packet, timeout)
    }
}
