//! [`TransportClient`] backed by the socket worker.

use std::{
    io,
    sync::atomic::{AtomicU64, Ordering},
    thread,
    time::{Duration, Instant},
};

use crossbeam_channel::{RecvTimeoutError, Sender, SendTimeoutError, bounded};
use log::warn;
use parking_lot::{Mutex, RwLock};

use crate::{
    packet::{ClientPacket, ServerPacket},
    rate_limited_warner::RateLimitedWarner,
    session::SessionHandle,
    transport::{TransportClient, TransportError},
};

use super::{
    config::SocketTransportConfig,
    endpoint::SocketEndpoint,
    worker::{Command, enqueue, enqueue_blocking, flush_queue, spawn_worker},
};

/// Sends packets to the backend over TCP, TLS or a Unix socket.
pub struct SocketTransportClient {
    tx: RwLock<Option<Sender<Command>>>,
    handle: Mutex<Option<thread::JoinHandle<()>>>,
    next_request_id: AtomicU64,
    warner: RateLimitedWarner,
    flush_timeout: Duration,
}

impl SocketTransportClient {
    /// Connect lazily to `endpoint` with default settings.
    pub fn new(endpoint: SocketEndpoint) -> io::Result<Self> {
        Self::with_config(SocketTransportConfig::default().with_endpoint(endpoint))
    }

    /// Start the worker thread for `config`.
    pub fn with_config(config: SocketTransportConfig) -> io::Result<Self> {
        let flush_timeout = config.write_timeout;
        let warner = RateLimitedWarner::new(config.warn_interval);
        let (tx, handle) = spawn_worker(config)?;
        Ok(Self {
            tx: RwLock::new(Some(tx)),
            handle: Mutex::new(Some(handle)),
            next_request_id: AtomicU64::new(1),
            warner,
            flush_timeout,
        })
    }

    /// Wait until every queued packet has been written.
    pub fn flush(&self) -> bool {
        let Some(tx) = self.sender() else {
            return false;
        };
        self.warner.flush(|count| {
            warn!("relaylog socket transport dropped {count} packets in the last interval");
        });
        flush_queue(&tx, self.flush_timeout)
    }

    /// Drain the queue and stop the worker.
    pub fn close(&self) {
        let Some(tx) = self.tx.write().take() else {
            return;
        };
        let (ack_tx, ack_rx) = bounded(1);
        if tx.send(Command::Shutdown(ack_tx)).is_ok() {
            let _ = ack_rx.recv_timeout(self.flush_timeout);
        }
        drop(tx);
        let Some(handle) = self.handle.lock().take() else {
            return;
        };
        if handle.join().is_err() {
            warn!("relaylog socket transport worker panicked");
        }
    }

    fn sender(&self) -> Option<Sender<Command>> {
        self.tx.read().clone()
    }
}

impl TransportClient for SocketTransportClient {
    fn create_session(
        &self,
        path: &str,
        timeout: Duration,
    ) -> Result<SessionHandle, TransportError> {
        let tx = self.sender().ok_or(TransportError::Closed)?;
        let deadline = Instant::now() + timeout;
        let request_id = self.next_request_id.fetch_add(1, Ordering::Relaxed);
        let (reply_tx, reply_rx) = bounded(1);
        let command = Command::Request {
            packet: ClientPacket::CreateLogger {
                request_id,
                path: path.to_owned(),
            },
            request_id,
            deadline,
            reply: reply_tx,
        };
        match tx.send_timeout(command, timeout) {
            Ok(()) => {}
            Err(SendTimeoutError::Timeout(_)) => return Err(TransportError::Timeout(timeout)),
            Err(SendTimeoutError::Disconnected(_)) => return Err(TransportError::Closed),
        }
        let remaining = deadline.saturating_duration_since(Instant::now());
        match reply_rx.recv_timeout(remaining) {
            Ok(ServerPacket::LoggerCreated { handle, .. }) if handle.is_valid() => Ok(handle),
            Ok(ServerPacket::LoggerCreated { .. }) => Err(TransportError::NoHandle {
                path: path.to_owned(),
            }),
            // The worker drops the reply sender when delivery fails, which
            // surfaces here as a disconnect before the deadline.
            Err(RecvTimeoutError::Timeout | RecvTimeoutError::Disconnected) => {
                Err(TransportError::Timeout(timeout))
            }
        }
    }

    fn send(&self, packet: ClientPacket) -> Result<(), TransportError> {
        let tx = self.sender().ok_or(TransportError::Closed)?;
        enqueue(&tx, packet, &self.warner)
    }

    fn send_blocking(&self, packet: ClientPacket, timeout: Duration) -> Result<(), TransportError> {
        let tx = self.sender().ok_or(TransportError::Closed)?;
        enqueue_blocking(&tx, packet, timeout)
    }
}

impl Drop for SocketTransportClient {
    fn drop(&mut self) {
        self.close();
    }
}

impl std::fmt::Debug for SocketTransportClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SocketTransportClient")
            .field("open", &self.tx.read().is_some())
            .field("flush_timeout", &self.flush_timeout)
            .finish()
    }
}
