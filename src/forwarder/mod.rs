//! Buffered forwarding state machine.
//!
//! [`BufferedForwarder`] accepts writes and clears from any thread. Until the
//! session handle is known they accumulate in a [`PendingBuffer`]; the
//! resolver then hands over the handle through
//! [`BufferedForwarder::on_handle_resolved`], which drains the buffer exactly
//! once and switches every later call to direct forwarding.
//!
//! The buffer lives behind a `parking_lot::Mutex` and is replaced by `None`
//! when drained. The drain takes the buffered entries in batches and sends
//! each batch with the lock released, so a transport that logs (or panics
//! into the panic hook) while sending cannot deadlock on the buffer. Entries
//! submitted during a batch land in the next one. The handle is published in
//! a `OnceCell` only once a batch comes back empty, under the lock, so a
//! caller that observes the handle without locking can never overtake a
//! buffered entry.

mod pending;


use std::mem;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;

use log::warn;
use once_cell::sync::OnceCell;
use parking_lot::Mutex;

use crate::{
    entry::LogEntry,
    packet::ClientPacket,
    rate_limited_warner::RateLimitedWarner,
    session::SessionHandle,
    transport::{TransportClient, TransportError},
};

pub use pending::PendingBuffer;

/// How long a drain waits for room in the transport queue per packet.
pub const DRAIN_SEND_TIMEOUT: Duration = Duration::from_secs(5);

/// Observable connection state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConnectionState {
    Unconnected,
    Connected(SessionHandle),
}

/// Routes entries to the transport, buffering them until a handle exists.
pub struct BufferedForwarder {
    transport: Arc<dyn TransportClient>,
    handle: OnceCell<SessionHandle>,
    pending: Mutex<Option<PendingBuffer>>,
    draining: AtomicBool,
    failed_sends: AtomicU64,
    warner: RateLimitedWarner,
}

impl BufferedForwarder {
    pub fn new(transport: Arc<dyn TransportClient>) -> Self {
        Self {
            transport,
            handle: OnceCell::new(),
            pending: Mutex::new(Some(PendingBuffer::new())),
            draining: AtomicBool::new(false),
            failed_sends: AtomicU64::new(0),
            warner: RateLimitedWarner::default(),
        }
    }

    pub fn state(&self) -> ConnectionState {
        match self.handle.get() {
            Some(handle) => ConnectionState::Connected(*handle),
            None => ConnectionState::Unconnected,
        }
    }

    pub fn is_connected(&self) -> bool {
        self.handle.get().is_some()
    }

    /// Handle in use, or [`SessionHandle::INVALID`] before connection.
    pub fn session_handle(&self) -> SessionHandle {
        self.handle.get().copied().unwrap_or(SessionHandle::INVALID)
    }

    /// Number of entries currently waiting for the handle.
    pub fn pending_len(&self) -> usize {
        self.pending.lock().as_ref().map_or(0, PendingBuffer::len)
    }

    /// Number of packets the transport refused since construction.
    pub fn failed_sends(&self) -> u64 {
        self.failed_sends.load(Ordering::Relaxed)
    }

    /// Forward `entry`, or buffer it while unconnected.
    pub fn submit_write(&self, entry: LogEntry) {
        if let Some(handle) = self.handle.get() {
            self.forward_write(*handle, entry);
            return;
        }
        let mut pending = self.pending.lock();
        if let Some(buffer) = pending.as_mut() {
            buffer.push(entry);
            return;
        }
        drop(pending);
        // The drain ran while we waited for the lock.
        self.forward_write(self.session_handle(), entry);
    }

    /// Clear the backend log, or everything buffered so far.
    pub fn submit_clear(&self) {
        if let Some(handle) = self.handle.get() {
            self.forward(ClientPacket::ClearLogger { handle: *handle });
            return;
        }
        let mut pending = self.pending.lock();
        if let Some(buffer) = pending.as_mut() {
            buffer.request_clear();
            return;
        }
        drop(pending);
        self.forward(ClientPacket::ClearLogger {
            handle: self.session_handle(),
        });
    }

    /// Ask the backend to watch process `pid`.
    ///
    /// Returns `false` while unconnected; watch requests are not buffered.
    pub fn submit_watch(&self, pid: u32) -> bool {
        let Some(handle) = self.handle.get() else {
            warn!("relaylog: cannot watch process {pid} before the session is established");
            return false;
        };
        self.forward(ClientPacket::WatchProcess {
            handle: *handle,
            pid,
        })
    }

    /// Install `handle` and drain the pending buffer.
    ///
    /// Returns `true` when this call performed the transition. Invalid
    /// handles and repeated calls are ignored. Buffered packets wait for room
    /// in the transport queue; once one of them times out the rest of the
    /// backlog is offered without waiting.
    pub fn on_handle_resolved(&self, handle: SessionHandle) -> bool {
        if !handle.is_valid() {
            warn!("relaylog: ignoring invalid session handle");
            return false;
        }
        if self.draining.swap(true, Ordering::AcqRel) {
            warn!("relaylog: session handle already installed; ignoring {handle}");
            return false;
        }
        let mut stalled = false;
        loop {
            let batch = {
                let mut pending = self.pending.lock();
                let Some(buffer) = pending.as_mut() else {
                    return false;
                };
                if buffer.is_empty() && !buffer.clear_requested() {
                    *pending = None;
                    // Only the draining call publishes, so the cell is empty.
                    let _ = self.handle.set(handle);
                    return true;
                }
                mem::take(buffer)
            };
            self.drain_batch(handle, batch, &mut stalled);
        }
    }

    fn drain_batch(&self, handle: SessionHandle, batch: PendingBuffer, stalled: &mut bool) {
        let (clear_requested, entries) = batch.into_parts();
        let packets = clear_requested
            .then_some(ClientPacket::ClearLogger { handle })
            .into_iter()
            .chain(entries.into_iter().map(|entry| ClientPacket::WriteMessage {
                handle,
                text: entry.into_string(),
            }));
        for packet in packets {
            let result = if *stalled {
                self.transport.send(packet)
            } else {
                self.transport.send_blocking(packet, DRAIN_SEND_TIMEOUT)
            };
            if let Err(err) = result {
                *stalled |= matches!(err, TransportError::Timeout(_));
                self.record_failure(&err);
            }
        }
    }

    fn forward_write(&self, handle: SessionHandle, entry: LogEntry) {
        self.forward(ClientPacket::WriteMessage {
            handle,
            text: entry.into_string(),
        });
    }

    fn forward(&self, packet: ClientPacket) -> bool {
        match self.transport.send(packet) {
            Ok(()) => true,
            Err(err) => {
                self.record_failure(&err);
                false
            }
        }
    }

    fn record_failure(&self, err: &TransportError) {
        self.failed_sends.fetch_add(1, Ordering::Relaxed);
        self.warner.record_drop();
        self.warner.warn_if_due(|count| {
            warn!("relaylog: transport refused {count} packets; last error: {err}");
        });
    }
}

impl std::fmt::Debug for BufferedForwarder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BufferedForwarder")
            .field("state", &self.state())
            .field("failed_sends", &self.failed_sends())
            .finish()
    }
}
