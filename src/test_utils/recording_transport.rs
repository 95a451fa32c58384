//! In-memory transport that records every packet it is given.
//!
//! Session creation is scriptable so tests can hold the resolver back, let it
//! time out, or make it fail outright.

use std::{
    sync::atomic::{AtomicBool, AtomicUsize, Ordering},
    thread,
    time::Duration,
};

use crossbeam_channel::{Receiver, Sender, bounded};
use parking_lot::Mutex;

use crate::{
    packet::ClientPacket,
    session::SessionHandle,
    transport::{TransportClient, TransportError},
};

/// Simplified view of a recorded packet for ordering assertions.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Recorded {
    Write(String),
    Clear,
    Watch(u32),
}

enum Resolution {
    Immediate(SessionHandle),
    Gated(Receiver<SessionHandle>),
    Never,
    Fail,
}

/// Releases a gated [`RecordingTransport`] with the chosen handle.
#[derive(Clone)]
pub struct ResolveGate {
    tx: Sender<SessionHandle>,
}

impl ResolveGate {
    /// Let the pending `create_session` call return `handle`.
    pub fn release(&self, handle: SessionHandle) {
        let _ = self.tx.send(handle);
    }
}

/// [`TransportClient`] that stores packets in memory.
pub struct RecordingTransport {
    packets: Mutex<Vec<ClientPacket>>,
    resolution: Mutex<Resolution>,
    create_calls: AtomicUsize,
    blocking_sends: AtomicUsize,
    refuse_sends: AtomicBool,
}

impl RecordingTransport {
    fn with_resolution(resolution: Resolution) -> Self {
        Self {
            packets: Mutex::new(Vec::new()),
            resolution: Mutex::new(resolution),
            create_calls: AtomicUsize::new(0),
            blocking_sends: AtomicUsize::new(0),
            refuse_sends: AtomicBool::new(false),
        }
    }

    /// Resolve every session request immediately with `handle`.
    pub fn resolving(handle: SessionHandle) -> Self {
        Self::with_resolution(Resolution::Immediate(handle))
    }

    /// Block session requests until the returned gate is released.
    pub fn gated() -> (Self, ResolveGate) {
        let (tx, rx) = bounded(1);
        (
            Self::with_resolution(Resolution::Gated(rx)),
            ResolveGate { tx },
        )
    }

    /// Never answer; every request runs into its timeout.
    pub fn never_resolving() -> Self {
        Self::with_resolution(Resolution::Never)
    }

    /// Answer every request with an error.
    pub fn failing() -> Self {
        Self::with_resolution(Resolution::Fail)
    }

    /// Make subsequent `send` calls fail with [`TransportError::Closed`].
    pub fn refuse_sends(&self, refuse: bool) {
        self.refuse_sends.store(refuse, Ordering::SeqCst);
    }

    /// Number of `create_session` calls observed.
    pub fn create_calls(&self) -> usize {
        self.create_calls.load(Ordering::SeqCst)
    }

    /// Number of packets offered through `send_blocking`.
    pub fn blocking_sends(&self) -> usize {
        self.blocking_sends.load(Ordering::SeqCst)
    }

    pub fn packets(&self) -> Vec<ClientPacket> {
        self.packets.lock().clone()
    }

    pub fn events(&self) -> Vec<Recorded> {
        self.packets
            .lock()
            .iter()
            .filter_map(|packet| match packet {
                ClientPacket::WriteMessage { text, .. } => Some(Recorded::Write(text.clone())),
                ClientPacket::ClearLogger { .. } => Some(Recorded::Clear),
                ClientPacket::WatchProcess { pid, .. } => Some(Recorded::Watch(*pid)),
                ClientPacket::CreateLogger { .. } => None,
            })
            .collect()
    }

    /// Texts of all recorded writes, in arrival order.
    pub fn writes(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                Recorded::Write(text) => Some(text),
                _ => None,
            })
            .collect()
    }

    pub fn clear_count(&self) -> usize {
        self.events()
            .iter()
            .filter(|event| matches!(event, Recorded::Clear))
            .count()
    }
}

impl TransportClient for RecordingTransport {
    fn create_session(
        &self,
        path: &str,
        timeout: Duration,
    ) -> Result<SessionHandle, TransportError> {
        self.create_calls.fetch_add(1, Ordering::SeqCst);
        let gate = match &*self.resolution.lock() {
            Resolution::Immediate(handle) => return Ok(*handle),
            Resolution::Fail => {
                return Err(TransportError::NoHandle {
                    path: path.to_owned(),
                });
            }
            Resolution::Never => None,
            Resolution::Gated(rx) => Some(rx.clone()),
        };
        match gate {
            Some(rx) => rx
                .recv_timeout(timeout)
                .map_err(|_| TransportError::Timeout(timeout)),
            None => {
                thread::sleep(timeout);
                Err(TransportError::Timeout(timeout))
            }
        }
    }

    fn send(&self, packet: ClientPacket) -> Result<(), TransportError> {
        if self.refuse_sends.load(Ordering::SeqCst) {
            return Err(TransportError::Closed);
        }
        self.packets.lock().push(packet);
        Ok(())
    }

    fn send_blocking(&self, packet: ClientPacket, _timeout: Duration) -> Result<(), TransportError> {
        self.blocking_sends.fetch_add(1, Ordering::SeqCst);
        self.send(packet)
    }
}
