//! Worker thread owning the backend connection.

use std::{
    io::{self, Write},
    thread,
    time::{Duration, Instant},
};

use crossbeam_channel::{Receiver, SendTimeoutError, Sender, TrySendError, bounded};
use log::warn;

use crate::{
    packet::{ClientPacket, ServerPacket},
    rate_limited_warner::RateLimitedWarner,
    transport::TransportError,
};

use super::{
    backoff::Backoff,
    codec::{decode_packet, encode_frame, read_frame},
    config::SocketTransportConfig,
    endpoint::{Connection, connect},
};

/// Commands processed by the worker thread.
#[derive(Debug)]
pub enum Command {
    /// Fire-and-forget packet.
    Send(ClientPacket),
    /// Packet whose reply carries `request_id`.
    Request {
        packet: ClientPacket,
        request_id: u64,
        deadline: Instant,
        reply: Sender<ServerPacket>,
    },
    Flush(Sender<()>),
    Shutdown(Sender<()>),
}

pub fn spawn_worker(
    config: SocketTransportConfig,
) -> io::Result<(Sender<Command>, thread::JoinHandle<()>)> {
    let (tx, rx) = bounded(config.capacity);
    let handle = thread::Builder::new()
        .name("relaylog-socket".into())
        .spawn(move || Worker::new(config).run(rx))?;
    Ok((tx, handle))
}

struct Worker {
    config: SocketTransportConfig,
    connection: Option<Connection>,
    backoff: Backoff,
    warner: RateLimitedWarner,
}

impl Worker {
    fn new(config: SocketTransportConfig) -> Self {
        Self {
            backoff: Backoff::new(config.backoff.clone()),
            warner: RateLimitedWarner::new(config.warn_interval),
            connection: None,
            config,
        }
    }

    fn run(mut self, rx: Receiver<Command>) {
        while let Ok(cmd) = rx.recv() {
            match cmd {
                Command::Send(packet) => {
                    let _ = self.deliver(&packet);
                }
                Command::Request {
                    packet,
                    request_id,
                    deadline,
                    reply,
                } => self.request(&packet, request_id, deadline, &reply),
                Command::Flush(ack) => {
                    self.flush();
                    let _ = ack.send(());
                }
                Command::Shutdown(ack) => {
                    self.flush();
                    let _ = ack.send(());
                    break;
                }
            }
        }
    }

    fn drop_packet(&self, reason: &str) {
        self.warner.record_drop();
        self.warner.warn_if_due(|count| {
            warn!("relaylog socket transport dropped {count} packets: {reason}");
        });
    }

    fn ensure_connected(&mut self) -> Option<&mut Connection> {
        if self.connection.is_none() {
            let now = Instant::now();
            match connect(&self.config.endpoint, self.config.connect_timeout) {
                Ok(conn) => {
                    self.backoff.record_success(now);
                    self.connection = Some(conn);
                }
                Err(err) => {
                    self.drop_packet(&format!("connect failed: {err}"));
                    if let Some(delay) = self.backoff.next_delay(now) {
                        thread::sleep(delay);
                    }
                    return None;
                }
            }
        }
        self.connection.as_mut()
    }

    fn deliver(&mut self, packet: &ClientPacket) -> bool {
        let frame = match encode_frame(packet, self.config.max_frame_size) {
            Ok(frame) => frame,
            Err(err) => {
                self.drop_packet(&format!("encoding failed: {err}"));
                return false;
            }
        };
        let write_timeout = self.config.write_timeout;
        let Some(conn) = self.ensure_connected() else {
            return false;
        };
        let result = write_frame(conn, &frame, write_timeout);
        let now = Instant::now();
        match result {
            Ok(()) => {
                self.backoff.record_success(now);
                true
            }
            Err(err) => {
                warn!("relaylog socket transport write failed: {err}");
                self.connection = None;
                self.drop_packet("write errors");
                if let Some(delay) = self.backoff.next_delay(now) {
                    thread::sleep(delay);
                }
                false
            }
        }
    }

    fn request(
        &mut self,
        packet: &ClientPacket,
        request_id: u64,
        deadline: Instant,
        reply: &Sender<ServerPacket>,
    ) {
        if Instant::now() >= deadline {
            // The caller has already given up.
            return;
        }
        if !self.deliver(packet) {
            return;
        }
        match self.await_reply(request_id, deadline) {
            Ok(Some(response)) => {
                let _ = reply.send(response);
            }
            Ok(None) => {}
            Err(err) => {
                warn!("relaylog socket transport lost reply {request_id}: {err}");
                self.connection = None;
            }
        }
    }

    fn await_reply(
        &mut self,
        request_id: u64,
        deadline: Instant,
    ) -> io::Result<Option<ServerPacket>> {
        let max_frame_size = self.config.max_frame_size;
        let Some(conn) = self.connection.as_mut() else {
            return Ok(None);
        };
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return Err(io::Error::new(
                    io::ErrorKind::TimedOut,
                    "reply deadline passed",
                ));
            }
            conn.set_read_timeout(Some(remaining))?;
            let payload = read_frame(&mut *conn, max_frame_size)?;
            let response: ServerPacket = decode_packet(&payload)?;
            if response.request_id() == request_id {
                conn.set_read_timeout(None)?;
                return Ok(Some(response));
            }
            warn!(
                "relaylog socket transport ignoring stale reply {}",
                response.request_id()
            );
        }
    }

    fn flush(&mut self) {
        let Some(conn) = self.connection.as_mut() else {
            return;
        };
        if let Err(err) = conn.flush() {
            warn!("relaylog socket transport flush failed: {err}");
            self.connection = None;
        }
    }
}

fn write_frame(conn: &mut Connection, frame: &[u8], timeout: Duration) -> io::Result<()> {
    conn.set_write_timeout(timeout)?;
    conn.write_all(frame)?;
    conn.flush()
}

/// Queue `packet` without blocking.
pub fn enqueue(
    tx: &Sender<Command>,
    packet: ClientPacket,
    warner: &RateLimitedWarner,
) -> Result<(), TransportError> {
    match tx.try_send(Command::Send(packet)) {
        Ok(()) => Ok(()),
        Err(TrySendError::Full(_)) => {
            warner.record_drop();
            warner.warn_if_due(|count| {
                warn!("relaylog socket transport queue full; dropped {count} packets");
            });
            Err(TransportError::QueueFull)
        }
        Err(TrySendError::Disconnected(_)) => Err(TransportError::Closed),
    }
}

/// Queue `packet`, waiting up to `timeout` for the worker to make room.
pub fn enqueue_blocking(
    tx: &Sender<Command>,
    packet: ClientPacket,
    timeout: Duration,
) -> Result<(), TransportError> {
    match tx.send_timeout(Command::Send(packet), timeout) {
        Ok(()) => Ok(()),
        Err(SendTimeoutError::Timeout(_)) => Err(TransportError::Timeout(timeout)),
        Err(SendTimeoutError::Disconnected(_)) => Err(TransportError::Closed),
    }
}

/// Ask the worker to flush and wait for the acknowledgement.
pub fn flush_queue(tx: &Sender<Command>, timeout: Duration) -> bool {
    let (ack_tx, ack_rx) = bounded(1);
    if tx.send_timeout(Command::Flush(ack_tx), timeout).is_err() {
        return false;
    }
    ack_rx.recv_timeout(timeout).is_ok()
}
