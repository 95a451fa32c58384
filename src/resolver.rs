//! Background acquisition of the session handle.
//!
//! [`HandleResolver::spawn`] starts one thread that asks the transport for a
//! session and, on success, hands the handle to the [`BufferedForwarder`].
//! The outcome is published once on a single-slot channel. Failed or timed
//! out resolutions are not retried; the forwarder simply keeps buffering.

use std::{
    fmt,
    sync::Arc,
    thread,
    time::Duration,
};

use crossbeam_channel::{Receiver, RecvTimeoutError, bounded};
use log::warn;
use once_cell::sync::OnceCell;

use crate::{
    forwarder::BufferedForwarder,
    session::SessionHandle,
    transport::{TransportClient, TransportError},
};

/// Default upper bound for the creation request.
pub const DEFAULT_RESOLVE_TIMEOUT: Duration = Duration::from_secs(5);

/// Result of the single resolution attempt.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ResolveOutcome {
    /// The resolver is still waiting for the backend.
    Pending,
    /// The handle was installed.
    Resolved(SessionHandle),
    /// The backend did not answer in time.
    TimedOut,
    /// The request failed for another reason.
    Failed(String),
}

impl ResolveOutcome {
    pub fn is_resolved(&self) -> bool {
        matches!(self, Self::Resolved(_))
    }
}

impl fmt::Display for ResolveOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => f.write_str("pending"),
            Self::Resolved(handle) => write!(f, "resolved to {handle}"),
            Self::TimedOut => f.write_str("timed out"),
            Self::Failed(reason) => write!(f, "failed: {reason}"),
        }
    }
}

/// Ask `transport` for a session on `path`, waiting at most `timeout`.
pub fn resolve(transport: &dyn TransportClient, path: &str, timeout: Duration) -> ResolveOutcome {
    match transport.create_session(path, timeout) {
        Ok(handle) if handle.is_valid() => ResolveOutcome::Resolved(handle),
        Ok(_) => ResolveOutcome::Failed(
            TransportError::NoHandle {
                path: path.to_owned(),
            }
            .to_string(),
        ),
        Err(TransportError::Timeout(_)) => ResolveOutcome::TimedOut,
        Err(err) => ResolveOutcome::Failed(err.to_string()),
    }
}

/// Handle on the background resolution thread.
pub struct HandleResolver {
    outcome_rx: Receiver<ResolveOutcome>,
    outcome: OnceCell<ResolveOutcome>,
}

impl HandleResolver {
    /// Start resolving `path` and install the result into `forwarder`.
    pub fn spawn(
        transport: Arc<dyn TransportClient>,
        forwarder: Arc<BufferedForwarder>,
        path: String,
        timeout: Duration,
    ) -> Self {
        let (outcome_tx, outcome_rx) = bounded(1);
        let spawned = thread::Builder::new()
            .name("relaylog-resolver".into())
            .spawn(move || {
                let outcome = resolve(transport.as_ref(), &path, timeout);
                match &outcome {
                    ResolveOutcome::Resolved(handle) => {
                        forwarder.on_handle_resolved(*handle);
                    }
                    other => {
                        warn!("relaylog: session for {path} {other}; entries stay buffered");
                    }
                }
                let _ = outcome_tx.send(outcome);
            });

        let resolver = Self {
            outcome_rx,
            outcome: OnceCell::new(),
        };
        if let Err(err) = spawned {
            warn!("relaylog: failed to start resolver thread: {err}");
            let _ = resolver
                .outcome
                .set(ResolveOutcome::Failed(format!("resolver thread: {err}")));
        }
        resolver
    }

    /// Outcome if already known, without blocking.
    pub fn outcome(&self) -> ResolveOutcome {
        self.wait(Duration::ZERO)
    }

    /// Wait up to `timeout` for the outcome.
    pub fn wait(&self, timeout: Duration) -> ResolveOutcome {
        if let Some(outcome) = self.outcome.get() {
            return outcome.clone();
        }
        let received = match self.outcome_rx.recv_timeout(timeout) {
            Ok(outcome) => outcome,
            Err(RecvTimeoutError::Timeout) => return ResolveOutcome::Pending,
            Err(RecvTimeoutError::Disconnected) => {
                ResolveOutcome::Failed("resolver thread exited without an outcome".into())
            }
        };
        self.outcome.get_or_init(|| received).clone()
    }
}

impl fmt::Debug for HandleResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandleResolver")
            .field("outcome", &self.outcome.get())
            .finish()
    }
}
