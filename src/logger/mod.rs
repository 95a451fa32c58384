//! Public logging facade.
//!
//! [`RelayLogger`] formats calls into [`LogEntry`] values and hands them to
//! its [`BufferedForwarder`]. Construction starts the [`HandleResolver`], so
//! calls made before the backend has answered are buffered and delivered in
//! order once the session exists.

mod convenience_methods;

#[cfg(test)]
mod tests;

use std::{fmt, sync::Arc, time::Duration};

use crate::{
    config::LoggerBuilder,
    dispatcher::{AlertSink, NoopAlert},
    entry::{EntryFormatter, LogEntry, NULL_PLACEHOLDER, Tag, default_instance_id},
    forwarder::{BufferedForwarder, ConnectionState},
    resolver::{DEFAULT_RESOLVE_TIMEOUT, HandleResolver, ResolveOutcome},
    session::SessionHandle,
    transport::TransportClient,
};

/// Values a [`RelayLogger`] is constructed from.
pub(crate) struct LoggerSettings {
    pub target: String,
    pub source: String,
    pub instance_id: String,
    pub resolve_timeout: Duration,
    pub alerts: Arc<dyn AlertSink>,
    pub transport: Arc<dyn TransportClient>,
}

/// Logger forwarding formatted lines to the remote backend.
pub struct RelayLogger {
    target: String,
    formatter: EntryFormatter,
    forwarder: Arc<BufferedForwarder>,
    resolver: HandleResolver,
    alerts: Arc<dyn AlertSink>,
}

impl RelayLogger {
    /// Create a logger for the backend log file at `target`.
    ///
    /// Uses the default source tag, instance id and resolve timeout and never
    /// alerts. See [`RelayLogger::builder`] for the other settings.
    pub fn new(transport: Arc<dyn TransportClient>, target: impl Into<String>) -> Self {
        Self::from_settings(LoggerSettings {
            target: target.into(),
            source: crate::config::default_source(),
            instance_id: default_instance_id(),
            resolve_timeout: DEFAULT_RESOLVE_TIMEOUT,
            alerts: Arc::new(NoopAlert),
            transport,
        })
    }

    pub fn builder() -> LoggerBuilder {
        LoggerBuilder::new()
    }

    pub(crate) fn from_settings(settings: LoggerSettings) -> Self {
        let LoggerSettings {
            target,
            source,
            instance_id,
            resolve_timeout,
            alerts,
            transport,
        } = settings;
        let forwarder = Arc::new(BufferedForwarder::new(Arc::clone(&transport)));
        let resolver = HandleResolver::spawn(
            transport,
            Arc::clone(&forwarder),
            target.clone(),
            resolve_timeout,
        );
        Self {
            target,
            formatter: EntryFormatter::new(instance_id, source),
            forwarder,
            resolver,
            alerts,
        }
    }

    /// Backend path this logger writes to.
    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn source(&self) -> &str {
        self.formatter.source()
    }

    pub fn instance_id(&self) -> &str {
        self.formatter.instance_id()
    }

    /// Send `text` exactly as given.
    pub fn write(&self, text: &str) {
        self.forwarder.submit_write(LogEntry::raw(text));
    }

    /// Send `text` and a newline without the timestamp header.
    pub fn write_line_without_tags(&self, text: &str) {
        self.forwarder.submit_write(LogEntry::untagged(text));
    }

    /// Send `body` with the timestamp header.
    pub fn write_line(&self, body: &str) {
        self.forwarder.submit_write(self.formatter.format(Some(body)));
    }

    /// Send the display form of `value`, or `{null}` when it is absent.
    pub fn write_object<T: fmt::Display>(&self, value: Option<T>) {
        match value {
            Some(value) => self.write_line(&value.to_string()),
            None => self.write_line(NULL_PLACEHOLDER),
        }
    }

    /// Send `body` prefixed with `tag`.
    pub fn write_tagged(&self, tag: Tag, body: &str) {
        self.write_line(&tag.compose(body));
    }

    /// Clear the backend log, or everything buffered so far.
    pub fn clear(&self) {
        self.forwarder.submit_clear();
    }

    /// Ask the backend to note when process `pid` exits.
    ///
    /// Returns `false` while the session is not yet established.
    pub fn watch_process(&self, pid: u32) -> bool {
        self.forwarder.submit_watch(pid)
    }

    /// Show `body` to the user under a title naming the source and `label`.
    pub fn alert_user(&self, body: &str, label: &str) {
        let title = format!("{} {label}", self.formatter.source());
        self.alerts.show_alert(body, &title);
    }

    pub fn state(&self) -> ConnectionState {
        self.forwarder.state()
    }

    pub fn is_connected(&self) -> bool {
        self.forwarder.is_connected()
    }

    /// Session handle, or [`SessionHandle::INVALID`] before connection.
    pub fn session_handle(&self) -> SessionHandle {
        self.forwarder.session_handle()
    }

    /// Entries waiting for the session handle.
    pub fn pending_len(&self) -> usize {
        self.forwarder.pending_len()
    }

    /// Packets the transport refused so far.
    pub fn failed_sends(&self) -> u64 {
        self.forwarder.failed_sends()
    }

    /// Resolution outcome if already known.
    pub fn resolve_outcome(&self) -> ResolveOutcome {
        self.resolver.outcome()
    }

    /// Block up to `timeout` for the resolution outcome.
    ///
    /// Returns [`ResolveOutcome::Pending`] if the resolver is still running.
    pub fn wait_for_connection(&self, timeout: Duration) -> ResolveOutcome {
        self.resolver.wait(timeout)
    }
}

impl fmt::Debug for RelayLogger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RelayLogger")
            .field("target", &self.target)
            .field("source", &self.formatter.source())
            .field("instance_id", &self.formatter.instance_id())
            .field("forwarder", &self.forwarder)
            .field("resolver", &self.resolver)
            .finish()
    }
}
