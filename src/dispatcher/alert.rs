//! User-facing alert collaborators.

use std::fmt;

use log::warn;

/// Something able to show a message to the user.
///
/// Implementations are best-effort: failures are swallowed and the call
/// never panics.
pub trait AlertSink: Send + Sync + fmt::Debug {
    fn show_alert(&self, body: &str, title: &str);
}

/// Discards every alert. The default for headless processes.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopAlert;

impl AlertSink for NoopAlert {
    fn show_alert(&self, _body: &str, _title: &str) {}
}

/// Routes alerts to the `log` facade at warn level.
#[derive(Clone, Copy, Debug, Default)]
pub struct LogAlert;

impl AlertSink for LogAlert {
    fn show_alert(&self, body: &str, title: &str) {
        warn!(target: "relaylog::alert", "{title}: {body}");
    }
}
