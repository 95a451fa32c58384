//! Fluent construction of [`RelayLogger`].

use std::{fmt, sync::Arc, time::Duration};

use crate::{
    dispatcher::{AlertSink, NoopAlert},
    entry::default_instance_id,
    logger::{LoggerSettings, RelayLogger},
    resolver::DEFAULT_RESOLVE_TIMEOUT,
    socket_transport::SocketTransportBuilder,
    transport::TransportClient,
};

use super::{BuildError, default_source};

#[derive(Clone)]
enum TransportSource {
    Shared(Arc<dyn TransportClient>),
    Socket(SocketTransportBuilder),
}

/// Builder for [`RelayLogger`] instances.
#[derive(Clone, Default)]
pub struct LoggerBuilder {
    target: Option<String>,
    source: Option<String>,
    instance_id: Option<String>,
    resolve_timeout_ms: Option<u64>,
    alerts: Option<Arc<dyn AlertSink>>,
    transport: Option<TransportSource>,
}

fn ensure_not_blank(value: &str, field: &str) -> Result<(), BuildError> {
    if value.trim().is_empty() {
        return Err(BuildError::InvalidConfig(format!(
            "{field} must not be empty"
        )));
    }
    Ok(())
}

impl LoggerBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Backend path of the log file.
    pub fn with_target(mut self, target: impl Into<String>) -> Self {
        self.target = Some(target.into());
        self
    }

    /// Tag identifying the component writing the lines.
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Override the process-derived instance id.
    pub fn with_instance_id(mut self, instance_id: impl Into<String>) -> Self {
        self.instance_id = Some(instance_id.into());
        self
    }

    /// Upper bound for the session request, in milliseconds.
    pub fn with_resolve_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.resolve_timeout_ms = Some(timeout_ms);
        self
    }

    pub fn with_alert_sink(mut self, alerts: Arc<dyn AlertSink>) -> Self {
        self.alerts = Some(alerts);
        self
    }

    /// Use an already constructed transport.
    pub fn with_transport(mut self, transport: Arc<dyn TransportClient>) -> Self {
        self.transport = Some(TransportSource::Shared(transport));
        self
    }

    /// Start a socket transport when the logger is built.
    pub fn with_socket_transport(mut self, builder: SocketTransportBuilder) -> Self {
        self.transport = Some(TransportSource::Socket(builder));
        self
    }

    fn validate(&self) -> Result<(), BuildError> {
        match &self.target {
            Some(target) => ensure_not_blank(target, "target")?,
            None => {
                return Err(BuildError::InvalidConfig(
                    "logger requires a target path".into(),
                ));
            }
        }
        if let Some(source) = &self.source {
            ensure_not_blank(source, "source")?;
        }
        if let Some(instance_id) = &self.instance_id {
            ensure_not_blank(instance_id, "instance_id")?;
        }
        if self.resolve_timeout_ms == Some(0) {
            return Err(BuildError::InvalidConfig(
                "resolve_timeout_ms must be greater than zero".into(),
            ));
        }
        if self.transport.is_none() {
            return Err(BuildError::InvalidConfig(
                "logger requires a transport".into(),
            ));
        }
        Ok(())
    }

    /// Validate the settings, start the transport if needed and begin
    /// resolving the session.
    pub fn build(&self) -> Result<RelayLogger, BuildError> {
        self.validate()?;
        let transport: Arc<dyn TransportClient> = match &self.transport {
            Some(TransportSource::Shared(transport)) => Arc::clone(transport),
            Some(TransportSource::Socket(builder)) => Arc::new(builder.build()?),
            None => {
                return Err(BuildError::InvalidConfig(
                    "logger requires a transport".into(),
                ));
            }
        };
        Ok(RelayLogger::from_settings(LoggerSettings {
            target: self.target.clone().unwrap_or_default(),
            source: self.source.clone().unwrap_or_else(default_source),
            instance_id: self.instance_id.clone().unwrap_or_else(default_instance_id),
            resolve_timeout: self
                .resolve_timeout_ms
                .map_or(DEFAULT_RESOLVE_TIMEOUT, Duration::from_millis),
            alerts: self
                .alerts
                .clone()
                .unwrap_or_else(|| Arc::new(NoopAlert) as Arc<dyn AlertSink>),
            transport,
        }))
    }
}

impl fmt::Debug for LoggerBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let transport: Option<&str> = match &self.transport {
            Some(TransportSource::Shared(_)) => Some("shared"),
            Some(TransportSource::Socket(_)) => Some("socket"),
            None => None,
        };
        f.debug_struct("LoggerBuilder")
            .field("target", &self.target)
            .field("source", &self.source)
            .field("instance_id", &self.instance_id)
            .field("resolve_timeout_ms", &self.resolve_timeout_ms)
            .field("alerts", &self.alerts)
            .field("transport", &transport)
            .finish()
    }
}
