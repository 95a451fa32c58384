//! Builder for [`SocketTransportClient`].
//!
//! Exposes endpoint selection, timeout tuning, TLS configuration and
//! exponential backoff parameters.

use std::{path::PathBuf, time::Duration};

use crate::config::BuildError;

use super::{
    SocketTransportClient,
    config::{BackoffPolicy, SocketTransportConfig},
    endpoint::{SocketEndpoint, TcpEndpoint, TlsOptions, UnixEndpoint},
};

#[derive(Clone, Debug, PartialEq, Eq)]
enum EndpointConfig {
    Tcp { host: String, port: u16 },
    Unix { path: PathBuf },
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
struct TlsConfig {
    domain: Option<String>,
    insecure: bool,
}

/// Overrides for the reconnect backoff timings.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BackoffOverrides {
    base_ms: Option<u64>,
    cap_ms: Option<u64>,
    reset_after_ms: Option<u64>,
    deadline_ms: Option<u64>,
}

macro_rules! ensure_positive {
    ($value:expr, $field:expr) => {{
        if $value == 0 {
            Err(BuildError::InvalidConfig(format!(
                "{} must be greater than zero",
                $field
            )))
        } else {
            Ok($value)
        }
    }};
}

impl BackoffOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_base_ms(mut self, base_ms: u64) -> Self {
        self.base_ms = Some(base_ms);
        self
    }

    pub fn with_cap_ms(mut self, cap_ms: u64) -> Self {
        self.cap_ms = Some(cap_ms);
        self
    }

    pub fn with_reset_after_ms(mut self, reset_after_ms: u64) -> Self {
        self.reset_after_ms = Some(reset_after_ms);
        self
    }

    /// Give up reconnecting after this long without a successful connect.
    pub fn with_deadline_ms(mut self, deadline_ms: u64) -> Self {
        self.deadline_ms = Some(deadline_ms);
        self
    }

    fn apply(&self, policy: &mut BackoffPolicy) -> Result<(), BuildError> {
        if let Some(base) = self.base_ms {
            policy.base = Duration::from_millis(ensure_positive!(base, "backoff_base_ms")?);
        }
        if let Some(cap) = self.cap_ms {
            policy.cap = Duration::from_millis(ensure_positive!(cap, "backoff_cap_ms")?);
        }
        if let Some(reset) = self.reset_after_ms {
            policy.reset_after =
                Duration::from_millis(ensure_positive!(reset, "backoff_reset_after_ms")?);
        }
        if let Some(deadline) = self.deadline_ms {
            policy.deadline =
                Duration::from_millis(ensure_positive!(deadline, "backoff_deadline_ms")?);
        }
        if policy.cap < policy.base {
            return Err(BuildError::InvalidConfig(
                "backoff_cap_ms must not be smaller than backoff_base_ms".into(),
            ));
        }
        Ok(())
    }
}

macro_rules! option_setter {
    ($(#[$meta:meta])* $fn_name:ident, $field:ident, $ty:ty) => {
        $(#[$meta])*
        pub fn $fn_name(mut self, value: $ty) -> Self {
            self.$field = Some(value);
            self
        }
    };
}

/// Fluent builder for socket transports.
#[derive(Clone, Debug, Default)]
pub struct SocketTransportBuilder {
    capacity: Option<usize>,
    connect_timeout_ms: Option<u64>,
    write_timeout_ms: Option<u64>,
    max_frame_size: Option<usize>,
    endpoint: Option<EndpointConfig>,
    tls: Option<TlsConfig>,
    backoff: BackoffOverrides,
}

impl SocketTransportBuilder {
    /// Create a builder with no endpoint configured.
    pub fn new() -> Self {
        Self::default()
    }

    /// Connect over TCP.
    pub fn with_tcp(mut self, host: impl Into<String>, port: u16) -> Self {
        self.endpoint = Some(EndpointConfig::Tcp {
            host: host.into(),
            port,
        });
        self
    }

    /// Connect over a Unix domain socket.
    pub fn with_unix_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.endpoint = Some(EndpointConfig::Unix { path: path.into() });
        self
    }

    /// Wrap the TCP stream in TLS. A missing or blank `domain` falls back to
    /// the TCP host.
    pub fn with_tls(mut self, domain: Option<String>, insecure: bool) -> Self {
        self.tls = Some(TlsConfig { domain, insecure });
        self
    }

    option_setter!(
        #[doc = "Set the bounded queue capacity."]
        with_capacity,
        capacity,
        usize
    );
    option_setter!(with_connect_timeout_ms, connect_timeout_ms, u64);
    option_setter!(with_write_timeout_ms, write_timeout_ms, u64);
    option_setter!(with_max_frame_size, max_frame_size, usize);

    pub fn with_backoff(mut self, overrides: BackoffOverrides) -> Self {
        self.backoff = overrides;
        self
    }

    fn validate(&self) -> Result<(), BuildError> {
        match &self.endpoint {
            None => {
                return Err(BuildError::InvalidConfig(
                    "socket transport requires an endpoint".into(),
                ));
            }
            Some(EndpointConfig::Unix { .. }) if self.tls.is_some() => {
                return Err(BuildError::InvalidConfig(
                    "tls is only supported for tcp endpoints".into(),
                ));
            }
            Some(EndpointConfig::Tcp { host, .. }) if host.trim().is_empty() => {
                return Err(BuildError::InvalidConfig(
                    "tcp host must not be empty".into(),
                ));
            }
            Some(EndpointConfig::Unix { path }) if path.as_os_str().is_empty() => {
                return Err(BuildError::InvalidConfig(
                    "unix socket path must not be empty".into(),
                ));
            }
            Some(_) => {}
        }
        if let Some(capacity) = self.capacity {
            ensure_positive!(capacity, "capacity")?;
        }
        if let Some(timeout) = self.connect_timeout_ms {
            ensure_positive!(timeout, "connect_timeout_ms")?;
        }
        if let Some(timeout) = self.write_timeout_ms {
            ensure_positive!(timeout, "write_timeout_ms")?;
        }
        if let Some(size) = self.max_frame_size {
            ensure_positive!(size, "max_frame_size")?;
        }
        Ok(())
    }

    /// Validate and produce the worker configuration without starting it.
    pub fn build_config(&self) -> Result<SocketTransportConfig, BuildError> {
        self.validate()?;
        let mut config = SocketTransportConfig::default();
        if let Some(capacity) = self.capacity {
            config.capacity = capacity;
        }
        if let Some(timeout) = self.connect_timeout_ms {
            config.connect_timeout = Duration::from_millis(timeout);
        }
        if let Some(timeout) = self.write_timeout_ms {
            config.write_timeout = Duration::from_millis(timeout);
        }
        if let Some(size) = self.max_frame_size {
            config.max_frame_size = size;
        }
        if let Some(endpoint) = &self.endpoint {
            config.endpoint = self.build_endpoint(endpoint);
        }
        self.backoff.apply(&mut config.backoff)?;
        Ok(config)
    }

    fn build_endpoint(&self, endpoint: &EndpointConfig) -> SocketEndpoint {
        match endpoint {
            EndpointConfig::Tcp { host, port } => SocketEndpoint::Tcp(TcpEndpoint {
                host: host.clone(),
                port: *port,
                tls: self.tls.as_ref().map(|tls| TlsOptions {
                    domain: tls
                        .domain
                        .clone()
                        .filter(|d| !d.trim().is_empty())
                        .unwrap_or_else(|| host.clone()),
                    insecure_skip_verify: tls.insecure,
                }),
            }),
            EndpointConfig::Unix { path } => {
                SocketEndpoint::Unix(UnixEndpoint { path: path.clone() })
            }
        }
    }

    /// Validate the settings and start the transport worker.
    pub fn build(&self) -> Result<SocketTransportClient, BuildError> {
        let config = self.build_config()?;
        Ok(SocketTransportClient::with_config(config)?)
    }
}
