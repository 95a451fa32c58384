//! INI configuration files.
//!
//! ```ini
//! [logger]
//! target = logs/app.log
//! source = app
//! resolve_timeout_ms = 2000
//!
//! [transport]
//! kind = tcp
//! host = 127.0.0.1
//! port = 9021
//! ```

use std::{fs, path::Path, str::FromStr};

use ini::{Ini, Properties};

use crate::socket_transport::{BackoffOverrides, DEFAULT_BACKEND_PORT, SocketTransportBuilder};

use super::{ConfigError, LoggerBuilder};

const LOGGER_SECTION: &str = "logger";
const TRANSPORT_SECTION: &str = "transport";

const LOGGER_KEYS: &[&str] = &["target", "source", "instance_id", "resolve_timeout_ms"];
const TRANSPORT_KEYS: &[&str] = &[
    "kind",
    "host",
    "port",
    "path",
    "tls_domain",
    "tls_insecure",
    "capacity",
    "connect_timeout_ms",
    "write_timeout_ms",
    "max_frame_size",
    "backoff_base_ms",
    "backoff_cap_ms",
    "backoff_reset_after_ms",
    "backoff_deadline_ms",
];

fn check_keys(
    section: &'static str,
    props: &Properties,
    known: &[&str],
) -> Result<(), ConfigError> {
    match props.iter().find(|(key, _)| !known.contains(key)) {
        Some((key, _)) => Err(ConfigError::UnknownKey {
            section,
            key: key.to_owned(),
        }),
        None => Ok(()),
    }
}

fn parse_value<T: FromStr>(
    section: &'static str,
    props: &Properties,
    key: &str,
) -> Result<Option<T>, ConfigError> {
    props
        .get(key)
        .map(|raw| {
            raw.trim().parse().map_err(|_| ConfigError::InvalidValue {
                section,
                key: key.to_owned(),
                value: raw.to_owned(),
            })
        })
        .transpose()
}

fn parse_bool(
    section: &'static str,
    props: &Properties,
    key: &str,
) -> Result<Option<bool>, ConfigError> {
    props
        .get(key)
        .map(|raw| match raw.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" => Ok(false),
            _ => Err(ConfigError::InvalidValue {
                section,
                key: key.to_owned(),
                value: raw.to_owned(),
            }),
        })
        .transpose()
}

fn apply_logger(mut builder: LoggerBuilder, props: &Properties) -> Result<LoggerBuilder, ConfigError> {
    check_keys(LOGGER_SECTION, props, LOGGER_KEYS)?;
    let target = props.get("target").ok_or(ConfigError::MissingKey {
        section: LOGGER_SECTION,
        key: "target",
    })?;
    builder = builder.with_target(target.trim());
    if let Some(source) = props.get("source") {
        builder = builder.with_source(source.trim());
    }
    if let Some(instance_id) = props.get("instance_id") {
        builder = builder.with_instance_id(instance_id);
    }
    if let Some(timeout) = parse_value(LOGGER_SECTION, props, "resolve_timeout_ms")? {
        builder = builder.with_resolve_timeout_ms(timeout);
    }
    Ok(builder)
}

fn parse_transport(props: &Properties) -> Result<SocketTransportBuilder, ConfigError> {
    const S: &str = TRANSPORT_SECTION;
    check_keys(S, props, TRANSPORT_KEYS)?;
    let kind = props.get("kind").map_or("tcp", str::trim);
    let mut builder = match kind {
        "tcp" => {
            let host = props.get("host").map_or("localhost", str::trim);
            let port = parse_value(S, props, "port")?.unwrap_or(DEFAULT_BACKEND_PORT);
            let mut builder = SocketTransportBuilder::new().with_tcp(host, port);
            let domain = props.get("tls_domain").map(|d| d.trim().to_owned());
            let insecure = parse_bool(S, props, "tls_insecure")?;
            if domain.is_some() || insecure.is_some() {
                builder = builder.with_tls(domain, insecure.unwrap_or(false));
            }
            builder
        }
        "unix" => {
            let path = props.get("path").ok_or(ConfigError::MissingKey {
                section: S,
                key: "path",
            })?;
            SocketTransportBuilder::new().with_unix_path(path.trim())
        }
        other => {
            return Err(ConfigError::InvalidValue {
                section: S,
                key: "kind".into(),
                value: other.to_owned(),
            });
        }
    };
    if let Some(capacity) = parse_value(S, props, "capacity")? {
        builder = builder.with_capacity(capacity);
    }
    if let Some(timeout) = parse_value(S, props, "connect_timeout_ms")? {
        builder = builder.with_connect_timeout_ms(timeout);
    }
    if let Some(timeout) = parse_value(S, props, "write_timeout_ms")? {
        builder = builder.with_write_timeout_ms(timeout);
    }
    if let Some(size) = parse_value(S, props, "max_frame_size")? {
        builder = builder.with_max_frame_size(size);
    }
    let mut backoff = BackoffOverrides::new();
    if let Some(ms) = parse_value(S, props, "backoff_base_ms")? {
        backoff = backoff.with_base_ms(ms);
    }
    if let Some(ms) = parse_value(S, props, "backoff_cap_ms")? {
        backoff = backoff.with_cap_ms(ms);
    }
    if let Some(ms) = parse_value(S, props, "backoff_reset_after_ms")? {
        backoff = backoff.with_reset_after_ms(ms);
    }
    if let Some(ms) = parse_value(S, props, "backoff_deadline_ms")? {
        backoff = backoff.with_deadline_ms(ms);
    }
    Ok(builder.with_backoff(backoff))
}

impl LoggerBuilder {
    /// Load settings from INI text. `origin` names the text in errors.
    ///
    /// `[logger]` is required. Without a `[transport]` section the caller
    /// must supply one through [`LoggerBuilder::with_transport`]. Values are
    /// validated when the logger is built.
    pub fn from_ini_str(origin: &str, text: &str) -> Result<Self, ConfigError> {
        let ini = Ini::load_from_str(text).map_err(|source| ConfigError::Parse {
            path: origin.to_owned(),
            source,
        })?;
        let logger = ini
            .section(Some(LOGGER_SECTION))
            .ok_or(ConfigError::MissingSection(LOGGER_SECTION))?;
        let mut builder = apply_logger(Self::new(), logger)?;
        if let Some(transport) = ini.section(Some(TRANSPORT_SECTION)) {
            builder = builder.with_socket_transport(parse_transport(transport)?);
        }
        Ok(builder)
    }

    /// Load settings from the INI file at `path`.
    pub fn from_ini_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_ini_str(&path.display().to_string(), &text)
    }
}
