//! Configuration for loggers and transports.
//!
//! [`LoggerBuilder`] assembles a [`RelayLogger`](crate::RelayLogger) from
//! fluent setters or from an INI file (see [`LoggerBuilder::from_ini_file`]).

mod builder;
mod file;

use std::{io, path::PathBuf};

use thiserror::Error;

pub use builder::LoggerBuilder;

#[cfg(test)]
mod config_tests;

/// Errors raised while building loggers or transports.
#[derive(Debug, Error)]
pub enum BuildError {
    /// Invalid user supplied configuration.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    /// Underlying I/O error whilst starting a transport.
    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Errors raised while loading an INI configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("{path} is invalid: {source}")]
    Parse {
        path: String,
        #[source]
        source: ini::ParseError,
    },
    /// A required section is absent.
    #[error("missing [{0}] section")]
    MissingSection(&'static str),
    /// A required key is absent.
    #[error("missing key {section}.{key}")]
    MissingKey {
        section: &'static str,
        key: &'static str,
    },
    #[error("unknown key {section}.{key}")]
    UnknownKey { section: &'static str, key: String },
    #[error("invalid value for {section}.{key}: {value:?}")]
    InvalidValue {
        section: &'static str,
        key: String,
        value: String,
    },
}

/// Source tag used when none is configured: the executable's file stem.
pub fn default_source() -> String {
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.file_stem().map(|stem| stem.to_string_lossy().into_owned()))
        .filter(|stem| !stem.is_empty())
        .unwrap_or_else(|| "app".to_owned())
}
