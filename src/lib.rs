//! Process-local logging facade for a remote logging backend.
//!
//! A [`RelayLogger`] formats lines locally and forwards them through a
//! [`TransportClient`] to a backend that owns the log file. The backend's
//! session handle is requested on a background thread when the logger is
//! built; lines written before it arrives are buffered and delivered exactly
//! once, in order, as soon as it does.
//!
//! ```no_run
//! use std::sync::Arc;
//! use relaylog::{ExceptionDispatcher, RelayLogger, SocketTransportBuilder, install_panic_hook};
//!
//! let logger = RelayLogger::builder()
//!     .with_target("logs/app.log")
//!     .with_socket_transport(SocketTransportBuilder::new().with_tcp("127.0.0.1", 9021))
//!     .build()?;
//! let logger = Arc::new(logger);
//! logger.write_warning(&["disk", "almost", "full"]);
//! install_panic_hook(Arc::new(ExceptionDispatcher::new(Arc::clone(&logger))));
//! # Ok::<(), relaylog::BuildError>(())
//! ```

pub mod config;
pub mod dispatcher;
pub mod entry;
pub mod forwarder;
#[cfg(feature = "log-compat")]
pub mod log_compat;
pub mod logger;
pub mod packet;
pub mod rate_limited_warner;
pub mod resolver;
pub mod session;
pub mod socket_transport;
#[cfg(any(test, feature = "test-util"))]
pub mod test_utils;
pub mod transport;

pub use config::{BuildError, ConfigError, LoggerBuilder};
pub use dispatcher::{
    AlertSink, ErrorKind, ExceptionDispatcher, LogAlert, NoopAlert, ReportedError, Severity,
    install_panic_hook,
};
pub use entry::{LogEntry, Tag};
pub use forwarder::{BufferedForwarder, ConnectionState};
#[cfg(feature = "log-compat")]
pub use log_compat::{RelayLogAdapter, install_global_logger};
pub use logger::RelayLogger;
pub use packet::{ClientPacket, ServerPacket};
pub use resolver::{DEFAULT_RESOLVE_TIMEOUT, HandleResolver, ResolveOutcome};
pub use session::SessionHandle;
pub use socket_transport::{SocketTransportBuilder, SocketTransportClient};
pub use transport::{TransportClient, TransportError};
