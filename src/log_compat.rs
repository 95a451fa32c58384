//! Compatibility bridge for the Rust `log` crate.
//!
//! [`RelayLogAdapter`] implements `log::Log` and forwards the host
//! application's records into a [`RelayLogger`]. Records emitted by this
//! crate itself are skipped so a failing transport cannot feed its own
//! warnings back into the queue.

use std::sync::{Arc, OnceLock};

use log::{Level, LevelFilter, Metadata, Record};

use crate::{entry::Tag, logger::RelayLogger};

const OWN_TARGET: &str = env!("CARGO_CRATE_NAME");

fn is_own_target(target: &str) -> bool {
    target
        .strip_prefix(OWN_TARGET)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with("::"))
}

fn tag_for(level: Level) -> Option<Tag> {
    match level {
        Level::Error => Some(Tag::Error),
        Level::Warn => Some(Tag::Warning),
        Level::Info | Level::Debug | Level::Trace => None,
    }
}

/// `log::Log` implementation writing through a [`RelayLogger`].
#[derive(Debug)]
pub struct RelayLogAdapter {
    logger: Arc<RelayLogger>,
    max_level: LevelFilter,
}

impl RelayLogAdapter {
    pub fn new(logger: Arc<RelayLogger>, max_level: LevelFilter) -> Self {
        Self { logger, max_level }
    }
}

impl log::Log for RelayLogAdapter {
    fn enabled(&self, metadata: &Metadata<'_>) -> bool {
        metadata.level() <= self.max_level && !is_own_target(metadata.target())
    }

    fn log(&self, record: &Record<'_>) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let body = format!("{}: {}", record.target(), record.args());
        match tag_for(record.level()) {
            Some(tag) => self.logger.write_tagged(tag, &body),
            None => self.logger.write_line(&body),
        }
    }

    // Delivery is owned by the transport.
    fn flush(&self) {}
}

static INSTALL_RESULT: OnceLock<bool> = OnceLock::new();

/// Install `logger` as the global `log` backend, passing records up to
/// `max_level`.
///
/// Returns `true` on success. When a different global logger is already set,
/// installation fails and `false` is returned. Subsequent calls return the
/// cached outcome and ignore their arguments.
pub fn install_global_logger(logger: Arc<RelayLogger>, max_level: LevelFilter) -> bool {
    *INSTALL_RESULT.get_or_init(|| {
        let adapter = RelayLogAdapter::new(logger, max_level);
        if log::set_boxed_logger(Box::new(adapter)).is_err() {
            return false;
        }
        log::set_max_level(max_level);
        true
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{session::SessionHandle, test_utils::RecordingTransport};
    use log::Log;
    use rstest::{fixture, rstest};
    use std::time::Duration;

    struct Bridge {
        transport: Arc<RecordingTransport>,
        adapter: RelayLogAdapter,
    }

    #[fixture]
    fn bridge() -> Bridge {
        let transport = Arc::new(RecordingTransport::resolving(SessionHandle::new(3)));
        let logger = RelayLogger::builder()
            .with_target("logs/bridge.log")
            .with_source("host")
            .with_transport(transport.clone())
            .build()
            .expect("valid logger settings");
        logger.wait_for_connection(Duration::from_secs(2));
        Bridge {
            transport,
            adapter: RelayLogAdapter::new(Arc::new(logger), LevelFilter::Info),
        }
    }

    fn emit(adapter: &RelayLogAdapter, level: Level, target: &str, message: &str) {
        adapter.log(
            &Record::builder()
                .level(level)
                .target(target)
                .args(format_args!("{message}"))
                .build(),
        );
    }

    #[rstest]
    #[case("relaylog", true)]
    #[case("relaylog::forwarder", true)]
    #[case("relaylogger", false)]
    #[case("app::relaylog", false)]
    fn own_target_detection(#[case] target: &str, #[case] own: bool) {
        assert_eq!(is_own_target(target), own);
    }

    #[rstest]
    fn levels_map_to_tags(bridge: Bridge) {
        emit(&bridge.adapter, Level::Error, "app::db", "query failed");
        emit(&bridge.adapter, Level::Warn, "app::db", "slow query");
        emit(&bridge.adapter, Level::Info, "app", "ready");

        let writes = bridge.transport.writes();
        assert_eq!(writes.len(), 3);
        assert!(writes[0].ends_with("] [Error] app::db: query failed\n"));
        assert!(writes[1].ends_with("] [Warning] app::db: slow query\n"));
        assert!(writes[2].ends_with("] app: ready\n"));
    }

    #[rstest]
    fn filtered_and_own_records_are_dropped(bridge: Bridge) {
        emit(&bridge.adapter, Level::Debug, "app", "too chatty");
        emit(&bridge.adapter, Level::Warn, "relaylog::forwarder", "feedback");

        assert!(bridge.transport.writes().is_empty());
    }
}
