//! Tests for the logging facade.

use std::{fmt, io, sync::Arc, time::Duration};

use rstest::{fixture, rstest};

use super::*;
use crate::{
    dispatcher::ReportedError,
    test_utils::{Recorded, RecordingAlert, RecordingTransport, ResolveGate},
};

const HANDLE: SessionHandle = SessionHandle::new(0x11);

struct Fixture {
    transport: Arc<RecordingTransport>,
    alerts: Arc<RecordingAlert>,
    logger: RelayLogger,
}

fn logger_with(transport: &Arc<RecordingTransport>, alerts: &Arc<RecordingAlert>) -> RelayLogger {
    RelayLogger::builder()
        .with_target("logs/app.log")
        .with_source("app")
        .with_instance_id("1f2a ")
        .with_transport(Arc::clone(transport) as Arc<dyn TransportClient>)
        .with_alert_sink(Arc::clone(alerts) as Arc<dyn AlertSink>)
        .build()
        .expect("valid logger settings")
}

#[fixture]
fn connected() -> Fixture {
    let transport = Arc::new(RecordingTransport::resolving(HANDLE));
    let alerts = Arc::new(RecordingAlert::new());
    let logger = logger_with(&transport, &alerts);
    assert_eq!(
        logger.wait_for_connection(Duration::from_secs(2)),
        ResolveOutcome::Resolved(HANDLE)
    );
    Fixture {
        transport,
        alerts,
        logger,
    }
}

fn gated() -> (Fixture, ResolveGate) {
    let (transport, gate) = RecordingTransport::gated();
    let transport = Arc::new(transport);
    let alerts = Arc::new(RecordingAlert::new());
    let logger = logger_with(&transport, &alerts);
    (
        Fixture {
            transport,
            alerts,
            logger,
        },
        gate,
    )
}

/// Strip the timestamp, keeping everything from the instance id on.
///
/// The test harness names its threads, so the source tag may carry one.
fn without_timestamp(line: &str) -> &str {
    line.splitn(3, ' ').nth(2).unwrap_or(line)
}

#[rstest]
fn write_line_adds_header(connected: Fixture) {
    connected.logger.write_line("started");

    let writes = connected.transport.writes();
    assert_eq!(writes.len(), 1);
    let line = without_timestamp(&writes[0]);
    assert!(line.starts_with("1f2a  [app"), "{line}");
    assert!(line.ends_with("] started\n"), "{line}");
}

#[rstest]
fn raw_and_untagged_writes_skip_header(connected: Fixture) {
    connected.logger.write("partial");
    connected.logger.write_line_without_tags("banner");

    assert_eq!(
        connected.transport.writes(),
        vec!["partial".to_owned(), "banner\n".to_owned()]
    );
}

#[rstest]
fn missing_object_renders_placeholder(connected: Fixture) {
    connected.logger.write_object(None::<u32>);
    connected.logger.write_object(Some(42));

    let writes = connected.transport.writes();
    assert!(writes[0].ends_with("] {null}\n"));
    assert!(writes[1].ends_with("] 42\n"));
}

#[rstest]
fn warning_parts_are_joined_by_spaces(connected: Fixture) {
    connected.logger.write_warning(&["disk", "almost", "full"]);

    assert!(connected.transport.writes()[0].ends_with("] [Warning] disk almost full\n"));
}

#[derive(Debug)]
struct Wrapped(io::Error);

impl fmt::Display for Wrapped {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("sync failed")
    }
}

impl std::error::Error for Wrapped {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.0)
    }
}

#[rstest]
fn exception_helpers_render_the_source_chain(connected: Fixture) {
    let err = Wrapped(io::Error::other("connection reset"));
    connected.logger.write_exception(&err);
    connected.logger.write_expected_exception(&err);
    connected.logger.write_unhandled_exception(&err);

    let writes = connected.transport.writes();
    assert!(writes[0].ends_with("[Exception] sync failed: connection reset\n"));
    assert!(writes[1].ends_with("[Expected exception] sync failed: connection reset\n"));
    assert!(writes[2].ends_with("[Unhandled exception] sync failed: connection reset\n"));
    assert!(connected.alerts.is_empty());
}

#[rstest]
#[case(false)]
#[case(true)]
fn error_helpers_append_stack_trace_on_request(connected: Fixture, #[case] append: bool) {
    connected.logger.write_error("bad input", append);
    connected.logger.write_unexpected_error("bad state", append);

    let writes = connected.transport.writes();
    assert!(writes[0].contains("[Error] bad input"));
    assert!(writes[1].contains("[Unexpected error] bad state"));
    for line in &writes {
        assert_eq!(line.contains("\nStacktrace:\n"), append, "{line}");
    }
}

#[rstest]
fn alerting_helpers_log_and_alert_once(connected: Fixture) {
    let logger = &connected.logger;
    logger.message_lines(&["first", "second"]);
    logger.error_lines(&["no", "space"]);
    logger.unexpected_error("corrupt index");
    logger.exception(&ReportedError::exception("import failed"));
    logger.expected_exception(&ReportedError::expected_exception("offline"));

    let titles: Vec<_> = connected
        .alerts
        .alerts()
        .into_iter()
        .map(|alert| alert.title)
        .collect();
    assert_eq!(
        titles,
        [
            "app message",
            "app error",
            "app unexpected error",
            "app exception",
            "app expected exception"
        ]
    );
    let writes = connected.transport.writes();
    assert_eq!(writes.len(), 5);
    assert!(writes[0].ends_with("] first\nsecond\n"));
    assert!(writes[1].ends_with("[Error] no space\n"));
    assert!(writes[2].contains("\nStacktrace:\n"));
    assert_eq!(connected.alerts.alerts()[2].body, "corrupt index");
}

#[rstest]
fn writes_before_connection_are_drained_in_order() {
    let (fixture, gate) = gated();
    fixture.logger.write("a");
    fixture.logger.write("b");
    assert_eq!(fixture.logger.pending_len(), 2);
    assert!(!fixture.logger.is_connected());
    assert_eq!(fixture.logger.session_handle(), SessionHandle::INVALID);

    gate.release(HANDLE);
    assert!(
        fixture
            .logger
            .wait_for_connection(Duration::from_secs(2))
            .is_resolved()
    );

    assert_eq!(
        fixture.transport.events(),
        vec![Recorded::Write("a".into()), Recorded::Write("b".into())]
    );
    assert_eq!(fixture.logger.state(), ConnectionState::Connected(HANDLE));
}

#[rstest]
fn clear_before_connection_keeps_only_later_entries() {
    let (fixture, gate) = gated();
    fixture.logger.write("a");
    fixture.logger.clear();
    fixture.logger.write("b");

    gate.release(HANDLE);
    fixture.logger.wait_for_connection(Duration::from_secs(2));

    assert_eq!(
        fixture.transport.events(),
        vec![Recorded::Clear, Recorded::Write("b".into())]
    );
}

#[rstest]
fn watch_process_requires_connection() {
    let (fixture, gate) = gated();
    assert!(!fixture.logger.watch_process(77));

    gate.release(HANDLE);
    fixture.logger.wait_for_connection(Duration::from_secs(2));

    assert!(fixture.logger.watch_process(77));
    assert_eq!(fixture.transport.events(), vec![Recorded::Watch(77)]);
}

#[rstest]
fn timed_out_resolution_keeps_buffering() {
    let transport = Arc::new(RecordingTransport::never_resolving());
    let alerts = Arc::new(RecordingAlert::new());
    let logger = RelayLogger::builder()
        .with_target("logs/app.log")
        .with_resolve_timeout_ms(20)
        .with_transport(Arc::clone(&transport) as Arc<dyn TransportClient>)
        .with_alert_sink(alerts)
        .build()
        .expect("valid logger settings");

    assert_eq!(
        logger.wait_for_connection(Duration::from_secs(2)),
        ResolveOutcome::TimedOut
    );
    logger.write_line("still buffered");
    logger.write_line("and this");

    assert_eq!(logger.pending_len(), 2);
    assert!(transport.packets().is_empty());
    assert_eq!(logger.resolve_outcome(), ResolveOutcome::TimedOut);
    assert_eq!(transport.create_calls(), 1);
}

#[rstest]
fn refused_sends_are_counted_not_raised(connected: Fixture) {
    connected.transport.refuse_sends(true);
    connected.logger.write_line("lost");
    connected.logger.clear();

    assert_eq!(connected.logger.failed_sends(), 2);
}
