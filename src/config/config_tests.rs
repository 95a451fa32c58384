//! Tests for logger configuration.

use std::{io::Write, sync::Arc, time::Duration};

use rstest::rstest;
use tempfile::NamedTempFile;

use super::*;
use crate::{
    session::SessionHandle,
    test_utils::{RecordingAlert, RecordingTransport},
    transport::TransportClient,
};

fn recording() -> Arc<dyn TransportClient> {
    Arc::new(RecordingTransport::resolving(SessionHandle::new(1)))
}

fn invalid_config(err: BuildError) -> String {
    match err {
        BuildError::InvalidConfig(msg) => msg,
        other => panic!("expected InvalidConfig, got {other}"),
    }
}

#[rstest]
#[case::missing_target(LoggerBuilder::new().with_transport(recording()), "target")]
#[case::blank_target(
    LoggerBuilder::new().with_target("  ").with_transport(recording()),
    "target"
)]
#[case::blank_source(
    LoggerBuilder::new()
        .with_target("a.log")
        .with_source("")
        .with_transport(recording()),
    "source"
)]
#[case::zero_timeout(
    LoggerBuilder::new()
        .with_target("a.log")
        .with_resolve_timeout_ms(0)
        .with_transport(recording()),
    "resolve_timeout_ms"
)]
#[case::missing_transport(LoggerBuilder::new().with_target("a.log"), "transport")]
fn builder_rejects_invalid_settings(#[case] builder: LoggerBuilder, #[case] field: &str) {
    let err = builder.build().expect_err("settings must be rejected");
    assert!(invalid_config(err).contains(field));
}

#[rstest]
fn builder_applies_overrides() {
    let alerts = Arc::new(RecordingAlert::new());
    let logger = LoggerBuilder::new()
        .with_target("logs/app.log")
        .with_source("svc")
        .with_instance_id("abcde")
        .with_resolve_timeout_ms(500)
        .with_alert_sink(alerts.clone())
        .with_transport(recording())
        .build()
        .expect("valid settings");

    assert_eq!(logger.target(), "logs/app.log");
    assert_eq!(logger.source(), "svc");
    assert_eq!(logger.instance_id(), "abcde");
    logger.message("hello");
    assert_eq!(alerts.alerts()[0].title, "svc message");
}

#[rstest]
fn default_source_is_never_empty() {
    assert!(!default_source().is_empty());
}

#[rstest]
fn ini_file_configures_logger_and_transport() {
    let mut file = NamedTempFile::new().expect("create temp ini file");
    writeln!(
        file,
        "[logger]\ntarget = logs/app.log\nsource = svc\nresolve_timeout_ms = 50\n\n\
         [transport]\nkind = tcp\nhost = 127.0.0.1\nport = 1\nconnect_timeout_ms = 20\n\
         backoff_deadline_ms = 10"
    )
    .expect("write ini contents");

    let logger = LoggerBuilder::from_ini_file(file.path())
        .expect("parse ini")
        .build()
        .expect("build logger");

    assert_eq!(logger.target(), "logs/app.log");
    assert_eq!(logger.source(), "svc");
    assert!(
        !logger
            .wait_for_connection(Duration::from_secs(2))
            .is_resolved(),
        "nothing listens on port 1"
    );
    assert!(!logger.is_connected());
}

#[rstest]
fn ini_without_transport_needs_one_in_code() {
    let builder = LoggerBuilder::from_ini_str("inline", "[logger]\ntarget = a.log\n")
        .expect("parse ini");
    assert!(builder.clone().build().is_err());
    assert!(builder.with_transport(recording()).build().is_ok());
}

#[rstest]
#[case::missing_logger("[transport]\nkind = tcp\n", "missing [logger]")]
#[case::missing_target("[logger]\nsource = svc\n", "logger.target")]
#[case::unknown_key("[logger]\ntarget = a.log\ncolour = red\n", "logger.colour")]
#[case::bad_number(
    "[logger]\ntarget = a.log\nresolve_timeout_ms = soon\n",
    "logger.resolve_timeout_ms"
)]
#[case::bad_kind("[logger]\ntarget = a.log\n[transport]\nkind = pipe\n", "transport.kind")]
#[case::unix_without_path(
    "[logger]\ntarget = a.log\n[transport]\nkind = unix\n",
    "transport.path"
)]
#[case::bad_bool(
    "[logger]\ntarget = a.log\n[transport]\ntls_insecure = maybe\n",
    "transport.tls_insecure"
)]
fn ini_errors_name_the_problem(#[case] text: &str, #[case] expected: &str) {
    let err = LoggerBuilder::from_ini_str("inline", text).expect_err("ini must be rejected");
    assert!(
        err.to_string().contains(expected),
        "{err} should mention {expected}"
    );
}

#[rstest]
fn missing_file_reports_path() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let path = dir.path().join("absent.ini");
    let err = LoggerBuilder::from_ini_file(&path).expect_err("file does not exist");
    assert!(matches!(err, ConfigError::Read { .. }));
    assert!(err.to_string().contains("absent.ini"));
}

#[rstest]
fn debug_names_the_transport_source() {
    let shared = LoggerBuilder::new().with_transport(recording());
    let socket = LoggerBuilder::new().with_socket_transport(
        crate::socket_transport::SocketTransportBuilder::new().with_tcp("127.0.0.1", 9021),
    );

    assert!(format!("{shared:?}").contains(r#"transport: Some("shared")"#));
    assert!(format!("{socket:?}").contains(r#"transport: Some("socket")"#));
    assert!(format!("{:?}", LoggerBuilder::new()).contains("transport: None"));
}
