//! Send/Sync guarantees for core types.

use relaylog::{
    BufferedForwarder, ExceptionDispatcher, HandleResolver, LoggerBuilder, RelayLogger,
    ReportedError, SocketTransportBuilder, SocketTransportClient,
    test_utils::{RecordingAlert, RecordingTransport},
};
use rstest::rstest;
use static_assertions::assert_impl_all;

#[rstest]
fn builders_are_send_sync() {
    assert_impl_all!(LoggerBuilder: Send, Sync, Clone);
    assert_impl_all!(SocketTransportBuilder: Send, Sync, Clone);
}

#[rstest]
fn components_are_send_sync() {
    assert_impl_all!(RelayLogger: Send, Sync);
    assert_impl_all!(BufferedForwarder: Send, Sync);
    assert_impl_all!(HandleResolver: Send, Sync);
    assert_impl_all!(ExceptionDispatcher: Send, Sync);
    assert_impl_all!(SocketTransportClient: Send, Sync);
    assert_impl_all!(RecordingTransport: Send, Sync);
    assert_impl_all!(RecordingAlert: Send, Sync);
}

#[rstest]
fn reported_errors_cross_threads() {
    assert_impl_all!(ReportedError: Send, Sync, std::error::Error);
}
