//! In-memory collaborators for tests.
//!
//! Compiled for unit tests and behind the `test-util` feature so integration
//! tests and downstream crates can script the backend.

pub mod recording_alert;
pub mod recording_transport;

pub use recording_alert::{Alert, RecordingAlert};
pub use recording_transport::{Recorded, RecordingTransport, ResolveGate};
