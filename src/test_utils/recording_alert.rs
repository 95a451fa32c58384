//! Alert sink that records every alert it is asked to show.

use parking_lot::Mutex;

use crate::dispatcher::AlertSink;

/// One recorded alert.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Alert {
    pub title: String,
    pub body: String,
}

#[derive(Debug, Default)]
pub struct RecordingAlert {
    alerts: Mutex<Vec<Alert>>,
}

impl RecordingAlert {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn alerts(&self) -> Vec<Alert> {
        self.alerts.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.alerts.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.alerts.lock().is_empty()
    }
}

impl AlertSink for RecordingAlert {
    fn show_alert(&self, body: &str, title: &str) {
        self.alerts.lock().push(Alert {
            title: title.to_owned(),
            body: body.to_owned(),
        });
    }
}
