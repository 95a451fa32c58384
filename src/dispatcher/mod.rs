//! Error-to-log routing.
//!
//! [`ExceptionDispatcher`] classifies an error value through an ordered
//! table keyed by [`ErrorKind`], writes exactly one tagged line through its
//! [`RelayLogger`] and raises at most one alert. Values without a declared
//! kind, including panics, are logged as unhandled and never alert.

mod alert;
mod error;
mod panic_hook;
mod rules;


use std::{any::Any, error::Error as StdError, panic::Location, panic::PanicHookInfo, sync::Arc};

use crate::{entry::with_stack_trace, logger::RelayLogger};

pub use alert::{AlertSink, LogAlert, NoopAlert};
pub use error::{ErrorKind, ReportedError, render_error};
pub use panic_hook::{install_panic_hook, installed_dispatcher};
pub use rules::{Classification, Severity, classify, severity_of};

/// Routes error values to the log and the alert sink.
#[derive(Debug, Clone)]
pub struct ExceptionDispatcher {
    logger: Arc<RelayLogger>,
}

impl ExceptionDispatcher {
    pub fn new(logger: Arc<RelayLogger>) -> Self {
        Self { logger }
    }

    pub fn logger(&self) -> &Arc<RelayLogger> {
        &self.logger
    }

    /// Log `err` according to its classification and return the severity.
    pub fn dispatch(&self, err: &(dyn StdError + 'static)) -> Severity {
        let classification = classify(err);
        self.emit(&classification);
        classification.severity
    }

    /// Dispatch `err` and hand it back for normal propagation.
    ///
    /// ```no_run
    /// # use relaylog::{ExceptionDispatcher, ReportedError};
    /// fn load(dispatcher: &ExceptionDispatcher) -> Result<(), ReportedError> {
    ///     Err(dispatcher.raise(ReportedError::expected_exception("profile missing").silent()))
    /// }
    /// ```
    pub fn raise<E: StdError + 'static>(&self, err: E) -> E {
        self.dispatch(&err);
        err
    }

    /// Dispatch the error of `result`, if any, and return `result` unchanged.
    pub fn check<T, E: StdError + 'static>(&self, result: Result<T, E>) -> Result<T, E> {
        result.inspect_err(|err| {
            self.dispatch(err);
        })
    }

    /// Log a panic. Payloads carrying a [`ReportedError`] keep their kind.
    pub fn dispatch_panic(&self, info: &PanicHookInfo<'_>) -> Severity {
        self.dispatch_panic_payload(info.payload(), info.location())
    }

    /// Log a panic payload, e.g. one returned by `catch_unwind`.
    pub fn dispatch_panic_payload(
        &self,
        payload: &(dyn Any + Send),
        location: Option<&Location<'_>>,
    ) -> Severity {
        if let Some(reported) = payload.downcast_ref::<ReportedError>() {
            return self.dispatch(reported);
        }
        let message = panic_message(payload);
        let body = match location {
            Some(location) => format!("panicked at {location}: {message}"),
            None => format!("panicked: {message}"),
        };
        let classification = Classification {
            severity: Severity::Unhandled,
            body,
            alert: false,
        };
        self.emit(&classification);
        classification.severity
    }

    fn emit(&self, classification: &Classification) {
        let Classification {
            severity,
            body,
            alert,
        } = classification;
        if severity.appends_stack_trace() {
            self.logger.write_tagged(severity.tag(), &with_stack_trace(body));
        } else {
            self.logger.write_tagged(severity.tag(), body);
        }
        if *alert {
            self.logger.alert_user(body, severity.label());
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&'static str>() {
        message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message
    } else {
        "Box<dyn Any>"
    }
}
