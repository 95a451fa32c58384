//! Domain error values understood by the dispatcher.

use std::{error::Error as StdError, fmt::Write as _};

use thiserror::Error;

type BoxedSource = Box<dyn StdError + Send + Sync + 'static>;

/// Declared kind of a [`ReportedError`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// A failure the program anticipates and recovers from.
    ExpectedException,
    /// A generic domain exception.
    Exception,
    /// A state the program should never reach.
    UnexpectedError,
    /// A generic domain error.
    Error,
}

/// Error value carrying its own classification and alert preference.
///
/// Construct one through
/// [`ExceptionDispatcher::raise`](super::ExceptionDispatcher::raise) to log it
/// as a side effect, or build it directly and report it later.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct ReportedError {
    kind: ErrorKind,
    message: String,
    alert: bool,
    #[source]
    source: Option<BoxedSource>,
}

impl ReportedError {
    /// Create an error of `kind` that alerts the user when reported.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            alert: true,
            source: None,
        }
    }

    pub fn expected_exception(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::ExpectedException, message)
    }

    pub fn exception(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Exception, message)
    }

    pub fn unexpected_error(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::UnexpectedError, message)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Error, message)
    }

    /// Choose whether reporting raises an alert.
    pub fn with_alert(mut self, alert: bool) -> Self {
        self.alert = alert;
        self
    }

    /// Report without alerting the user.
    pub fn silent(self) -> Self {
        self.with_alert(false)
    }

    /// Attach the underlying cause.
    pub fn with_source(mut self, source: impl Into<BoxedSource>) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn alert(&self) -> bool {
        self.alert
    }
}

/// Render `err` followed by its chain of sources, separated by `: `.
pub fn render_error(err: &dyn StdError) -> String {
    let mut rendered = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        let _ = write!(rendered, ": {cause}");
        source = cause.source();
    }
    rendered
}
