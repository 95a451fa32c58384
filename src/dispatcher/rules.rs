//! Ordered classification table.

use std::error::Error as StdError;

use crate::entry::Tag;

use super::error::{ErrorKind, ReportedError, render_error};

/// Severity category selected for an error value.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Severity {
    ExpectedException,
    Exception,
    UnexpectedError,
    Error,
    /// Anything without a declared domain kind.
    Unhandled,
}

impl Severity {
    /// Prefix tag of the log line.
    pub fn tag(self) -> Tag {
        match self {
            Severity::ExpectedException => Tag::ExpectedException,
            Severity::Exception => Tag::Exception,
            Severity::UnexpectedError => Tag::UnexpectedError,
            Severity::Error => Tag::Error,
            Severity::Unhandled => Tag::UnhandledException,
        }
    }

    /// Lower-case label used in alert titles.
    pub fn label(self) -> &'static str {
        match self {
            Severity::ExpectedException => "expected exception",
            Severity::Exception => "exception",
            Severity::UnexpectedError => "unexpected error",
            Severity::Error => "error",
            Severity::Unhandled => "unhandled exception",
        }
    }

    /// Whether a value of this severity may alert at all.
    pub fn may_alert(self) -> bool {
        !matches!(self, Severity::Unhandled)
    }

    pub fn appends_stack_trace(self) -> bool {
        matches!(self, Severity::UnexpectedError)
    }

    /// Exception-like severities log the full source chain; error-like ones
    /// log the message only.
    fn renders_chain(self) -> bool {
        !matches!(self, Severity::UnexpectedError | Severity::Error)
    }
}

struct Rule {
    kind: ErrorKind,
    severity: Severity,
}

/// Checked top to bottom; the first matching rule wins.
const DISPATCH_TABLE: [Rule; 4] = [
    Rule {
        kind: ErrorKind::ExpectedException,
        severity: Severity::ExpectedException,
    },
    Rule {
        kind: ErrorKind::Exception,
        severity: Severity::Exception,
    },
    Rule {
        kind: ErrorKind::UnexpectedError,
        severity: Severity::UnexpectedError,
    },
    Rule {
        kind: ErrorKind::Error,
        severity: Severity::Error,
    },
];

/// Severity for a declared kind, or [`Severity::Unhandled`] without one.
pub fn severity_of(kind: Option<ErrorKind>) -> Severity {
    kind.and_then(|kind| DISPATCH_TABLE.iter().find(|rule| rule.kind == kind))
        .map_or(Severity::Unhandled, |rule| rule.severity)
}

/// Outcome of classifying one error value.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Classification {
    pub severity: Severity,
    /// Log body without the tag.
    pub body: String,
    /// Whether the user should be alerted.
    pub alert: bool,
}

/// Classify `err` by its declared kind.
pub fn classify(err: &(dyn StdError + 'static)) -> Classification {
    match err.downcast_ref::<ReportedError>() {
        Some(reported) => {
            let severity = severity_of(Some(reported.kind()));
            let body = if severity.renders_chain() {
                render_error(reported)
            } else {
                reported.message().to_owned()
            };
            Classification {
                severity,
                body,
                alert: reported.alert() && severity.may_alert(),
            }
        }
        None => Classification {
            severity: Severity::Unhandled,
            body: render_error(err),
            alert: false,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::io;

    #[rstest]
    #[case(ErrorKind::ExpectedException, Severity::ExpectedException)]
    #[case(ErrorKind::Exception, Severity::Exception)]
    #[case(ErrorKind::UnexpectedError, Severity::UnexpectedError)]
    #[case(ErrorKind::Error, Severity::Error)]
    fn each_kind_has_its_own_severity(#[case] kind: ErrorKind, #[case] expected: Severity) {
        assert_eq!(severity_of(Some(kind)), expected);
    }

    #[test]
    fn foreign_errors_are_unhandled_and_never_alert() {
        let err = io::Error::other("socket reset");
        let classification = classify(&err);
        assert_eq!(classification.severity, Severity::Unhandled);
        assert_eq!(classification.body, "socket reset");
        assert!(!classification.alert);
    }

    #[test]
    fn error_kinds_drop_the_source_chain() {
        let err = ReportedError::error("save failed").with_source("permission denied");
        assert_eq!(classify(&err).body, "save failed");
    }

    #[test]
    fn exception_kinds_keep_the_source_chain() {
        let err = ReportedError::exception("save failed").with_source("permission denied");
        assert_eq!(classify(&err).body, "save failed: permission denied");
    }

    #[test]
    fn silent_errors_do_not_alert() {
        let err = ReportedError::expected_exception("retrying").silent();
        let classification = classify(&err);
        assert_eq!(classification.severity, Severity::ExpectedException);
        assert!(!classification.alert);
    }

    #[test]
    fn only_unexpected_errors_append_stack_traces() {
        assert!(Severity::UnexpectedError.appends_stack_trace());
        assert!(!Severity::Error.appends_stack_trace());
        assert_eq!(Severity::Unhandled.tag(), Tag::UnhandledException);
    }
}
