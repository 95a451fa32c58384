//! Tagged and alerting helpers on [`RelayLogger`].
//!
//! The `write_*` helpers only log. The alerting helpers (`message`, `error`,
//! `unexpected_error`, `exception`, `expected_exception`) log the same line
//! and then raise one alert through the configured
//! [`AlertSink`](crate::dispatcher::AlertSink).

use std::error::Error as StdError;

use crate::{
    dispatcher::render_error,
    entry::{Tag, with_stack_trace},
};

use super::RelayLogger;

fn maybe_with_stack_trace(body: &str, append: bool) -> String {
    if append {
        with_stack_trace(body)
    } else {
        body.to_owned()
    }
}

impl RelayLogger {
    /// Same as [`write_line`](Self::write_line).
    pub fn write_message(&self, message: &str) {
        self.write_line(message);
    }

    /// `[Warning]` followed by `parts` joined with single spaces.
    pub fn write_warning(&self, parts: &[&str]) {
        self.write_tagged(Tag::Warning, &parts.join(" "));
    }

    pub fn write_exception(&self, err: &dyn StdError) {
        self.write_tagged(Tag::Exception, &render_error(err));
    }

    pub fn write_expected_exception(&self, err: &dyn StdError) {
        self.write_tagged(Tag::ExpectedException, &render_error(err));
    }

    pub fn write_unhandled_exception(&self, err: &dyn StdError) {
        self.write_tagged(Tag::UnhandledException, &render_error(err));
    }

    pub fn write_unexpected_error(&self, message: &str, append_stack_trace: bool) {
        self.write_tagged(
            Tag::UnexpectedError,
            &maybe_with_stack_trace(message, append_stack_trace),
        );
    }

    pub fn write_error(&self, message: &str, append_stack_trace: bool) {
        self.write_tagged(Tag::Error, &maybe_with_stack_trace(message, append_stack_trace));
    }

    /// Log `message` and show it to the user.
    pub fn message(&self, message: &str) {
        self.write_message(message);
        self.alert_user(message, "message");
    }

    /// Log `lines` joined by newlines and show them to the user.
    pub fn message_lines(&self, lines: &[&str]) {
        self.message(&lines.join("\n"));
    }

    /// Log an unexpected error with a stack trace and alert the user.
    pub fn unexpected_error(&self, message: &str) {
        self.write_unexpected_error(message, true);
        self.alert_user(message, "unexpected error");
    }

    pub fn unexpected_error_lines(&self, lines: &[&str]) {
        self.unexpected_error(&lines.join(" "));
    }

    pub fn error(&self, message: &str) {
        self.write_error(message, false);
        self.alert_user(message, "error");
    }

    pub fn error_lines(&self, lines: &[&str]) {
        self.error(&lines.join(" "));
    }

    pub fn exception(&self, err: &dyn StdError) {
        let rendered = render_error(err);
        self.write_tagged(Tag::Exception, &rendered);
        self.alert_user(&rendered, "exception");
    }

    pub fn expected_exception(&self, err: &dyn StdError) {
        let rendered = render_error(err);
        self.write_tagged(Tag::ExpectedException, &rendered);
        self.alert_user(&rendered, "expected exception");
    }
}
