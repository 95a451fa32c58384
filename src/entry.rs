//! Formatting of log lines.
//!
//! A [`LogEntry`] is produced once per call and never mutated afterwards. The
//! tagged layout is
//! `yy/MM/dd HH:mm:ss.fff <instance> [<source>[/<thread>]] <body>\n`.

use std::{backtrace::Backtrace, fmt, thread};

use chrono::{DateTime, Local};

/// Rendered in place of a missing body.
pub const NULL_PLACEHOLDER: &str = "{null}";

const TIMESTAMP_FORMAT: &str = "%y/%m/%d %H:%M:%S%.3f";

/// One fully formatted line ready for the backend.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LogEntry {
    text: String,
}

impl LogEntry {
    /// Wrap `text` verbatim; no header and no newline are added.
    pub fn raw(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    /// `body` followed by a newline, without the header.
    pub fn untagged(body: &str) -> Self {
        let mut text = String::with_capacity(body.len() + 1);
        text.push_str(body);
        text.push('\n');
        Self { text }
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn into_string(self) -> String {
        self.text
    }
}

impl fmt::Display for LogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// Prefix tags placed in front of the body.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Tag {
    Warning,
    Exception,
    ExpectedException,
    UnexpectedError,
    Error,
    UnhandledException,
}

impl Tag {
    pub fn as_str(self) -> &'static str {
        match self {
            Tag::Warning => "[Warning]",
            Tag::Exception => "[Exception]",
            Tag::ExpectedException => "[Expected exception]",
            Tag::UnexpectedError => "[Unexpected error]",
            Tag::Error => "[Error]",
            Tag::UnhandledException => "[Unhandled exception]",
        }
    }

    /// `"<tag> <body>"`.
    pub fn compose(self, body: &str) -> String {
        format!("{} {body}", self.as_str())
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Append a freshly captured stack trace to `body`.
pub fn with_stack_trace(body: &str) -> String {
    format!("{body}\nStacktrace:\n{}", Backtrace::force_capture())
}

/// Default instance id: the process id in lower-case hex, padded to five.
pub fn default_instance_id() -> String {
    format!("{:<5x}", std::process::id())
}

/// Thread tag for `name`; the unnamed and `main` threads carry none.
pub fn thread_tag(name: Option<&str>) -> Option<&str> {
    name.filter(|n| !n.is_empty() && *n != "main")
}

/// Builds tagged [`LogEntry`] values for one logger instance.
#[derive(Clone, Debug)]
pub struct EntryFormatter {
    instance_id: String,
    source: String,
}

impl EntryFormatter {
    pub fn new(instance_id: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            instance_id: instance_id.into(),
            source: source.into(),
        }
    }

    pub fn instance_id(&self) -> &str {
        &self.instance_id
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// Format `body` with the current time and calling thread.
    pub fn format(&self, body: Option<&str>) -> LogEntry {
        let current = thread::current();
        self.format_at(Local::now(), current.name(), body)
    }

    /// Format `body` with an explicit timestamp and thread name.
    pub fn format_at(
        &self,
        timestamp: DateTime<Local>,
        thread_name: Option<&str>,
        body: Option<&str>,
    ) -> LogEntry {
        let body = body.unwrap_or(NULL_PLACEHOLDER);
        let mut text = format!(
            "{} {} [{}",
            timestamp.format(TIMESTAMP_FORMAT),
            self.instance_id,
            self.source
        );
        if let Some(tag) = thread_tag(thread_name) {
            text.push('/');
            text.push_str(tag);
        }
        text.push_str("] ");
        text.push_str(body);
        text.push('\n');
        LogEntry { text }
    }
}
