//! Structured JSON logger
//!
//! One event per line, written synchronously with no buffering. Key
//! ordering is fixed, so identical events always serialize identically.

use std::fmt;
use std::fmt::Write as _;
use std::io::{self, Write};

/// Log severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    /// Fine-grained diagnostic detail
    Trace = 0,
    /// Normal lifecycle events
    Info = 1,
    /// Unexpected but recoverable conditions
    Warn = 2,
    /// An operation gave up and surfaced an error
    Error = 3,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Trace => "TRACE",
            Severity::Info => "INFO",
            Severity::Warn => "WARN",
            Severity::Error => "ERROR",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Synchronous JSON line logger
///
/// Keys appear as `event`, then `severity`, then caller fields sorted
/// alphabetically by key.
pub struct Logger;

impl Logger {
    /// Write one event line to stdout
    pub fn log(severity: Severity, event: &str, fields: &[(&str, &str)]) {
        Self::emit(&mut io::stdout(), severity, event, fields);
    }

    /// Write one event line to stderr
    pub fn log_stderr(severity: Severity, event: &str, fields: &[(&str, &str)]) {
        Self::emit(&mut io::stderr(), severity, event, fields);
    }

    fn emit<W: Write>(writer: &mut W, severity: Severity, event: &str, fields: &[(&str, &str)]) {
        let line = render_line(severity, event, fields);
        // A single write per line keeps concurrent loggers from interleaving
        let _ = writer.write_all(line.as_bytes());
        let _ = writer.flush();
    }
}

/// Renders one complete log line, trailing newline included
fn render_line(severity: Severity, event: &str, fields: &[(&str, &str)]) -> String {
    let mut ordered: Vec<(&str, &str)> = fields.to_vec();
    ordered.sort_by_key(|(key, _)| *key);

    let mut line = String::with_capacity(64 + event.len());
    line.push_str("{\"event\":\"");
    push_escaped(&mut line, event);
    line.push_str("\",\"severity\":\"");
    line.push_str(severity.as_str());
    line.push('"');
    for (key, value) in ordered {
        line.push_str(",\"");
        push_escaped(&mut line, key);
        line.push_str("\":\"");
        push_escaped(&mut line, value);
        line.push('"');
    }
    line.push_str("}\n");
    line
}

/// Escapes a string for a JSON string position
fn push_escaped(out: &mut String, raw: &str) {
    for ch in raw.chars() {
        match ch {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            control if (control as u32) < 0x20 => {
                let _ = write!(out, "\\u{:04x}", control as u32);
            }
            other => out.push(other),
        }
    }
}

/// Renders a line without writing it anywhere
#[cfg(test)]
pub fn capture_log(severity: Severity, event: &str, fields: &[(&str, &str)]) -> String {
    render_line(severity, event, fields)
}
