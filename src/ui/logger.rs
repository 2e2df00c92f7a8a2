//! Line-oriented leveled logger for command output.
//!
//! Styled mode writes colored level labels to stdout/stderr. Raw mode skips
//! styling and collects plain lines so callers can inspect them.

use owo_colors::OwoColorize;
use parking_lot::Mutex;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Debug,
    Info,
    Success,
    Warning,
    Error,
    Fatal,
}

impl LogLevel {
    pub fn label(&self) -> &'static str {
        match self {
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Success => "success",
            LogLevel::Warning => "warn",
            LogLevel::Error => "error",
            LogLevel::Fatal => "fatal",
        }
    }

    fn to_stderr(&self) -> bool {
        matches!(self, LogLevel::Error | LogLevel::Fatal)
    }
}

/// A collected log line (raw mode)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogLine {
    pub level: LogLevel,
    pub message: String,
}

impl fmt::Display for LogLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[ {} ] {}", self.level.label(), self.message)
    }
}

/// Cloneable handle; clones share the collected lines and the ansi switch.
#[derive(Clone)]
pub struct Logger {
    raw: bool,
    ansi: Arc<AtomicBool>,
    lines: Arc<Mutex<Vec<LogLine>>>,
}

impl Logger {
    pub fn new(raw: bool) -> Self {
        Self {
            raw,
            ansi: Arc::new(AtomicBool::new(true)),
            lines: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn is_raw(&self) -> bool {
        self.raw
    }

    /// Enable or disable colored labels in styled mode.
    pub fn set_ansi(&self, enabled: bool) {
        self.ansi.store(enabled, Ordering::Relaxed);
    }

    pub fn log(&self, level: LogLevel, message: impl fmt::Display) {
        let line = LogLine {
            level,
            message: message.to_string(),
        };
        tracing::debug!(target: "tiller::ui", level = line.level.label(), "{}", line.message);

        if self.raw {
            self.lines.lock().push(line);
            return;
        }

        let rendered = if self.ansi.load(Ordering::Relaxed) {
            format!("{} {}", styled_label(level), line.message)
        } else {
            line.to_string()
        };
        if level.to_stderr() {
            eprintln!("{}", rendered);
        } else {
            println!("{}", rendered);
        }
    }

    pub fn debug(&self, message: impl fmt::Display) {
        self.log(LogLevel::Debug, message);
    }

    pub fn info(&self, message: impl fmt::Display) {
        self.log(LogLevel::Info, message);
    }

    pub fn success(&self, message: impl fmt::Display) {
        self.log(LogLevel::Success, message);
    }

    pub fn warning(&self, message: impl fmt::Display) {
        self.log(LogLevel::Warning, message);
    }

    pub fn error(&self, message: impl fmt::Display) {
        self.log(LogLevel::Error, message);
    }

    pub fn fatal(&self, message: impl fmt::Display) {
        self.log(LogLevel::Fatal, message);
    }

    /// Lines collected in raw mode, rendered as `[ level ] message`.
    pub fn logs(&self) -> Vec<String> {
        self.lines.lock().iter().map(ToString::to_string).collect()
    }

    pub fn lines(&self) -> Vec<LogLine> {
        self.lines.lock().clone()
    }

    pub fn clear(&self) {
        self.lines.lock().clear();
    }
}

fn styled_label(level: LogLevel) -> String {
    let label = format!("[ {} ]", level.label());
    match level {
        LogLevel::Debug => label.dimmed().to_string(),
        LogLevel::Info => label.blue().to_string(),
        LogLevel::Success => label.green().to_string(),
        LogLevel::Warning => label.yellow().to_string(),
        LogLevel::Error | LogLevel::Fatal => label.red().to_string(),
    }
}
