//! Messages for inter-thread communication.

use std::time::{Duration, SystemTime};

use crate::context::ExecutionContext;
use crate::coordinator::StageRequest;

/// Messages sent from a coordination thread to its owner.
#[derive(Debug, Clone)]
pub enum AnalysisMessage {
    /// The coordinator needs input; answer with
    /// [`CoordinationHandle::respond`](crate::channel::CoordinationHandle::respond).
    Request(StageRequest),
    /// A log message for the console.
    Log(LogEntry),
    /// The algorithm completed successfully.
    Complete {
        name: String,
        context: ExecutionContext,
        elapsed: Duration,
    },
    /// The invocation failed or was cancelled.
    Error { context: String, message: String },
}

/// Log level for console messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Info,
    Warning,
    Error,
    Success,
}

/// A log entry for the console.
#[derive(Debug, Clone)]
pub struct LogEntry {
    pub level: LogLevel,
    pub message: String,
    pub timestamp: SystemTime,
}

impl LogEntry {
    fn new(level: LogLevel, msg: impl Into<String>) -> Self {
        Self {
            level,
            message: msg.into(),
            timestamp: SystemTime::now(),
        }
    }

    pub fn info(msg: impl Into<String>) -> Self {
        Self::new(LogLevel::Info, msg)
    }

    pub fn warning(msg: impl Into<String>) -> Self {
        Self::new(LogLevel::Warning, msg)
    }

    pub fn error(msg: impl Into<String>) -> Self {
        Self::new(LogLevel::Error, msg)
    }

    pub fn success(msg: impl Into<String>) -> Self {
        Self::new(LogLevel::Success, msg)
    }
}
