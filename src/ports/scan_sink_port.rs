//! Presentation sink port. Every call is one-way.

use std::fmt;

use crate::domain::market::AccountStats;
use crate::domain::opportunity::ScanResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogSeverity {
    Info,
    Success,
    Warning,
    Error,
}

impl fmt::Display for LogSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogSeverity::Info => write!(f, "info"),
            LogSeverity::Success => write!(f, "success"),
            LogSeverity::Warning => write!(f, "warning"),
            LogSeverity::Error => write!(f, "error"),
        }
    }
}

/// Consumer of scanner output. Implementations must not block the scanner.
pub trait ScanSink: Send {
    fn on_log(&mut self, message: &str, severity: LogSeverity);
    fn on_stats(&mut self, stats: &AccountStats);
    fn on_scan_result(&mut self, result: &ScanResult);
}
