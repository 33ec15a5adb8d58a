//! Sink that forwards scanner output over an mpsc channel.

use std::sync::mpsc::Sender;

use crate::domain::market::AccountStats;
use crate::domain::opportunity::ScanResult;
use crate::ports::scan_sink_port::{LogSeverity, ScanSink};

/// Everything the scanner publishes, as one message type.
#[derive(Debug, Clone, PartialEq)]
pub enum ScanEvent {
    Log {
        message: String,
        severity: LogSeverity,
    },
    Stats(AccountStats),
    Result(ScanResult),
}

impl ScanEvent {
    /// Replay this event into another sink, e.g. on the consuming thread.
    pub fn deliver(self, sink: &mut dyn ScanSink) {
        match self {
            ScanEvent::Log { message, severity } => sink.on_log(&message, severity),
            ScanEvent::Stats(stats) => sink.on_stats(&stats),
            ScanEvent::Result(result) => sink.on_scan_result(&result),
        }
    }
}

/// Fire-and-forget: sends never block, and a hung-up receiver is ignored.
#[derive(Debug, Clone)]
pub struct ChannelSink {
    tx: Sender<ScanEvent>,
}

impl ChannelSink {
    pub fn new(tx: Sender<ScanEvent>) -> Self {
        Self { tx }
    }
}

impl ScanSink for ChannelSink {
    fn on_log(&mut self, message: &str, severity: LogSeverity) {
        let _ = self.tx.send(ScanEvent::Log {
            message: message.to_string(),
            severity,
        });
    }

    fn on_stats(&mut self, stats: &AccountStats) {
        let _ = self.tx.send(ScanEvent::Stats(*stats));
    }

    fn on_scan_result(&mut self, result: &ScanResult) {
        let _ = self.tx.send(ScanEvent::Result(result.clone()));
    }
}
