//! Sink that repeats every event to several sinks.

use crate::domain::market::AccountStats;
use crate::domain::opportunity::ScanResult;
use crate::ports::scan_sink_port::{LogSeverity, ScanSink};

#[derive(Default)]
pub struct FanoutSink {
    sinks: Vec<Box<dyn ScanSink>>,
}

impl FanoutSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, sink: Box<dyn ScanSink>) -> Self {
        self.sinks.push(sink);
        self
    }
}

impl ScanSink for FanoutSink {
    fn on_log(&mut self, message: &str, severity: LogSeverity) {
        for sink in &mut self.sinks {
            sink.on_log(message, severity);
        }
    }

    fn on_stats(&mut self, stats: &AccountStats) {
        for sink in &mut self.sinks {
            sink.on_stats(stats);
        }
    }

    fn on_scan_result(&mut self, result: &ScanResult) {
        for sink in &mut self.sinks {
            sink.on_scan_result(result);
        }
    }
}
