//! Appends every ranked scan result to a CSV file.

use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};

use tracing::warn;

use crate::adapters::score_tracker::Signal;
use crate::domain::error::ScannerError;
use crate::domain::market::AccountStats;
use crate::domain::opportunity::ScanResult;
use crate::ports::scan_sink_port::{LogSeverity, ScanSink};

const HEADER: [&str; 11] = [
    "timestamp",
    "rank",
    "symbol",
    "score",
    "bias",
    "signal",
    "entry",
    "stop",
    "target",
    "lots",
    "adx",
];

pub struct CsvExportSink {
    path: PathBuf,
    writer: csv::Writer<File>,
}

impl CsvExportSink {
    /// Open `path` for appending. The header is written only to a new or empty file.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, ScannerError> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        let needs_header = file.metadata()?.len() == 0;

        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(file);
        if needs_header {
            writer.write_record(HEADER).map_err(csv_error)?;
            writer.flush()?;
        }
        Ok(Self { path, writer })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn write_result(&mut self, result: &ScanResult) -> Result<(), ScannerError> {
        let timestamp = result.timestamp.format("%Y-%m-%d %H:%M:%S").to_string();
        for (rank, opp) in result.opportunities.iter().enumerate() {
            self.writer
                .write_record([
                    timestamp.clone(),
                    (rank + 1).to_string(),
                    opp.symbol.clone(),
                    format!("{:.1}", opp.score),
                    opp.bias.to_string(),
                    Signal::from_score(opp.score).to_string(),
                    format!("{:.5}", opp.entry),
                    format!("{:.5}", opp.stop),
                    format!("{:.5}", opp.target),
                    opp.lots.to_string(),
                    format!("{:.1}", opp.trend_power),
                ])
                .map_err(csv_error)?;
        }
        self.writer.flush()?;
        Ok(())
    }
}

fn csv_error(e: csv::Error) -> ScannerError {
    ScannerError::Io(std::io::Error::other(e))
}

impl ScanSink for CsvExportSink {
    fn on_log(&mut self, _message: &str, _severity: LogSeverity) {}

    fn on_stats(&mut self, _stats: &AccountStats) {}

    fn on_scan_result(&mut self, result: &ScanResult) {
        if let Err(e) = self.write_result(result) {
            warn!(path = %self.path.display(), error = %e, "csv export failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::opportunity::Opportunity;
    use crate::domain::scoring::{Bias, ScoreCard};
    use chrono::{TimeZone, Utc};
    use tempfile::TempDir;

    fn result() -> ScanResult {
        let card = ScoreCard {
            trend: 1.0,
            momentum: 1.0,
            volatility: 1.0,
            structure: 1.0,
            liquidity: 1.0,
        };
        ScanResult::new(
            vec![
                Opportunity {
                    symbol: "EURUSD".into(),
                    score: 55.9,
                    bias: Bias::Bullish,
                    entry: 1.1052,
                    stop: 1.1037,
                    target: 1.1082,
                    lots: 3.33,
                    trend_power: 35.0,
                    breakdown: card,
                },
                Opportunity {
                    symbol: "XAUUSD".into(),
                    score: 88.0,
                    bias: Bias::Bearish,
                    entry: 2050.1,
                    stop: 2065.1,
                    target: 2020.1,
                    lots: 0.5,
                    trend_power: 41.0,
                    breakdown: card,
                },
            ],
            vec![],
            Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap(),
        )
    }

    #[test]
    fn writes_header_once_and_appends() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("scan.csv");

        let mut sink = CsvExportSink::open(&path).unwrap();
        sink.on_scan_result(&result());
        drop(sink);

        let mut sink = CsvExportSink::open(&path).unwrap();
        sink.on_scan_result(&result());
        drop(sink);

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 5);
        assert_eq!(lines[0], HEADER.join(","));
        assert_eq!(
            lines[1],
            "2024-03-01 12:00:00,1,XAUUSD,88.0,BEARISH,TRADE NOW,2050.10000,2065.10000,2020.10000,0.5,41.0"
        );
        assert!(lines[2].starts_with("2024-03-01 12:00:00,2,EURUSD,55.9,BULLISH,WAIT,1.10520"));
    }

    #[test]
    fn open_fails_for_missing_directory() {
        assert!(CsvExportSink::open("/nonexistent/dir/scan.csv").is_err());
    }
}
