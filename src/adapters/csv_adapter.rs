//! CSV replay market data provider.
//!
//! Serves frozen market data from a directory:
//!
//! - `<SYMBOL>_<TF>.csv` with `time,open,high,low,close,volume` per candle
//! - `symbols.csv` with `symbol,bid,ask,point_size,tick_value,volume_min,volume_max,volume_step`
//!
//! The account snapshot is fixed at construction.

use chrono::{NaiveDate, NaiveDateTime};
use csv::StringRecord;
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use tracing::debug;

use crate::domain::error::ScannerError;
use crate::domain::market::{AccountSnapshot, Quote, SymbolMetadata, Timeframe};
use crate::domain::ohlcv::Candle;
use crate::ports::market_data_port::MarketDataProvider;

pub const SYMBOLS_FILE: &str = "symbols.csv";

#[derive(Debug, Clone, PartialEq)]
struct SymbolRow {
    quote: Quote,
    metadata: SymbolMetadata,
}

pub struct CsvReplayProvider {
    base_path: PathBuf,
    account: AccountSnapshot,
    symbols: HashMap<String, SymbolRow>,
    connected: bool,
}

impl CsvReplayProvider {
    pub fn new(base_path: PathBuf, account: AccountSnapshot) -> Self {
        Self {
            base_path,
            account,
            symbols: HashMap::new(),
            connected: false,
        }
    }

    fn csv_path(&self, symbol: &str, timeframe: Timeframe) -> PathBuf {
        self.base_path.join(format!("{}_{}.csv", symbol, timeframe))
    }

    fn require_connected(&self, symbol: &str) -> Result<(), ScannerError> {
        if self.connected {
            Ok(())
        } else {
            Err(ScannerError::DataUnavailable {
                symbol: symbol.to_string(),
                reason: "provider not connected".into(),
            })
        }
    }

    fn symbol_row(&self, symbol: &str) -> Result<&SymbolRow, ScannerError> {
        self.require_connected(symbol)?;
        self.symbols
            .get(symbol)
            .ok_or_else(|| ScannerError::UnknownSymbol {
                symbol: symbol.to_string(),
            })
    }

    fn load_symbols(&self) -> Result<HashMap<String, SymbolRow>, ScannerError> {
        let path = self.base_path.join(SYMBOLS_FILE);
        let content = fs::read_to_string(&path).map_err(|e| ScannerError::Connection {
            reason: format!("failed to read {}: {}", path.display(), e),
        })?;

        let mut rdr = csv::Reader::from_reader(content.as_bytes());
        let mut symbols = HashMap::new();

        for result in rdr.records() {
            let record = result.map_err(|e| ScannerError::Connection {
                reason: format!("{} parse error: {}", SYMBOLS_FILE, e),
            })?;
            let symbol = record
                .get(0)
                .map(|s| s.trim().to_uppercase())
                .filter(|s| !s.is_empty())
                .ok_or_else(|| ScannerError::Connection {
                    reason: format!("{}: missing symbol column", SYMBOLS_FILE),
                })?;

            let field = |idx: usize, name: &str| {
                parse_field(&record, idx, name).map_err(|reason| ScannerError::Connection {
                    reason: format!("{} ({}): {}", SYMBOLS_FILE, symbol, reason),
                })
            };

            let row = SymbolRow {
                quote: Quote {
                    bid: field(1, "bid")?,
                    ask: field(2, "ask")?,
                },
                metadata: SymbolMetadata {
                    point_size: field(3, "point_size")?,
                    tick_value: field(4, "tick_value")?,
                    volume_min: field(5, "volume_min")?,
                    volume_max: field(6, "volume_max")?,
                    volume_step: field(7, "volume_step")?,
                },
            };
            symbols.insert(symbol, row);
        }

        Ok(symbols)
    }
}

fn parse_field(record: &StringRecord, idx: usize, name: &str) -> Result<f64, String> {
    record
        .get(idx)
        .ok_or_else(|| format!("missing {} column", name))?
        .trim()
        .parse()
        .map_err(|e| format!("invalid {} value: {}", name, e))
}

fn parse_time(value: &str) -> Result<NaiveDateTime, String> {
    let value = value.trim();
    for format in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M", "%Y-%m-%dT%H:%M:%S"] {
        if let Ok(time) = NaiveDateTime::parse_from_str(value, format) {
            return Ok(time);
        }
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .ok_or_else(|| format!("invalid time format: {}", value))
}

impl MarketDataProvider for CsvReplayProvider {
    fn connect(&mut self) -> Result<(), ScannerError> {
        if !self.base_path.is_dir() {
            return Err(ScannerError::Connection {
                reason: format!("data directory {} not found", self.base_path.display()),
            });
        }
        self.symbols = self.load_symbols()?;
        self.connected = true;
        debug!(
            dir = %self.base_path.display(),
            symbols = self.symbols.len(),
            "replay provider connected"
        );
        Ok(())
    }

    fn disconnect(&mut self) {
        self.connected = false;
        self.symbols.clear();
    }

    fn get_account_snapshot(&self) -> Result<AccountSnapshot, ScannerError> {
        self.require_connected("account")?;
        Ok(self.account)
    }

    fn get_candles(
        &self,
        symbol: &str,
        timeframe: Timeframe,
        count: usize,
    ) -> Result<Vec<Candle>, ScannerError> {
        self.require_connected(symbol)?;
        let unavailable = |reason: String| ScannerError::DataUnavailable {
            symbol: symbol.to_string(),
            reason,
        };

        let path = self.csv_path(symbol, timeframe);
        let content = fs::read_to_string(&path)
            .map_err(|e| unavailable(format!("failed to read {}: {}", path.display(), e)))?;

        let mut rdr = csv::Reader::from_reader(content.as_bytes());
        let mut candles = Vec::new();

        for result in rdr.records() {
            let record = result.map_err(|e| unavailable(format!("CSV parse error: {}", e)))?;
            let time = record
                .get(0)
                .ok_or_else(|| "missing time column".to_string())
                .and_then(parse_time)
                .map_err(unavailable)?;

            candles.push(Candle {
                time,
                open: parse_field(&record, 1, "open").map_err(unavailable)?,
                high: parse_field(&record, 2, "high").map_err(unavailable)?,
                low: parse_field(&record, 3, "low").map_err(unavailable)?,
                close: parse_field(&record, 4, "close").map_err(unavailable)?,
                volume: parse_field(&record, 5, "volume").map_err(unavailable)?,
            });
        }

        candles.sort_by_key(|c| c.time);
        if candles.len() < count {
            return Err(unavailable(format!(
                "only {} bars, {} requested",
                candles.len(),
                count
            )));
        }
        Ok(candles.split_off(candles.len() - count))
    }

    fn get_quote(&self, symbol: &str) -> Result<Quote, ScannerError> {
        self.symbol_row(symbol).map(|row| row.quote)
    }

    fn get_symbol_metadata(&self, symbol: &str) -> Result<SymbolMetadata, ScannerError> {
        self.symbol_row(symbol).map(|row| row.metadata)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn account() -> AccountSnapshot {
        AccountSnapshot {
            balance: 10_000.0,
            equity: 10_050.0,
        }
    }

    fn setup_test_data() -> (TempDir, PathBuf) {
        let dir = TempDir::new().unwrap();
        let path = dir.path().to_path_buf();

        let csv_content = "time,open,high,low,close,volume\n\
            2024-01-15 10:00:00,1.1000,1.1010,1.0990,1.1005,500\n\
            2024-01-15 08:00:00,1.0980,1.0995,1.0975,1.0990,600\n\
            2024-01-15 09:00:00,1.0990,1.1002,1.0985,1.1000,550\n";

        fs::write(path.join("EURUSD_H1.csv"), csv_content).unwrap();
        fs::write(
            path.join(SYMBOLS_FILE),
            "symbol,bid,ask,point_size,tick_value,volume_min,volume_max,volume_step\n\
             EURUSD,1.1004,1.1006,0.0001,1.0,0.01,100,0.01\n\
             xauusd,2050.10,2050.40,0.01,1.0,0.01,50,0.01\n",
        )
        .unwrap();

        (dir, path)
    }

    fn connected(path: PathBuf) -> CsvReplayProvider {
        let mut provider = CsvReplayProvider::new(path, account());
        provider.connect().unwrap();
        provider
    }

    #[test]
    fn candles_sorted_oldest_first() {
        let (_dir, path) = setup_test_data();
        let provider = connected(path);

        let candles = provider.get_candles("EURUSD", Timeframe::H1, 3).unwrap();
        assert_eq!(candles.len(), 3);
        assert_eq!(candles[0].close, 1.0990);
        assert_eq!(candles[2].close, 1.1005);
        assert_eq!(candles[2].volume, 500.0);
    }

    #[test]
    fn candles_returns_most_recent_count() {
        let (_dir, path) = setup_test_data();
        let provider = connected(path);

        let candles = provider.get_candles("EURUSD", Timeframe::H1, 2).unwrap();
        assert_eq!(candles.len(), 2);
        assert_eq!(candles[0].close, 1.1000);
    }

    #[test]
    fn too_few_candles_is_unavailable() {
        let (_dir, path) = setup_test_data();
        let provider = connected(path);

        let err = provider.get_candles("EURUSD", Timeframe::H1, 250).unwrap_err();
        assert!(matches!(err, ScannerError::DataUnavailable { .. }));
    }

    #[test]
    fn missing_timeframe_file_is_unavailable() {
        let (_dir, path) = setup_test_data();
        let provider = connected(path);

        let err = provider.get_candles("EURUSD", Timeframe::D1, 1).unwrap_err();
        assert!(matches!(err, ScannerError::DataUnavailable { symbol, .. } if symbol == "EURUSD"));
    }

    #[test]
    fn quote_and_metadata_from_symbols_file() {
        let (_dir, path) = setup_test_data();
        let provider = connected(path);

        let quote = provider.get_quote("EURUSD").unwrap();
        assert_eq!(quote.bid, 1.1004);
        assert_eq!(quote.ask, 1.1006);

        let meta = provider.get_symbol_metadata("XAUUSD").unwrap();
        assert_eq!(meta.point_size, 0.01);
        assert_eq!(meta.volume_max, 50.0);
    }

    #[test]
    fn unknown_symbol() {
        let (_dir, path) = setup_test_data();
        let provider = connected(path);

        assert!(matches!(
            provider.get_quote("GBPUSD"),
            Err(ScannerError::UnknownSymbol { .. })
        ));
    }

    #[test]
    fn account_is_fixed() {
        let (_dir, path) = setup_test_data();
        let provider = connected(path);
        assert_eq!(provider.get_account_snapshot().unwrap(), account());
    }

    #[test]
    fn connect_fails_for_missing_directory() {
        let mut provider = CsvReplayProvider::new(PathBuf::from("/nonexistent/replay"), account());
        assert!(matches!(
            provider.connect(),
            Err(ScannerError::Connection { .. })
        ));
    }

    #[test]
    fn connect_fails_without_symbols_file() {
        let dir = TempDir::new().unwrap();
        let mut provider = CsvReplayProvider::new(dir.path().to_path_buf(), account());
        assert!(matches!(
            provider.connect(),
            Err(ScannerError::Connection { .. })
        ));
    }

    #[test]
    fn fetch_before_connect_fails() {
        let (_dir, path) = setup_test_data();
        let provider = CsvReplayProvider::new(path, account());
        assert!(provider.get_account_snapshot().is_err());
        assert!(provider.get_quote("EURUSD").is_err());
    }

    #[test]
    fn disconnect_releases_state() {
        let (_dir, path) = setup_test_data();
        let mut provider = connected(path);
        provider.disconnect();
        assert!(provider.get_quote("EURUSD").is_err());
    }

    #[test]
    fn parse_time_formats() {
        assert!(parse_time("2024-01-15 10:00:00").is_ok());
        assert!(parse_time("2024-01-15 10:00").is_ok());
        assert!(parse_time("2024-01-15T10:00:00").is_ok());
        assert!(parse_time("2024-01-15").is_ok());
        assert!(parse_time("15/01/2024").is_err());
    }
}
