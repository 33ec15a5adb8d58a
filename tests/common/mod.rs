#![allow(dead_code)]

use chrono::{NaiveDate, NaiveDateTime};
use setupscan::adapters::channel_sink::ScanEvent;
use setupscan::domain::error::ScannerError;
use setupscan::domain::market::{AccountSnapshot, AccountStats, Quote, SymbolMetadata, Timeframe};
pub use setupscan::domain::ohlcv::Candle;
use setupscan::domain::opportunity::ScanResult;
use setupscan::ports::market_data_port::MarketDataProvider;
use setupscan::ports::scan_sink_port::{LogSeverity, ScanSink};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Frozen market data keyed by symbol.
pub struct MockProvider {
    pub candles: HashMap<String, Vec<Candle>>,
    pub quotes: HashMap<String, Quote>,
    pub metadata: HashMap<String, SymbolMetadata>,
    pub errors: HashMap<String, String>,
    pub account: Option<AccountSnapshot>,
    pub reachable: bool,
    pub connected: Arc<AtomicBool>,
    pub candle_requests: Arc<AtomicUsize>,
}

impl MockProvider {
    pub fn new() -> Self {
        Self {
            candles: HashMap::new(),
            quotes: HashMap::new(),
            metadata: HashMap::new(),
            errors: HashMap::new(),
            account: Some(AccountSnapshot {
                balance: 10_000.0,
                equity: 10_000.0,
            }),
            reachable: true,
            connected: Arc::new(AtomicBool::new(false)),
            candle_requests: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Candles, quote and FX-style metadata for one symbol.
    pub fn with_symbol(mut self, symbol: &str, candles: Vec<Candle>, quote: Quote) -> Self {
        self.candles.insert(symbol.to_string(), candles);
        self.quotes.insert(symbol.to_string(), quote);
        self.metadata.insert(symbol.to_string(), fx_metadata());
        self
    }

    pub fn with_metadata(mut self, symbol: &str, metadata: SymbolMetadata) -> Self {
        self.metadata.insert(symbol.to_string(), metadata);
        self
    }

    pub fn with_error(mut self, symbol: &str, reason: &str) -> Self {
        self.errors.insert(symbol.to_string(), reason.to_string());
        self
    }

    pub fn with_account(mut self, balance: f64, equity: f64) -> Self {
        self.account = Some(AccountSnapshot { balance, equity });
        self
    }

    pub fn unreachable(mut self) -> Self {
        self.reachable = false;
        self
    }

    fn check(&self, symbol: &str) -> Result<(), ScannerError> {
        match self.errors.get(symbol) {
            Some(reason) => Err(ScannerError::DataUnavailable {
                symbol: symbol.to_string(),
                reason: reason.clone(),
            }),
            None => Ok(()),
        }
    }
}

impl MarketDataProvider for MockProvider {
    fn connect(&mut self) -> Result<(), ScannerError> {
        if !self.reachable {
            return Err(ScannerError::Connection {
                reason: "terminal not running".into(),
            });
        }
        self.connected.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn disconnect(&mut self) {
        self.connected.store(false, Ordering::SeqCst);
    }

    fn get_account_snapshot(&self) -> Result<AccountSnapshot, ScannerError> {
        self.account.ok_or_else(|| ScannerError::DataUnavailable {
            symbol: "account".into(),
            reason: "account info unavailable".into(),
        })
    }

    fn get_candles(
        &self,
        symbol: &str,
        _timeframe: Timeframe,
        count: usize,
    ) -> Result<Vec<Candle>, ScannerError> {
        self.candle_requests.fetch_add(1, Ordering::SeqCst);
        self.check(symbol)?;
        let candles = self
            .candles
            .get(symbol)
            .ok_or_else(|| ScannerError::UnknownSymbol {
                symbol: symbol.to_string(),
            })?;
        if candles.len() < count {
            return Err(ScannerError::DataUnavailable {
                symbol: symbol.to_string(),
                reason: format!("only {} bars", candles.len()),
            });
        }
        Ok(candles[candles.len() - count..].to_vec())
    }

    fn get_quote(&self, symbol: &str) -> Result<Quote, ScannerError> {
        self.check(symbol)?;
        self.quotes
            .get(symbol)
            .copied()
            .ok_or_else(|| ScannerError::UnknownSymbol {
                symbol: symbol.to_string(),
            })
    }

    fn get_symbol_metadata(&self, symbol: &str) -> Result<SymbolMetadata, ScannerError> {
        self.check(symbol)?;
        self.metadata
            .get(symbol)
            .copied()
            .ok_or_else(|| ScannerError::UnknownSymbol {
                symbol: symbol.to_string(),
            })
    }
}

/// Sink that records every event; clones share the same log.
#[derive(Clone, Default)]
pub struct RecordingSink {
    pub events: Arc<Mutex<Vec<ScanEvent>>>,
}

impl RecordingSink {
    pub fn events(&self) -> Vec<ScanEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn logs(&self) -> Vec<(String, LogSeverity)> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                ScanEvent::Log { message, severity } => Some((message, severity)),
                _ => None,
            })
            .collect()
    }

    pub fn stats(&self) -> Vec<AccountStats> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                ScanEvent::Stats(s) => Some(s),
                _ => None,
            })
            .collect()
    }

    pub fn results(&self) -> Vec<ScanResult> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                ScanEvent::Result(r) => Some(r),
                _ => None,
            })
            .collect()
    }
}

impl ScanSink for RecordingSink {
    fn on_log(&mut self, message: &str, severity: LogSeverity) {
        self.events.lock().unwrap().push(ScanEvent::Log {
            message: message.to_string(),
            severity,
        });
    }

    fn on_stats(&mut self, stats: &AccountStats) {
        self.events.lock().unwrap().push(ScanEvent::Stats(*stats));
    }

    fn on_scan_result(&mut self, result: &ScanResult) {
        self.events
            .lock()
            .unwrap()
            .push(ScanEvent::Result(result.clone()));
    }
}

pub fn fx_metadata() -> SymbolMetadata {
    SymbolMetadata {
        point_size: 0.0001,
        tick_value: 1.0,
        volume_min: 0.01,
        volume_max: 100.0,
        volume_step: 0.01,
    }
}

fn start_time() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 1, 1)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap()
}

/// `count` hourly candles drifting by `drift` per bar around `base`, with a small
/// oscillation so RSI and ADX stay off their extremes.
pub fn trending_candles(count: usize, base: f64, drift: f64) -> Vec<Candle> {
    (0..count)
        .map(|i| {
            let wave = (i as f64 * 0.9).sin() * base * 0.0008;
            let close = base + drift * i as f64 + wave;
            let open = close - drift;
            Candle {
                time: start_time() + chrono::Duration::hours(i as i64),
                open,
                high: open.max(close) + base * 0.0004,
                low: open.min(close) - base * 0.0004,
                close,
                volume: 1000.0,
            }
        })
        .collect()
}

/// Quote straddling the last close with `spread` between bid and ask.
pub fn quote_at_last(candles: &[Candle], spread: f64) -> Quote {
    let close = candles.last().map(|c| c.close).unwrap_or(1.0);
    Quote {
        bid: close - spread / 2.0,
        ask: close + spread / 2.0,
    }
}
