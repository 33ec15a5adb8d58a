//! Market data and broker access port.

use crate::domain::error::ScannerError;
use crate::domain::market::{AccountSnapshot, Quote, SymbolMetadata, Timeframe};
use crate::domain::ohlcv::Candle;

/// Blocking access to a broker or data source.
///
/// Fetches take `&self` so a provider can be shared across worker threads while a
/// cycle runs. Connection management takes `&mut self` and only happens between
/// cycles.
pub trait MarketDataProvider: Send + Sync {
    fn connect(&mut self) -> Result<(), ScannerError>;

    fn disconnect(&mut self);

    fn get_account_snapshot(&self) -> Result<AccountSnapshot, ScannerError>;

    /// The most recent `count` candles, oldest first. Fails rather than returning fewer.
    fn get_candles(
        &self,
        symbol: &str,
        timeframe: Timeframe,
        count: usize,
    ) -> Result<Vec<Candle>, ScannerError>;

    fn get_quote(&self, symbol: &str) -> Result<Quote, ScannerError>;

    fn get_symbol_metadata(&self, symbol: &str) -> Result<SymbolMetadata, ScannerError>;
}
