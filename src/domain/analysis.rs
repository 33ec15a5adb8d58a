//! Per-symbol evaluation: candles → indicators → score → trade setup.

use crate::domain::error::SkipReason;
use crate::domain::indicator::{compute_snapshot, IndicatorParams};
use crate::domain::market::Timeframe;
use crate::domain::opportunity::Opportunity;
use crate::domain::scoring::score_symbol;
use crate::domain::trade_setup::{compute_setup, RiskParams};
use crate::ports::market_data_port::MarketDataProvider;

/// Inputs shared by every symbol in one cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisContext {
    pub timeframe: Timeframe,
    pub min_bars: usize,
    pub indicators: IndicatorParams,
    pub risk: RiskParams,
    /// Account balance polled at the top of the cycle.
    pub balance: f64,
}

/// Evaluate one symbol. Any failure is returned as the reason it was skipped.
pub fn analyze_symbol(
    provider: &dyn MarketDataProvider,
    symbol: &str,
    ctx: &AnalysisContext,
) -> Result<Opportunity, SkipReason> {
    let candles = provider.get_candles(symbol, ctx.timeframe, ctx.min_bars)?;
    if candles.len() < ctx.min_bars {
        return Err(SkipReason::InsufficientBars {
            bars: candles.len(),
            minimum: ctx.min_bars,
        });
    }

    let snapshot = compute_snapshot(&candles, &ctx.indicators)?;
    let quote = provider.get_quote(symbol)?;
    let metadata = provider.get_symbol_metadata(symbol)?;

    let (bias, breakdown) = score_symbol(&snapshot, &quote, &metadata)?;
    let setup = compute_setup(
        bias,
        &quote,
        snapshot.volatility,
        &ctx.risk,
        ctx.balance,
        &metadata,
    )
    .ok_or(SkipReason::NeutralBias)?;

    Ok(Opportunity {
        symbol: symbol.to_string(),
        score: breakdown.total(),
        bias,
        entry: setup.entry,
        stop: setup.stop,
        target: setup.target,
        lots: setup.lots,
        trend_power: snapshot.trend_power,
        breakdown,
    })
}
