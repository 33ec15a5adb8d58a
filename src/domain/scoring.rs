//! Five-factor setup-quality score.
//!
//! Each factor is normalised to [0, 1] before weighting:
//!
//! | Factor     | Weight | Measures                                          |
//! |------------|--------|---------------------------------------------------|
//! | Trend      | 0.30   | distance from the trend filter in ATRs, plus ADX  |
//! | Momentum   | 0.20   | RSI on the side of the bias, peaking at 75 / 25   |
//! | Volatility | 0.15   | ATR as a fraction of price, 0.05 % to 0.25 %      |
//! | Structure  | 0.25   | proximity to the channel boundary ahead           |
//! | Liquidity  | 0.10   | spread against 20 % of ATR                        |
//!
//! The composite is `100 * weighted sum`, rounded to one decimal with ties to even.

use std::fmt;

use crate::domain::error::SkipReason;
use crate::domain::indicator::IndicatorSnapshot;
use crate::domain::market::{Quote, SymbolMetadata};

pub const TREND_WEIGHT: f64 = 0.30;
pub const MOMENTUM_WEIGHT: f64 = 0.20;
pub const VOLATILITY_WEIGHT: f64 = 0.15;
pub const STRUCTURE_WEIGHT: f64 = 0.25;
pub const LIQUIDITY_WEIGHT: f64 = 0.10;

const ADX_FLOOR: f64 = 20.0;
const ADX_BAND: f64 = 25.0;
const RSI_MID: f64 = 50.0;
const RSI_BAND: f64 = 25.0;
const ATR_PCT_FLOOR: f64 = 0.0005;
const ATR_PCT_BAND: f64 = 0.002;
const TREND_ATR_SPAN: f64 = 2.0;
const STRUCTURE_ATR_SPAN: f64 = 1.5;
const SPREAD_ATR_FRACTION: f64 = 0.2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Bias {
    Bullish,
    Bearish,
    Neutral,
}

impl fmt::Display for Bias {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Bias::Bullish => write!(f, "BULLISH"),
            Bias::Bearish => write!(f, "BEARISH"),
            Bias::Neutral => write!(f, "NEUTRAL"),
        }
    }
}

/// Bias from the position of the close relative to the trend filter.
pub fn determine_bias(close: f64, trend_filter: f64) -> Bias {
    if close > trend_filter {
        Bias::Bullish
    } else if close < trend_filter {
        Bias::Bearish
    } else {
        Bias::Neutral
    }
}

/// Clamp to [0, 1]. NaN maps to 0.
pub fn clamp01(x: f64) -> f64 {
    if x.is_nan() { 0.0 } else { x.clamp(0.0, 1.0) }
}

pub fn trend_score(close: f64, trend_filter: f64, volatility: f64, trend_power: f64) -> f64 {
    let stretch = clamp01((close - trend_filter).abs() / (TREND_ATR_SPAN * volatility));
    let adx_norm = clamp01((trend_power - ADX_FLOOR) / ADX_BAND);
    clamp01(0.6 * stretch + 0.4 * adx_norm)
}

pub fn momentum_score(bias: Bias, rsi: f64) -> f64 {
    match bias {
        Bias::Bullish => clamp01((rsi - RSI_MID) / RSI_BAND),
        Bias::Bearish => clamp01((RSI_MID - rsi) / RSI_BAND),
        Bias::Neutral => 0.0,
    }
}

pub fn volatility_score(volatility: f64, close: f64) -> f64 {
    let atr_pct = volatility / close;
    clamp01((atr_pct - ATR_PCT_FLOOR) / ATR_PCT_BAND)
}

/// Proximity of the price to the channel boundary in the direction of the bias.
///
/// Bullish measures ask to the channel high, bearish the bid to the channel low.
pub fn structure_score(
    bias: Bias,
    quote: &Quote,
    channel_high: f64,
    channel_low: f64,
    volatility: f64,
) -> f64 {
    let distance = match bias {
        Bias::Bullish => (channel_high - quote.ask).abs(),
        Bias::Bearish => (quote.bid - channel_low).abs(),
        Bias::Neutral => return 0.0,
    };
    1.0 - clamp01(distance / (STRUCTURE_ATR_SPAN * volatility))
}

pub fn liquidity_score(quote: &Quote, point_size: f64, volatility: f64) -> f64 {
    let spread_points = quote.spread() / point_size;
    let atr_points = volatility / point_size;
    clamp01(1.0 - spread_points / (SPREAD_ATR_FRACTION * atr_points))
}

/// Normalised sub-scores for one symbol.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreCard {
    pub trend: f64,
    pub momentum: f64,
    pub volatility: f64,
    pub structure: f64,
    pub liquidity: f64,
}

impl ScoreCard {
    pub fn weighted_sum(&self) -> f64 {
        TREND_WEIGHT * self.trend
            + MOMENTUM_WEIGHT * self.momentum
            + VOLATILITY_WEIGHT * self.volatility
            + STRUCTURE_WEIGHT * self.structure
            + LIQUIDITY_WEIGHT * self.liquidity
    }

    /// Composite score on a 0-100 scale, one decimal.
    pub fn total(&self) -> f64 {
        round_to_tenth(100.0 * self.weighted_sum())
    }
}

/// Nearest value with one decimal, ties to even.
///
/// Decided on the exact binary value, so `1.15` (stored just below the tie) rounds
/// down rather than being pushed up by an intermediate `x * 10.0`.
pub fn round_to_tenth(x: f64) -> f64 {
    format!("{:.1}", x).parse().unwrap_or(x)
}

/// Bias and sub-scores for one symbol.
///
/// Skips the symbol when a normalisation would be undefined or the bias cannot
/// support a trade.
pub fn score_symbol(
    snapshot: &IndicatorSnapshot,
    quote: &Quote,
    metadata: &SymbolMetadata,
) -> Result<(Bias, ScoreCard), SkipReason> {
    if !(snapshot.volatility > 0.0) {
        return Err(SkipReason::ComputeUndefined("volatility".to_string()));
    }
    if !(snapshot.close > 0.0) {
        return Err(SkipReason::ComputeUndefined("close".to_string()));
    }
    if !(metadata.point_size > 0.0) {
        return Err(SkipReason::UnknownSymbol);
    }

    let bias = determine_bias(snapshot.close, snapshot.trend_filter);
    if bias == Bias::Neutral {
        return Err(SkipReason::NeutralBias);
    }

    let card = ScoreCard {
        trend: trend_score(
            snapshot.close,
            snapshot.trend_filter,
            snapshot.volatility,
            snapshot.trend_power,
        ),
        momentum: momentum_score(bias, snapshot.momentum),
        volatility: volatility_score(snapshot.volatility, snapshot.close),
        structure: structure_score(
            bias,
            quote,
            snapshot.channel_high,
            snapshot.channel_low,
            snapshot.volatility,
        ),
        liquidity: liquidity_score(quote, metadata.point_size, snapshot.volatility),
    };

    Ok((bias, card))
}
