//! Technical indicators and the per-symbol indicator snapshot.
//!
//! Every indicator is a causal, streaming computation over a chronological candle
//! slice and yields an `IndicatorSeries` aligned one-to-one with its input. Points
//! inside an indicator's warm-up carry `None`.
//!
//! - `IndicatorType`: indicator identity + parameters
//! - `IndicatorSeries`: a time series of optional values
//! - `IndicatorParams`: lookback windows used by the scanner
//! - `IndicatorSnapshot`: latest values of every indicator for one symbol

pub mod adx;
pub mod atr;
pub mod channel;
pub mod ema;
pub mod rsi;

use chrono::NaiveDateTime;
use std::fmt;

use crate::domain::error::SkipReason;
use crate::domain::ohlcv::Candle;

#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorPoint {
    pub time: NaiveDateTime,
    pub value: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum IndicatorType {
    Ema(usize),
    Atr(usize),
    Rsi(usize),
    Adx(usize),
    ChannelHigh(usize),
    ChannelLow(usize),
}

#[derive(Debug, Clone)]
pub struct IndicatorSeries {
    pub indicator_type: IndicatorType,
    pub values: Vec<IndicatorPoint>,
}

impl IndicatorSeries {
    pub(crate) fn new(indicator_type: IndicatorType, candles: &[Candle], raw: Vec<Option<f64>>) -> Self {
        let values = candles
            .iter()
            .zip(raw)
            .map(|(c, value)| IndicatorPoint {
                time: c.time,
                value,
            })
            .collect();
        IndicatorSeries {
            indicator_type,
            values,
        }
    }

    /// Value at the most recent candle, if it is past warm-up.
    pub fn latest(&self) -> Option<f64> {
        self.values.last().and_then(|p| p.value)
    }

    /// Latest value, or `ComputeUndefined` naming this indicator.
    pub fn require_latest(&self) -> Result<f64, SkipReason> {
        match self.latest() {
            Some(v) if v.is_finite() => Ok(v),
            _ => Err(SkipReason::ComputeUndefined(self.indicator_type.to_string())),
        }
    }
}

impl fmt::Display for IndicatorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndicatorType::Ema(period) => write!(f, "EMA({})", period),
            IndicatorType::Atr(period) => write!(f, "ATR({})", period),
            IndicatorType::Rsi(period) => write!(f, "RSI({})", period),
            IndicatorType::Adx(period) => write!(f, "ADX({})", period),
            IndicatorType::ChannelHigh(lookback) => write!(f, "DCU({})", lookback),
            IndicatorType::ChannelLow(lookback) => write!(f, "DCL({})", lookback),
        }
    }
}

/// Lookback windows for the scanner's indicators.
#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorParams {
    pub ema_period: usize,
    pub atr_period: usize,
    pub rsi_period: usize,
    pub adx_period: usize,
    pub channel_lookback: usize,
}

impl Default for IndicatorParams {
    fn default() -> Self {
        IndicatorParams {
            ema_period: 200,
            atr_period: 14,
            rsi_period: 14,
            adx_period: 14,
            channel_lookback: 20,
        }
    }
}

impl IndicatorParams {
    /// Smallest candle count for which every indicator has a value at the last bar.
    pub fn warmup_bars(&self) -> usize {
        [
            self.ema_period,
            self.atr_period,
            self.rsi_period + 1,
            2 * self.adx_period,
            self.channel_lookback,
        ]
        .into_iter()
        .max()
        .unwrap_or(0)
    }
}

/// Latest indicator values for one symbol, evaluated at the last candle.
#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorSnapshot {
    pub close: f64,
    pub trend_filter: f64,
    pub volatility: f64,
    pub momentum: f64,
    pub trend_power: f64,
    pub channel_high: f64,
    pub channel_low: f64,
}

/// Derive the snapshot for the most recent candle.
///
/// Fails with `InsufficientBars` when the slice is shorter than the warm-up and with
/// `ComputeUndefined` when any indicator has no finite value at the last candle.
pub fn compute_snapshot(
    candles: &[Candle],
    params: &IndicatorParams,
) -> Result<IndicatorSnapshot, SkipReason> {
    let minimum = params.warmup_bars();
    if candles.len() < minimum {
        return Err(SkipReason::InsufficientBars {
            bars: candles.len(),
            minimum,
        });
    }
    let last = candles
        .last()
        .ok_or_else(|| SkipReason::ComputeUndefined("close".into()))?;

    let (channel_high, channel_low) = channel::calculate_channel(candles, params.channel_lookback);

    Ok(IndicatorSnapshot {
        close: last.close,
        trend_filter: ema::calculate_ema(candles, params.ema_period).require_latest()?,
        volatility: atr::calculate_atr(candles, params.atr_period).require_latest()?,
        momentum: rsi::calculate_rsi(candles, params.rsi_period).require_latest()?,
        trend_power: adx::calculate_adx(candles, params.adx_period).require_latest()?,
        channel_high: channel_high.require_latest()?,
        channel_low: channel_low.require_latest()?,
    })
}
