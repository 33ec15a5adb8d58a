//! Average True Range with Wilder's smoothing, used as the volatility measure.
//!
//! TR[0] = high - low; TR[i] = max(high-low, |high-prevClose|, |low-prevClose|).
//! Seed: mean of the first n true ranges; then ATR = (prev*(n-1) + TR) / n.
//! Warmup: first (n-1) candles have no value.

use crate::domain::indicator::{IndicatorSeries, IndicatorType};
use crate::domain::ohlcv::Candle;

pub fn calculate_atr(candles: &[Candle], period: usize) -> IndicatorSeries {
    IndicatorSeries::new(IndicatorType::Atr(period), candles, atr_values(candles, period))
}

pub(crate) fn true_ranges(candles: &[Candle]) -> Vec<f64> {
    candles
        .iter()
        .enumerate()
        .map(|(i, c)| {
            if i == 0 {
                c.high - c.low
            } else {
                c.true_range(candles[i - 1].close)
            }
        })
        .collect()
}

fn atr_values(candles: &[Candle], period: usize) -> Vec<Option<f64>> {
    if period == 0 {
        return vec![None; candles.len()];
    }

    let tr = true_ranges(candles);
    let mut out = Vec::with_capacity(candles.len());
    let mut atr = 0.0;

    for i in 0..tr.len() {
        if i < period - 1 {
            out.push(None);
        } else if i == period - 1 {
            atr = tr[..=i].iter().sum::<f64>() / period as f64;
            out.push(Some(atr));
        } else {
            atr = (atr * (period - 1) as f64 + tr[i]) / period as f64;
            out.push(Some(atr));
        }
    }

    out
}
