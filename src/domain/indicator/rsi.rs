//! RSI (Relative Strength Index), used as the momentum oscillator.
//!
//! Uses Wilder's smoothing for average gain/loss calculation:
//! - First average: simple mean of gains/losses over first n changes
//! - Subsequent: avg = (prev_avg * (n-1) + current) / n
//!
//! Formula: RSI = 100 - (100 / (1 + avg_gain / avg_loss))
//! If avg_loss == 0: RSI = 100
//!
//! Warmup: first n candles have no value (need n price changes).

use crate::domain::indicator::{IndicatorSeries, IndicatorType};
use crate::domain::ohlcv::Candle;

pub fn calculate_rsi(candles: &[Candle], period: usize) -> IndicatorSeries {
    IndicatorSeries::new(IndicatorType::Rsi(period), candles, rsi_values(candles, period))
}

fn rsi_from(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_loss == 0.0 {
        100.0
    } else {
        100.0 - (100.0 / (1.0 + avg_gain / avg_loss))
    }
}

fn rsi_values(candles: &[Candle], period: usize) -> Vec<Option<f64>> {
    let mut out = vec![None; candles.len()];
    if period == 0 || candles.len() <= period {
        return out;
    }

    let (gains, losses): (Vec<f64>, Vec<f64>) = candles
        .windows(2)
        .map(|w| {
            let change = w[1].close - w[0].close;
            (change.max(0.0), (-change).max(0.0))
        })
        .unzip();

    let mut avg_gain = gains[..period].iter().sum::<f64>() / period as f64;
    let mut avg_loss = losses[..period].iter().sum::<f64>() / period as f64;
    out[period] = Some(rsi_from(avg_gain, avg_loss));

    for idx in period..gains.len() {
        avg_gain = (avg_gain * (period - 1) as f64 + gains[idx]) / period as f64;
        avg_loss = (avg_loss * (period - 1) as f64 + losses[idx]) / period as f64;
        out[idx + 1] = Some(rsi_from(avg_gain, avg_loss));
    }

    out
}
