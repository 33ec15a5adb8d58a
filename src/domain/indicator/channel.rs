//! Donchian channel: rolling highest high and lowest low.
//!
//! The window covers the last `lookback` candles including the evaluation candle.
//! Warmup: first (lookback-1) candles have no value.

use std::collections::VecDeque;

use crate::domain::indicator::{IndicatorSeries, IndicatorType};
use crate::domain::ohlcv::Candle;

/// Returns `(upper, lower)` channel series.
pub fn calculate_channel(candles: &[Candle], lookback: usize) -> (IndicatorSeries, IndicatorSeries) {
    let highs: Vec<f64> = candles.iter().map(|c| c.high).collect();
    let lows: Vec<f64> = candles.iter().map(|c| c.low).collect();

    let upper = rolling_extreme(&highs, lookback, |a, b| a >= b);
    let lower = rolling_extreme(&lows, lookback, |a, b| a <= b);

    (
        IndicatorSeries::new(IndicatorType::ChannelHigh(lookback), candles, upper),
        IndicatorSeries::new(IndicatorType::ChannelLow(lookback), candles, lower),
    )
}

/// Monotonic-deque rolling extreme. `dominates(a, b)` is true when `a` should evict `b`.
fn rolling_extreme<F>(values: &[f64], lookback: usize, dominates: F) -> Vec<Option<f64>>
where
    F: Fn(f64, f64) -> bool,
{
    if lookback == 0 {
        return vec![None; values.len()];
    }

    let mut out = Vec::with_capacity(values.len());
    let mut window: VecDeque<usize> = VecDeque::with_capacity(lookback);

    for (i, &value) in values.iter().enumerate() {
        while let Some(&back) = window.back() {
            if dominates(value, values[back]) {
                window.pop_back();
            } else {
                break;
            }
        }
        window.push_back(i);
        if let Some(&front) = window.front() {
            if front + lookback <= i {
                window.pop_front();
            }
        }

        if i + 1 >= lookback {
            out.push(window.front().map(|&idx| values[idx]));
        } else {
            out.push(None);
        }
    }

    out
}
