//! Average Directional Index, used as the trend-strength oscillator.
//!
//! From candle 1 onward: TR, +DM and -DM. Each is Wilder-smoothed over n
//! (seeded with the mean of the first n values), giving
//! DI± = 100 * sDM± / sTR and DX = 100 * |DI+ - DI-| / (DI+ + DI-).
//! ADX seeds with the mean of the first n DX values, then Wilder-smooths DX.
//!
//! Warmup: first (2n-1) candles have no value.

use crate::domain::indicator::atr::true_ranges;
use crate::domain::indicator::{IndicatorSeries, IndicatorType};
use crate::domain::ohlcv::Candle;

pub fn calculate_adx(candles: &[Candle], period: usize) -> IndicatorSeries {
    IndicatorSeries::new(IndicatorType::Adx(period), candles, adx_values(candles, period))
}

fn wilder(prev: f64, value: f64, period: usize) -> f64 {
    (prev * (period - 1) as f64 + value) / period as f64
}

fn directional_index(s_tr: f64, s_plus: f64, s_minus: f64) -> f64 {
    if s_tr <= 0.0 {
        return 0.0;
    }
    let plus_di = 100.0 * s_plus / s_tr;
    let minus_di = 100.0 * s_minus / s_tr;
    let sum = plus_di + minus_di;
    if sum > 0.0 {
        100.0 * (plus_di - minus_di).abs() / sum
    } else {
        0.0
    }
}

fn adx_values(candles: &[Candle], period: usize) -> Vec<Option<f64>> {
    let mut out = vec![None; candles.len()];
    if period == 0 || candles.len() < 2 * period {
        return out;
    }

    let tr = true_ranges(candles);
    let (plus_dm, minus_dm): (Vec<f64>, Vec<f64>) = std::iter::once((0.0, 0.0))
        .chain(candles.windows(2).map(|w| w[1].directional_movement(&w[0])))
        .unzip();

    let mean = |v: &[f64]| v.iter().sum::<f64>() / period as f64;
    let mut s_tr = mean(&tr[1..=period]);
    let mut s_plus = mean(&plus_dm[1..=period]);
    let mut s_minus = mean(&minus_dm[1..=period]);

    let mut dx = Vec::with_capacity(candles.len() - period);
    dx.push(directional_index(s_tr, s_plus, s_minus));
    for i in period + 1..candles.len() {
        s_tr = wilder(s_tr, tr[i], period);
        s_plus = wilder(s_plus, plus_dm[i], period);
        s_minus = wilder(s_minus, minus_dm[i], period);
        dx.push(directional_index(s_tr, s_plus, s_minus));
    }

    // dx[j] belongs to candle period + j
    let mut adx = mean(&dx[..period]);
    out[2 * period - 1] = Some(adx);
    for (j, &value) in dx.iter().enumerate().skip(period) {
        adx = wilder(adx, value, period);
        out[period + j] = Some(adx);
    }

    out
}
