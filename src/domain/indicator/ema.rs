//! Exponential Moving Average of close, used as the trend filter.
//!
//! k = 2/(n+1), seed with first SMA, then EMA[i] = C[i]*k + EMA[i-1]*(1-k).
//! Warmup: first (n-1) candles have no value.

use crate::domain::indicator::{IndicatorSeries, IndicatorType};
use crate::domain::ohlcv::Candle;

pub fn calculate_ema(candles: &[Candle], period: usize) -> IndicatorSeries {
    let closes: Vec<f64> = candles.iter().map(|c| c.close).collect();
    IndicatorSeries::new(IndicatorType::Ema(period), candles, ema_values(&closes, period))
}

/// EMA over a plain value sequence.
pub fn ema_values(values: &[f64], period: usize) -> Vec<Option<f64>> {
    if period == 0 {
        return vec![None; values.len()];
    }

    let mut out = Vec::with_capacity(values.len());
    let k = 2.0 / (period as f64 + 1.0);
    let mut ema = 0.0;
    let mut sum = 0.0;

    for (i, &value) in values.iter().enumerate() {
        if i < period - 1 {
            sum += value;
            out.push(None);
        } else if i == period - 1 {
            sum += value;
            ema = sum / period as f64;
            out.push(Some(ema));
        } else {
            ema = value * k + ema * (1.0 - k);
            out.push(Some(ema));
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn make_candles(prices: &[f64]) -> Vec<Candle> {
        prices
            .iter()
            .enumerate()
            .map(|(i, &close)| Candle {
                time: NaiveDate::from_ymd_opt(2024, 1, (i + 1) as u32)
                    .unwrap()
                    .and_hms_opt(0, 0, 0)
                    .unwrap(),
                open: close,
                high: close,
                low: close,
                close,
                volume: 1000.0,
            })
            .collect()
    }

    #[test]
    fn ema_warmup() {
        let series = calculate_ema(&make_candles(&[10.0, 20.0, 30.0, 40.0, 50.0]), 3);

        assert!(series.values[0].value.is_none());
        assert!(series.values[1].value.is_none());
        assert!(series.values[2].value.is_some());
        assert!(series.values[4].value.is_some());
    }

    #[test]
    fn ema_period_1_tracks_close() {
        let series = calculate_ema(&make_candles(&[10.0, 20.0, 30.0]), 1);
        assert_eq!(series.values[0].value, Some(10.0));
        assert_eq!(series.values[1].value, Some(20.0));
        assert_eq!(series.latest(), Some(30.0));
    }

    #[test]
    fn ema_seed_is_sma() {
        let series = calculate_ema(&make_candles(&[10.0, 20.0, 30.0]), 3);
        let expected_sma = (10.0 + 20.0 + 30.0) / 3.0;
        assert!((series.latest().unwrap() - expected_sma).abs() < f64::EPSILON);
    }

    #[test]
    fn ema_recursive_calculation() {
        let series = calculate_ema(&make_candles(&[10.0, 20.0, 30.0, 40.0, 50.0]), 3);

        let k = 2.0 / 4.0;
        let sma = 20.0;
        let ema_3 = 40.0 * k + sma * (1.0 - k);
        let ema_4 = 50.0 * k + ema_3 * (1.0 - k);

        assert!((series.values[3].value.unwrap() - ema_3).abs() < f64::EPSILON);
        assert!((series.values[4].value.unwrap() - ema_4).abs() < f64::EPSILON);
    }

    #[test]
    fn ema_equal_prices() {
        let series = calculate_ema(&make_candles(&[100.0; 5]), 3);
        for point in &series.values[2..] {
            assert!((point.value.unwrap() - 100.0).abs() < f64::EPSILON);
        }
    }

    #[test]
    fn ema_shorter_than_period_has_no_value() {
        let series = calculate_ema(&make_candles(&[10.0, 20.0]), 5);
        assert_eq!(series.values.len(), 2);
        assert_eq!(series.latest(), None);
    }

    #[test]
    fn ema_period_0() {
        let series = calculate_ema(&make_candles(&[10.0, 20.0]), 0);
        assert!(series.values.iter().all(|p| p.value.is_none()));
    }

    #[test]
    fn ema_indicator_type() {
        let series = calculate_ema(&make_candles(&[10.0]), 200);
        assert_eq!(series.indicator_type, IndicatorType::Ema(200));
    }
}
