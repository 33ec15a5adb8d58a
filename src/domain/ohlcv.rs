//! OHLCV candle representation.

use chrono::NaiveDateTime;

#[derive(Debug, Clone, PartialEq)]
pub struct Candle {
    pub time: NaiveDateTime,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl Candle {
    /// max(high - low, |high - prev_close|, |low - prev_close|)
    pub fn true_range(&self, prev_close: f64) -> f64 {
        let hl = self.high - self.low;
        let hc = (self.high - prev_close).abs();
        let lc = (self.low - prev_close).abs();
        hl.max(hc).max(lc)
    }

    /// Upward and downward directional movement relative to the previous candle.
    ///
    /// Only the larger positive move counts; the other side is zero.
    pub fn directional_movement(&self, prev: &Candle) -> (f64, f64) {
        let up = self.high - prev.high;
        let down = prev.low - self.low;
        let plus = if up > down && up > 0.0 { up } else { 0.0 };
        let minus = if down > up && down > 0.0 { down } else { 0.0 };
        (plus, minus)
    }
}
