//! Trade plan construction and broker-constrained position sizing.

use crate::domain::market::{Quote, SymbolMetadata};
use crate::domain::scoring::Bias;

/// User risk budget and stop placement.
#[derive(Debug, Clone, PartialEq)]
pub struct RiskParams {
    /// Percent of balance risked per trade.
    pub risk_pct: f64,
    /// Reward to risk, 2.0 means 1:2.
    pub rr_ratio: f64,
    /// Stop distance in ATRs.
    pub atr_multiplier: f64,
}

impl Default for RiskParams {
    fn default() -> Self {
        RiskParams {
            risk_pct: 0.5,
            rr_ratio: 2.0,
            atr_multiplier: 1.5,
        }
    }
}

impl RiskParams {
    pub fn risk_amount(&self, balance: f64) -> f64 {
        balance * (self.risk_pct / 100.0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TradeSetup {
    pub entry: f64,
    pub stop: f64,
    pub target: f64,
    pub lots: f64,
}

/// Entry at the touch, stop `atr_multiplier` ATRs away, target at `rr_ratio` times the risk.
///
/// Returns `None` for a neutral bias.
pub fn compute_setup(
    bias: Bias,
    quote: &Quote,
    volatility: f64,
    risk: &RiskParams,
    balance: f64,
    metadata: &SymbolMetadata,
) -> Option<TradeSetup> {
    let (entry, stop, target) = match bias {
        Bias::Bullish => {
            let entry = quote.ask;
            let stop = entry - risk.atr_multiplier * volatility;
            (entry, stop, entry + (entry - stop) * risk.rr_ratio)
        }
        Bias::Bearish => {
            let entry = quote.bid;
            let stop = entry + risk.atr_multiplier * volatility;
            (entry, stop, entry - (stop - entry) * risk.rr_ratio)
        }
        Bias::Neutral => return None,
    };

    let stop_distance_points = (entry - stop).abs() / metadata.point_size;
    let lots = position_size(risk.risk_amount(balance), stop_distance_points, metadata);

    Some(TradeSetup {
        entry,
        stop,
        target,
        lots,
    })
}

/// Lots that risk `risk_amount` over `stop_distance_points`.
///
/// Zero when the tick value or stop distance is zero. Otherwise the raw size is
/// rounded to the nearest `volume_step`; above `volume_max` it is capped, below
/// `volume_min` it is raised to the minimum.
pub fn position_size(risk_amount: f64, stop_distance_points: f64, metadata: &SymbolMetadata) -> f64 {
    if metadata.tick_value == 0.0 || stop_distance_points == 0.0 || !stop_distance_points.is_finite() {
        return 0.0;
    }

    let raw = risk_amount / (stop_distance_points * metadata.tick_value);
    let quantized = quantize(raw, metadata.volume_step);

    if quantized > metadata.volume_max {
        metadata.volume_max
    } else {
        quantized.max(metadata.volume_min)
    }
}

/// Nearest multiple of `step`, with float noise from the multiplication trimmed.
fn quantize(value: f64, step: f64) -> f64 {
    if !(step > 0.0) {
        return value;
    }
    let steps = (value / step).round();
    let decimals = step_decimals(step);
    let scale = 10f64.powi(decimals);
    (steps * step * scale).round() / scale
}

/// Decimal places needed to represent `step`, capped at 10.
fn step_decimals(step: f64) -> i32 {
    let mut decimals = 0;
    let mut scaled = step;
    while decimals < 10 && (scaled - scaled.round()).abs() > 1e-9 {
        scaled *= 10.0;
        decimals += 1;
    }
    decimals
}
