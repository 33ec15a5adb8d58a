//! Presentation state carried across cycles: score deltas and signal grades.

use std::collections::HashMap;
use std::fmt;

use crate::domain::opportunity::ScanResult;

pub const TRADE_NOW_SCORE: f64 = 85.0;
pub const WATCH_SCORE: f64 = 70.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signal {
    TradeNow,
    Watch,
    Wait,
}

impl Signal {
    pub fn from_score(score: f64) -> Self {
        if score >= TRADE_NOW_SCORE {
            Signal::TradeNow
        } else if score >= WATCH_SCORE {
            Signal::Watch
        } else {
            Signal::Wait
        }
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Signal::TradeNow => write!(f, "TRADE NOW"),
            Signal::Watch => write!(f, "WATCH"),
            Signal::Wait => write!(f, "WAIT"),
        }
    }
}

/// Movement of a symbol's score since the last cycle it appeared in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreDelta {
    Up,
    Down,
    Unchanged,
}

impl ScoreDelta {
    pub fn arrow(&self) -> &'static str {
        match self {
            ScoreDelta::Up => "▲",
            ScoreDelta::Down => "▼",
            ScoreDelta::Unchanged => "",
        }
    }
}

/// Last seen score per symbol. A first sighting counts as unchanged.
#[derive(Debug, Default)]
pub struct ScoreTracker {
    previous: HashMap<String, f64>,
}

impl ScoreTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn observe(&mut self, symbol: &str, score: f64) -> ScoreDelta {
        let prev = self.previous.insert(symbol.to_string(), score).unwrap_or(score);
        if score > prev {
            ScoreDelta::Up
        } else if score < prev {
            ScoreDelta::Down
        } else {
            ScoreDelta::Unchanged
        }
    }

    /// Deltas for every opportunity in ranking order.
    pub fn observe_result(&mut self, result: &ScanResult) -> Vec<ScoreDelta> {
        result
            .opportunities
            .iter()
            .map(|o| self.observe(&o.symbol, o.score))
            .collect()
    }

    pub fn previous(&self, symbol: &str) -> Option<f64> {
        self.previous.get(symbol).copied()
    }
}
