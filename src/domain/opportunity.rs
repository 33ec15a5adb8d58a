//! Per-symbol scan output and the ranked cycle snapshot.

use chrono::{DateTime, Utc};

use crate::domain::error::SkipReason;
use crate::domain::scoring::{Bias, ScoreCard};

/// A scored symbol with a complete trade plan.
#[derive(Debug, Clone, PartialEq)]
pub struct Opportunity {
    pub symbol: String,
    pub score: f64,
    pub bias: Bias,
    pub entry: f64,
    pub stop: f64,
    pub target: f64,
    pub lots: f64,
    pub trend_power: f64,
    pub breakdown: ScoreCard,
}

impl Opportunity {
    /// A zero-lot plan is informative but cannot be traded.
    pub fn is_tradeable(&self) -> bool {
        self.lots > 0.0
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SkippedSymbol {
    pub symbol: String,
    pub reason: SkipReason,
}

/// Everything one cycle produced.
#[derive(Debug, Clone, PartialEq)]
pub struct ScanResult {
    /// Sorted by score, highest first. Equal scores keep discovery order.
    pub opportunities: Vec<Opportunity>,
    pub skipped: Vec<SkippedSymbol>,
    pub timestamp: DateTime<Utc>,
}

impl ScanResult {
    /// Assemble a result, ranking `opportunities` as they were discovered.
    pub fn new(
        mut opportunities: Vec<Opportunity>,
        skipped: Vec<SkippedSymbol>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        rank(&mut opportunities);
        ScanResult {
            opportunities,
            skipped,
            timestamp,
        }
    }

    pub fn top(&self, n: usize) -> &[Opportunity] {
        &self.opportunities[..n.min(self.opportunities.len())]
    }

    pub fn attempted(&self) -> usize {
        self.opportunities.len() + self.skipped.len()
    }
}

/// Stable sort by score, descending.
pub fn rank(opportunities: &mut [Opportunity]) {
    opportunities.sort_by(|a, b| b.score.total_cmp(&a.score));
}
