//! Terminal presentation: log lines, account stats and the ranked table.

use std::io::{self, Write};

use chrono::Local;
use tracing::warn;

use crate::adapters::score_tracker::{ScoreDelta, ScoreTracker, Signal};
use crate::domain::market::AccountStats;
use crate::domain::opportunity::ScanResult;
use crate::ports::scan_sink_port::{LogSeverity, ScanSink};

pub struct ConsoleSink<W: Write + Send> {
    out: W,
    tracker: ScoreTracker,
    /// Rows shown per table; `None` shows every opportunity.
    limit: Option<usize>,
}

impl ConsoleSink<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write + Send> ConsoleSink<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            tracker: ScoreTracker::new(),
            limit: None,
        }
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn emit(&mut self, text: &str) {
        if let Err(e) = writeln!(self.out, "{}", text).and_then(|_| self.out.flush()) {
            warn!(error = %e, "console write failed");
        }
    }
}

fn severity_tag(severity: LogSeverity) -> &'static str {
    match severity {
        LogSeverity::Info => "INFO ",
        LogSeverity::Success => "OK   ",
        LogSeverity::Warning => "WARN ",
        LogSeverity::Error => "ERROR",
    }
}

pub fn format_stats(stats: &AccountStats) -> String {
    format!(
        "Balance: ${:.2}  Equity: ${:.2}  Daily P&L: {:+.2}",
        stats.balance, stats.equity, stats.daily_pl
    )
}

/// Ranked table with one row per opportunity. `deltas` pairs with the rows.
pub fn render_table(result: &ScanResult, deltas: &[ScoreDelta], limit: Option<usize>) -> String {
    let shown = limit.unwrap_or(result.opportunities.len());
    let mut lines = Vec::with_capacity(shown + 2);

    lines.push(format!(
        "Last scan: {}  ({} opportunities, {} skipped)",
        result.timestamp.with_timezone(&Local).format("%H:%M:%S"),
        result.opportunities.len(),
        result.skipped.len()
    ));
    lines.push(format!(
        "{:<8} {:>8}  {:<18} {:<10} {:>11} {:>11} {:>11} {:>7}",
        "SYMBOL", "SCORE", "BIAS", "SIGNAL", "ENTRY", "STOP", "TARGET", "LOTS"
    ));

    for (opp, delta) in result.top(shown).iter().zip(
        deltas
            .iter()
            .copied()
            .chain(std::iter::repeat(ScoreDelta::Unchanged)),
    ) {
        let score = format!("{:.1} {}", opp.score, delta.arrow());
        let bias = format!("{} (ADX:{:.0})", opp.bias, opp.trend_power);
        lines.push(format!(
            "{:<8} {:>8}  {:<18} {:<10} {:>11.5} {:>11.5} {:>11.5} {:>7}",
            opp.symbol,
            score.trim_end(),
            bias,
            Signal::from_score(opp.score).to_string(),
            opp.entry,
            opp.stop,
            opp.target,
            opp.lots
        ));
    }

    lines.join("\n")
}

impl<W: Write + Send> ScanSink for ConsoleSink<W> {
    fn on_log(&mut self, message: &str, severity: LogSeverity) {
        let line = format!(
            "[{}] {} {}",
            Local::now().format("%H:%M:%S"),
            severity_tag(severity),
            message
        );
        self.emit(&line);
    }

    fn on_stats(&mut self, stats: &AccountStats) {
        let line = format_stats(stats);
        self.emit(&line);
    }

    fn on_scan_result(&mut self, result: &ScanResult) {
        let deltas = self.tracker.observe_result(result);
        let table = render_table(result, &deltas, self.limit);
        self.emit(&table);
    }
}
