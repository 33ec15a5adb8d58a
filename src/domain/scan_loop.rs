//! The scan cycle engine and its Idle → Running → Stopped lifecycle.
//!
//! A `ScanLoop` owns the market data provider and the presentation sink. It is
//! driven either directly (`start`, `run_cycle`, `stop`) or by a command channel
//! through `run`, which checks for commands only between cycles.

use std::fmt;
use std::sync::mpsc::{Receiver, RecvTimeoutError, TryRecvError};
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use tracing::{debug, error, info, warn};

use crate::domain::analysis::{analyze_symbol, AnalysisContext};
use crate::domain::error::{ScannerError, SkipReason};
use crate::domain::indicator::IndicatorParams;
use crate::domain::market::{AccountSnapshot, AccountStats, Timeframe};
use crate::domain::opportunity::{Opportunity, ScanResult, SkippedSymbol};
use crate::domain::trade_setup::RiskParams;
use crate::ports::market_data_port::MarketDataProvider;
use crate::ports::scan_sink_port::{LogSeverity, ScanSink};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanState {
    Idle,
    Running,
    Stopped,
}

impl fmt::Display for ScanState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScanState::Idle => write!(f, "idle"),
            ScanState::Running => write!(f, "running"),
            ScanState::Stopped => write!(f, "stopped"),
        }
    }
}

/// External control messages.
#[derive(Debug, Clone, PartialEq)]
pub enum ScanCommand {
    Start {
        symbols: Vec<String>,
        risk_pct: f64,
        rr_ratio: f64,
    },
    Stop,
    Shutdown,
}

/// Static parameters of the loop, fixed for its lifetime.
#[derive(Debug, Clone, PartialEq)]
pub struct ScanConfig {
    pub timeframe: Timeframe,
    pub min_bars: usize,
    pub indicators: IndicatorParams,
    pub atr_multiplier: f64,
    /// Time from the start of one cycle to the start of the next.
    pub cadence: Duration,
    /// Analyse symbols on the rayon pool.
    pub parallel: bool,
    /// Stop after this many cycles; `None` runs until stopped.
    pub max_cycles: Option<u64>,
}

impl Default for ScanConfig {
    fn default() -> Self {
        ScanConfig {
            timeframe: Timeframe::H1,
            min_bars: 250,
            indicators: IndicatorParams::default(),
            atr_multiplier: 1.5,
            cadence: Duration::from_secs(1),
            parallel: false,
            max_cycles: None,
        }
    }
}

pub struct ScanLoop {
    provider: Box<dyn MarketDataProvider>,
    sink: Box<dyn ScanSink>,
    config: ScanConfig,
    state: ScanState,
    symbols: Vec<String>,
    risk: RiskParams,
    initial_equity: f64,
    cycles: u64,
}

impl ScanLoop {
    pub fn new(
        provider: Box<dyn MarketDataProvider>,
        sink: Box<dyn ScanSink>,
        config: ScanConfig,
    ) -> Self {
        let risk = RiskParams {
            atr_multiplier: config.atr_multiplier,
            ..RiskParams::default()
        };
        ScanLoop {
            provider,
            sink,
            config,
            state: ScanState::Idle,
            symbols: Vec::new(),
            risk,
            initial_equity: 0.0,
            cycles: 0,
        }
    }

    pub fn state(&self) -> ScanState {
        self.state
    }

    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    pub fn initial_equity(&self) -> f64 {
        self.initial_equity
    }

    pub fn symbols(&self) -> &[String] {
        &self.symbols
    }

    /// Idle (or Stopped) → Running.
    ///
    /// Connects to the provider and captures the starting equity. On a connection
    /// failure the error is reported once and the state is left unchanged.
    pub fn start(
        &mut self,
        symbols: Vec<String>,
        risk_pct: f64,
        rr_ratio: f64,
    ) -> Result<(), ScannerError> {
        if self.state == ScanState::Running {
            return Err(ScannerError::InvalidState {
                action: "start".to_string(),
                state: self.state.to_string(),
            });
        }
        if symbols.is_empty() {
            let err = ScannerError::InvalidSelection {
                reason: "no symbols selected".to_string(),
            };
            self.sink.on_log(&err.to_string(), LogSeverity::Error);
            return Err(err);
        }

        self.sink.on_log(
            &format!("loaded {} symbols, risk {}%", symbols.len(), risk_pct),
            LogSeverity::Info,
        );

        if let Err(err) = self.provider.connect() {
            error!(error = %err, "provider connection failed");
            self.sink.on_log(&err.to_string(), LogSeverity::Error);
            return Err(err);
        }

        let account = match self.provider.get_account_snapshot() {
            Ok(account) => account,
            Err(err) => {
                self.provider.disconnect();
                let err = ScannerError::Connection {
                    reason: format!("account unavailable at start: {}", err),
                };
                error!(error = %err, "provider connection failed");
                self.sink.on_log(&err.to_string(), LogSeverity::Error);
                return Err(err);
            }
        };

        self.initial_equity = account.equity;
        self.symbols = symbols;
        self.risk.risk_pct = risk_pct;
        self.risk.rr_ratio = rr_ratio;
        self.cycles = 0;
        self.state = ScanState::Running;

        info!(
            symbols = self.symbols.len(),
            risk_pct,
            rr_ratio,
            initial_equity = self.initial_equity,
            "scanner started"
        );
        self.sink.on_log("scanner started", LogSeverity::Success);
        Ok(())
    }

    /// Running → Stopped. Releases the provider connection.
    pub fn stop(&mut self) -> Result<(), ScannerError> {
        if self.state != ScanState::Running {
            return Err(ScannerError::InvalidState {
                action: "stop".to_string(),
                state: self.state.to_string(),
            });
        }
        self.provider.disconnect();
        self.state = ScanState::Stopped;
        info!(cycles = self.cycles, "scanner stopped");
        self.sink.on_log("scanner stopped", LogSeverity::Warning);
        Ok(())
    }

    /// One full cycle: poll the account, evaluate every symbol, publish.
    pub fn run_cycle(&mut self) -> Result<ScanResult, ScannerError> {
        if self.state != ScanState::Running {
            return Err(ScannerError::InvalidState {
                action: "scan".to_string(),
                state: self.state.to_string(),
            });
        }

        let account = match self.provider.get_account_snapshot() {
            Ok(account) => {
                self.sink
                    .on_stats(&AccountStats::from_snapshot(&account, self.initial_equity));
                Some(account)
            }
            Err(err) => {
                warn!(error = %err, "account poll failed");
                None
            }
        };

        let result = self.evaluate_cycle(account.as_ref(), Utc::now());
        self.cycles += 1;

        debug!(
            cycle = self.cycles,
            opportunities = result.opportunities.len(),
            skipped = result.skipped.len(),
            "cycle complete"
        );
        for skip in &result.skipped {
            debug!(symbol = %skip.symbol, reason = %skip.reason, "symbol skipped");
        }

        self.sink.on_scan_result(&result);
        Ok(result)
    }

    /// Evaluate the selected symbols against `account` without publishing.
    ///
    /// Every symbol is attempted; failures become skip entries. Without an account
    /// snapshot no position can be sized, so every symbol is skipped.
    pub fn evaluate_cycle(&self, account: Option<&AccountSnapshot>, at: DateTime<Utc>) -> ScanResult {
        let Some(account) = account else {
            let skipped = self
                .symbols
                .iter()
                .map(|symbol| SkippedSymbol {
                    symbol: symbol.clone(),
                    reason: SkipReason::DataUnavailable("account snapshot".to_string()),
                })
                .collect();
            return ScanResult::new(Vec::new(), skipped, at);
        };

        let ctx = AnalysisContext {
            timeframe: self.config.timeframe,
            min_bars: self.config.min_bars,
            indicators: self.config.indicators.clone(),
            risk: self.risk.clone(),
            balance: account.balance,
        };

        let outcomes = analyze_all(
            self.provider.as_ref(),
            &self.symbols,
            &ctx,
            self.config.parallel,
        );

        let mut opportunities: Vec<Opportunity> = Vec::new();
        let mut skipped = Vec::new();
        for (symbol, outcome) in self.symbols.iter().zip(outcomes) {
            match outcome {
                Ok(opportunity) => opportunities.push(opportunity),
                Err(reason) => skipped.push(SkippedSymbol {
                    symbol: symbol.clone(),
                    reason,
                }),
            }
        }

        ScanResult::new(opportunities, skipped, at)
    }

    /// Drive the loop from `commands` until `Shutdown` or the sender hangs up.
    ///
    /// Commands are only handled between cycles. A running loop that reaches
    /// `max_cycles` stops itself and returns.
    pub fn run(&mut self, commands: &Receiver<ScanCommand>) {
        loop {
            if self.state != ScanState::Running {
                match commands.recv() {
                    Ok(cmd) => {
                        if !self.handle_command(cmd) {
                            return;
                        }
                    }
                    Err(_) => return,
                }
                continue;
            }

            match commands.try_recv() {
                Ok(cmd) => {
                    if !self.handle_command(cmd) {
                        return;
                    }
                    continue;
                }
                Err(TryRecvError::Disconnected) => {
                    let _ = self.stop();
                    return;
                }
                Err(TryRecvError::Empty) => {}
            }

            let started = Instant::now();
            if let Err(err) = self.run_cycle() {
                warn!(error = %err, "cycle rejected");
            }

            if self
                .config
                .max_cycles
                .is_some_and(|max| self.cycles >= max)
            {
                let _ = self.stop();
                return;
            }

            if !self.wait_for_next_cycle(commands, started + self.config.cadence) {
                return;
            }
        }
    }

    /// Handle commands until `deadline`. A command that leaves the loop running
    /// does not shorten the wait. Returns false when the loop should exit.
    fn wait_for_next_cycle(&mut self, commands: &Receiver<ScanCommand>, deadline: Instant) -> bool {
        while self.state == ScanState::Running {
            let wait = deadline.saturating_duration_since(Instant::now());
            match commands.recv_timeout(wait) {
                Ok(cmd) => {
                    if !self.handle_command(cmd) {
                        return false;
                    }
                }
                Err(RecvTimeoutError::Timeout) => break,
                Err(RecvTimeoutError::Disconnected) => {
                    let _ = self.stop();
                    return false;
                }
            }
        }
        true
    }

    /// Returns false when the loop should exit.
    fn handle_command(&mut self, cmd: ScanCommand) -> bool {
        match cmd {
            ScanCommand::Start {
                symbols,
                risk_pct,
                rr_ratio,
            } => {
                if let Err(err) = self.start(symbols, risk_pct, rr_ratio) {
                    if matches!(err, ScannerError::InvalidState { .. }) {
                        self.sink.on_log(&err.to_string(), LogSeverity::Warning);
                    }
                    warn!(error = %err, "start rejected");
                }
                true
            }
            ScanCommand::Stop => {
                if let Err(err) = self.stop() {
                    warn!(error = %err, "stop ignored");
                }
                true
            }
            ScanCommand::Shutdown => {
                if self.state == ScanState::Running {
                    let _ = self.stop();
                }
                false
            }
        }
    }
}

#[cfg(feature = "parallel")]
fn analyze_all(
    provider: &dyn MarketDataProvider,
    symbols: &[String],
    ctx: &AnalysisContext,
    parallel: bool,
) -> Vec<Result<Opportunity, SkipReason>> {
    use rayon::prelude::*;

    if parallel {
        // indexed collect keeps discovery order
        symbols
            .par_iter()
            .map(|symbol| analyze_symbol(provider, symbol, ctx))
            .collect()
    } else {
        symbols
            .iter()
            .map(|symbol| analyze_symbol(provider, symbol, ctx))
            .collect()
    }
}

#[cfg(not(feature = "parallel"))]
fn analyze_all(
    provider: &dyn MarketDataProvider,
    symbols: &[String],
    ctx: &AnalysisContext,
    _parallel: bool,
) -> Vec<Result<Opportunity, SkipReason>> {
    symbols
        .iter()
        .map(|symbol| analyze_symbol(provider, symbol, ctx))
        .collect()
}
