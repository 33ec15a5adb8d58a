//! CLI definition and dispatch.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver};
use std::sync::Arc;
use std::thread;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::adapters::channel_sink::{ChannelSink, ScanEvent};
use crate::adapters::console_sink::ConsoleSink;
use crate::adapters::csv_adapter::CsvReplayProvider;
use crate::adapters::csv_export::CsvExportSink;
use crate::adapters::fanout_sink::FanoutSink;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::domain::error::ScannerError;
use crate::domain::market::AccountSnapshot;
use crate::domain::scan_loop::ScanLoop;
use crate::domain::settings::{build_settings, load_universe, ScannerSettings};
use crate::domain::universe::{parse_symbols, AssetUniverse};
use crate::ports::scan_sink_port::ScanSink;
use crate::worker::spawn_scanner;

#[derive(Parser, Debug)]
#[command(name = "setupscan", about = "Ranks instruments by setup quality")]
pub struct Cli {
    /// Debug-level operator logging (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Scan continuously on the configured cadence
    Scan {
        #[arg(short, long)]
        config: PathBuf,
        /// Comma-separated symbols, overriding [scanner] symbols
        #[arg(long)]
        symbols: Option<String>,
        /// Stop after this many cycles
        #[arg(long)]
        cycles: Option<u64>,
    },
    /// Run a single cycle and print the ranking
    Once {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        symbols: Option<String>,
    },
    /// Validate a scanner configuration
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// List the asset universe
    Universe {
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    init_tracing(cli.verbose);
    match cli.command {
        Command::Scan {
            config,
            symbols,
            cycles,
        } => run_scan(&config, symbols.as_deref(), cycles),
        Command::Once { config, symbols } => run_once(&config, symbols.as_deref()),
        Command::Validate { config } => run_validate(&config),
        Command::Universe { config } => run_universe(config.as_ref()),
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    // a subscriber may already be installed when embedded
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn fail(err: ScannerError) -> ExitCode {
    eprintln!("error: {err}");
    ExitCode::from(&err)
}

pub fn load_config(path: &PathBuf) -> Result<FileConfigAdapter, ExitCode> {
    FileConfigAdapter::from_file(path).map_err(fail)
}

fn load_settings(path: &PathBuf, symbols: Option<&str>) -> Result<ScannerSettings, ExitCode> {
    let adapter = load_config(path)?;
    eprintln!("Loaded config from {}", adapter.source());
    let mut settings = build_settings(&adapter).map_err(fail)?;

    if let Some(list) = symbols {
        let parsed = parse_symbols(list).map_err(|e| {
            fail(ScannerError::InvalidSelection {
                reason: e.to_string(),
            })
        })?;
        settings.symbols = settings.universe.select(&parsed).map_err(fail)?;
    }
    Ok(settings)
}

/// Build a loop over the replay provider. The loop publishes into a channel; the
/// returned receiver is drained into the presentation sinks by the caller.
fn build_loop(settings: &ScannerSettings) -> Result<(ScanLoop, Receiver<ScanEvent>), ScannerError> {
    let data_dir = settings
        .replay
        .data_dir
        .clone()
        .ok_or_else(|| ScannerError::ConfigMissing {
            section: "replay".to_string(),
            key: "data_dir".to_string(),
        })?;
    let provider = CsvReplayProvider::new(
        data_dir,
        AccountSnapshot {
            balance: settings.replay.balance,
            equity: settings.replay.equity,
        },
    );

    let (tx, events) = mpsc::channel();
    let scan = ScanLoop::new(
        Box::new(provider),
        Box::new(ChannelSink::new(tx)),
        settings.scan.clone(),
    );
    Ok((scan, events))
}

/// Console table plus the optional CSV export.
fn build_presentation(settings: &ScannerSettings) -> Result<FanoutSink, ScannerError> {
    let mut console = ConsoleSink::stdout();
    if let Some(rows) = settings.table_rows {
        console = console.with_limit(rows);
    }

    let mut sink = FanoutSink::new().with(Box::new(console));
    if let Some(path) = &settings.csv_path {
        let export = CsvExportSink::open(path)?;
        info!(path = %export.path().display(), "exporting scan results");
        sink = sink.with(Box::new(export));
    }
    Ok(sink)
}

fn flush_events(events: &Receiver<ScanEvent>, sink: &mut dyn ScanSink) {
    for event in events.try_iter() {
        event.deliver(sink);
    }
}

/// Flag raised on Ctrl-C, watched by a current-thread tokio runtime on its own thread.
fn watch_interrupt() -> Arc<AtomicBool> {
    let interrupted = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&interrupted);
    let spawned = thread::Builder::new()
        .name("setupscan-signal".into())
        .spawn(move || {
            let runtime = match tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
            {
                Ok(runtime) => runtime,
                Err(e) => {
                    warn!(error = %e, "ctrl-c handling unavailable");
                    return;
                }
            };
            match runtime.block_on(tokio::signal::ctrl_c()) {
                Ok(()) => flag.store(true, Ordering::SeqCst),
                Err(e) => warn!(error = %e, "failed to listen for ctrl-c"),
            }
        });
    if let Err(e) = spawned {
        warn!(error = %e, "ctrl-c handling unavailable");
    }
    interrupted
}

fn run_scan(config_path: &PathBuf, symbols: Option<&str>, cycles: Option<u64>) -> ExitCode {
    let mut settings = match load_settings(config_path, symbols) {
        Ok(s) => s,
        Err(code) => return code,
    };
    if let Some(n) = cycles {
        settings.scan.max_cycles = (n > 0).then_some(n);
    }

    let (mut scan, events) = match build_loop(&settings) {
        Ok(built) => built,
        Err(e) => return fail(e),
    };
    let mut presentation = match build_presentation(&settings) {
        Ok(sink) => sink,
        Err(e) => return fail(e),
    };
    if let Err(e) = scan.start(settings.symbols.clone(), settings.risk_pct, settings.rr_ratio) {
        flush_events(&events, &mut presentation);
        return fail(e);
    }

    let interrupted = watch_interrupt();
    let handle = match spawn_scanner(scan) {
        Ok(h) => h,
        Err(e) => return fail(e),
    };
    match handle.forward_events(&events, &mut presentation, &interrupted) {
        Ok(state) => {
            info!(%state, "scan finished");
            ExitCode::SUCCESS
        }
        Err(e) => fail(e),
    }
}

fn run_once(config_path: &PathBuf, symbols: Option<&str>) -> ExitCode {
    let settings = match load_settings(config_path, symbols) {
        Ok(s) => s,
        Err(code) => return code,
    };

    let (mut scan, events) = match build_loop(&settings) {
        Ok(built) => built,
        Err(e) => return fail(e),
    };
    let mut presentation = match build_presentation(&settings) {
        Ok(sink) => sink,
        Err(e) => return fail(e),
    };
    if let Err(e) = scan.start(settings.symbols.clone(), settings.risk_pct, settings.rr_ratio) {
        flush_events(&events, &mut presentation);
        return fail(e);
    }

    let result = scan.run_cycle();
    let _ = scan.stop();
    flush_events(&events, &mut presentation);
    match result {
        Ok(result) => {
            for skip in &result.skipped {
                eprintln!("  skipped {}: {}", skip.symbol, skip.reason);
            }
            ExitCode::SUCCESS
        }
        Err(e) => fail(e),
    }
}

fn run_validate(config_path: &PathBuf) -> ExitCode {
    let settings = match load_settings(config_path, None) {
        Ok(s) => s,
        Err(code) => return code,
    };
    eprintln!("Config validated successfully");

    let scan = &settings.scan;
    eprintln!("\nScanner:");
    eprintln!("  timeframe:  {}", scan.timeframe);
    eprintln!("  cadence:    {} ms", scan.cadence.as_millis());
    eprintln!("  min bars:   {}", scan.min_bars);
    eprintln!("  risk:       {}%", settings.risk_pct);
    eprintln!("  reward:risk 1:{}", settings.rr_ratio);

    let p = &scan.indicators;
    eprintln!("\nIndicators:");
    eprintln!(
        "  EMA({}) ATR({}) x{} RSI({}) ADX({}) DC({})",
        p.ema_period, p.atr_period, scan.atr_multiplier, p.rsi_period, p.adx_period, p.channel_lookback
    );

    eprintln!("\nSelection:");
    if settings.symbols.is_empty() {
        eprintln!("  (none configured; pass --symbols to scan)");
    } else {
        eprintln!("  {}", settings.symbols.join(", "));
    }
    ExitCode::SUCCESS
}

fn run_universe(config_path: Option<&PathBuf>) -> ExitCode {
    let universe = match config_path {
        None => AssetUniverse::default(),
        Some(path) => {
            let adapter = match load_config(path) {
                Ok(a) => a,
                Err(code) => return code,
            };
            match load_universe(&adapter) {
                Ok(u) => u,
                Err(e) => return fail(e),
            }
        }
    };

    for class in universe.classes() {
        println!("{:<8} {}", class.label, class.symbols.join(", "));
    }
    eprintln!(
        "{} symbols in {} classes",
        universe.count(),
        universe.classes().len()
    );
    ExitCode::SUCCESS
}
