//! Scanner settings assembled from a validated configuration.

use std::path::PathBuf;
use std::time::Duration;

use crate::domain::config_validation::{
    parse_timeframe, validate_indicator_periods, validate_scanner_config, DEFAULT_ATR_MULTIPLIER,
    DEFAULT_MIN_BARS, DEFAULT_POLL_INTERVAL_MS, DEFAULT_RISK_PCT, DEFAULT_RR_RATIO,
};
use crate::domain::error::ScannerError;
use crate::domain::scan_loop::ScanConfig;
use crate::domain::universe::{parse_symbols, AssetUniverse, UniverseError};
use crate::ports::config_port::ConfigPort;

/// Account figures reported by the CSV replay provider.
#[derive(Debug, Clone, PartialEq)]
pub struct ReplaySettings {
    pub data_dir: Option<PathBuf>,
    pub balance: f64,
    pub equity: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScannerSettings {
    pub universe: AssetUniverse,
    /// Symbols to scan, in discovery order. Empty when none were configured.
    pub symbols: Vec<String>,
    pub risk_pct: f64,
    pub rr_ratio: f64,
    pub scan: ScanConfig,
    pub replay: ReplaySettings,
    pub csv_path: Option<PathBuf>,
    /// Rows shown in the console table; `None` shows all.
    pub table_rows: Option<usize>,
}

fn universe_error(key: &str, err: UniverseError) -> ScannerError {
    ScannerError::ConfigInvalid {
        section: "universe".to_string(),
        key: key.to_string(),
        reason: err.to_string(),
    }
}

/// `[universe]`: `classes` lists the class labels in order, and each label is a key
/// holding that class's symbols. Without `classes` the built-in universe is used.
pub fn load_universe(config: &dyn ConfigPort) -> Result<AssetUniverse, ScannerError> {
    let Some(labels) = config.get_string("universe", "classes") else {
        return Ok(AssetUniverse::default());
    };

    let labels = parse_symbols(&labels).map_err(|e| universe_error("classes", e))?;
    let mut classes = Vec::with_capacity(labels.len());
    for label in labels {
        let key = label.to_lowercase();
        let list = config
            .get_string("universe", &key)
            .ok_or_else(|| ScannerError::ConfigMissing {
                section: "universe".to_string(),
                key: key.clone(),
            })?;
        let symbols = parse_symbols(&list).map_err(|e| universe_error(&key, e))?;
        classes.push((label, symbols));
    }

    AssetUniverse::new(classes).map_err(|e| universe_error("classes", e))
}

fn optional_path(config: &dyn ConfigPort, section: &str, key: &str) -> Option<PathBuf> {
    config
        .get_string(section, key)
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .map(PathBuf::from)
}

/// Validate `config` and build the scanner settings from it.
pub fn build_settings(config: &dyn ConfigPort) -> Result<ScannerSettings, ScannerError> {
    validate_scanner_config(config)?;

    let universe = load_universe(config)?;
    let symbols = match config.get_string("scanner", "symbols") {
        Some(list) if !list.trim().is_empty() => {
            let parsed = parse_symbols(&list).map_err(|e| ScannerError::ConfigInvalid {
                section: "scanner".to_string(),
                key: "symbols".to_string(),
                reason: e.to_string(),
            })?;
            universe.select(&parsed).map_err(|e| ScannerError::ConfigInvalid {
                section: "scanner".to_string(),
                key: "symbols".to_string(),
                reason: e.to_string(),
            })?
        }
        _ => Vec::new(),
    };

    let max_cycles = config.get_int("scanner", "max_cycles", 0);
    let scan = ScanConfig {
        timeframe: parse_timeframe(config)?,
        min_bars: config.get_int("scanner", "min_bars", DEFAULT_MIN_BARS) as usize,
        indicators: validate_indicator_periods(config)?,
        atr_multiplier: config.get_double("indicators", "atr_multiplier", DEFAULT_ATR_MULTIPLIER),
        cadence: Duration::from_millis(
            config.get_int("scanner", "poll_interval_ms", DEFAULT_POLL_INTERVAL_MS) as u64,
        ),
        parallel: config.get_bool("scanner", "parallel", false),
        max_cycles: (max_cycles > 0).then_some(max_cycles as u64),
    };

    let balance = config.get_double("replay", "balance", 10_000.0);
    let table_rows = config.get_int("output", "table_rows", 0);
    Ok(ScannerSettings {
        universe,
        symbols,
        risk_pct: config.get_double("scanner", "risk_pct", DEFAULT_RISK_PCT),
        rr_ratio: config.get_double("scanner", "rr_ratio", DEFAULT_RR_RATIO),
        scan,
        replay: ReplaySettings {
            data_dir: optional_path(config, "replay", "data_dir"),
            balance,
            equity: config.get_double("replay", "equity", balance),
        },
        csv_path: optional_path(config, "output", "csv_path"),
        table_rows: (table_rows > 0).then_some(table_rows as usize),
    })
}
