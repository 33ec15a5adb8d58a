//! Configuration validation.
//!
//! Validates every scanner config field before a scan starts. Missing keys fall back
//! to their defaults and are not errors.

use crate::domain::error::ScannerError;
use crate::domain::indicator::IndicatorParams;
use crate::domain::market::Timeframe;
use crate::ports::config_port::ConfigPort;

pub const DEFAULT_RISK_PCT: f64 = 0.5;
pub const DEFAULT_RR_RATIO: f64 = 2.0;
pub const DEFAULT_POLL_INTERVAL_MS: i64 = 1000;
pub const DEFAULT_MIN_BARS: i64 = 250;
pub const DEFAULT_ATR_MULTIPLIER: f64 = 1.5;

pub fn validate_scanner_config(config: &dyn ConfigPort) -> Result<(), ScannerError> {
    validate_risk_pct(config)?;
    validate_rr_ratio(config)?;
    validate_timeframe(config)?;
    validate_poll_interval(config)?;
    validate_max_cycles(config)?;
    let params = validate_indicator_periods(config)?;
    validate_atr_multiplier(config)?;
    validate_min_bars(config, &params)?;
    validate_replay(config)?;
    validate_output(config)?;
    Ok(())
}

fn invalid(section: &str, key: &str, reason: &str) -> ScannerError {
    ScannerError::ConfigInvalid {
        section: section.to_string(),
        key: key.to_string(),
        reason: reason.to_string(),
    }
}

fn validate_risk_pct(config: &dyn ConfigPort) -> Result<(), ScannerError> {
    let value = config.get_double("scanner", "risk_pct", DEFAULT_RISK_PCT);
    if value <= 0.0 || value > 100.0 {
        return Err(invalid(
            "scanner",
            "risk_pct",
            "risk_pct must be greater than 0 and at most 100",
        ));
    }
    Ok(())
}

fn validate_rr_ratio(config: &dyn ConfigPort) -> Result<(), ScannerError> {
    let value = config.get_double("scanner", "rr_ratio", DEFAULT_RR_RATIO);
    if value <= 0.0 {
        return Err(invalid("scanner", "rr_ratio", "rr_ratio must be positive"));
    }
    Ok(())
}

/// Parsed `[scanner] timeframe`, defaulting to H1.
pub fn parse_timeframe(config: &dyn ConfigPort) -> Result<Timeframe, ScannerError> {
    match config.get_string("scanner", "timeframe") {
        None => Ok(Timeframe::default()),
        Some(s) => s
            .parse::<Timeframe>()
            .map_err(|reason| invalid("scanner", "timeframe", &reason)),
    }
}

fn validate_timeframe(config: &dyn ConfigPort) -> Result<(), ScannerError> {
    parse_timeframe(config).map(|_| ())
}

fn validate_poll_interval(config: &dyn ConfigPort) -> Result<(), ScannerError> {
    let value = config.get_int("scanner", "poll_interval_ms", DEFAULT_POLL_INTERVAL_MS);
    if value <= 0 {
        return Err(invalid(
            "scanner",
            "poll_interval_ms",
            "poll_interval_ms must be positive",
        ));
    }
    Ok(())
}

fn validate_max_cycles(config: &dyn ConfigPort) -> Result<(), ScannerError> {
    if config.get_int("scanner", "max_cycles", 0) < 0 {
        return Err(invalid(
            "scanner",
            "max_cycles",
            "max_cycles must be non-negative",
        ));
    }
    Ok(())
}

fn read_period(config: &dyn ConfigPort, key: &str, default: usize) -> Result<usize, ScannerError> {
    let value = config.get_int("indicators", key, default as i64);
    if value <= 0 {
        return Err(invalid(
            "indicators",
            key,
            &format!("{} must be a positive integer", key),
        ));
    }
    Ok(value as usize)
}

/// Indicator lookbacks from `[indicators]`, each checked to be positive.
pub fn validate_indicator_periods(config: &dyn ConfigPort) -> Result<IndicatorParams, ScannerError> {
    let defaults = IndicatorParams::default();
    Ok(IndicatorParams {
        ema_period: read_period(config, "ema_period", defaults.ema_period)?,
        atr_period: read_period(config, "atr_period", defaults.atr_period)?,
        rsi_period: read_period(config, "rsi_period", defaults.rsi_period)?,
        adx_period: read_period(config, "adx_period", defaults.adx_period)?,
        channel_lookback: read_period(config, "channel_lookback", defaults.channel_lookback)?,
    })
}

fn validate_atr_multiplier(config: &dyn ConfigPort) -> Result<(), ScannerError> {
    let value = config.get_double("indicators", "atr_multiplier", DEFAULT_ATR_MULTIPLIER);
    if value <= 0.0 {
        return Err(invalid(
            "indicators",
            "atr_multiplier",
            "atr_multiplier must be positive",
        ));
    }
    Ok(())
}

fn validate_min_bars(config: &dyn ConfigPort, params: &IndicatorParams) -> Result<(), ScannerError> {
    let value = config.get_int("scanner", "min_bars", DEFAULT_MIN_BARS);
    let warmup = params.warmup_bars();
    if value < warmup as i64 {
        return Err(invalid(
            "scanner",
            "min_bars",
            &format!("min_bars must be at least {} for the configured indicators", warmup),
        ));
    }
    Ok(())
}

fn validate_replay(config: &dyn ConfigPort) -> Result<(), ScannerError> {
    for key in ["balance", "equity"] {
        if config.get_double("replay", key, 0.0) < 0.0 {
            return Err(invalid(
                "replay",
                key,
                &format!("{} must be non-negative", key),
            ));
        }
    }
    Ok(())
}

fn validate_output(config: &dyn ConfigPort) -> Result<(), ScannerError> {
    if config.get_int("output", "table_rows", 0) < 0 {
        return Err(invalid(
            "output",
            "table_rows",
            "table_rows must be non-negative (0 shows every row)",
        ));
    }
    Ok(())
}
