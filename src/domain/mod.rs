//! Core domain types and logic: indicators, scoring, trade setups and the scan cycle.

pub mod ohlcv;
pub mod indicator;
pub mod market;
pub mod universe;
pub mod scoring;
pub mod trade_setup;
pub mod opportunity;
pub mod analysis;
pub mod scan_loop;
pub mod settings;
pub mod config_validation;
pub mod error;
