//! Concrete adapter implementations for ports.

pub mod channel_sink;
pub mod console_sink;
pub mod csv_adapter;
pub mod csv_export;
pub mod fanout_sink;
pub mod file_config_adapter;
pub mod score_tracker;
