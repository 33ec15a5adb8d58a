//! Port traits: the seams between the scanner core and the outside world.

pub mod config_port;
pub mod market_data_port;
pub mod scan_sink_port;
