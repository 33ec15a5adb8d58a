//! setupscan: ranks a universe of instruments by setup quality.
//!
//! Hexagonal architecture: scoring and scan-cycle logic in [`domain`], port traits in
//! [`ports`], concrete market data, configuration and presentation adapters in
//! [`adapters`]. The background scanner thread lives in [`worker`].

pub mod domain;
pub mod ports;
pub mod adapters;
pub mod worker;
pub mod cli;
