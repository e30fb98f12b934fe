//! slircd-services - IRC services for slircd networks.
//!
//! ChanServ forced channel registration (`FREGISTER`) with pluggable
//! registration policy hooks, and CatServ.

pub mod config;
pub mod db;
pub mod error;
pub mod proto;
pub mod services;
pub mod state;
pub mod telemetry;
