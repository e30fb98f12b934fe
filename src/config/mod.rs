//! Configuration loading and management.
//!
//! This module is split into logical submodules:
//! - [`types`]: Core config struct definitions (Config, ServerConfig, DatabaseConfig)
//! - [`services`]: Per-service settings (ChanServConfig, ConsoleConfig)
//! - [`ircd`]: Capabilities of the IRC daemon variant we are linked to (IrcdConfig)
//! - [`validation`]: Startup validation

mod defaults;
mod ircd;
mod services;
mod types;
pub mod validation;

pub use ircd::IrcdConfig;
pub use services::{ChanServConfig, ConsoleConfig};
pub use types::{Config, ConfigError, DatabaseConfig, ServerConfig};
