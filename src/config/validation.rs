//! Configuration validation.
//!
//! Validates configuration at startup to catch common errors early.

use super::Config;
use crate::services::chanserv::ChannelFlags;
use std::path::Path;
use thiserror::Error;

/// Validation errors for configuration.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("server.name is required")]
    MissingServerName,
    #[error("server.network is required")]
    MissingNetworkName,
    #[error("chanserv.nick is required")]
    MissingChanServNick,
    #[error("chanserv.default_flags contains unknown flag '{0}'")]
    UnknownChannelFlag(String),
    #[error("ircd.{0} must be an ASCII letter, got '{1}'")]
    InvalidModeChar(&'static str, char),
    #[error("ircd.owner_mode and ircd.protect_mode must differ")]
    DuplicateModeChar,
    #[error("database.path parent directory does not exist: {0}")]
    DatabasePathInvalid(String),
}

/// Validate a configuration, returning all errors found.
pub fn validate(config: &Config) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    // Required fields
    if config.server.name.is_empty() {
        errors.push(ValidationError::MissingServerName);
    }
    if config.server.network.is_empty() {
        errors.push(ValidationError::MissingNetworkName);
    }
    if config.chanserv.nick.is_empty() {
        errors.push(ValidationError::MissingChanServNick);
    }

    for name in &config.chanserv.default_flags {
        if ChannelFlags::from_config_name(name).is_none() {
            errors.push(ValidationError::UnknownChannelFlag(name.clone()));
        }
    }

    // Status mode letters
    let ircd = &config.ircd;
    if !ircd.owner_mode.is_ascii_alphabetic() {
        errors.push(ValidationError::InvalidModeChar("owner_mode", ircd.owner_mode));
    }
    if !ircd.protect_mode.is_ascii_alphabetic() {
        errors.push(ValidationError::InvalidModeChar(
            "protect_mode",
            ircd.protect_mode,
        ));
    }
    if ircd.uses_owner && ircd.uses_protect && ircd.owner_mode == ircd.protect_mode {
        errors.push(ValidationError::DuplicateModeChar);
    }

    // Database path validation
    if let Some(ref db) = config.database {
        let db_path = Path::new(&db.path);
        if let Some(parent) = db_path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            errors.push(ValidationError::DatabasePathInvalid(db.path.clone()));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
