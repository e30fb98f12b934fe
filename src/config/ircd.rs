//! Linked IRC daemon capabilities.

use serde::Deserialize;

use super::defaults::{default_owner_mode, default_protect_mode, default_true};

/// Channel status tiers supported by the IRC daemon variant.
///
/// Networks differ on whether they have an owner (`~`) and a protect/admin
/// (`&`) tier above channel operator, and on which mode letters set them.
#[derive(Debug, Clone, Deserialize)]
pub struct IrcdConfig {
    /// The daemon supports an owner status tier (default: true).
    #[serde(default = "default_true")]
    pub uses_owner: bool,
    /// Mode letter granting owner status (default: 'q').
    #[serde(default = "default_owner_mode")]
    pub owner_mode: char,
    /// The daemon supports a protect status tier (default: true).
    #[serde(default = "default_true")]
    pub uses_protect: bool,
    /// Mode letter granting protect status (default: 'a').
    #[serde(default = "default_protect_mode")]
    pub protect_mode: char,
}

impl Default for IrcdConfig {
    fn default() -> Self {
        Self {
            uses_owner: true,
            owner_mode: default_owner_mode(),
            uses_protect: true,
            protect_mode: default_protect_mode(),
        }
    }
}
