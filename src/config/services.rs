//! Per-service configuration.

use serde::Deserialize;

use super::defaults::{
    default_chanserv_flags, default_chanserv_nick, default_console_nick, default_true,
};

/// ChanServ configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ChanServConfig {
    /// Nickname of the ChanServ client (default: "ChanServ").
    #[serde(default = "default_chanserv_nick")]
    pub nick: String,
    /// Part channels ChanServ had to join only to register them (default: true).
    #[serde(default = "default_true")]
    pub leave_channels: bool,
    /// Honour the `private` channel flag when reporting existing
    /// registrations (default: false).
    #[serde(default)]
    pub use_channel_private: bool,
    /// Channel flags set on every new registration (default: guard, verbose).
    #[serde(default = "default_chanserv_flags")]
    pub default_flags: Vec<String>,
    /// Default access templates stored on new registrations, in
    /// `NAME=+flags` form separated by spaces. Empty disables.
    #[serde(default)]
    pub default_templates: String,
}

impl Default for ChanServConfig {
    fn default() -> Self {
        Self {
            nick: default_chanserv_nick(),
            leave_channels: true,
            use_channel_private: false,
            default_flags: default_chanserv_flags(),
            default_templates: String::new(),
        }
    }
}

/// Local operator console used by the `slircd-services` binary.
#[derive(Debug, Clone, Deserialize)]
pub struct ConsoleConfig {
    /// Nickname of the console user.
    #[serde(default = "default_console_nick")]
    pub nick: String,
    /// Account the console user is identified to, if any.
    #[serde(default)]
    pub account: Option<String>,
    /// Services privileges granted to the console user (e.g., "chan:admin").
    #[serde(default)]
    pub privileges: Vec<String>,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            nick: default_console_nick(),
            account: None,
            privileges: Vec::new(),
        }
    }
}
