//! Default value functions for configuration.
//!
//! Separated into its own module for clarity and reuse.

/// Returns `true` (for serde defaults).
pub fn default_true() -> bool {
    true
}

// =============================================================================
// ChanServ Defaults
// =============================================================================

pub fn default_chanserv_nick() -> String {
    "ChanServ".to_string()
}

pub fn default_chanserv_flags() -> Vec<String> {
    vec!["guard".to_string(), "verbose".to_string()]
}

// =============================================================================
// IRCd Defaults
// =============================================================================

pub fn default_owner_mode() -> char {
    'q'
}

pub fn default_protect_mode() -> char {
    'a'
}

// =============================================================================
// Console Defaults
// =============================================================================

pub fn default_console_nick() -> String {
    "operator".to_string()
}
