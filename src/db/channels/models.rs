//! Channel database models.

use std::collections::HashMap;

/// A registered ChanServ channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelRecord {
    pub id: i64,
    pub name: String,
    pub registered_at: i64,
    pub last_used_at: i64,
    /// Mode letters locked on (e.g., "nt").
    pub mlock_on: String,
    /// Mode letters locked off (e.g., "lk").
    pub mlock_off: String,
    /// Channel flag bits.
    pub flags: u32,
    /// Open key/value metadata; keys this crate does not know are preserved.
    pub metadata: HashMap<String, String>,
}

/// Channel access entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelAccess {
    /// Account name the entry applies to.
    pub entity: String,
    /// Access flag letters (e.g., "+AFORafioqrstv").
    pub flags: String,
    /// Account that granted the entry.
    pub setter: String,
    pub added_at: i64,
}

/// A registration about to be committed, with its founder entry.
#[derive(Debug, Clone)]
pub struct NewChannel<'a> {
    pub name: &'a str,
    pub registered_at: i64,
    pub mlock_on: String,
    pub mlock_off: String,
    pub flags: u32,
    pub metadata: HashMap<String, String>,
    pub founder: &'a str,
    pub founder_flags: String,
    pub founder_setter: &'a str,
}
