//! Channel-related types and state.

use super::Uid;
use std::collections::HashMap;

/// Member modes (owner, protect, op, etc.).
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct MemberModes {
    pub owner: bool,  // +q (~)
    pub admin: bool,  // +a (&)
    pub op: bool,     // +o (@)
    pub halfop: bool, // +h (%)
    pub voice: bool,  // +v (+)
}

/// A live channel on the network.
#[derive(Debug, Clone)]
pub struct Channel {
    pub name: String,
    /// Unix timestamp the channel was created at (its TS).
    pub created: i64,
    /// Channel key (+k), if set.
    pub key: Option<String>,
    /// Member limit (+l), if set.
    pub limit: Option<u32>,
    pub members: HashMap<Uid, MemberModes>,
}

impl Channel {
    /// Create a new, empty channel.
    pub fn new(name: String, created: i64) -> Self {
        Self {
            name,
            created,
            key: None,
            limit: None,
            members: HashMap::new(),
        }
    }

    /// Add a member to the channel.
    pub fn add_member(&mut self, uid: Uid, modes: MemberModes) {
        self.members.insert(uid, modes);
    }

    /// Remove a member from the channel.
    pub fn remove_member(&mut self, uid: &str) -> bool {
        self.members.remove(uid).is_some()
    }

    /// Check if user is a member.
    pub fn is_member(&self, uid: &str) -> bool {
        self.members.contains_key(uid)
    }

    /// Get a member's status modes.
    pub fn member_modes(&self, uid: &str) -> Option<&MemberModes> {
        self.members.get(uid)
    }
}
