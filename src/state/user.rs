//! User-related types and state.

use std::collections::HashSet;

/// A client visible to services: a network user or a service pseudo-client.
#[derive(Debug, Clone)]
pub struct User {
    pub uid: String,
    pub nick: String,
    pub user: String,
    pub host: String,
    /// Account name if identified to services.
    pub account: Option<String>,
    /// Services operator privileges (e.g., "chan:admin").
    pub privileges: HashSet<String>,
    /// Channels this user is in (lowercase names).
    pub channels: HashSet<String>,
    /// +S - network service pseudo-client.
    pub service: bool,
}

impl User {
    /// Create a plain, unidentified user.
    pub fn new(uid: impl Into<String>, nick: impl Into<String>) -> Self {
        let nick = nick.into();
        Self {
            uid: uid.into(),
            user: nick.to_lowercase(),
            nick,
            host: "localhost".to_string(),
            account: None,
            privileges: HashSet::new(),
            channels: HashSet::new(),
            service: false,
        }
    }

    /// Identify the user to an account.
    pub fn with_account(mut self, account: impl Into<String>) -> Self {
        self.account = Some(account.into());
        self
    }

    /// Grant a services privilege.
    pub fn with_privilege(mut self, privilege: impl Into<String>) -> Self {
        self.privileges.insert(privilege.into());
        self
    }

    /// Check for a services privilege.
    pub fn has_privilege(&self, privilege: &str) -> bool {
        self.privileges.contains(privilege)
    }
}
