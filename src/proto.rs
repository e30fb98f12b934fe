//! IRC line types and name utilities used by the services layer.
//!
//! Only the handful of commands services emit are modelled here: NOTICE
//! replies, JOIN/PART of service clients and channel MODE changes.

use std::fmt;

/// Message origin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Prefix {
    /// A server or service name (`:ChanServ`).
    ServerName(String),
    /// A full user prefix (`:nick!user@host`).
    Nickname(String, String, String),
}

impl Prefix {
    /// Create a `nick!user@host` prefix.
    pub fn new(nick: impl Into<String>, user: impl Into<String>, host: impl Into<String>) -> Self {
        Prefix::Nickname(nick.into(), user.into(), host.into())
    }
}

impl fmt::Display for Prefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Prefix::ServerName(name) => write!(f, "{}", name),
            Prefix::Nickname(nick, user, host) => write!(f, "{}!{}@{}", nick, user, host),
        }
    }
}

/// Commands emitted by services.
#[derive(Debug, Clone, PartialEq, Eq)]
#[allow(clippy::upper_case_acronyms)]
pub enum Command {
    /// NOTICE target :text
    NOTICE(String, String),
    /// JOIN channel
    JOIN(String),
    /// PART channel [:reason]
    PART(String, Option<String>),
    /// MODE channel modestring [args...]
    ChannelMODE(String, String, Vec<String>),
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::NOTICE(target, text) => write!(f, "NOTICE {} :{}", target, text),
            Command::JOIN(channel) => write!(f, "JOIN {}", channel),
            Command::PART(channel, Some(reason)) => write!(f, "PART {} :{}", channel, reason),
            Command::PART(channel, None) => write!(f, "PART {}", channel),
            Command::ChannelMODE(channel, modes, args) => {
                write!(f, "MODE {} {}", channel, modes)?;
                for arg in args {
                    write!(f, " {}", arg)?;
                }
                Ok(())
            }
        }
    }
}

/// An outgoing IRC message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub prefix: Option<Prefix>,
    pub command: Command,
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(prefix) = &self.prefix {
            write!(f, ":{} ", prefix)?;
        }
        write!(f, "{}", self.command)
    }
}

/// Convert a single character to IRC lowercase (RFC 1459 case mapping).
#[inline]
pub const fn irc_lower_char(c: char) -> char {
    match c {
        '[' => '{',
        ']' => '}',
        '\\' => '|',
        '~' => '^',
        'A'..='Z' => (c as u8 + 32) as char,
        _ => c,
    }
}

/// Convert a string to IRC lowercase (RFC 1459 case mapping).
pub fn irc_to_lower(s: &str) -> String {
    s.chars().map(irc_lower_char).collect()
}

/// Compare two strings using IRC case-insensitive comparison.
pub fn irc_eq(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }

    a.chars()
        .zip(b.chars())
        .all(|(ca, cb)| irc_lower_char(ca) == irc_lower_char(cb))
}

/// Check whether a network would accept `name` as a channel.
///
/// Valid channel names start with `#` or `&`, are at most 50 characters
/// and contain no space, comma, BEL or control characters.
pub fn is_channel_name(name: &str) -> bool {
    let mut chars = name.chars();

    match chars.next() {
        Some('#' | '&') => {}
        _ => return false,
    }

    if name.chars().count() > 50 {
        return false;
    }

    chars.all(|c| c != ' ' && c != ',' && c != '\x07' && !c.is_control())
}
