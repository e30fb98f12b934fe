//! ChanServ flag sets: access flags, channel flags and mode-lock sets.
//!
//! All three are small bitsets persisted as letters (access, mode lock) or
//! as an integer (channel flags).

use bitflags::bitflags;
use std::fmt;

// ============================================================================
// Access flags
// ============================================================================

bitflags! {
    /// Per-entity channel access flags.
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
    pub struct AccessFlags: u32 {
        const VOICE = 1 << 0; // v
        const AUTOVOICE = 1 << 1; // V
        const OP = 1 << 2; // o
        const AUTOOP = 1 << 3; // O
        const TOPIC = 1 << 4; // t
        const SET = 1 << 5; // s
        const REMOVE = 1 << 6; // r
        const INVITE = 1 << 7; // i
        const RECOVER = 1 << 8; // R
        const SETFLAGS = 1 << 9; // f
        const HALFOP = 1 << 10; // h
        const AUTOHALFOP = 1 << 11; // H
        const ACLVIEW = 1 << 12; // A
        const USEPROTECT = 1 << 13; // a
        const USEOWNER = 1 << 14; // q
        const FOUNDER = 1 << 15; // F
    }
}

impl AccessFlags {
    const LETTERS: [(char, AccessFlags); 16] = [
        ('A', Self::ACLVIEW),
        ('F', Self::FOUNDER),
        ('H', Self::AUTOHALFOP),
        ('O', Self::AUTOOP),
        ('R', Self::RECOVER),
        ('V', Self::AUTOVOICE),
        ('a', Self::USEPROTECT),
        ('f', Self::SETFLAGS),
        ('h', Self::HALFOP),
        ('i', Self::INVITE),
        ('o', Self::OP),
        ('q', Self::USEOWNER),
        ('r', Self::REMOVE),
        ('s', Self::SET),
        ('t', Self::TOPIC),
        ('v', Self::VOICE),
    ];

    /// Flags granted to a channel founder: everything except the automatic
    /// voice/halfop grants, which auto-op supersedes.
    pub fn founder_template() -> Self {
        Self::all().difference(Self::AUTOVOICE | Self::AUTOHALFOP)
    }

    /// Parse a flag string such as `+AFOo`. Unknown letters are ignored.
    pub fn parse(s: &str) -> Self {
        s.chars()
            .filter_map(|c| {
                Self::LETTERS
                    .iter()
                    .find(|(letter, _)| *letter == c)
                    .map(|(_, flag)| *flag)
            })
            .fold(Self::empty(), |acc, flag| acc | flag)
    }
}

impl fmt::Display for AccessFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("+")?;
        for (letter, flag) in Self::LETTERS {
            if self.contains(flag) {
                write!(f, "{}", letter)?;
            }
        }
        Ok(())
    }
}

// ============================================================================
// Channel flags
// ============================================================================

bitflags! {
    /// Registration-wide channel settings.
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
    pub struct ChannelFlags: u32 {
        const HOLD = 1 << 0;
        const SECURE = 1 << 1;
        const VERBOSE = 1 << 2;
        const RESTRICTED = 1 << 3;
        const KEEPTOPIC = 1 << 4;
        const VERBOSE_OPS = 1 << 5;
        const TOPICLOCK = 1 << 6;
        const GUARD = 1 << 7;
        /// Hide founder information from non-privileged users.
        const PRIVATE = 1 << 8;
    }
}

impl ChannelFlags {
    const NAMES: [(&'static str, ChannelFlags); 9] = [
        ("hold", Self::HOLD),
        ("secure", Self::SECURE),
        ("verbose", Self::VERBOSE),
        ("restricted", Self::RESTRICTED),
        ("keeptopic", Self::KEEPTOPIC),
        ("verbose_ops", Self::VERBOSE_OPS),
        ("topiclock", Self::TOPICLOCK),
        ("guard", Self::GUARD),
        ("private", Self::PRIVATE),
    ];

    /// Look up a single flag by its configuration name (case-insensitive).
    pub fn from_config_name(name: &str) -> Option<Self> {
        Self::NAMES
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, flag)| *flag)
    }

    /// Configuration names of the flags in this set.
    pub fn names(self) -> Vec<&'static str> {
        Self::NAMES
            .iter()
            .filter(|(_, flag)| self.contains(*flag))
            .map(|(name, _)| *name)
            .collect()
    }
}

// ============================================================================
// Mode-lock sets
// ============================================================================

bitflags! {
    /// A set of simple (parameterless in the lock) channel modes.
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
    pub struct ModeSet: u32 {
        const INVITE = 1 << 0; // i
        const KEY = 1 << 1; // k
        const LIMIT = 1 << 2; // l
        const MODERATED = 1 << 3; // m
        const NOEXT = 1 << 4; // n
        const PRIVATE = 1 << 5; // p
        const SECRET = 1 << 6; // s
        const TOPIC = 1 << 7; // t
    }
}

impl ModeSet {
    const LETTERS: [(char, ModeSet); 8] = [
        ('i', Self::INVITE),
        ('k', Self::KEY),
        ('l', Self::LIMIT),
        ('m', Self::MODERATED),
        ('n', Self::NOEXT),
        ('p', Self::PRIVATE),
        ('s', Self::SECRET),
        ('t', Self::TOPIC),
    ];

}

impl fmt::Display for ModeSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (letter, mode) in Self::LETTERS {
            if self.contains(mode) {
                write!(f, "{}", letter)?;
            }
        }
        Ok(())
    }
}
