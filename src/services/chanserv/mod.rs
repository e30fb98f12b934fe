//! ChanServ - Channel registration service.
//!
//! Hosts the services-administrator `FREGISTER` command along with the
//! access, channel and mode-lock flag sets registrations are stored with.

mod commands;
pub mod flags;

pub use commands::{ChanServ, ChanServResult, Promotion, decide_promotion};
pub use flags::{AccessFlags, ChannelFlags, ModeSet};
