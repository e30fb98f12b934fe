//! Channel repository for ChanServ functionality.
//!
//! Handles channel registration, access lists, and metadata.

pub mod models;
pub mod queries;

pub use models::{ChannelAccess, ChannelRecord, NewChannel};
pub use queries::ChannelRepository;
