//! Live network state as seen by services.
//!
//! Registrations (durable) and live channels (transient) are deliberately
//! separate: services look a channel up by name every time they need it and
//! never keep a handle across commands.

mod channel;
mod matrix;
mod user;

pub use channel::{Channel, MemberModes};
pub use matrix::{Matrix, Uid};
pub use user::User;
