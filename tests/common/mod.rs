//! Integration test common infrastructure.
//!
//! Provides an in-process test network (Matrix, in-memory database and the
//! loaded services) and test clients that capture what the network sends
//! them.

pub mod client;
pub mod network;

#[allow(unused_imports)]
pub use client::TestClient;
#[allow(unused_imports)]
pub use network::TestNetwork;
