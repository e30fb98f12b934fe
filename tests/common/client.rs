//! Test IRC client.
//!
//! A user in the test network whose outgoing queue is captured so tests
//! can assert on what services sent it.

use slircd_services::proto::{Command, Message};
use slircd_services::services::CommandSource;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::timeout;

/// A test IRC client.
#[allow(dead_code)]
pub struct TestClient {
    pub uid: String,
    pub nick: String,
    rx: mpsc::Receiver<Message>,
}

#[allow(dead_code)]
impl TestClient {
    pub(crate) fn new(uid: String, nick: String, rx: mpsc::Receiver<Message>) -> Self {
        Self { uid, nick, rx }
    }

    /// Source for a command sent directly to a service.
    pub fn source(&self) -> CommandSource {
        CommandSource::direct(self.uid.clone(), self.nick.clone())
    }

    /// Source for a command relayed from `channel`.
    pub fn fantasy_source(&self, channel: &str) -> CommandSource {
        CommandSource::fantasy(self.uid.clone(), self.nick.clone(), channel)
    }

    /// Receive a message with a timeout.
    pub async fn recv_timeout(&mut self, dur: Duration) -> anyhow::Result<Message> {
        timeout(dur, self.rx.recv())
            .await?
            .ok_or_else(|| anyhow::anyhow!("client queue closed"))
    }

    /// Everything queued so far.
    pub fn drain(&mut self) -> Vec<Message> {
        let mut messages = Vec::new();
        while let Ok(msg) = self.rx.try_recv() {
            messages.push(msg);
        }
        messages
    }

    /// Text of every queued NOTICE, discarding other lines.
    pub fn notices(&mut self) -> Vec<String> {
        self.drain()
            .into_iter()
            .filter_map(|msg| match msg.command {
                Command::NOTICE(_, text) => Some(text),
                _ => None,
            })
            .collect()
    }

    /// Every queued line, rendered as sent on the wire.
    pub fn lines(&mut self) -> Vec<String> {
        self.drain().iter().map(ToString::to_string).collect()
    }
}
