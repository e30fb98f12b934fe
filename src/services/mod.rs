//! IRC services module.
//!
//! Provides virtual services like ChanServ and CatServ.

pub mod base;
pub mod catserv;
pub mod chanserv;
pub mod effect;
pub mod hooks;
pub mod traits;

pub use effect::{ServiceEffect, apply_effect, apply_effects};
pub use hooks::{
    Approval, ChannelRegisterCheck, ChannelRegisterObserver, ChannelRegistered, HookBus, HookId,
    RegisterCheck,
};
pub use traits::Service;

use crate::proto::irc_eq;
use crate::state::{Matrix, Uid};
use crate::telemetry::{CommandTimer, spans};
use std::sync::Arc;
use tracing::{Instrument, debug};

/// Who issued a service command, and where.
#[derive(Debug, Clone)]
pub struct CommandSource {
    pub uid: Uid,
    pub nick: String,
    /// Set when the command was relayed from a channel (fantasy command).
    pub channel: Option<String>,
}

impl CommandSource {
    /// A command sent straight to the service.
    pub fn direct(uid: impl Into<Uid>, nick: impl Into<String>) -> Self {
        Self {
            uid: uid.into(),
            nick: nick.into(),
            channel: None,
        }
    }

    /// A command relayed from `channel`.
    pub fn fantasy(uid: impl Into<Uid>, nick: impl Into<String>, channel: impl Into<String>) -> Self {
        Self {
            uid: uid.into(),
            nick: nick.into(),
            channel: Some(channel.into()),
        }
    }

    pub fn is_fantasy(&self) -> bool {
        self.channel.is_some()
    }
}

/// Owns the loaded services.
#[derive(Default)]
pub struct ServiceManager {
    services: Vec<Arc<dyn Service>>,
}

impl ServiceManager {
    /// Create a manager with no services loaded.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a service.
    pub fn register(&mut self, service: Arc<dyn Service>) {
        debug!(service = service.name(), "Service loaded");
        self.services.push(service);
    }

    /// Find a service by name or alias (case-insensitive).
    pub fn find(&self, target: &str) -> Option<&Arc<dyn Service>> {
        self.services.iter().find(|service| {
            irc_eq(service.name(), target) || service.aliases().iter().any(|a| irc_eq(a, target))
        })
    }

    /// Unified service message router.
    ///
    /// Routes a PRIVMSG to the service named by `target` and applies the
    /// resulting effects. Returns true if the message was handled by a
    /// service.
    pub async fn route_service_message(
        &self,
        matrix: &Arc<Matrix>,
        source: &CommandSource,
        target: &str,
        text: &str,
    ) -> bool {
        let Some(service) = self.find(target) else {
            return false;
        };

        let span = spans::command(service.name(), &source.nick, source.channel.as_deref());
        async {
            let _timer = CommandTimer::new(service.name());
            let effects = service.handle(matrix, source, text).await;
            apply_effects(matrix, effects).await;
        }
        .instrument(span)
        .await;
        true
    }
}
