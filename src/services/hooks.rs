//! Hook bus for channel registration policy.
//!
//! Policy modules register hooks here when they load and remove them with
//! the returned [`HookId`] when they unload. Two hook points exist:
//!
//! - `can_register`: consulted in order before a registration is committed;
//!   the first denial vetoes it. A denying hook is responsible for telling
//!   the user why, by returning its own reply effects.
//! - `on_register`: notified in order after a registration is committed;
//!   cannot veto, may react (send replies, add access entries).
//!
//! The bus is owned by the service manager and handed to services, never
//! reached through a global.

use crate::db::{AccountRecord, ChannelRecord, Database};
use crate::services::{CommandSource, ServiceEffect};
use crate::state::Channel;
use async_trait::async_trait;
use parking_lot::RwLock;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::debug;

/// Handle returned when a hook is added, used to remove it again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HookId(u64);

/// A registration about to be committed.
pub struct RegisterCheck<'a> {
    pub source: &'a CommandSource,
    pub account: &'a AccountRecord,
    pub name: &'a str,
    /// The live channel as it was when acquired.
    pub channel: &'a Channel,
}

/// Outcome of a `can_register` hook.
#[derive(Debug)]
pub enum Approval {
    Approved,
    /// Registration is vetoed. `effects` carry the hook's own messaging.
    Denied {
        hook: &'static str,
        effects: Vec<ServiceEffect>,
    },
}

/// A registration that has just been committed.
pub struct ChannelRegistered<'a> {
    pub source: &'a CommandSource,
    pub account: &'a AccountRecord,
    pub record: &'a ChannelRecord,
    pub db: &'a Database,
}

/// Vetoing hook run before a channel registration is committed.
#[async_trait]
pub trait ChannelRegisterCheck: Send + Sync {
    /// Hook name, used in logs.
    fn name(&self) -> &'static str;

    async fn can_register(&self, check: &RegisterCheck<'_>) -> Approval;
}

/// Observer run after a channel registration is committed.
#[async_trait]
pub trait ChannelRegisterObserver: Send + Sync {
    /// Hook name, used in logs.
    fn name(&self) -> &'static str;

    async fn on_register(&self, event: &ChannelRegistered<'_>) -> Vec<ServiceEffect>;
}

/// Ordered hook lists for channel registration.
#[derive(Default)]
pub struct HookBus {
    next_id: AtomicU64,
    can_register: RwLock<Vec<(HookId, Arc<dyn ChannelRegisterCheck>)>>,
    on_register: RwLock<Vec<(HookId, Arc<dyn ChannelRegisterObserver>)>>,
}

impl HookBus {
    /// Create an empty hook bus.
    pub fn new() -> Self {
        Self::default()
    }

    fn allocate_id(&self) -> HookId {
        HookId(self.next_id.fetch_add(1, Ordering::Relaxed))
    }

    /// Append a `can_register` hook.
    pub fn add_register_check(&self, hook: Arc<dyn ChannelRegisterCheck>) -> HookId {
        let id = self.allocate_id();
        debug!(hook = hook.name(), "Added channel register check");
        self.can_register.write().push((id, hook));
        id
    }

    /// Append an `on_register` observer.
    pub fn add_register_observer(&self, hook: Arc<dyn ChannelRegisterObserver>) -> HookId {
        let id = self.allocate_id();
        debug!(hook = hook.name(), "Added channel register observer");
        self.on_register.write().push((id, hook));
        id
    }

    /// Remove a hook of either kind. Returns false if it was not registered.
    pub fn remove(&self, id: HookId) -> bool {
        let mut checks = self.can_register.write();
        let before = checks.len();
        checks.retain(|(hook_id, _)| *hook_id != id);
        if checks.len() != before {
            return true;
        }
        drop(checks);

        let mut observers = self.on_register.write();
        let before = observers.len();
        observers.retain(|(hook_id, _)| *hook_id != id);
        observers.len() != before
    }

    /// Number of registered hooks of both kinds.
    pub fn len(&self) -> usize {
        self.can_register.read().len() + self.on_register.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Run `can_register` hooks in order, stopping at the first denial.
    pub async fn call_can_register(&self, check: &RegisterCheck<'_>) -> Approval {
        // Snapshot so no lock is held across hook awaits
        let hooks: Vec<Arc<dyn ChannelRegisterCheck>> = self
            .can_register
            .read()
            .iter()
            .map(|(_, hook)| hook.clone())
            .collect();

        for hook in hooks {
            if let denied @ Approval::Denied { .. } = hook.can_register(check).await {
                return denied;
            }
        }
        Approval::Approved
    }

    /// Run every `on_register` observer in order, collecting their effects.
    pub async fn call_on_register(&self, event: &ChannelRegistered<'_>) -> Vec<ServiceEffect> {
        let hooks: Vec<Arc<dyn ChannelRegisterObserver>> = self
            .on_register
            .read()
            .iter()
            .map(|(_, hook)| hook.clone())
            .collect();

        let mut effects = Vec::new();
        for hook in hooks {
            effects.extend(hook.on_register(event).await);
        }
        effects
    }
}
