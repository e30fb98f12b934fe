//! ChanServ command handlers.
//!
//! The service struct and its command table live here; each command's
//! handler is in its own submodule.

mod fregister;

pub use fregister::{Promotion, decide_promotion};

use super::ChannelFlags;
use crate::config::ChanServConfig;
use crate::db::Database;
use crate::services::base::{CommandSpec, PRIV_CHAN_ADMIN, ServiceBase};
use crate::services::{CommandSource, HookBus, Service, ServiceEffect};
use crate::state::{Matrix, Uid};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::warn;

/// Result of a ChanServ command - a list of effects to apply.
pub type ChanServResult = Vec<ServiceEffect>;

const COMMANDS: &[CommandSpec] = &[
    CommandSpec {
        name: "FREGISTER",
        desc: "Forcibly registers a channel.",
        syntax: "FREGISTER <#channel>",
        privilege: Some(PRIV_CHAN_ADMIN),
        max_params: 3,
    },
    CommandSpec {
        name: "HELP",
        desc: "Displays contextual help information.",
        syntax: "HELP [command]",
        privilege: None,
        max_params: 1,
    },
];

/// ChanServ service.
pub struct ChanServ {
    pub(crate) db: Database,
    pub(crate) hooks: Arc<HookBus>,
    pub(crate) config: ChanServConfig,
    /// Flags every new registration starts with.
    pub(crate) default_flags: ChannelFlags,
    /// UID of the ChanServ pseudo-client in the Matrix.
    pub(crate) client_uid: Uid,
}

impl ChanServ {
    /// Create a new ChanServ service.
    ///
    /// `client_uid` is the pseudo-client ChanServ joins and sets modes as.
    pub fn new(db: Database, hooks: Arc<HookBus>, config: ChanServConfig, client_uid: Uid) -> Self {
        let mut default_flags = ChannelFlags::empty();
        for name in &config.default_flags {
            match ChannelFlags::from_config_name(name) {
                Some(flag) => default_flags |= flag,
                None => warn!(flag = %name, "Ignoring unknown default channel flag"),
            }
        }

        Self {
            db,
            hooks,
            config,
            default_flags,
            client_uid,
        }
    }

    /// Handle a PRIVMSG to ChanServ.
    /// Returns a list of effects that the caller should apply.
    pub async fn handle_command(
        &self,
        matrix: &Arc<Matrix>,
        source: &CommandSource,
        text: &str,
    ) -> ChanServResult {
        let Some(user) = matrix.user_snapshot(&source.uid).await else {
            return Vec::new();
        };

        let (spec, params) = match self.resolve_command(source, &user, text) {
            Ok(resolved) => resolved,
            Err(reply) => return reply,
        };

        match spec.name {
            "FREGISTER" => self.handle_fregister(matrix, source, &user, &params).await,
            "HELP" => self.help_reply(&source.uid, &user, params.first().copied()),
            other => self.unknown_command(&source.uid, other),
        }
    }
}

impl ServiceBase for ChanServ {
    fn service_name(&self) -> &str {
        &self.config.nick
    }

    fn commands(&self) -> &'static [CommandSpec] {
        COMMANDS
    }
}

#[async_trait]
impl Service for ChanServ {
    fn name(&self) -> &str {
        &self.config.nick
    }

    fn aliases(&self) -> Vec<&'static str> {
        vec!["CS"]
    }

    async fn handle(
        &self,
        matrix: &Arc<Matrix>,
        source: &CommandSource,
        text: &str,
    ) -> Vec<ServiceEffect> {
        self.handle_command(matrix, source, text).await
    }
}
