//! CatServ - a cat.

use crate::services::base::{CommandSpec, ServiceBase};
use crate::services::{CommandSource, Service, ServiceEffect};
use crate::state::Matrix;
use async_trait::async_trait;
use std::sync::Arc;

const COMMANDS: &[CommandSpec] = &[
    CommandSpec {
        name: "MEOW",
        desc: "Makes the cute little kitty-cat meow!",
        syntax: "MEOW",
        privilege: None,
        max_params: 0,
    },
    CommandSpec {
        name: "HELP",
        desc: "Displays contextual help information.",
        syntax: "HELP [command]",
        privilege: None,
        max_params: 1,
    },
];

/// CatServ service.
#[derive(Debug, Default)]
pub struct CatServ;

impl CatServ {
    pub fn new() -> Self {
        Self
    }
}

impl ServiceBase for CatServ {
    fn service_name(&self) -> &str {
        "CatServ"
    }

    fn commands(&self) -> &'static [CommandSpec] {
        COMMANDS
    }
}

#[async_trait]
impl Service for CatServ {
    fn name(&self) -> &str {
        "CatServ"
    }

    async fn handle(
        &self,
        matrix: &Arc<Matrix>,
        source: &CommandSource,
        text: &str,
    ) -> Vec<ServiceEffect> {
        let Some(user) = matrix.user_snapshot(&source.uid).await else {
            return Vec::new();
        };

        let (spec, params) = match self.resolve_command(source, &user, text) {
            Ok(resolved) => resolved,
            Err(reply) => return reply,
        };

        match spec.name {
            "MEOW" => vec![self.reply_effect(&source.uid, "Meow!")],
            "HELP" => self.help_reply(&source.uid, &user, params.first().copied()),
            other => self.unknown_command(&source.uid, other),
        }
    }
}
