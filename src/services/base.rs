//! Base trait for IRC services (ChanServ, CatServ, etc.).
//!
//! Provides common functionality for service reply handling, command tables,
//! privilege checks and HELP output to eliminate code duplication across
//! services.

use crate::error::ServiceError;
use crate::proto::{Command, Message, Prefix};
use crate::state::User;
use tracing::debug;

use super::{CommandSource, ServiceEffect};

/// Services privilege required for channel administration commands.
pub const PRIV_CHAN_ADMIN: &str = "chan:admin";

/// A command a service exposes.
#[derive(Debug, Clone, Copy)]
pub struct CommandSpec {
    pub name: &'static str,
    /// One-line description shown in the HELP listing.
    pub desc: &'static str,
    pub syntax: &'static str,
    /// Services privilege needed to run (and list) the command.
    pub privilege: Option<&'static str>,
    /// Maximum parameter count; the last parameter takes the remainder.
    pub max_params: usize,
}

/// Split a command line into its uppercased command word and the rest.
pub fn split_command(text: &str) -> Option<(String, &str)> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    let (command, rest) = text.split_once(char::is_whitespace).unwrap_or((text, ""));
    Some((command.to_uppercase(), rest.trim_start()))
}

/// Split arguments into at most `max_params` parameters.
pub fn split_params(args: &str, max_params: usize) -> Vec<&str> {
    let mut params = Vec::with_capacity(max_params);
    let mut rest = args.trim_start();

    while !rest.is_empty() && params.len() < max_params {
        if params.len() + 1 == max_params {
            params.push(rest.trim_end());
            break;
        }
        match rest.split_once(char::is_whitespace) {
            Some((param, tail)) => {
                params.push(param);
                rest = tail.trim_start();
            }
            None => {
                params.push(rest);
                break;
            }
        }
    }

    params
}

/// Check that `user` holds the privilege `spec` requires.
pub fn check_privilege(spec: &CommandSpec, user: &User) -> Result<(), ServiceError> {
    match spec.privilege {
        Some(privilege) if !user.has_privilege(privilege) => {
            Err(ServiceError::NoPrivilege(privilege))
        }
        _ => Ok(()),
    }
}

/// Base trait for IRC services providing common reply and validation functionality.
pub trait ServiceBase {
    /// Get the service name (e.g., "ChanServ", "CatServ").
    fn service_name(&self) -> &str;

    /// The service's command table.
    fn commands(&self) -> &'static [CommandSpec];

    /// Look a command up by (uppercased) name.
    fn find_command(&self, name: &str) -> Option<&'static CommandSpec> {
        self.commands().iter().find(|spec| spec.name == name)
    }

    /// Resolve a command line against the command table.
    ///
    /// Checks the required privilege and splits the parameters. On failure
    /// returns the reply to send instead; unknown fantasy commands get none.
    fn resolve_command<'t>(
        &self,
        source: &CommandSource,
        user: &User,
        text: &'t str,
    ) -> Result<(&'static CommandSpec, Vec<&'t str>), Vec<ServiceEffect>> {
        let Some((command, args)) = split_command(text) else {
            return Err(self.help_reply(&source.uid, user, None));
        };

        let Some(spec) = self.find_command(&command) else {
            if source.is_fantasy() {
                return Err(Vec::new());
            }
            return Err(self.unknown_command(&source.uid, &command));
        };

        if let Err(e) = check_privilege(spec, user) {
            debug!(
                service = self.service_name(),
                command = spec.name,
                nick = %source.nick,
                error = e.error_code(),
                "Command refused"
            );
            return Err(self.error_effects(&source.uid, e));
        }

        Ok((spec, split_params(args, spec.max_params)))
    }

    /// Create a single reply effect (NOTICE to user).
    fn reply_effect(&self, target_uid: &str, text: &str) -> ServiceEffect {
        ServiceEffect::Reply {
            target_uid: target_uid.to_string(),
            msg: Message {
                prefix: Some(Prefix::ServerName(self.service_name().to_string())),
                command: Command::NOTICE("*".to_string(), text.to_string()),
            },
        }
    }

    /// Create an error reply (single message).
    fn error_reply(&self, uid: &str, text: &str) -> Vec<ServiceEffect> {
        vec![self.reply_effect(uid, text)]
    }

    /// Turn a command failure into the effects the user sees.
    ///
    /// A policy denial carries its own messaging and nothing else is added.
    fn error_effects(&self, uid: &str, err: ServiceError) -> Vec<ServiceEffect> {
        match err {
            ServiceError::PolicyDenied { effects, .. } => effects,
            other => other
                .notices()
                .iter()
                .map(|line| self.reply_effect(uid, line))
                .collect(),
        }
    }

    /// Create an unknown command reply.
    fn unknown_command(&self, uid: &str, cmd: &str) -> Vec<ServiceEffect> {
        self.error_reply(
            uid,
            &format!(
                "Unknown command: \x02{}\x02. Use \x02/msg {} HELP\x02 for a command listing.",
                cmd,
                self.service_name()
            ),
        )
    }

    /// HELP output: the command listing, or one command's help for `topic`.
    ///
    /// Commands `user` lacks the privilege for are neither listed nor
    /// described.
    fn help_reply(&self, uid: &str, user: &User, topic: Option<&str>) -> Vec<ServiceEffect> {
        let name = self.service_name();
        let visible = |spec: &&CommandSpec| spec.privilege.is_none_or(|p| user.has_privilege(p));

        let mut lines = Vec::new();
        match topic {
            None => {
                lines.push(format!("***** \x02{} Help\x02 *****", name));
                lines.push("The following commands are available:".to_string());
                for spec in self.commands().iter().filter(visible) {
                    lines.push(format!("\x02{:<15}\x02 {}", spec.name, spec.desc));
                }
                lines.push(" ".to_string());
                lines.push(format!(
                    "For more information on a command, type: \x02/msg {} help <command>\x02",
                    name
                ));
                lines.push("***** \x02End of Help\x02 *****".to_string());
            }
            Some(topic) => {
                let topic = topic.to_uppercase();
                let Some(spec) = self
                    .commands()
                    .iter()
                    .filter(visible)
                    .find(|spec| spec.name == topic)
                else {
                    return self.error_reply(uid, &format!("No help available for \x02{}\x02.", topic));
                };
                lines.push(format!("***** \x02{} Help\x02 *****", name));
                lines.push(format!("Help for \x02{}\x02:", spec.name));
                lines.push(spec.desc.to_string());
                lines.push(" ".to_string());
                lines.push(format!("Syntax: {}", spec.syntax));
                lines.push("***** \x02End of Help\x02 *****".to_string());
            }
        }

        lines
            .iter()
            .map(|line| self.reply_effect(uid, line))
            .collect()
    }
}
