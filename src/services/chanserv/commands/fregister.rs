//! FREGISTER: registration of a channel by a services administrator.
//!
//! Unlike a normal registration the actor need not be present or opped in
//! the channel, and the channel need not exist yet: ChanServ joins it to
//! bring it into existence and leaves again once it is registered.

use super::{ChanServ, ChanServResult};
use crate::config::IrcdConfig;
use crate::db::{AccountRecord, ChannelRecord, DbError, NewChannel};
use crate::error::{ServiceError, ServiceResult};
use crate::services::base::ServiceBase;
use crate::services::chanserv::{AccessFlags, ChannelFlags, ModeSet};
use crate::services::{Approval, ChannelRegistered, CommandSource, RegisterCheck, ServiceEffect};
use crate::state::{Channel, Matrix, MemberModes, User};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

const USAGE: &str = "To forcibly register a channel: FREGISTER <#channel>";
const SYNTAX: &str = "Syntax: FREGISTER <#channel>";

/// Status granted to the actor once the channel is registered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Promotion {
    None,
    Owner,
    Protect,
}

impl Promotion {
    /// The daemon's mode letter for this promotion.
    pub fn mode_char(self, ircd: &IrcdConfig) -> Option<char> {
        match self {
            Promotion::None => None,
            Promotion::Owner => Some(ircd.owner_mode),
            Promotion::Protect => Some(ircd.protect_mode),
        }
    }
}

/// Decide which status the actor gets in the freshly registered channel.
///
/// Owner is preferred over protect; either requires the matching access
/// flag together with auto-op, and is skipped if the member already has it.
pub fn decide_promotion(ircd: &IrcdConfig, flags: AccessFlags, member: &MemberModes) -> Promotion {
    let autoop = flags.contains(AccessFlags::AUTOOP);

    if ircd.uses_owner && autoop && flags.contains(AccessFlags::USEOWNER) && !member.owner {
        Promotion::Owner
    } else if ircd.uses_protect && autoop && flags.contains(AccessFlags::USEPROTECT) && !member.admin
    {
        Promotion::Protect
    } else {
        Promotion::None
    }
}

/// A live channel held for registration.
struct Acquired {
    channel: Channel,
    /// ChanServ had to join to bring the channel into existence.
    transient: bool,
}

impl ChanServ {
    /// Handle FREGISTER command.
    pub(super) async fn handle_fregister(
        &self,
        matrix: &Arc<Matrix>,
        source: &CommandSource,
        user: &User,
        params: &[&str],
    ) -> ChanServResult {
        match self.fregister(matrix, source, user, params).await {
            Ok(effects) => effects,
            Err(e) => {
                match &e {
                    ServiceError::Database(db_err) => {
                        warn!(nick = %source.nick, error = %db_err, "FREGISTER failed");
                    }
                    ServiceError::PolicyDenied { hook, .. } => {
                        info!(nick = %source.nick, hook = %hook, "FREGISTER denied by hook");
                    }
                    other => {
                        debug!(nick = %source.nick, error = other.error_code(), "FREGISTER rejected");
                    }
                }
                self.error_effects(&source.uid, e)
            }
        }
    }

    async fn fregister(
        &self,
        matrix: &Arc<Matrix>,
        source: &CommandSource,
        user: &User,
        params: &[&str],
    ) -> ServiceResult<ChanServResult> {
        let Some((name, account)) = self.check_fregister(source, user, params).await? else {
            return Ok(Vec::new());
        };

        let acquired = self.acquire_channel(matrix, name).await?;

        let check = RegisterCheck {
            source,
            account: &account,
            name,
            channel: &acquired.channel,
        };
        if let Approval::Denied { hook, effects } = self.hooks.call_can_register(&check).await {
            return Err(ServiceError::PolicyDenied { hook, effects });
        }

        let record = self
            .commit_registration(source, &account, name, &acquired.channel)
            .await?;

        let mut effects = vec![self.reply_effect(
            &source.uid,
            &format!(
                "\x02{}\x02 is now registered to \x02{}\x02.",
                record.name, account.name
            ),
        )];
        effects.extend(
            self.reconcile(matrix, source, &account, &record, &acquired)
                .await,
        );

        Ok(effects)
    }

    /// Preconditions, checked in order. `None` means the command is ignored.
    async fn check_fregister<'p>(
        &self,
        source: &CommandSource,
        user: &User,
        params: &[&'p str],
    ) -> ServiceResult<Option<(&'p str, AccountRecord)>> {
        // Bots may react to this in registered channels; stay out of the way
        if source.is_fantasy() {
            return Ok(None);
        }

        let Some(&name) = params.first() else {
            return Err(ServiceError::MissingParameter {
                command: "FREGISTER",
                usage: USAGE,
            });
        };

        if !name.starts_with('#') {
            return Err(ServiceError::InvalidParameter {
                command: "FREGISTER",
                syntax: SYNTAX,
            });
        }

        let Some(account_name) = user.account.as_deref() else {
            return Err(ServiceError::NotAuthenticated);
        };
        let Some(account) = self.db.accounts().find_by_name(account_name).await? else {
            return Err(ServiceError::NotAuthenticated);
        };
        if !account.verified {
            return Err(ServiceError::NotVerified);
        }

        if let Some(existing) = self.db.channels().find_by_name(name).await? {
            return Err(self.already_registered(&existing).await?);
        }

        Ok(Some((name, account)))
    }

    /// Build the collision error, hiding founders of private registrations.
    async fn already_registered(&self, existing: &ChannelRecord) -> ServiceResult<ServiceError> {
        let private = self.config.use_channel_private
            && ChannelFlags::from_bits_retain(existing.flags).contains(ChannelFlags::PRIVATE);

        let founders = if private {
            None
        } else {
            Some(self.db.channels().founder_names(existing.id).await?)
        };

        Ok(ServiceError::AlreadyExists {
            channel: existing.name.clone(),
            founders,
        })
    }

    /// Find the live channel, joining ChanServ to create it if necessary.
    async fn acquire_channel(&self, matrix: &Arc<Matrix>, name: &str) -> ServiceResult<Acquired> {
        if let Some(channel) = matrix.find_channel(name).await {
            return Ok(Acquired {
                channel,
                transient: false,
            });
        }

        if let Err(e) = matrix.join(name, &self.client_uid).await {
            debug!(channel = %name, error = %e, "ChanServ could not join");
        }

        match matrix.find_channel(name).await {
            Some(channel) => Ok(Acquired {
                channel,
                transient: true,
            }),
            None => Err(ServiceError::InternalError(name.to_string())),
        }
    }

    /// Persist the registration with its founder entry and metadata.
    async fn commit_registration(
        &self,
        source: &CommandSource,
        account: &AccountRecord,
        name: &str,
        channel: &Channel,
    ) -> ServiceResult<ChannelRecord> {
        info!(
            target: "audit",
            category = "register,admin",
            nick = %source.nick,
            account = %account.name,
            channel = %name,
            "FREGISTER"
        );

        let now = chrono::Utc::now().timestamp();

        let mut mlock_off = ModeSet::empty();
        if channel.limit.is_none() {
            mlock_off |= ModeSet::LIMIT;
        }
        if channel.key.is_none() {
            mlock_off |= ModeSet::KEY;
        }

        let mut metadata = HashMap::new();
        if channel.created > 0 {
            metadata.insert("private:channelts".to_string(), channel.created.to_string());
        }
        if !self.config.default_templates.is_empty() {
            metadata.insert(
                "private:templates".to_string(),
                self.config.default_templates.clone(),
            );
        }

        let new = NewChannel {
            name,
            registered_at: now,
            mlock_on: (ModeSet::NOEXT | ModeSet::TOPIC).to_string(),
            mlock_off: mlock_off.to_string(),
            flags: self.default_flags.bits(),
            metadata,
            founder: &account.name,
            founder_flags: AccessFlags::founder_template().to_string(),
            founder_setter: &account.name,
        };

        match self.db.channels().register(&new).await {
            Ok(record) => {
                info!(channel = %record.name, founder = %account.name, oper = %source.nick, "Channel force-registered");
                Ok(record)
            }
            // Lost a race with another registration of the same name
            Err(DbError::ChannelExists(_)) => match self.db.channels().find_by_name(name).await? {
                Some(existing) => Err(self.already_registered(&existing).await?),
                None => Err(ServiceError::AlreadyExists {
                    channel: name.to_string(),
                    founders: None,
                }),
            },
            Err(e) => Err(e.into()),
        }
    }

    /// Post-commit work. Failures here are logged, never reported.
    async fn reconcile(
        &self,
        matrix: &Arc<Matrix>,
        source: &CommandSource,
        account: &AccountRecord,
        record: &ChannelRecord,
        acquired: &Acquired,
    ) -> Vec<ServiceEffect> {
        if acquired.transient
            && self.config.leave_channels
            && let Err(e) = matrix
                .part(&acquired.channel.name, &self.client_uid, None)
                .await
        {
            debug!(channel = %record.name, error = %e, "ChanServ could not leave");
        }

        let event = ChannelRegistered {
            source,
            account,
            record,
            db: &self.db,
        };
        let mut effects = self.hooks.call_on_register(&event).await;

        // Observers may have changed the access list
        let flags = match self.db.channels().list_access(record.id).await {
            Ok(entries) => entries
                .iter()
                .filter(|entry| entry.entity.eq_ignore_ascii_case(&account.name))
                .fold(AccessFlags::empty(), |acc, entry| {
                    acc | AccessFlags::parse(&entry.flags)
                }),
            Err(e) => {
                warn!(channel = %record.name, error = %e, "Could not read access list");
                AccessFlags::empty()
            }
        };

        let Some(member) = matrix.member_modes(&record.name, &source.uid).await else {
            return effects;
        };

        let promotion = decide_promotion(&matrix.ircd, flags, &member);
        if let Some(mode_char) = promotion.mode_char(&matrix.ircd) {
            debug!(channel = %record.name, nick = %source.nick, ?promotion, "Promoting founder");
            effects.push(ServiceEffect::ChannelMode {
                channel: record.name.clone(),
                target_uid: source.uid.clone(),
                setter: self.config.nick.clone(),
                mode_char,
                adding: true,
            });
        }

        effects
    }
}
