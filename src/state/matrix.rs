//! The Matrix - shared live network state.
//!
//! The Matrix holds all users and channels in concurrent data structures
//! accessible from any async task. Services consume it as a capability:
//! look a channel up, join or part a client, change member status.

use super::{Channel, MemberModes, User};
use crate::config::IrcdConfig;
use crate::error::ChannelError;
use crate::proto::{Command, Message, Prefix, irc_to_lower, is_channel_name};
use dashmap::DashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::{RwLock, mpsc};
use tracing::debug;

/// Unique user identifier (TS6 format: 9 characters).
pub type Uid = String;

/// The Matrix - central shared state container.
pub struct Matrix {
    /// All known clients, indexed by UID.
    pub users: DashMap<Uid, Arc<RwLock<User>>>,

    /// All live channels, indexed by lowercase name.
    pub channels: DashMap<String, Arc<RwLock<Channel>>>,

    /// UID to message sender mapping for routing.
    pub senders: DashMap<Uid, mpsc::Sender<Message>>,

    /// Services server name, used as prefix for server-originated lines.
    pub server_name: String,

    /// Status tiers of the linked daemon.
    pub ircd: IrcdConfig,

    uid_counter: AtomicU64,
}

impl Matrix {
    /// Create an empty Matrix.
    pub fn new(server_name: impl Into<String>, ircd: IrcdConfig) -> Self {
        Self {
            users: DashMap::new(),
            channels: DashMap::new(),
            senders: DashMap::new(),
            server_name: server_name.into(),
            ircd,
            uid_counter: AtomicU64::new(0),
        }
    }

    /// Allocate the next UID.
    pub fn next_uid(&self) -> Uid {
        let n = self.uid_counter.fetch_add(1, Ordering::Relaxed);
        format!("0SV{:06X}", n & 0xFF_FFFF)
    }

    /// Add a user.
    pub fn add_user(&self, user: User) {
        self.users
            .insert(user.uid.clone(), Arc::new(RwLock::new(user)));
    }

    /// Introduce a service pseudo-client and return its UID.
    pub fn introduce_service(&self, nick: &str) -> Uid {
        let uid = self.next_uid();
        let mut user = User::new(uid.clone(), nick);
        user.user = nick.to_string();
        user.host = "services.".to_string();
        user.service = true;
        self.add_user(user);
        uid
    }

    /// Register a user's message sender for routing.
    pub fn register_sender(&self, uid: &str, sender: mpsc::Sender<Message>) {
        self.senders.insert(uid.to_string(), sender);
    }

    /// Copy of a user's current state.
    pub async fn user_snapshot(&self, uid: &str) -> Option<User> {
        let user_arc = self.users.get(uid).map(|u| u.value().clone())?;
        let user = user_arc.read().await;
        Some(user.clone())
    }

    /// Copy of a live channel's current state, looked up by name.
    pub async fn find_channel(&self, name: &str) -> Option<Channel> {
        let channel_arc = self
            .channels
            .get(&irc_to_lower(name))
            .map(|c| c.value().clone())?;
        let channel = channel_arc.read().await;
        Some(channel.clone())
    }

    /// Status modes of `uid` in `channel`, if they are a member.
    pub async fn member_modes(&self, channel: &str, uid: &str) -> Option<MemberModes> {
        let channel_arc = self
            .channels
            .get(&irc_to_lower(channel))
            .map(|c| c.value().clone())?;
        let channel = channel_arc.read().await;
        channel.member_modes(uid).cloned()
    }

    /// Join `uid` to a channel, creating it if needed.
    ///
    /// The creator of a new channel is opped. The JOIN is broadcast to all
    /// members, including the joining client.
    pub async fn join(&self, channel_name: &str, uid: &str) -> Result<(), ChannelError> {
        if !is_channel_name(channel_name) {
            return Err(ChannelError::InvalidName(channel_name.to_string()));
        }

        let user_arc = self
            .users
            .get(uid)
            .map(|u| u.value().clone())
            .ok_or_else(|| ChannelError::NoSuchUser(uid.to_string()))?;

        let channel_lower = irc_to_lower(channel_name);
        let channel_arc = self
            .channels
            .entry(channel_lower.clone())
            .or_insert_with(|| {
                let now = chrono::Utc::now().timestamp();
                Arc::new(RwLock::new(Channel::new(channel_name.to_string(), now)))
            })
            .value()
            .clone();

        let prefix = {
            let mut user = user_arc.write().await;
            user.channels.insert(channel_lower.clone());
            Prefix::new(&user.nick, &user.user, &user.host)
        };

        {
            let mut channel = channel_arc.write().await;
            if channel.is_member(uid) {
                return Ok(());
            }
            let modes = MemberModes {
                op: channel.members.is_empty(),
                ..Default::default()
            };
            channel.add_member(uid.to_string(), modes);
        }

        debug!(channel = %channel_name, uid = %uid, "Joined channel");

        let msg = Message {
            prefix: Some(prefix),
            command: Command::JOIN(channel_name.to_string()),
        };
        self.broadcast_to_channel(&channel_lower, msg, None).await;
        Ok(())
    }

    /// Part `uid` from a channel. The channel is destroyed once empty.
    pub async fn part(
        &self,
        channel_name: &str,
        uid: &str,
        reason: Option<&str>,
    ) -> Result<(), ChannelError> {
        let channel_lower = irc_to_lower(channel_name);
        let channel_arc = self
            .channels
            .get(&channel_lower)
            .map(|c| c.value().clone())
            .ok_or_else(|| ChannelError::NoSuchChannel(channel_name.to_string()))?;

        let user_arc = self
            .users
            .get(uid)
            .map(|u| u.value().clone())
            .ok_or_else(|| ChannelError::NoSuchUser(uid.to_string()))?;

        let (prefix, nick) = {
            let user = user_arc.read().await;
            (Prefix::new(&user.nick, &user.user, &user.host), user.nick.clone())
        };

        if !channel_arc.read().await.is_member(uid) {
            return Err(ChannelError::UserNotInChannel(nick));
        }

        // The parting client sees its own PART
        let msg = Message {
            prefix: Some(prefix),
            command: Command::PART(channel_name.to_string(), reason.map(String::from)),
        };
        self.broadcast_to_channel(&channel_lower, msg, None).await;

        let now_empty = {
            let mut channel = channel_arc.write().await;
            channel.remove_member(uid);
            channel.members.is_empty()
        };
        user_arc.write().await.channels.remove(&channel_lower);

        if now_empty {
            self.channels
                .remove_if(&channel_lower, |_, c| Arc::ptr_eq(c, &channel_arc));
            debug!(channel = %channel_name, "Destroyed empty channel");
        }

        Ok(())
    }

    /// Add or remove a status mode (`q`, `a`, `o`, `h`, `v`) on a member and
    /// broadcast the MODE line from `setter`.
    ///
    /// Owner and protect letters come from the daemon configuration.
    pub async fn set_member_status(
        &self,
        channel_name: &str,
        setter: &str,
        target_uid: &str,
        mode_char: char,
        adding: bool,
    ) -> Result<(), ChannelError> {
        let channel_lower = irc_to_lower(channel_name);
        let channel_arc = self
            .channels
            .get(&channel_lower)
            .map(|c| c.value().clone())
            .ok_or_else(|| ChannelError::NoSuchChannel(channel_name.to_string()))?;

        let target_nick = self
            .user_snapshot(target_uid)
            .await
            .map(|u| u.nick)
            .ok_or_else(|| ChannelError::NoSuchUser(target_uid.to_string()))?;

        {
            let mut channel = channel_arc.write().await;
            let modes = channel
                .members
                .get_mut(target_uid)
                .ok_or_else(|| ChannelError::UserNotInChannel(target_nick.clone()))?;

            let slot = match mode_char {
                c if self.ircd.uses_owner && c == self.ircd.owner_mode => &mut modes.owner,
                c if self.ircd.uses_protect && c == self.ircd.protect_mode => &mut modes.admin,
                'o' => &mut modes.op,
                'h' => &mut modes.halfop,
                'v' => &mut modes.voice,
                _ => return Ok(()),
            };
            *slot = adding;
        }

        let sign = if adding { '+' } else { '-' };
        let msg = Message {
            prefix: Some(Prefix::ServerName(setter.to_string())),
            command: Command::ChannelMODE(
                channel_name.to_string(),
                format!("{}{}", sign, mode_char),
                vec![target_nick],
            ),
        };
        self.broadcast_to_channel(&channel_lower, msg, None).await;
        Ok(())
    }

    /// Send a message to a specific user by UID.
    pub async fn send_to_user(&self, uid: &str, msg: Message) -> bool {
        let sender = self.senders.get(uid).map(|s| s.clone());
        if let Some(sender) = sender {
            sender.send(msg).await.is_ok()
        } else {
            false
        }
    }

    /// Broadcast a message to all members of a channel.
    /// Optionally exclude one UID (usually the sender).
    /// Note: `channel_name` should already be lowercased by the caller.
    pub async fn broadcast_to_channel(
        &self,
        channel_name: &str,
        msg: Message,
        exclude: Option<&str>,
    ) {
        let Some(channel_arc) = self.channels.get(channel_name).map(|c| c.value().clone()) else {
            return;
        };
        let members: Vec<Uid> = channel_arc.read().await.members.keys().cloned().collect();
        for uid in members {
            if exclude.is_some_and(|e| e == uid.as_str()) {
                continue;
            }
            self.send_to_user(&uid, msg.clone()).await;
        }
    }
}
