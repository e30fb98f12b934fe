use crate::proto::{Command, Message};
use crate::state::Matrix;
use std::sync::Arc;
use tracing::debug;

/// Unified effect type returned by all service commands.
///
/// Services produce effects; callers apply them to Matrix state.
#[derive(Debug, Clone)]
pub enum ServiceEffect {
    /// Send a message to a specific user (e.g., NOTICE reply).
    Reply {
        /// Target UID to route the reply to.
        target_uid: String,
        msg: Message,
    },

    /// Apply a member status change (owner/protect/op/halfop/voice).
    ChannelMode {
        channel: String,
        target_uid: String,
        /// Nick the MODE line originates from.
        setter: String,
        mode_char: char,
        adding: bool,
    },
}

/// Apply a list of service effects sequentially.
pub async fn apply_effects(matrix: &Arc<Matrix>, effects: Vec<ServiceEffect>) {
    for effect in effects {
        apply_effect(matrix, effect).await;
    }
}

/// Apply a single service effect to Matrix state.
pub async fn apply_effect(matrix: &Arc<Matrix>, effect: ServiceEffect) {
    match effect {
        ServiceEffect::Reply {
            target_uid,
            mut msg,
        } => {
            let Some(target_nick) = matrix.user_snapshot(&target_uid).await.map(|u| u.nick) else {
                // Disconnected before the reply was ready
                return;
            };

            if let Command::NOTICE(_, text) = msg.command {
                msg.command = Command::NOTICE(target_nick, text);
            }
            if !matrix.send_to_user(&target_uid, msg).await {
                debug!(uid = %target_uid, "Dropped service reply, no sender");
            }
        }

        ServiceEffect::ChannelMode {
            channel,
            target_uid,
            setter,
            mode_char,
            adding,
        } => {
            // Best-effort: the member may have left in the meantime
            if let Err(e) = matrix
                .set_member_status(&channel, &setter, &target_uid, mode_char, adding)
                .await
            {
                debug!(channel = %channel, uid = %target_uid, error = %e, "Status change not applied");
            }
        }
    }
}
