//! Integration tests for ChanServ FREGISTER.

mod common;

use async_trait::async_trait;
use common::TestNetwork;
use slircd_services::config::{ChanServConfig, IrcdConfig};
use slircd_services::proto::{Command, Message, Prefix};
use slircd_services::services::chanserv::{AccessFlags, ChannelFlags};
use slircd_services::services::{
    Approval, ChannelRegisterCheck, ChannelRegisterObserver, ChannelRegistered, RegisterCheck,
    ServiceEffect,
};
use slircd_services::state::User;
use std::sync::Arc;

fn notice(uid: &str, text: &str) -> ServiceEffect {
    ServiceEffect::Reply {
        target_uid: uid.to_string(),
        msg: Message {
            prefix: Some(Prefix::ServerName("ChanServ".to_string())),
            command: Command::NOTICE("*".to_string(), text.to_string()),
        },
    }
}

struct Forbid;

#[async_trait]
impl ChannelRegisterCheck for Forbid {
    fn name(&self) -> &'static str {
        "forbid"
    }

    async fn can_register(&self, check: &RegisterCheck<'_>) -> Approval {
        Approval::Denied {
            hook: "forbid",
            effects: vec![notice(
                &check.source.uid,
                &format!("\x02{}\x02 may not be registered.", check.name),
            )],
        }
    }
}

/// Grants a helper entry and rewrites the founder's own flags.
struct Rewrite {
    founder_flags: &'static str,
}

#[async_trait]
impl ChannelRegisterObserver for Rewrite {
    fn name(&self) -> &'static str {
        "rewrite"
    }

    async fn on_register(&self, event: &ChannelRegistered<'_>) -> Vec<ServiceEffect> {
        let channels = event.db.channels();
        let _ = channels
            .set_access(event.record.id, "helper", "+v", &event.account.name)
            .await;
        let _ = channels
            .set_access(
                event.record.id,
                &event.account.name,
                self.founder_flags,
                &event.account.name,
            )
            .await;
        vec![notice(&event.source.uid, "Access list adjusted.")]
    }
}

#[tokio::test]
async fn test_fregister_absent_channel() -> anyhow::Result<()> {
    let mut net = TestNetwork::spawn().await?;
    let mut admin = net.connect_oper("Admin", "admin").await?;

    assert!(net.msg(&admin, "ChanServ", "FREGISTER #test").await);

    assert_eq!(
        admin.notices(),
        vec!["\x02#test\x02 is now registered to \x02admin\x02.".to_string()]
    );

    // Joined to create the channel, left again after the commit
    let cs_lines = net.chanserv.lines();
    assert_eq!(
        cs_lines,
        vec![
            ":ChanServ!ChanServ@services. JOIN #test".to_string(),
            ":ChanServ!ChanServ@services. PART #test".to_string(),
        ]
    );
    assert!(net.matrix.find_channel("#test").await.is_none());

    let record = net
        .db
        .channels()
        .find_by_name("#test")
        .await?
        .expect("registration exists");
    assert_eq!(record.mlock_on, "nt");
    assert_eq!(record.mlock_off, "kl");
    assert_eq!(
        ChannelFlags::from_bits_retain(record.flags),
        ChannelFlags::GUARD | ChannelFlags::VERBOSE
    );
    let channelts: i64 = record
        .metadata
        .get("private:channelts")
        .expect("channel TS recorded")
        .parse()?;
    assert!(channelts > 0);
    assert!(!record.metadata.contains_key("private:templates"));

    let access = net.db.channels().list_access(record.id).await?;
    assert_eq!(access.len(), 1);
    assert_eq!(access[0].entity, "admin");
    assert_eq!(access[0].setter, "admin");
    assert_eq!(
        AccessFlags::parse(&access[0].flags),
        AccessFlags::founder_template()
    );
    Ok(())
}

#[tokio::test]
async fn test_fregister_existing_channel_with_key_and_limit() -> anyhow::Result<()> {
    let mut net = TestNetwork::spawn().await?;
    let mut admin = net.connect_oper("Admin", "admin").await?;
    let bob = net.connect("bob");

    net.join(&bob, "#test").await?;
    net.set_key_and_limit("#test", Some("sekrit"), Some(5)).await?;
    let created = net
        .matrix
        .find_channel("#test")
        .await
        .expect("channel is live")
        .created;

    net.msg(&admin, "ChanServ", "FREGISTER #test").await;

    assert_eq!(
        admin.notices(),
        vec!["\x02#test\x02 is now registered to \x02admin\x02.".to_string()]
    );
    // No join was needed
    assert!(net.chanserv.drain().is_empty());

    let record = net
        .db
        .channels()
        .find_by_name("#test")
        .await?
        .expect("registration exists");
    assert_eq!(record.mlock_on, "nt");
    assert_eq!(record.mlock_off, "");
    assert_eq!(
        record.metadata.get("private:channelts"),
        Some(&created.to_string())
    );

    let channel = net.matrix.find_channel("#test").await.expect("still live");
    assert!(channel.is_member(&bob.uid));
    Ok(())
}

#[tokio::test]
async fn test_fregister_limit_only() -> anyhow::Result<()> {
    let net = TestNetwork::spawn().await?;
    let admin = net.connect_oper("Admin", "admin").await?;
    let bob = net.connect("bob");

    net.join(&bob, "#limited").await?;
    net.set_key_and_limit("#limited", None, Some(10)).await?;
    net.msg(&admin, "ChanServ", "FREGISTER #limited").await;

    let record = net
        .db
        .channels()
        .find_by_name("#limited")
        .await?
        .expect("registration exists");
    assert_eq!(record.mlock_off, "k");
    Ok(())
}

#[tokio::test]
async fn test_channel_without_timestamp_records_no_channelts() -> anyhow::Result<()> {
    let net = TestNetwork::spawn().await?;
    let mut admin = net.connect_oper("Admin", "admin").await?;
    let bob = net.connect("bob");

    for (channel, created) in [("#zero", 0), ("#negative", -1)] {
        net.join(&bob, channel).await?;
        net.set_created(channel, created).await?;

        net.msg(&admin, "ChanServ", &format!("FREGISTER {}", channel))
            .await;
        assert_eq!(
            admin.notices(),
            vec![format!(
                "\x02{}\x02 is now registered to \x02admin\x02.",
                channel
            )]
        );

        let record = net
            .db
            .channels()
            .find_by_name(channel)
            .await?
            .expect("registration exists");
        assert!(!record.metadata.contains_key("private:channelts"));
    }
    Ok(())
}

#[tokio::test]
async fn test_policy_denial_is_silent_and_keeps_presence() -> anyhow::Result<()> {
    let mut net = TestNetwork::spawn().await?;
    let mut admin = net.connect_oper("Admin", "admin").await?;
    net.hooks.add_register_check(Arc::new(Forbid));

    net.msg(&admin, "ChanServ", "FREGISTER #test").await;

    // Only the hook speaks
    assert_eq!(
        admin.notices(),
        vec!["\x02#test\x02 may not be registered.".to_string()]
    );
    assert!(net.db.channels().find_by_name("#test").await?.is_none());

    // Joined, never parted
    assert_eq!(
        net.chanserv.lines(),
        vec![":ChanServ!ChanServ@services. JOIN #test".to_string()]
    );
    let channel = net.matrix.find_channel("#test").await.expect("still live");
    assert!(channel.is_member(&net.chanserv.uid));
    Ok(())
}

#[tokio::test]
async fn test_removed_check_no_longer_denies() -> anyhow::Result<()> {
    let net = TestNetwork::spawn().await?;
    let mut admin = net.connect_oper("Admin", "admin").await?;
    let id = net.hooks.add_register_check(Arc::new(Forbid));
    assert!(net.hooks.remove(id));

    net.msg(&admin, "ChanServ", "FREGISTER #test").await;

    assert_eq!(
        admin.notices(),
        vec!["\x02#test\x02 is now registered to \x02admin\x02.".to_string()]
    );
    Ok(())
}

#[tokio::test]
async fn test_invalid_name_creates_nothing() -> anyhow::Result<()> {
    let net = TestNetwork::spawn().await?;
    let mut admin = net.connect_oper("Admin", "admin").await?;

    for name in ["test", "&test", "+test"] {
        net.msg(&admin, "ChanServ", &format!("FREGISTER {}", name))
            .await;
        assert_eq!(
            admin.notices(),
            vec![
                "Invalid parameters for \x02FREGISTER\x02.".to_string(),
                "Syntax: FREGISTER <#channel>".to_string(),
            ]
        );
        assert!(net.db.channels().find_by_name(name).await?.is_none());
    }
    assert!(net.matrix.channels.is_empty());
    Ok(())
}

#[tokio::test]
async fn test_missing_name() -> anyhow::Result<()> {
    let net = TestNetwork::spawn().await?;
    let mut admin = net.connect_oper("Admin", "admin").await?;

    net.msg(&admin, "ChanServ", "FREGISTER").await;

    assert_eq!(
        admin.notices(),
        vec![
            "Insufficient parameters for \x02FREGISTER\x02.".to_string(),
            "To forcibly register a channel: FREGISTER <#channel>".to_string(),
        ]
    );
    Ok(())
}

#[tokio::test]
async fn test_not_authenticated_for_any_channel_name() -> anyhow::Result<()> {
    let net = TestNetwork::spawn().await?;
    let mut admin = net.connect_oper("Admin", "admin").await?;
    net.msg(&admin, "ChanServ", "FREGISTER #taken").await;
    admin.notices();

    let uid = net.matrix.next_uid();
    let mut anon = net.connect_user(
        User::new(uid, "anon").with_privilege(slircd_services::services::base::PRIV_CHAN_ADMIN),
    );

    for name in ["#taken", "#fresh", "#a,b"] {
        net.msg(&anon, "ChanServ", &format!("FREGISTER {}", name))
            .await;
        assert_eq!(anon.notices(), vec!["You are not logged in.".to_string()]);
    }
    assert!(net.db.channels().find_by_name("#fresh").await?.is_none());
    Ok(())
}

#[tokio::test]
async fn test_unverified_account() -> anyhow::Result<()> {
    let net = TestNetwork::spawn().await?;
    net.db.accounts().create("pending", false).await?;
    let uid = net.matrix.next_uid();
    let mut user = net.connect_user(
        User::new(uid, "pending")
            .with_account("pending")
            .with_privilege(slircd_services::services::base::PRIV_CHAN_ADMIN),
    );

    net.msg(&user, "ChanServ", "FREGISTER #test").await;

    assert_eq!(
        user.notices(),
        vec![
            "You must verify your e-mail address before you may perform this operation."
                .to_string()
        ]
    );
    assert!(net.db.channels().find_by_name("#test").await?.is_none());

    net.db.accounts().set_verified("pending", true).await?;
    net.msg(&user, "ChanServ", "FREGISTER #test").await;
    assert!(net.db.channels().find_by_name("#test").await?.is_some());
    Ok(())
}

#[tokio::test]
async fn test_already_registered_is_left_unchanged() -> anyhow::Result<()> {
    let net = TestNetwork::spawn().await?;
    let mut admin = net.connect_oper("Admin", "admin").await?;
    let mut other = net.connect_oper("Other", "other").await?;

    net.msg(&admin, "ChanServ", "FREGISTER #test").await;
    admin.notices();
    let before = net
        .db
        .channels()
        .find_by_name("#test")
        .await?
        .expect("registered");
    let access_before = net.db.channels().list_access(before.id).await?;

    net.msg(&other, "ChanServ", "FREGISTER #TEST").await;

    assert_eq!(
        other.notices(),
        vec!["\x02#test\x02 is already registered to \x02admin\x02.".to_string()]
    );
    let after = net
        .db
        .channels()
        .find_by_name("#test")
        .await?
        .expect("registered");
    assert_eq!(before, after);
    assert_eq!(access_before, net.db.channels().list_access(after.id).await?);
    Ok(())
}

#[tokio::test]
async fn test_private_registration_hides_founder() -> anyhow::Result<()> {
    let config = ChanServConfig {
        use_channel_private: true,
        default_flags: vec!["private".to_string()],
        ..ChanServConfig::default()
    };
    let net = TestNetwork::with_config(config, IrcdConfig::default()).await?;
    let admin = net.connect_oper("Admin", "admin").await?;
    let mut other = net.connect_oper("Other", "other").await?;

    net.msg(&admin, "ChanServ", "FREGISTER #hidden").await;
    net.msg(&other, "ChanServ", "FREGISTER #hidden").await;

    assert_eq!(
        other.notices(),
        vec!["\x02#hidden\x02 is already registered.".to_string()]
    );
    Ok(())
}

#[tokio::test]
async fn test_private_flag_ignored_without_privacy_option() -> anyhow::Result<()> {
    let config = ChanServConfig {
        default_flags: vec!["private".to_string()],
        ..ChanServConfig::default()
    };
    let net = TestNetwork::with_config(config, IrcdConfig::default()).await?;
    let admin = net.connect_oper("Admin", "admin").await?;
    let mut other = net.connect_oper("Other", "other").await?;

    net.msg(&admin, "ChanServ", "FREGISTER #hidden").await;
    net.msg(&other, "ChanServ", "FREGISTER #hidden").await;

    assert_eq!(
        other.notices(),
        vec!["\x02#hidden\x02 is already registered to \x02admin\x02.".to_string()]
    );
    Ok(())
}

#[tokio::test]
async fn test_present_founder_becomes_owner() -> anyhow::Result<()> {
    let net = TestNetwork::spawn().await?;
    let mut admin = net.connect_oper("Admin", "admin").await?;
    net.join(&admin, "#mine").await?;
    admin.drain();

    net.msg(&admin, "ChanServ", "FREGISTER #mine").await;

    assert_eq!(
        admin.lines(),
        vec![
            ":ChanServ NOTICE Admin :\x02#mine\x02 is now registered to \x02admin\x02."
                .to_string(),
            ":ChanServ MODE #mine +q Admin".to_string(),
        ]
    );
    let modes = net
        .matrix
        .member_modes("#mine", &admin.uid)
        .await
        .expect("still a member");
    assert!(modes.owner);
    assert!(!modes.admin);
    Ok(())
}

#[tokio::test]
async fn test_present_founder_becomes_protect_without_owner_tier() -> anyhow::Result<()> {
    let ircd = IrcdConfig {
        uses_owner: false,
        ..IrcdConfig::default()
    };
    let net = TestNetwork::with_config(ChanServConfig::default(), ircd).await?;
    let mut admin = net.connect_oper("Admin", "admin").await?;
    net.join(&admin, "#mine").await?;
    admin.drain();

    net.msg(&admin, "ChanServ", "FREGISTER #mine").await;

    let lines = admin.lines();
    assert_eq!(lines.last(), Some(&":ChanServ MODE #mine +a Admin".to_string()));
    let modes = net
        .matrix
        .member_modes("#mine", &admin.uid)
        .await
        .expect("still a member");
    assert!(modes.admin);
    assert!(!modes.owner);
    Ok(())
}

#[tokio::test]
async fn test_observer_runs_and_can_override_promotion() -> anyhow::Result<()> {
    let net = TestNetwork::spawn().await?;
    net.hooks.add_register_observer(Arc::new(Rewrite {
        founder_flags: "+AFRfiorst",
    }));
    let mut admin = net.connect_oper("Admin", "admin").await?;
    net.join(&admin, "#mine").await?;
    admin.drain();

    net.msg(&admin, "ChanServ", "FREGISTER #mine").await;

    // No auto-op left on the founder entry, so no MODE line
    assert_eq!(
        admin.lines(),
        vec![
            ":ChanServ NOTICE Admin :\x02#mine\x02 is now registered to \x02admin\x02."
                .to_string(),
            ":ChanServ NOTICE Admin :Access list adjusted.".to_string(),
        ]
    );

    let record = net
        .db
        .channels()
        .find_by_name("#mine")
        .await?
        .expect("registered");
    let access = net.db.channels().list_access(record.id).await?;
    assert_eq!(access.len(), 2);
    assert!(access.iter().any(|entry| entry.entity == "helper"));
    Ok(())
}

#[tokio::test]
async fn test_requires_chan_admin_privilege() -> anyhow::Result<()> {
    let net = TestNetwork::spawn().await?;
    let mut user = net.connect_identified("alice", "alice", true).await?;

    net.msg(&user, "ChanServ", "FREGISTER #test").await;

    assert_eq!(
        user.notices(),
        vec!["You do not have the \x02chan:admin\x02 privilege.".to_string()]
    );
    assert!(net.matrix.channels.is_empty());
    assert!(net.db.channels().find_by_name("#test").await?.is_none());
    Ok(())
}

#[tokio::test]
async fn test_fantasy_command_is_ignored() -> anyhow::Result<()> {
    let mut net = TestNetwork::spawn().await?;
    let mut admin = net.connect_oper("Admin", "admin").await?;

    let source = admin.fantasy_source("#lobby");
    assert!(net.msg_from(&source, "ChanServ", "FREGISTER #test").await);

    assert!(admin.drain().is_empty());
    assert!(net.chanserv.drain().is_empty());
    assert!(net.db.channels().find_by_name("#test").await?.is_none());
    Ok(())
}

#[tokio::test]
async fn test_leave_channels_disabled_keeps_presence() -> anyhow::Result<()> {
    let config = ChanServConfig {
        leave_channels: false,
        ..ChanServConfig::default()
    };
    let mut net = TestNetwork::with_config(config, IrcdConfig::default()).await?;
    let admin = net.connect_oper("Admin", "admin").await?;

    net.msg(&admin, "ChanServ", "FREGISTER #stay").await;

    assert_eq!(
        net.chanserv.lines(),
        vec![":ChanServ!ChanServ@services. JOIN #stay".to_string()]
    );
    assert!(net.db.channels().find_by_name("#stay").await?.is_some());
    assert!(net.matrix.find_channel("#stay").await.is_some());
    Ok(())
}

#[tokio::test]
async fn test_default_templates_are_stored() -> anyhow::Result<()> {
    let config = ChanServConfig {
        default_templates: "HOP=+hH OP=+oO".to_string(),
        ..ChanServConfig::default()
    };
    let net = TestNetwork::with_config(config, IrcdConfig::default()).await?;
    let admin = net.connect_oper("Admin", "admin").await?;

    net.msg(&admin, "ChanServ", "FREGISTER #templated").await;

    let record = net
        .db
        .channels()
        .find_by_name("#templated")
        .await?
        .expect("registered");
    assert_eq!(
        record.metadata.get("private:templates").map(String::as_str),
        Some("HOP=+hH OP=+oO")
    );
    Ok(())
}

#[tokio::test]
async fn test_chanserv_alias_and_help() -> anyhow::Result<()> {
    let net = TestNetwork::spawn().await?;
    let mut admin = net.connect_oper("Admin", "admin").await?;
    let mut alice = net.connect("alice");

    assert!(net.msg(&admin, "cs", "HELP").await);
    let lines = admin.notices();
    assert!(lines.iter().any(|l| l.contains("FREGISTER") && l.contains("Forcibly registers a channel.")));

    assert!(net.msg(&alice, "chanserv", "HELP").await);
    let lines = alice.notices();
    assert!(!lines.iter().any(|l| l.contains("FREGISTER")));

    net.msg(&admin, "CS", "HELP FREGISTER").await;
    let lines = admin.notices();
    assert!(lines.contains(&"Syntax: FREGISTER <#channel>".to_string()));
    Ok(())
}

#[tokio::test]
async fn test_extra_params_are_ignored() -> anyhow::Result<()> {
    let net = TestNetwork::spawn().await?;
    let mut admin = net.connect_oper("Admin", "admin").await?;

    net.msg(&admin, "ChanServ", "FREGISTER #test some trailing words")
        .await;

    assert_eq!(
        admin.notices(),
        vec!["\x02#test\x02 is now registered to \x02admin\x02.".to_string()]
    );
    Ok(())
}
