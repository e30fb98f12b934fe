//! Test network.
//!
//! Builds a Matrix, an in-memory database and a ServiceManager with
//! ChanServ and CatServ loaded, the way the binary wires them up.

use super::TestClient;
use slircd_services::config::{ChanServConfig, IrcdConfig};
use slircd_services::db::Database;
use slircd_services::services::base::PRIV_CHAN_ADMIN;
use slircd_services::services::catserv::CatServ;
use slircd_services::services::chanserv::ChanServ;
use slircd_services::services::{CommandSource, HookBus, ServiceManager};
use slircd_services::state::{Matrix, User};
use std::sync::Arc;
use tokio::sync::mpsc;

const CLIENT_QUEUE_SIZE: usize = 128;

/// An in-process services network.
#[allow(dead_code)]
pub struct TestNetwork {
    pub matrix: Arc<Matrix>,
    pub db: Database,
    pub hooks: Arc<HookBus>,
    pub services: ServiceManager,
    /// What the ChanServ client itself sees (its JOINs and PARTs).
    pub chanserv: TestClient,
}

#[allow(dead_code)]
impl TestNetwork {
    /// Spawn a network with default settings.
    pub async fn spawn() -> anyhow::Result<Self> {
        Self::with_config(ChanServConfig::default(), IrcdConfig::default()).await
    }

    /// Spawn a network with the given ChanServ and daemon settings.
    pub async fn with_config(
        chanserv_config: ChanServConfig,
        ircd: IrcdConfig,
    ) -> anyhow::Result<Self> {
        let db = Database::new(":memory:").await?;
        let matrix = Arc::new(Matrix::new("services.test", ircd));
        let hooks = Arc::new(HookBus::new());

        let chanserv_uid = matrix.introduce_service(&chanserv_config.nick);
        let (tx, rx) = mpsc::channel(CLIENT_QUEUE_SIZE);
        matrix.register_sender(&chanserv_uid, tx);
        let chanserv = TestClient::new(chanserv_uid.clone(), chanserv_config.nick.clone(), rx);

        let mut services = ServiceManager::new();
        services.register(Arc::new(ChanServ::new(
            db.clone(),
            Arc::clone(&hooks),
            chanserv_config,
            chanserv_uid,
        )));
        services.register(Arc::new(CatServ::new()));

        Ok(Self {
            matrix,
            db,
            hooks,
            services,
            chanserv,
        })
    }

    /// Connect a user to the network.
    pub fn connect_user(&self, user: User) -> TestClient {
        let (tx, rx) = mpsc::channel(CLIENT_QUEUE_SIZE);
        let uid = user.uid.clone();
        let nick = user.nick.clone();
        self.matrix.register_sender(&uid, tx);
        self.matrix.add_user(user);
        TestClient::new(uid, nick, rx)
    }

    /// Connect an unidentified user with no privileges.
    pub fn connect(&self, nick: &str) -> TestClient {
        let uid = self.matrix.next_uid();
        self.connect_user(User::new(uid, nick))
    }

    /// Connect a user identified to `account`, creating the account.
    pub async fn connect_identified(
        &self,
        nick: &str,
        account: &str,
        verified: bool,
    ) -> anyhow::Result<TestClient> {
        self.db.accounts().create(account, verified).await?;
        let uid = self.matrix.next_uid();
        Ok(self.connect_user(User::new(uid, nick).with_account(account)))
    }

    /// Connect a services administrator identified to a verified `account`.
    pub async fn connect_oper(&self, nick: &str, account: &str) -> anyhow::Result<TestClient> {
        self.db.accounts().create(account, true).await?;
        let uid = self.matrix.next_uid();
        Ok(self.connect_user(
            User::new(uid, nick)
                .with_account(account)
                .with_privilege(PRIV_CHAN_ADMIN),
        ))
    }

    /// Send `text` to the service `target` as `client`.
    pub async fn msg(&self, client: &TestClient, target: &str, text: &str) -> bool {
        self.msg_from(&client.source(), target, text).await
    }

    /// Send `text` to the service `target` from an explicit source.
    pub async fn msg_from(&self, source: &CommandSource, target: &str, text: &str) -> bool {
        self.services
            .route_service_message(&self.matrix, source, target, text)
            .await
    }

    /// Join `client` to a channel.
    pub async fn join(&self, client: &TestClient, channel: &str) -> anyhow::Result<()> {
        self.matrix.join(channel, &client.uid).await?;
        Ok(())
    }

    /// Set key and limit on a live channel.
    pub async fn set_key_and_limit(
        &self,
        channel: &str,
        key: Option<&str>,
        limit: Option<u32>,
    ) -> anyhow::Result<()> {
        let channel_arc = self
            .matrix
            .channels
            .get(&slircd_services::proto::irc_to_lower(channel))
            .map(|c| c.value().clone())
            .ok_or_else(|| anyhow::anyhow!("no such channel {}", channel))?;
        let mut channel = channel_arc.write().await;
        channel.key = key.map(String::from);
        channel.limit = limit;
        Ok(())
    }

    /// Overwrite the creation timestamp of a live channel.
    pub async fn set_created(&self, channel: &str, created: i64) -> anyhow::Result<()> {
        let channel_arc = self
            .matrix
            .channels
            .get(&slircd_services::proto::irc_to_lower(channel))
            .map(|c| c.value().clone())
            .ok_or_else(|| anyhow::anyhow!("no such channel {}", channel))?;
        channel_arc.write().await.created = created;
        Ok(())
    }
}
