//! slircd-services - IRC services daemon.
//!
//! Runs ChanServ and CatServ against an in-process network state and
//! exposes a local operator console on stdin: each line is
//! `<Service> <command...>`, e.g. `ChanServ FREGISTER #help`.

use slircd_services::config::{Config, validation};
use slircd_services::db::{Database, DbError};
use slircd_services::proto::Message;
use slircd_services::services::catserv::CatServ;
use slircd_services::services::chanserv::ChanServ;
use slircd_services::services::{CommandSource, HookBus, ServiceManager};
use slircd_services::state::{Matrix, User};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

/// Replies queued for the console user.
const CONSOLE_QUEUE_SIZE: usize = 256;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if std::env::var_os("SLIRCD_LOG_JSON").is_some() {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_target(true)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .init();
    }

    // Load configuration
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "config.toml".to_string());

    let config = Config::load(&config_path).map_err(|e| {
        error!(path = %config_path, error = %e, "Failed to load config");
        e
    })?;

    if let Err(errors) = validation::validate(&config) {
        for e in &errors {
            error!(error = %e, "Invalid configuration");
        }
        anyhow::bail!("{} configuration error(s) in {}", errors.len(), config_path);
    }

    info!(
        server = %config.server.name,
        network = %config.server.network,
        "Starting slircd-services"
    );

    // Initialize database
    let db = Database::new(config.database_path()).await?;

    let registered_channels = db.channels().load_all_names().await.unwrap_or_else(|e| {
        warn!(error = %e, "Failed to load registered channels from database");
        Vec::new()
    });
    info!(
        count = registered_channels.len(),
        "Loaded registered channels"
    );

    // Create the Matrix (shared state) and the service clients
    let matrix = Arc::new(Matrix::new(
        config.server.name.clone(),
        config.ircd.clone(),
    ));
    let hooks = Arc::new(HookBus::new());

    let chanserv_uid = matrix.introduce_service(&config.chanserv.nick);
    let catserv_uid = matrix.introduce_service("CatServ");
    info!(chanserv = %chanserv_uid, catserv = %catserv_uid, "Service clients introduced");

    let mut services = ServiceManager::new();
    services.register(Arc::new(ChanServ::new(
        db.clone(),
        Arc::clone(&hooks),
        config.chanserv.clone(),
        chanserv_uid,
    )));
    services.register(Arc::new(CatServ::new()));

    // Attach the console user
    let console_uid = matrix.next_uid();
    let mut console = User::new(console_uid.clone(), config.console.nick.clone());
    if let Some(account) = &config.console.account {
        ensure_account(&db, account).await?;
        console = console.with_account(account.clone());
    }
    for privilege in &config.console.privileges {
        console = console.with_privilege(privilege.clone());
    }
    matrix.add_user(console);

    let (console_tx, console_rx) = mpsc::channel::<Message>(CONSOLE_QUEUE_SIZE);
    matrix.register_sender(&console_uid, console_tx);
    tokio::spawn(print_replies(console_rx));

    info!(nick = %config.console.nick, "Console ready, reading commands from stdin");

    let source = CommandSource::direct(console_uid, config.console.nick.clone());
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else {
                    break;
                };
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                let (target, text) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
                if !services.route_service_message(&matrix, &source, target, text).await {
                    warn!(target = %target, "No such service");
                }
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Received shutdown signal");
                break;
            }
        }
    }

    info!("Shutting down");
    Ok(())
}

/// Create the console's account if it does not exist yet.
async fn ensure_account(db: &Database, name: &str) -> Result<(), DbError> {
    if db.accounts().find_by_name(name).await?.is_some() {
        return Ok(());
    }
    match db.accounts().create(name, true).await {
        Ok(_) => {
            info!(account = %name, "Created console account");
            Ok(())
        }
        Err(DbError::AccountExists(_)) => Ok(()),
        Err(e) => Err(e),
    }
}

/// Print everything the network sends the console user.
async fn print_replies(mut rx: mpsc::Receiver<Message>) {
    while let Some(msg) = rx.recv().await {
        println!("{}", msg);
    }
}
