use std::sync::Arc;

use chime_core::clock::{Clock, ReferenceZone, SystemClock};
use chime_core::config::ChimeConfig;
use chime_notify::{Notifier, TwilioNotifier};
use chime_store::{ReminderStore, UserStore};
use tokio::sync::watch;
use tracing::info;

mod driver;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "chime=info".into()),
        )
        .init();

    // load config: explicit path > CHIME_CONFIG env > ~/.chime/chime.toml
    let config_path = std::env::var("CHIME_CONFIG").ok();
    let config = ChimeConfig::load(config_path.as_deref()).unwrap_or_else(|e| {
        tracing::warn!("Config load failed ({}), using defaults", e);
        ChimeConfig::default()
    });

    // The reference zone must resolve before the loop can run; a bad offset
    // is fatal here, never mid-cycle.
    let zone = ReferenceZone::parse(&config.timezone.offset)
        .map_err(|e| anyhow::anyhow!("cannot start: {e}"))?;

    let db_path = &config.database.path;
    ensure_parent_dir(db_path);
    info!(path = %db_path, "opening SQLite database");

    let db = rusqlite::Connection::open(db_path)?;
    db.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")?;
    chime_store::db::init_db(&db)?;
    drop(db);

    // Each handle gets its own connection so the notifier's user lookups
    // never contend with the driver's reminder queries.
    let reminders = ReminderStore::new(rusqlite::Connection::open(db_path)?)?;
    let users = UserStore::new(rusqlite::Connection::open(db_path)?)?;

    let notifier: Arc<dyn Notifier> = Arc::new(TwilioNotifier::new(&config.twilio, users)?);
    let clock: Arc<dyn Clock> = Arc::new(SystemClock::new(zone));
    let driver = driver::Driver::new(reminders, notifier, clock, &config.service);

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("shutdown signal received");
            let _ = shutdown_tx.send(true);
        }
    });

    driver.run(shutdown_rx).await;
    info!("reminder service stopped");
    Ok(())
}

fn ensure_parent_dir(path: &str) {
    if let Some(parent) = std::path::Path::new(path).parent() {
        let _ = std::fs::create_dir_all(parent);
    }
}
