//! Habitica auto party invite daemon.
//!
//! Polls the looking-for-party list on a fixed interval and invites users
//! matching the configured criteria. Runs until terminated externally.

use autoparty::ApiClient;
use autoparty::config::AppConfig;
use autoparty::driver::Driver;
use autoparty::ledger::Ledger;
use autoparty::logs::CycleLogs;
use std::time::Duration;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = match AppConfig::from_args(std::env::args().skip(1)) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(1);
        }
    };

    let ledger = Ledger::load(config.ledger_path())
        .map_err(|e| anyhow::anyhow!("cannot load invite ledger: {e}"))?;
    let logs = CycleLogs::open(&config.log_dir)
        .map_err(|e| anyhow::anyhow!("cannot open cycle logs: {e}"))?;
    let api = ApiClient::new(config.admin.clone(), config.inviter.clone());

    tracing::info!(
        "welcome to Habitica Auto Party Invites; running every {}s",
        config.fetch_interval_secs
    );

    Driver::new(
        api,
        ledger,
        config.criteria.clone(),
        logs,
        Duration::from_secs(config.fetch_interval_secs),
    )
    .run()
    .await;

    Ok(())
}
