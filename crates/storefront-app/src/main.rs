//! Storefront process entry point.
//!
//! Connects to the event log, rebuilds the username projection and
//! materializes every account once so replay problems surface at boot.

use storefront_account::application::account_repository::AccountRepository;
use tracing_subscriber::EnvFilter;

mod config;
mod error;

use config::AppConfig;
use error::AppError;

#[tokio::main]
async fn main() -> Result<(), AppError> {
    // Initialize tracing subscriber.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .json()
        .init();

    tracing::info!("Starting storefront");

    let config = AppConfig::from_env()
        .inspect_err(|e| tracing::error!(error = %e, "invalid configuration"))?;

    let log = config.event_log.connect().await?;
    let accounts = AccountRepository::open(log).await?;
    let materialized = accounts.find_all().await?;

    tracing::info!(
        accounts = materialized.len(),
        usernames = accounts.usernames().len(),
        "account projections ready"
    );

    Ok(())
}
