//! Creates the default account from the `seed` config section.
//!
//! Leaves an existing account with the same username untouched.

use customer_manager::{
    config::StoreBackend, database, load_config, queries::PgStore, services::accounts,
    store::AccountStore,
};
use secrecy::ExposeSecret;
use tracing::{info, warn};
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = load_config()?;
    if config.store.backend == StoreBackend::Memory {
        warn!("The in-memory store does not persist; seeding it has no lasting effect");
        return Ok(());
    }

    let pool = database::connect(&config.database).await?;
    database::run_migrations(&pool).await?;
    let store = PgStore::new(pool);

    let seed = &config.seed;
    if let Some(existing) = store.find_account_by_username(&seed.username).await? {
        info!(account_id = %existing.id, "Account {} already exists, nothing to do", seed.username);
        return Ok(());
    }

    let account = accounts::create_account(
        &store,
        &seed.username,
        &seed.email,
        seed.password.expose_secret(),
    )
    .await?;

    info!(account_id = %account.id, "Created account {} <{}>", account.username, account.email);
    Ok(())
}
