//! Blogful server binary
//!
//! Reads configuration from the file named by `BLOGFUL_CONFIG` (defaults
//! otherwise), registers the configured users and serves until Ctrl+C or
//! SIGTERM. Log levels follow `RUST_LOG`.

use anyhow::Result;
use blogful::prelude::*;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("blogful=info,tower_http=info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = BlogConfig::load()?;

    let users = InMemoryUserRepository::new();
    let seeded = seed_users(&users, &config.users, &Argon2Verifier::new()).await?;
    if seeded == 0 {
        tracing::warn!("no users configured; nobody will be able to log in");
    } else {
        tracing::info!(count = seeded, "registered users");
    }

    ServerBuilder::new()
        .with_config(config)
        .with_user_repository(users)
        .serve()
        .await
}
