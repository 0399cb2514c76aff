//! Storage implementations and startup seeding

pub mod in_memory;
pub mod password;

pub use in_memory::{InMemoryEntryRepository, InMemorySessionStore, InMemoryUserRepository};
pub use password::Argon2Verifier;

use crate::config::SeedUser;
use crate::core::entry::User;
use crate::core::service::UserRepository;
use anyhow::{Result, bail};

/// Register the configured users, hashing plaintext passwords
///
/// Returns the number of users inserted.
pub async fn seed_users(
    repo: &dyn UserRepository,
    seeds: &[SeedUser],
    hasher: &Argon2Verifier,
) -> Result<usize> {
    for seed in seeds {
        let password_hash = match (&seed.password_hash, &seed.password) {
            (Some(hash), _) => hash.clone(),
            (None, Some(plaintext)) => hasher.hash(plaintext)?,
            (None, None) => bail!("Seed user '{}' has neither password nor password_hash", seed.email),
        };
        let user = repo
            .insert(User::new(seed.name.clone(), seed.email.clone(), password_hash))
            .await?;
        tracing::debug!(user_id = %user.id, email = %user.email, "seeded user");
    }
    Ok(seeds.len())
}
