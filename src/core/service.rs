//! Collaborator traits: entry storage, user lookup, sessions, password checks
//!
//! The core never assumes a storage mechanism. Implementations supply their
//! own isolation; every method is one logical operation.

use crate::core::entry::{Entry, EntryId, NewEntry, User, UserId};
use crate::core::session::{Session, SessionToken};
use anyhow::Result;
use async_trait::async_trait;
use chrono::Duration;

/// Ordered storage of entries
///
/// Slices are always ordered by descending creation time, ties broken by
/// descending id, so page boundaries are stable between requests.
#[async_trait]
pub trait EntryRepository: Send + Sync {
    /// Number of stored entries
    async fn count(&self) -> Result<usize>;

    /// Entries at positions `[start, end)` of the newest-first ordering
    ///
    /// Positions past the end are simply absent; an out-of-range window
    /// yields an empty vector.
    async fn ordered_slice(&self, start: usize, end: usize) -> Result<Vec<Entry>>;

    /// Get an entry by ID
    async fn get_by_id(&self, id: EntryId) -> Result<Option<Entry>>;

    /// Store a new entry and assign the next id
    async fn insert(&self, entry: NewEntry) -> Result<Entry>;

    /// Persist a revised entry
    ///
    /// Fails when the entry no longer exists or its owner differs from the
    /// stored one.
    async fn update(&self, entry: Entry) -> Result<Entry>;

    /// Remove an entry, returning whether it existed
    async fn delete_by_id(&self, id: EntryId) -> Result<bool>;

    /// Count and slice read as one snapshot
    ///
    /// The default performs two independent reads, so a concurrent insert can
    /// shift rows across the page boundary between them. Backends that can
    /// read both under one lock or transaction should override this.
    async fn snapshot_page(&self, start: usize, end: usize) -> Result<(usize, Vec<Entry>)> {
        let total = self.count().await?;
        let entries = self.ordered_slice(start, end).await?;
        Ok((total, entries))
    }
}

/// Lookup of registered users
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Exact, case-sensitive email match
    async fn find_by_email(&self, email: &str) -> Result<Option<User>>;

    /// Get a user by ID
    async fn get(&self, id: &UserId) -> Result<Option<User>>;

    /// Register a user; fails if the email is taken
    async fn insert(&self, user: User) -> Result<User>;
}

/// Server-side session records
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Open a session for `user_id` valid for `ttl`
    async fn create(&self, user_id: UserId, ttl: Duration) -> Result<Session>;

    /// Resolve a token; expired sessions resolve to `None`
    async fn resolve(&self, token: &SessionToken) -> Result<Option<Session>>;

    /// Drop a session. Unknown tokens are ignored.
    async fn destroy(&self, token: &SessionToken) -> Result<()>;
}

/// One-way password check against a stored hash
pub trait PasswordVerifier: Send + Sync {
    fn verify(&self, plaintext: &str, stored_hash: &str) -> bool;
}
